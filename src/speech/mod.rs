//! Speech engine layer
//!
//! The [`SpeechEngine`] trait, its backends, and the platform-aware
//! constructor the application calls at startup.

pub mod backends;
pub mod engine;

pub use engine::{
    EngineEvent, EngineFeatures, EventSender, SpeakRequest, SpeechEngine, UtteranceId,
};

use log::info;

use crate::Result;

use backends::espeak::EspeakEngine;
use backends::native::NativeEngine;

/// Explicit backend choice from config or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendChoice {
    Auto,
    Native,
    Espeak,
}

impl BackendChoice {
    /// Parse a config/CLI value. Unknown values fall back to Auto.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "native" => BackendChoice::Native,
            "espeak" | "espeak-ng" => BackendChoice::Espeak,
            _ => BackendChoice::Auto,
        }
    }
}

/// Detect WSL (Windows Subsystem for Linux).
///
/// Matters twice: backend order flips under Auto, and the event loop
/// falls back to select() because WSL cannot epoll a TTY.
pub fn is_wsl() -> bool {
    if let Ok(contents) = std::fs::read_to_string("/proc/version") {
        let lower = contents.to_lowercase();
        if lower.contains("microsoft") || lower.contains("wsl") {
            return true;
        }
    }
    std::env::var("WSL_DISTRO_NAME").is_ok()
}

/// Create a speech engine for this platform.
///
/// With [`BackendChoice::Auto`] the order depends on the environment:
///
/// **WSL:**
/// 1. espeak-ng (audio reaches the host through PulseAudio/WSLG)
/// 2. native (Speech Dispatcher, if configured)
///
/// **Native Linux / macOS:**
/// 1. native (Speech Dispatcher / AVFoundation)
/// 2. espeak-ng
///
/// An error here means the platform cannot speak at all; the caller runs
/// without an engine and every speech operation becomes a no-op.
pub fn create_engine(
    events: EventSender,
    choice: BackendChoice,
) -> Result<Box<dyn SpeechEngine>> {
    match choice {
        BackendChoice::Native => {
            info!("backend forced to native");
            return Ok(Box::new(NativeEngine::new(events)?));
        }
        BackendChoice::Espeak => {
            info!("backend forced to espeak-ng");
            return Ok(Box::new(EspeakEngine::new(events)?));
        }
        BackendChoice::Auto => {}
    }

    if std::env::consts::OS == "linux" && is_wsl() {
        info!("detected WSL environment");

        info!("trying espeak-ng backend...");
        match EspeakEngine::new(events.clone()) {
            Ok(engine) => {
                info!("✓ initialized espeak-ng backend");
                return Ok(Box::new(engine));
            }
            Err(e) => {
                info!("✗ espeak-ng backend unavailable: {}", e);
            }
        }

        info!("trying native backend...");
        return match NativeEngine::new(events) {
            Ok(engine) => {
                info!("✓ initialized native backend");
                Ok(Box::new(engine))
            }
            Err(e) => Err(crate::UcapError::Engine(format!(
                "no speech backend available on WSL. Tried:\n\
                 1. espeak-ng (install: sudo apt install espeak-ng)\n\
                 2. Speech Dispatcher (not configured)\n\
                 Error: {}",
                e
            ))),
        };
    }

    info!("trying native backend...");
    match NativeEngine::new(events.clone()) {
        Ok(engine) => {
            info!("✓ initialized native backend");
            return Ok(Box::new(engine));
        }
        Err(e) => {
            info!("✗ native backend unavailable: {}", e);
        }
    }

    info!("trying espeak-ng backend...");
    match EspeakEngine::new(events) {
        Ok(engine) => {
            info!("✓ initialized espeak-ng backend");
            Ok(Box::new(engine))
        }
        Err(e) => Err(crate::UcapError::Engine(format!(
            "no speech backend available on {}. Tried:\n\
             1. native TTS (Linux: sudo apt install speech-dispatcher)\n\
             2. espeak-ng (install: sudo apt install espeak-ng)\n\
             Error: {}",
            std::env::consts::OS,
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_choice_parse() {
        assert_eq!(BackendChoice::parse("native"), BackendChoice::Native);
        assert_eq!(BackendChoice::parse("espeak"), BackendChoice::Espeak);
        assert_eq!(BackendChoice::parse("ESPEAK-NG"), BackendChoice::Espeak);
        assert_eq!(BackendChoice::parse("auto"), BackendChoice::Auto);
        assert_eq!(BackendChoice::parse("whatever"), BackendChoice::Auto);
    }
}
