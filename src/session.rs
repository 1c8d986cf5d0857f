//! Voice session state machine
//!
//! [`SessionController`] owns the session record, the voice catalog, the
//! history, and the engine handle, and is the only place session state
//! changes. Commands come in from key handlers; completion and failure
//! signals come in from the engine channel via [`SessionController::handle_event`].
//!
//! Rules the controller enforces:
//! - at most one live utterance; a new `speak` replaces the old one
//! - `status` is `Idle` exactly when no utterance is live
//! - platform failures are absorbed and logged, never fatal
//! - with no engine present every operation is a quiet no-op

use log::{debug, warn};

use crate::catalog::{VoiceCatalog, VoiceOption};
use crate::history::History;
use crate::speech::{EngineEvent, EngineFeatures, SpeakRequest, SpeechEngine, UtteranceId};
use crate::Result;

/// Rate and pitch share one multiplier range.
pub const MULTIPLIER_MIN: f32 = 0.5;
pub const MULTIPLIER_MAX: f32 = 1.75;
/// Step used by the rate/pitch nudge keys.
pub const MULTIPLIER_STEP: f32 = 0.25;

/// Where playback currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Idle,
    Speaking,
    Paused,
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PlaybackStatus::Idle => "idle",
            PlaybackStatus::Speaking => "speaking",
            PlaybackStatus::Paused => "paused",
        };
        write!(f, "{}", label)
    }
}

/// The one session record of a run.
#[derive(Debug, Clone)]
pub struct Session {
    pub status: PlaybackStatus,
    /// Text field contents, edited by the presentation layer
    pub text: String,
    /// Rate multiplier within [`MULTIPLIER_MIN`]..=[`MULTIPLIER_MAX`]
    pub rate: f32,
    /// Pitch multiplier, same range
    pub pitch: f32,
    /// Utterance currently owned by the engine, if any
    pub live: Option<UtteranceId>,
}

/// Owns and mutates all voice-session state.
pub struct SessionController {
    session: Session,
    catalog: VoiceCatalog,
    history: History,
    /// None when the platform has no usable speech engine
    engine: Option<Box<dyn SpeechEngine>>,
}

impl SessionController {
    pub fn new(
        engine: Option<Box<dyn SpeechEngine>>,
        preferred_lang: &str,
        rate: f32,
        pitch: f32,
    ) -> Self {
        if engine.is_none() {
            warn!("no speech engine; speech operations will be ignored");
        }
        Self {
            session: Session {
                status: PlaybackStatus::Idle,
                text: String::new(),
                rate: clamp_multiplier(rate),
                pitch: clamp_multiplier(pitch),
                live: None,
            },
            catalog: VoiceCatalog::new(preferred_lang),
            history: History::new(),
            engine,
        }
    }

    /// False when the platform gave us no engine.
    pub fn is_supported(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine_name(&self) -> Option<&'static str> {
        self.engine.as_ref().map(|e| e.name())
    }

    pub fn engine_features(&self) -> Option<EngineFeatures> {
        self.engine.as_ref().map(|e| e.features())
    }

    /// Pull the voice list from the engine into the catalog. Called once
    /// at startup and again on every voice-list-changed signal.
    pub fn refresh_voices(&mut self) -> Result<()> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };
        let voices = engine.voices()?;
        self.catalog.refresh(voices);
        Ok(())
    }

    /// Speak `content`, or the session text when `content` is None.
    ///
    /// Quietly does nothing when there is no engine, the trimmed text is
    /// empty, or no voice is selected; in those cases nothing already
    /// playing is disturbed. Otherwise the live utterance (if any) is
    /// replaced and a history entry is recorded. Returns whether an
    /// utterance was issued.
    pub fn speak(&mut self, content: Option<&str>) -> Result<bool> {
        let Some(engine) = self.engine.as_mut() else {
            debug!("speak ignored: no speech engine");
            return Ok(false);
        };

        let text = content.unwrap_or(&self.session.text).trim().to_string();
        if text.is_empty() {
            debug!("speak ignored: nothing to say");
            return Ok(false);
        }

        let Some(voice) = self.catalog.selected().cloned() else {
            debug!("speak ignored: no voice selected");
            return Ok(false);
        };

        // Drop our claim on the old utterance before cancelling it, so
        // its late end signal is stale by the time it arrives.
        if let Some(old) = self.session.live.take() {
            debug!("replacing live utterance {}", old);
            if let Err(e) = engine.cancel() {
                warn!("cancel before speak failed: {}", e);
            }
        }

        let request = SpeakRequest {
            text: text.clone(),
            voice_id: voice.id.clone(),
            lang: voice.lang.clone(),
            rate: self.session.rate,
            pitch: self.session.pitch,
        };

        let id = match engine.speak(&request) {
            Ok(id) => id,
            Err(e) => {
                warn!("speak failed: {}", e);
                self.session.status = PlaybackStatus::Idle;
                return Ok(false);
            }
        };

        self.session.live = Some(id);
        self.session.status = PlaybackStatus::Speaking;
        self.history.record(&text, &voice.label());
        debug!("speaking {} chars as {}", text.len(), id);
        Ok(true)
    }

    /// Cancel playback and land in `Idle`. Safe to call at any time.
    pub fn stop(&mut self) -> Result<()> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };

        // Release first: the stop signal the cancel triggers must find a
        // stale id.
        if let Some(old) = self.session.live.take() {
            debug!("stopping {}", old);
        }
        if let Err(e) = engine.cancel() {
            warn!("platform cancel failed: {}", e);
        }
        self.session.status = PlaybackStatus::Idle;
        Ok(())
    }

    /// Speaking becomes Paused and back. Does nothing when idle.
    ///
    /// The status flips even if the platform call fails; transport is
    /// best-effort and the session record stays the source of truth.
    pub fn toggle_pause(&mut self) -> Result<()> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };
        if self.session.live.is_none() {
            debug!("toggle_pause ignored: nothing is playing");
            return Ok(());
        }

        match self.session.status {
            PlaybackStatus::Speaking => {
                if let Err(e) = engine.pause() {
                    warn!("platform pause failed: {}", e);
                }
                self.session.status = PlaybackStatus::Paused;
            }
            PlaybackStatus::Paused => {
                if let Err(e) = engine.resume() {
                    warn!("platform resume failed: {}", e);
                }
                self.session.status = PlaybackStatus::Speaking;
            }
            PlaybackStatus::Idle => {}
        }
        Ok(())
    }

    /// Apply one engine signal.
    pub fn handle_event(&mut self, event: EngineEvent) -> Result<()> {
        match event {
            EngineEvent::Finished(id) => {
                self.finish(id, None);
                Ok(())
            }
            EngineEvent::Failed { id, reason } => {
                self.finish(id, Some(reason));
                Ok(())
            }
            EngineEvent::VoicesChanged => {
                debug!("platform voice list changed");
                self.refresh_voices()
            }
        }
    }

    /// Completion and failure land in the same place: release and idle.
    /// Signals for anything but the live utterance are stale and dropped.
    fn finish(&mut self, id: UtteranceId, failure: Option<String>) {
        if self.session.live != Some(id) {
            debug!("ignoring stale signal for {}", id);
            return;
        }
        match failure {
            Some(reason) => warn!("utterance {} failed: {}", id, reason),
            None => debug!("utterance {} finished", id),
        }
        self.session.live = None;
        self.session.status = PlaybackStatus::Idle;
    }

    /// Speak a stored history entry again. Records a fresh history item;
    /// the original stays where it is.
    pub fn replay(&mut self, index: usize) -> Result<bool> {
        let Some(text) = self.history.get(index).map(|item| item.text.clone()) else {
            debug!("replay ignored: no history entry {}", index);
            return Ok(false);
        };
        self.speak(Some(&text))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> PlaybackStatus {
        self.session.status
    }

    pub fn text(&self) -> &str {
        &self.session.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.session.text = text.to_string();
    }

    pub fn push_str(&mut self, s: &str) {
        self.session.text.push_str(s);
    }

    /// Remove the last character. Returns whether anything was removed.
    pub fn backspace(&mut self) -> bool {
        self.session.text.pop().is_some()
    }

    pub fn clear_text(&mut self) {
        self.session.text.clear();
    }

    pub fn rate(&self) -> f32 {
        self.session.rate
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.session.rate = clamp_multiplier(rate);
        debug!("rate set to {:.2}", self.session.rate);
    }

    pub fn nudge_rate(&mut self, delta: f32) {
        self.set_rate(self.session.rate + delta);
    }

    pub fn pitch(&self) -> f32 {
        self.session.pitch
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.session.pitch = clamp_multiplier(pitch);
        debug!("pitch set to {:.2}", self.session.pitch);
    }

    pub fn nudge_pitch(&mut self, delta: f32) {
        self.set_pitch(self.session.pitch + delta);
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    /// Select a voice by catalog position, for the voice picker.
    pub fn select_voice(&mut self, index: usize) -> Option<VoiceOption> {
        self.catalog.select_index(index).cloned()
    }

    /// Change the auto-selection language prefix for future refreshes.
    pub fn set_preferred_lang(&mut self, prefix: &str) {
        self.catalog.set_preferred_lang(prefix);
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}

/// Clamp a rate/pitch multiplier into the supported range. Non-finite
/// input (a hand-edited config can produce it) lands on 1.0.
fn clamp_multiplier(value: f32) -> f32 {
    if !value.is_finite() {
        return 1.0;
    }
    value.clamp(MULTIPLIER_MIN, MULTIPLIER_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_multiplier() {
        assert_eq!(clamp_multiplier(1.0), 1.0);
        assert_eq!(clamp_multiplier(0.1), MULTIPLIER_MIN);
        assert_eq!(clamp_multiplier(9.0), MULTIPLIER_MAX);
        assert_eq!(clamp_multiplier(f32::NAN), 1.0);
        assert_eq!(clamp_multiplier(f32::INFINITY), 1.0);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(PlaybackStatus::Idle.to_string(), "idle");
        assert_eq!(PlaybackStatus::Speaking.to_string(), "speaking");
        assert_eq!(PlaybackStatus::Paused.to_string(), "paused");
    }
}
