//! espeak-ng subprocess backend
//!
//! Runs one espeak-ng child process per utterance. This is the preferred
//! backend on WSL (audio reaches the host through PulseAudio/WSLG) and the
//! fallback elsewhere, and it is the one backend with a real pause: the
//! child is suspended and continued with SIGSTOP/SIGCONT. A reaper thread
//! waits on every child and reports over the event channel how it ended.
//!
//! Dependencies:
//! - espeak-ng (install with: sudo apt install espeak-ng)

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{debug, error, warn};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::VoiceOption;
use crate::speech::engine::{
    EngineEvent, EngineFeatures, EventSender, SpeakRequest, SpeechEngine, UtteranceId,
};
use crate::{Result, UcapError};

/// espeak-ng's default speaking rate in words per minute.
const ESPEAK_NORMAL_WPM: f32 = 175.0;
/// Bounds espeak-ng accepts for -s.
const ESPEAK_MIN_WPM: i32 = 80;
const ESPEAK_MAX_WPM: i32 = 450;
/// Midpoint of espeak-ng's 0-99 pitch scale.
const ESPEAK_NORMAL_PITCH: f32 = 50.0;

/// One `--voices` row: priority, language, age/gender, name.
static VOICE_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\s+(\S+)\s+\S+\s+(\S+)").expect("valid regex"));

/// espeak-ng subprocess backend.
pub struct EspeakEngine {
    /// Path to espeak-ng
    espeak_path: String,

    /// Channel the reaper threads report on
    events: EventSender,

    /// Child currently speaking, or suspended mid-utterance. Shared with
    /// the reaper thread, which clears it when the child exits on its
    /// own; signalling a pid that was already reaped could hit an
    /// unrelated process.
    current: Arc<Mutex<Option<LiveChild>>>,

    /// Source for monotonic utterance ids
    next_id: u64,
}

#[derive(Clone, Copy)]
struct LiveChild {
    pid: Pid,
    id: UtteranceId,
}

impl EspeakEngine {
    /// Create a new espeak-ng backend. Verifies the binary is runnable.
    pub fn new(events: EventSender) -> Result<Self> {
        debug!("creating espeak-ng backend");

        let espeak_path = Self::find_espeak()?;
        debug!("found espeak-ng at: {}", espeak_path);

        Ok(Self {
            espeak_path,
            events,
            current: Arc::new(Mutex::new(None)),
            next_id: 0,
        })
    }

    /// Find the espeak-ng executable
    fn find_espeak() -> Result<String> {
        let paths = ["espeak-ng", "/usr/bin/espeak-ng", "/usr/local/bin/espeak-ng"];

        for path in paths {
            if let Ok(status) = Command::new(path)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                if status.success() {
                    return Ok(path.to_string());
                }
            }
        }

        Err(UcapError::Engine(
            "espeak-ng not found. Install with: sudo apt install espeak-ng".to_string(),
        ))
    }

    /// Map a rate multiplier onto espeak's words-per-minute scale.
    fn rate_to_wpm(multiplier: f32) -> i32 {
        let wpm = (ESPEAK_NORMAL_WPM * multiplier).round() as i32;
        wpm.clamp(ESPEAK_MIN_WPM, ESPEAK_MAX_WPM)
    }

    /// Map a pitch multiplier onto espeak's 0-99 pitch scale.
    fn pitch_to_espeak(multiplier: f32) -> i32 {
        let pitch = (ESPEAK_NORMAL_PITCH * multiplier).round() as i32;
        pitch.clamp(0, 99)
    }

    /// Parse `espeak-ng --voices` output.
    ///
    /// Rows look like `  5  id  --/M  Indonesian  poz/id`; the leading
    /// priority digit keeps the header line out. espeak has no opaque
    /// voice ids, so these become name-language composites.
    fn parse_voice_listing(listing: &str) -> Vec<VoiceOption> {
        let mut voices = Vec::new();
        for line in listing.lines() {
            if let Some(caps) = VOICE_ROW.captures(line) {
                voices.push(VoiceOption::derived(&caps[2], &caps[1]));
            }
        }
        voices
    }

    /// Snapshot of the live child, if any.
    fn live_child(&self) -> Option<LiveChild> {
        match self.current.lock() {
            Ok(slot) => *slot,
            Err(_) => None,
        }
    }

    /// Clear the slot after the child for `id` was reaped, unless a newer
    /// utterance already took it over.
    fn release_slot(current: &Mutex<Option<LiveChild>>, id: UtteranceId) {
        if let Ok(mut slot) = current.lock() {
            if slot.as_ref().map(|live| live.id) == Some(id) {
                *slot = None;
            }
        }
    }

    /// Wait for the child on its own thread and report how it ended.
    ///
    /// A child killed by a signal is one we cancelled ourselves; that
    /// outcome is not reported.
    fn spawn_reaper(
        mut child: Child,
        id: UtteranceId,
        events: EventSender,
        current: Arc<Mutex<Option<LiveChild>>>,
    ) {
        thread::spawn(move || {
            use std::os::unix::process::ExitStatusExt;

            let status = child.wait();
            Self::release_slot(&current, id);

            match status {
                Ok(status) if status.success() => {
                    debug!("espeak-ng finished utterance {}", id);
                    let _ = events.send(EngineEvent::Finished(id));
                }
                Ok(status) if status.signal().is_some() => {
                    debug!("espeak-ng for {} ended on signal {:?}", id, status.signal());
                }
                Ok(status) => {
                    warn!("espeak-ng for {} exited with {}", id, status);
                    let _ = events.send(EngineEvent::Failed {
                        id,
                        reason: format!("espeak-ng exited with {}", status),
                    });
                }
                Err(e) => {
                    warn!("failed to wait on espeak-ng for {}: {}", id, e);
                    let _ = events.send(EngineEvent::Failed {
                        id,
                        reason: format!("wait failed: {}", e),
                    });
                }
            }
        });
    }
}

impl SpeechEngine for EspeakEngine {
    fn name(&self) -> &'static str {
        "espeak-ng"
    }

    fn features(&self) -> EngineFeatures {
        EngineFeatures {
            rate: true,
            pitch: true,
            voice: true,
            pause: true,
            utterance_events: true,
        }
    }

    fn voices(&mut self) -> Result<Vec<VoiceOption>> {
        let output = Command::new(&self.espeak_path)
            .arg("--voices")
            .stderr(Stdio::null())
            .output()
            .map_err(|e| UcapError::Engine(format!("failed to run espeak-ng --voices: {}", e)))?;

        if !output.status.success() {
            return Err(UcapError::Engine(format!(
                "espeak-ng --voices exited with {}",
                output.status
            )));
        }

        let listing = String::from_utf8(output.stdout)?;
        Ok(Self::parse_voice_listing(&listing))
    }

    fn speak(&mut self, request: &SpeakRequest) -> Result<UtteranceId> {
        self.cancel()?;

        let mut cmd = Command::new(&self.espeak_path);
        cmd.arg("-v").arg(&request.lang);
        cmd.arg("-s").arg(Self::rate_to_wpm(request.rate).to_string());
        cmd.arg("-p").arg(Self::pitch_to_espeak(request.pitch).to_string());
        cmd.arg("--").arg(&request.text);
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            error!("failed to spawn espeak-ng: {}", e);
            UcapError::Engine(format!("failed to start espeak-ng: {}", e))
        })?;

        self.next_id += 1;
        let id = UtteranceId(self.next_id);
        let pid = Pid::from_raw(child.id() as i32);
        if let Ok(mut slot) = self.current.lock() {
            *slot = Some(LiveChild { pid, id });
        }
        Self::spawn_reaper(child, id, self.events.clone(), Arc::clone(&self.current));
        debug!("espeak-ng pid {} speaking as {}", pid, id);
        Ok(id)
    }

    fn cancel(&mut self) -> Result<()> {
        let taken = match self.current.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(live) = taken {
            debug!("killing espeak-ng pid {}", live.pid);
            // SIGKILL also takes down a SIGSTOPped child; the reaper
            // collects the exit.
            if let Err(e) = kill(live.pid, Signal::SIGKILL) {
                debug!("failed to kill espeak-ng pid {}: {}", live.pid, e);
            }
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        let Some(live) = self.live_child() else {
            return Ok(());
        };
        kill(live.pid, Signal::SIGSTOP)
            .map_err(|e| UcapError::Engine(format!("failed to pause espeak-ng: {}", e)))?;
        debug!("suspended espeak-ng pid {}", live.pid);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        let Some(live) = self.live_child() else {
            return Ok(());
        };
        kill(live.pid, Signal::SIGCONT)
            .map_err(|e| UcapError::Engine(format!("failed to resume espeak-ng: {}", e)))?;
        debug!("continued espeak-ng pid {}", live.pid);
        Ok(())
    }
}

impl Drop for EspeakEngine {
    fn drop(&mut self) {
        debug!("shutting down espeak-ng backend");
        let _ = self.cancel();
    }
}
