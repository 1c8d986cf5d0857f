//! Native TTS backend using the tts crate
//!
//! Drives the platform's own speech synthesis through the `tts` crate:
//! - Speech Dispatcher on Linux (native bindings)
//! - AVFoundation on macOS
//!
//! Completion is reported through the crate's utterance-end callback,
//! which fires on a platform thread; the callback forwards an
//! [`EngineEvent`] over the channel and never touches session state
//! directly. The crate exposes no pause primitive, so this backend
//! advertises `pause: false` and pause requests only log.

use std::sync::{Arc, Mutex};

use log::{debug, error, warn};
use tts::{Tts as TtsCrate, UtteranceId as TtsUtteranceId, Voice as TtsVoice};

use crate::catalog::VoiceOption;
use crate::speech::engine::{
    EngineEvent, EngineFeatures, EventSender, SpeakRequest, SpeechEngine, UtteranceId,
};
use crate::{Result, UcapError};

/// Bookkeeping for the utterance currently in flight.
///
/// Shared with the utterance-end/stop callbacks so they can tell the live
/// utterance apart from one that was already replaced or cancelled.
struct ActiveUtterance {
    ours: UtteranceId,
    native: Option<TtsUtteranceId>,
}

/// Native TTS backend using the tts crate.
pub struct NativeEngine {
    /// The tts crate's TTS instance
    tts: TtsCrate,

    /// Voices from the last enumeration, kept for voice binding by id
    known: Vec<TtsVoice>,

    /// Voice id currently bound on the platform
    bound_voice: Option<String>,

    /// Utterance in flight, shared with the platform callbacks
    active: Arc<Mutex<Option<ActiveUtterance>>>,

    /// Source for monotonic utterance ids
    next_id: u64,
}

impl NativeEngine {
    /// Create a new native TTS engine, hooking the platform's utterance
    /// callbacks up to the event channel.
    pub fn new(events: EventSender) -> Result<Self> {
        debug!("creating native TTS backend");

        let tts = TtsCrate::default()
            .map_err(|e| UcapError::Engine(format!("failed to initialize TTS: {}", e)))?;

        let active: Arc<Mutex<Option<ActiveUtterance>>> = Arc::new(Mutex::new(None));

        let features = tts.supported_features();
        if features.utterance_callbacks {
            // End and stop both mean the utterance is gone; a stop caused
            // by our own cancel finds the bookkeeping already cleared and
            // stays silent.
            let end_hook = ended_callback(Arc::clone(&active), events.clone());
            let stop_hook = ended_callback(Arc::clone(&active), events);
            if let Err(e) = tts.on_utterance_end(Some(end_hook)) {
                warn!("failed to hook utterance end: {}", e);
            }
            if let Err(e) = tts.on_utterance_stop(Some(stop_hook)) {
                warn!("failed to hook utterance stop: {}", e);
            }
        } else {
            warn!("utterance callbacks not supported on this platform; playback status will not clear by itself");
        }

        debug!("native TTS backend created successfully");

        Ok(Self {
            tts,
            known: Vec::new(),
            bound_voice: None,
            active,
            next_id: 0,
        })
    }

    /// Bind the platform voice for the next utterance. Failures are logged
    /// and the current platform voice stays in effect.
    fn bind_voice(&mut self, voice_id: &str) {
        if self.bound_voice.as_deref() == Some(voice_id) {
            return;
        }

        let features = self.tts.supported_features();
        if !features.voice {
            debug!("voice selection not supported on this platform");
            return;
        }

        if self.known.is_empty() {
            match self.tts.voices() {
                Ok(voices) => self.known = voices,
                Err(e) => {
                    warn!("failed to enumerate voices for binding: {}", e);
                    return;
                }
            }
        }

        match self.known.iter().find(|v| v.id() == voice_id) {
            Some(voice) => match self.tts.set_voice(voice) {
                Ok(_) => {
                    debug!("bound platform voice {}", voice_id);
                    self.bound_voice = Some(voice_id.to_string());
                }
                Err(e) => warn!("failed to set voice {}: {}", voice_id, e),
            },
            None => warn!(
                "voice {} not in the platform list ({} known); keeping current voice",
                voice_id,
                self.known.len()
            ),
        }
    }

    fn apply_rate(&mut self, multiplier: f32) {
        let features = self.tts.supported_features();
        if !features.rate {
            debug!("rate control not supported on this platform");
            return;
        }
        let value = scale_to_platform(
            multiplier,
            self.tts.min_rate(),
            self.tts.normal_rate(),
            self.tts.max_rate(),
        );
        if let Err(e) = self.tts.set_rate(value) {
            warn!("failed to set rate: {}", e);
        }
    }

    fn apply_pitch(&mut self, multiplier: f32) {
        let features = self.tts.supported_features();
        if !features.pitch {
            debug!("pitch control not supported on this platform");
            return;
        }
        let value = scale_to_platform(
            multiplier,
            self.tts.min_pitch(),
            self.tts.normal_pitch(),
            self.tts.max_pitch(),
        );
        if let Err(e) = self.tts.set_pitch(value) {
            warn!("failed to set pitch: {}", e);
        }
    }
}

/// Build the callback handed to the tts crate for utterance end/stop.
///
/// Runs on a platform thread. Only the utterance we still track may emit
/// an event; anything else was replaced or cancelled earlier.
fn ended_callback(
    active: Arc<Mutex<Option<ActiveUtterance>>>,
    events: EventSender,
) -> Box<dyn FnMut(TtsUtteranceId)> {
    Box::new(move |ended: TtsUtteranceId| {
        let Ok(mut slot) = active.lock() else { return };
        let ours = match slot.as_ref() {
            Some(a) if a.native.is_none() || a.native.as_ref() == Some(&ended) => a.ours,
            _ => return,
        };
        *slot = None;
        debug!("native utterance {} ended", ours);
        let _ = events.send(EngineEvent::Finished(ours));
    })
}

/// Map a multiplier onto a platform parameter range, pinning 1.0 to the
/// platform's normal value.
fn scale_to_platform(multiplier: f32, min: f32, normal: f32, max: f32) -> f32 {
    let value = if multiplier < 1.0 {
        normal - (1.0 - multiplier) * (normal - min)
    } else {
        normal + (multiplier - 1.0) * (max - normal)
    };
    value.clamp(min, max)
}

impl SpeechEngine for NativeEngine {
    fn name(&self) -> &'static str {
        "native"
    }

    fn features(&self) -> EngineFeatures {
        let f = self.tts.supported_features();
        EngineFeatures {
            rate: f.rate,
            pitch: f.pitch,
            voice: f.voice,
            pause: false,
            utterance_events: f.utterance_callbacks,
        }
    }

    fn voices(&mut self) -> Result<Vec<VoiceOption>> {
        let features = self.tts.supported_features();
        if !features.voice {
            debug!("platform publishes no voice list");
            return Ok(Vec::new());
        }

        let platform = self
            .tts
            .voices()
            .map_err(|e| UcapError::Engine(format!("failed to get voices: {}", e)))?;

        let list = platform
            .iter()
            .map(|v| VoiceOption::with_id(v.id(), v.name(), v.language().to_string()))
            .collect();
        self.known = platform;
        Ok(list)
    }

    fn speak(&mut self, request: &SpeakRequest) -> Result<UtteranceId> {
        self.bind_voice(&request.voice_id);
        self.apply_rate(request.rate);
        self.apply_pitch(request.pitch);

        debug!("speaking: {}", request.text);
        let native = self.tts.speak(request.text.as_str(), true).map_err(|e| {
            error!("failed to speak: {}", e);
            UcapError::Engine(format!("speak failed: {}", e))
        })?;

        self.next_id += 1;
        let id = UtteranceId(self.next_id);
        if let Ok(mut slot) = self.active.lock() {
            *slot = Some(ActiveUtterance { ours: id, native });
        }
        Ok(id)
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("cancelling native speech");

        // Clear the bookkeeping first so the stop callback this triggers
        // finds nothing to report.
        if let Ok(mut slot) = self.active.lock() {
            slot.take();
        }

        let features = self.tts.supported_features();
        if !features.stop {
            warn!("stop not supported on this platform");
            return Ok(());
        }

        self.tts.stop().map_err(|e| {
            error!("failed to stop speech: {}", e);
            UcapError::Engine(format!("stop failed: {}", e))
        })?;

        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        warn!("the native backend cannot pause; audio keeps playing");
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        debug!("resume requested; native backend never actually paused");
        Ok(())
    }
}
