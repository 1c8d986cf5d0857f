//! Speech engine abstraction
//!
//! A unified interface to the platform's text-to-speech capability. The
//! session controller issues requests through [`SpeechEngine`] and hears
//! back asynchronously over a channel of [`EngineEvent`]s.

use std::fmt;
use std::sync::mpsc::Sender;

use crate::catalog::VoiceOption;
use crate::Result;

/// Identifier for one issued utterance.
///
/// Allocated monotonically by an engine. The controller tracks a single
/// live id; events carrying any other id are stale and get dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// Everything an engine needs to start one utterance.
#[derive(Debug, Clone)]
pub struct SpeakRequest {
    pub text: String,
    /// Engine voice id, as published by `voices()`.
    pub voice_id: String,
    /// Language tag of the selected voice.
    pub lang: String,
    /// Rate multiplier, 1.0 is the platform default.
    pub rate: f32,
    /// Pitch multiplier, 1.0 is the platform default.
    pub pitch: f32,
}

/// Asynchronous signals out of an engine.
///
/// Sent from platform callback threads or watcher threads; the main loop
/// drains the channel every tick and feeds the session controller.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The utterance played to its end.
    Finished(UtteranceId),
    /// The utterance died early. Handled like completion; the reason only
    /// goes to the log.
    Failed { id: UtteranceId, reason: String },
    /// The platform's voice list may have changed; re-enumerate.
    ///
    /// Reserved for backends whose platform reports voice-list changes;
    /// none of the current ones does, so today only the manual refresh
    /// command re-enumerates.
    VoicesChanged,
}

/// What a backend can actually do on this platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineFeatures {
    pub rate: bool,
    pub pitch: bool,
    pub voice: bool,
    pub pause: bool,
    /// Whether completion signals are delivered at all.
    pub utterance_events: bool,
}

/// Sending half of the engine event channel, cloned into backends.
pub type EventSender = Sender<EngineEvent>;

/// Platform speech engine.
///
/// Backends keep at most one utterance in flight: `speak` replaces
/// whatever is playing. Transport calls on an idle engine are no-ops.
pub trait SpeechEngine: Send {
    /// Short backend name for logs and the status line.
    fn name(&self) -> &'static str;

    /// Capability flags for this backend on this platform.
    fn features(&self) -> EngineFeatures;

    /// Enumerate the voices the platform currently offers.
    fn voices(&mut self) -> Result<Vec<VoiceOption>>;

    /// Start speaking, cancelling any utterance already in flight.
    fn speak(&mut self, request: &SpeakRequest) -> Result<UtteranceId>;

    /// Cancel in-flight speech.
    fn cancel(&mut self) -> Result<()>;

    /// Suspend playback, keeping the utterance alive.
    fn pause(&mut self) -> Result<()>;

    /// Continue a paused utterance.
    fn resume(&mut self) -> Result<()>;
}
