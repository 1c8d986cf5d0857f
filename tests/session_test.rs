//! Voice session tests
//!
//! Drives [`SessionController`] against a scripted in-memory engine and
//! checks the session rules: one live utterance, quiet no-ops, completion
//! and failure signals, pause transitions, and the replay history. A few
//! tests go through [`State`] where a session detail surfaces on the
//! status line.

use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use ucap::catalog::VoiceOption;
use ucap::history::HISTORY_CAP;
use ucap::session::{PlaybackStatus, SessionController, MULTIPLIER_MAX, MULTIPLIER_MIN};
use ucap::speech::{EngineEvent, EngineFeatures, SpeakRequest, SpeechEngine, UtteranceId};
use ucap::state::config::Config;
use ucap::state::State;
use ucap::{Result, UcapError};

/// Engine call log, for assertions.
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Speak { text: String, rate: f32, pitch: f32 },
    Cancel,
    Pause,
    Resume,
}

/// In-memory engine that records calls and hands out sequential ids.
/// The voice list sits behind a shared handle so a test can grow it
/// after the engine has been boxed away.
struct MockEngine {
    calls: Arc<Mutex<Vec<Call>>>,
    voices: Arc<Mutex<Vec<VoiceOption>>>,
    features: EngineFeatures,
    next_id: u64,
    fail_speak: bool,
}

impl SpeechEngine for MockEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn features(&self) -> EngineFeatures {
        self.features
    }

    fn voices(&mut self) -> Result<Vec<VoiceOption>> {
        Ok(self.voices.lock().unwrap().clone())
    }

    fn speak(&mut self, request: &SpeakRequest) -> Result<UtteranceId> {
        if self.fail_speak {
            return Err(UcapError::Engine("scripted speak failure".to_string()));
        }
        self.calls.lock().unwrap().push(Call::Speak {
            text: request.text.clone(),
            rate: request.rate,
            pitch: request.pitch,
        });
        self.next_id += 1;
        Ok(UtteranceId(self.next_id))
    }

    fn cancel(&mut self) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Cancel);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Pause);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Resume);
        Ok(())
    }
}

fn sample_voices() -> Vec<VoiceOption> {
    vec![
        VoiceOption::with_id("en-1", "Alice", "en-US"),
        VoiceOption::with_id("id-1", "Budi", "id-ID"),
    ]
}

fn full_features() -> EngineFeatures {
    EngineFeatures {
        rate: true,
        pitch: true,
        voice: true,
        pause: true,
        utterance_events: true,
    }
}

fn controller_with(voices: Vec<VoiceOption>) -> (SessionController, Arc<Mutex<Vec<Call>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let engine = MockEngine {
        calls: Arc::clone(&calls),
        voices: Arc::new(Mutex::new(voices)),
        features: full_features(),
        next_id: 0,
        fail_speak: false,
    };
    let mut controller = SessionController::new(Some(Box::new(engine)), "id", 1.0, 1.0);
    controller.refresh_voices().expect("mock voices load");
    (controller, calls)
}

/// State wrapper over a scratch config and an engine with the given
/// capability flags.
fn state_with_features(dir: &TempDir, features: EngineFeatures) -> State {
    let engine = MockEngine {
        calls: Arc::new(Mutex::new(Vec::new())),
        voices: Arc::new(Mutex::new(sample_voices())),
        features,
        next_id: 0,
        fail_speak: false,
    };
    let config = Config::load_from(dir.path().join(".ucap.cfg")).expect("scratch config");
    let mut state = State::new(config, Some(Box::new(engine)));
    state.controller.refresh_voices().expect("mock voices load");
    state
}

fn calls_of(calls: &Arc<Mutex<Vec<Call>>>) -> Vec<Call> {
    calls.lock().unwrap().clone()
}

#[test]
fn test_speak_goes_live_and_records_history() {
    let (mut controller, calls) = controller_with(sample_voices());
    controller.set_text("halo dunia");

    assert!(controller.speak(None).unwrap());
    assert_eq!(controller.status(), PlaybackStatus::Speaking);
    assert!(controller.session().live.is_some());

    let history = controller.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history.get(0).unwrap().text, "halo dunia");
    assert_eq!(history.get(0).unwrap().voice_label, "Budi · id-ID");

    assert_eq!(
        calls_of(&calls),
        vec![Call::Speak {
            text: "halo dunia".to_string(),
            rate: 1.0,
            pitch: 1.0,
        }]
    );
}

#[test]
fn test_speak_trims_surrounding_whitespace() {
    let (mut controller, calls) = controller_with(sample_voices());
    controller.set_text("  halo \n");

    assert!(controller.speak(None).unwrap());
    assert_eq!(controller.history().get(0).unwrap().text, "halo");
    assert!(matches!(
        calls_of(&calls)[0],
        Call::Speak { ref text, .. } if text == "halo"
    ));
}

#[test]
fn test_blank_text_is_a_quiet_no_op() {
    let (mut controller, calls) = controller_with(sample_voices());
    controller.set_text("   \t  ");

    assert!(!controller.speak(None).unwrap());
    assert_eq!(controller.status(), PlaybackStatus::Idle);
    assert!(controller.history().is_empty());
    assert!(calls_of(&calls).is_empty(), "nothing reaches the engine");
}

#[test]
fn test_blank_speak_does_not_disturb_playback() {
    let (mut controller, calls) = controller_with(sample_voices());
    controller.set_text("halo");
    controller.speak(None).unwrap();

    controller.set_text("   ");
    assert!(!controller.speak(None).unwrap());
    assert_eq!(controller.status(), PlaybackStatus::Speaking);
    assert!(
        !calls_of(&calls).contains(&Call::Cancel),
        "a rejected speak must not cancel the live utterance"
    );
}

#[test]
fn test_no_voice_is_a_quiet_no_op() {
    let (mut controller, calls) = controller_with(Vec::new());
    controller.set_text("halo");

    assert!(!controller.speak(None).unwrap());
    assert_eq!(controller.status(), PlaybackStatus::Idle);
    assert!(calls_of(&calls).is_empty());
}

#[test]
fn test_missing_engine_ignores_every_operation() {
    let mut controller = SessionController::new(None, "id", 1.0, 1.0);
    assert!(!controller.is_supported());

    controller.set_text("halo");
    assert!(!controller.speak(None).unwrap());
    controller.stop().unwrap();
    controller.toggle_pause().unwrap();
    controller.refresh_voices().unwrap();

    assert_eq!(controller.status(), PlaybackStatus::Idle);
    assert!(controller.history().is_empty());
}

#[test]
fn test_new_speak_replaces_the_live_utterance() {
    let (mut controller, calls) = controller_with(sample_voices());
    controller.set_text("one");
    controller.speak(None).unwrap();
    let first = controller.session().live.expect("first utterance live");

    controller.set_text("two");
    controller.speak(None).unwrap();

    assert_eq!(controller.status(), PlaybackStatus::Speaking);
    assert_ne!(controller.session().live, Some(first));

    let recorded = calls_of(&calls);
    assert_eq!(recorded[1], Call::Cancel, "old utterance is cancelled first");
    assert!(matches!(recorded[2], Call::Speak { ref text, .. } if text == "two"));
    assert_eq!(controller.history().len(), 2);
    assert_eq!(controller.history().get(0).unwrap().text, "two");
}

#[test]
fn test_late_signal_for_a_replaced_utterance_is_stale() {
    let (mut controller, _calls) = controller_with(sample_voices());
    controller.set_text("one");
    controller.speak(None).unwrap();
    let first = controller.session().live.unwrap();

    controller.set_text("two");
    controller.speak(None).unwrap();

    // The cancelled utterance reports in after its replacement started.
    controller.handle_event(EngineEvent::Finished(first)).unwrap();
    assert_eq!(
        controller.status(),
        PlaybackStatus::Speaking,
        "a stale completion must not idle the replacement"
    );
}

#[test]
fn test_finished_signal_lands_idle() {
    let (mut controller, _calls) = controller_with(sample_voices());
    controller.set_text("halo");
    controller.speak(None).unwrap();
    let id = controller.session().live.unwrap();

    controller.handle_event(EngineEvent::Finished(id)).unwrap();
    assert_eq!(controller.status(), PlaybackStatus::Idle);
    assert!(controller.session().live.is_none());
}

#[test]
fn test_failure_signal_lands_idle_without_erroring() {
    let (mut controller, _calls) = controller_with(sample_voices());
    controller.set_text("halo");
    controller.speak(None).unwrap();
    let id = controller.session().live.unwrap();

    controller
        .handle_event(EngineEvent::Failed {
            id,
            reason: "device vanished".to_string(),
        })
        .unwrap();
    assert_eq!(controller.status(), PlaybackStatus::Idle);
    assert!(controller.session().live.is_none());
}

#[test]
fn test_unknown_signal_ids_are_dropped() {
    let (mut controller, _calls) = controller_with(sample_voices());
    controller.set_text("halo");
    controller.speak(None).unwrap();

    controller
        .handle_event(EngineEvent::Finished(UtteranceId(999)))
        .unwrap();
    assert_eq!(controller.status(), PlaybackStatus::Speaking);
}

#[test]
fn test_stop_cancels_and_is_idempotent() {
    let (mut controller, calls) = controller_with(sample_voices());
    controller.set_text("halo");
    controller.speak(None).unwrap();

    controller.stop().unwrap();
    assert_eq!(controller.status(), PlaybackStatus::Idle);
    assert!(controller.session().live.is_none());
    assert!(calls_of(&calls).contains(&Call::Cancel));

    controller.stop().unwrap();
    assert_eq!(controller.status(), PlaybackStatus::Idle);
}

#[test]
fn test_toggle_pause_cycles_and_ignores_idle() {
    let (mut controller, calls) = controller_with(sample_voices());

    controller.toggle_pause().unwrap();
    assert_eq!(controller.status(), PlaybackStatus::Idle);
    assert!(
        calls_of(&calls).is_empty(),
        "an idle toggle never reaches the engine"
    );

    controller.set_text("halo");
    controller.speak(None).unwrap();
    let live = controller.session().live;

    controller.toggle_pause().unwrap();
    assert_eq!(controller.status(), PlaybackStatus::Paused);
    assert_eq!(controller.session().live, live);
    controller.toggle_pause().unwrap();
    assert_eq!(controller.status(), PlaybackStatus::Speaking);
    assert_eq!(
        controller.session().live,
        live,
        "toggling never touches the live id"
    );

    let recorded = calls_of(&calls);
    assert!(recorded.contains(&Call::Pause));
    assert!(recorded.contains(&Call::Resume));
}

#[test]
fn test_stop_while_paused_lands_idle() {
    let (mut controller, _calls) = controller_with(sample_voices());
    controller.set_text("halo");
    controller.speak(None).unwrap();
    controller.toggle_pause().unwrap();

    controller.stop().unwrap();
    assert_eq!(controller.status(), PlaybackStatus::Idle);
}

#[test]
fn test_completion_while_paused_still_lands_idle() {
    let (mut controller, _calls) = controller_with(sample_voices());
    controller.set_text("halo");
    controller.speak(None).unwrap();
    controller.toggle_pause().unwrap();
    let id = controller.session().live.expect("paused utterance stays live");

    // A backend with an emulated pause lets the audio run out mid-pause.
    controller.handle_event(EngineEvent::Finished(id)).unwrap();
    assert_eq!(controller.status(), PlaybackStatus::Idle);
    assert!(controller.session().live.is_none());
}

#[test]
fn test_platform_speak_failure_is_absorbed() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let engine = MockEngine {
        calls: Arc::clone(&calls),
        voices: Arc::new(Mutex::new(sample_voices())),
        features: full_features(),
        next_id: 0,
        fail_speak: true,
    };
    let mut controller = SessionController::new(Some(Box::new(engine)), "id", 1.0, 1.0);
    controller.refresh_voices().unwrap();
    controller.set_text("halo");

    assert!(
        !controller.speak(None).unwrap(),
        "failure reports as not spoken"
    );
    assert_eq!(controller.status(), PlaybackStatus::Idle);
    assert!(controller.session().live.is_none());
    assert!(
        controller.history().is_empty(),
        "nothing spoken, nothing recorded"
    );
}

#[test]
fn test_replay_appends_a_fresh_entry() {
    let (mut controller, _calls) = controller_with(sample_voices());
    controller.set_text("satu");
    controller.speak(None).unwrap();
    controller.set_text("dua");
    controller.speak(None).unwrap();

    // Position 1 is the older entry, "satu".
    assert!(controller.replay(1).unwrap());
    assert_eq!(controller.history().len(), 3);
    assert_eq!(controller.history().get(0).unwrap().text, "satu");
    assert_eq!(controller.history().get(2).unwrap().text, "satu");
    assert_ne!(
        controller.history().get(0).unwrap().id,
        controller.history().get(2).unwrap().id,
        "replay records a new entry instead of touching the old one"
    );
    assert_eq!(controller.status(), PlaybackStatus::Speaking);
}

#[test]
fn test_replay_out_of_range_is_a_quiet_no_op() {
    let (mut controller, _calls) = controller_with(sample_voices());
    assert!(!controller.replay(0).unwrap());
    assert_eq!(controller.status(), PlaybackStatus::Idle);
}

#[test]
fn test_history_keeps_only_the_newest_entries() {
    let (mut controller, _calls) = controller_with(sample_voices());
    for i in 1..=HISTORY_CAP + 3 {
        controller.set_text(&format!("line {}", i));
        controller.speak(None).unwrap();
    }

    let history = controller.history();
    assert_eq!(history.len(), HISTORY_CAP);
    assert_eq!(
        history.get(0).unwrap().text,
        format!("line {}", HISTORY_CAP + 3)
    );
    assert_eq!(
        history.get(HISTORY_CAP - 1).unwrap().text,
        "line 4",
        "the three oldest entries fell off"
    );
}

#[test]
fn test_auto_selection_prefers_the_language_prefix() {
    let (controller, _calls) = controller_with(sample_voices());
    let selected = controller.catalog().selected().expect("a default voice");
    assert_eq!(selected.id, "id-1");
}

#[test]
fn test_refresh_never_replaces_the_users_choice() {
    let (mut controller, _calls) = controller_with(sample_voices());
    let alice = controller.select_voice(0).expect("voice at position 0");
    assert_eq!(alice.name, "Alice");

    controller.refresh_voices().unwrap();
    assert_eq!(
        controller.catalog().selected().unwrap().name,
        "Alice",
        "a refresh keeps the explicit selection"
    );
}

#[test]
fn test_voices_changed_signal_reenumerates_the_catalog() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let voices = Arc::new(Mutex::new(sample_voices()));
    let engine = MockEngine {
        calls: Arc::clone(&calls),
        voices: Arc::clone(&voices),
        features: full_features(),
        next_id: 0,
        fail_speak: false,
    };
    let mut controller = SessionController::new(Some(Box::new(engine)), "id", 1.0, 1.0);
    controller.refresh_voices().unwrap();
    assert_eq!(controller.catalog().len(), 2);

    // The platform grew a voice after startup.
    voices
        .lock()
        .unwrap()
        .push(VoiceOption::with_id("jv-1", "Sari", "jv-ID"));
    controller.handle_event(EngineEvent::VoicesChanged).unwrap();

    assert_eq!(controller.catalog().len(), 3, "the signal re-enumerates");
    assert_eq!(
        controller.catalog().selected().unwrap().id,
        "id-1",
        "re-enumeration keeps the selection"
    );
}

#[test]
fn test_status_line_reports_missing_capabilities() {
    let dir = TempDir::new().expect("temp dir");

    let state = state_with_features(&dir, full_features());
    assert!(!state.status_summary().contains("lacks"));

    let state = state_with_features(
        &dir,
        EngineFeatures {
            pause: false,
            utterance_events: false,
            ..full_features()
        },
    );
    let summary = state.status_summary();
    assert!(summary.contains("engine mock"), "{}", summary);
    assert!(
        summary.ends_with("lacks pause, completion signals"),
        "{}",
        summary
    );
}

#[test]
fn test_rate_and_pitch_are_clamped_before_the_engine_sees_them() {
    let (mut controller, calls) = controller_with(sample_voices());
    controller.set_rate(99.0);
    controller.set_pitch(0.0);
    controller.set_text("halo");
    controller.speak(None).unwrap();

    assert_eq!(
        calls_of(&calls)[0],
        Call::Speak {
            text: "halo".to_string(),
            rate: MULTIPLIER_MAX,
            pitch: MULTIPLIER_MIN,
        }
    );
}
