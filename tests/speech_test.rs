//! Speech backend smoke tests
//!
//! These create a real platform engine where one exists. Headless CI has
//! no speech stack, so initialization failures are reported and skipped,
//! never fatal.

use std::sync::mpsc;

use ucap::speech::{create_engine, BackendChoice, SpeakRequest};

#[test]
fn test_create_platform_engine() {
    let (tx, _rx) = mpsc::channel();

    match create_engine(tx, BackendChoice::Auto) {
        Ok(engine) => {
            println!("✓ created {} backend", engine.name());
            let features = engine.features();
            println!(
                "  rate {} pitch {} voice {} pause {} events {}",
                features.rate,
                features.pitch,
                features.voice,
                features.pause,
                features.utterance_events
            );
            drop(engine);
        }
        Err(e) => {
            // Expected in CI and other headless environments
            println!("⚠ no speech backend here (may be expected): {}", e);
        }
    }
}

#[test]
fn test_voices_and_basic_operations() {
    let (tx, _rx) = mpsc::channel();

    let Ok(mut engine) = create_engine(tx, BackendChoice::Auto) else {
        println!("⚠ Skipping voice tests (no speech backend)");
        return;
    };

    let voices = match engine.voices() {
        Ok(v) => v,
        Err(e) => {
            println!("⚠ Skipping voice tests (listing failed: {})", e);
            return;
        }
    };
    println!("✓ {} voices listed", voices.len());
    for voice in voices.iter().take(3) {
        assert!(!voice.id.is_empty(), "every voice carries an id");
        assert!(!voice.lang.is_empty(), "every voice carries a language tag");
    }

    let Some(voice) = voices.first() else {
        println!("⚠ Skipping speak test (no voices installed)");
        return;
    };

    let request = SpeakRequest {
        text: "integration check".to_string(),
        voice_id: voice.id.clone(),
        lang: voice.lang.clone(),
        rate: 1.0,
        pitch: 1.0,
    };
    match engine.speak(&request) {
        Ok(id) => {
            println!("✓ speaking as {}", id);
            assert!(engine.cancel().is_ok(), "cancel after speak");
        }
        Err(e) => println!("⚠ speak failed (may be expected headless): {}", e),
    }

    // A second cancel with nothing in flight must be harmless
    assert!(engine.cancel().is_ok());
}

#[test]
fn test_forced_backend_reports_availability() {
    // Forcing a missing backend must produce an error, not a panic or a
    // silent fallback to another backend.
    let (tx, _rx) = mpsc::channel();
    match create_engine(tx, BackendChoice::Espeak) {
        Ok(engine) => println!("✓ espeak-ng available: {}", engine.name()),
        Err(e) => println!("⚠ espeak-ng not installed: {}", e),
    }
}
