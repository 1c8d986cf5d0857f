//! Speak one phrase and wait for the engine to report it finished
//!
//! Run with: cargo run --example speak_once [text..]

use std::sync::mpsc;
use std::time::Duration;

use anyhow::{bail, Context};
use ucap::speech::{create_engine, BackendChoice, EngineEvent, SpeakRequest};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let text: String = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let text = if text.is_empty() {
        "ucap speech check".to_string()
    } else {
        text
    };

    println!("Creating speech engine...");
    let (events_tx, events_rx) = mpsc::channel();
    let mut engine =
        create_engine(events_tx, BackendChoice::Auto).context("no speech engine available")?;
    println!("✓ engine: {}", engine.name());

    let voices = engine.voices().context("listing voices")?;
    println!("✓ {} voices", voices.len());
    let Some(voice) = voices
        .iter()
        .find(|v| v.lang.starts_with("id"))
        .or_else(|| voices.first())
    else {
        bail!("engine reported no voices");
    };
    println!("using {}", voice.label());

    let id = engine.speak(&SpeakRequest {
        text,
        voice_id: voice.id.clone(),
        lang: voice.lang.clone(),
        rate: 1.0,
        pitch: 1.0,
    })?;
    println!("speaking as {}...", id);

    match events_rx.recv_timeout(Duration::from_secs(30)) {
        Ok(EngineEvent::Finished(done)) if done == id => println!("✓ finished"),
        Ok(event) => println!("engine signal: {:?}", event),
        Err(_) => println!("⚠ no completion signal (this engine may not report utterance ends)"),
    }
    Ok(())
}
