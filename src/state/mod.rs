//! Application state management
//!
//! [`State`] is what the event loop and the key handlers share: the
//! configuration, the session controller, and the modal handler stack.
//! Session rules live in the controller; this layer adds the user-facing
//! reactions around controller calls: prompt redraws, notices, menu
//! listings, and config persistence.

pub mod config;

use crate::input::HandlerStack;
use crate::session::SessionController;
use crate::speech::{EngineEvent, SpeechEngine};
use crate::ui;
use crate::Result;
use config::Config;
use log::{info, warn};

/// Everything the event loop hands to key handlers.
pub struct State {
    /// Configuration loaded from ~/.ucap.cfg
    pub config: Config,

    /// The voice session: status, text, voices, history, engine
    pub controller: SessionController,

    /// Key handler stack for modal input
    /// Lets the voice picker, history, and settings menus intercept keys
    pub handlers: HandlerStack,

    /// Set by the quit command; the main loop exits when it sees this
    pub quit: bool,
}

impl State {
    /// Build application state around an already-created engine (or none,
    /// when the platform cannot speak). Startup defaults come from config.
    pub fn new(config: Config, engine: Option<Box<dyn SpeechEngine>>) -> Self {
        info!("Configuration loaded from {:?}", config.path());
        info!("  rate: {:.2}, pitch: {:.2}", config.rate(), config.pitch());
        info!("  preferred language: {}", config.preferred_lang());
        info!("  backend: {}", config.backend());

        let controller = SessionController::new(
            engine,
            &config.preferred_lang(),
            config.rate(),
            config.pitch(),
        );

        Self {
            config,
            controller,
            handlers: HandlerStack::new(),
            quit: false,
        }
    }

    /// Save configuration to disk
    ///
    /// Called whenever a setting changes
    pub fn save_config(&self) -> Result<()> {
        self.config.save()
    }

    /// Print a message line and restore the prompt under it.
    pub fn notify(&self, message: &str) {
        ui::print_line(message);
        self.redraw_prompt();
    }

    /// Redraw the prompt line: status tag plus the text field.
    pub fn redraw_prompt(&self) {
        let tag = if self.controller.is_supported() {
            self.controller.status().to_string()
        } else {
            "no speech".to_string()
        };
        ui::redraw_prompt(&tag, self.controller.text());
    }

    /// One-line session summary for the status key and the startup banner.
    /// Capabilities the engine reports missing are listed at the end.
    pub fn status_summary(&self) -> String {
        let Some(engine) = self.controller.engine_name() else {
            return ui::UNSUPPORTED_NOTICE.to_string();
        };
        let voice = self
            .controller
            .catalog()
            .selected()
            .map(|v| v.label())
            .unwrap_or_else(|| "no voice".to_string());
        let mut summary = format!(
            "{} | rate {:.2} | pitch {:.2} | {} voices | engine {}",
            voice,
            self.controller.rate(),
            self.controller.pitch(),
            self.controller.catalog().len(),
            engine
        );
        if let Some(missing) = self.missing_features() {
            summary.push_str(&format!(" | lacks {}", missing));
        }
        summary
    }

    /// Comma list of the capabilities the engine reports missing, None
    /// when it has them all.
    fn missing_features(&self) -> Option<String> {
        let features = self.controller.engine_features()?;
        let mut missing = Vec::new();
        if !features.rate {
            missing.push("rate");
        }
        if !features.pitch {
            missing.push("pitch");
        }
        if !features.voice {
            missing.push("voice selection");
        }
        if !features.pause {
            missing.push("pause");
        }
        if !features.utterance_events {
            missing.push("completion signals");
        }
        if missing.is_empty() {
            None
        } else {
            Some(missing.join(", "))
        }
    }

    /// Feed one engine signal to the controller, updating the prompt when
    /// the status visibly changes (an utterance finishing, mostly).
    pub fn apply_engine_event(&mut self, event: EngineEvent) -> Result<()> {
        let before = self.controller.status();
        self.controller.handle_event(event)?;
        if self.controller.status() != before {
            self.redraw_prompt();
        }
        Ok(())
    }

    /// Speak the text field.
    pub fn speak_text(&mut self) -> Result<()> {
        if !self.controller.is_supported() {
            self.notify(ui::UNSUPPORTED_NOTICE);
            return Ok(());
        }
        self.controller.speak(None)?;
        self.redraw_prompt();
        Ok(())
    }

    /// Stop playback.
    pub fn stop_speech(&mut self) -> Result<()> {
        if !self.controller.is_supported() {
            self.notify(ui::UNSUPPORTED_NOTICE);
            return Ok(());
        }
        self.controller.stop()?;
        self.redraw_prompt();
        Ok(())
    }

    /// Pause or resume playback.
    pub fn toggle_pause(&mut self) -> Result<()> {
        if !self.controller.is_supported() {
            self.notify(ui::UNSUPPORTED_NOTICE);
            return Ok(());
        }
        self.controller.toggle_pause()?;
        self.redraw_prompt();
        Ok(())
    }

    /// Append typed characters to the text field.
    pub fn insert_text(&mut self, s: &str) {
        self.controller.push_str(s);
        self.redraw_prompt();
    }

    /// Remove the last character of the text field.
    pub fn backspace(&mut self) {
        if self.controller.backspace() {
            self.redraw_prompt();
        }
    }

    /// Empty the text field.
    pub fn clear_text(&mut self) {
        self.controller.clear_text();
        self.redraw_prompt();
    }

    /// Paste the clipboard into the text field. Newlines flatten to
    /// spaces; the field is a single line.
    pub fn paste_clipboard(&mut self) -> Result<()> {
        let text = match crate::clipboard::paste_from_clipboard() {
            Ok(text) => text,
            Err(e) => {
                warn!("clipboard paste failed: {}", e);
                self.notify("clipboard is not available");
                return Ok(());
            }
        };
        let flattened = text.replace(['\r', '\n'], " ");
        self.controller.push_str(&flattened);
        self.redraw_prompt();
        Ok(())
    }

    /// Copy the text field to the clipboard.
    pub fn copy_text(&self) -> Result<()> {
        let text = self.controller.text();
        if text.is_empty() {
            self.notify("nothing to copy");
            return Ok(());
        }
        if let Err(e) = crate::clipboard::copy_to_clipboard(text) {
            warn!("clipboard copy failed: {}", e);
            self.notify("clipboard is not available");
            return Ok(());
        }
        self.notify("copied");
        Ok(())
    }

    /// Step the rate by `delta` and persist the result.
    pub fn nudge_rate(&mut self, delta: f32) -> Result<()> {
        self.controller.nudge_rate(delta);
        self.persist_speech_settings()?;
        self.notify(&format!("rate {:.2}", self.controller.rate()));
        Ok(())
    }

    /// Step the pitch by `delta` and persist the result.
    pub fn nudge_pitch(&mut self, delta: f32) -> Result<()> {
        self.controller.nudge_pitch(delta);
        self.persist_speech_settings()?;
        self.notify(&format!("pitch {:.2}", self.controller.pitch()));
        Ok(())
    }

    /// Set the rate from the settings prompt and persist it.
    pub fn apply_rate(&mut self, value: f32) -> Result<()> {
        self.controller.set_rate(value);
        self.persist_speech_settings()?;
        self.notify(&format!("rate {:.2}", self.controller.rate()));
        Ok(())
    }

    /// Set the pitch from the settings prompt and persist it.
    pub fn apply_pitch(&mut self, value: f32) -> Result<()> {
        self.controller.set_pitch(value);
        self.persist_speech_settings()?;
        self.notify(&format!("pitch {:.2}", self.controller.pitch()));
        Ok(())
    }

    /// Change the preferred voice language and persist it. Affects which
    /// voice gets auto-selected on future refreshes, not the current one.
    pub fn apply_preferred_lang(&mut self, tag: &str) -> Result<()> {
        self.controller.set_preferred_lang(tag);
        self.config.set("speech", "preferred_lang", tag);
        self.save_config()?;
        self.notify(&format!("preferred language: {}", tag));
        Ok(())
    }

    /// Write the current rate and pitch back to the config file.
    fn persist_speech_settings(&mut self) -> Result<()> {
        self.config
            .set("speech", "rate", &format!("{:.2}", self.controller.rate()));
        self.config
            .set("speech", "pitch", &format!("{:.2}", self.controller.pitch()));
        self.save_config()
    }

    /// Select a voice by its picker row (1-based).
    pub fn choose_voice(&mut self, position: usize) {
        let selected = position
            .checked_sub(1)
            .and_then(|idx| self.controller.select_voice(idx));
        match selected {
            Some(voice) => self.notify(&format!("voice: {}", voice.label())),
            None => self.notify("no such voice"),
        }
    }

    /// Replay a history entry by its listing row (1-based).
    pub fn replay_entry(&mut self, position: usize) -> Result<()> {
        let spoke = match position.checked_sub(1) {
            Some(idx) => self.controller.replay(idx)?,
            None => false,
        };
        if spoke {
            self.redraw_prompt();
        } else {
            self.notify("nothing to replay");
        }
        Ok(())
    }

    /// Reload the voice list from the engine.
    pub fn refresh_voices(&mut self) -> Result<()> {
        if !self.controller.is_supported() {
            self.notify(ui::UNSUPPORTED_NOTICE);
            return Ok(());
        }
        if let Err(e) = self.controller.refresh_voices() {
            warn!("voice refresh failed: {}", e);
            self.notify("could not read the voice list");
            return Ok(());
        }
        self.notify(&format!("{} voices", self.controller.catalog().len()));
        Ok(())
    }

    /// Print the status line.
    pub fn announce_status(&self) {
        let summary = self.status_summary();
        self.notify(&summary);
    }

    /// Print the key reference.
    pub fn show_help(&self) {
        for line in ui::KEY_HELP {
            ui::print_line(line);
        }
        self.redraw_prompt();
    }

    /// Print the voice listing and switch the prompt to the picker.
    /// Returns false (after a notice) when there is nothing to pick.
    pub fn show_voice_menu(&self) -> bool {
        if !self.controller.is_supported() {
            self.notify(ui::UNSUPPORTED_NOTICE);
            return false;
        }
        let catalog = self.controller.catalog();
        if catalog.is_empty() {
            self.notify("no voices; alt+r reloads the list");
            return false;
        }
        let width = ui::listing_width();
        let selected_id = catalog.selected().map(|v| v.id.as_str());
        ui::print_line("voices:");
        for (i, voice) in catalog.voices().iter().enumerate() {
            let marked = selected_id == Some(voice.id.as_str());
            ui::print_line(&ui::format_voice_line(i + 1, voice, marked, width));
        }
        ui::print_line("row number then enter selects; esc closes");
        ui::redraw_prompt("voice", "");
        true
    }

    /// Print the history listing and switch the prompt to the list.
    /// Returns false (after a notice) when the history is empty.
    pub fn show_history_menu(&self) -> bool {
        let history = self.controller.history();
        if history.is_empty() {
            self.notify("history is empty");
            return false;
        }
        let width = ui::listing_width();
        ui::print_line("history (most recent first):");
        for (i, item) in history.items().enumerate() {
            ui::print_line(&ui::format_history_line(i + 1, item, width));
        }
        ui::print_line("row number then enter replays; esc closes");
        ui::redraw_prompt("history", "");
        true
    }

    /// Print the settings menu and switch the prompt to it.
    pub fn show_settings_menu(&self) {
        ui::print_line("settings:");
        ui::print_line(&format!(
            "  r  rate multiplier (now {:.2})",
            self.controller.rate()
        ));
        ui::print_line(&format!(
            "  p  pitch multiplier (now {:.2})",
            self.controller.pitch()
        ));
        ui::print_line(&format!(
            "  l  preferred voice language (now {})",
            self.controller.catalog().preferred_lang()
        ));
        ui::print_line("  enter or esc leaves the menu");
        ui::redraw_prompt("settings", "");
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }
}
