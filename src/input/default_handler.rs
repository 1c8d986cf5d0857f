//! Default key handler for the scratchpad
//!
//! Printable keys go into the text field; the bound control and alt
//! combinations run session commands or open a modal menu on the
//! handler stack. Unbound escape sequences (arrows, function keys) are
//! dropped so they cannot leak bytes into the text.

use super::{HandlerAction, KeyAction};
use crate::session::MULTIPLIER_STEP;
use crate::state::State;
use crate::Result;
use log::{debug, trace};
use std::collections::HashMap;

/// Default key handler for scratchpad commands
///
/// This is the base handler that runs whenever no modal menu is active.
pub struct DefaultKeyHandler {
    /// Key bindings map
    keymap: HashMap<Vec<u8>, KeyAction>,
}

impl DefaultKeyHandler {
    /// Create a new default key handler
    pub fn new(keymap: HashMap<Vec<u8>, KeyAction>) -> Self {
        debug!(
            "Creating default key handler with {} bindings",
            keymap.len()
        );
        Self { keymap }
    }

    /// Process a key with the scratchpad's bindings
    ///
    /// Bound keys run their command; unbound printable input lands in
    /// the text field.
    pub fn process_key(&mut self, key: &[u8], state: &mut State) -> Result<HandlerAction> {
        if let Some(action) = self.keymap.get(key).cloned() {
            trace!("Key action: {:?}", action);
            return self.execute_action(&action, state);
        }

        if key.starts_with(b"\x1b") {
            debug!("Ignoring unbound escape sequence {:?}", key);
            return Ok(HandlerAction::Handled);
        }

        match std::str::from_utf8(key) {
            Ok(s) => {
                let printable: String = s.chars().filter(|c| !c.is_control()).collect();
                if !printable.is_empty() {
                    state.insert_text(&printable);
                }
            }
            Err(_) => debug!("Ignoring non-utf8 input {:?}", key),
        }
        Ok(HandlerAction::Handled)
    }

    /// Execute a scratchpad command
    fn execute_action(&mut self, action: &KeyAction, state: &mut State) -> Result<HandlerAction> {
        use KeyAction::*;

        match action {
            Speak => {
                debug!("Speak");
                state.speak_text()?;
            }
            Stop => {
                debug!("Stop");
                state.stop_speech()?;
            }
            TogglePause => {
                debug!("Toggle pause");
                state.toggle_pause()?;
            }

            // Menus - push a modal handler onto the stack
            VoiceMenu => {
                debug!("Voice menu");
                if state.show_voice_menu() {
                    state
                        .handlers
                        .push(Box::new(super::voice_handler::VoiceHandler::new()));
                }
            }
            HistoryMenu => {
                debug!("History menu");
                if state.show_history_menu() {
                    state
                        .handlers
                        .push(Box::new(super::history_handler::HistoryHandler::new()));
                }
            }
            SettingsMenu => {
                debug!("Settings menu");
                state.show_settings_menu();
                state
                    .handlers
                    .push(Box::new(super::config_handler::ConfigHandler::new()));
            }

            RateDown => state.nudge_rate(-MULTIPLIER_STEP)?,
            RateUp => state.nudge_rate(MULTIPLIER_STEP)?,
            PitchDown => state.nudge_pitch(-MULTIPLIER_STEP)?,
            PitchUp => state.nudge_pitch(MULTIPLIER_STEP)?,

            Backspace => state.backspace(),
            ClearText => {
                debug!("Clear text");
                state.clear_text();
            }
            Paste => {
                debug!("Paste");
                state.paste_clipboard()?;
            }
            CopyText => {
                debug!("Copy");
                state.copy_text()?;
            }

            RefreshVoices => {
                debug!("Refresh voices");
                state.refresh_voices()?;
            }
            Status => state.announce_status(),
            Help => state.show_help(),
            Redraw => state.redraw_prompt(),
            Quit => {
                debug!("Quit requested");
                state.request_quit();
            }
        }

        Ok(HandlerAction::Handled)
    }
}
