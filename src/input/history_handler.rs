//! History list handler
//!
//! Modal handler for the utterance history (alt+h). The listing is
//! printed most recent first when the list opens; this handler collects
//! a row number and replays that entry with the current voice and
//! settings.

use super::{HandlerAction, KeyHandler};
use crate::state::State;
use crate::ui;
use crate::Result;
use log::debug;

/// History list key handler
///
/// Digits build a row number, Enter replays it, Esc leaves the list.
pub struct HistoryHandler {
    /// Row number typed so far
    buffer: String,
}

impl Default for HistoryHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryHandler {
    /// Create a new history handler
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }
}

impl KeyHandler for HistoryHandler {
    fn process(&mut self, key: &[u8], state: &mut State) -> Result<HandlerAction> {
        match key {
            // Enter replays the typed row
            b"\r" | b"\n" => {
                match self.buffer.parse::<usize>() {
                    Ok(position) => state.replay_entry(position)?,
                    Err(_) => state.redraw_prompt(),
                }
                Ok(HandlerAction::Remove)
            }

            // Esc leaves the list
            b"\x1b" => {
                debug!("history list closed");
                state.redraw_prompt();
                Ok(HandlerAction::Remove)
            }

            // Quit keys work from inside the list
            b"\x1bq" | b"\x03" => Ok(HandlerAction::Passthrough),

            // Backspace edits the row number
            b"\x08" | b"\x7f" => {
                self.buffer.pop();
                ui::redraw_prompt("history", &self.buffer);
                Ok(HandlerAction::Handled)
            }

            // Digits build the row number; everything else is ignored
            _ => {
                if let Ok(s) = std::str::from_utf8(key) {
                    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
                    if !digits.is_empty() {
                        self.buffer.push_str(&digits);
                        ui::redraw_prompt("history", &self.buffer);
                    }
                }
                Ok(HandlerAction::Handled)
            }
        }
    }
}
