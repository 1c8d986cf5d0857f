//! Voice picker handler
//!
//! Modal handler for the voice list (alt+v). The listing is printed when
//! the picker opens; this handler collects a row number and selects that
//! voice.

use super::{HandlerAction, KeyHandler};
use crate::state::State;
use crate::ui;
use crate::Result;
use log::debug;

/// Voice picker key handler
///
/// Digits build a row number, Enter selects it, Esc leaves the picker.
pub struct VoiceHandler {
    /// Row number typed so far
    buffer: String,
}

impl Default for VoiceHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceHandler {
    /// Create a new voice picker handler
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }
}

impl KeyHandler for VoiceHandler {
    fn process(&mut self, key: &[u8], state: &mut State) -> Result<HandlerAction> {
        match key {
            // Enter selects the typed row
            b"\r" | b"\n" => {
                match self.buffer.parse::<usize>() {
                    Ok(position) => state.choose_voice(position),
                    Err(_) => state.redraw_prompt(),
                }
                Ok(HandlerAction::Remove)
            }

            // Esc leaves the picker
            b"\x1b" => {
                debug!("voice picker closed");
                state.redraw_prompt();
                Ok(HandlerAction::Remove)
            }

            // Quit keys work from inside the picker
            b"\x1bq" | b"\x03" => Ok(HandlerAction::Passthrough),

            // Backspace edits the row number
            b"\x08" | b"\x7f" => {
                self.buffer.pop();
                ui::redraw_prompt("voice", &self.buffer);
                Ok(HandlerAction::Handled)
            }

            // Digits build the row number; everything else is ignored
            _ => {
                if let Ok(s) = std::str::from_utf8(key) {
                    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
                    if !digits.is_empty() {
                        self.buffer.push_str(&digits);
                        ui::redraw_prompt("voice", &self.buffer);
                    }
                }
                Ok(HandlerAction::Handled)
            }
        }
    }
}
