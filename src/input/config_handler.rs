//! Settings menu handler
//!
//! Modal handler for the settings menu (alt+c). Rate, pitch, and the
//! preferred voice language persist to the config file when they change.
//! The value prompts replace the menu, so after accepting a value the
//! user is back at the scratchpad.

use super::buffer_handler::BufferHandler;
use super::{HandlerAction, KeyHandler};
use crate::state::State;
use crate::Result;
use log::debug;

/// Settings menu key handler
///
/// - r: set the rate multiplier
/// - p: set the pitch multiplier
/// - l: set the preferred voice language
/// - Enter or Esc: leave the menu
pub struct ConfigHandler;

impl Default for ConfigHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigHandler {
    /// Create a new settings handler
    pub fn new() -> Self {
        Self
    }

    /// Apply a rate value typed at the prompt
    fn set_rate(input: String, state: &mut State) -> Result<()> {
        match input.trim().parse::<f32>() {
            Ok(value) if value.is_finite() => state.apply_rate(value)?,
            _ => {
                debug!("invalid rate value: '{}'", input);
                state.notify("invalid rate");
            }
        }
        Ok(())
    }

    /// Apply a pitch value typed at the prompt
    fn set_pitch(input: String, state: &mut State) -> Result<()> {
        match input.trim().parse::<f32>() {
            Ok(value) if value.is_finite() => state.apply_pitch(value)?,
            _ => {
                debug!("invalid pitch value: '{}'", input);
                state.notify("invalid pitch");
            }
        }
        Ok(())
    }

    /// Apply a preferred-language tag typed at the prompt
    fn set_preferred_lang(input: String, state: &mut State) -> Result<()> {
        let tag = input.trim().to_lowercase();
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            debug!("invalid language tag: '{}'", input);
            state.notify("invalid language tag");
            return Ok(());
        }
        state.apply_preferred_lang(&tag)
    }
}

impl KeyHandler for ConfigHandler {
    fn process(&mut self, key: &[u8], state: &mut State) -> Result<HandlerAction> {
        match key {
            // Rate prompt takes over from the menu
            b"r" => {
                debug!("settings: rate");
                BufferHandler::open("rate", Box::new(Self::set_rate), state);
                Ok(HandlerAction::Remove)
            }

            // Pitch prompt
            b"p" => {
                debug!("settings: pitch");
                BufferHandler::open("pitch", Box::new(Self::set_pitch), state);
                Ok(HandlerAction::Remove)
            }

            // Preferred language prompt
            b"l" => {
                debug!("settings: preferred language");
                BufferHandler::open("language", Box::new(Self::set_preferred_lang), state);
                Ok(HandlerAction::Remove)
            }

            // Enter or Esc leaves the menu
            b"\r" | b"\n" | b"\x1b" => {
                debug!("settings: exit");
                state.redraw_prompt();
                Ok(HandlerAction::Remove)
            }

            // Quit keys work from inside the menu
            b"\x1bq" | b"\x03" => Ok(HandlerAction::Passthrough),

            // Anything else stays in the menu
            _ => {
                debug!("settings: unknown key {:?}", key);
                Ok(HandlerAction::Handled)
            }
        }
    }
}
