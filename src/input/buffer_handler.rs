//! Text prompt handler
//!
//! Collects one line of input for the settings menu (a rate value, a
//! language tag). While it is active the scratchpad prompt is replaced by
//! a labelled prompt; Enter hands the collected text to a callback and
//! Esc abandons it.

use super::{HandlerAction, KeyHandler};
use crate::state::State;
use crate::ui;
use crate::Result;
use log::debug;

/// Callback invoked with the collected text when the user accepts it.
pub type OnAcceptFn = Box<dyn FnOnce(String, &mut State) -> Result<()> + Send>;

/// Handler that collects text until Enter is pressed
pub struct BufferHandler {
    /// Short label drawn as the prompt tag
    prompt: &'static str,

    /// Accumulated input
    buffer: String,

    /// Callback to execute when Enter is pressed
    on_accept: Option<OnAcceptFn>,
}

impl BufferHandler {
    /// Draw the empty prompt and put a new handler on the stack.
    pub fn open(prompt: &'static str, on_accept: OnAcceptFn, state: &mut State) {
        ui::redraw_prompt(prompt, "");
        state.handlers.push(Box::new(Self {
            prompt,
            buffer: String::new(),
            on_accept: Some(on_accept),
        }));
    }

    fn redraw(&self) {
        ui::redraw_prompt(self.prompt, &self.buffer);
    }
}

impl KeyHandler for BufferHandler {
    fn process(&mut self, key: &[u8], state: &mut State) -> Result<HandlerAction> {
        match key {
            // Enter accepts the input and invokes the callback
            b"\r" | b"\n" => {
                debug!("prompt '{}' accepted: '{}'", self.prompt, self.buffer);
                if let Some(callback) = self.on_accept.take() {
                    callback(self.buffer.clone(), state)?;
                }
                state.redraw_prompt();
                Ok(HandlerAction::Remove)
            }

            // Esc or ctrl+c abandons the prompt
            b"\x1b" | b"\x03" => {
                debug!("prompt '{}' abandoned", self.prompt);
                state.redraw_prompt();
                Ok(HandlerAction::Remove)
            }

            // Backspace removes the last character
            b"\x08" | b"\x7f" => {
                self.buffer.pop();
                self.redraw();
                Ok(HandlerAction::Handled)
            }

            // Regular characters go into the buffer
            _ => {
                // Escape sequences have no place in a one-line prompt
                if key.starts_with(b"\x1b") {
                    return Ok(HandlerAction::Handled);
                }
                if let Ok(s) = std::str::from_utf8(key) {
                    self.buffer.extend(s.chars().filter(|c| !c.is_control()));
                    self.redraw();
                }
                Ok(HandlerAction::Handled)
            }
        }
    }
}
