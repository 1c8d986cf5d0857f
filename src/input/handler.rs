//! Key handler system with modal input support

use crate::state::State;
use crate::Result;

/// Action to take after processing a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerAction {
    /// Hand the key to the default bindings as well
    Passthrough,
    /// Remove this handler from the stack
    Remove,
    /// Key was handled, do nothing more
    Handled,
}

/// A key handler processes keyboard input
///
/// Modal surfaces (the voice picker, the history list, the settings menu,
/// text prompts) implement this and sit on the handler stack; the active
/// one sees every key first.
pub trait KeyHandler {
    /// Process one key sequence
    fn process(&mut self, key: &[u8], state: &mut State) -> Result<HandlerAction>;
}

/// Stack of key handlers (last one processes input first)
///
/// The stack lives inside [`State`] while handlers also take `&mut State`,
/// so the event loop pops the active handler before calling it and pushes
/// it back unless it asked to be removed.
pub struct HandlerStack {
    handlers: Vec<Box<dyn KeyHandler>>,
}

impl HandlerStack {
    /// Create a new handler stack
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Push a handler onto the stack
    pub fn push(&mut self, handler: Box<dyn KeyHandler>) {
        self.handlers.push(handler);
    }

    /// Pop the top handler from the stack
    pub fn pop(&mut self) -> Option<Box<dyn KeyHandler>> {
        self.handlers.pop()
    }

    /// Get the number of handlers in the stack
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerStack {
    fn default() -> Self {
        Self::new()
    }
}
