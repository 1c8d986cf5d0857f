//! Input handling and key bindings
//!
//! The input system uses a stack-based handler architecture where handlers
//! can be pushed/popped to create modal interfaces (voice picker, history
//! list, settings menu, text prompts).

pub mod buffer_handler;
pub mod config_handler;
pub mod default_handler;
pub mod handler;
pub mod history_handler;
pub mod keymap;
pub mod voice_handler;

pub use default_handler::DefaultKeyHandler;
pub use handler::{HandlerAction, HandlerStack, KeyHandler};
pub use keymap::{create_default_keymap, KeyAction};
