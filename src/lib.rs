//! ucap - terminal text-to-speech scratchpad
//!
//! Type or paste text at a prompt, pick a synthesized voice, tune rate and
//! pitch, and speak it through the platform's speech engine. Keeps a short
//! replay history of what was spoken.

pub mod catalog;
pub mod clipboard;
pub mod error;
pub mod history;
pub mod input;
pub mod session;
pub mod speech;
pub mod state;
pub mod terminal;
pub mod ui;

pub use error::{Result, UcapError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "ucap";
