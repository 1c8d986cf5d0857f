//! Clipboard integration

use crate::{Result, UcapError};
use arboard::Clipboard;
use log::debug;

/// Copy text to the system clipboard
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    debug!("Copying {} chars to clipboard", text.len());

    let mut clipboard = Clipboard::new()
        .map_err(|e| UcapError::Clipboard(format!("Failed to open clipboard: {}", e)))?;

    clipboard
        .set_text(text)
        .map_err(|e| UcapError::Clipboard(format!("Failed to copy to clipboard: {}", e)))?;

    Ok(())
}

/// Get text from the system clipboard
pub fn paste_from_clipboard() -> Result<String> {
    debug!("Getting text from clipboard");

    let mut clipboard = Clipboard::new()
        .map_err(|e| UcapError::Clipboard(format!("Failed to open clipboard: {}", e)))?;

    clipboard
        .get_text()
        .map_err(|e| UcapError::Clipboard(format!("Failed to get from clipboard: {}", e)))
}
