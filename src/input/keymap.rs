//! Default key bindings for the scratchpad

use std::collections::HashMap;

/// Key sequence type
pub type KeySequence = Vec<u8>;

/// Action identifier for key bindings
///
/// Each variant is one scratchpad command that a key can trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    // Speaking
    Speak,
    Stop,
    TogglePause,

    // Modal menus
    VoiceMenu,
    HistoryMenu,
    SettingsMenu,

    // Rate and pitch nudges
    RateDown,
    RateUp,
    PitchDown,
    PitchUp,

    // Text field editing
    Backspace,
    ClearText,
    Paste,
    CopyText,

    // Session commands
    RefreshVoices,
    Status,
    Help,
    Redraw,
    Quit,
}

/// Create the default keymap
pub fn create_default_keymap() -> HashMap<KeySequence, KeyAction> {
    let mut map = HashMap::new();

    // Speaking (enter speaks, esc stops, alt+p pauses)
    map.insert(b"\r".to_vec(), KeyAction::Speak);
    map.insert(b"\n".to_vec(), KeyAction::Speak);
    map.insert(b"\x1b".to_vec(), KeyAction::Stop);
    map.insert(b"\x1bp".to_vec(), KeyAction::TogglePause);

    // Menus (alt+v/h/c)
    map.insert(b"\x1bv".to_vec(), KeyAction::VoiceMenu);
    map.insert(b"\x1bh".to_vec(), KeyAction::HistoryMenu);
    map.insert(b"\x1bc".to_vec(), KeyAction::SettingsMenu);

    // Rate on the alt+minus/equals pair, pitch on the shifted pair.
    // alt+[ would collide with the CSI prefix arrow keys arrive under.
    map.insert(b"\x1b-".to_vec(), KeyAction::RateDown);
    map.insert(b"\x1b=".to_vec(), KeyAction::RateUp);
    map.insert(b"\x1b_".to_vec(), KeyAction::PitchDown);
    map.insert(b"\x1b+".to_vec(), KeyAction::PitchUp);

    // Text field editing
    map.insert(b"\x7f".to_vec(), KeyAction::Backspace);
    map.insert(b"\x08".to_vec(), KeyAction::Backspace);
    map.insert(b"\x15".to_vec(), KeyAction::ClearText); // ctrl+u
    map.insert(b"\x1by".to_vec(), KeyAction::Paste);
    map.insert(b"\x1bw".to_vec(), KeyAction::CopyText);

    // Session commands
    map.insert(b"\x1br".to_vec(), KeyAction::RefreshVoices);
    map.insert(b"\x1bi".to_vec(), KeyAction::Status);
    map.insert(b"\x1b/".to_vec(), KeyAction::Help);
    map.insert(b"\x0c".to_vec(), KeyAction::Redraw); // ctrl+l
    map.insert(b"\x1bq".to_vec(), KeyAction::Quit);
    map.insert(b"\x03".to_vec(), KeyAction::Quit); // ctrl+c

    map
}
