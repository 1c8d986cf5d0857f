//! Prompt and listing output
//!
//! Raw mode means no cooked-mode line discipline: every finished line is
//! written with an explicit `\r\n`, and the prompt is redrawn in place
//! with a carriage return plus erase-to-end. Listing lines are clipped to
//! the terminal width so they never wrap and break the redraw.

use std::collections::HashMap;
use std::io::{self, Write};

use once_cell::sync::Lazy;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::catalog::VoiceOption;
use crate::history::HistoryItem;

/// Shown when the platform has no usable speech engine.
pub const UNSUPPORTED_NOTICE: &str = "speech is not available on this system";

/// Key reference printed by the help command and at startup.
pub const KEY_HELP: &[&str] = &[
    "enter      speak the text field",
    "esc        stop playback",
    "alt+p      pause / resume",
    "alt+v      voice picker",
    "alt+h      history",
    "alt+c      settings",
    "alt+-/=    rate down / up",
    "alt+_/+    pitch down / up",
    "alt+y      paste the clipboard",
    "alt+w      copy the text field",
    "ctrl+u     clear the text field",
    "alt+r      reload the voice list",
    "alt+i      status line",
    "ctrl+l     redraw the prompt",
    "alt+/      this help",
    "alt+q      quit (also ctrl+c)",
];

/// English names for common primary language subtags
///
/// Used to annotate voice listings, so "id" reads as Indonesian and not
/// as a mystery tag. Unknown subtags are shown bare.
static LANGUAGE_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("ar", "Arabic");
    m.insert("de", "German");
    m.insert("en", "English");
    m.insert("es", "Spanish");
    m.insert("fr", "French");
    m.insert("hi", "Hindi");
    m.insert("id", "Indonesian");
    m.insert("it", "Italian");
    m.insert("ja", "Japanese");
    m.insert("jv", "Javanese");
    m.insert("ko", "Korean");
    m.insert("ms", "Malay");
    m.insert("nl", "Dutch");
    m.insert("pt", "Portuguese");
    m.insert("ru", "Russian");
    m.insert("su", "Sundanese");
    m.insert("th", "Thai");
    m.insert("tr", "Turkish");
    m.insert("vi", "Vietnamese");
    m.insert("zh", "Chinese");
    m
});

/// English name for a language tag's primary subtag, if known.
pub fn language_name(tag: &str) -> Option<&'static str> {
    let primary = tag.split(['-', '_']).next().unwrap_or(tag);
    LANGUAGE_NAMES.get(primary.to_lowercase().as_str()).copied()
}

/// Print one finished line above the prompt.
///
/// The caller redraws the prompt afterwards; this only erases whatever
/// the prompt left on the current line.
pub fn print_line(text: &str) {
    print!("\r\x1b[K{}\r\n", text);
    let _ = io::stdout().flush();
}

/// Redraw the prompt in place: `[status] > text`.
///
/// Long text shows its tail, clipped so the line never wraps.
pub fn redraw_prompt(status: &str, text: &str) {
    let (cols, _) = crate::terminal::get_terminal_size(0);
    let fixed = status.width() + 5;
    let budget = (cols as usize).saturating_sub(fixed + 1);
    print!("\r\x1b[K[{}] > {}", status, tail_fit(text, budget));
    let _ = io::stdout().flush();
}

/// Usable width for listing lines on the current terminal.
pub fn listing_width() -> usize {
    let (cols, _) = crate::terminal::get_terminal_size(0);
    (cols as usize).saturating_sub(1)
}

/// One voice picker line, e.g. `* 2. Damayanti · id-ID (Indonesian)`.
/// The star marks the selected voice.
pub fn format_voice_line(
    position: usize,
    voice: &VoiceOption,
    selected: bool,
    width: usize,
) -> String {
    let marker = if selected { '*' } else { ' ' };
    let line = match language_name(&voice.lang) {
        Some(name) => format!("{}{:>2}. {} ({})", marker, position, voice.label(), name),
        None => format!("{}{:>2}. {}", marker, position, voice.label()),
    };
    clip_line(&line, width)
}

/// One history line, e.g. ` 1. selamat pagi  [Damayanti · id-ID]`.
pub fn format_history_line(position: usize, item: &HistoryItem, width: usize) -> String {
    let line = format!("{:>2}. {}  [{}]", position, item.text, item.voice_label);
    clip_line(&line, width)
}

/// Clip a line to `width` display columns, marking the cut with an ellipsis.
pub fn clip_line(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > keep {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// The longest tail of `text` that fits in `budget` display columns.
fn tail_fit(text: &str, budget: usize) -> &str {
    if text.width() <= budget {
        return text;
    }
    let mut start = text.len();
    let mut used = 0;
    for (idx, ch) in text.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        start = idx;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;

    #[test]
    fn test_language_name_lookup() {
        assert_eq!(language_name("id"), Some("Indonesian"));
        assert_eq!(language_name("id-ID"), Some("Indonesian"));
        assert_eq!(language_name("en_US"), Some("English"));
        assert_eq!(language_name("EN"), Some("English"));
        assert_eq!(language_name("tlh"), None);
    }

    #[test]
    fn test_clip_line_keeps_short_lines() {
        assert_eq!(clip_line("hello", 10), "hello");
        assert_eq!(clip_line("hello", 5), "hello");
    }

    #[test]
    fn test_clip_line_marks_the_cut() {
        let clipped = clip_line("selamat pagi dunia", 10);
        assert_eq!(clipped, "selamat p…");
        assert!(clipped.chars().count() <= 10);
    }

    #[test]
    fn test_tail_fit_shows_the_end() {
        assert_eq!(tail_fit("halo", 10), "halo");
        assert_eq!(tail_fit("selamat pagi", 4), "pagi");
        assert_eq!(tail_fit("abc", 0), "");
    }

    #[test]
    fn test_tail_fit_counts_wide_characters() {
        // CJK glyphs take two columns each
        assert_eq!(tail_fit("abc漢字", 4), "漢字");
        assert_eq!(tail_fit("abc漢字", 5), "c漢字");
        assert_eq!(tail_fit("abc漢字", 3), "字");
    }

    #[test]
    fn test_format_voice_line_annotates_known_languages() {
        let voice = VoiceOption::derived("Damayanti", "id-ID");
        let line = format_voice_line(2, &voice, true, 80);
        assert_eq!(line, "* 2. Damayanti · id-ID (Indonesian)");

        let odd = VoiceOption::derived("Mystery", "tlh");
        assert_eq!(format_voice_line(11, &odd, false, 80), " 11. Mystery · tlh");
    }

    #[test]
    fn test_format_history_line_shows_text_and_voice() {
        let mut history = History::new();
        history.record("selamat pagi", "Damayanti · id-ID");
        let item = history.get(0).unwrap();
        let line = format_history_line(1, item, 80);
        assert_eq!(line, " 1. selamat pagi  [Damayanti · id-ID]");
    }
}
