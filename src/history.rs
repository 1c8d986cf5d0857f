//! Bounded history of spoken text
//!
//! Every successfully issued utterance lands here, newest first, so the
//! user can replay recent text. Capacity is fixed; the oldest entry falls
//! off when a new one arrives at the cap. Entries are never edited, and a
//! replay records a fresh entry rather than touching the old one.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

/// How many entries the history keeps.
pub const HISTORY_CAP: usize = 12;

/// One spoken utterance, as shown in the history list.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryItem {
    /// Unique within this run, e.g. "h4"
    pub id: String,
    /// The text exactly as it was sent to the engine (already trimmed)
    pub text: String,
    /// Display label of the voice that spoke it, e.g. "Ani · id-ID"
    pub voice_label: String,
    /// Creation time, milliseconds since the Unix epoch
    pub timestamp: u64,
}

/// Most-recent-first log of spoken text, capped at [`HISTORY_CAP`].
pub struct History {
    items: VecDeque<HistoryItem>,
    next_seq: u64,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self {
            items: VecDeque::with_capacity(HISTORY_CAP),
            next_seq: 0,
        }
    }

    /// Record a spoken utterance at the front, evicting the oldest entry
    /// when the cap is reached.
    pub fn record(&mut self, text: &str, voice_label: &str) -> &HistoryItem {
        self.next_seq += 1;
        let item = HistoryItem {
            id: format!("h{}", self.next_seq),
            text: text.to_string(),
            voice_label: voice_label.to_string(),
            timestamp: now_millis(),
        };
        debug!("history: recorded {} ({} chars)", item.id, item.text.len());
        self.items.push_front(item);
        self.items.truncate(HISTORY_CAP);
        // Just pushed, so the front exists
        &self.items[0]
    }

    /// Entries, newest first
    pub fn items(&self) -> impl Iterator<Item = &HistoryItem> {
        self.items.iter()
    }

    /// Entry by position, 0 = newest
    pub fn get(&self, index: usize) -> Option<&HistoryItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_history() {
        let history = History::new();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn test_record_newest_first() {
        let mut history = History::new();
        history.record("first", "Ani · id-ID");
        history.record("second", "Ani · id-ID");

        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0).unwrap().text, "second");
        assert_eq!(history.get(1).unwrap().text, "first");
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut history = History::new();
        for i in 0..HISTORY_CAP + 3 {
            history.record(&format!("text {}", i), "v");
        }

        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(
            history.get(0).unwrap().text,
            format!("text {}", HISTORY_CAP + 2),
            "newest entry stays at the front"
        );
        assert_eq!(
            history.get(HISTORY_CAP - 1).unwrap().text,
            "text 3",
            "entries 0..=2 must have been evicted"
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let mut history = History::new();
        for _ in 0..HISTORY_CAP + 5 {
            history.record("same text", "v");
        }

        let mut ids: Vec<_> = history.items().map(|i| i.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), HISTORY_CAP, "ids stay unique across eviction");
    }

    #[test]
    fn test_record_returns_new_item() {
        let mut history = History::new();
        let item = history.record("halo", "Budi · id-ID");
        assert_eq!(item.text, "halo");
        assert_eq!(item.voice_label, "Budi · id-ID");
        assert!(item.timestamp > 0);
    }
}
