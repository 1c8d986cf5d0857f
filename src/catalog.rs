//! Voice catalog
//!
//! Publishes the voice list coming out of a speech engine and tracks the
//! selected voice. The first time voices appear, a default is chosen: the
//! first voice whose language tag starts with the preferred prefix, else
//! the first voice in the list. A refresh never replaces an existing
//! selection, so a list change cannot yank the user's choice mid-session.

use log::{debug, info};

/// One platform voice, as published by a speech engine.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceOption {
    /// Stable identifier. Platform-native where the engine has one,
    /// otherwise the name-language composite.
    pub id: String,
    pub name: String,
    /// BCP 47 language tag, e.g. "id-ID".
    pub lang: String,
}

impl VoiceOption {
    /// Voice carrying a platform-native id.
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lang: lang.into(),
        }
    }

    /// Voice identified by its name-language composite, for engines with
    /// no native ids. Two voices sharing both name and language would
    /// collide, which is why native ids win when the platform has them.
    pub fn derived(name: impl Into<String>, lang: impl Into<String>) -> Self {
        let name = name.into();
        let lang = lang.into();
        Self {
            id: format!("{}-{}", name, lang),
            name,
            lang,
        }
    }

    /// Display label, e.g. "Ani · id-ID".
    pub fn label(&self) -> String {
        format!("{} · {}", self.name, self.lang)
    }
}

/// The published voice list plus the current selection.
///
/// The selection is stored by value: once a voice is chosen it stays
/// usable even if a later refresh drops it from the list.
#[derive(Debug, Default)]
pub struct VoiceCatalog {
    voices: Vec<VoiceOption>,
    selected: Option<VoiceOption>,
    preferred_lang: String,
}

impl VoiceCatalog {
    /// Empty catalog. `preferred_lang` is the language-tag prefix used for
    /// auto-selection, e.g. "id".
    pub fn new(preferred_lang: &str) -> Self {
        Self {
            voices: Vec::new(),
            selected: None,
            preferred_lang: preferred_lang.to_string(),
        }
    }

    /// Replace the published list, auto-selecting a default voice if
    /// nothing is selected yet.
    pub fn refresh(&mut self, voices: Vec<VoiceOption>) {
        debug!("catalog refresh: {} voices", voices.len());
        self.voices = voices;
        if self.selected.is_none() {
            if let Some(choice) = self.default_choice() {
                info!("auto-selected voice: {}", choice.label());
                self.selected = Some(choice);
            }
        }
    }

    fn default_choice(&self) -> Option<VoiceOption> {
        self.voices
            .iter()
            .find(|v| v.lang.starts_with(&self.preferred_lang))
            .or_else(|| self.voices.first())
            .cloned()
    }

    pub fn voices(&self) -> &[VoiceOption] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn selected(&self) -> Option<&VoiceOption> {
        self.selected.as_ref()
    }

    /// Select by catalog position. Returns the chosen voice.
    pub fn select_index(&mut self, index: usize) -> Option<&VoiceOption> {
        let voice = self.voices.get(index)?.clone();
        debug!("selected voice: {}", voice.label());
        self.selected = Some(voice);
        self.selected.as_ref()
    }

    /// Select by id. Returns false when the id is not in the list.
    pub fn select_id(&mut self, id: &str) -> bool {
        match self.voices.iter().find(|v| v.id == id) {
            Some(voice) => {
                debug!("selected voice: {}", voice.label());
                self.selected = Some(voice.clone());
                true
            }
            None => false,
        }
    }

    /// Change the auto-selection prefix for future refreshes.
    pub fn set_preferred_lang(&mut self, prefix: &str) {
        self.preferred_lang = prefix.to_string();
    }

    pub fn preferred_lang(&self) -> &str {
        &self.preferred_lang
    }
}
