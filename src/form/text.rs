//! Text input with character count and spoken-duration estimate

use log::{debug, warn};

/// Words per second used by the duration estimate
///
/// A deliberately rough figure; it is not a model of real speech rate.
pub const DEFAULT_WORDS_PER_SECOND: usize = 150;

/// Number of whitespace-separated words; blank text has none
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimated spoken duration in whole seconds, rounded up
pub fn estimate_duration_secs(text: &str, words_per_second: usize) -> usize {
    word_count(text).div_ceil(words_per_second.max(1))
}

/// Free-text input and the figures derived from it
///
/// Derived values are recomputed on every change.
#[derive(Debug, Clone)]
pub struct TextInput {
    text: String,
    words_per_second: usize,
    character_count: usize,
    duration_secs: usize,
}

impl TextInput {
    /// Create an empty input; a zero rate falls back to the default
    pub fn new(words_per_second: usize) -> Self {
        let words_per_second = if words_per_second == 0 {
            warn!(
                "words_per_second must be positive, using {}",
                DEFAULT_WORDS_PER_SECOND
            );
            DEFAULT_WORDS_PER_SECOND
        } else {
            words_per_second
        };

        Self {
            text: String::new(),
            words_per_second,
            character_count: 0,
            duration_secs: 0,
        }
    }

    /// Replace the whole text
    pub fn set(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.recompute();
    }

    /// Append to the text
    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
        self.recompute();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.recompute();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length of the raw text in Unicode scalar values
    pub fn character_count(&self) -> usize {
        self.character_count
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }

    pub fn estimated_duration_secs(&self) -> usize {
        self.duration_secs
    }

    pub fn words_per_second(&self) -> usize {
        self.words_per_second
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn recompute(&mut self) {
        self.character_count = self.text.chars().count();
        self.duration_secs = estimate_duration_secs(&self.text, self.words_per_second);
        debug!(
            "Text changed: {} chars, ~{}s",
            self.character_count, self.duration_secs
        );
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new(DEFAULT_WORDS_PER_SECOND)
    }
}
