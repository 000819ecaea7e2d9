//! Voice catalog: the languages the speech engine offers

use crate::speech::{SpeechPlatform, VoiceInfo};
use crate::{Result, SpeakpadError};
use log::{debug, info, warn};
use std::str::FromStr;

/// When the catalog is (re)loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoicePolicy {
    /// Query once when the form is created. Engines that populate their
    /// voice list lazily may leave the catalog empty.
    Once,
    /// Query immediately and again on every voices-changed notification
    #[default]
    Subscribe,
}

impl FromStr for VoicePolicy {
    type Err = SpeakpadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(VoicePolicy::Once),
            "subscribe" => Ok(VoicePolicy::Subscribe),
            other => Err(SpeakpadError::Config(format!(
                "Unknown voice policy '{}' (expected once or subscribe)",
                other
            ))),
        }
    }
}

/// Ordered voices, as reported by the engine
///
/// Language identifiers are opaque. Several voices may share one language
/// and every entry is kept; picking an entry by position also pins its voice
/// name, which the native backend honours. espeak-ng selects by language
/// only, so duplicates there sound alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceCatalog {
    voices: Vec<VoiceInfo>,
}

impl VoiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_voices(voices: Vec<VoiceInfo>) -> Self {
        Self { voices }
    }

    /// Catalog of unnamed voices, one per language
    pub fn from_languages<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_voices(
            languages
                .into_iter()
                .map(|language| VoiceInfo {
                    name: String::new(),
                    language: language.into(),
                })
                .collect(),
        )
    }

    /// Re-query the engine
    ///
    /// A failed query keeps the previous contents.
    pub fn refresh(&mut self, platform: &mut dyn SpeechPlatform) {
        match platform.list_voices() {
            Ok(voices) => {
                self.voices = voices;
                info!("Voice catalog loaded: {} voices", self.voices.len());
            }
            Err(e) => {
                warn!("Failed to query voices, keeping previous catalog: {}", e);
            }
        }
    }

    pub fn voices(&self) -> &[VoiceInfo] {
        &self.voices
    }

    pub fn languages(&self) -> Vec<&str> {
        self.voices.iter().map(|v| v.language.as_str()).collect()
    }

    /// Voice at a 1-based dropdown position (0 is the placeholder)
    pub fn voice_at(&self, position: usize) -> Option<&VoiceInfo> {
        debug!("Catalog lookup at position {}", position);
        position.checked_sub(1).and_then(|i| self.voices.get(i))
    }

    /// Language at a 1-based dropdown position
    pub fn at_position(&self, position: usize) -> Option<&str> {
        self.voice_at(position).map(|v| v.language.as_str())
    }

    pub fn contains(&self, language: &str) -> bool {
        self.voices.iter().any(|v| v.language == language)
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_are_one_based() {
        let catalog = VoiceCatalog::from_languages(["en-US", "hu-HU"]);
        assert_eq!(catalog.at_position(0), None);
        assert_eq!(catalog.at_position(1), Some("en-US"));
        assert_eq!(catalog.at_position(2), Some("hu-HU"));
        assert_eq!(catalog.at_position(3), None);
    }

    #[test]
    fn test_duplicates_kept() {
        let catalog = VoiceCatalog::from_languages(["en-US", "en-US", "de-DE"]);
        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains("de-DE"));
        assert!(!catalog.contains("de"));
    }

    #[test]
    fn test_voice_at_keeps_names_apart() {
        let voice = |name: &str| VoiceInfo {
            name: name.to_string(),
            language: "en-US".to_string(),
        };
        let catalog = VoiceCatalog::from_voices(vec![voice("Alex"), voice("Samantha")]);
        assert_eq!(catalog.languages(), ["en-US", "en-US"]);
        assert_eq!(catalog.voice_at(2).map(|v| v.name.as_str()), Some("Samantha"));
        assert_eq!(catalog.voice_at(0), None);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("once".parse::<VoicePolicy>().unwrap(), VoicePolicy::Once);
        assert_eq!(" Subscribe ".parse::<VoicePolicy>().unwrap(), VoicePolicy::Subscribe);
        assert!("poll".parse::<VoicePolicy>().is_err());
        assert_eq!(VoicePolicy::default(), VoicePolicy::Subscribe);
    }
}
