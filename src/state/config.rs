//! Configuration management

use crate::form::{VoicePolicy, DEFAULT_WORDS_PER_SECOND};
use crate::speech::BackendChoice;
use crate::{Result, SpeakpadError};
use ini::Ini;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Default preview width of the text line, in terminal cells
pub const DEFAULT_PREVIEW_WIDTH: usize = 60;

/// Startup configuration read from ~/.speakpad.cfg
///
/// Read-only at runtime: nothing the user does in the form is written back.
pub struct Config {
    ini: Ini,
    path: PathBuf,
}

impl Config {
    /// Load ~/.speakpad.cfg, creating it with defaults if missing
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load a specific file, creating it with defaults if missing
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| SpeakpadError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| SpeakpadError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Config built from defaults only, without touching the disk
    pub fn defaults() -> Self {
        Self {
            ini: Self::default_config(),
            path: PathBuf::new(),
        }
    }

    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".speakpad.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("form"))
            .set("sliders", "true")
            .set("voice_policy", "subscribe")
            .set("words_per_second", DEFAULT_WORDS_PER_SECOND.to_string())
            .set("preview_width", DEFAULT_PREVIEW_WIDTH.to_string());

        ini.with_section(Some("speech"))
            .set("backend", "auto")
            .set("language", "")
            .set("pitch", "1.0")
            .set("rate", "1.0")
            .set("volume", "1.0");

        ini
    }

    /// Get a boolean value from config
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .trim()
            .to_string()
    }

    /// Get an unsigned integer value from config
    pub fn get_usize(&self, section: &str, key: &str, default: usize) -> usize {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Get a float value from config
    pub fn get_float(&self, section: &str, key: &str, default: f32) -> f32 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    // ========== [form] ==========

    /// Show pitch/rate/volume sliders
    pub fn sliders(&self) -> bool {
        self.get_bool("form", "sliders", true)
    }

    /// How the voice catalog is loaded
    pub fn voice_policy(&self) -> Result<VoicePolicy> {
        self.get_string("form", "voice_policy", "subscribe").parse()
    }

    /// Words per second used for the duration estimate
    pub fn words_per_second(&self) -> usize {
        match self.get_usize("form", "words_per_second", DEFAULT_WORDS_PER_SECOND) {
            0 => {
                warn!(
                    "words_per_second must be positive, using {}",
                    DEFAULT_WORDS_PER_SECOND
                );
                DEFAULT_WORDS_PER_SECOND
            }
            n => n,
        }
    }

    /// Display width of the text preview line
    pub fn preview_width(&self) -> usize {
        self.get_usize("form", "preview_width", DEFAULT_PREVIEW_WIDTH)
    }

    // ========== [speech] ==========

    pub fn backend(&self) -> Result<BackendChoice> {
        self.get_string("speech", "backend", "auto").parse()
    }

    /// Preselected language; empty means engine default
    pub fn language(&self) -> Option<String> {
        Some(self.get_string("speech", "language", "")).filter(|l| !l.is_empty())
    }

    pub fn pitch(&self) -> f32 {
        self.get_float("speech", "pitch", 1.0)
    }

    pub fn rate(&self) -> f32 {
        self.get_float("speech", "rate", 1.0)
    }

    pub fn volume(&self) -> f32 {
        self.get_float("speech", "volume", 1.0)
    }
}
