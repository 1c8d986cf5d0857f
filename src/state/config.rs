//! Configuration management
//!
//! `~/.ucap.cfg` holds startup defaults: rate, pitch, the auto-selection
//! language prefix, and the backend choice. Session state (history, text,
//! the selected voice) is deliberately never written here.

use crate::{Result, UcapError};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Application configuration
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.ucap.cfg)
    path: PathBuf,
}

impl Config {
    /// Load configuration from the home directory, creating the file with
    /// defaults on first run
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from an explicit path. Tests point this at a
    /// temp directory.
    pub fn load_from(path: PathBuf) -> Result<Self> {
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| UcapError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| UcapError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| UcapError::Config(format!("Failed to save config: {}", e)))
    }

    /// Get config file path (~/.ucap.cfg)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ucap.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("speech"))
            .set("rate", "1.0")
            .set("pitch", "1.0")
            .set("preferred_lang", "id")
            .set("backend", "auto");

        ini
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get a float value from config
    pub fn get_float(&self, section: &str, key: &str, default: f32) -> f32 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    // Application-specific getters

    /// Startup rate multiplier
    pub fn rate(&self) -> f32 {
        self.get_float("speech", "rate", 1.0)
    }

    /// Startup pitch multiplier
    pub fn pitch(&self) -> f32 {
        self.get_float("speech", "pitch", 1.0)
    }

    /// Language-tag prefix used for voice auto-selection
    pub fn preferred_lang(&self) -> String {
        self.get_string("speech", "preferred_lang", "id")
    }

    /// Backend choice: auto, native, or espeak
    pub fn backend(&self) -> String {
        self.get_string("speech", "backend", "auto")
    }
}
