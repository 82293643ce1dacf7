//! Configuration system for ferricom

use crate::error::{EmulatorError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub input: InputConfig,
    pub paths: PathConfig,
}

/// General emulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Frames-per-second target for the pump
    pub frame_limit: u32,
    /// Number of rewind steps the engine retains
    pub rewind_history: u32,
}

/// Input settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub keyboard_mapping: KeyboardMapping,
}

/// Keyboard to controller mapping
///
/// Values are egui key names ("X", "Enter", "ArrowUp", "F5", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardMapping {
    pub a: String,
    pub b: String,
    pub select: String,
    pub start: String,
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
    pub rewind: String,
    pub turbo: String,
    pub save_state: String,
    pub load_state: String,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory scanned for cartridge images
    pub roms: PathBuf,
    /// Directory for persisted engine state
    pub saves: PathBuf,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            frame_limit: 60,
            rewind_history: 600,
        }
    }
}

impl Default for KeyboardMapping {
    fn default() -> Self {
        Self {
            a: "X".to_string(),
            b: "Z".to_string(),
            select: "Backspace".to_string(),
            start: "Enter".to_string(),
            up: "ArrowUp".to_string(),
            down: "ArrowDown".to_string(),
            left: "ArrowLeft".to_string(),
            right: "ArrowRight".to_string(),
            rewind: "R".to_string(),
            turbo: "Tab".to_string(),
            save_state: "F5".to_string(),
            load_state: "F9".to_string(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ferricom");

        Self {
            roms: base.join("roms"),
            saves: base.join("saves"),
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content).map_err(|e| EmulatorError::Config(e.to_string()))
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| EmulatorError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ferricom")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.frame_limit, 60);
        assert_eq!(config.general.rewind_history, 600);
        assert_eq!(config.input.keyboard_mapping.a, "X");
        assert_eq!(config.input.keyboard_mapping.start, "Enter");
        assert!(config.paths.roms.ends_with("roms"));
        assert!(config.paths.saves.ends_with("saves"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.general.frame_limit, config.general.frame_limit);
        assert_eq!(parsed.input.keyboard_mapping.b, config.input.keyboard_mapping.b);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: Config = toml::from_str("[general]\nframe_limit = 30\n").unwrap();
        assert_eq!(parsed.general.frame_limit, 30);
        assert_eq!(parsed.general.rewind_history, 600);
        assert_eq!(parsed.input.keyboard_mapping.rewind, "R");
    }
}
