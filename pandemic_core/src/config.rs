//! Configuration file support for the tracker.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/pandemic/config.toml`.
//! Command-line flags override anything set here.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
}

/// Game setup parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// File with `name category` pairs
    #[serde(default = "default_cities_file")]
    pub cities_file: PathBuf,

    /// Funded event cards shuffled into the player deck
    #[serde(default)]
    pub events: Vec<String>,

    /// Player cards dealt before play starts
    #[serde(default = "default_initial_draws")]
    pub initial_draws: u32,

    /// Epidemic cards shuffled into the player deck
    #[serde(default = "default_epidemics")]
    pub epidemics: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cities_file: default_cities_file(),
            events: Vec::new(),
            initial_draws: default_initial_draws(),
            epidemics: default_epidemics(),
        }
    }
}

// Default value functions
fn default_cities_file() -> PathBuf {
    PathBuf::from("cities.txt")
}

fn default_initial_draws() -> u32 {
    8
}

fn default_epidemics() -> u32 {
    5
}

impl GameConfig {
    /// Check settings that would make the epidemic schedule meaningless
    pub fn validate(&self) -> Result<()> {
        if self.epidemics == 0 {
            return Err(Error::Config("epidemics must be at least 1".into()));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from `config_path`, or defaults if it does not exist
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load_from(config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.game.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("pandemic").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
