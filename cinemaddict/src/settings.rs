use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::Error;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Display name stamped on new comments
    #[serde(default = "default_author")]
    pub author: String,

    #[serde(default = "default_cards_per_page")]
    pub cards_per_page: usize,

    /// JSON film catalogue; the board starts empty without one
    #[serde(default)]
    pub films_path: Option<PathBuf>,
}

fn default_author() -> String {
    "Anonymous".to_string()
}

fn default_cards_per_page() -> usize {
    5
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CINEMADDICT_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

        let settings = Config::builder()
            .add_source(File::with_name(&config_path).required(false))
            .add_source(config::Environment::with_prefix("CINEMADDICT").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Load and validate in one step
    pub fn load() -> Result<Self, Error> {
        let settings = Self::new()?;
        settings.validate().map_err(Error::Configuration)?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.author.trim().is_empty() {
            return Err("author is required".to_string());
        }
        if self.cards_per_page == 0 {
            return Err("cards_per_page must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            author: default_author(),
            cards_per_page: default_cards_per_page(),
            films_path: None,
        }
    }
}
