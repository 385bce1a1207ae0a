use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CANDIDATES: [&str; 5] = ["Apple", "Orange", "Mango", "Lichi", "Guava"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("candidate #{index} is empty")]
    EmptyLabel { index: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Initial candidate pool, in display order
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,

    /// Text shown in the empty input field
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Colour overrides, e.g. `accent = "#FFC107"`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub theme: BTreeMap<String, String>,
}

fn default_candidates() -> Vec<String> {
    DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect()
}

fn default_placeholder() -> String {
    "Type here...".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            placeholder: default_placeholder(),
            theme: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Default config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("chiptray");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the default location, writing defaults if it is missing
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            return Ok(Self::load_from(&path));
        }

        let config = AppConfig::default();
        if let Err(e) = config.save_to(&path) {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    /// Load config from an explicit file. Unreadable or malformed files fall
    /// back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Failed to parse config {}: {}", path.display(), e),
            },
            Err(e) => tracing::warn!("Failed to read config {}: {}", path.display(), e),
        }
        AppConfig::default()
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Trim labels and drop duplicates so every label lives in exactly one
    /// place once the widget starts.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        let mut clean = Vec::with_capacity(self.candidates.len());

        for (index, label) in self.candidates.iter().enumerate() {
            let label = label.trim();
            if label.is_empty() {
                return Err(ConfigError::EmptyLabel { index });
            }
            if seen.insert(label.to_string()) {
                clean.push(label.to_string());
            } else {
                tracing::warn!("Dropping duplicate candidate: {}", label);
            }
        }

        self.candidates = clean;
        Ok(())
    }
}
