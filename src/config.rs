//! Optional `paradox.toml`. Every field has a default, so a missing file or a
//! partial one is fine.
//!
//! ```toml
//! [game]
//! max_inventory = 5
//! save_path = "terminal-paradox-save.json"
//! autoload = true
//! seed = 42
//!
//! [logging]
//! level = "info"
//! file = "terminal-paradox.log"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::DEFAULT_MAX_INVENTORY;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub max_inventory: usize,
    /// Snapshot file; `None` turns persistence off.
    pub save_path: Option<PathBuf>,
    pub autoload: bool,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            max_inventory: DEFAULT_MAX_INVENTORY,
            save_path: Some(PathBuf::from("terminal-paradox-save.json")),
            autoload: true,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// The terminal belongs to the UI, so logs only go to a file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: Some(PathBuf::from("terminal-paradox.log")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| anyhow!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        Self::from_toml(&content).map_err(|e| anyhow!("{} ({})", e, path.display()))
    }

    /// Read `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.game.max_inventory == 0 {
            return Err(anyhow!("game.max_inventory must be at least 1"));
        }
        if self.log_level().is_none() {
            return Err(anyhow!("logging.level '{}' is not a log level", self.logging.level));
        }
        Ok(())
    }

    pub fn log_level(&self) -> Option<log::LevelFilter> {
        self.logging.level.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.game.max_inventory, 5);
        assert!(config.game.autoload);
        assert_eq!(config.log_level(), Some(log::LevelFilter::Info));
    }

    #[test]
    fn partial_sections() {
        let config = Config::from_toml(
            r#"
[game]
seed = 42
autoload = false

[logging]
level = "debug"
"#,
        )
        .unwrap();
        assert_eq!(config.game.seed, Some(42));
        assert!(!config.game.autoload);
        assert_eq!(config.game.max_inventory, 5);
        assert_eq!(config.log_level(), Some(log::LevelFilter::Debug));
        assert!(config.logging.file.is_some());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_toml("[game]\nmax_inventory = 0").is_err());
        assert!(Config::from_toml("[logging]\nlevel = \"loud\"").is_err());
        assert!(Config::from_toml("[game\n").is_err());
    }

    #[test]
    fn missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("paradox.toml")).unwrap();
        assert_eq!(config, Config::default());

        let path = dir.path().join("custom.toml");
        fs::write(&path, "[game]\nmax_inventory = 7\n").unwrap();
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.game.max_inventory, 7);
    }
}
