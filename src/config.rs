use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{error::Result, history::DEFAULT_CAPACITY};

pub const CONFIG_FILE_NAME: &str = "rollkeeper.json";

/// Settings loaded from `rollkeeper.json` in the data directory. Every field
/// is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub history_capacity: usize,
    /// How long a front end waits before revealing a result.
    pub reveal_delay_ms: u64,
    pub default_bonus: i32,
    pub history_file: String,
    /// Store shared with companion surfaces.
    pub companion_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            reveal_delay_ms: 2000,
            default_bonus: 0,
            history_file: "history.json".to_string(),
            companion_file: "companion.json".to_string(),
        }
    }
}

impl Config {
    /// Loads `rollkeeper.json` from `data_dir`, or the defaults if there is
    /// none. Unlike persisted roll data, a malformed config is an error.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let file = std::fs::File::open(&path)?;
        let reader = std::io::BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)?;
        if config.history_capacity == 0 {
            log::warn!("historyCapacity of 0 is not usable, falling back to {DEFAULT_CAPACITY}");
            config.history_capacity = DEFAULT_CAPACITY;
        }
        log::debug!("Loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.reveal_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "historyCapacity": 20, "defaultBonus": 3 }"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.history_capacity, 20);
        assert_eq!(config.default_bonus, 3);
        assert_eq!(config.history_file, "history.json");
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "historyCapacity = 20").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }
}
