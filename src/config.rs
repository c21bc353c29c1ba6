//! Configuration management for forgechain

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use crate::chain::{MAX_DIFFICULTY, MIN_DIFFICULTY};

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub mining: MiningConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MiningConfig {
    /// Leading zero hex characters required of every mined block hash.
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_difficulty() -> u32 {
    5
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

/// Load `config.toml` from the working directory, falling back to defaults
/// when the file is absent.
pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    load_config_from("config.toml")
}

pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let config_str = fs::read_to_string(path).unwrap_or_default();
    let config: Config = if config_str.is_empty() {
        Config::default()
    } else {
        toml::from_str(&config_str)?
    };

    // Validate critical values
    if config.mining.difficulty < MIN_DIFFICULTY || config.mining.difficulty > MAX_DIFFICULTY {
        return Err(format!(
            "mining.difficulty must be between {} and {}, got {}",
            MIN_DIFFICULTY, MAX_DIFFICULTY, config.mining.difficulty
        )
        .into());
    }

    if config.api.bind_addr.parse::<SocketAddr>().is_err() {
        return Err(format!(
            "api.bind_addr is not a valid socket address: {}",
            config.api.bind_addr
        )
        .into());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config_from("/nonexistent/forgechain-config.toml").unwrap();
        assert_eq!(config.mining.difficulty, 5);
        assert_eq!(config.api.bind_addr, "0.0.0.0:5000");
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[mining]\ndifficulty = 2\n\n[api]\nbind_addr = \"127.0.0.1:9000\"").unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.mining.difficulty, 2);
        assert_eq!(config.api.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[mining]\ndifficulty = 3").unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.mining.difficulty, 3);
        assert_eq!(config.api.bind_addr, "0.0.0.0:5000");
    }

    #[test]
    fn out_of_range_difficulty_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[mining]\ndifficulty = 0").unwrap();
        assert!(load_config_from(file.path()).is_err());

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[mining]\ndifficulty = 65").unwrap();
        assert!(load_config_from(file.path()).is_err());
    }

    #[test]
    fn unparseable_bind_addr_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbind_addr = \"not-an-address\"").unwrap();
        assert!(load_config_from(file.path()).is_err());
    }
}
