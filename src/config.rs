//! Configuration loaded from `~/.meetminder/config.json`.
//!
//! Every field has a serde default, so a missing file or a partial file is
//! fine. Environment variables override the file; CLI flags override both.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const ENV_OLLAMA_URL: &str = "MEETMINDER_OLLAMA_URL";
pub const ENV_MODEL: &str = "MEETMINDER_MODEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after a transport failure. Unparseable replies are never retried.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_url: default_ollama_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            db_path: None,
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    2
}

/// Get the state directory (~/.meetminder)
pub fn state_dir() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".meetminder"))
}

/// Get the canonical config file path (~/.meetminder/config.json)
pub fn config_path() -> Result<PathBuf, String> {
    Ok(state_dir()?.join("config.json"))
}

impl Config {
    /// Resolve the database path: explicit `dbPath` or `~/.meetminder/meetminder.db`.
    pub fn resolved_db_path(&self) -> Result<PathBuf, String> {
        match &self.db_path {
            Some(p) => Ok(p.clone()),
            None => Ok(state_dir()?.join("meetminder.db")),
        }
    }

    /// Apply environment overrides. Blank values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_OLLAMA_URL).filter(|v| !v.trim().is_empty()) {
            self.ollama_url = url.trim().to_string();
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            self.model = model.trim().to_string();
        }
    }
}

/// Load configuration from an explicit path. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        log::debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
}

/// Load configuration from ~/.meetminder/config.json (or `path`), then
/// apply environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config, String> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    let mut config = load_config_from(&path)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.model, "llama3.2:3b");
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "model": "mistral", "timeoutSecs": 30 }"#).unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.model, "mistral");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.ollama_url, "http://localhost:11434");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.starts_with("Failed to parse config"));
    }

    #[test]
    fn env_overrides_win_over_file() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            ENV_MODEL => Some("qwen2.5:7b".to_string()),
            ENV_OLLAMA_URL => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.model, "qwen2.5:7b");
        assert_eq!(config.ollama_url, "http://localhost:11434");
    }

    #[test]
    fn explicit_db_path_is_used() {
        let config = Config {
            db_path: Some(PathBuf::from("/tmp/m.db")),
            ..Config::default()
        };
        assert_eq!(config.resolved_db_path().unwrap(), PathBuf::from("/tmp/m.db"));
    }
}
