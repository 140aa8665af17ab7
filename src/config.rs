//! Client configuration: defaults, then the YAML file, then environment overrides.
//! Command-line flags are applied on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::constants::{APP_NAME, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, LOG_FILE_NAME};
use crate::storage::FileStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every request path is joined to
    pub api_url: String,
    /// `None` disables the request timeout
    pub timeout_secs: Option<u64>,
    /// Directory of the persisted session and document lists
    pub storage_dir: PathBuf,
    pub log_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            storage_dir: FileStore::default_dir(),
            log_file: None,
        }
    }
}

impl ClientConfig {
    /// `<config_dir>/gojob/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.yaml"))
    }

    /// Loads `path`, or the default file when it exists, then applies `GOJOB_*`
    /// environment variables. An explicit path that cannot be read is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(default) => Self::from_file(&default)?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Overrides from `GOJOB_API_URL`, `GOJOB_STORAGE_DIR` and `GOJOB_TIMEOUT_SECS`.
    /// A timeout of `0` disables it.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(url) = lookup("GOJOB_API_URL").filter(|v| !v.is_empty()) {
            self.api_url = url;
        }
        if let Some(dir) = lookup("GOJOB_STORAGE_DIR").filter(|v| !v.is_empty()) {
            self.storage_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup("GOJOB_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("GOJOB_TIMEOUT_SECS is not a number: {}", secs))?;
            self.timeout_secs = (secs > 0).then_some(secs);
        }
        Ok(())
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.storage_dir.join(LOG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_yaml_overrides_only_given_fields() {
        let config = ClientConfig::from_yaml_str("api_url: https://api.gojob.example/api\n").unwrap();
        assert_eq!(config.api_url, "https://api.gojob.example/api");
        assert_eq!(config.timeout_secs, Some(DEFAULT_TIMEOUT_SECS));
        assert_eq!(ClientConfig::from_yaml_str("").unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_env_beats_file() {
        let mut config = ClientConfig::from_yaml_str("timeout_secs: 30\nstorage_dir: /tmp/a\n").unwrap();
        let env: HashMap<&str, &str> =
            HashMap::from([("GOJOB_TIMEOUT_SECS", "0"), ("GOJOB_STORAGE_DIR", "/tmp/b")]);
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.timeout_secs, None);
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/b"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/b").join(LOG_FILE_NAME));
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let mut config = ClientConfig::default();
        assert!(config
            .apply_env(|key| (key == "GOJOB_TIMEOUT_SECS").then(|| "soon".to_string()))
            .is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(ClientConfig::load(Some(&missing)).is_err());

        let present = dir.path().join("config.yaml");
        fs::write(&present, "api_url: http://localhost:8000/api\n").unwrap();
        assert_eq!(
            ClientConfig::from_file(&present).unwrap().api_url,
            "http://localhost:8000/api"
        );
    }
}
