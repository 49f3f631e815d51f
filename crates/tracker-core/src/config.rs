use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{TrackerError, TrackerResult, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Refetch the affected scope after a failed mutation instead of leaving
    /// the optimistic board state in place.
    #[serde(default = "default_resync_on_failure")]
    pub resync_on_failure: bool,
    /// Current user. Change-feed events authored by this user are ignored.
    #[serde(default)]
    pub user_id: Option<String>,
}

fn default_api_base_url() -> String {
    "http://localhost:8080/api/".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_request_timeout_ms() -> u64 {
    1000
}

fn default_resync_on_failure() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            request_timeout_ms: default_request_timeout_ms(),
            resync_on_failure: default_resync_on_failure(),
            user_id: None,
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/tracker/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("tracker/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("tracker\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Load the user config, silently falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load() -> Self {
        Self::config_path()
            .filter(|path| path.exists())
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> TrackerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> TrackerResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| TrackerError::Config(e.to_string()))?;
        if config.page_size == 0 {
            return Err(TrackerError::Config(
                "page_size must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.page_size, 100);
        assert_eq!(config.request_timeout_ms, 1000);
        assert!(config.resync_on_failure);
        assert!(config.user_id.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            api_base_url = "https://tracker.example.com/api/"
            resync_on_failure = false
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://tracker.example.com/api/");
        assert!(!config.resync_on_failure);
        assert_eq!(config.page_size, 100);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = AppConfig::from_toml_str("page_size = 0").unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size = 20\nuser_id = \"u-1\"").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.user_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml_str("page_size = [").unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }
}
