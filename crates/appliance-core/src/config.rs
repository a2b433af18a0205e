use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:5001/api";
pub const API_URL_ENV: &str = "APPLIANCE_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub api_base_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_api_url(url: &str) -> Result<PathBuf> {
        let path = Self::get_config_path()?;
        let mut config = Self::load_from(&path).unwrap_or_else(|_| Self::new());
        config.api_base_url = Some(url.trim_end_matches('/').to_string());
        config.save_to(&path)?;
        Ok(path)
    }

    /// Pick the search service URL: explicit override, then the environment,
    /// then this file, then the built-in default.
    pub fn resolve_api_url(&self, override_url: Option<&str>) -> String {
        let env_url = std::env::var(API_URL_ENV).ok();
        pick_api_url(override_url, env_url.as_deref(), self.api_base_url.as_deref())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("appliance-chat"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}

fn pick_api_url(
    override_url: Option<&str>,
    env_url: Option<&str>,
    file_url: Option<&str>,
) -> String {
    [override_url, env_url, file_url]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .unwrap_or(DEFAULT_API_URL)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_base_url: Some("https://search.example.com/api".to_string()),
        };

        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn api_url_precedence() {
        assert_eq!(pick_api_url(None, None, None), DEFAULT_API_URL);
        assert_eq!(pick_api_url(None, None, Some("http://file")), "http://file");
        assert_eq!(pick_api_url(None, Some("http://env"), Some("http://file")), "http://env");
        assert_eq!(
            pick_api_url(Some("http://flag"), Some("http://env"), Some("http://file")),
            "http://flag"
        );
        assert_eq!(pick_api_url(Some("  "), None, Some("http://file")), "http://file");
    }
}
