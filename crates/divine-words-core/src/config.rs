use crate::gateway::{ProxyGateway, DEFAULT_TIMEOUT, DEFAULT_UPSTREAM_URL};
use crate::locale::Locale;
use crate::options::DEFAULT_RANGE_SPAN;
use crate::selection::Selection;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8016";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub upstream_url: String,
    pub timeout_secs: u64,
    pub range_span: u16,
    pub locale: Locale,
    pub translation: Option<String>,
    pub listen_addr: String,
    pub static_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            range_span: DEFAULT_RANGE_SPAN,
            locale: Locale::default(),
            translation: None,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            static_dir: None,
        }
    }

    /// Load from the user config directory, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::get_config_path()?)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
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

    /// Remember the locale and translation last chosen in the terminal front end
    pub fn save_choice(locale: Locale, translation: &str) -> Result<()> {
        let mut config = Self::load_from(&Self::get_config_path()?).unwrap_or_else(|_| Self::new());
        config.locale = locale;
        config.translation = Some(translation.to_string());
        config.save()
    }

    /// Override fields from environment variables, read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DIVINE_WORDS_UPSTREAM") {
            self.upstream_url = url;
        }
        if let Some(addr) = lookup("DIVINE_WORDS_LISTEN") {
            self.listen_addr = addr;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn gateway(&self) -> ProxyGateway {
        ProxyGateway::new(&self.upstream_url, self.timeout())
    }

    /// A fresh selection in the configured locale and remembered translation
    pub fn selection(&self) -> Selection {
        match &self.translation {
            Some(code) => Selection::with_translation(self.locale, code),
            None => Selection::new(self.locale),
        }
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("divine-words"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DIVINE_WORDS_UPSTREAM", "http://127.0.0.1:9000"),
            ("DIVINE_WORDS_LISTEN", "127.0.0.1:3000"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::new();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.upstream_url, "http://127.0.0.1:9000");
        assert_eq!(config.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.gateway().base_url(), "http://127.0.0.1:9000");

        // Unset variables leave the file values alone
        let mut config = Config::new();
        config.apply_env(|_| None);
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.range_span, 3);
        assert_eq!(config.listen_addr, "0.0.0.0:8016");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::new();
        config.locale = Locale::En;
        config.translation = Some("kjv".to_string());
        config.range_span = 5;
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "locale": "en", "timeout_secs": 3 }"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.upstream_url, DEFAULT_UPSTREAM_URL);
    }

    #[test]
    fn test_selection_uses_remembered_translation() {
        let mut config = Config::new();
        config.locale = Locale::En;
        config.translation = Some("asv".to_string());
        assert_eq!(config.selection().translation(), "asv");
        config.translation = Some("luther1912".to_string());
        assert_eq!(config.selection().translation(), "web");
    }
}
