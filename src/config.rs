use crate::error::{AutolensError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const CLASSIFIER_URL_ENV: &str = "AUTOLENS_CLASSIFIER_URL";
pub const METADATA_URL_ENV: &str = "AUTOLENS_METADATA_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 判定API（`POST {url}/predict`）
    pub classifier_url: String,
    /// メタデータストア（`GET {url}/cars/{key}`）
    pub metadata_url: Option<String>,
    /// 静的カタログJSON（メタデータストア未設定時の照合先）
    pub catalog_path: Option<PathBuf>,
    pub classifier_timeout_seconds: u64,
    pub resolver_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier_url: "http://127.0.0.1:5000".into(),
            metadata_url: None,
            catalog_path: None,
            classifier_timeout_seconds: 30,
            resolver_timeout_seconds: 10,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AutolensError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("autolens").join("config.json"))
    }

    /// 判定APIのURL（環境変数を優先）
    pub fn classifier_url(&self) -> Result<String> {
        if let Ok(url) = std::env::var(CLASSIFIER_URL_ENV) {
            if !url.trim().is_empty() {
                return Ok(url);
            }
        }

        if self.classifier_url.trim().is_empty() {
            return Err(AutolensError::MissingEndpoint);
        }
        Ok(self.classifier_url.clone())
    }

    /// メタデータストアのURL（環境変数を優先）
    pub fn metadata_url(&self) -> Option<String> {
        std::env::var(METADATA_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.metadata_url.clone())
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(self.classifier_timeout_seconds.max(1))
    }

    pub fn resolver_timeout(&self) -> Duration {
        Duration::from_secs(self.resolver_timeout_seconds.max(1))
    }

    pub fn set_classifier_url(&mut self, url: String) -> Result<()> {
        self.classifier_url = url;
        self.save()
    }

    pub fn set_metadata_url(&mut self, url: String) -> Result<()> {
        self.metadata_url = if url.trim().is_empty() { None } else { Some(url) };
        self.save()
    }

    pub fn set_catalog_path(&mut self, path: PathBuf) -> Result<()> {
        if !path.exists() {
            return Err(AutolensError::FileNotFound(path.display().to_string()));
        }
        self.catalog_path = Some(path);
        self.save()
    }
}
