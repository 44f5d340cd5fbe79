use crate::core::session::{Scope, Session};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExchangeRateProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub retries: usize,
}

impl Default for ExchangeRateProviderConfig {
    fn default() -> Self {
        ExchangeRateProviderConfig {
            base_url: "https://open.er-api.com/v6".to_string(),
            timeout_secs: 10,
            retries: 0,
        }
    }
}

impl ExchangeRateProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub exchange_rate: ExchangeRateProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    /// Keep fetched rates on disk between runs.
    pub persist: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: 3600,
            persist: true,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Display currency for every aggregate.
    pub currency: String,
    #[serde(default)]
    pub scope: Scope,
    /// YAML ledger file. Relative paths resolve against the config file.
    pub ledger_path: Option<String>,
    pub data_path: Option<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "finboard", "finboard")
        .context("Could not determine project directories")
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    /// Directory holding the persistent rate cache.
    pub fn cache_path(&self) -> Result<PathBuf> {
        Ok(self.default_data_path()?.join("cache"))
    }

    /// The ledger file, defaulting to `ledger.yaml` in the data directory.
    pub fn ledger_path(&self) -> Result<PathBuf> {
        match &self.ledger_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(self.default_data_path()?.join("ledger.yaml")),
        }
    }

    pub fn session(&self) -> Session {
        Session::new(&self.currency).with_scope(self.scope)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        if let (Some(ledger), Some(dir)) = (&config.ledger_path, path.as_ref().parent()) {
            let ledger = PathBuf::from(ledger);
            if ledger.is_relative() {
                config.ledger_path = Some(dir.join(ledger).to_string_lossy().into_owned());
            }
        }
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
currency: "EUR"
scope: business
ledger_path: "/var/lib/finboard/ledger.yaml"
providers:
  exchange_rate:
    base_url: "http://example.com/rates"
    retries: 2
cache:
  ttl_secs: 60
  persist: false
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.scope, Scope::Business);
        assert_eq!(
            config.ledger_path().unwrap(),
            PathBuf::from("/var/lib/finboard/ledger.yaml")
        );
        assert_eq!(config.providers.exchange_rate.base_url, "http://example.com/rates");
        assert_eq!(config.providers.exchange_rate.retries, 2);
        assert_eq!(config.providers.exchange_rate.timeout(), Duration::from_secs(10));
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert!(!config.cache.persist);

        let session = config.session();
        assert_eq!(session.display_currency, "EUR");
        assert_eq!(session.scope, Scope::Business);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("currency: USD").unwrap();
        assert_eq!(config.scope, Scope::All);
        assert_eq!(config.providers, ProvidersConfig::default());
        assert_eq!(
            config.providers.exchange_rate.base_url,
            "https://open.er-api.com/v6"
        );
        assert_eq!(config.cache.ttl_secs, 3600);
        assert!(config.cache.persist);
    }

    #[test]
    fn test_missing_currency_is_an_error() {
        let result: Result<AppConfig, _> = serde_yaml::from_str("scope: personal");
        assert!(result.is_err());
    }

    #[test]
    fn test_paths_follow_data_path() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(
            &config_path,
            format!(
                "currency: USD\ndata_path: \"{}\"\n",
                temp_dir.path().join("data").display()
            ),
        )?;

        let config = AppConfig::load_from_path(&config_path)?;
        assert_eq!(config.cache_path()?, temp_dir.path().join("data").join("cache"));
        assert_eq!(
            config.ledger_path()?,
            temp_dir.path().join("data").join("ledger.yaml")
        );
        Ok(())
    }

    #[test]
    fn test_relative_ledger_resolves_against_config_dir() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "currency: USD\nledger_path: books/ledger.yaml\n")?;

        let config = AppConfig::load_from_path(&config_path)?;
        assert_eq!(
            config.ledger_path()?,
            temp_dir.path().join("books").join("ledger.yaml")
        );
        Ok(())
    }

    #[test]
    fn test_load_reports_path() {
        let err = AppConfig::load_from_path("/nonexistent/finboard.yaml").unwrap_err();
        assert!(
            err.to_string()
                .contains("Failed to read config file: /nonexistent/finboard.yaml")
        );
    }
}
