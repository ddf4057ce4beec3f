use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::{
    core::time::BusinessCalendar,
    errors::{LedgerError, Result},
    utils::{
        persistence::{read_json, write_json_atomic},
        PathResolver,
    },
};

const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// User preferences that shape aggregation and formatting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    /// Offset of the business timezone from UTC, used for day and month buckets.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "Config::default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_precision: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            utc_offset_minutes: 0,
            cache_ttl_secs: Self::default_cache_ttl_secs(),
            currency_precision: None,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn default_cache_ttl_secs() -> u64 {
        DEFAULT_CACHE_TTL_SECS
    }

    pub fn validate(&self) -> Result<()> {
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(LedgerError::ConfigError(format!(
                "utc offset of {} minutes is out of range",
                self.utc_offset_minutes
            )));
        }
        if self.cache_ttl_secs == 0 {
            return Err(LedgerError::ConfigError(
                "cache ttl must be at least one second".into(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(LedgerError::ConfigError("currency code is empty".into()));
        }
        Ok(())
    }

    /// Calendar that maps instants onto business days for this configuration.
    pub fn calendar(&self) -> Result<BusinessCalendar> {
        let offset = FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            LedgerError::ConfigError(format!(
                "invalid utc offset: {} minutes",
                self.utc_offset_minutes
            ))
        })?;
        Ok(BusinessCalendar::new(offset))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::seconds(self.cache_ttl_secs.min(i64::MAX as u64) as i64)
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(PathResolver::base_dir)
    }
}

/// Loads and saves [`Config`] as a JSON file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        fs::create_dir_all(PathResolver::config_dir_in(&base))?;
        Ok(Self::new(PathResolver::config_file_in(&base)))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Reads the stored configuration, falling back to defaults when no file exists.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }
        let config: Config = read_json(&self.config_path)
            .map_err(|err| LedgerError::ConfigError(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        write_json_atomic(&self.config_path, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache_ttl(), Duration::minutes(5));
    }

    #[test]
    fn legacy_file_without_new_fields_uses_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(
            manager.config_path(),
            r#"{"locale":"en-IN","currency":"INR"}"#,
        )
        .unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.currency, "INR");
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.utc_offset_minutes, 0);
    }

    #[test]
    fn rejects_out_of_range_offset() {
        let config = Config {
            utc_offset_minutes: 15 * 60,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LedgerError::ConfigError(_))
        ));
    }

    #[test]
    fn save_rejects_invalid_config_and_keeps_previous_file() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let good = Config {
            currency: "INR".into(),
            utc_offset_minutes: 330,
            ..Config::default()
        };
        manager.save(&good).unwrap();
        let bad = Config {
            cache_ttl_secs: 0,
            ..good.clone()
        };
        assert!(matches!(manager.save(&bad), Err(LedgerError::ConfigError(_))));
        assert_eq!(manager.load().unwrap(), good);
    }
}
