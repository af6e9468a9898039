//! Layered configuration: built-in defaults, then `~/.millrun/config.json`,
//! then `MILLRUN_*` environment variables. CLI flags are applied last by
//! the caller.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::entry::ProductionType;
use crate::service::filter::DateRange;

pub const ENV_DATA_DIR: &str = "MILLRUN_DATA_DIR";
pub const ENV_USER: &str = "MILLRUN_USER";
pub const ENV_TYPE: &str = "MILLRUN_TYPE";
pub const ENV_LOG: &str = "MILLRUN_LOG";

const CONFIG_DIR_NAME: &str = ".millrun";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Root of the document store. Defaults to `~/.millrun`.
    pub data_dir: Option<PathBuf>,
    /// Signed-in owner id. Unset means signed out.
    pub user: Option<String>,
    pub production_type: Option<ProductionType>,
    pub date_range: Option<DateRange>,
    /// `EnvFilter` directive, e.g. `millrun_core=debug`.
    pub log_filter: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        let mut config = Config::default();

        if let Some(path) = Self::global_config_path() {
            if let Some(file) = Self::read_file(&path) {
                config.merge(file);
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Missing files are silent; unreadable or malformed ones are logged and skipped.
    pub fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config file");
                return None;
            }
        };
        match serde_json::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    /// Overrides from the environment, read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(user) = lookup(ENV_USER).filter(|v| !v.is_empty()) {
            self.user = Some(user);
        }
        if let Some(kind) = lookup(ENV_TYPE) {
            match kind.parse() {
                Ok(kind) => self.production_type = Some(kind),
                Err(e) => warn!(variable = ENV_TYPE, error = %e, "ignoring environment override"),
            }
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_filter = Some(filter);
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.user.is_some() {
            self.user = other.user;
        }
        if other.production_type.is_some() {
            self.production_type = other.production_type;
        }
        if other.date_range.is_some() {
            self.date_range = other.date_range;
        }
        if other.log_filter.is_some() {
            self.log_filter = other.log_filter;
        }
    }

    pub fn production_type(&self) -> ProductionType {
        self.production_type.unwrap_or_default()
    }

    /// The dashboard opens on the last 30 days unless configured otherwise.
    pub fn date_range(&self) -> DateRange {
        self.date_range.unwrap_or(DateRange::Last30Days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.production_type(), ProductionType::Knitting);
        assert_eq!(config.date_range(), DateRange::Last30Days);
        assert!(config.user.is_none());
    }

    #[test]
    fn test_merge_prefers_other_when_set() {
        let mut base = Config {
            user: Some("base".to_string()),
            date_range: Some(DateRange::Last7Days),
            ..Config::default()
        };
        base.merge(Config {
            user: Some("file".to_string()),
            ..Config::default()
        });
        assert_eq!(base.user.as_deref(), Some("file"));
        assert_eq!(base.date_range(), DateRange::Last7Days);
    }

    #[test]
    fn test_read_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(Config::read_file(&path).is_none());

        fs::write(&path, r#"{"user": "mill-7", "productionType": "dyeing", "dateRange": "90days"}"#).unwrap();
        let config = Config::read_file(&path).unwrap();
        assert_eq!(config.user.as_deref(), Some("mill-7"));
        assert_eq!(config.production_type(), ProductionType::Dyeing);
        assert_eq!(config.date_range(), DateRange::Last90Days);

        fs::write(&path, "{ broken").unwrap();
        assert!(Config::read_file(&path).is_none());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_USER, "env-user"),
            (ENV_TYPE, "garments"),
            (ENV_DATA_DIR, "/tmp/millrun"),
        ]);
        let mut config = Config {
            user: Some("file-user".to_string()),
            log_filter: Some("info".to_string()),
            ..Config::default()
        };
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.user.as_deref(), Some("env-user"));
        assert_eq!(config.production_type(), ProductionType::Garments);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/millrun")));
        assert_eq!(config.log_filter.as_deref(), Some("info"));
    }

    #[test]
    fn test_bad_env_type_is_ignored() {
        let mut config = Config {
            production_type: Some(ProductionType::Dyeing),
            ..Config::default()
        };
        config.apply_env(|key| (key == ENV_TYPE).then(|| "weaving".to_string()));
        assert_eq!(config.production_type(), ProductionType::Dyeing);
    }
}
