//! Startup configuration and backend selection.
//!
//! # Responsibility
//! - Read `BANDCAT_*` environment settings into a typed config.
//! - Open exactly one backend for the process lifetime.
//!
//! # Invariants
//! - Call sites receive a `CatalogRepository` and never branch on backend.
//! - An absent fuzzy threshold keeps rank-and-return-all search behavior.

use crate::logging::{default_log_level, normalize_level};
use crate::repo::catalog_repo::{CatalogRepository, RepoResult, StorageKind};
use crate::repo::file_repo::{FileLocking, FileStoreOptions, JsonFileCatalogRepository};
use crate::repo::sqlite_repo::SqliteCatalogRepository;
use crate::search::fuzzy::SearchOptions;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_BACKEND: &str = "BANDCAT_BACKEND";
pub const ENV_DATA_DIR: &str = "BANDCAT_DATA_DIR";
pub const ENV_FUZZY_MIN_SCORE: &str = "BANDCAT_FUZZY_MIN_SCORE";
pub const ENV_FILE_LOCKING: &str = "BANDCAT_FILE_LOCKING";
pub const ENV_LOG_LEVEL: &str = "BANDCAT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BANDCAT_LOG_DIR";

const DEFAULT_DATA_DIR: &str = "data";
const SQLITE_FILE_NAME: &str = "band.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {}

/// Process-level catalog settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub backend: StorageKind,
    pub data_dir: PathBuf,
    pub search: SearchOptions,
    pub file_locking: FileLocking,
    pub log_level: &'static str,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: StorageKind::File,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            search: SearchOptions::default(),
            file_locking: FileLocking::None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CatalogConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(value) = read(ENV_BACKEND) {
            config.backend = StorageKind::parse(&value).ok_or(ConfigError::InvalidValue {
                key: ENV_BACKEND,
                value,
            })?;
        }
        if let Some(value) = read(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(value);
        }
        if let Some(value) = read(ENV_FUZZY_MIN_SCORE) {
            let min_score = value
                .parse::<f64>()
                .ok()
                .filter(|score| (0.0..=1.0).contains(score))
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_FUZZY_MIN_SCORE,
                    value,
                })?;
            config.search = SearchOptions::with_min_score(min_score);
        }
        if let Some(value) = read(ENV_FILE_LOCKING) {
            config.file_locking = match value.to_ascii_lowercase().as_str() {
                "none" | "off" | "false" => FileLocking::None,
                "exclusive" | "on" | "true" => FileLocking::Exclusive,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_FILE_LOCKING,
                        value,
                    })
                }
            };
        }
        if let Some(value) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&value).map_err(|_| ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                value,
            })?;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);

        Ok(config)
    }

    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join(SQLITE_FILE_NAME)
    }

    /// Opens the configured backend. This is the only backend switch.
    pub fn open_backend(&self) -> RepoResult<Box<dyn CatalogRepository>> {
        info!(
            "event=backend_open module=config status=start backend={}",
            self.backend.as_str()
        );
        let repo: Box<dyn CatalogRepository> = match self.backend {
            StorageKind::Sqlite => Box::new(SqliteCatalogRepository::open_with(
                self.sqlite_path(),
                self.search,
            )?),
            StorageKind::File => Box::new(JsonFileCatalogRepository::open_with(
                &self.data_dir,
                FileStoreOptions {
                    search: self.search,
                    locking: self.file_locking,
                },
            )?),
        };
        Ok(repo)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CatalogConfig, ConfigError, ENV_BACKEND, ENV_DATA_DIR, ENV_FILE_LOCKING,
        ENV_FUZZY_MIN_SCORE, ENV_LOG_LEVEL,
    };
    use crate::repo::catalog_repo::StorageKind;
    use crate::repo::file_repo::FileLocking;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn defaults_use_file_backend_without_threshold() {
        let config = CatalogConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.backend, StorageKind::File);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.search.min_score, None);
        assert_eq!(config.file_locking, FileLocking::None);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn values_are_parsed_and_trimmed() {
        let config = CatalogConfig::from_lookup(lookup(&[
            (ENV_BACKEND, " sqlite "),
            (ENV_DATA_DIR, "/var/lib/bandcat"),
            (ENV_FUZZY_MIN_SCORE, "0.35"),
            (ENV_FILE_LOCKING, "exclusive"),
            (ENV_LOG_LEVEL, "WARN"),
        ]))
        .unwrap();

        assert_eq!(config.backend, StorageKind::Sqlite);
        assert_eq!(
            config.sqlite_path(),
            PathBuf::from("/var/lib/bandcat/band.db")
        );
        assert_eq!(config.search.min_score, Some(0.35));
        assert_eq!(config.file_locking, FileLocking::Exclusive);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = CatalogConfig::from_lookup(lookup(&[(ENV_FUZZY_MIN_SCORE, "1.5")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_FUZZY_MIN_SCORE,
                value: "1.5".to_string()
            }
        );
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(CatalogConfig::from_lookup(lookup(&[(ENV_BACKEND, "redis")])).is_err());
    }

    #[test]
    fn open_backend_honors_selected_kind() {
        let dir = tempfile::tempdir().unwrap();
        for kind in [StorageKind::File, StorageKind::Sqlite] {
            let config = CatalogConfig {
                backend: kind,
                data_dir: dir.path().join(kind.as_str()),
                ..CatalogConfig::default()
            };
            let repo = config.open_backend().unwrap();
            assert_eq!(repo.storage_kind(), kind);
            assert_eq!(repo.get_all_bands().unwrap().len(), 3);
        }
    }
}
