//! Core catalog logic for bands and songs.
//! This crate owns the storage contract and every catalog invariant.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{CatalogConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::band::{Band, BandId, BandValidationError, NewBand};
pub use model::song::{NewSong, Song, SongId, SongPatch, SongValidationError};
pub use repo::catalog_repo::{CatalogRepository, RepoError, RepoResult, StorageKind};
pub use repo::file_repo::{FileLocking, FileStoreOptions, JsonFileCatalogRepository};
pub use repo::sqlite_repo::SqliteCatalogRepository;
pub use search::fuzzy::{rank_by_title, title_similarity, SearchOptions};
pub use service::catalog_service::{
    CatalogError, CatalogResult, CatalogService, ErrorKind, SongListQuery, SongPage,
};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
