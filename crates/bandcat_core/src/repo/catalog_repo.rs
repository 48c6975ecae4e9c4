//! Catalog repository contract and shared error type.
//!
//! # Responsibility
//! - Declare the band/song operations every backend must satisfy.
//! - Provide one error taxonomy for SQLite and JSON-file storage.
//!
//! # Invariants
//! - `get_all_bands` is ordered by `name` ascending.
//! - `get_all_songs` and `get_songs_by_band` are in insertion (`id`) order.
//! - `update_song` and `delete_song` report `NotFound` without touching storage.

use crate::db::DbError;
use crate::model::band::{Band, BandId, BandValidationError, NewBand};
use crate::model::song::{NewSong, Song, SongId, SongPatch, SongValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(SongValidationError),
    BandValidation(BandValidationError),
    /// A song write referenced a band name that does not exist.
    UnknownBand(String),
    DuplicateBand(String),
    NotFound(SongId),
    Db(DbError),
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::BandValidation(err) => write!(f, "{err}"),
            Self::UnknownBand(name) => write!(f, "band does not exist: `{name}`"),
            Self::DuplicateBand(name) => write!(f, "band already exists: `{name}`"),
            Self::NotFound(id) => write!(f, "song not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "storage io failed: {err}"),
            Self::Json(err) => write!(f, "malformed catalog file: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::BandValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::UnknownBand(_)
            | Self::DuplicateBand(_)
            | Self::NotFound(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<SongValidationError> for RepoError {
    fn from(value: SongValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<BandValidationError> for RepoError {
    fn from(value: BandValidationError) -> Self {
        Self::BandValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Which persistence implementation backs a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    File,
    Sqlite,
}

impl StorageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Sqlite => "sqlite",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" | "json" => Some(Self::File),
            "sqlite" | "db" | "database" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

/// Repository interface for the band/song catalog.
pub trait CatalogRepository {
    fn storage_kind(&self) -> StorageKind;

    fn get_all_bands(&self) -> RepoResult<Vec<Band>>;
    fn get_band_by_name(&self, name: &str) -> RepoResult<Option<Band>>;
    fn get_band_by_id(&self, id: BandId) -> RepoResult<Option<Band>>;
    /// Internal creation path; not exposed through the API layer.
    fn create_band(&self, band: &NewBand) -> RepoResult<Band>;

    fn get_all_songs(&self) -> RepoResult<Vec<Song>>;
    fn get_songs_by_band(&self, band_name: &str) -> RepoResult<Vec<Song>>;
    /// Returns songs ranked by descending title similarity.
    fn search_songs_by_title(&self, query: &str) -> RepoResult<Vec<Song>>;
    fn get_song_by_id(&self, id: SongId) -> RepoResult<Option<Song>>;
    fn create_song(&self, song: &NewSong) -> RepoResult<Song>;
    fn update_song(&self, id: SongId, patch: &SongPatch) -> RepoResult<Song>;
    fn delete_song(&self, id: SongId) -> RepoResult<()>;
}

impl<R: CatalogRepository + ?Sized> CatalogRepository for Box<R> {
    fn storage_kind(&self) -> StorageKind {
        (**self).storage_kind()
    }

    fn get_all_bands(&self) -> RepoResult<Vec<Band>> {
        (**self).get_all_bands()
    }

    fn get_band_by_name(&self, name: &str) -> RepoResult<Option<Band>> {
        (**self).get_band_by_name(name)
    }

    fn get_band_by_id(&self, id: BandId) -> RepoResult<Option<Band>> {
        (**self).get_band_by_id(id)
    }

    fn create_band(&self, band: &NewBand) -> RepoResult<Band> {
        (**self).create_band(band)
    }

    fn get_all_songs(&self) -> RepoResult<Vec<Song>> {
        (**self).get_all_songs()
    }

    fn get_songs_by_band(&self, band_name: &str) -> RepoResult<Vec<Song>> {
        (**self).get_songs_by_band(band_name)
    }

    fn search_songs_by_title(&self, query: &str) -> RepoResult<Vec<Song>> {
        (**self).search_songs_by_title(query)
    }

    fn get_song_by_id(&self, id: SongId) -> RepoResult<Option<Song>> {
        (**self).get_song_by_id(id)
    }

    fn create_song(&self, song: &NewSong) -> RepoResult<Song> {
        (**self).create_song(song)
    }

    fn update_song(&self, id: SongId, patch: &SongPatch) -> RepoResult<Song> {
        (**self).update_song(id, patch)
    }

    fn delete_song(&self, id: SongId) -> RepoResult<()> {
        (**self).delete_song(id)
    }
}

#[cfg(test)]
mod tests {
    use super::StorageKind;

    #[test]
    fn storage_kind_parses_aliases() {
        assert_eq!(StorageKind::parse(" SQLite "), Some(StorageKind::Sqlite));
        assert_eq!(StorageKind::parse("json"), Some(StorageKind::File));
        assert_eq!(StorageKind::parse("redis"), None);
    }
}
