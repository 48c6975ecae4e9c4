//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide band lookup and song CRUD entry points over any backend.
//! - Apply listing filter precedence and pagination uniformly.
//! - Classify failures as not-found, validation or storage errors.
//!
//! # Invariants
//! - A `band` filter alone determines the listing; `title` is consulted only
//!   when `band` is absent.
//! - `total` is the filtered count, never the page length.
//! - An offset strictly greater than the filtered count is a validation
//!   error; an offset equal to it yields an empty page.

use crate::model::band::{Band, NewBand};
use crate::model::song::{NewSong, Song, SongId, SongPatch, SongValidationError};
use crate::repo::catalog_repo::{CatalogRepository, RepoError, StorageKind};
use log::warn;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_PAGE_INDEX: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Coarse error class used by callers to pick a client-facing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Storage,
}

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum CatalogError {
    BandNotFound(String),
    SongNotFound(SongId),
    InvalidSong(SongValidationError),
    /// A song write referenced a band name that does not exist.
    UnknownBand(String),
    InvalidBand(String),
    InvalidPage(String),
    PageOutOfRange { offset: u64, total: usize },
    Storage(RepoError),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BandNotFound(_) | Self::SongNotFound(_) => ErrorKind::NotFound,
            Self::InvalidSong(_)
            | Self::UnknownBand(_)
            | Self::InvalidBand(_)
            | Self::InvalidPage(_)
            | Self::PageOutOfRange { .. } => ErrorKind::Validation,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BandNotFound(name) => write!(f, "band not found: `{name}`"),
            Self::SongNotFound(id) => write!(f, "song not found: {id}"),
            Self::InvalidSong(err) => write!(f, "{err}"),
            Self::UnknownBand(name) => write!(f, "band does not exist: `{name}`"),
            Self::InvalidBand(message) => write!(f, "invalid band: {message}"),
            Self::InvalidPage(message) => write!(f, "invalid page: {message}"),
            Self::PageOutOfRange { offset, total } => {
                write!(f, "page offset {offset} exceeds result count {total}")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidSong(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::SongNotFound(id),
            RepoError::Validation(err) => Self::InvalidSong(err),
            RepoError::UnknownBand(name) => Self::UnknownBand(name),
            RepoError::BandValidation(err) => Self::InvalidBand(err.to_string()),
            RepoError::DuplicateBand(name) => {
                Self::InvalidBand(format!("band already exists: `{name}`"))
            }
            other => Self::Storage(other),
        }
    }
}

/// Listing request for songs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongListQuery {
    /// Exact band-name filter; takes precedence over `title`.
    pub band: Option<String>,
    /// Fuzzy title query; ignored when `band` is set.
    pub title: Option<String>,
    /// One-based page number.
    pub page_index: u32,
    pub page_size: u32,
}

impl Default for SongListQuery {
    fn default() -> Self {
        Self {
            band: None,
            title: None,
            page_index: DEFAULT_PAGE_INDEX,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of songs plus the full filtered count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongPage {
    pub songs: Vec<Song>,
    pub total: usize,
    pub page_index: u32,
    pub page_size: u32,
}

/// Use-case service wrapper over one catalog backend.
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.repo.storage_kind()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Lists every band by name, or exactly the named band.
    pub fn get_bands(&self, name: Option<&str>) -> CatalogResult<Vec<Band>> {
        match name {
            Some(name) => Ok(vec![self.get_band(name)?]),
            None => Ok(self.repo.get_all_bands()?),
        }
    }

    pub fn get_band(&self, name: &str) -> CatalogResult<Band> {
        self.repo
            .get_band_by_name(name)?
            .ok_or_else(|| CatalogError::BandNotFound(name.to_string()))
    }

    /// Internal band creation; the API layer does not expose it.
    pub fn create_band(&self, band: &NewBand) -> CatalogResult<Band> {
        Ok(self.repo.create_band(band)?)
    }

    /// Lists songs using filter precedence and one-based pagination.
    pub fn list_songs(&self, query: &SongListQuery) -> CatalogResult<SongPage> {
        validate_page(query.page_index, query.page_size)?;

        let songs = match (non_blank(&query.band), non_blank(&query.title)) {
            (Some(band), _) => self.repo.get_songs_by_band(band)?,
            (None, Some(title)) => self.repo.search_songs_by_title(title)?,
            (None, None) => self.repo.get_all_songs()?,
        };

        let (page, total) = paginate(songs, query.page_index, query.page_size)?;
        Ok(SongPage {
            songs: page,
            total,
            page_index: query.page_index,
            page_size: query.page_size,
        })
    }

    pub fn get_song(&self, id: SongId) -> CatalogResult<Song> {
        self.repo
            .get_song_by_id(id)?
            .ok_or(CatalogError::SongNotFound(id))
    }

    pub fn create_song(&self, song: &NewSong) -> CatalogResult<Song> {
        self.repo.create_song(song).map_err(log_write_failure)
    }

    /// Applies a partial update; absent fields are left untouched.
    pub fn update_song(&self, id: SongId, patch: &SongPatch) -> CatalogResult<Song> {
        self.repo.update_song(id, patch).map_err(log_write_failure)
    }

    /// Hard-deletes a song. A second delete of the same id is `SongNotFound`.
    pub fn delete_song(&self, id: SongId) -> CatalogResult<()> {
        self.repo.delete_song(id).map_err(log_write_failure)
    }
}

/// Slices `items` into the requested one-based page.
///
/// Returns the page and the full item count.
pub fn paginate<T>(
    items: Vec<T>,
    page_index: u32,
    page_size: u32,
) -> CatalogResult<(Vec<T>, usize)> {
    validate_page(page_index, page_size)?;

    let total = items.len();
    let offset = u64::from(page_index - 1) * u64::from(page_size);
    if offset > total as u64 {
        return Err(CatalogError::PageOutOfRange { offset, total });
    }

    let start = offset as usize;
    let end = total.min(start.saturating_add(page_size as usize));
    let page = items.into_iter().skip(start).take(end - start).collect();
    Ok((page, total))
}

fn validate_page(page_index: u32, page_size: u32) -> CatalogResult<()> {
    if page_index < 1 {
        return Err(CatalogError::InvalidPage(
            "page_index must be at least 1".to_string(),
        ));
    }
    if page_size < 1 || page_size > MAX_PAGE_SIZE {
        return Err(CatalogError::InvalidPage(format!(
            "page_size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok(())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}

fn log_write_failure(err: RepoError) -> CatalogError {
    let err = CatalogError::from(err);
    if err.kind() == ErrorKind::Storage {
        warn!("event=song_write module=service status=error error={err}");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::{paginate, CatalogError, ErrorKind};
    use crate::repo::catalog_repo::RepoError;

    #[test]
    fn second_page_of_fifteen_has_five_items() {
        let (page, total) = paginate((1..=15).collect::<Vec<_>>(), 2, 10).unwrap();
        assert_eq!(page, vec![11, 12, 13, 14, 15]);
        assert_eq!(total, 15);
    }

    #[test]
    fn offset_equal_to_total_is_an_empty_page() {
        let (page, total) = paginate((1..=10).collect::<Vec<_>>(), 2, 10).unwrap();
        assert!(page.is_empty());
        assert_eq!(total, 10);
    }

    #[test]
    fn offset_beyond_total_is_a_validation_error() {
        let err = paginate((1..=15).collect::<Vec<_>>(), 3, 10).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::PageOutOfRange {
                offset: 20,
                total: 15
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn first_page_of_empty_set_is_empty() {
        let (page, total) = paginate(Vec::<u8>::new(), 1, 10).unwrap();
        assert!(page.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn page_bounds_are_checked() {
        assert!(matches!(
            paginate(vec![1], 0, 10),
            Err(CatalogError::InvalidPage(_))
        ));
        assert!(matches!(
            paginate(vec![1], 1, 101),
            Err(CatalogError::InvalidPage(_))
        ));
    }

    #[test]
    fn repo_errors_map_to_semantic_kinds() {
        assert_eq!(
            CatalogError::from(RepoError::NotFound(4)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CatalogError::from(RepoError::UnknownBand("x".to_string())).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            CatalogError::from(RepoError::InvalidData("x".to_string())).kind(),
            ErrorKind::Storage
        );
    }
}
