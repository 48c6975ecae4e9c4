//! Flat-file JSON catalog repository.
//!
//! # Responsibility
//! - Persist bands and songs as two pretty-printed JSON arrays.
//! - Seed initial content once, per file, when a file holds no records.
//!
//! # Invariants
//! - Every operation reads the full files; every mutation rewrites a full file.
//! - New ids are `max(id) + 1`, or `1` for an empty collection.
//! - Writes are not atomic: a crash mid-write can leave a truncated file,
//!   which later surfaces as `RepoError::Json`.
//! - With `FileLocking::None`, concurrent writers race on read-modify-write
//!   and can lose updates. `FileLocking::Exclusive` serializes every
//!   operation on the same data directory within this process.

use crate::model::band::{Band, BandId, NewBand};
use crate::model::song::{NewSong, Song, SongId, SongPatch};
use crate::model::{next_timestamp_after, now_epoch_ms};
use crate::repo::catalog_repo::{CatalogRepository, RepoError, RepoResult, StorageKind};
use crate::repo::seed::{seed_bands, seed_songs};
use crate::search::fuzzy::{rank_by_title, SearchOptions};
use log::{debug, info};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

pub const BAND_FILE_NAME: &str = "band_info.json";
pub const SONG_FILE_NAME: &str = "song_data.json";

static STORE_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Concurrency policy for read-modify-write cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileLocking {
    /// Single-writer assumption; concurrent writers may lose updates.
    #[default]
    None,
    /// Hold a process-wide lock for the data directory across each operation.
    Exclusive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FileStoreOptions {
    pub search: SearchOptions,
    pub locking: FileLocking,
}

/// JSON-file-backed catalog repository rooted at a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileCatalogRepository {
    data_dir: PathBuf,
    band_file: PathBuf,
    song_file: PathBuf,
    options: FileStoreOptions,
}

impl JsonFileCatalogRepository {
    /// Creates missing files as empty arrays and seeds empty collections.
    pub fn open(data_dir: impl Into<PathBuf>) -> RepoResult<Self> {
        Self::open_with(data_dir, FileStoreOptions::default())
    }

    pub fn open_with(data_dir: impl Into<PathBuf>, options: FileStoreOptions) -> RepoResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        let data_dir = std::fs::canonicalize(&data_dir)?;
        let repo = Self {
            band_file: data_dir.join(BAND_FILE_NAME),
            song_file: data_dir.join(SONG_FILE_NAME),
            data_dir,
            options,
        };
        repo.locked(|| {
            repo.ensure_file(&repo.band_file)?;
            repo.ensure_file(&repo.song_file)?;
            repo.seed_if_empty()
        })?;
        Ok(repo)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn band_file(&self) -> &Path {
        &self.band_file
    }

    pub fn song_file(&self) -> &Path {
        &self.song_file
    }

    pub(crate) fn read_bands(&self) -> RepoResult<Vec<Band>> {
        read_array(&self.band_file)
    }

    pub(crate) fn write_bands(&self, bands: &[Band]) -> RepoResult<()> {
        write_array(&self.band_file, bands)
    }

    pub(crate) fn read_songs(&self) -> RepoResult<Vec<Song>> {
        read_array(&self.song_file)
    }

    pub(crate) fn write_songs(&self, songs: &[Song]) -> RepoResult<()> {
        write_array(&self.song_file, songs)
    }

    fn locked<T>(&self, f: impl FnOnce() -> RepoResult<T>) -> RepoResult<T> {
        match self.options.locking {
            FileLocking::None => f(),
            FileLocking::Exclusive => {
                let lock = store_lock(&self.data_dir);
                let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
                f()
            }
        }
    }

    fn ensure_file(&self, path: &Path) -> RepoResult<()> {
        if !path.exists() {
            std::fs::write(path, b"[]")?;
        }
        Ok(())
    }

    fn seed_if_empty(&self) -> RepoResult<()> {
        let now = now_epoch_ms();

        let mut bands = self.read_bands()?;
        if bands.is_empty() {
            for band in seed_bands() {
                append_band(&mut bands, &band, now)?;
            }
            self.write_bands(&bands)?;
            info!("event=catalog_seed module=repo.file status=ok file=bands");
        }

        let mut songs = self.read_songs()?;
        if songs.is_empty() {
            for song in seed_songs() {
                append_song(&mut songs, &song, now)?;
            }
            self.write_songs(&songs)?;
            info!("event=catalog_seed module=repo.file status=ok file=songs");
        }

        Ok(())
    }

    fn ensure_band_exists(&self, name: &str) -> RepoResult<()> {
        if self.read_bands()?.iter().any(|band| band.name == name) {
            Ok(())
        } else {
            Err(RepoError::UnknownBand(name.to_string()))
        }
    }
}

impl CatalogRepository for JsonFileCatalogRepository {
    fn storage_kind(&self) -> StorageKind {
        StorageKind::File
    }

    fn get_all_bands(&self) -> RepoResult<Vec<Band>> {
        let mut bands = self.locked(|| self.read_bands())?;
        bands.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(bands)
    }

    fn get_band_by_name(&self, name: &str) -> RepoResult<Option<Band>> {
        let bands = self.locked(|| self.read_bands())?;
        Ok(bands.into_iter().find(|band| band.name == name))
    }

    fn get_band_by_id(&self, id: BandId) -> RepoResult<Option<Band>> {
        let bands = self.locked(|| self.read_bands())?;
        Ok(bands.into_iter().find(|band| band.id == id))
    }

    fn create_band(&self, band: &NewBand) -> RepoResult<Band> {
        band.validate()?;
        self.locked(|| {
            let mut bands = self.read_bands()?;
            if bands.iter().any(|existing| existing.name == band.name) {
                return Err(RepoError::DuplicateBand(band.name.clone()));
            }
            let created = append_band(&mut bands, band, now_epoch_ms())?;
            self.write_bands(&bands)?;
            debug!(
                "event=band_create module=repo.file status=ok band_id={}",
                created.id
            );
            Ok(created)
        })
    }

    fn get_all_songs(&self) -> RepoResult<Vec<Song>> {
        self.locked(|| self.read_songs())
    }

    fn get_songs_by_band(&self, band_name: &str) -> RepoResult<Vec<Song>> {
        let songs = self.locked(|| self.read_songs())?;
        Ok(songs
            .into_iter()
            .filter(|song| song.band == band_name)
            .collect())
    }

    fn search_songs_by_title(&self, query: &str) -> RepoResult<Vec<Song>> {
        let songs = self.locked(|| self.read_songs())?;
        Ok(rank_by_title(songs, query, &self.options.search))
    }

    fn get_song_by_id(&self, id: SongId) -> RepoResult<Option<Song>> {
        let songs = self.locked(|| self.read_songs())?;
        Ok(songs.into_iter().find(|song| song.id == id))
    }

    fn create_song(&self, song: &NewSong) -> RepoResult<Song> {
        song.validate()?;
        self.locked(|| {
            self.ensure_band_exists(&song.band)?;
            let mut songs = self.read_songs()?;
            let created = append_song(&mut songs, song, now_epoch_ms())?;
            self.write_songs(&songs)?;
            debug!(
                "event=song_create module=repo.file status=ok song_id={}",
                created.id
            );
            Ok(created)
        })
    }

    fn update_song(&self, id: SongId, patch: &SongPatch) -> RepoResult<Song> {
        patch.validate()?;
        self.locked(|| {
            let mut songs = self.read_songs()?;
            let Some(index) = songs.iter().position(|song| song.id == id) else {
                return Err(RepoError::NotFound(id));
            };
            if let Some(band) = &patch.band {
                self.ensure_band_exists(band)?;
            }

            let song = &mut songs[index];
            song.apply_patch(patch);
            song.updated_at = next_timestamp_after(song.updated_at);
            let updated = song.clone();
            self.write_songs(&songs)?;
            debug!("event=song_update module=repo.file status=ok song_id={id}");
            Ok(updated)
        })
    }

    fn delete_song(&self, id: SongId) -> RepoResult<()> {
        self.locked(|| {
            let mut songs = self.read_songs()?;
            let before = songs.len();
            songs.retain(|song| song.id != id);
            if songs.len() == before {
                return Err(RepoError::NotFound(id));
            }
            self.write_songs(&songs)?;
            debug!("event=song_delete module=repo.file status=ok song_id={id}");
            Ok(())
        })
    }
}

/// Appends a new song with the next id and returns a copy of it.
pub(crate) fn append_song(
    songs: &mut Vec<Song>,
    song: &NewSong,
    now: i64,
) -> RepoResult<Song> {
    let created = Song {
        id: next_id(songs.iter().map(|song| song.id))?,
        title: song.title.clone(),
        author: song.author.clone(),
        lyrics: song.lyrics.clone(),
        band: song.band.clone(),
        created_at: now,
        updated_at: now,
    };
    songs.push(created.clone());
    Ok(created)
}

fn append_band(bands: &mut Vec<Band>, band: &NewBand, now: i64) -> RepoResult<Band> {
    let created = Band {
        id: next_id(bands.iter().map(|band| band.id))?,
        name: band.name.clone(),
        description: band.description.clone(),
        created_at: now,
    };
    bands.push(created.clone());
    Ok(created)
}

fn next_id(ids: impl Iterator<Item = i64>) -> RepoResult<i64> {
    match ids.max() {
        None => Ok(1),
        Some(max) => max.max(0).checked_add(1).ok_or_else(|| {
            RepoError::InvalidData(format!("no identifier left after {max}"))
        }),
    }
}

fn store_lock(data_dir: &Path) -> Arc<Mutex<()>> {
    let mut locks = STORE_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    locks
        .entry(data_dir.to_path_buf())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

fn read_array<T: DeserializeOwned>(path: &Path) -> RepoResult<Vec<T>> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn write_array<T: Serialize>(path: &Path, items: &[T]) -> RepoResult<()> {
    let bytes = serde_json::to_vec_pretty(items)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
