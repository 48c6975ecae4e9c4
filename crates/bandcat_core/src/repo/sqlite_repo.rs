//! SQLite-backed catalog repository.
//!
//! # Responsibility
//! - Persist bands/songs in the `bands` and `songs` tables.
//! - Seed initial content once, per table, when a table is empty.
//!
//! Seeding runs inside one `BEGIN IMMEDIATE` transaction, so concurrent
//! openers of a fresh file see either no rows or the full seed.
//!
//! # Invariants
//! - Every operation opens its own connection and drops it on every exit path.
//! - All values reach SQL through bound parameters, never string formatting.
//! - `AUTOINCREMENT` ids start at 1; a non-positive rowid is reported as
//!   invalid data instead of being returned.

use crate::db::open_db;
use crate::model::band::{Band, BandId, NewBand};
use crate::model::song::{NewSong, Song, SongId, SongPatch};
use crate::model::{next_timestamp_after, now_epoch_ms};
use crate::repo::catalog_repo::{CatalogRepository, RepoError, RepoResult, StorageKind};
use crate::repo::seed::{seed_bands, seed_songs};
use crate::search::fuzzy::{rank_by_title, SearchOptions};
use log::{debug, info};
use rusqlite::{params, Connection, Row, ToSql, TransactionBehavior};
use std::path::{Path, PathBuf};

const BAND_SELECT_SQL: &str = "SELECT id, name, description, created_at FROM bands";

const SONG_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    lyrics,
    band,
    created_at,
    updated_at
FROM songs";

/// SQLite-backed catalog repository addressed by database file path.
#[derive(Debug, Clone)]
pub struct SqliteCatalogRepository {
    db_path: PathBuf,
    search: SearchOptions,
}

impl SqliteCatalogRepository {
    /// Opens (creating if needed) the database, applies migrations and seeds
    /// empty tables.
    pub fn open(db_path: impl Into<PathBuf>) -> RepoResult<Self> {
        Self::open_with(db_path, SearchOptions::default())
    }

    pub fn open_with(db_path: impl Into<PathBuf>, search: SearchOptions) -> RepoResult<Self> {
        let repo = Self {
            db_path: db_path.into(),
            search,
        };
        let mut conn = open_db(&repo.db_path)?;
        seed_if_empty(&mut conn)?;
        Ok(repo)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> RepoResult<T>) -> RepoResult<T> {
        let conn = open_db(&self.db_path)?;
        f(&conn)
    }
}

impl CatalogRepository for SqliteCatalogRepository {
    fn storage_kind(&self) -> StorageKind {
        StorageKind::Sqlite
    }

    fn get_all_bands(&self) -> RepoResult<Vec<Band>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{BAND_SELECT_SQL} ORDER BY name ASC;"))?;
            let mut rows = stmt.query([])?;
            let mut bands = Vec::new();
            while let Some(row) = rows.next()? {
                bands.push(parse_band_row(row)?);
            }
            Ok(bands)
        })
    }

    fn get_band_by_name(&self, name: &str) -> RepoResult<Option<Band>> {
        self.with_conn(|conn| find_band_by_name(conn, name))
    }

    fn get_band_by_id(&self, id: BandId) -> RepoResult<Option<Band>> {
        self.with_conn(|conn| find_band(conn, id))
    }

    fn create_band(&self, band: &NewBand) -> RepoResult<Band> {
        band.validate()?;
        self.with_conn(|conn| {
            if find_band_by_name(conn, &band.name)?.is_some() {
                return Err(RepoError::DuplicateBand(band.name.clone()));
            }
            let id = insert_band(conn, band, now_epoch_ms())?;
            debug!("event=band_create module=repo.sqlite status=ok band_id={id}");
            find_band(conn, id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("band {id} missing right after insert"))
            })
        })
    }

    fn get_all_songs(&self) -> RepoResult<Vec<Song>> {
        self.with_conn(|conn| {
            query_songs(
                conn,
                &format!("{SONG_SELECT_SQL} ORDER BY id ASC;"),
                params![],
            )
        })
    }

    fn get_songs_by_band(&self, band_name: &str) -> RepoResult<Vec<Song>> {
        self.with_conn(|conn| {
            query_songs(
                conn,
                &format!("{SONG_SELECT_SQL} WHERE band = ?1 ORDER BY id ASC;"),
                params![band_name],
            )
        })
    }

    fn search_songs_by_title(&self, query: &str) -> RepoResult<Vec<Song>> {
        // Candidates in id order, same as the file backend feeds the ranker.
        let candidates = self.get_all_songs()?;
        Ok(rank_by_title(candidates, query, &self.search))
    }

    fn get_song_by_id(&self, id: SongId) -> RepoResult<Option<Song>> {
        self.with_conn(|conn| find_song(conn, id))
    }

    fn create_song(&self, song: &NewSong) -> RepoResult<Song> {
        song.validate()?;
        self.with_conn(|conn| {
            ensure_band_exists(conn, &song.band)?;
            let id = insert_song(conn, song, now_epoch_ms())?;
            debug!("event=song_create module=repo.sqlite status=ok song_id={id}");
            find_song(conn, id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("song {id} missing right after insert"))
            })
        })
    }

    fn update_song(&self, id: SongId, patch: &SongPatch) -> RepoResult<Song> {
        patch.validate()?;
        self.with_conn(|conn| {
            let Some(mut song) = find_song(conn, id)? else {
                return Err(RepoError::NotFound(id));
            };
            if let Some(band) = &patch.band {
                ensure_band_exists(conn, band)?;
            }

            song.apply_patch(patch);
            song.updated_at = next_timestamp_after(song.updated_at);
            conn.execute(
                "UPDATE songs
                 SET
                    title = ?1,
                    author = ?2,
                    lyrics = ?3,
                    band = ?4,
                    updated_at = ?5
                 WHERE id = ?6;",
                params![
                    song.title.as_str(),
                    song.author.as_deref(),
                    song.lyrics.as_deref(),
                    song.band.as_str(),
                    song.updated_at,
                    id,
                ],
            )?;
            debug!("event=song_update module=repo.sqlite status=ok song_id={id}");
            Ok(song)
        })
    }

    fn delete_song(&self, id: SongId) -> RepoResult<()> {
        self.with_conn(|conn| {
            if find_song(conn, id)?.is_none() {
                return Err(RepoError::NotFound(id));
            }
            conn.execute("DELETE FROM songs WHERE id = ?1;", [id])?;
            debug!("event=song_delete module=repo.sqlite status=ok song_id={id}");
            Ok(())
        })
    }
}

fn seed_if_empty(conn: &mut Connection) -> RepoResult<()> {
    let now = now_epoch_ms();
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let seed_band_rows = table_is_empty(&tx, "SELECT COUNT(*) FROM bands;")?;
    if seed_band_rows {
        for band in seed_bands() {
            insert_band(&tx, &band, now)?;
        }
    }

    let seed_song_rows = table_is_empty(&tx, "SELECT COUNT(*) FROM songs;")?;
    if seed_song_rows {
        for song in seed_songs() {
            insert_song(&tx, &song, now)?;
        }
    }

    tx.commit()?;
    if seed_band_rows {
        info!("event=catalog_seed module=repo.sqlite status=ok table=bands");
    }
    if seed_song_rows {
        info!("event=catalog_seed module=repo.sqlite status=ok table=songs");
    }
    Ok(())
}

fn table_is_empty(conn: &Connection, count_sql: &str) -> RepoResult<bool> {
    let count: i64 = conn.query_row(count_sql, [], |row| row.get(0))?;
    Ok(count == 0)
}

fn insert_band(conn: &Connection, band: &NewBand, created_at: i64) -> RepoResult<BandId> {
    conn.execute(
        "INSERT INTO bands (name, description, created_at) VALUES (?1, ?2, ?3);",
        params![band.name.as_str(), band.description.as_str(), created_at],
    )?;
    checked_rowid(conn)
}

fn insert_song(conn: &Connection, song: &NewSong, now: i64) -> RepoResult<SongId> {
    conn.execute(
        "INSERT INTO songs (
            title,
            author,
            lyrics,
            band,
            created_at,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            song.title.as_str(),
            song.author.as_deref(),
            song.lyrics.as_deref(),
            song.band.as_str(),
            now,
            now,
        ],
    )?;
    checked_rowid(conn)
}

fn checked_rowid(conn: &Connection) -> RepoResult<i64> {
    match conn.last_insert_rowid() {
        id if id > 0 => Ok(id),
        other => Err(RepoError::InvalidData(format!(
            "storage assigned reserved identifier {other}"
        ))),
    }
}

fn ensure_band_exists(conn: &Connection, name: &str) -> RepoResult<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM bands WHERE name = ?1);",
        [name],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(RepoError::UnknownBand(name.to_string()))
    }
}

fn find_band_by_name(conn: &Connection, name: &str) -> RepoResult<Option<Band>> {
    let mut stmt = conn.prepare(&format!("{BAND_SELECT_SQL} WHERE name = ?1;"))?;
    let mut rows = stmt.query([name])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_band_row(row)?)),
        None => Ok(None),
    }
}

fn find_band(conn: &Connection, id: BandId) -> RepoResult<Option<Band>> {
    let mut stmt = conn.prepare(&format!("{BAND_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_band_row(row)?)),
        None => Ok(None),
    }
}

fn find_song(conn: &Connection, id: SongId) -> RepoResult<Option<Song>> {
    let mut stmt = conn.prepare(&format!("{SONG_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_song_row(row)?)),
        None => Ok(None),
    }
}

fn query_songs(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> RepoResult<Vec<Song>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut songs = Vec::new();
    while let Some(row) = rows.next()? {
        songs.push(parse_song_row(row)?);
    }
    Ok(songs)
}

fn parse_band_row(row: &Row<'_>) -> RepoResult<Band> {
    let band = Band {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
    };
    check_row("bands", band.id, "name", &band.name)?;
    Ok(band)
}

fn parse_song_row(row: &Row<'_>) -> RepoResult<Song> {
    let song = Song {
        id: row.get("id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        lyrics: row.get("lyrics")?,
        band: row.get("band")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    check_row("songs", song.id, "title", &song.title)?;
    Ok(song)
}

/// Rejects rows with a reserved id or a blank required text column.
fn check_row(table: &str, id: i64, column: &str, value: &str) -> RepoResult<()> {
    if id <= 0 {
        return Err(RepoError::InvalidData(format!(
            "invalid id `{id}` in {table}.id"
        )));
    }
    if value.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty value in {table}.{column} for id {id}"
        )));
    }
    Ok(())
}
