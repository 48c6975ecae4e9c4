//! Song domain model and write-side inputs.
//!
//! # Responsibility
//! - Define the persisted `Song` record.
//! - Define creation (`NewSong`) and partial-update (`SongPatch`) shapes.
//!
//! # Invariants
//! - `title` is never empty.
//! - `band` names an existing band at creation/update time.
//! - `updated_at` is refreshed on every successful update and never moves back.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Backend-assigned song identifier. `0` is reserved as "not created".
pub type SongId = i64;

/// A track owned by exactly one band (by name reference).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub author: Option<String>,
    pub lyrics: Option<String>,
    pub band: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Song {
    /// Applies the fields present in `patch`; absent fields stay untouched.
    ///
    /// Timestamps are owned by the backend and are not changed here.
    pub fn apply_patch(&mut self, patch: &SongPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(author) = &patch.author {
            self.author = Some(author.clone());
        }
        if let Some(lyrics) = &patch.lyrics {
            self.lyrics = Some(lyrics.clone());
        }
        if let Some(band) = &patch.band {
            self.band = band.clone();
        }
    }
}

/// Request shape for creating a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSong {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub lyrics: Option<String>,
    #[serde(default)]
    pub band: String,
}

impl NewSong {
    pub fn new(title: impl Into<String>, band: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
            lyrics: None,
            band: band.into(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_lyrics(mut self, lyrics: impl Into<String>) -> Self {
        self.lyrics = Some(lyrics.into());
        self
    }

    /// Checks required fields. Band existence is checked by the backend.
    pub fn validate(&self) -> Result<(), SongValidationError> {
        if self.title.trim().is_empty() {
            return Err(SongValidationError::EmptyTitle);
        }
        if self.band.trim().is_empty() {
            return Err(SongValidationError::EmptyBand);
        }
        Ok(())
    }
}

/// Partial update: only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub lyrics: Option<String>,
    #[serde(default)]
    pub band: Option<String>,
}

impl SongPatch {
    /// Supplied `title`/`band` values must not be blank.
    pub fn validate(&self) -> Result<(), SongValidationError> {
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(SongValidationError::EmptyTitle);
        }
        if matches!(&self.band, Some(band) if band.trim().is_empty()) {
            return Err(SongValidationError::EmptyBand);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongValidationError {
    EmptyTitle,
    EmptyBand,
}

impl Display for SongValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "song title cannot be empty"),
            Self::EmptyBand => write!(f, "song band cannot be empty"),
        }
    }
}

impl Error for SongValidationError {}

#[cfg(test)]
mod tests {
    use super::{NewSong, Song, SongPatch, SongValidationError};

    fn sample() -> Song {
        Song {
            id: 7,
            title: "春日影".to_string(),
            author: Some("CRYCHIC".to_string()),
            lyrics: None,
            band: "MyGO!!!!!".to_string(),
            created_at: 10,
            updated_at: 10,
        }
    }

    #[test]
    fn new_song_requires_title_and_band() {
        assert_eq!(
            NewSong::new("", "MyGO!!!!!").validate(),
            Err(SongValidationError::EmptyTitle)
        );
        assert_eq!(
            NewSong::new("影色舞", " ").validate(),
            Err(SongValidationError::EmptyBand)
        );
        assert!(NewSong::new("影色舞", "MyGO!!!!!").validate().is_ok());
    }

    #[test]
    fn patch_rejects_supplied_blank_title() {
        let patch = SongPatch {
            title: Some("  ".to_string()),
            ..SongPatch::default()
        };
        assert_eq!(patch.validate(), Err(SongValidationError::EmptyTitle));
        assert!(SongPatch::default().validate().is_ok());
    }

    #[test]
    fn apply_patch_only_touches_supplied_fields() {
        let mut song = sample();
        song.apply_patch(&SongPatch {
            lyrics: Some("...".to_string()),
            ..SongPatch::default()
        });

        assert_eq!(song.title, "春日影");
        assert_eq!(song.author.as_deref(), Some("CRYCHIC"));
        assert_eq!(song.lyrics.as_deref(), Some("..."));
        assert_eq!(song.band, "MyGO!!!!!");
        assert_eq!(song.updated_at, 10);
    }

    #[test]
    fn new_song_deserializes_with_optional_fields_missing() {
        let parsed: NewSong =
            serde_json::from_str(r#"{"title":"迷星叫","band":"MyGO!!!!!"}"#).unwrap();
        assert_eq!(parsed.author, None);
        assert_eq!(parsed.lyrics, None);
    }
}
