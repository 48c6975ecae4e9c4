//! Band domain model.
//!
//! # Invariants
//! - `name` is non-empty and unique (case-sensitive exact match).
//! - `id` and `created_at` never change after creation.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Backend-assigned band identifier.
pub type BandId = i64;

/// A seeded musical group, referenced by name from songs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub id: BandId,
    pub name: String,
    /// May be empty.
    pub description: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Input for internal band creation (seed and import paths).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBand {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NewBand {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Checks write-side invariants before persistence.
    pub fn validate(&self) -> Result<(), BandValidationError> {
        if self.name.trim().is_empty() {
            return Err(BandValidationError::EmptyName);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandValidationError {
    EmptyName,
}

impl Display for BandValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "band name cannot be empty"),
        }
    }
}

impl Error for BandValidationError {}
