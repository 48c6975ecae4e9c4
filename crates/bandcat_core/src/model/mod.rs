//! Catalog domain model for bands and their songs.
//!
//! # Responsibility
//! - Define canonical band/song records shared by every storage backend.
//! - Own write-side input shapes (`NewSong`, `SongPatch`) and their checks.
//!
//! # Invariants
//! - Identifiers are backend-assigned positive integers; `0` is never valid.
//! - Timestamps are Unix epoch milliseconds.
//! - `Song::band` is a soft reference to `Band::name`, checked at write time only.

pub mod band;
pub mod song;

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall clock as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

/// Returns a timestamp strictly later than `previous`.
///
/// Keeps `updated_at` monotonic when two writes land in the same millisecond.
pub fn next_timestamp_after(previous: i64) -> i64 {
    now_epoch_ms().max(previous.saturating_add(1))
}
