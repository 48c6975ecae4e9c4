//! Title search shared by every storage backend.
//!
//! # Responsibility
//! - Score song titles against a free-text query.
//! - Rank candidates so both backends return the same order for the same data.

pub mod fuzzy;
