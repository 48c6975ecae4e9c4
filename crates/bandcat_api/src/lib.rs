//! HTTP-shaped API layer over the band/song catalog.
//!
//! # Responsibility
//! - Translate request inputs into `CatalogService` calls.
//! - Translate results and errors into status codes plus JSON bodies.
//!
//! # Invariants
//! - Handlers never panic; every outcome is an `ApiResponse`.
//! - Transport framing (routing, sockets) lives outside this crate.

pub mod api;

pub use api::{ApiResponse, CatalogApi, SongListParams};
