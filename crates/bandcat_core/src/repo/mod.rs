//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the catalog data access contract shared by both backends.
//! - Isolate SQL and flat-file details from service orchestration.
//!
//! # Invariants
//! - Write paths validate input and band references before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `UnknownBand`) in
//!   addition to storage transport errors.
//! - Both backends produce identical results for identical data.

pub mod catalog_repo;
pub mod file_repo;
pub(crate) mod seed;
pub mod sqlite_repo;
