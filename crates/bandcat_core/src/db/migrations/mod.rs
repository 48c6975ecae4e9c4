//! Versioned schema for the relational catalog.
//!
//! # Invariants
//! - Versions are strictly increasing and start at 1.
//! - The applied version is mirrored to `PRAGMA user_version`.
//! - Pending steps run inside one immediate transaction; a failed step
//!   leaves the previous version in place.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, TransactionBehavior};

/// `(version, sql)` pairs in apply order.
const SCHEMA_STEPS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |(version, _)| *version)
}

/// Brings the connection's schema up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    if pending_steps(schema_version(conn)?)?.is_empty() {
        return Ok(());
    }

    // Re-read under the write lock: a concurrent opener may have migrated.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current = schema_version(&tx)?;
    let pending = pending_steps(current)?;
    if pending.is_empty() {
        return Ok(());
    }
    for (version, sql) in pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        current,
        latest_version()
    );
    Ok(())
}

fn pending_steps(current: u32) -> DbResult<Vec<(u32, &'static str)>> {
    let latest = latest_version();
    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    Ok(SCHEMA_STEPS
        .iter()
        .copied()
        .filter(|(version, _)| *version > current)
        .collect())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_steps, SCHEMA_STEPS};
    use crate::db::DbError;

    #[test]
    fn versions_are_strictly_increasing_from_one() {
        let versions = SCHEMA_STEPS.iter().map(|(v, _)| *v).collect::<Vec<_>>();
        assert_eq!(versions.first(), Some(&1));
        assert!(versions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn fresh_database_has_every_step_pending() {
        assert_eq!(pending_steps(0).unwrap().len(), SCHEMA_STEPS.len());
        assert!(pending_steps(latest_version()).unwrap().is_empty());
    }

    #[test]
    fn newer_database_is_rejected() {
        let err = pending_steps(latest_version() + 1).unwrap_err();
        assert!(matches!(err, DbError::UnsupportedSchemaVersion { .. }));
    }
}
