//! Database module
//!
//! Handles SQLite connection and migrations.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};

/// Open a migrated database in a temporary directory
#[cfg(test)]
pub(crate) fn test_database() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let database = Database::with_pool_size(dir.path().join("test.db"), 4).expect("open database");
    database
        .with_conn(migrations::run_migrations)
        .expect("run migrations");
    (dir, database)
}
