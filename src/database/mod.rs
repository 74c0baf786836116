//! SQLite Database Module
//!
//! Local statblock library: one `statblocks` table keyed by id, with a
//! case-insensitive unique name.

mod error;
mod migrations;
mod models;
mod statblocks;

pub use error::{StoreError, StoreResult};
pub use migrations::{get_current_version, run_migrations, SCHEMA_VERSION};
pub use models::*;
pub use statblocks::{StatblockOps, SEARCH_LIMIT};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// File name of the library database inside the data directory.
pub const DATABASE_FILE: &str = "statblocks.db";

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    path: PathBuf,
}

impl Database {
    /// Open (or create) the library in `data_dir` and apply migrations.
    pub async fn new(data_dir: &Path) -> Result<Self, sqlx::Error> {
        let db_path = data_dir.join(DATABASE_FILE);

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let url = format!("sqlite:{}?mode=rwc", db_path.display());
        let options = SqliteConnectOptions::from_str(&url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .connect_with(options)
            .await?;

        info!(path = %db_path.display(), "Opened statblock library");

        let db = Self { pool, path: db_path };
        migrations::run_migrations(&db.pool).await?;

        Ok(db)
    }

    /// Private in-memory library.
    ///
    /// Each SQLite memory connection is its own database, so the pool holds
    /// exactly one connection for its whole lifetime.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self {
            pool,
            path: PathBuf::from(":memory:"),
        };
        migrations::run_migrations(&db.pool).await?;

        Ok(db)
    }

    /// Get the underlying pool for direct queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get database file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
