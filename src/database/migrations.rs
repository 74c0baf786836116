//! Database Migrations
//!
//! Versioned schema for the statblock library.

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::{info, warn};

/// Current database schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    let current_version = get_current_version(pool).await?;

    info!(current_version, target_version = SCHEMA_VERSION, "Checking database migrations");

    if current_version < SCHEMA_VERSION {
        info!("Running database migrations from v{} to v{}", current_version, SCHEMA_VERSION);

        for version in (current_version + 1)..=SCHEMA_VERSION {
            run_migration(pool, version).await?;
        }

        info!("Database migrations completed successfully");
    }

    Ok(())
}

/// Highest applied migration, or 0 for a fresh database.
pub async fn get_current_version(pool: &SqlitePool) -> Result<i32, sqlx::Error> {
    let result = sqlx::query("SELECT MAX(version) as version FROM _migrations")
        .fetch_optional(pool)
        .await?;

    Ok(result
        .and_then(|row| row.try_get::<i32, _>("version").ok())
        .unwrap_or(0))
}

async fn run_migration(pool: &SqlitePool, version: i32) -> Result<(), sqlx::Error> {
    let (name, sql) = match version {
        1 => ("statblocks_table", MIGRATION_V1),
        2 => ("statblock_custom_type", MIGRATION_V2),
        _ => {
            warn!("Unknown migration version: {}", version);
            return Ok(());
        }
    };

    info!("Applying migration v{}: {}", version, name);

    let mut tx = pool.begin().await?;
    for statement in sql.split(';').filter(|s| !s.trim().is_empty()) {
        sqlx::query(statement.trim()).execute(&mut *tx).await?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(version)
        .bind(name)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(())
}

/// Migration v1: statblock library
///
/// `name_key` is the lowercased name; its unique index backs the
/// case-insensitive upsert.
const MIGRATION_V1: &str = r#"
CREATE TABLE IF NOT EXISTS statblocks (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    name_key TEXT NOT NULL,
    creature_type TEXT NOT NULL DEFAULT 'unknown',
    challenge_rating REAL NOT NULL DEFAULT 0,
    source TEXT NOT NULL DEFAULT 'custom',
    data TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_statblocks_name_key ON statblocks(name_key);
CREATE INDEX IF NOT EXISTS idx_statblocks_type ON statblocks(creature_type);
CREATE INDEX IF NOT EXISTS idx_statblocks_cr ON statblocks(challenge_rating)
"#;

/// Migration v2: user-assigned grouping label
const MIGRATION_V2: &str = r#"
ALTER TABLE statblocks ADD COLUMN custom_type TEXT;
CREATE INDEX IF NOT EXISTS idx_statblocks_custom_type ON statblocks(custom_type)
"#;
