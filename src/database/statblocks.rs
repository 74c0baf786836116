//! Statblock database operations
//!
//! Library CRUD plus the case-insensitive upsert used by imports.

use std::future::Future;

use sqlx::sqlite::{Sqlite, SqlitePool};
use sqlx::Row;
use tracing::{debug, info, instrument};

use super::error::{StoreError, StoreResult};
use super::models::{StatblockFilter, StatblockRecord, UpsertAction, UpsertOutcome};
use super::Database;
use crate::statblock::{defaults, CanonicalStatblock};

/// Maximum number of rows returned by [`StatblockOps::search_statblocks`].
pub const SEARCH_LIMIT: i64 = 10;

/// Highest `(Copy N)` suffix tried when duplicating.
const MAX_COPY_SUFFIX: usize = 100;

/// Extension trait for statblock library operations
pub trait StatblockOps {
    /// Insert, or replace the statblock whose name matches case-insensitively.
    ///
    /// An update keeps the existing `id`, `created_at` and `custom_type`.
    fn upsert_statblock(
        &self,
        statblock: &CanonicalStatblock,
    ) -> impl Future<Output = StoreResult<UpsertOutcome>> + Send;
    fn find_statblock_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = StoreResult<Option<StatblockRecord>>> + Send;
    fn get_statblock(
        &self,
        id: &str,
    ) -> impl Future<Output = StoreResult<Option<StatblockRecord>>> + Send;
    fn list_statblocks(
        &self,
        filter: &StatblockFilter,
    ) -> impl Future<Output = StoreResult<Vec<StatblockRecord>>> + Send;
    /// First matches on name or type, for quick pickers.
    fn search_statblocks(
        &self,
        query: &str,
    ) -> impl Future<Output = StoreResult<Vec<StatblockRecord>>> + Send;
    fn set_custom_type(
        &self,
        id: &str,
        custom_type: Option<&str>,
    ) -> impl Future<Output = StoreResult<StatblockRecord>> + Send;
    /// Copy a statblock under a free `"{name} (Copy)"` name with source `custom`.
    fn duplicate_statblock(
        &self,
        id: &str,
    ) -> impl Future<Output = StoreResult<StatblockRecord>> + Send;
    /// Returns whether a row was deleted.
    fn delete_statblock(&self, id: &str) -> impl Future<Output = StoreResult<bool>> + Send;
    fn count_statblocks(&self) -> impl Future<Output = StoreResult<i64>> + Send;
}

impl StatblockOps for Database {
    #[instrument(skip(self, statblock), fields(name = %statblock.name))]
    async fn upsert_statblock(&self, statblock: &CanonicalStatblock) -> StoreResult<UpsertOutcome> {
        if statblock.name.trim().is_empty() {
            return Err(StoreError::invalid("name is required"));
        }

        let outcome = match upsert_once(self.pool(), statblock).await {
            Err(err) if err.is_unique_violation() => {
                debug!("Concurrent insert for the same name, retrying as update");
                upsert_once(self.pool(), statblock).await?
            }
            result => result?,
        };

        info!(id = %outcome.record.id, action = %outcome.action, "Upserted statblock");
        Ok(outcome)
    }

    async fn find_statblock_by_name(&self, name: &str) -> StoreResult<Option<StatblockRecord>> {
        let record = sqlx::query_as::<_, StatblockRecord>(
            "SELECT * FROM statblocks WHERE name_key = ?"
        )
        .bind(StatblockRecord::key_for(name))
        .fetch_optional(self.pool())
        .await?;
        Ok(record)
    }

    async fn get_statblock(&self, id: &str) -> StoreResult<Option<StatblockRecord>> {
        let record = sqlx::query_as::<_, StatblockRecord>(
            "SELECT * FROM statblocks WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(record)
    }

    async fn list_statblocks(&self, filter: &StatblockFilter) -> StoreResult<Vec<StatblockRecord>> {
        let mut sql = String::from("SELECT * FROM statblocks WHERE 1=1");
        let mut params: Vec<FilterParam> = Vec::new();

        if let Some(query) = filter.query.as_deref().filter(|q| !q.trim().is_empty()) {
            sql.push_str(
                r#" AND (name LIKE ? ESCAPE '\'
                    OR creature_type LIKE ? ESCAPE '\'
                    OR EXISTS (SELECT 1 FROM json_each(statblocks.data, '$.tags')
                               WHERE json_each.value LIKE ? ESCAPE '\'))"#,
            );
            let pattern = like_pattern(query.trim());
            params.push(FilterParam::Text(pattern.clone()));
            params.push(FilterParam::Text(pattern.clone()));
            params.push(FilterParam::Text(pattern));
        }

        if let Some(creature_type) = &filter.creature_type {
            sql.push_str(" AND lower(creature_type) = lower(?)");
            params.push(FilterParam::Text(creature_type.clone()));
        }

        if let Some(cr) = filter.challenge_rating {
            sql.push_str(" AND challenge_rating = ?");
            params.push(FilterParam::Real(f64::from(cr)));
        }

        sql.push_str(&format!(
            " ORDER BY {} {}, name_key ASC",
            filter.sort_by.column(),
            filter.order.keyword()
        ));

        let mut query = sqlx::query_as::<_, StatblockRecord>(&sql);
        for param in params {
            query = match param {
                FilterParam::Text(text) => query.bind(text),
                FilterParam::Real(value) => query.bind(value),
            };
        }

        Ok(query.fetch_all(self.pool()).await?)
    }

    async fn search_statblocks(&self, query: &str) -> StoreResult<Vec<StatblockRecord>> {
        let pattern = like_pattern(query.trim());
        let records = sqlx::query_as::<_, StatblockRecord>(
            r#"
            SELECT * FROM statblocks
            WHERE name LIKE ? ESCAPE '\' OR creature_type LIKE ? ESCAPE '\'
            ORDER BY name_key ASC
            LIMIT ?
            "#
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(self.pool())
        .await?;
        Ok(records)
    }

    async fn set_custom_type(
        &self,
        id: &str,
        custom_type: Option<&str>,
    ) -> StoreResult<StatblockRecord> {
        let custom_type = custom_type.map(str::trim).filter(|t| !t.is_empty());
        let result = sqlx::query(
            "UPDATE statblocks SET custom_type = ?, updated_at = ? WHERE id = ?"
        )
        .bind(custom_type)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(id));
        }

        self.get_statblock(id)
            .await?
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn duplicate_statblock(&self, id: &str) -> StoreResult<StatblockRecord> {
        let original = self
            .get_statblock(id)
            .await?
            .ok_or_else(|| StoreError::not_found(id))?;

        let mut copy_name = None;
        for suffix in 1..=MAX_COPY_SUFFIX {
            let candidate = if suffix == 1 {
                format!("{} (Copy)", original.name)
            } else {
                format!("{} (Copy {})", original.name, suffix)
            };
            if self.find_statblock_by_name(&candidate).await?.is_none() {
                copy_name = Some(candidate);
                break;
            }
        }
        let copy_name = copy_name
            .ok_or_else(|| StoreError::invalid(format!("too many copies of {}", original.name)))?;

        let mut statblock = original.statblock()?;
        statblock.name = copy_name;
        statblock.source = defaults::CUSTOM_SOURCE.to_string();

        let mut record = StatblockRecord::new(&statblock)?;
        record.custom_type = original.custom_type.clone();
        insert_record(self.pool(), &record).await?;

        info!(id = %record.id, original = %original.id, "Duplicated statblock");
        Ok(record)
    }

    async fn delete_statblock(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM statblocks WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_statblocks(&self) -> StoreResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM statblocks")
            .fetch_one(self.pool())
            .await?;
        Ok(row.get::<i64, _>("count"))
    }
}

enum FilterParam {
    Text(String),
    Real(f64),
}

/// `%query%` with LIKE wildcards in the query escaped.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

async fn upsert_once(
    pool: &SqlitePool,
    statblock: &CanonicalStatblock,
) -> StoreResult<UpsertOutcome> {
    let name_key = StatblockRecord::key_for(&statblock.name);
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, StatblockRecord>(
        "SELECT * FROM statblocks WHERE name_key = ?"
    )
    .bind(&name_key)
    .fetch_optional(&mut *tx)
    .await?;

    let outcome = match existing {
        Some(previous) => {
            let record = StatblockRecord {
                name: statblock.name.clone(),
                name_key,
                creature_type: statblock.creature_type.clone(),
                challenge_rating: f64::from(statblock.challenge_rating.value()),
                source: statblock.source.clone(),
                data: serde_json::to_string(statblock)?,
                updated_at: chrono::Utc::now().to_rfc3339(),
                ..previous.clone()
            };

            sqlx::query(
                r#"
                UPDATE statblocks
                SET name = ?, name_key = ?, creature_type = ?, challenge_rating = ?,
                    source = ?, data = ?, updated_at = ?
                WHERE id = ?
                "#
            )
            .bind(&record.name)
            .bind(&record.name_key)
            .bind(&record.creature_type)
            .bind(record.challenge_rating)
            .bind(&record.source)
            .bind(&record.data)
            .bind(&record.updated_at)
            .bind(&record.id)
            .execute(&mut *tx)
            .await?;

            UpsertOutcome {
                action: UpsertAction::Updated,
                record,
                previous: Some(previous),
            }
        }
        None => {
            let record = StatblockRecord::new(statblock)?;
            insert_record(&mut *tx, &record).await?;
            UpsertOutcome {
                action: UpsertAction::Created,
                record,
                previous: None,
            }
        }
    };

    tx.commit().await?;
    Ok(outcome)
}

async fn insert_record<'e, E>(executor: E, record: &StatblockRecord) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO statblocks (id, name, name_key, creature_type, challenge_rating, source,
            custom_type, data, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#
    )
    .bind(&record.id)
    .bind(&record.name)
    .bind(&record.name_key)
    .bind(&record.creature_type)
    .bind(record.challenge_rating)
    .bind(&record.source)
    .bind(&record.custom_type)
    .bind(&record.data)
    .bind(&record.created_at)
    .bind(&record.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}
