//! # Unique ID Generator
//!
//! Named counters handing out sequential string ids, one per entity kind.
//!
//! ## Counter Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Counter State Machine                               │
//! │                                                                         │
//! │   Absent ──get_unique_id──► Present(1) ──get_unique_id──► Present(2)   │
//! │     ▲                                                        │          │
//! │     └──────────────────────── remove ────────────────────────┘          │
//! │                                                                         │
//! │  One statement does the whole step, so concurrent callers can never    │
//! │  read the same value:                                                   │
//! │                                                                         │
//! │    INSERT INTO counters (name, value) VALUES (?1, 1)                    │
//! │    ON CONFLICT(name) DO UPDATE SET value = value + 1                    │
//! │    RETURNING value                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `remove` exists for data resets only. Nothing else writes `counters`.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use petstore_core::validation::require;

use crate::error::{DbError, DbResult};
use crate::retry::RetryPolicy;

const NEXT_VALUE_SQL: &str = "INSERT INTO counters (name, value) VALUES (?1, 1) \
     ON CONFLICT(name) DO UPDATE SET value = value + 1 \
     RETURNING value";

/// Bumps counter `name` on an existing connection and returns the new value
/// as a string. Used by the entity store so minting joins its transaction.
pub(crate) async fn next_id_in(conn: &mut SqliteConnection, name: &str) -> DbResult<String> {
    require("counter name", name)?;

    let value: i64 = sqlx::query_scalar(NEXT_VALUE_SQL)
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    debug!(counter = %name, value, "Issued unique id");
    Ok(value.to_string())
}

/// Service handing out per-name sequential ids.
#[derive(Debug, Clone)]
pub struct UniqueIdGenerator {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl UniqueIdGenerator {
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        UniqueIdGenerator { pool, retry }
    }

    /// Returns the next id for `name`: `"1"` the first time, then `"2"`,
    /// `"3"`, ... Values are never reused while the counter exists.
    pub async fn get_unique_id(&self, name: &str) -> DbResult<String> {
        self.retry
            .run("get_unique_id", || async move {
                let mut conn = self.pool.acquire().await?;
                next_id_in(&mut conn, name).await
            })
            .await
    }

    /// The last id handed out for `name`, without bumping the counter.
    pub async fn current(&self, name: &str) -> DbResult<i64> {
        self.retry
            .run("current_counter", || async move {
                sqlx::query_scalar::<_, i64>("SELECT value FROM counters WHERE name = ?1")
                    .bind(name)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or_else(|| DbError::not_found("Counter", name))
            })
            .await
    }

    /// Deletes counter `name`; the next `get_unique_id` starts again at 1.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No counter with that name
    pub async fn remove(&self, name: &str) -> DbResult<()> {
        let result = self
            .retry
            .run("remove_counter", || async move {
                Ok(sqlx::query("DELETE FROM counters WHERE name = ?1")
                    .bind(name)
                    .execute(&self.pool)
                    .await?)
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Counter", name));
        }

        info!(counter = %name, "Counter removed");
        Ok(())
    }
}
