//! # Entity Store
//!
//! Generic CRUD over every persisted record kind.
//!
//! ## How It Fits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Entity Store                                   │
//! │                                                                         │
//! │  impl Entity for Category { KIND, TABLE, COLUMNS, bind_columns }       │
//! │       │        (repository/category.rs, one impl per record kind)      │
//! │       ▼                                                                 │
//! │  EntityStore<Category>                                                 │
//! │  ├── find_by_id / find_all           ── NotFound on empty results      │
//! │  ├── insert      (id unset → mint from counter "Category")             │
//! │  │               (id set   → PRIMARY KEY decides, DuplicateKey)        │
//! │  ├── upsert      explicit insert-or-merge                              │
//! │  ├── update      NotFound when no row matched                          │
//! │  └── remove      load + delete in one transaction                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RetryPolicy::run ── re-runs on Busy / PoolExhausted only              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (one statement or one transaction per operation)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The SQL is derived from the `Entity` constants at call time, so there is
//! no runtime reflection and no per-kind query code in this module.
//!
//! ## Transactions
//! The `*_in` variants take a borrowed connection. They let a service write
//! several records (an order and its lines) in one transaction. Ids minted
//! inside a transaction use the same connection.

use std::marker::PhantomData;

use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use petstore_core::ValidationError;

use crate::error::{DbError, DbResult};
use crate::retry::RetryPolicy;
use crate::uidgen;

/// A query with its arguments still being bound.
pub type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

// =============================================================================
// Entity Trait
// =============================================================================

/// Compile-time description of a persisted record kind.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Clone + Send + Sync + Unpin + 'static {
    /// Kind name. Doubles as the id counter name and the label in errors.
    const KIND: &'static str;

    /// Backing table.
    const TABLE: &'static str;

    /// Every column, `id` first, then in the order `bind_columns` binds them.
    const COLUMNS: &'static [&'static str];

    /// The id, or `None` when unset or blank.
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    /// Binds every column after `id`, in `COLUMNS` order.
    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;
}

/// Treats a blank id the same as a missing one.
pub(crate) fn non_blank(id: &Option<String>) -> Option<&str> {
    id.as_deref().filter(|id| !id.trim().is_empty())
}

// =============================================================================
// SQL Builders
// =============================================================================

fn select_list<E: Entity>() -> String {
    E::COLUMNS.join(", ")
}

fn select_by_id_sql<E: Entity>() -> String {
    format!("SELECT {} FROM {} WHERE id = ?1", select_list::<E>(), E::TABLE)
}

fn insert_sql<E: Entity>() -> String {
    let placeholders: Vec<String> = (1..=E::COLUMNS.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        E::TABLE,
        select_list::<E>(),
        placeholders.join(", ")
    )
}

fn update_sql<E: Entity>() -> String {
    let assignments: Vec<String> = E::COLUMNS
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, column)| format!("{column} = ?{}", i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE id = ?1",
        E::TABLE,
        assignments.join(", ")
    )
}

fn upsert_sql<E: Entity>() -> String {
    let assignments: Vec<String> = E::COLUMNS
        .iter()
        .skip(1)
        .map(|column| format!("{column} = excluded.{column}"))
        .collect();
    format!(
        "{} ON CONFLICT(id) DO UPDATE SET {}",
        insert_sql::<E>(),
        assignments.join(", ")
    )
}

fn delete_sql<E: Entity>() -> String {
    format!("DELETE FROM {} WHERE id = ?1", E::TABLE)
}

/// Ids minted in a row for one insert before giving up on finding a free one.
pub const MAX_MINT_ATTEMPTS: u32 = 32;

/// Rewrites a primary key conflict into a DuplicateKey for this kind and id.
fn conflict_as_duplicate<E: Entity>(err: sqlx::Error, id: &str) -> DbError {
    match DbError::from(err) {
        DbError::DuplicateKey { .. } => DbError::duplicate(E::KIND, id),
        other => other,
    }
}

// =============================================================================
// Entity Store
// =============================================================================

/// Generic store for one entity kind.
///
/// Cheap to construct and clone; obtain one from `Database::categories()`
/// and friends, or `Database::store::<E>()`.
#[derive(Debug)]
pub struct EntityStore<E: Entity> {
    pool: SqlitePool,
    retry: RetryPolicy,
    _kind: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for EntityStore<E> {
    fn clone(&self) -> Self {
        EntityStore::new(self.pool.clone(), self.retry)
    }
}

impl<E: Entity> EntityStore<E> {
    /// Creates a new store over `pool`.
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        EntityStore {
            pool,
            retry,
            _kind: PhantomData,
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Loads the entity with `id`.
    ///
    /// ## Returns
    /// * `Ok(E)` - Entity found
    /// * `Err(DbError::NotFound)` - `id` is empty or unknown
    pub async fn find_by_id(&self, id: &str) -> DbResult<E> {
        if id.trim().is_empty() {
            return Err(DbError::not_found(E::KIND, id));
        }

        self.retry
            .run("find_by_id", || async move {
                let mut conn = self.pool.acquire().await?;
                Self::fetch_in(&mut conn, id)
                    .await?
                    .ok_or_else(|| DbError::not_found(E::KIND, id))
            })
            .await
    }

    /// Loads every entity of this kind in insertion order.
    ///
    /// An empty table is reported as NotFound, so callers can tell
    /// "no data yet" from a successful query.
    pub async fn find_all(&self) -> DbResult<Vec<E>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY rowid",
            select_list::<E>(),
            E::TABLE
        );
        let sql = sql.as_str();

        let entities = self
            .retry
            .run("find_all", || async move {
                Ok(sqlx::query_as::<_, E>(sql).fetch_all(&self.pool).await?)
            })
            .await?;

        if entities.is_empty() {
            return Err(DbError::not_found(E::KIND, "*"));
        }

        debug!(entity = E::KIND, count = entities.len(), "Loaded all entities");
        Ok(entities)
    }

    /// Loads the entities whose `column` equals `value`, in insertion order.
    ///
    /// `column` must be one of `E::COLUMNS`. No match is NotFound.
    pub async fn find_by_column(&self, column: &'static str, value: &str) -> DbResult<Vec<E>> {
        let filter = format!("{column} = ?1");
        self.find_filtered(&filter, &[value], &format!("{column}={value}"))
            .await
    }

    /// Loads the entities matching a SQL `filter` with positional `params`.
    ///
    /// `label` names the lookup in the NotFound error.
    pub(crate) async fn find_filtered(
        &self,
        filter: &str,
        params: &[&str],
        label: &str,
    ) -> DbResult<Vec<E>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY rowid",
            select_list::<E>(),
            E::TABLE,
            filter
        );
        let sql = sql.as_str();

        let entities = self
            .retry
            .run("find_filtered", || async move {
                let mut query = sqlx::query_as::<_, E>(sql);
                for param in params {
                    query = query.bind(*param);
                }
                Ok(query.fetch_all(&self.pool).await?)
            })
            .await?;

        if entities.is_empty() {
            return Err(DbError::not_found(E::KIND, label));
        }
        Ok(entities)
    }

    /// Whether an entity with `id` is stored.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        match self.find_by_id(id).await {
            Ok(_) => Ok(true),
            Err(DbError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Counts stored entities of this kind.
    pub async fn count(&self) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
        let sql = sql.as_str();
        self.retry
            .run("count", || async move {
                Ok(sqlx::query_scalar::<_, i64>(sql)
                    .fetch_one(&self.pool)
                    .await?)
            })
            .await
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Stores a new entity and returns it with its id set.
    ///
    /// ## Id Policy
    /// ```text
    /// id unset ──► next value of counter E::KIND ──► INSERT
    ///                  ▲                               │
    ///                  └──── id already taken ◄────────┘
    /// id set   ──► INSERT ──► PRIMARY KEY conflict ──► DuplicateKey
    /// ```
    /// Minting and inserting share one transaction. `insert` never merges
    /// into an existing row; use [`EntityStore::upsert`] for that.
    pub async fn insert(&self, entity: E) -> DbResult<E> {
        self.retry
            .run("insert", || {
                let entity = entity.clone();
                async move {
                    let mut tx = self.pool.begin().await?;
                    let stored = Self::insert_in(&mut tx, entity).await?;
                    tx.commit().await?;
                    Ok(stored)
                }
            })
            .await
    }

    /// Inserts the entity, or merges it into the row with the same id.
    ///
    /// The id must be set. This is the only write that may overwrite.
    pub async fn upsert(&self, entity: E) -> DbResult<E> {
        let Some(id) = entity.id().map(str::to_string) else {
            return Err(ValidationError::required("id").into());
        };

        debug!(entity = E::KIND, id = %id, "Upserting entity");

        let sql = upsert_sql::<E>();
        let (sql, id, stored) = (sql.as_str(), id.as_str(), &entity);
        self.retry
            .run("upsert", || async move {
                let query = sqlx::query(sql).bind(id.to_string());
                stored.bind_columns(query).execute(&self.pool).await?;
                Ok(())
            })
            .await?;

        Ok(entity)
    }

    /// Overwrites the stored state of an existing entity.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - No entity with that id (store unchanged)
    pub async fn update(&self, entity: &E) -> DbResult<()> {
        self.retry
            .run("update", || async move {
                let mut conn = self.pool.acquire().await?;
                Self::update_in(&mut conn, entity).await
            })
            .await
    }

    /// Deletes the entity with `id` and returns it as it was at deletion.
    ///
    /// Load and delete run in one transaction.
    pub async fn remove(&self, id: &str) -> DbResult<E> {
        if id.trim().is_empty() {
            return Err(DbError::not_found(E::KIND, id));
        }

        self.retry
            .run("remove", || async move {
                let mut tx = self.pool.begin().await?;
                let removed = Self::remove_in(&mut tx, id).await?;
                tx.commit().await?;
                Ok(removed)
            })
            .await
    }

    /// Flushes the caller's in-memory state, then deletes the row.
    ///
    /// Both steps run in one transaction, so the deletion observes the
    /// latest attribute values. Returns the flushed entity.
    pub async fn remove_entity(&self, entity: &E) -> DbResult<E> {
        let id = entity
            .id()
            .ok_or_else(|| DbError::not_found(E::KIND, ""))?
            .to_string();

        let delete = delete_sql::<E>();
        let (delete, id_ref) = (delete.as_str(), id.as_str());
        self.retry
            .run("remove_entity", || async move {
                let mut tx = self.pool.begin().await?;
                Self::update_in(&mut tx, entity).await?;
                sqlx::query(delete)
                    .bind(id_ref)
                    .execute(&mut *tx)
                    .await?;
                tx.commit().await?;
                Ok(())
            })
            .await?;

        debug!(entity = E::KIND, id = %id, "Removed entity");
        Ok(entity.clone())
    }

    // -------------------------------------------------------------------------
    // Connection-scoped variants
    // -------------------------------------------------------------------------

    /// Loads an entity on an existing connection or transaction.
    pub async fn fetch_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<E>> {
        let sql = select_by_id_sql::<E>();
        let entity = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(entity)
    }

    /// [`EntityStore::insert`] on an existing connection or transaction.
    ///
    /// A minted id that a caller already chose explicitly is skipped: the
    /// counter is bumped again, up to [`MAX_MINT_ATTEMPTS`] times. A failed
    /// INSERT only undoes its own statement, so the bumps stay counted.
    pub async fn insert_in(conn: &mut SqliteConnection, mut entity: E) -> DbResult<E> {
        let sql = insert_sql::<E>();

        if let Some(id) = entity.id().map(str::to_string) {
            Self::insert_row(conn, &sql, &id, &entity).await?;
            return Ok(entity);
        }

        for _ in 0..MAX_MINT_ATTEMPTS {
            let id = uidgen::next_id_in(conn, E::KIND).await?;
            match Self::insert_row(conn, &sql, &id, &entity).await {
                Ok(()) => {
                    entity.set_id(id);
                    return Ok(entity);
                }
                Err(DbError::DuplicateKey { .. }) => {
                    debug!(entity = E::KIND, id = %id, "Minted id already taken, minting again");
                }
                Err(e) => return Err(e),
            }
        }

        Err(DbError::Internal(format!(
            "no free {} id after {} attempts",
            E::KIND,
            MAX_MINT_ATTEMPTS
        )))
    }

    async fn insert_row(
        conn: &mut SqliteConnection,
        sql: &str,
        id: &str,
        entity: &E,
    ) -> DbResult<()> {
        debug!(entity = E::KIND, id = %id, "Inserting entity");

        let query = sqlx::query(sql).bind(id.to_string());
        entity
            .bind_columns(query)
            .execute(&mut *conn)
            .await
            .map_err(|e| conflict_as_duplicate::<E>(e, id))?;
        Ok(())
    }

    /// [`EntityStore::update`] on an existing connection or transaction.
    pub async fn update_in(conn: &mut SqliteConnection, entity: &E) -> DbResult<()> {
        let Some(id) = entity.id() else {
            return Err(DbError::not_found(E::KIND, ""));
        };

        debug!(entity = E::KIND, id = %id, "Updating entity");

        let sql = update_sql::<E>();
        let query = sqlx::query(&sql).bind(id.to_string());
        let result = entity.bind_columns(query).execute(&mut *conn).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(E::KIND, id));
        }

        Ok(())
    }

    /// [`EntityStore::remove`] on an existing connection or transaction.
    pub async fn remove_in(conn: &mut SqliteConnection, id: &str) -> DbResult<E> {
        let entity = Self::fetch_in(conn, id)
            .await?
            .ok_or_else(|| DbError::not_found(E::KIND, id))?;

        sqlx::query(&delete_sql::<E>())
            .bind(id)
            .execute(&mut *conn)
            .await?;

        debug!(entity = E::KIND, id = %id, "Removed entity");
        Ok(entity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
