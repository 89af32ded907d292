//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)         check_data (ValidationError)       │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ← categorized into business outcomes            │
//! │       │                  (NotFound, DuplicateKey, Validation)          │
//! │       │                  and storage faults (everything else)          │
//! │       ▼                                                                 │
//! │  Retry loop re-runs the operation only when is_transient()             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use petstore_core::ValidationError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Empty or unknown id on lookup, update or remove
    /// - A finder that matched no rows
    /// - Removing a counter that was never created
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// An entity with the same id is already stored.
    #[error("{entity} already exists: {id}")]
    DuplicateKey { entity: String, id: String },

    /// The record failed its own invariant checks.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a category, product, item or customer that does not exist
    /// - Deleting an item still referenced by an order line
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// SQLite reported the database as busy or locked.
    #[error("Database busy: {0}")]
    Busy(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a DuplicateKey error.
    pub fn duplicate(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::DuplicateKey {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether retrying the same operation may succeed.
    ///
    /// Only lock contention, pool timeouts and dropped connections qualify.
    /// Business outcomes are final.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DbError::Busy(_) | DbError::PoolExhausted | DbError::ConnectionFailed(_)
        )
    }

    /// True for failures of the backing store itself, as opposed to the
    /// expected NotFound / DuplicateKey / Validation outcomes.
    pub fn is_storage_fault(&self) -> bool {
        !matches!(
            self,
            DbError::NotFound { .. } | DbError::DuplicateKey { .. } | DbError::Validation(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, DbError::DuplicateKey { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound        → DbError::NotFound
/// sqlx::Error::Database           → classified by constraint kind / SQLite code
/// sqlx::Error::PoolTimedOut       → DbError::PoolExhausted
/// sqlx::Error::PoolClosed / Io    → DbError::ConnectionFailed
/// Other                           → DbError::Internal
/// ```
///
/// Unique violations are reported with the table name only. The entity store
/// rewrites them into a DuplicateKey carrying the entity kind and id.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();

                if db_err.is_unique_violation() {
                    // "UNIQUE constraint failed: <table>.<column>"
                    let target = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    return DbError::duplicate(target, "unknown");
                }

                if db_err.is_foreign_key_violation() {
                    return DbError::ForeignKeyViolation { message: msg };
                }

                // SQLITE_BUSY (5) and SQLITE_LOCKED (6), including extended codes
                let primary_code = db_err
                    .code()
                    .and_then(|code| code.parse::<i32>().ok())
                    .map(|code| code & 0xff);
                if matches!(primary_code, Some(5) | Some(6)) || msg.contains("database is locked")
                {
                    return DbError::Busy(msg);
                }

                DbError::QueryFailed(msg)
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(DbError::Busy("database is locked".into()).is_transient());
        assert!(DbError::PoolExhausted.is_transient());
        assert!(DbError::ConnectionFailed("gone".into()).is_transient());

        assert!(!DbError::not_found("Category", "C1").is_transient());
        assert!(!DbError::duplicate("Category", "C1").is_transient());
        assert!(!DbError::QueryFailed("syntax".into()).is_transient());
    }

    #[test]
    fn test_storage_fault_classification() {
        assert!(!DbError::not_found("Item", "1").is_storage_fault());
        assert!(!DbError::duplicate("Item", "1").is_storage_fault());
        assert!(!DbError::from(ValidationError::required("name")).is_storage_fault());

        assert!(DbError::PoolExhausted.is_storage_fault());
        assert!(DbError::Internal("boom".into()).is_storage_fault());
    }

    #[test]
    fn test_from_sqlx_pool_errors() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(DbError::from(sqlx::Error::RowNotFound).is_not_found());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            DbError::not_found("Category", "C1").to_string(),
            "Category not found: C1"
        );
        assert_eq!(
            DbError::duplicate("Category", "C1").to_string(),
            "Category already exists: C1"
        );
    }
}
