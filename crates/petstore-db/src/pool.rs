//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Composition root (seed binary, tests, an outer app)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) / DbConfig::from_env() ← pool + retry settings    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.categories() / db.items() / db.id_generator() ...                  │
//! │  (cheap handles sharing the same pool and retry policy)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use petstore_core::{Category, Customer, Item, Order, OrderLine, Product};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::retry::RetryPolicy;
use crate::store::EntityStore;
use crate::uidgen::UniqueIdGenerator;

// =============================================================================
// Configuration
// =============================================================================

/// Database file used when neither the caller nor the environment names one.
pub const DEFAULT_DATABASE_PATH: &str = "petstore.db";

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/petstore/petstore.db")
///     .max_connections(5)
///     .retry_policy(RetryPolicy::default());
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,

    /// Retry of transient faults around every store call.
    pub retry: RetryPolicy,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Sets the retry policy for transient faults.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
            retry: RetryPolicy::default(),
        }
    }

    /// Default configuration with environment overrides applied.
    ///
    /// ## Environment Variables
    /// | Variable                      | Field             |
    /// |-------------------------------|-------------------|
    /// | `PETSTORE_DB_PATH`            | `database_path`   |
    /// | `PETSTORE_DB_MAX_CONNECTIONS` | `max_connections` |
    /// | `PETSTORE_DB_MIN_CONNECTIONS` | `min_connections` |
    /// | `PETSTORE_DB_RETRY_ATTEMPTS`  | `retry.max_attempts` |
    pub fn from_env() -> Self {
        let mut config = DbConfig::new(DEFAULT_DATABASE_PATH);
        config.apply_env_overrides();
        config
    }

    /// Applies `PETSTORE_DB_*` environment overrides.
    ///
    /// Unparseable numbers are ignored and the current value is kept.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("PETSTORE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = PathBuf::from(path);
        }

        if let Some(max) = lookup("PETSTORE_DB_MAX_CONNECTIONS") {
            if let Ok(max) = max.parse::<u32>() {
                self.max_connections = max;
            }
        }

        if let Some(min) = lookup("PETSTORE_DB_MIN_CONNECTIONS") {
            if let Ok(min) = min.parse::<u32>() {
                self.min_connections = min;
            }
        }

        if let Some(attempts) = lookup("PETSTORE_DB_RETRY_ATTEMPTS") {
            if let Ok(attempts) = attempts.parse::<u32>() {
                self.retry.max_attempts = attempts.max(1);
            }
        }
    }

    /// Checks the configuration for values the pool would reject.
    pub fn validate(&self) -> DbResult<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(DbError::ConnectionFailed(
                "database path is empty".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(DbError::ConnectionFailed(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(DbError::ConnectionFailed(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing store access.
///
/// Cloning is cheap: clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,

    /// Applied to every store and id generator handed out.
    retry: RetryPolicy,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite:
    ///    - WAL mode for concurrent reads
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - Foreign keys enabled (cascading deletes rely on it)
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        config.validate()?;

        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has them disabled by default for backwards compatibility
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            retry_attempts = config.retry.max_attempts,
            "Database pool created"
        );

        let db = Database {
            pool,
            retry: config.retry,
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations.
    ///
    /// Idempotent: safe to run multiple times.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    ///
    /// For advanced queries not covered by the stores.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The retry policy shared by every handle of this database.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Returns the per-kind id counter service.
    pub fn id_generator(&self) -> UniqueIdGenerator {
        UniqueIdGenerator::new(self.pool.clone(), self.retry)
    }

    /// Returns a store for any entity kind.
    pub fn store<E: crate::store::Entity>(&self) -> EntityStore<E> {
        EntityStore::new(self.pool.clone(), self.retry)
    }

    pub fn categories(&self) -> EntityStore<Category> {
        self.store()
    }

    pub fn products(&self) -> EntityStore<Product> {
        self.store()
    }

    pub fn items(&self) -> EntityStore<Item> {
        self.store()
    }

    pub fn customers(&self) -> EntityStore<Customer> {
        self.store()
    }

    pub fn orders(&self) -> EntityStore<Order> {
        self.store()
    }

    pub fn order_lines(&self) -> EntityStore<OrderLine> {
        self.store()
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all store operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
