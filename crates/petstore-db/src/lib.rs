//! # petstore-db: Storage Layer for the Pet Store
//!
//! Generic entity persistence, per-kind id counters and the validating
//! services built on top of them. SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pet Store Data Flow                              │
//! │                                                                         │
//! │  Caller (seed binary, tests, an outer app)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   petstore-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐   │   │
//! │  │   │   Services    │   │  EntityStore<E>│   │ UniqueId      │   │   │
//! │  │   │  (service/)   │──►│   (store.rs)   │──►│ Generator     │   │   │
//! │  │   │ Catalog       │   │ + repository/  │   │ (uidgen.rs)   │   │   │
//! │  │   │ Customer      │   │   per kind     │   │               │   │   │
//! │  │   │ Order, Carts  │   └───────┬────────┘   └───────┬───────┘   │   │
//! │  │   └───────────────┘           │                    │           │   │
//! │  │                               ▼                    ▼           │   │
//! │  │                  Database (pool.rs) + RetryPolicy (retry.rs)   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite database (petstore.db, or :memory: in tests)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`retry`] - Backoff around transient faults
//! - [`store`] - The generic entity store
//! - [`uidgen`] - Named id counters
//! - [`repository`] - Per-kind `Entity` impls and finders
//! - [`service`] - Validating facades used by callers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use petstore_db::{Database, DbConfig};
//! use petstore_core::Category;
//!
//! let db = Database::new(DbConfig::new("petstore.db")).await?;
//!
//! let fish = db.categories().insert(Category::new("Fish", "Aquatic")).await?;
//! let same = db.categories().find_by_id(fish.id.as_deref().unwrap_or("")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod retry;
pub mod service;
pub mod store;
pub mod uidgen;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use retry::RetryPolicy;
pub use store::{Entity, EntityStore};
pub use uidgen::UniqueIdGenerator;

// Service re-exports for convenience
pub use service::cart::CartSessions;
pub use service::catalog::CatalogService;
pub use service::customer::CustomerService;
pub use service::order::{OrderDetails, OrderService};
