//! # Services
//!
//! Validating facades over the entity store. Services own no storage:
//! each holds a cheap `Database` clone and checks its input before
//! anything reaches SQLite.
//!
//! ```text
//! caller ──► CatalogService / CustomerService / OrderService
//!                 │  validate ids, check_data, parent exists
//!                 ▼
//!            EntityStore<E> ──► SQLite
//!
//! caller ──► CartSessions (in memory, bounded, no storage)
//! ```
//!
//! - [`catalog::CatalogService`] - Categories, products, items, search
//! - [`customer::CustomerService`] - Accounts and password checks
//! - [`order::OrderService`] - Turning a cart into a stored order
//! - [`cart::CartSessions`] - Per-session shopping carts

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod order;
