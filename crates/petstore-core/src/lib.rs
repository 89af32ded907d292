//! # petstore-core: Pure Domain Logic for the Pet Store
//!
//! This crate holds the domain records of the pet store and every rule that
//! can be checked without touching storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pet Store Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              petstore-db services (catalog, customer, order)    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ petstore-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │ Category  │  │   Money   │  │ Shopping  │  │ required  │  │   │
//! │  │   │ Item ...  │  │           │  │   Cart    │  │ card/Luhn │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        petstore-db (entity store, id counters, SQLite)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Category, Product, Item, Customer, Order, OrderLine)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Field and credit card validation
//! - [`cart`] - In-memory shopping cart
//!
//! ## Example Usage
//!
//! ```rust
//! use petstore_core::{Category, ShoppingCart};
//!
//! let fish = Category::new("Fish", "Any of numerous cold-blooded aquatic vertebrates");
//! assert!(fish.check_data().is_ok());
//!
//! let mut cart = ShoppingCart::new();
//! cart.add_item("EST1").unwrap();
//! cart.add_item("EST1").unwrap();
//! assert_eq!(cart.quantity_of("EST1"), 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartLine, ShoppingCart};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct items allowed in a single shopping cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in a cart or order line.
///
/// Prevents accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Card types accepted when placing an order.
pub const ACCEPTED_CARD_TYPES: [&str; 3] = ["Visa", "Master Card", "American Express"];
