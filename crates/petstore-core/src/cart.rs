//! # Shopping Cart
//!
//! The per-session basket of a shopper: item id → quantity.
//!
//! The cart only stores ids. Prices are resolved against the catalog when
//! the cart is displayed or turned into an order, so a cart never shows a
//! stale unit cost.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  add_item("EST1")                 ──► EST1: 1   (or +1 if present)     │
//! │  update_item_quantity("EST1", 4)  ──► EST1: 4                          │
//! │  update_item_quantity("EST1", 0)  ──► EST1 removed                     │
//! │  remove_item("EST1")              ──► EST1 removed                     │
//! │  empty()                          ──► {}                               │
//! │                                                                         │
//! │  CartLine::new(id, &item, qty)    ──► priced view, line_total()        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Item;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Item quantities keyed by item id.
///
/// ## Invariants
/// - Every stored quantity is in `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` distinct items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingCart {
    items: BTreeMap<String, i64>,
}

impl ShoppingCart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        ShoppingCart::default()
    }

    /// Adds one unit of `item_id`.
    pub fn add_item(&mut self, item_id: &str) -> CoreResult<()> {
        if let Some(qty) = self.items.get_mut(item_id) {
            if *qty >= MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: *qty + 1,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            *qty += 1;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.insert(item_id.to_string(), 1);
        Ok(())
    }

    /// Sets the quantity of an item, adding it when absent.
    ///
    /// A quantity of zero or less removes the item.
    pub fn update_item_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.items.remove(item_id);
            return Ok(());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if !self.items.contains_key(item_id) && self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.insert(item_id.to_string(), quantity);
        Ok(())
    }

    /// Removes an item. Returns whether it was in the cart.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        self.items.remove(item_id).is_some()
    }

    /// Removes every item.
    pub fn empty(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Quantity of `item_id`, zero when absent.
    pub fn quantity_of(&self, item_id: &str) -> i64 {
        self.items.get(item_id).copied().unwrap_or(0)
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.values().sum()
    }

    /// `(item_id, quantity)` pairs ordered by item id.
    pub fn entries(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.items.iter().map(|(id, qty)| (id.as_str(), *qty))
    }
}

/// A cart entry priced against the current catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: String,
    pub item_name: String,
    pub product_id: String,
    pub unit_cost_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(item_id: impl Into<String>, item: &Item, quantity: i64) -> Self {
        CartLine {
            item_id: item_id.into(),
            item_name: item.name.clone(),
            product_id: item.product_id.clone(),
            unit_cost_cents: item.unit_cost_cents,
            quantity,
        }
    }

    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_cost_cents).multiply_quantity(self.quantity)
    }
}

/// Sum of the line totals.
pub fn cart_total(lines: &[CartLine]) -> Money {
    lines.iter().map(CartLine::line_total).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
