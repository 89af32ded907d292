//! # Order Service
//!
//! Turns a customer's cart into a stored order.
//!
//! ## Order Creation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         create_order                                    │
//! │                                                                         │
//! │  cart empty? ───────────────────────────────► Validation               │
//! │  load customer ─────────────────────────────► NotFound                 │
//! │  verify card (type, Luhn, expiry) ──────────► Validation               │
//! │  resolve every cart item ───────────────────► NotFound                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    insert Order      (id from counter "Order")                         │
//! │    insert OrderLine  × cart entries (unit cost frozen from the item)   │
//! │  COMMIT ── any failure rolls back the order, its lines and counters    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use petstore_core::validation::{validate_credit_card, validate_id};
use petstore_core::{Item, Money, Order, OrderLine, ShoppingCart, ValidationError};

use crate::error::DbResult;
use crate::pool::Database;
use crate::store::EntityStore;

/// An order with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

impl OrderDetails {
    pub fn total(&self) -> Money {
        self.lines.iter().map(OrderLine::line_total).sum()
    }
}

#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
}

impl OrderService {
    pub fn new(db: Database) -> Self {
        OrderService { db }
    }

    /// Places an order for `customer_id` containing every entry of `cart`.
    ///
    /// `today` is the order date and the reference for the card expiry check.
    pub async fn create_order(
        &self,
        customer_id: &str,
        cart: &ShoppingCart,
        today: NaiveDate,
    ) -> DbResult<OrderDetails> {
        let customer_id = validate_id("customer id", customer_id)?;
        if cart.is_empty() {
            return Err(ValidationError::required("cart").into());
        }

        let customer = self.db.customers().find_by_id(customer_id).await?;
        validate_credit_card(&customer.credit_card, today)?;

        let order = Order::for_customer(&customer, customer_id, today);
        order.check_data()?;

        // Resolved before the transaction opens; the pool may hold one connection
        let items = self.db.items();
        let mut entries: Vec<(&str, Item, i64)> = Vec::with_capacity(cart.len());
        for (item_id, quantity) in cart.entries() {
            let item = items.find_by_id(item_id).await?;
            entries.push((item_id, item, quantity));
        }

        let (pool, order, entries) = (self.db.pool(), &order, entries.as_slice());
        let details = self
            .db
            .retry_policy()
            .run("create_order", || async move {
                let mut tx = pool.begin().await?;

                let order = EntityStore::<Order>::insert_in(&mut tx, order.clone()).await?;
                let order_id = order.id.clone().unwrap_or_default();

                let mut lines = Vec::with_capacity(entries.len());
                for (item_id, item, quantity) in entries {
                    let line = OrderLine::new(order_id.as_str(), item, item_id, *quantity);
                    line.check_data()?;
                    lines.push(EntityStore::<OrderLine>::insert_in(&mut tx, line).await?);
                }

                tx.commit().await?;
                Ok(OrderDetails { order, lines })
            })
            .await?;

        info!(
            order = ?details.order.id,
            customer = %customer_id,
            lines = details.lines.len(),
            total = %details.total(),
            "Order placed"
        );
        Ok(details)
    }

    /// Loads an order and its lines.
    pub async fn find_order(&self, id: &str) -> DbResult<OrderDetails> {
        let id = validate_id("order id", id)?;
        let order = self.db.orders().find_by_id(id).await?;

        let lines = match self.db.order_lines().find_all_in_order(id).await {
            Ok(lines) => lines,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e),
        };

        Ok(OrderDetails { order, lines })
    }

    /// Orders placed by a customer, oldest first.
    pub async fn find_orders(&self, customer_id: &str) -> DbResult<Vec<Order>> {
        let customer_id = validate_id("customer id", customer_id)?;
        self.db.orders().find_all_for_customer(customer_id).await
    }

    /// Deletes an order together with its lines.
    pub async fn delete_order(&self, id: &str) -> DbResult<Order> {
        let id = validate_id("order id", id)?;
        let removed = self.db.orders().remove(id).await?;
        info!(order = %id, "Order deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::DbConfig;
    use petstore_core::{Address, Category, CreditCard, Customer, Product};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    /// Catalog with items EST1 ($18.50) and EST2 ($5.00), customer "bill".
    async fn shop(card: CreditCard) -> (Database, OrderService) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.categories()
            .insert(Category::new("Fish", "Aquatic").with_id("FISH"))
            .await
            .unwrap();
        db.products()
            .insert(Product::new("Koi", "Carp", "FISH").with_id("FI-FW-01"))
            .await
            .unwrap();
        db.items()
            .insert(Item::new("Spotted Koi", 1850, "FI-FW-01").with_id("EST1"))
            .await
            .unwrap();
        db.items()
            .insert(Item::new("Plain Koi", 500, "FI-FW-01").with_id("EST2"))
            .await
            .unwrap();

        let mut bill = Customer::new("bill", "Bill", "Gates");
        bill.address = Address::new("1 Main St", "Springfield", "12345", "USA");
        bill.credit_card = card;
        db.customers().insert(bill).await.unwrap();

        (db.clone(), OrderService::new(db))
    }

    fn visa() -> CreditCard {
        CreditCard::new("4111 1111 1111 1111", "Visa", "12/30")
    }

    fn cart() -> ShoppingCart {
        let mut cart = ShoppingCart::new();
        cart.add_item("EST1").unwrap();
        cart.add_item("EST1").unwrap();
        cart.add_item("EST2").unwrap();
        cart
    }

    #[tokio::test]
    async fn test_create_order_writes_order_and_lines() {
        let (db, orders) = shop(visa()).await;

        let placed = orders.create_order("bill", &cart(), today()).await.unwrap();

        assert_eq!(placed.order.id.as_deref(), Some("1"));
        assert_eq!(placed.order.address.city, "Springfield");
        assert_eq!(placed.order.order_date, today());
        assert_eq!(placed.lines.len(), 2);
        assert_eq!(placed.total().cents(), 2 * 1850 + 500);

        let found = orders.find_order("1").await.unwrap();
        assert_eq!(found, placed);
        assert_eq!(db.order_lines().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_order_details_json() {
        let (_db, orders) = shop(visa()).await;
        let placed = orders.create_order("bill", &cart(), today()).await.unwrap();

        let json = serde_json::to_value(&placed).unwrap();

        assert_eq!(json["order"]["id"], "1");
        assert_eq!(json["order"]["order_date"], "2026-10-19");
        assert_eq!(json["order"]["customer_id"], "bill");
        assert_eq!(json["order"]["address"]["city"], "Springfield");
        let lines = json["lines"].as_array().unwrap();
        assert_eq!(lines.len(), 2);
        let est1 = lines.iter().find(|line| line["item_id"] == "EST1").unwrap();
        assert_eq!(est1["quantity"], 2);
        assert_eq!(est1["unit_cost_cents"], 1850);
    }

    #[tokio::test]
    async fn test_unit_cost_is_frozen() {
        let (db, orders) = shop(visa()).await;
        orders.create_order("bill", &cart(), today()).await.unwrap();

        let mut koi = db.items().find_by_id("EST1").await.unwrap();
        koi.unit_cost_cents = 9999;
        db.items().update(&koi).await.unwrap();

        let found = orders.find_order("1").await.unwrap();
        assert_eq!(found.total().cents(), 4200);
    }

    #[tokio::test]
    async fn test_rejected_orders_store_nothing() {
        let (db, orders) = shop(CreditCard::new("4111 1111 1111 1112", "Visa", "12/30")).await;

        let err = orders.create_order("bill", &cart(), today()).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let err = orders
            .create_order("bill", &ShoppingCart::new(), today())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        assert!(orders
            .create_order("nobody", &cart(), today())
            .await
            .unwrap_err()
            .is_not_found());

        assert_eq!(db.orders().count().await.unwrap(), 0);
        assert!(db.id_generator().current("Order").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_expired_card_rejected() {
        let (_db, orders) = shop(CreditCard::new("4111111111111111", "Visa", "09/26")).await;
        assert!(matches!(
            orders.create_order("bill", &cart(), today()).await,
            Err(DbError::Validation(ValidationError::InvalidFormat { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unknown_item_rolls_nothing_in() {
        let (db, orders) = shop(visa()).await;
        let mut cart = cart();
        cart.add_item("GONE").unwrap();

        assert!(orders
            .create_order("bill", &cart, today())
            .await
            .unwrap_err()
            .is_not_found());
        assert_eq!(db.orders().count().await.unwrap(), 0);
        assert_eq!(db.order_lines().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_and_delete_orders() {
        let (db, orders) = shop(visa()).await;
        orders.create_order("bill", &cart(), today()).await.unwrap();
        orders.create_order("bill", &cart(), today()).await.unwrap();

        assert_eq!(orders.find_orders("bill").await.unwrap().len(), 2);

        let removed = orders.delete_order("1").await.unwrap();
        assert_eq!(removed.customer_id, "bill");
        assert!(orders.find_order("1").await.unwrap_err().is_not_found());
        assert_eq!(db.order_lines().count().await.unwrap(), 2);
        assert!(matches!(
            orders.find_order(" ").await,
            Err(DbError::Validation(_))
        ));
    }
}
