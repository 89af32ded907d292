//! Order line persistence. Lines are deleted with their order.

use petstore_core::OrderLine;

use crate::error::DbResult;
use crate::store::{non_blank, Entity, EntityStore, SqliteQuery};

impl Entity for OrderLine {
    const KIND: &'static str = "OrderLine";
    const TABLE: &'static str = "order_lines";
    const COLUMNS: &'static [&'static str] =
        &["id", "quantity", "unit_cost_cents", "order_id", "item_id"];

    fn id(&self) -> Option<&str> {
        non_blank(&self.id)
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.quantity)
            .bind(self.unit_cost_cents)
            .bind(self.order_id.clone())
            .bind(self.item_id.clone())
    }
}

impl EntityStore<OrderLine> {
    /// Lines of an order, in the order they were written.
    pub async fn find_all_in_order(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        self.find_by_column("order_id", order_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use petstore_core::{Address, Category, Customer, Item, Order, Product};

    /// Stores one item ("EST1") and one order ("1") for customer "bill".
    async fn fixture() -> (Database, Item, Order) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.categories()
            .insert(Category::new("Fish", "Aquatic").with_id("FISH"))
            .await
            .unwrap();
        db.products()
            .insert(Product::new("Koi", "Japanese carp", "FISH").with_id("FI-FW-01"))
            .await
            .unwrap();
        let item = db
            .items()
            .insert(Item::new("Spotted Koi", 1850, "FI-FW-01").with_id("EST1"))
            .await
            .unwrap();

        let mut bill = Customer::new("bill", "Bill", "Gates");
        bill.address = Address::new("1 Main St", "Springfield", "12345", "USA");
        let bill = db.customers().insert(bill).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let order = db
            .orders()
            .insert(Order::for_customer(&bill, "bill", day))
            .await
            .unwrap();

        (db, item, order)
    }

    #[tokio::test]
    async fn test_lines_of_order() {
        let (db, item, order) = fixture().await;
        let order_id = order.id.clone().unwrap();

        db.order_lines()
            .insert(OrderLine::new(&order_id, &item, "EST1", 2))
            .await
            .unwrap();
        db.order_lines()
            .insert(OrderLine::new(&order_id, &item, "EST1", 1))
            .await
            .unwrap();

        let lines = db.order_lines().find_all_in_order(&order_id).await.unwrap();
        let quantities: Vec<i64> = lines.iter().map(|l| l.quantity).collect();
        assert_eq!(quantities, [2, 1]);
        assert_eq!(lines[0].line_total().cents(), 3700);

        assert!(db
            .order_lines()
            .find_all_in_order("999")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_lines_deleted_with_order() {
        let (db, item, order) = fixture().await;
        let order_id = order.id.clone().unwrap();

        db.order_lines()
            .insert(OrderLine::new(&order_id, &item, "EST1", 3))
            .await
            .unwrap();
        db.orders().remove(&order_id).await.unwrap();

        assert_eq!(db.order_lines().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ordered_item_cannot_be_deleted() {
        let (db, item, order) = fixture().await;

        db.order_lines()
            .insert(OrderLine::new(order.id.unwrap(), &item, "EST1", 1))
            .await
            .unwrap();

        let err = db.items().remove("EST1").await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(db.items().exists("EST1").await.unwrap());
    }
}
