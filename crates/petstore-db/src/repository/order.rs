//! Order persistence. Orders embed a copy of the customer's address and card.

use petstore_core::Order;

use crate::error::DbResult;
use crate::store::{non_blank, Entity, EntityStore, SqliteQuery};

impl Entity for Order {
    const KIND: &'static str = "Order";
    const TABLE: &'static str = "orders";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "order_date",
        "firstname",
        "lastname",
        "street1",
        "street2",
        "city",
        "state",
        "zipcode",
        "country",
        "card_number",
        "card_type",
        "card_expiry",
        "customer_id",
    ];

    fn id(&self) -> Option<&str> {
        non_blank(&self.id)
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        let address = &self.address;
        let card = &self.credit_card;
        query
            .bind(self.order_date)
            .bind(self.firstname.clone())
            .bind(self.lastname.clone())
            .bind(address.street1.clone())
            .bind(address.street2.clone())
            .bind(address.city.clone())
            .bind(address.state.clone())
            .bind(address.zipcode.clone())
            .bind(address.country.clone())
            .bind(card.card_number.clone())
            .bind(card.card_type.clone())
            .bind(card.card_expiry.clone())
            .bind(self.customer_id.clone())
    }
}

impl EntityStore<Order> {
    /// Orders placed by a customer, oldest first. NotFound when there are none.
    pub async fn find_all_for_customer(&self, customer_id: &str) -> DbResult<Vec<Order>> {
        self.find_by_column("customer_id", customer_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use petstore_core::{Address, CreditCard, Customer};

    fn customer() -> Customer {
        let mut customer = Customer::new("bill", "Bill", "Gates");
        customer.address = Address::new("1 Main St", "Springfield", "12345", "USA");
        customer.credit_card = CreditCard::new("4111111111111111", "Visa", "12/30");
        customer
    }

    #[tokio::test]
    async fn test_orders_for_customer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let bill = db.customers().insert(customer()).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        assert!(db
            .orders()
            .find_all_for_customer("bill")
            .await
            .unwrap_err()
            .is_not_found());

        let first = db
            .orders()
            .insert(Order::for_customer(&bill, "bill", day))
            .await
            .unwrap();
        let second = db
            .orders()
            .insert(Order::for_customer(&bill, "bill", day.succ_opt().unwrap()))
            .await
            .unwrap();

        let orders = db.orders().find_all_for_customer("bill").await.unwrap();
        assert_eq!(orders, vec![first, second]);
        assert_eq!(orders[0].id.as_deref(), Some("1"));
        assert_eq!(orders[0].address.city, "Springfield");
        assert_eq!(orders[1].order_date, NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
    }

    #[tokio::test]
    async fn test_order_for_unknown_customer_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let err = db
            .orders()
            .insert(Order::for_customer(&customer(), "ghost", day))
            .await
            .unwrap_err();

        assert!(matches!(err, crate::error::DbError::ForeignKeyViolation { .. }));
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }
}
