//! # Customer Repository
//!
//! Customers are keyed by their login, chosen at sign-up, so inserts always
//! carry an id and a taken login surfaces as DuplicateKey.
//!
//! Address and credit card are embedded: their fields are plain columns of
//! `customers` and are decoded with `#[sqlx(flatten)]`.

use petstore_core::Customer;

use crate::store::{non_blank, Entity, SqliteQuery};

impl Entity for Customer {
    const KIND: &'static str = "Customer";
    const TABLE: &'static str = "customers";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "firstname",
        "lastname",
        "password_hash",
        "telephone",
        "email",
        "street1",
        "street2",
        "city",
        "state",
        "zipcode",
        "country",
        "card_number",
        "card_type",
        "card_expiry",
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
            .bind(self.firstname.clone())
            .bind(self.lastname.clone())
            .bind(self.password_hash.clone())
            .bind(self.telephone.clone())
            .bind(self.email.clone())
            .bind(address.street1.clone())
            .bind(address.street2.clone())
            .bind(address.city.clone())
            .bind(address.state.clone())
            .bind(address.zipcode.clone())
            .bind(address.country.clone())
            .bind(card.card_number.clone())
            .bind(card.card_type.clone())
            .bind(card.card_expiry.clone())
    }
}
