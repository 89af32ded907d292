//! # Domain Types
//!
//! The records persisted by the pet store.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Category 1 ──── * Product 1 ──── * Item                               │
//! │                                       ▲                                 │
//! │                                       │ item_id                         │
//! │  Customer 1 ──── * Order 1 ──── * OrderLine                            │
//! │     │                 │                                                 │
//! │     └── Address ──────┤   (embedded, copied onto the order)            │
//! │     └── CreditCard ───┘                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every record carries `id: Option<String>`. `None` means "not stored yet";
//! the entity store mints an id from the record's counter on insert.
//! Customers are the exception: their id is the login chosen by the user.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::validation::{
    require, validate_quantity, validate_text, validate_unit_cost_cents, ValidationResult,
};

// =============================================================================
// Category
// =============================================================================

/// A top-level grouping of the catalog (Fish, Dogs, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
}

impl Category {
    /// Creates a category that has not been stored yet.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Category {
            id: None,
            name: name.into(),
            description: description.into(),
        }
    }

    /// Sets a caller-chosen id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn check_data(&self) -> ValidationResult<()> {
        validate_text("name", &self.name)?;
        validate_text("description", &self.description)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A kind of pet inside a category (Bulldog, Goldfish, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub category_id: String,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        Product {
            id: None,
            name: name.into(),
            description: description.into(),
            category_id: category_id.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn check_data(&self) -> ValidationResult<()> {
        validate_text("name", &self.name)?;
        validate_text("description", &self.description)?;
        require("category", &self.category_id)
    }
}

// =============================================================================
// Item
// =============================================================================

/// A sellable variant of a product ("Adult Male Bulldog").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    pub id: Option<String>,
    pub name: String,

    /// Price of one unit in cents.
    pub unit_cost_cents: i64,

    /// Relative path of the picture shown in the catalog.
    pub image_path: Option<String>,

    pub product_id: String,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        unit_cost_cents: i64,
        product_id: impl Into<String>,
    ) -> Self {
        Item {
            id: None,
            name: name.into(),
            unit_cost_cents,
            image_path: None,
            product_id: product_id.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_image(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Returns the unit cost as Money.
    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }

    pub fn check_data(&self) -> ValidationResult<()> {
        validate_text("name", &self.name)?;
        validate_unit_cost_cents(self.unit_cost_cents)?;
        require("product", &self.product_id)
    }
}

// =============================================================================
// Address
// =============================================================================

/// Postal address, embedded in customers and orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Address {
    pub street1: String,
    pub street2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub zipcode: String,
    pub country: String,
}

impl Address {
    pub fn new(
        street1: impl Into<String>,
        city: impl Into<String>,
        zipcode: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Address {
            street1: street1.into(),
            street2: None,
            city: city.into(),
            state: None,
            zipcode: zipcode.into(),
            country: country.into(),
        }
    }

    /// A customer may leave the whole address blank.
    pub fn is_blank(&self) -> bool {
        self.street1.trim().is_empty()
            && self.city.trim().is_empty()
            && self.zipcode.trim().is_empty()
            && self.country.trim().is_empty()
    }

    pub fn check_data(&self) -> ValidationResult<()> {
        require("city", &self.city)?;
        require("country", &self.country)?;
        require("street1", &self.street1)?;
        require("zipcode", &self.zipcode)
    }
}

// =============================================================================
// Credit Card
// =============================================================================

/// Payment card details, embedded in customers and orders.
///
/// Fields are empty strings when unknown; [`crate::validation::validate_credit_card`]
/// decides whether a card can be used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CreditCard {
    pub card_number: String,
    pub card_type: String,

    /// Expiry as `MM/YY`.
    pub card_expiry: String,
}

impl CreditCard {
    pub fn new(
        card_number: impl Into<String>,
        card_type: impl Into<String>,
        card_expiry: impl Into<String>,
    ) -> Self {
        CreditCard {
            card_number: card_number.into(),
            card_type: card_type.into(),
            card_expiry: card_expiry.into(),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered shopper. The id is the login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: Option<String>,
    pub firstname: String,
    pub lastname: String,

    /// PHC-formatted password hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    pub telephone: Option<String>,
    pub email: Option<String>,

    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub address: Address,

    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub credit_card: CreditCard,
}

impl Customer {
    pub fn new(
        id: impl Into<String>,
        firstname: impl Into<String>,
        lastname: impl Into<String>,
    ) -> Self {
        Customer {
            id: Some(id.into()),
            firstname: firstname.into(),
            lastname: lastname.into(),
            password_hash: None,
            telephone: None,
            email: None,
            address: Address::default(),
            credit_card: CreditCard::default(),
        }
    }

    pub fn check_data(&self) -> ValidationResult<()> {
        require("firstname", &self.firstname)?;
        require("lastname", &self.lastname)?;
        if !self.address.is_blank() {
            self.address.check_data()?;
        }
        Ok(())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order. Name, address and card are copied from the customer at
/// creation time, so later customer edits do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: Option<String>,
    pub order_date: NaiveDate,
    pub firstname: String,
    pub lastname: String,

    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub address: Address,

    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub credit_card: CreditCard,

    pub customer_id: String,
}

impl Order {
    /// Builds an order for `customer`, snapshotting its contact details.
    pub fn for_customer(customer: &Customer, customer_id: &str, order_date: NaiveDate) -> Self {
        Order {
            id: None,
            order_date,
            firstname: customer.firstname.clone(),
            lastname: customer.lastname.clone(),
            address: customer.address.clone(),
            credit_card: customer.credit_card.clone(),
            customer_id: customer_id.to_string(),
        }
    }

    pub fn check_data(&self) -> ValidationResult<()> {
        require("firstname", &self.firstname)?;
        require("lastname", &self.lastname)?;
        self.address.check_data()?;
        require("customer", &self.customer_id)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// One item of an order, with the unit cost frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: Option<String>,
    pub quantity: i64,
    pub unit_cost_cents: i64,
    pub order_id: String,
    pub item_id: String,
}

impl OrderLine {
    pub fn new(order_id: impl Into<String>, item: &Item, item_id: &str, quantity: i64) -> Self {
        OrderLine {
            id: None,
            quantity,
            unit_cost_cents: item.unit_cost_cents,
            order_id: order_id.into(),
            item_id: item_id.to_string(),
        }
    }

    /// Unit cost times quantity.
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_cost_cents).multiply_quantity(self.quantity)
    }

    pub fn check_data(&self) -> ValidationResult<()> {
        validate_unit_cost_cents(self.unit_cost_cents)?;
        validate_quantity(self.quantity)?;
        require("order", &self.order_id)?;
        require("item", &self.item_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn address() -> Address {
        Address::new("1 Main St", "Springfield", "12345", "USA")
    }

    #[test]
    fn test_category_check_data() {
        assert!(Category::new("Fish", "Aquatic").check_data().is_ok());
        assert_eq!(
            Category::new("", "Aquatic").check_data(),
            Err(ValidationError::required("name"))
        );
        assert_eq!(
            Category::new("Fish", " ").check_data(),
            Err(ValidationError::required("description"))
        );
    }

    #[test]
    fn test_item_requires_positive_cost() {
        let item = Item::new("Large Angelfish", 1650, "FI-SW-01");
        assert!(item.check_data().is_ok());
        assert_eq!(item.unit_cost().cents(), 1650);

        let free = Item::new("Large Angelfish", 0, "FI-SW-01");
        assert!(matches!(
            free.check_data(),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_customer_address_optional_but_complete() {
        let mut customer = Customer::new("bill", "Bill", "Gates");
        assert!(customer.check_data().is_ok());

        customer.address.city = "Seattle".to_string();
        assert_eq!(
            customer.check_data(),
            Err(ValidationError::required("country"))
        );

        customer.address = address();
        assert!(customer.check_data().is_ok());

        customer.lastname.clear();
        assert!(customer.check_data().is_err());
    }

    #[test]
    fn test_order_snapshots_customer() {
        let mut customer = Customer::new("bill", "Bill", "Gates");
        customer.address = address();
        customer.credit_card = CreditCard::new("4111111111111111", "Visa", "12/30");

        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let order = Order::for_customer(&customer, "bill", date);

        assert_eq!(order.firstname, "Bill");
        assert_eq!(order.address, customer.address);
        assert_eq!(order.credit_card.card_type, "Visa");
        assert!(order.check_data().is_ok());

        let mut no_address = order.clone();
        no_address.address = Address::default();
        assert!(no_address.check_data().is_err());
    }

    #[test]
    fn test_order_line_total_and_checks() {
        let item = Item::new("Goldfish", 550, "FI-FW-02");
        let line = OrderLine::new("1", &item, "EST20", 3);
        assert_eq!(line.line_total().cents(), 1650);
        assert!(line.check_data().is_ok());

        let mut zero = line.clone();
        zero.quantity = 0;
        assert!(zero.check_data().is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let mut customer = Customer::new("bill", "Bill", "Gates");
        customer.password_hash = Some("$argon2id$secret".to_string());

        let json = serde_json::to_string(&customer).unwrap();
        assert!(!json.contains("argon2"));
    }
}
