//! # Customer Service
//!
//! Customer accounts. The customer id is the login; passwords are stored
//! only as argon2 PHC strings.
//!
//! ```text
//! create(customer, password) ──► hash ──► insert (taken login → DuplicateKey)
//! authenticate(login, pw)    ──► load ──► verify ──► Customer
//!                                           └──► Mismatch
//! update(customer)           ──► keeps the stored hash
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use tracing::{debug, info};

use petstore_core::validation::{validate_id, validate_password};
use petstore_core::{Customer, ValidationError};

use crate::error::{DbError, DbResult};
use crate::pool::Database;

#[derive(Debug, Clone)]
pub struct CustomerService {
    db: Database,
}

impl CustomerService {
    pub fn new(db: Database) -> Self {
        CustomerService { db }
    }

    /// Registers a new customer with `password`.
    pub async fn create(&self, mut customer: Customer, password: &str) -> DbResult<Customer> {
        let login = validate_id("login", customer.id.as_deref().unwrap_or(""))?.to_string();
        validate_password(password)?;
        customer.check_data()?;

        customer.id = Some(login);
        customer.password_hash = Some(hash_password(password)?);

        let customer = self.db.customers().insert(customer).await?;
        info!(login = ?customer.id, "Customer registered");
        Ok(customer)
    }

    pub async fn find(&self, login: &str) -> DbResult<Customer> {
        let login = validate_id("login", login)?;
        self.db.customers().find_by_id(login).await
    }

    pub async fn find_all(&self) -> DbResult<Vec<Customer>> {
        self.db.customers().find_all().await
    }

    /// Saves profile changes. The password hash on `customer` is ignored;
    /// the stored one is kept.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        let login = validate_id("login", customer.id.as_deref().unwrap_or(""))?;
        customer.check_data()?;

        let stored = self.db.customers().find_by_id(login).await?;
        let mut updated = customer.clone();
        updated.id = Some(login.to_string());
        updated.password_hash = stored.password_hash;

        self.db.customers().update(&updated).await
    }

    /// Replaces the password after checking the current one.
    pub async fn change_password(&self, login: &str, current: &str, new: &str) -> DbResult<()> {
        validate_password(new)?;
        let mut customer = self.authenticate(login, current).await?;
        customer.password_hash = Some(hash_password(new)?);
        self.db.customers().update(&customer).await?;
        info!(login = %login.trim(), "Password changed");
        Ok(())
    }

    /// Deletes a customer together with their orders.
    pub async fn delete(&self, login: &str) -> DbResult<Customer> {
        let login = validate_id("login", login)?;
        let removed = self.db.customers().remove(login).await?;
        info!(login = %login, "Customer deleted");
        Ok(removed)
    }

    /// Loads the customer if `password` matches the stored hash.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Unknown login
    /// * `Err(DbError::Validation(Mismatch))` - Wrong password
    pub async fn authenticate(&self, login: &str, password: &str) -> DbResult<Customer> {
        let login = validate_id("login", login)?;
        validate_password(password)?;

        let customer = self.db.customers().find_by_id(login).await?;
        let matches = customer
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(password, hash));

        if !matches {
            debug!(login = %login, "Password mismatch");
            return Err(ValidationError::Mismatch {
                field: "password".to_string(),
            }
            .into());
        }

        Ok(customer)
    }
}

fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use petstore_core::Address;

    async fn service() -> CustomerService {
        CustomerService::new(Database::new(DbConfig::in_memory()).await.unwrap())
    }

    fn bill() -> Customer {
        let mut customer = Customer::new("bill", "Bill", "Gates");
        customer.address = Address::new("1 Main St", "Springfield", "12345", "USA");
        customer
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret", "not a phc string"));
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let customers = service().await;
        let created = customers.create(bill(), "s3cret").await.unwrap();
        assert_ne!(created.password_hash.as_deref(), Some("s3cret"));

        let found = customers.authenticate("bill", "s3cret").await.unwrap();
        assert_eq!(found.lastname, "Gates");

        let err = customers.authenticate("bill", "wrong").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::Mismatch { .. })
        ));
        assert!(customers
            .authenticate("nobody", "s3cret")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_registration_rules() {
        let customers = service().await;

        assert!(matches!(
            customers.create(bill(), "").await,
            Err(DbError::Validation(_))
        ));
        let mut anonymous = bill();
        anonymous.id = None;
        assert!(matches!(
            customers.create(anonymous, "pw").await,
            Err(DbError::Validation(_))
        ));

        customers.create(bill(), "pw").await.unwrap();
        assert!(customers
            .create(bill(), "other")
            .await
            .unwrap_err()
            .is_duplicate());
    }

    #[tokio::test]
    async fn test_update_keeps_password() {
        let customers = service().await;
        customers.create(bill(), "s3cret").await.unwrap();

        let mut changed = bill();
        changed.email = Some("bill@example.com".to_string());
        changed.password_hash = None;
        customers.update(&changed).await.unwrap();

        let found = customers.authenticate("bill", "s3cret").await.unwrap();
        assert_eq!(found.email.as_deref(), Some("bill@example.com"));

        let mut padded = bill();
        padded.id = Some(" bill ".to_string());
        padded.telephone = Some("555-0100".to_string());
        customers.update(&padded).await.unwrap();
        assert_eq!(
            customers.find("bill").await.unwrap().telephone.as_deref(),
            Some("555-0100")
        );

        assert!(customers
            .update(&Customer::new("ghost", "No", "Body"))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_change_password() {
        let customers = service().await;
        customers.create(bill(), "old").await.unwrap();

        assert!(customers.change_password("bill", "bad", "new").await.is_err());
        customers.change_password("bill", "old", "new").await.unwrap();

        assert!(customers.authenticate("bill", "old").await.is_err());
        assert!(customers.authenticate("bill", "new").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete() {
        let customers = service().await;
        customers.create(bill(), "pw").await.unwrap();

        assert_eq!(customers.find_all().await.unwrap().len(), 1);
        customers.delete("bill").await.unwrap();
        assert!(customers.find("bill").await.unwrap_err().is_not_found());
        assert!(customers.delete("bill").await.unwrap_err().is_not_found());
    }
}
