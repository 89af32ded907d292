//! # Catalog Service
//!
//! Category, product and item management plus catalog browsing.
//!
//! ## Rules Enforced Here
//! ```text
//! create/update ──► check_data ──► parent exists? ──► store
//!                                  (product → category, item → product)
//!
//! find/delete   ──► id not blank ──► store
//! ```
//! A missing parent is a `ValidationError::MissingReference`, reported
//! before the foreign key would fire.

use tracing::{debug, info, warn};

use petstore_core::validation::validate_id;
use petstore_core::{CartLine, Category, Item, Product, ShoppingCart, ValidationError};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::store::{Entity, EntityStore};

#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    pub async fn create_category(&self, category: Category) -> DbResult<Category> {
        category.check_data()?;
        let category = self.db.categories().insert(category).await?;
        info!(id = ?category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn find_category(&self, id: &str) -> DbResult<Category> {
        let id = validate_id("category id", id)?;
        self.db.categories().find_by_id(id).await
    }

    pub async fn find_categories(&self) -> DbResult<Vec<Category>> {
        self.db.categories().find_all().await
    }

    pub async fn update_category(&self, category: &Category) -> DbResult<()> {
        let category = with_trimmed_id(category, "category id")?;
        category.check_data()?;
        self.db.categories().update(&category).await
    }

    /// Deletes a category together with its products and their items.
    pub async fn delete_category(&self, id: &str) -> DbResult<Category> {
        let id = validate_id("category id", id)?;
        let removed = self.db.categories().remove(id).await?;
        info!(id = %id, "Category deleted");
        Ok(removed)
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    pub async fn create_product(&self, product: Product) -> DbResult<Product> {
        product.check_data()?;
        self.require_parent(&self.db.categories(), &product.category_id)
            .await?;
        let product = self.db.products().insert(product).await?;
        info!(id = ?product.id, category = %product.category_id, "Product created");
        Ok(product)
    }

    pub async fn find_product(&self, id: &str) -> DbResult<Product> {
        let id = validate_id("product id", id)?;
        self.db.products().find_by_id(id).await
    }

    pub async fn find_products(&self, category_id: &str) -> DbResult<Vec<Product>> {
        let category_id = validate_id("category id", category_id)?;
        self.db.products().find_all_in_category(category_id).await
    }

    pub async fn update_product(&self, product: &Product) -> DbResult<()> {
        let product = with_trimmed_id(product, "product id")?;
        product.check_data()?;
        self.require_parent(&self.db.categories(), &product.category_id)
            .await?;
        self.db.products().update(&product).await
    }

    /// Deletes a product together with its items.
    pub async fn delete_product(&self, id: &str) -> DbResult<Product> {
        let id = validate_id("product id", id)?;
        self.db.products().remove(id).await
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    pub async fn create_item(&self, item: Item) -> DbResult<Item> {
        item.check_data()?;
        self.require_parent(&self.db.products(), &item.product_id)
            .await?;
        let item = self.db.items().insert(item).await?;
        debug!(id = ?item.id, product = %item.product_id, "Item created");
        Ok(item)
    }

    pub async fn find_item(&self, id: &str) -> DbResult<Item> {
        let id = validate_id("item id", id)?;
        self.db.items().find_by_id(id).await
    }

    pub async fn find_items(&self, product_id: &str) -> DbResult<Vec<Item>> {
        let product_id = validate_id("product id", product_id)?;
        self.db.items().find_all_in_product(product_id).await
    }

    /// Items whose id or name contains `keyword`, ignoring case.
    pub async fn search_items(&self, keyword: &str) -> DbResult<Vec<Item>> {
        self.db.items().search(keyword).await
    }

    pub async fn update_item(&self, item: &Item) -> DbResult<()> {
        let item = with_trimmed_id(item, "item id")?;
        item.check_data()?;
        self.require_parent(&self.db.products(), &item.product_id)
            .await?;
        self.db.items().update(&item).await
    }

    /// Deletes an item. Fails with ForeignKeyViolation while orders reference it.
    pub async fn delete_item(&self, id: &str) -> DbResult<Item> {
        let id = validate_id("item id", id)?;
        self.db.items().remove(id).await
    }

    // -------------------------------------------------------------------------
    // Cart pricing
    // -------------------------------------------------------------------------

    /// Prices every cart entry against the current catalog.
    ///
    /// Entries whose item has since been deleted are skipped with a warning,
    /// so a stale cart still renders.
    pub async fn price_cart(&self, cart: &ShoppingCart) -> DbResult<Vec<CartLine>> {
        let items = self.db.items();
        let mut lines = Vec::with_capacity(cart.len());

        for (item_id, quantity) in cart.entries() {
            match items.find_by_id(item_id).await {
                Ok(item) => lines.push(CartLine::new(item_id, &item, quantity)),
                Err(DbError::NotFound { .. }) => {
                    warn!(item = %item_id, "Cart references an item that no longer exists");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(lines)
    }

    async fn require_parent<P: Entity>(&self, store: &EntityStore<P>, id: &str) -> DbResult<()> {
        let id = validate_id(P::KIND, id)?;
        if !store.exists(id).await? {
            return Err(ValidationError::MissingReference {
                entity: P::KIND.to_string(),
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// A copy of a record about to be updated, with surrounding blanks
/// stripped from its id.
fn with_trimmed_id<E: Entity>(entity: &E, field: &str) -> DbResult<E> {
    let id = validate_id(field, entity.id().unwrap_or(""))?.to_string();
    let mut trimmed = entity.clone();
    trimmed.set_id(id);
    Ok(trimmed)
}
