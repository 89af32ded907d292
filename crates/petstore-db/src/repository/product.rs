//! # Product Repository
//!
//! Products belong to exactly one category; `category_id` is a foreign key
//! with `ON DELETE CASCADE`.

use petstore_core::Product;

use crate::error::DbResult;
use crate::store::{non_blank, Entity, EntityStore, SqliteQuery};

impl Entity for Product {
    const KIND: &'static str = "Product";
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &["id", "name", "description", "category_id"];

    fn id(&self) -> Option<&str> {
        non_blank(&self.id)
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.name.clone())
            .bind(self.description.clone())
            .bind(self.category_id.clone())
    }
}

impl EntityStore<Product> {
    /// Products of a category, in insertion order.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - The category has no products (or does not exist)
    pub async fn find_all_in_category(&self, category_id: &str) -> DbResult<Vec<Product>> {
        self.find_by_column("category_id", category_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use petstore_core::Category;

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for id in ["FISH", "DOGS"] {
            db.categories()
                .insert(Category::new(id, "desc").with_id(id))
                .await
                .unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_find_all_in_category() {
        let db = seeded().await;
        let products = db.products();

        products
            .insert(Product::new("Angelfish", "Salt water fish", "FISH"))
            .await
            .unwrap();
        products
            .insert(Product::new("Bulldog", "Friendly dog", "DOGS"))
            .await
            .unwrap();
        products
            .insert(Product::new("Tiger Shark", "Salt water fish", "FISH"))
            .await
            .unwrap();

        let fish = products.find_all_in_category("FISH").await.unwrap();
        let names: Vec<&str> = fish.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Angelfish", "Tiger Shark"]);

        assert!(products
            .find_all_in_category("BIRDS")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_unknown_category_is_foreign_key_violation() {
        let db = seeded().await;

        let err = db
            .products()
            .insert(Product::new("Parrot", "Talks", "BIRDS"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(db.products().count().await.unwrap(), 0);
    }
}
