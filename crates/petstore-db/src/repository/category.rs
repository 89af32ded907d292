//! Category persistence.

use petstore_core::Category;

use crate::store::{non_blank, Entity, SqliteQuery};

impl Entity for Category {
    const KIND: &'static str = "Category";
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static [&'static str] = &["id", "name", "description"];

    fn id(&self) -> Option<&str> {
        non_blank(&self.id)
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query.bind(self.name.clone()).bind(self.description.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_deleting_category_cascades_to_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let fish = db
            .categories()
            .insert(Category::new("Fish", "Aquatic"))
            .await
            .unwrap();
        let fish_id = fish.id.clone().unwrap();
        db.products()
            .insert(petstore_core::Product::new("Koi", "Pond fish", &fish_id))
            .await
            .unwrap();

        db.categories().remove(&fish_id).await.unwrap();

        assert_eq!(db.products().count().await.unwrap(), 0);
    }
}
