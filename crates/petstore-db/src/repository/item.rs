//! # Item Repository
//!
//! Items are the sellable variants of a product, priced in cents.
//!
//! ## Search
//! ```text
//! search("fish")
//!      │
//!      ▼
//! validate_search_keyword ── trims, rejects empty
//!      │
//!      ▼
//! pattern "%fish%" (LIKE wildcards in the keyword are escaped)
//!      │
//!      ▼
//! WHERE id LIKE ?1 OR name LIKE ?1   (case-insensitive for ASCII)
//! ```

use petstore_core::validation::validate_search_keyword;
use petstore_core::Item;

use crate::error::DbResult;
use crate::store::{non_blank, Entity, EntityStore, SqliteQuery};

impl Entity for Item {
    const KIND: &'static str = "Item";
    const TABLE: &'static str = "items";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "unit_cost_cents", "image_path", "product_id"];

    fn id(&self) -> Option<&str> {
        non_blank(&self.id)
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.name.clone())
            .bind(self.unit_cost_cents)
            .bind(self.image_path.clone())
            .bind(self.product_id.clone())
    }
}

impl EntityStore<Item> {
    /// Items of a product, in insertion order. NotFound when there are none.
    pub async fn find_all_in_product(&self, product_id: &str) -> DbResult<Vec<Item>> {
        self.find_by_column("product_id", product_id).await
    }

    /// Items whose id or name contains `keyword`.
    ///
    /// ## Returns
    /// * `Err(DbError::Validation)` - Blank keyword
    /// * `Err(DbError::NotFound)` - Nothing matched
    pub async fn search(&self, keyword: &str) -> DbResult<Vec<Item>> {
        let keyword = validate_search_keyword(keyword)?;
        let pattern = format!("%{}%", escape_like(&keyword));

        self.find_filtered(
            r"id LIKE ?1 ESCAPE '\' OR name LIKE ?1 ESCAPE '\'",
            &[pattern.as_str()],
            &keyword,
        )
        .await
    }
}

/// Escapes LIKE wildcards so they match literally.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
