//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - Literal substring search
//! - CRUD operations, including a transactional bulk import
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Catalog Search Works                             │
//! │                                                                         │
//! │  Operator types: "50%"                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  escape_like → "50\%"  (wildcards become literals)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  name LIKE '%50\%%' ESCAPE '\'                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Prefix matches first, then by name, at most `limit` rows              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite's LIKE folds case for ASCII letters only.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kassa_core::validation::escape_like;
use kassa_core::{Product, ProductInput};

const PRODUCT_COLUMNS: &str = "id, name, buying_price_cents, selling_price_cents";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let results = repo.search("cable", 10).await?;
/// let product = repo.get_by_id(7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Finds products whose name contains `term`, case-insensitively.
    ///
    /// ## Arguments
    /// * `term` - Already validated, non-empty search term
    /// * `limit` - Maximum results to return
    ///
    /// ## Ordering
    /// Names starting with the term come first, then alphabetical.
    pub async fn search(&self, term: &str, limit: i64) -> DbResult<Vec<Product>> {
        debug!(term = %term, limit = %limit, "Searching products");

        let escaped = escape_like(term);
        let contains = format!("%{}%", escaped);
        let prefix = format!("{}%", escaped);

        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE name LIKE ?1 ESCAPE '\'
            ORDER BY
                CASE WHEN name LIKE ?2 ESCAPE '\' THEN 0 ELSE 1 END,
                name COLLATE NOCASE ASC,
                id ASC
            LIMIT ?3
            "#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(contains)
            .bind(prefix)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists the whole catalog ordered by name.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name COLLATE NOCASE ASC, id ASC"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product and returns it with its assigned id.
    pub async fn insert(&self, input: &ProductInput) -> DbResult<Product> {
        debug!(name = %input.name, "Inserting product");

        let sql = format!(
            r#"
            INSERT INTO products (name, buying_price_cents, selling_price_cents)
            VALUES (?1, ?2, ?3)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(input.name.trim())
            .bind(input.buying_price_cents)
            .bind(input.selling_price_cents)
            .fetch_one(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts many products in one transaction. Either all rows land or
    /// none do.
    pub async fn insert_bulk(&self, inputs: &[ProductInput]) -> DbResult<Vec<Product>> {
        debug!(count = inputs.len(), "Bulk inserting products");

        let sql = format!(
            r#"
            INSERT INTO products (name, buying_price_cents, selling_price_cents)
            VALUES (?1, ?2, ?3)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut inserted = Vec::with_capacity(inputs.len());
        for input in inputs {
            let product = sqlx::query_as::<_, Product>(&sql)
                .bind(input.name.trim())
                .bind(input.buying_price_cents)
                .bind(input.selling_price_cents)
                .fetch_one(&mut *tx)
                .await?;
            inserted.push(product);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(inserted)
    }

    /// Replaces a product's fields.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The updated row
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: i64, input: &ProductInput) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let sql = format!(
            r#"
            UPDATE products SET
                name = ?2,
                buying_price_cents = ?3,
                selling_price_cents = ?4
            WHERE id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(input.name.trim())
            .bind(input.buying_price_cents)
            .bind(input.selling_price_cents)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product. Stored sales keep their own name/price snapshot.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn input(name: &str, selling: i64, buying: Option<i64>) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            buying_price_cents: buying,
            selling_price_cents: selling,
        }
    }

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .insert_bulk(&[
                input("USB Cable", 50000, Some(30000)),
                input("HDMI Cable 2m", 90000, Some(60000)),
                input("Cable Tie Pack", 20000, None),
                input("Phone Charger", 150000, Some(100000)),
                input("50% Off Sticker", 100, None),
                input("500 GB Drive", 1500000, Some(1200000)),
                input("usb_c adapter", 70000, None),
            ])
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_search_substring_case_insensitive() {
        let db = seeded().await;
        let names: Vec<String> = db
            .products()
            .search("CABLE", 10)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        // prefix match first, then alphabetical
        assert_eq!(names, vec!["Cable Tie Pack", "HDMI Cable 2m", "USB Cable"]);
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let inputs: Vec<ProductInput> = (0..25)
            .map(|i| input(&format!("Widget {:02}", i), 100 + i, None))
            .collect();
        db.products().insert_bulk(&inputs).await.unwrap();

        let found = db.products().search("widget", 10).await.unwrap();
        assert_eq!(found.len(), 10);
        assert_eq!(found[0].name, "Widget 00");
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = seeded().await;

        let found = db.products().search("50%", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "50% Off Sticker");

        let found = db.products().search("usb_c", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "usb_c adapter");

        assert!(db.products().search("%", 10).await.unwrap().len() == 1);
    }

    #[tokio::test]
    async fn test_list_all_sorted_by_name() {
        let db = seeded().await;
        let all = db.products().list_all().await.unwrap();
        assert_eq!(all.len(), 7);
        let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_by_key(|n| n.to_lowercase());
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn test_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let created = repo.insert(&input("  Mouse ", 25000, None)).await.unwrap();
        assert_eq!(created.name, "Mouse");
        assert_eq!(created.buying_price_cents, None);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let updated = repo
            .update(created.id, &input("Wireless Mouse", 27500, Some(15000)))
            .await
            .unwrap();
        assert_eq!(updated.selling_price_cents, 27500);
        assert_eq!(updated.buying_price_cents, Some(15000));

        repo.delete(created.id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert!(repo.delete(created.id).await.unwrap_err().is_not_found());
        assert!(repo
            .update(created.id, &input("Ghost", 1, None))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_bulk_insert_is_atomic() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let result = db
            .products()
            .insert_bulk(&[input("Good", 100, None), input("Bad", -5, None)])
            .await;

        assert!(matches!(result, Err(DbError::ConstraintViolation { .. })));
        assert_eq!(db.products().count().await.unwrap(), 0);
    }
}
