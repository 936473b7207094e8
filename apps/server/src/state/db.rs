//! # Database State
//!
//! Wraps the `Database` connection for use in handlers.
//!
//! ## Thread Safety
//! The `Database` struct from `kassa-db` contains a `SqlitePool` which
//! is inherently thread-safe. Handlers can run queries concurrently
//! without explicit locking.
//!
//! ## Usage in Handlers
//! ```rust,ignore
//! async fn list_products(State(db): State<DbState>) -> ApiResult<Json<Vec<Product>>> {
//!     Ok(Json(db.inner().products().list_all().await?))
//! }
//! ```

use kassa_db::Database;

/// Wrapper around `Database` for axum state.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
