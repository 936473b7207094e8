//! # Sale Repository
//!
//! Database operations for persisted sales.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create(payload) → id   (created_at = updated_at = now)         │
//! │                                                                         │
//! │  2. (OPTIONAL) EDIT                                                    │
//! │     └── get_by_id(id) → Sale   (items decoded, totals re-checked)      │
//! │     └── replace(id, payload)   (full replace, created_at kept)         │
//! │                                                                         │
//! │  Sales are never deleted.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items are stored as a JSON array in the `items` column and decoded into
//! typed [`SaleItem`]s on every read.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use kassa_core::reconcile::verify_sale;
use kassa_core::{Sale, SaleItem, SalePayload, SaleStatus};

/// Raw `sales` row before the items column is decoded.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i64,
    items: String,
    subtotal_cents: i64,
    profit_cents: i64,
    status: SaleStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SaleRow> for Sale {
    type Error = DbError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        let items: Vec<SaleItem> = serde_json::from_str(&row.items)?;

        let sale = Sale {
            id: row.id,
            items,
            subtotal_cents: row.subtotal_cents,
            profit_cents: row.profit_cents,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };

        if let Err(e) = verify_sale(&sale) {
            warn!(sale_id = sale.id, error = %e, "Stored sale totals drifted from items");
        }

        Ok(sale)
    }
}

const SALE_COLUMNS: &str =
    "id, items, subtotal_cents, profit_cents, status, created_at, updated_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a new sale and returns its id.
    pub async fn create(&self, payload: &SalePayload) -> DbResult<i64> {
        debug!(
            items = payload.items.len(),
            status = payload.status.as_str(),
            "Creating sale"
        );

        let items = serde_json::to_string(&payload.items)?;
        let now = Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sales (items, subtotal_cents, profit_cents, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING id
            "#,
        )
        .bind(items)
        .bind(payload.subtotal_cents)
        .bind(payload.profit_cents)
        .bind(payload.status)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Fully replaces an existing sale. `created_at` is left as is.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Sale doesn't exist
    pub async fn replace(&self, id: i64, payload: &SalePayload) -> DbResult<()> {
        debug!(
            id = %id,
            items = payload.items.len(),
            status = payload.status.as_str(),
            "Replacing sale"
        );

        let items = serde_json::to_string(&payload.items)?;

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                items = ?2,
                subtotal_cents = ?3,
                profit_cents = ?4,
                status = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(items)
        .bind(payload.subtotal_cents)
        .bind(payload.profit_cents)
        .bind(payload.status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Gets a sale by ID with its items decoded.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let row = sqlx::query_as::<_, SaleRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Sale::try_from).transpose()
    }

    /// Lists sales, newest first.
    pub async fn list(&self, status: Option<SaleStatus>) -> DbResult<Vec<Sale>> {
        let rows = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {SALE_COLUMNS} FROM sales WHERE status = ?1 \
                     ORDER BY id DESC"
                );
                sqlx::query_as::<_, SaleRow>(&sql)
                    .bind(status)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql =
                    format!("SELECT {SALE_COLUMNS} FROM sales ORDER BY id DESC");
                sqlx::query_as::<_, SaleRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(Sale::try_from).collect()
    }

    /// Counts stored sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Tests
// =============================================================================
