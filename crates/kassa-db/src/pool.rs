//! # Database Pool
//!
//! Opens the catalog and sales store and hands out repositories.
//!
//! ```text
//!   kassa-server / seed ──► DbConfig::new(path) ──► Database::new
//!                                                       │
//!                           WAL, foreign keys, migrations
//!                                                       ▼
//!                      db.products() / db.sales() ──► repositories
//! ```
//!
//! A file database gets a small pool and WAL so searches do not wait on a
//! sale being written. `:memory:` is pinned to one connection; a second
//! connection would open a different, empty database.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;

const FILE_POOL_SIZE: u32 = 4;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub database_path: PathBuf,
}

impl DbConfig {
    /// A database file, created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
        }
    }

    /// A throwaway database for tests.
    pub fn in_memory() -> Self {
        DbConfig::new(":memory:")
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }

    fn pool_size(&self) -> u32 {
        if self.is_in_memory() {
            1
        } else {
            FILE_POOL_SIZE
        }
    }
}

/// Shared handle to the store. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database and applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening database");

        let connect_url = if config.is_in_memory() {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", config.database_path.display())
        };

        let mut connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        if !config.is_in_memory() {
            connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_size = config.pool_size();
        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .min_connections(1)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;
        info!(connections = pool_size, "Database ready");

        Ok(Database { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Closes the pool. Every later repository call fails.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// `true` when a trivial query goes through.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
