//! # larder-db
//!
//! PostgreSQL database layer for larder.
//!
//! This crate provides:
//! - Connection pool management
//! - The generic entry repository serving all four collections
//! - Embedded schema migrations (behind the `migrations` feature)
//!
//! ## Example
//!
//! ```rust,ignore
//! use larder_db::Database;
//! use larder_core::{Collection, EntryRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/larder").await?;
//!
//!     let entries = db.entries.list(Collection::Meals).await?;
//!     println!("{} meals", entries.len());
//!     Ok(())
//! }
//! ```

pub mod entries;
pub mod pool;

// Re-export core types
pub use larder_core::*;

pub use entries::PgEntryRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};

/// Combined database context.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Entry repository serving all four collections.
    pub entries: PgEntryRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            entries: PgEntryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect with default pool configuration.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
