//! # uian-db
//!
//! PostgreSQL database layer for uian.
//!
//! This crate provides:
//! - Connection pool management
//! - The clinical case repository
//! - Vector similarity search with pgvector
//!
//! ## Example
//!
//! ```rust,ignore
//! use uian_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/uian").await?;
//!     let case = db.cases.fetch(case_id).await?;
//!     println!("{}", case.case_number);
//!     Ok(())
//! }
//! ```

pub mod cases;
pub mod pool;
pub mod search;

// Re-export core types
pub use uian_core::*;

pub use cases::PgCaseRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use search::PgCaseSearchRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Clinical case repository for CRUD operations.
    pub cases: PgCaseRepository,
    /// Vector similarity search over case embeddings.
    pub search: PgCaseSearchRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            cases: PgCaseRepository::new(pool.clone()),
            search: PgCaseSearchRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
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
