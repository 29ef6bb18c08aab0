//! Database layer
//!
//! Persistence for users and blogs. SQLite is the default backend (single
//! file, zero setup); MySQL is available for larger deployments. The driver
//! is selected by configuration.
//!
//! ```ignore
//! use blogx::config::DatabaseConfig;
//! use blogx::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, require_mysql, require_sqlite, DatabasePool, DynDatabasePool,
    MysqlDatabase, SqliteDatabase,
};
