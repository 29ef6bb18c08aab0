//! User repository
//!
//! Database operations for users and their blog reference lists.
//!
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::{require_mysql, require_sqlite, DynDatabasePool};
use crate::models::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;

/// Returned (inside `anyhow::Error`) when an insert hits the unique email index
#[derive(Debug, thiserror::Error)]
#[error("Email '{0}' is already registered")]
pub struct DuplicateEmail(pub String);

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    ///
    /// Fails with [`DuplicateEmail`] if the email is taken.
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID, with its blog reference list
    async fn get_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Get user by email, with its blog reference list
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List all users, oldest first
    async fn list(&self) -> Result<Vec<User>>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_user_sqlite(require_sqlite(&self.pool)?, user).await,
            DatabaseDriver::Mysql => create_user_mysql(require_mysql(&self.pool)?, user).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_user_sqlite(require_sqlite(&self.pool)?, "id", id).await
            }
            DatabaseDriver::Mysql => get_user_mysql(require_mysql(&self.pool)?, "id", id).await,
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_user_sqlite(require_sqlite(&self.pool)?, "email", email).await
            }
            DatabaseDriver::Mysql => {
                get_user_mysql(require_mysql(&self.pool)?, "email", email).await
            }
        }
    }

    async fn list(&self) -> Result<Vec<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_users_sqlite(require_sqlite(&self.pool)?).await,
            DatabaseDriver::Mysql => list_users_mysql(require_mysql(&self.pool)?).await,
        }
    }
}

/// Map a failed insert to `DuplicateEmail` when it violated the unique index
fn map_insert_error(err: sqlx::Error, email: &str) -> anyhow::Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DuplicateEmail(email.to_string()).into()
        }
        _ => anyhow::Error::new(err).context("Failed to create user"),
    }
}

/// Group `(user_id, blog_id)` reference rows by user, preserving row order
fn group_refs(refs: Vec<(String, String)>) -> HashMap<String, Vec<String>> {
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for (user_id, blog_id) in refs {
        grouped.entry(user_id).or_default().push(blog_id);
    }
    grouped
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .map_err(|e| map_insert_error(e, &user.email))?;

    Ok(User {
        blogs: Vec::new(),
        ..user.clone()
    })
}

/// `column` is always a literal chosen by the caller, never client input
async fn get_user_sqlite(pool: &SqlitePool, column: &str, value: &str) -> Result<Option<User>> {
    let sql = format!(
        "SELECT id, name, email, password_hash, created_at, updated_at FROM users WHERE {} = ?",
        column
    );
    let row = sqlx::query(&sql)
        .bind(value)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to get user by {}", column))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut user = row_to_user_sqlite(&row);
    user.blogs = blog_refs_sqlite(pool, &user.id).await?;
    Ok(Some(user))
}

async fn blog_refs_sqlite(pool: &SqlitePool, user_id: &str) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT blog_id FROM user_blogs WHERE user_id = ? ORDER BY id")
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to load blog references")?;

    Ok(rows.iter().map(|row| row.get("blog_id")).collect())
}

async fn list_users_sqlite(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, email, password_hash, created_at, updated_at
        FROM users
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list users")?;

    let ref_rows = sqlx::query("SELECT user_id, blog_id FROM user_blogs ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to load blog references")?;
    let mut refs = group_refs(
        ref_rows
            .iter()
            .map(|row| (row.get("user_id"), row.get("blog_id")))
            .collect(),
    );

    Ok(rows
        .iter()
        .map(|row| {
            let mut user = row_to_user_sqlite(row);
            user.blogs = refs.remove(&user.id).unwrap_or_default();
            user
        })
        .collect())
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        blogs: Vec::new(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .map_err(|e| map_insert_error(e, &user.email))?;

    Ok(User {
        blogs: Vec::new(),
        ..user.clone()
    })
}

async fn get_user_mysql(pool: &MySqlPool, column: &str, value: &str) -> Result<Option<User>> {
    let sql = format!(
        "SELECT id, name, email, password_hash, created_at, updated_at FROM users WHERE {} = ?",
        column
    );
    let row = sqlx::query(&sql)
        .bind(value)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to get user by {}", column))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut user = row_to_user_mysql(&row);
    user.blogs = blog_refs_mysql(pool, &user.id).await?;
    Ok(Some(user))
}

async fn blog_refs_mysql(pool: &MySqlPool, user_id: &str) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT blog_id FROM user_blogs WHERE user_id = ? ORDER BY id")
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to load blog references")?;

    Ok(rows.iter().map(|row| row.get("blog_id")).collect())
}

async fn list_users_mysql(pool: &MySqlPool) -> Result<Vec<User>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, email, password_hash, created_at, updated_at
        FROM users
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list users")?;

    let ref_rows = sqlx::query("SELECT user_id, blog_id FROM user_blogs ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to load blog references")?;
    let mut refs = group_refs(
        ref_rows
            .iter()
            .map(|row| (row.get("user_id"), row.get("blog_id")))
            .collect(),
    );

    Ok(rows
        .iter()
        .map(|row| {
            let mut user = row_to_user_mysql(row);
            user.blogs = refs.remove(&user.id).unwrap_or_default();
            user
        })
        .collect())
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        blogs: Vec::new(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
