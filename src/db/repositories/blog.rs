//! Blog repository
//!
//! Database operations for blogs. A blog row and the matching entry in its
//! owner's reference list (`user_blogs`) are always written together in one
//! transaction.

use crate::config::DatabaseDriver;
use crate::db::{require_mysql, require_sqlite, DynDatabasePool};
use crate::models::{Blog, UpdateBlogInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Blog repository trait
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// List every blog, oldest first
    async fn list(&self) -> Result<Vec<Blog>>;

    /// Get blog by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Blog>>;

    /// List the blogs referenced by a user, in reference-list order
    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Blog>>;

    /// Insert a blog and append it to its owner's reference list
    async fn create_for_owner(&self, blog: &Blog) -> Result<Blog>;

    /// Apply a partial update. Returns `None` if the blog does not exist.
    async fn update(&self, id: &str, input: &UpdateBlogInput) -> Result<Option<Blog>>;

    /// Delete a blog and remove it from its owner's reference list.
    ///
    /// Returns the deleted blog, or `None` if it did not exist.
    async fn delete_for_owner(&self, id: &str) -> Result<Option<Blog>>;
}

/// SQLx-based blog repository implementation
pub struct SqlxBlogRepository {
    pool: DynDatabasePool,
}

impl SqlxBlogRepository {
    /// Create a new SQLx blog repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BlogRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl BlogRepository for SqlxBlogRepository {
    async fn list(&self) -> Result<Vec<Blog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_blogs_sqlite(require_sqlite(&self.pool)?).await,
            DatabaseDriver::Mysql => list_blogs_mysql(require_mysql(&self.pool)?).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Blog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_blog_sqlite(require_sqlite(&self.pool)?, id).await,
            DatabaseDriver::Mysql => get_blog_mysql(require_mysql(&self.pool)?, id).await,
        }
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Blog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_blogs_by_owner_sqlite(require_sqlite(&self.pool)?, user_id).await
            }
            DatabaseDriver::Mysql => {
                list_blogs_by_owner_mysql(require_mysql(&self.pool)?, user_id).await
            }
        }
    }

    async fn create_for_owner(&self, blog: &Blog) -> Result<Blog> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_blog_sqlite(require_sqlite(&self.pool)?, blog).await,
            DatabaseDriver::Mysql => create_blog_mysql(require_mysql(&self.pool)?, blog).await,
        }
    }

    async fn update(&self, id: &str, input: &UpdateBlogInput) -> Result<Option<Blog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_blog_sqlite(require_sqlite(&self.pool)?, id, input).await
            }
            DatabaseDriver::Mysql => update_blog_mysql(require_mysql(&self.pool)?, id, input).await,
        }
    }

    async fn delete_for_owner(&self, id: &str) -> Result<Option<Blog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_blog_sqlite(require_sqlite(&self.pool)?, id).await,
            DatabaseDriver::Mysql => delete_blog_mysql(require_mysql(&self.pool)?, id).await,
        }
    }
}

const SELECT_BLOG: &str =
    "SELECT id, title, description, image, user_id, created_at, updated_at FROM blogs";

const UPDATE_BLOG: &str = r#"
    UPDATE blogs SET
        title = COALESCE(?, title),
        description = COALESCE(?, description),
        image = COALESCE(?, image),
        updated_at = ?
    WHERE id = ?
"#;

const SELECT_BLOGS_BY_OWNER: &str = r#"
    SELECT b.id, b.title, b.description, b.image, b.user_id, b.created_at, b.updated_at
    FROM user_blogs ub
    INNER JOIN blogs b ON b.id = ub.blog_id
    WHERE ub.user_id = ?
    ORDER BY ub.id
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_blogs_sqlite(pool: &SqlitePool) -> Result<Vec<Blog>> {
    let rows = sqlx::query(&format!("{} ORDER BY created_at ASC", SELECT_BLOG))
        .fetch_all(pool)
        .await
        .context("Failed to list blogs")?;

    Ok(rows.iter().map(row_to_blog_sqlite).collect())
}

async fn get_blog_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Blog>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_BLOG))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get blog by id")?;

    Ok(row.as_ref().map(row_to_blog_sqlite))
}

async fn list_blogs_by_owner_sqlite(pool: &SqlitePool, user_id: &str) -> Result<Vec<Blog>> {
    let rows = sqlx::query(SELECT_BLOGS_BY_OWNER)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to list blogs by owner")?;

    Ok(rows.iter().map(row_to_blog_sqlite).collect())
}

async fn create_blog_sqlite(pool: &SqlitePool, blog: &Blog) -> Result<Blog> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(
        r#"
        INSERT INTO blogs (id, title, description, image, user_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&blog.id)
    .bind(&blog.title)
    .bind(&blog.description)
    .bind(&blog.image)
    .bind(&blog.user_id)
    .bind(blog.created_at)
    .bind(blog.updated_at)
    .execute(&mut *tx)
    .await
    .context("Failed to create blog")?;

    sqlx::query("INSERT INTO user_blogs (user_id, blog_id) VALUES (?, ?)")
        .bind(&blog.user_id)
        .bind(&blog.id)
        .execute(&mut *tx)
        .await
        .context("Failed to link blog to owner")?;

    tx.commit().await.context("Failed to commit blog creation")?;

    Ok(blog.clone())
}

async fn update_blog_sqlite(
    pool: &SqlitePool,
    id: &str,
    input: &UpdateBlogInput,
) -> Result<Option<Blog>> {
    let result = sqlx::query(UPDATE_BLOG)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.image)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update blog")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_blog_sqlite(pool, id).await
}

async fn delete_blog_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Blog>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    // Write first so the transaction takes the write lock up front.
    let row = sqlx::query(
        r#"
        DELETE FROM blogs WHERE id = ?
        RETURNING id, title, description, image, user_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .context("Failed to delete blog")?;

    let Some(blog) = row.as_ref().map(row_to_blog_sqlite) else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM user_blogs WHERE blog_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to unlink blog from owner")?;

    tx.commit().await.context("Failed to commit blog deletion")?;

    Ok(Some(blog))
}

fn row_to_blog_sqlite(row: &sqlx::sqlite::SqliteRow) -> Blog {
    Blog {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        image: row.get("image"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_blogs_mysql(pool: &MySqlPool) -> Result<Vec<Blog>> {
    let rows = sqlx::query(&format!("{} ORDER BY created_at ASC", SELECT_BLOG))
        .fetch_all(pool)
        .await
        .context("Failed to list blogs")?;

    Ok(rows.iter().map(row_to_blog_mysql).collect())
}

async fn get_blog_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Blog>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_BLOG))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get blog by id")?;

    Ok(row.as_ref().map(row_to_blog_mysql))
}

async fn list_blogs_by_owner_mysql(pool: &MySqlPool, user_id: &str) -> Result<Vec<Blog>> {
    let rows = sqlx::query(SELECT_BLOGS_BY_OWNER)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to list blogs by owner")?;

    Ok(rows.iter().map(row_to_blog_mysql).collect())
}

async fn create_blog_mysql(pool: &MySqlPool, blog: &Blog) -> Result<Blog> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(
        r#"
        INSERT INTO blogs (id, title, description, image, user_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&blog.id)
    .bind(&blog.title)
    .bind(&blog.description)
    .bind(&blog.image)
    .bind(&blog.user_id)
    .bind(blog.created_at)
    .bind(blog.updated_at)
    .execute(&mut *tx)
    .await
    .context("Failed to create blog")?;

    sqlx::query("INSERT INTO user_blogs (user_id, blog_id) VALUES (?, ?)")
        .bind(&blog.user_id)
        .bind(&blog.id)
        .execute(&mut *tx)
        .await
        .context("Failed to link blog to owner")?;

    tx.commit().await.context("Failed to commit blog creation")?;

    Ok(blog.clone())
}

async fn update_blog_mysql(
    pool: &MySqlPool,
    id: &str,
    input: &UpdateBlogInput,
) -> Result<Option<Blog>> {
    // MySQL reports matched-but-unchanged rows as 0 affected, so check existence first.
    if get_blog_mysql(pool, id).await?.is_none() {
        return Ok(None);
    }

    sqlx::query(UPDATE_BLOG)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.image)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update blog")?;

    get_blog_mysql(pool, id).await
}

async fn delete_blog_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Blog>> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let row = sqlx::query(&format!("{} WHERE id = ? FOR UPDATE", SELECT_BLOG))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to get blog by id")?;

    let Some(blog) = row.as_ref().map(row_to_blog_mysql) else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM blogs WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete blog")?;

    sqlx::query("DELETE FROM user_blogs WHERE blog_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to unlink blog from owner")?;

    tx.commit().await.context("Failed to commit blog deletion")?;

    Ok(Some(blog))
}

fn row_to_blog_mysql(row: &sqlx::mysql::MySqlRow) -> Blog {
    Blog {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        image: row.get("image"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateBlogInput, User};

    struct Fixture {
        pool: DynDatabasePool,
        users: SqlxUserRepository,
        blogs: SqlxBlogRepository,
        owner: User,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let owner = User::new("Ada".into(), "ada@example.com".into(), "hash".into());
        users.create(&owner).await.expect("Failed to create owner");

        Fixture {
            blogs: SqlxBlogRepository::new(pool.clone()),
            pool,
            users,
            owner,
        }
    }

    fn new_blog(owner: &User, title: &str) -> Blog {
        Blog::new(CreateBlogInput {
            title: title.to_string(),
            description: format!("About {}", title),
            image: "https://img.example.com/x.png".to_string(),
            user_id: owner.id.clone(),
        })
    }

    #[tokio::test]
    async fn test_create_links_owner() {
        let fx = setup().await;
        let blog = new_blog(&fx.owner, "First");

        let created = fx.blogs.create_for_owner(&blog).await.unwrap();
        assert_eq!(created, blog);

        let stored = fx.blogs.get_by_id(&blog.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "First");
        assert_eq!(stored.user_id, fx.owner.id);

        let owner = fx.users.get_by_id(&fx.owner.id).await.unwrap().unwrap();
        assert_eq!(owner.blogs, vec![blog.id.clone()]);
    }

    #[tokio::test]
    async fn test_list_by_owner_follows_reference_order() {
        let fx = setup().await;
        let first = new_blog(&fx.owner, "First");
        let second = new_blog(&fx.owner, "Second");
        fx.blogs.create_for_owner(&first).await.unwrap();
        fx.blogs.create_for_owner(&second).await.unwrap();

        let owned = fx.blogs.list_by_owner(&fx.owner.id).await.unwrap();
        let titles: Vec<_> = owned.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);

        let all = fx.blogs.list().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_create_rolls_back_when_link_fails() {
        let fx = setup().await;
        fx.pool
            .execute(
                "CREATE TRIGGER fail_link BEFORE INSERT ON user_blogs \
                 BEGIN SELECT RAISE(ABORT, 'forced'); END",
            )
            .await
            .unwrap();

        let blog = new_blog(&fx.owner, "Doomed");
        assert!(fx.blogs.create_for_owner(&blog).await.is_err());

        assert!(fx.blogs.get_by_id(&blog.id).await.unwrap().is_none());
        assert!(fx.blogs.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_unknown_owner_fails() {
        let fx = setup().await;
        let ghost = User::new("Ghost".into(), "ghost@example.com".into(), "hash".into());
        let blog = new_blog(&ghost, "Orphan");

        assert!(fx.blogs.create_for_owner(&blog).await.is_err());
        assert!(fx.blogs.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_omitted_fields() {
        let fx = setup().await;
        let blog = new_blog(&fx.owner, "Draft");
        fx.blogs.create_for_owner(&blog).await.unwrap();

        let update = UpdateBlogInput {
            title: Some("Published".to_string()),
            ..Default::default()
        };
        let updated = fx.blogs.update(&blog.id, &update).await.unwrap().unwrap();

        assert_eq!(updated.title, "Published");
        assert_eq!(updated.description, blog.description);
        assert_eq!(updated.image, blog.image);
        assert_eq!(updated.user_id, blog.user_id);
        assert_eq!(updated.created_at, blog.created_at);
        assert!(updated.updated_at >= blog.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_blog_returns_none() {
        let fx = setup().await;
        let update = UpdateBlogInput {
            title: Some("Nope".to_string()),
            ..Default::default()
        };

        let result = fx
            .blogs
            .update(&crate::models::new_id(), &update)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_unlinks_owner() {
        let fx = setup().await;
        let keep = new_blog(&fx.owner, "Keep");
        let gone = new_blog(&fx.owner, "Drop");
        fx.blogs.create_for_owner(&keep).await.unwrap();
        fx.blogs.create_for_owner(&gone).await.unwrap();

        let deleted = fx.blogs.delete_for_owner(&gone.id).await.unwrap();
        assert_eq!(deleted.map(|b| b.id), Some(gone.id.clone()));

        assert!(fx.blogs.get_by_id(&gone.id).await.unwrap().is_none());
        let owner = fx.users.get_by_id(&fx.owner.id).await.unwrap().unwrap();
        assert_eq!(owner.blogs, vec![keep.id.clone()]);
    }

    #[tokio::test]
    async fn test_delete_rolls_back_when_unlink_fails() {
        let fx = setup().await;
        let blog = new_blog(&fx.owner, "Sticky");
        fx.blogs.create_for_owner(&blog).await.unwrap();

        fx.pool
            .execute(
                "CREATE TRIGGER fail_unlink BEFORE DELETE ON user_blogs \
                 BEGIN SELECT RAISE(ABORT, 'forced'); END",
            )
            .await
            .unwrap();

        assert!(fx.blogs.delete_for_owner(&blog.id).await.is_err());

        let stored = fx.blogs.get_by_id(&blog.id).await.unwrap();
        assert_eq!(stored.map(|b| b.id), Some(blog.id.clone()));
        let owner = fx.users.get_by_id(&fx.owner.id).await.unwrap().unwrap();
        assert_eq!(owner.blogs, vec![blog.id.clone()]);
    }

    #[tokio::test]
    async fn test_delete_missing_blog_returns_none() {
        let fx = setup().await;
        let result = fx
            .blogs
            .delete_for_owner(&crate::models::new_id())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
