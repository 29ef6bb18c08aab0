//! Blog service
//!
//! Business logic for blogs. Every operation that takes an ID validates its
//! format first, so a malformed ID never reaches the database.
//! Creation and deletion keep the owner's reference list in step with the
//! blog table; see `BlogRepository::create_for_owner` and
//! `BlogRepository::delete_for_owner`.

use crate::db::repositories::{BlogRepository, UserRepository};
use crate::models::{
    parse_id, Blog, BlogWithOwner, CreateBlogInput, UpdateBlogInput, User, UserWithBlogs,
};
use anyhow::Context;
use std::collections::HashMap;
use std::sync::Arc;

/// Error types for blog service operations
#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    /// Validation error (missing field, malformed ID)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Blog or user not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Raw, unvalidated fields for a new blog as they arrive from a client
#[derive(Debug, Clone, Default)]
pub struct NewBlog {
    pub title: String,
    pub description: String,
    pub image: String,
    pub user: String,
}

/// Blog service
pub struct BlogService {
    blog_repo: Arc<dyn BlogRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl BlogService {
    /// Create a new blog service
    pub fn new(blog_repo: Arc<dyn BlogRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self {
            blog_repo,
            user_repo,
        }
    }

    /// List every blog with its owner embedded
    pub async fn list_all(&self) -> Result<Vec<BlogWithOwner>, BlogServiceError> {
        let blogs = self.blog_repo.list().await.context("Failed to list blogs")?;
        if blogs.is_empty() {
            return Ok(Vec::new());
        }

        let owners: HashMap<String, User> = self
            .user_repo
            .list()
            .await
            .context("Failed to load blog owners")?
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();

        Ok(blogs
            .into_iter()
            .map(|blog| {
                let owner = owners.get(&blog.user_id).cloned();
                BlogWithOwner::new(blog, owner)
            })
            .collect())
    }

    /// Create a blog for an existing user
    ///
    /// # Errors
    ///
    /// - `ValidationError` if any field is empty or the owner ID is malformed
    /// - `NotFound` if the owner does not exist
    pub async fn create(&self, input: NewBlog) -> Result<Blog, BlogServiceError> {
        let title = input.title.trim();
        let description = input.description.trim();
        let image = input.image.trim();
        let owner = input.user.trim();

        if title.is_empty() || description.is_empty() || image.is_empty() || owner.is_empty() {
            return Err(BlogServiceError::ValidationError(
                "All fields are required".to_string(),
            ));
        }

        let user_id = parse_id(owner)
            .ok_or_else(|| BlogServiceError::ValidationError("Invalid user ID".to_string()))?;

        if self
            .user_repo
            .get_by_id(&user_id)
            .await
            .context("Failed to look up blog owner")?
            .is_none()
        {
            return Err(BlogServiceError::NotFound("User not found".to_string()));
        }

        let blog = Blog::new(CreateBlogInput {
            title: title.to_string(),
            description: input.description,
            image: input.image,
            user_id,
        });

        let created = self
            .blog_repo
            .create_for_owner(&blog)
            .await
            .context("Failed to create blog")?;

        tracing::info!("Created blog {} for user {}", created.id, created.user_id);
        Ok(created)
    }

    /// Partially update a blog
    ///
    /// Omitted fields are kept. A supplied field that is blank is rejected.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateBlogInput,
    ) -> Result<Blog, BlogServiceError> {
        let id = parse_blog_id(id)?;

        let input = UpdateBlogInput {
            title: input.title.map(|t| t.trim().to_string()),
            ..input
        };
        let blank = |field: &Option<String>| field.as_deref().is_some_and(|v| v.trim().is_empty());
        if blank(&input.title) || blank(&input.description) || blank(&input.image) {
            return Err(BlogServiceError::ValidationError(
                "Fields cannot be empty".to_string(),
            ));
        }

        self.blog_repo
            .update(&id, &input)
            .await
            .context("Failed to update blog")?
            .ok_or_else(blog_not_found)
    }

    /// Get a blog by ID with its owner embedded
    pub async fn get_by_id(&self, id: &str) -> Result<BlogWithOwner, BlogServiceError> {
        let id = parse_blog_id(id)?;

        let blog = self
            .blog_repo
            .get_by_id(&id)
            .await
            .context("Failed to get blog by ID")?
            .ok_or_else(blog_not_found)?;

        let owner = self
            .user_repo
            .get_by_id(&blog.user_id)
            .await
            .context("Failed to load blog owner")?;

        Ok(BlogWithOwner::new(blog, owner))
    }

    /// Delete a blog and drop it from its owner's reference list
    ///
    /// Returns the deleted blog.
    pub async fn delete(&self, id: &str) -> Result<Blog, BlogServiceError> {
        let id = parse_blog_id(id)?;

        let deleted = self
            .blog_repo
            .delete_for_owner(&id)
            .await
            .context("Failed to delete blog")?
            .ok_or_else(blog_not_found)?;

        tracing::info!("Deleted blog {}", deleted.id);
        Ok(deleted)
    }

    /// Get a user with every blog they own expanded, in reference order
    pub async fn list_by_owner(&self, user_id: &str) -> Result<UserWithBlogs, BlogServiceError> {
        let user_id = parse_id(user_id)
            .ok_or_else(|| BlogServiceError::ValidationError("Invalid user ID".to_string()))?;

        let user = self
            .user_repo
            .get_by_id(&user_id)
            .await
            .context("Failed to get user by ID")?
            .ok_or_else(|| {
                BlogServiceError::NotFound("No blogs found for this user".to_string())
            })?;

        let blogs = self
            .blog_repo
            .list_by_owner(&user.id)
            .await
            .context("Failed to list user blogs")?;

        Ok(UserWithBlogs::new(user, blogs))
    }
}

fn parse_blog_id(id: &str) -> Result<String, BlogServiceError> {
    parse_id(id).ok_or_else(|| BlogServiceError::ValidationError("Invalid blog ID".to_string()))
}

fn blog_not_found() -> BlogServiceError {
    BlogServiceError::NotFound("Blog not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxBlogRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    struct Fixture {
        _pool: DynDatabasePool,
        service: BlogService,
        users: Arc<dyn UserRepository>,
        owner: User,
    }

    async fn setup_test_service() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::boxed(pool.clone());
        let blogs = SqlxBlogRepository::boxed(pool.clone());
        let owner = User::new("Ada".into(), "ada@example.com".into(), "hash".into());
        users.create(&owner).await.expect("Failed to create owner");

        Fixture {
            _pool: pool,
            service: BlogService::new(blogs, users.clone()),
            users,
            owner,
        }
    }

    fn new_blog(owner: &str, title: &str) -> NewBlog {
        NewBlog {
            title: title.to_string(),
            description: "Body".to_string(),
            image: "https://img.example.com/a.png".to_string(),
            user: owner.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_blog_links_owner() {
        let fx = setup_test_service().await;

        let blog = fx
            .service
            .create(new_blog(&fx.owner.id, "  Hello  "))
            .await
            .expect("Failed to create blog");

        assert_eq!(blog.title, "Hello");
        assert_eq!(blog.user_id, fx.owner.id);

        let owner = fx.users.get_by_id(&fx.owner.id).await.unwrap().unwrap();
        assert_eq!(owner.blogs, vec![blog.id]);
    }

    #[tokio::test]
    async fn test_create_blog_missing_field() {
        let fx = setup_test_service().await;
        let mut input = new_blog(&fx.owner.id, "Hello");
        input.image = "   ".to_string();

        let result = fx.service.create(input).await;
        assert!(matches!(result, Err(BlogServiceError::ValidationError(msg)) if msg == "All fields are required"));
    }

    #[tokio::test]
    async fn test_create_blog_invalid_owner_id() {
        let fx = setup_test_service().await;

        let result = fx.service.create(new_blog("12345", "Hello")).await;
        assert!(matches!(result, Err(BlogServiceError::ValidationError(msg)) if msg == "Invalid user ID"));
    }

    #[tokio::test]
    async fn test_create_blog_unknown_owner_creates_nothing() {
        let fx = setup_test_service().await;

        let result = fx
            .service
            .create(new_blog(&crate::models::new_id(), "Hello"))
            .await;

        assert!(matches!(result, Err(BlogServiceError::NotFound(_))));
        assert!(fx.service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_all_embeds_owner() {
        let fx = setup_test_service().await;
        assert!(fx.service.list_all().await.unwrap().is_empty());

        fx.service
            .create(new_blog(&fx.owner.id, "One"))
            .await
            .unwrap();

        let all = fx.service.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        let owner = all[0].user.as_ref().expect("Owner should be embedded");
        assert_eq!(owner.id, fx.owner.id);
    }

    #[tokio::test]
    async fn test_update_title_only() {
        let fx = setup_test_service().await;
        let blog = fx
            .service
            .create(new_blog(&fx.owner.id, "Draft"))
            .await
            .unwrap();

        let updated = fx
            .service
            .update(
                &blog.id,
                UpdateBlogInput {
                    title: Some(" Final ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to update blog");

        assert_eq!(updated.title, "Final");
        assert_eq!(updated.description, blog.description);
        assert_eq!(updated.image, blog.image);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_field() {
        let fx = setup_test_service().await;
        let blog = fx
            .service
            .create(new_blog(&fx.owner.id, "Draft"))
            .await
            .unwrap();

        let result = fx
            .service
            .update(
                &blog.id,
                UpdateBlogInput {
                    description: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(BlogServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_update_malformed_and_missing() {
        let fx = setup_test_service().await;

        let malformed = fx
            .service
            .update("bogus", UpdateBlogInput::default())
            .await;
        assert!(matches!(malformed, Err(BlogServiceError::ValidationError(msg)) if msg == "Invalid blog ID"));

        let missing = fx
            .service
            .update(&crate::models::new_id(), UpdateBlogInput::default())
            .await;
        assert!(matches!(missing, Err(BlogServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let fx = setup_test_service().await;
        let blog = fx
            .service
            .create(new_blog(&fx.owner.id, "Hello"))
            .await
            .unwrap();

        let found = fx.service.get_by_id(&blog.id).await.unwrap();
        assert_eq!(found.id, blog.id);
        assert_eq!(found.user.map(|u| u.id), Some(fx.owner.id.clone()));

        let malformed = fx.service.get_by_id("xyz").await;
        assert!(matches!(malformed, Err(BlogServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_delete_blog() {
        let fx = setup_test_service().await;
        let blog = fx
            .service
            .create(new_blog(&fx.owner.id, "Hello"))
            .await
            .unwrap();

        let deleted = fx.service.delete(&blog.id).await.unwrap();
        assert_eq!(deleted.id, blog.id);

        assert!(matches!(
            fx.service.get_by_id(&blog.id).await,
            Err(BlogServiceError::NotFound(_))
        ));
        let owner = fx.users.get_by_id(&fx.owner.id).await.unwrap().unwrap();
        assert!(owner.blogs.is_empty());

        assert!(matches!(
            fx.service.delete(&blog.id).await,
            Err(BlogServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_by_owner_only_owned_blogs() {
        let fx = setup_test_service().await;
        let other = User::new("Grace".into(), "grace@example.com".into(), "hash".into());
        fx.users.create(&other).await.unwrap();

        fx.service.create(new_blog(&fx.owner.id, "Mine 1")).await.unwrap();
        fx.service.create(new_blog(&other.id, "Theirs")).await.unwrap();
        fx.service.create(new_blog(&fx.owner.id, "Mine 2")).await.unwrap();

        let view = fx.service.list_by_owner(&fx.owner.id).await.unwrap();
        let titles: Vec<_> = view.blogs.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Mine 1", "Mine 2"]);
        assert!(view.blogs.iter().all(|b| b.user_id == fx.owner.id));

        let missing = fx.service.list_by_owner(&crate::models::new_id()).await;
        assert!(matches!(missing, Err(BlogServiceError::NotFound(_))));
    }
}
