//! Blog model
//!
//! A single post. Every blog belongs to exactly one user, referenced by
//! `user_id` and serialized as `user`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, User};

/// Blog entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    /// Unique identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Title (trimmed)
    pub title: String,
    /// Body text
    pub description: String,
    /// Cover image URL
    pub image: String,
    /// Owning user id
    #[serde(rename = "user")]
    pub user_id: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Blog {
    /// Create a new blog with a fresh id from validated input
    pub fn new(input: CreateBlogInput) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            title: input.title,
            description: input.description,
            image: input.image,
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A blog with its owner embedded in place of the owner id
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogWithOwner {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    /// The owner, `null` if the reference no longer resolves
    pub user: Option<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogWithOwner {
    pub fn new(blog: Blog, owner: Option<User>) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            description: blog.description,
            image: blog.image,
            user: owner,
            created_at: blog.created_at,
            updated_at: blog.updated_at,
        }
    }
}

/// Validated input for creating a blog
#[derive(Debug, Clone)]
pub struct CreateBlogInput {
    pub title: String,
    pub description: String,
    pub image: String,
    /// Owner id in stored (normalized) form
    pub user_id: String,
}

/// Partial update for a blog. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBlogInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blog() -> Blog {
        Blog::new(CreateBlogInput {
            title: "Hello".to_string(),
            description: "First post".to_string(),
            image: "https://img.example.com/1.png".to_string(),
            user_id: "owner".to_string(),
        })
    }

    #[test]
    fn test_blog_new() {
        let blog = sample_blog();

        assert_eq!(blog.title, "Hello");
        assert_eq!(blog.user_id, "owner");
        assert_eq!(blog.created_at, blog.updated_at);
        assert_eq!(blog.id.len(), 36);
    }

    #[test]
    fn test_blog_serializes_owner_as_user() {
        let json = serde_json::to_value(sample_blog()).unwrap();

        assert_eq!(json["user"], "owner");
        assert!(json.get("user_id").is_none());
        assert!(json.get("_id").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn test_update_input_from_json_distinguishes_absent_fields() {
        let update: UpdateBlogInput =
            serde_json::from_str(r#"{"title":"T","description":null}"#).unwrap();

        assert_eq!(update.title.as_deref(), Some("T"));
        assert!(update.description.is_none());
        assert!(update.image.is_none());
    }

    #[test]
    fn test_blog_with_owner_embeds_user() {
        let owner = User::new("Ada".into(), "ada@example.com".into(), "hash".into());
        let mut blog = sample_blog();
        blog.user_id = owner.id.clone();

        let json = serde_json::to_value(BlogWithOwner::new(blog, Some(owner.clone()))).unwrap();

        assert_eq!(json["user"]["_id"], owner.id);
        assert_eq!(json["user"]["email"], "ada@example.com");
        assert!(json["user"].get("passwordHash").is_none());
    }
}
