//! User model
//!
//! A registered author. Each user keeps the ordered list of ids of the blogs
//! they own; the blog side points back through `Blog::user_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, Blog};

/// User entity
///
/// The password hash is never serialized, so every response that carries a
/// `User` is redacted the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Ids of the blogs this user owns, oldest first
    #[serde(default)]
    pub blogs: Vec<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh id and no blogs.
    ///
    /// The password must already be hashed, see `services::password::hash_password()`.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            name,
            email,
            password_hash,
            blogs: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A user with every referenced blog expanded inline
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithBlogs {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub blogs: Vec<Blog>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserWithBlogs {
    pub fn new(user: User, blogs: Vec<Blog>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            blogs,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::new(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "$argon2id$secret".to_string(),
        )
    }

    #[test]
    fn test_user_new() {
        let user = sample_user();

        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert!(user.blogs.is_empty());
        assert_eq!(user.created_at, user.updated_at);
        assert!(crate::models::parse_id(&user.id).is_some());
    }

    #[test]
    fn test_user_serialization_hides_password() {
        let user = sample_user();
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["_id"], user.id);
        assert_eq!(json["name"], "Ada");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2"));
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_user_with_blogs_hides_password() {
        let user = sample_user();
        let view = UserWithBlogs::new(user, Vec::new());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["blogs"], serde_json::json!([]));
        assert!(!json.to_string().contains("argon2"));
    }
}
