//! Success response envelopes
//!
//! Every successful response carries `success: true`, a human-readable
//! `message`, and one named payload field.

use serde::Serialize;

use crate::models::{BlogWithOwner, User, UserWithBlogs};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub success: bool,
    pub message: &'static str,
    pub user_count: usize,
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListResponse {
    pub success: bool,
    pub message: &'static str,
    pub blog_count: usize,
    pub blogs: Vec<BlogWithOwner>,
}

/// Single blog; `B` is `Blog` or `BlogWithOwner` depending on the endpoint
#[derive(Debug, Serialize)]
pub struct BlogResponse<B> {
    pub success: bool,
    pub message: &'static str,
    pub blog: B,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBlogsResponse {
    pub success: bool,
    pub message: &'static str,
    pub user_blog: UserWithBlogs,
}

impl UserListResponse {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            success: true,
            message: "All users list",
            user_count: users.len(),
            users,
        }
    }
}

impl UserResponse {
    pub fn new(message: &'static str, user: User) -> Self {
        Self {
            success: true,
            message,
            user,
        }
    }
}

impl BlogListResponse {
    pub fn new(blogs: Vec<BlogWithOwner>) -> Self {
        let message = if blogs.is_empty() {
            "No blogs found"
        } else {
            "All blogs list"
        };
        Self {
            success: true,
            message,
            blog_count: blogs.len(),
            blogs,
        }
    }
}

impl<B> BlogResponse<B> {
    pub fn new(message: &'static str, blog: B) -> Self {
        Self {
            success: true,
            message,
            blog,
        }
    }
}

impl UserBlogsResponse {
    pub fn new(user_blog: UserWithBlogs) -> Self {
        Self {
            success: true,
            message: "User blogs fetched successfully",
            user_blog,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_blog_list_envelope() {
        let json = serde_json::to_value(BlogListResponse::new(Vec::new())).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "message": "No blogs found",
                "blogCount": 0,
                "blogs": []
            })
        );
    }

    #[test]
    fn test_user_list_envelope_counts_and_redacts() {
        let user = User::new("Ada".into(), "ada@example.com".into(), "$argon2id$x".into());
        let json = serde_json::to_value(UserListResponse::new(vec![user])).unwrap();

        assert_eq!(json["userCount"], 1);
        assert_eq!(json["message"], "All users list");
        assert!(!json.to_string().contains("argon2"));
    }
}
