//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the queries for a specific entity.

pub mod blog;
pub mod user;

pub use blog::{BlogRepository, SqlxBlogRepository};
pub use user::{DuplicateEmail, SqlxUserRepository, UserRepository};
