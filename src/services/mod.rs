//! Services layer - Business logic
//!
//! Services validate input, enforce the user/blog ownership rules and
//! coordinate the repositories. They hold no state of their own.

pub mod blog;
pub mod password;
pub mod user;

pub use blog::{BlogService, BlogServiceError, NewBlog};
pub use password::{hash_password, verify_password};
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
