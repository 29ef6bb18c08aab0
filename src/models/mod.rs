//! Data models
//!
//! Entities stored by the persistence layer (`User`, `Blog`), the populated
//! views returned by the API, and the input types accepted by the services.
//!
//! Serialized field names follow the document-store conventions the web
//! client expects: `_id` for identifiers and camelCase timestamps.

mod blog;
mod id;
mod user;

pub use blog::{Blog, BlogWithOwner, CreateBlogInput, UpdateBlogInput};
pub use id::{new_id, parse_id};
pub use user::{User, UserWithBlogs};
