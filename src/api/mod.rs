//! API layer - HTTP handlers and routing
//!
//! - User API endpoints, mounted at `/api/v1/user`
//! - Blog API endpoints, mounted at `/api/v1/blog`
//!
//! Handlers only extract input, call a service and wrap the result in the
//! response envelope.

pub mod blogs;
pub mod error;
pub mod extract;
pub mod responses;
pub mod users;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::repositories::{SqlxBlogRepository, SqlxUserRepository};
use crate::db::DynDatabasePool;
use crate::services::{BlogService, UserService};

pub use error::ApiError;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub blog_service: Arc<BlogService>,
}

impl AppState {
    /// Wire repositories and services on top of a connection pool
    pub fn new(pool: DynDatabasePool) -> Self {
        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let blog_repo = SqlxBlogRepository::boxed(pool);

        Self {
            user_service: Arc::new(UserService::new(user_repo.clone())),
            blog_service: Arc::new(BlogService::new(blog_repo, user_repo)),
        }
    }
}

/// Build the API router (paths relative to `/api/v1`)
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .nest("/user", users::router())
        .nest("/blog", blogs::router())
}

/// Build the complete router with CORS and request tracing
///
/// # Errors
///
/// Returns an error if `cors_origin` is not a valid header value, or is the
/// `*` wildcard, which browsers refuse alongside credentials.
pub fn build_router(state: AppState, cors_origin: &str) -> Result<Router> {
    if cors_origin.trim() == "*" {
        anyhow::bail!("Wildcard CORS origin cannot be combined with credentials");
    }

    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Ok(Router::new()
        .nest("/api/v1", build_api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
