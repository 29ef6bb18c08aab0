//! Blog API endpoints
//!
//! - GET    /api/v1/blog/allblogs - List all blogs with owners
//! - POST   /api/v1/blog/createblog - Create a blog
//! - PUT    /api/v1/blog/updateblog/{id} - Partially update a blog
//! - GET    /api/v1/blog/getblog/{id} - Get a blog with its owner
//! - DELETE /api/v1/blog/deleteblog/{id} - Delete a blog
//! - GET    /api/v1/blog/userblogs/{id} - Get a user with their blogs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::extract::Payload;
use crate::api::responses::{BlogListResponse, BlogResponse, UserBlogsResponse};
use crate::api::AppState;
use crate::models::{Blog, BlogWithOwner, UpdateBlogInput};
use crate::services::NewBlog;

/// Request body for blog creation. `user` is the owner's ID.
#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub user: Option<String>,
}

impl From<CreateBlogRequest> for NewBlog {
    fn from(req: CreateBlogRequest) -> Self {
        Self {
            title: req.title.unwrap_or_default(),
            description: req.description.unwrap_or_default(),
            image: req.image.unwrap_or_default(),
            user: req.user.unwrap_or_default(),
        }
    }
}

/// Build the blog router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/allblogs", get(list_blogs))
        .route("/createblog", post(create_blog))
        .route("/updateblog/{id}", put(update_blog))
        .route("/getblog/{id}", get(get_blog))
        .route("/deleteblog/{id}", delete(delete_blog))
        .route("/userblogs/{id}", get(user_blogs))
}

/// GET /api/v1/blog/allblogs
async fn list_blogs(State(state): State<AppState>) -> Result<Json<BlogListResponse>, ApiError> {
    let blogs = state
        .blog_service
        .list_all()
        .await
        .map_err(|e| ApiError::from_blog_error(e, "Failed to get all blogs"))?;

    Ok(Json(BlogListResponse::new(blogs)))
}

/// POST /api/v1/blog/createblog
async fn create_blog(
    State(state): State<AppState>,
    Payload(req): Payload<CreateBlogRequest>,
) -> Result<(StatusCode, Json<BlogResponse<Blog>>), ApiError> {
    let blog = state
        .blog_service
        .create(req.into())
        .await
        .map_err(|e| ApiError::from_blog_error(e, "Failed to create blog"))?;

    Ok((
        StatusCode::CREATED,
        Json(BlogResponse::new("Blog created successfully", blog)),
    ))
}

/// PUT /api/v1/blog/updateblog/{id}
async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(input): Payload<UpdateBlogInput>,
) -> Result<Json<BlogResponse<Blog>>, ApiError> {
    let blog = state
        .blog_service
        .update(&id, input)
        .await
        .map_err(|e| ApiError::from_blog_error(e, "Failed to update blog"))?;

    Ok(Json(BlogResponse::new("Blog updated successfully", blog)))
}

/// GET /api/v1/blog/getblog/{id}
async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogResponse<BlogWithOwner>>, ApiError> {
    let blog = state
        .blog_service
        .get_by_id(&id)
        .await
        .map_err(|e| ApiError::from_blog_error(e, "Failed to get blog by ID"))?;

    Ok(Json(BlogResponse::new("Blog fetched successfully", blog)))
}

/// DELETE /api/v1/blog/deleteblog/{id}
async fn delete_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogResponse<Blog>>, ApiError> {
    let blog = state
        .blog_service
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_blog_error(e, "Failed to delete blog"))?;

    Ok(Json(BlogResponse::new("Blog deleted successfully", blog)))
}

/// GET /api/v1/blog/userblogs/{id}, also mounted at /api/v1/user/blogs/{id}
pub(super) async fn user_blogs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserBlogsResponse>, ApiError> {
    let user_blog = state
        .blog_service
        .list_by_owner(&id)
        .await
        .map_err(|e| ApiError::from_blog_error(e, "Error in fetching user blogs"))?;

    Ok(Json(UserBlogsResponse::new(user_blog)))
}
