//! User API endpoints
//!
//! - GET  /api/v1/user/allusers - List all users
//! - POST /api/v1/user/register - Register a user
//! - POST /api/v1/user/login - Check credentials
//! - GET  /api/v1/user/{id} - Get user by ID
//! - GET  /api/v1/user/blogs/{id} - Get a user with their blogs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::extract::Payload;
use crate::api::responses::{UserListResponse, UserResponse};
use crate::api::AppState;
use crate::services::{LoginInput, RegisterInput};

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Build the user router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/allusers", get(list_users))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/blogs/{id}", get(super::blogs::user_blogs))
        .route("/{id}", get(get_user))
}

/// GET /api/v1/user/allusers
async fn list_users(State(state): State<AppState>) -> Result<Json<UserListResponse>, ApiError> {
    let users = state
        .user_service
        .list_users()
        .await
        .map_err(|e| ApiError::from_user_error(e, "Failed to get all users"))?;

    Ok(Json(UserListResponse::new(users)))
}

/// POST /api/v1/user/register
async fn register(
    State(state): State<AppState>,
    Payload(req): Payload<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let input = RegisterInput::new(
        req.name.unwrap_or_default(),
        req.email.unwrap_or_default(),
        req.password.unwrap_or_default(),
    );

    let user = state
        .user_service
        .register(input)
        .await
        .map_err(|e| ApiError::from_user_error(e, "Failed to register user"))?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse::new("User registered successfully", user)),
    ))
}

/// POST /api/v1/user/login
async fn login(
    State(state): State<AppState>,
    Payload(req): Payload<LoginRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let input = LoginInput::new(
        req.email.unwrap_or_default(),
        req.password.unwrap_or_default(),
    );

    let user = state
        .user_service
        .login(input)
        .await
        .map_err(|e| ApiError::from_user_error(e, "Failed to login"))?;

    Ok(Json(UserResponse::new("Login successfully", user)))
}

/// GET /api/v1/user/{id}
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .get_by_id(&id)
        .await
        .map_err(|e| ApiError::from_user_error(e, "Failed to get user"))?;

    Ok(Json(UserResponse::new("User fetched successfully", user)))
}
