//! User service
//!
//! Implements business logic for user management:
//! - Listing users
//! - Registration (email normalized and unique, password hashed)
//! - Login (credential check only, no session is issued)
//! - Lookup by ID

use crate::db::repositories::{DuplicateEmail, UserRepository};
use crate::models::{parse_id, User};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use std::sync::Arc;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (wrong password)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Requested user or email does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
}

impl UserService {
    /// Create a new user service with the given repository
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    /// List every user with their blog reference ids
    pub async fn list_users(&self) -> Result<Vec<User>, UserServiceError> {
        let users = self.user_repo.list().await.context("Failed to list users")?;
        Ok(users)
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// - `ValidationError` if a field is missing or the email is malformed
    /// - `UserExists` if the email is already registered
    /// - `InternalError` for database errors
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        let input = input.normalized();
        validate_register_input(&input)?;

        if self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(email_taken(&input.email));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(input.name, input.email, password_hash);

        // A concurrent registration can still win the race to the unique index.
        match self.user_repo.create(&user).await {
            Ok(created) => {
                tracing::info!("Registered user {}", created.id);
                Ok(created)
            }
            Err(e) => {
                if let Some(dup) = e.downcast_ref::<DuplicateEmail>() {
                    return Err(email_taken(&dup.0));
                }
                Err(e.into())
            }
        }
    }

    /// Check an email/password pair and return the matching user
    ///
    /// # Errors
    ///
    /// - `ValidationError` if either field is empty
    /// - `NotFound` if no user has this email
    /// - `AuthenticationError` if the password does not match
    pub async fn login(&self, input: LoginInput) -> Result<User, UserServiceError> {
        let email = normalize_email(&input.email);
        if email.is_empty() || input.password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "All fields are required".to_string(),
            ));
        }

        let user = self
            .user_repo
            .get_by_email(&email)
            .await
            .context("Failed to get user by email")?
            .ok_or_else(|| UserServiceError::NotFound("Email is not registered".to_string()))?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;

        if !password_valid {
            return Err(UserServiceError::AuthenticationError(
                "Invalid email or password".to_string(),
            ));
        }

        Ok(user)
    }

    /// Get user by ID
    ///
    /// The ID is validated before lookup; a malformed ID is a `ValidationError`.
    pub async fn get_by_id(&self, id: &str) -> Result<User, UserServiceError> {
        let id = parse_id(id)
            .ok_or_else(|| UserServiceError::ValidationError("Invalid user ID".to_string()))?;

        self.user_repo
            .get_by_id(&id)
            .await
            .context("Failed to get user by ID")?
            .ok_or_else(|| UserServiceError::NotFound("User not found".to_string()))
    }
}

fn email_taken(email: &str) -> UserServiceError {
    UserServiceError::UserExists(format!("Email '{}' is already registered", email))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_register_input(input: &RegisterInput) -> Result<(), UserServiceError> {
    if input.name.is_empty() || input.email.is_empty() || input.password.is_empty() {
        return Err(UserServiceError::ValidationError(
            "All fields are required".to_string(),
        ));
    }

    if !input.email.contains('@') {
        return Err(UserServiceError::ValidationError(
            "Invalid email format".to_string(),
        ));
    }

    Ok(())
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterInput {
    /// Create a new registration input
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Trim the name, trim and lowercase the email. The password is kept verbatim.
    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password,
        }
    }
}

/// Input for user login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    /// Create a new login input
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}
