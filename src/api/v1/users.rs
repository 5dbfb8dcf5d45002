//! User registration and profile handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::api::validation::{optional_text, require_text, validate_email};
use crate::api::{ApiError, AppState, CurrentUser, ErrorResponse, Validate, ValidatedJson};
use crate::db::{Database, User, UserRepository};

const MAX_NAME_LEN: usize = 100;
const MAX_BIO_LEN: usize = 1000;
const MAX_NICHE_LEN: usize = 100;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "a1b2c3d4")]
    pub id: String,
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[schema(example = "Ana Ribeiro")]
    pub display_name: String,
    pub bio: Option<String>,
    #[schema(example = "travel")]
    pub niche: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            display_name: u.display_name,
            bio: u.bio,
            niche: u.niche,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[schema(example = "Ana Ribeiro")]
    pub display_name: String,
    pub bio: Option<String>,
    pub niche: Option<String>,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_email(&self.email)?;
        require_text("display_name", &self.display_name, MAX_NAME_LEN)?;
        optional_text("bio", self.bio.as_deref(), MAX_BIO_LEN)?;
        optional_text("niche", self.niche.as_deref(), MAX_NICHE_LEN)
    }
}

/// Partial profile update
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub niche: Option<String>,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.display_name {
            require_text("display_name", name, MAX_NAME_LEN)?;
        }
        optional_text("bio", self.bio.as_deref(), MAX_BIO_LEN)?;
        optional_text("niche", self.niche.as_deref(), MAX_NICHE_LEN)
    }
}

impl UpdateProfileRequest {
    fn merge_into(self, target: &mut User) {
        if let Some(display_name) = self.display_name {
            target.display_name = display_name.trim().to_string();
        }
        if let Some(bio) = self.bio {
            target.bio = Some(bio);
        }
        if let Some(niche) = self.niche {
            target.niche = Some(niche);
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_user<D: Database>(
    State(state): State<AppState<D>>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let email = req.email.trim().to_string();

    if state.db().users().get_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "a user with email '{}' already exists",
            email
        )));
    }

    let user = User {
        id: String::new(),
        email,
        display_name: req.display_name.trim().to_string(),
        bio: req.bio,
        niche: req.niche,
        created_at: String::new(),
        updated_at: String::new(),
    };

    let created = state.db().users().create(&user).await?;
    info!(user_id = %created.id, "user registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

/// Get a user's profile
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Unknown caller", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user<D: Database>(
    State(state): State<AppState<D>>,
    _caller: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.db().users().get(&id).await?;

    Ok(Json(UserResponse::from(user)))
}

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "users",
    responses(
        (status = 200, description = "Caller profile", body = UserResponse),
        (status = 401, description = "Unknown caller", body = ErrorResponse)
    )
)]
#[instrument(skip(_state))]
pub async fn get_me<D: Database>(
    State(_state): State<AppState<D>>,
    CurrentUser(user): CurrentUser,
) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Update the caller's profile
///
/// Updates only the fields provided in the request (PATCH semantics).
#[utoipa::path(
    patch,
    path = "/api/v1/me",
    tag = "users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unknown caller", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_me<D: Database>(
    State(state): State<AppState<D>>,
    CurrentUser(mut user): CurrentUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    req.merge_into(&mut user);
    state.db().users().update(&user).await?;

    let updated = state.db().users().get(&user.id).await?;
    Ok(Json(UserResponse::from(updated)))
}
