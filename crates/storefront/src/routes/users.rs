//! User route handlers.
//!
//! Responses use [`UserResponse`], which has no password field.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use bazaar_core::{User, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{Result, set_sentry_user};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(index))
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/{id}", get(show).put(update))
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Update request body. An omitted password keeps the current one.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
}

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Register a new user.
///
/// # Errors
///
/// 400 if email or password is empty, 409 if the email is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let user = AuthService::new(state.users())
        .register(&body.name, &body.email, &body.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Check credentials and return the user.
///
/// # Errors
///
/// 401 for an unknown email or wrong password, without saying which.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<UserResponse>> {
    let user = AuthService::new(state.users())
        .login(&body.email, &body.password)
        .await?;

    set_sentry_user(&user.id, Some(&user.email));
    Ok(Json(user.into()))
}

/// List all users.
///
/// # Errors
///
/// Returns an error if the repository fails.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>> {
    let users = state.users().list_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Show a single user.
///
/// # Errors
///
/// 404 if the user does not exist.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>> {
    let user = state.users().get_by_id(id).await?;
    Ok(Json(user.into()))
}

/// Replace a user's name and email, and optionally password.
///
/// # Errors
///
/// 404 if the user does not exist, 409 if the email belongs to someone else.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    let mut user = state.users().get_by_id(id).await?;
    user.name = body.name;
    user.email = body.email;
    if let Some(password) = body.password {
        user.password = password;
    }

    let user = state.users().update(user).await?;
    Ok(Json(user.into()))
}
