use axum::extract::State;
use axum::http::StatusCode;
use axum::{Form, Json};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::AppState;
use crate::auth::{hash_password, verify_password};
use crate::domain::forms::SignupRequest;
use crate::domain::{validate, NewUser, Role, User};
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id.as_i64(),
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

/// OAuth2 password-flow form; `username` carries the account email.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

pub async fn signup(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<SignupRequest>, AppError>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    validate(&body)?;

    if state.repo.get_user_by_email(&body.email).await?.is_some() {
        return Err(AppError::Conflict("Account already exists".to_string()));
    }

    let password = body.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = state
        .repo
        .create_user(&NewUser {
            username: body.username,
            email: body.email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Account already exists".to_string())
            }
            other => other.into(),
        })?;

    info!(user_id = %user.id, "Registered account");
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Form(form), _): WithRejection<Form<TokenRequest>, AppError>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = state
        .repo
        .get_user_by_email(&form.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email".to_string()))?;

    let stored_hash = user.password_hash.clone();
    let password = form.password;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !verified {
        warn!(user_id = %user.id, "Failed login attempt");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    let access_token = state
        .jwt
        .create_token(user.id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!(user_id = %user.id, "Issued access token");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
