//! Authentication and role gating for the contacts routes.

use axum::extract::{Request, State};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use super::AppState;
use crate::domain::{Role, User};
use crate::error::AppError;

/// Roles allowed to read every owner's contacts.
pub const PRIVILEGED: RoleAccess = RoleAccess::new(&[Role::Admin, Role::Moderator]);

/// Resolve the bearer token into a [`User`] and attach it to the request.
///
/// Rejects with 401 when the token is missing, invalid, expired, or names a
/// user that no longer exists.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let claims = state.jwt.verify_token(token).map_err(|e| {
        debug!(error = %e, "Rejected access token");
        AppError::Unauthorized("Could not validate credentials".to_string())
    })?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))?;

    let user = state
        .repo
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))?;

    debug!(user_id = %user.id, role = %user.role, "Authenticated request");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// The token of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// A set of roles permitted through [`require_roles`].
#[derive(Debug, Clone, Copy)]
pub struct RoleAccess {
    allowed: &'static [Role],
}

impl RoleAccess {
    pub const fn new(allowed: &'static [Role]) -> Self {
        RoleAccess { allowed }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }
}

/// Let the request through only if the authenticated user holds an allowed role.
///
/// Must run after [`require_auth`].
pub async fn require_roles(
    access: RoleAccess,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<User>()
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    if !access.permits(user.role) {
        debug!(user_id = %user.id, role = %user.role, "Role not permitted");
        return Err(AppError::Forbidden("Operation not permitted".to_string()));
    }

    Ok(next.run(request).await)
}
