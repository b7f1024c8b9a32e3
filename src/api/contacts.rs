use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use axum_extra::extract::WithRejection;
use chrono::Local;
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::domain::{validate, Contact, ContactFields, User, ValidationErrors};
use crate::error::AppError;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MIN_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    /// Checked `(limit, offset)`; limit must lie in `[10, 500]`, offset must not be negative.
    pub fn resolve(&self) -> Result<(i64, i64), ValidationErrors> {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            return Err(ValidationErrors::single(
                "limit",
                format!(
                    "Ensure this value is between {} and {}.",
                    MIN_LIMIT, MAX_LIMIT
                ),
            ));
        }

        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ValidationErrors::single(
                "offset",
                "Ensure this value is greater than or equal to 0.",
            ));
        }

        Ok((limit, offset))
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

fn check_contact_id(contact_id: i64) -> Result<i64, ValidationErrors> {
    if contact_id < 1 {
        return Err(ValidationErrors::single(
            "contact_id",
            "Ensure this value is greater than or equal to 1.",
        ));
    }
    Ok(contact_id)
}

pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    WithRejection(Query(page), _): WithRejection<Query<PageQuery>, AppError>,
) -> Result<Json<Vec<Contact>>, AppError> {
    let (limit, offset) = page.resolve()?;
    let contacts = state.repo.list_contacts(user.id, limit, offset).await?;
    Ok(Json(contacts))
}

/// Every owner's contacts. Reachable only through the role gate.
pub async fn list_all_contacts(
    State(state): State<AppState>,
    WithRejection(Query(page), _): WithRejection<Query<PageQuery>, AppError>,
) -> Result<Json<Vec<Contact>>, AppError> {
    let (limit, offset) = page.resolve()?;
    let contacts = state.repo.list_all_contacts(limit, offset).await?;
    Ok(Json(contacts))
}

pub async fn get_contact(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    WithRejection(Path(contact_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Contact>, AppError> {
    let contact_id = check_contact_id(contact_id)?;
    state
        .repo
        .get_contact(contact_id, user.id)
        .await?
        .map(Json)
        .ok_or_else(AppError::record_not_found)
}

pub async fn create_contact(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    WithRejection(Json(body), _): WithRejection<Json<ContactFields>, AppError>,
) -> Result<(StatusCode, Json<Contact>), AppError> {
    validate(&body)?;
    let contact = state.repo.create_contact(&body, user.id).await?;
    info!(contact_id = contact.id, user_id = %user.id, "Created contact");
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn update_contact(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    WithRejection(Path(contact_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(body), _): WithRejection<Json<ContactFields>, AppError>,
) -> Result<Json<Contact>, AppError> {
    let contact_id = check_contact_id(contact_id)?;
    validate(&body)?;
    let contact = state
        .repo
        .update_contact(contact_id, &body, user.id)
        .await?
        .ok_or_else(AppError::record_not_found)?;
    info!(contact_id, user_id = %user.id, "Updated contact");
    Ok(Json(contact))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    WithRejection(Path(contact_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    let contact_id = check_contact_id(contact_id)?;
    state
        .repo
        .delete_contact(contact_id, user.id)
        .await?
        .ok_or_else(AppError::record_not_found)?;
    info!(contact_id, user_id = %user.id, "Deleted contact");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    WithRejection(Query(params), _): WithRejection<Query<SearchQuery>, AppError>,
) -> Result<Json<Vec<Contact>>, AppError> {
    let query = params
        .query
        .ok_or_else(|| ValidationErrors::single("query", "This field is required."))?;
    let contacts = state.repo.search_contacts(&query, user.id).await?;
    Ok(Json(contacts))
}

/// Contacts whose stored birthday falls within the next seven days.
pub async fn upcoming_birthdays(
    State(state): State<AppState>,
    Extension(_user): Extension<User>,
) -> Result<Json<Vec<Contact>>, AppError> {
    let today = Local::now().date_naive();
    let contacts = state.repo.upcoming_birthdays(today).await?;
    Ok(Json(contacts))
}
