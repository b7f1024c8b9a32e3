use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use super::templates::ErrorTemplate;

/// Error returned by the quotes site handlers, rendered as an HTML page.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Page not found")]
    NotFound,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for SiteError {
    fn from(err: sqlx::Error) -> Self {
        SiteError::Internal(err.to_string())
    }
}

impl From<askama::Error> for SiteError {
    fn from(err: askama::Error) -> Self {
        SiteError::Internal(format!("Failed to render template: {}", err))
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            SiteError::NotFound => (StatusCode::NOT_FOUND, "Page not found".to_string()),
            SiteError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error while rendering page");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                )
            }
        };

        let page = ErrorTemplate {
            status_code: status.as_u16(),
            message,
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => (status, format!("Failed to render template: {err}")).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_not_found_renders_html_page() {
        let response = SiteError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("404"));
        assert!(html.contains("Page not found"));
    }

    #[tokio::test]
    async fn test_internal_hides_detail() {
        let response = SiteError::Internal("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!html.contains("disk on fire"));
    }
}
