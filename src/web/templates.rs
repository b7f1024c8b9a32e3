//! Askama page templates for the quotes site.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::domain::{Author, FieldError, PageWindow, Quote, Tag, TagCount, User};

/// Template wrapper that converts Askama templates into HTML responses.
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "Failed to render template");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to render template: {err}"),
                )
                    .into_response()
            }
        }
    }
}

/// Navigation bar state: who is logged in, if anyone.
#[derive(Debug, Clone, Default)]
pub struct Nav {
    username: Option<String>,
}

impl Nav {
    pub fn for_user(user: Option<&User>) -> Self {
        Nav {
            username: user.map(|u| u.username.clone()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or("")
    }
}

/// Outcome of a rejected form submission.
#[derive(Debug, Clone, Default)]
pub struct FormFeedback {
    pub message: Option<String>,
    pub errors: Vec<FieldError>,
}

impl FormFeedback {
    pub fn incorrect(errors: Vec<FieldError>) -> Self {
        FormFeedback {
            message: Some("Incorrect form".to_string()),
            errors,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        FormFeedback {
            message: Some(message.into()),
            errors: Vec::new(),
        }
    }

    pub fn has_message(&self) -> bool {
        self.message.is_some()
    }

    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub nav: Nav,
    pub quotes: Vec<Quote>,
    pub top_tags: Vec<TagCount>,
    pub page: PageWindow,
}

#[derive(Template)]
#[template(path = "find_tag.html")]
pub struct FindTagTemplate {
    pub nav: Nav,
    pub tag_name: String,
    /// Links on the page point here; `None` for a tag that does not exist.
    pub tag_id: Option<i64>,
    pub quotes: Vec<Quote>,
    pub top_tags: Vec<TagCount>,
    pub page: PageWindow,
}

#[derive(Template)]
#[template(path = "author.html")]
pub struct AuthorTemplate {
    pub nav: Nav,
    pub author: Author,
}

#[derive(Template)]
#[template(path = "add_quote.html")]
pub struct AddQuoteTemplate {
    pub nav: Nav,
    pub authors: Vec<Author>,
    pub tags: Vec<Tag>,
    pub feedback: FormFeedback,
}

#[derive(Template)]
#[template(path = "add_author.html")]
pub struct AddAuthorTemplate {
    pub nav: Nav,
    pub feedback: FormFeedback,
}

#[derive(Template)]
#[template(path = "add_tag.html")]
pub struct AddTagTemplate {
    pub nav: Nav,
    pub feedback: FormFeedback,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub nav: Nav,
    pub feedback: FormFeedback,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub feedback: FormFeedback,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status_code: u16,
    pub message: String,
}
