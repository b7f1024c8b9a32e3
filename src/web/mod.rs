//! Server-rendered quotes site.
//!
//! This module provides:
//! - Paginated quote listings, tag lookup and author pages
//! - Login-gated forms for adding quotes, authors and tags
//! - Registration, login and logout backed by a session cookie

pub mod error;
pub mod quotes;
pub mod session;
pub mod templates;
pub mod users;

use crate::auth::JwtService;
use crate::config::Config;
use crate::db::Repository;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Issuer stamped into session tokens.
pub const SESSION_ISSUER: &str = "quotes-site";

#[derive(Clone)]
pub struct SiteState {
    pub repo: Arc<Repository>,
    pub jwt: Arc<JwtService>,
}

impl SiteState {
    pub fn new(repo: Arc<Repository>, config: &Config) -> Self {
        let jwt = Arc::new(JwtService::new(
            &config.secret_key,
            SESSION_ISSUER.to_string(),
            config.access_token_ttl_minutes,
        ));
        Self { repo, jwt }
    }
}

pub fn create_router(state: SiteState) -> Router {
    Router::new()
        .route("/", get(quotes::home))
        .route("/:page", get(quotes::home_page))
        .route("/author/:author_id", get(quotes::author_about))
        .route("/tag/:id_or_name", get(quotes::find_tag))
        .route(
            "/quotes/add",
            get(quotes::add_quote_form).post(quotes::add_quote),
        )
        .route(
            "/authors/add",
            get(quotes::add_author_form).post(quotes::add_author),
        )
        .route("/tags/add", get(quotes::add_tag_form).post(quotes::add_tag))
        .route("/users/signup", get(users::signup_form).post(users::signup))
        .route("/users/login", get(users::login_form).post(users::login))
        .route("/users/logout", get(users::logout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
