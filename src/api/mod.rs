pub mod auth;
pub mod contacts;
pub mod health;
pub mod middleware;
pub mod rate_limit;

use crate::auth::JwtService;
use crate::config::Config;
use crate::db::Repository;
use axum::extract::Request;
use axum::middleware::{from_fn, from_fn_with_state, Next};
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use self::middleware::{require_auth, require_roles, PRIVILEGED};
use self::rate_limit::{limited, LIST_LIMIT, ROUTE_LIMIT};

/// Issuer stamped into contacts API tokens.
pub const TOKEN_ISSUER: &str = "contacts-api";

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub jwt: Arc<JwtService>,
    pub config: Config,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        let jwt = Arc::new(JwtService::new(
            &config.secret_key,
            TOKEN_ISSUER.to_string(),
            config.access_token_ttl_minutes,
        ));
        Self { repo, jwt, config }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let limits_on = state.config.rate_limit_enabled;

    // Middleware layers run outermost first: auth, then role/rate checks, then the handler.
    let contacts = Router::new()
        .route(
            "/contacts/",
            limited(get(contacts::list_contacts), LIST_LIMIT, limits_on),
        )
        .route(
            "/contacts/",
            limited(post(contacts::create_contact), ROUTE_LIMIT, limits_on),
        )
        .route(
            "/contacts/all",
            get(contacts::list_all_contacts).route_layer(from_fn(
                |request: Request, next: Next| require_roles(PRIVILEGED, request, next),
            )),
        )
        .route(
            "/contacts/search/",
            limited(get(contacts::search_contacts), ROUTE_LIMIT, limits_on),
        )
        .route(
            "/contacts/birthday_date/",
            limited(get(contacts::upcoming_birthdays), ROUTE_LIMIT, limits_on),
        )
        .route(
            "/contacts/:contact_id",
            limited(get(contacts::get_contact), ROUTE_LIMIT, limits_on),
        )
        .route(
            "/contacts/:contact_id",
            limited(put(contacts::update_contact), ROUTE_LIMIT, limits_on),
        )
        .route(
            "/contacts/:contact_id",
            limited(delete(contacts::delete_contact), ROUTE_LIMIT, limits_on),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .merge(contacts)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
