use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::Form;
use tracing::{info, warn};

use super::error::SiteError;
use super::session::{clear_session, session_cookie, OptionalUser, LOGIN_PATH};
use super::templates::{FormFeedback, HtmlTemplate, LoginTemplate, Nav, SignupTemplate};
use super::SiteState;
use crate::auth::{hash_password, verify_password};
use crate::domain::forms::{LoginForm, RegisterForm};
use crate::domain::{validate, FieldError, NewUser, ValidationErrors};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

pub async fn signup_form(OptionalUser(user): OptionalUser) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    HtmlTemplate(SignupTemplate {
        nav: Nav::default(),
        feedback: FormFeedback::default(),
    })
    .into_response()
}

pub async fn signup(
    State(state): State<SiteState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, SiteError> {
    if let Err(ValidationErrors(errors)) = form.validate() {
        return Ok(signup_page(FormFeedback::incorrect(errors)));
    }

    if state
        .repo
        .get_user_by_username(form.username.trim())
        .await?
        .is_some()
    {
        return Ok(signup_page(FormFeedback::incorrect(vec![username_taken()])));
    }

    let password = form.password1.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| SiteError::Internal(e.to_string()))?
        .map_err(|e| SiteError::Internal(e.to_string()))?;

    let created = state
        .repo
        .create_user(&NewUser {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            password_hash,
        })
        .await;

    match created {
        Ok(user) => {
            info!(user_id = %user.id, "Registered site user");
            Ok(Redirect::to(LOGIN_PATH).into_response())
        }
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Ok(signup_page(FormFeedback::incorrect(vec![username_taken()])))
        }
        Err(e) => Err(e.into()),
    }
}

fn signup_page(feedback: FormFeedback) -> Response {
    HtmlTemplate(SignupTemplate {
        nav: Nav::default(),
        feedback,
    })
    .into_response()
}

fn username_taken() -> FieldError {
    FieldError {
        field: "username",
        message: USERNAME_TAKEN.to_string(),
    }
}

pub async fn login_form(OptionalUser(user): OptionalUser) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    login_page(FormFeedback::default())
}

pub async fn login(
    State(state): State<SiteState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, SiteError> {
    if let Err(ValidationErrors(errors)) = validate(&form) {
        return Ok(login_page(FormFeedback::incorrect(errors)));
    }

    let Some(user) = state.repo.get_user_by_username(form.username.trim()).await? else {
        return Ok(login_page(FormFeedback::message(
            "Username or password didn't match",
        )));
    };

    let stored_hash = user.password_hash.clone();
    let password = form.password;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| SiteError::Internal(e.to_string()))?;
    if !verified {
        warn!(user_id = %user.id, "Failed site login");
        return Ok(login_page(FormFeedback::message(
            "Username or password didn't match",
        )));
    }

    let token = state
        .jwt
        .create_token(user.id)
        .map_err(|e| SiteError::Internal(e.to_string()))?;

    info!(user_id = %user.id, "Site user logged in");
    Ok((jar.add(session_cookie(token)), Redirect::to("/")).into_response())
}

fn login_page(feedback: FormFeedback) -> Response {
    HtmlTemplate(LoginTemplate {
        nav: Nav::default(),
        feedback,
    })
    .into_response()
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (clear_session(jar), Redirect::to("/"))
}
