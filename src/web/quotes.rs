use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::Form;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::info;

use super::error::SiteError;
use super::session::{LoginRequired, OptionalUser};
use super::templates::{
    AddAuthorTemplate, AddQuoteTemplate, AddTagTemplate, AuthorTemplate, FindTagTemplate,
    FormFeedback, HtmlTemplate, IndexTemplate, Nav,
};
use super::SiteState;
use crate::domain::forms::{invalid_choice, AuthorForm, QuoteChoices, QuoteForm, TagForm};
use crate::domain::{
    validate, FieldError, NewAuthor, NewQuote, Paginator, TagLookup, ValidationErrors,
};

pub const QUOTES_PER_PAGE: u64 = 10;
pub const TOP_TAGS: i64 = 10;

pub async fn home(
    State(state): State<SiteState>,
    OptionalUser(user): OptionalUser,
) -> Result<HtmlTemplate<IndexTemplate>, SiteError> {
    render_home(&state, Nav::for_user(user.as_ref()), 1).await
}

/// `/{page}`: strict paging, anything outside `1..=num_pages` is a 404.
pub async fn home_page(
    State(state): State<SiteState>,
    OptionalUser(user): OptionalUser,
    Path(page): Path<String>,
) -> Result<HtmlTemplate<IndexTemplate>, SiteError> {
    let number = page.parse::<u64>().map_err(|_| SiteError::NotFound)?;
    render_home(&state, Nav::for_user(user.as_ref()), number).await
}

async fn render_home(
    state: &SiteState,
    nav: Nav,
    number: u64,
) -> Result<HtmlTemplate<IndexTemplate>, SiteError> {
    let total = state.repo.count_quotes().await?;
    let page = Paginator::new(total.max(0) as u64, QUOTES_PER_PAGE)
        .page(number)
        .ok_or(SiteError::NotFound)?;

    let quotes = state
        .repo
        .list_quotes(page.limit as i64, page.offset as i64)
        .await?;
    let top_tags = state.repo.top_tags(TOP_TAGS).await?;

    Ok(HtmlTemplate(IndexTemplate {
        nav,
        quotes,
        top_tags,
        page,
    }))
}

pub async fn author_about(
    State(state): State<SiteState>,
    OptionalUser(user): OptionalUser,
    Path(author_id): Path<String>,
) -> Result<HtmlTemplate<AuthorTemplate>, SiteError> {
    let author_id = author_id.parse::<i64>().map_err(|_| SiteError::NotFound)?;
    let author = state
        .repo
        .get_author(author_id)
        .await?
        .ok_or(SiteError::NotFound)?;

    Ok(HtmlTemplate(AuthorTemplate {
        nav: Nav::for_user(user.as_ref()),
        author,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TagPageQuery {
    pub page: Option<String>,
}

/// `/tag/{id_or_name}`: lenient paging; an unknown tag lists nothing.
pub async fn find_tag(
    State(state): State<SiteState>,
    OptionalUser(user): OptionalUser,
    Path(segment): Path<String>,
    Query(params): Query<TagPageQuery>,
) -> Result<HtmlTemplate<FindTagTemplate>, SiteError> {
    let lookup = TagLookup::parse(&segment);
    let tag = state.repo.find_tag(&lookup).await?;

    let (tag_id, tag_name, quotes, page) = match tag {
        Some(tag) => {
            let total = state.repo.count_quotes_with_tag(tag.id).await?;
            let page = Paginator::new(total.max(0) as u64, QUOTES_PER_PAGE)
                .get_page(params.page.as_deref());
            let quotes = state
                .repo
                .list_quotes_with_tag(tag.id, page.limit as i64, page.offset as i64)
                .await?;
            (Some(tag.id), tag.name, quotes, page)
        }
        None => {
            let page = Paginator::new(0, QUOTES_PER_PAGE).get_page(params.page.as_deref());
            (None, lookup.to_string(), Vec::new(), page)
        }
    };

    let top_tags = state.repo.top_tags(TOP_TAGS).await?;

    Ok(HtmlTemplate(FindTagTemplate {
        nav: Nav::for_user(user.as_ref()),
        tag_name,
        tag_id,
        quotes,
        top_tags,
        page,
    }))
}

// =============================================================================
// Create forms
// =============================================================================

pub async fn add_quote_form(
    State(state): State<SiteState>,
    LoginRequired(user): LoginRequired,
) -> Result<Response, SiteError> {
    render_add_quote(&state, Nav::for_user(Some(&user)), FormFeedback::default()).await
}

pub async fn add_quote(
    State(state): State<SiteState>,
    LoginRequired(user): LoginRequired,
    Form(form): Form<QuoteForm>,
) -> Result<Response, SiteError> {
    let nav = Nav::for_user(Some(&user));

    let QuoteChoices { author_id, tag_ids } = match form.validate() {
        Ok(choices) => choices,
        Err(errors) => return render_add_quote(&state, nav, FormFeedback::incorrect(errors.0)).await,
    };

    let mut errors = Vec::new();
    if state.repo.get_author(author_id).await?.is_none() {
        errors.push(invalid_choice("author"));
    }
    let known_tags: HashSet<i64> = state
        .repo
        .list_tags()
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();
    if tag_ids.iter().any(|id| !known_tags.contains(id)) {
        errors.push(invalid_choice("tags"));
    }
    if !errors.is_empty() {
        return render_add_quote(&state, nav, FormFeedback::incorrect(errors)).await;
    }

    let quote_id = state
        .repo
        .create_quote(&NewQuote {
            quote: form.quote.trim().to_string(),
            author_id,
            tag_ids,
        })
        .await?;

    info!(quote_id, user_id = %user.id, "Added quote");
    Ok(Redirect::to("/").into_response())
}

async fn render_add_quote(
    state: &SiteState,
    nav: Nav,
    feedback: FormFeedback,
) -> Result<Response, SiteError> {
    let authors = state.repo.list_authors().await?;
    let tags = state.repo.list_tags().await?;
    Ok(HtmlTemplate(AddQuoteTemplate {
        nav,
        authors,
        tags,
        feedback,
    })
    .into_response())
}

pub async fn add_author_form(LoginRequired(user): LoginRequired) -> HtmlTemplate<AddAuthorTemplate> {
    HtmlTemplate(AddAuthorTemplate {
        nav: Nav::for_user(Some(&user)),
        feedback: FormFeedback::default(),
    })
}

pub async fn add_author(
    State(state): State<SiteState>,
    LoginRequired(user): LoginRequired,
    Form(form): Form<AuthorForm>,
) -> Result<Response, SiteError> {
    if let Err(ValidationErrors(errors)) = validate(&form) {
        return Ok(HtmlTemplate(AddAuthorTemplate {
            nav: Nav::for_user(Some(&user)),
            feedback: FormFeedback::incorrect(errors),
        })
        .into_response());
    }

    let author = state
        .repo
        .create_author(&NewAuthor {
            fullname: form.fullname.trim().to_string(),
            born_date: form.born_date.trim().to_string(),
            born_location: form.born_location.trim().to_string(),
            description: form.description.trim().to_string(),
        })
        .await?;

    info!(author_id = author.id, user_id = %user.id, "Added author");
    Ok(Redirect::to("/").into_response())
}

pub async fn add_tag_form(LoginRequired(user): LoginRequired) -> HtmlTemplate<AddTagTemplate> {
    HtmlTemplate(AddTagTemplate {
        nav: Nav::for_user(Some(&user)),
        feedback: FormFeedback::default(),
    })
}

pub async fn add_tag(
    State(state): State<SiteState>,
    LoginRequired(user): LoginRequired,
    Form(form): Form<TagForm>,
) -> Result<Response, SiteError> {
    let nav = Nav::for_user(Some(&user));

    if let Err(ValidationErrors(errors)) = validate(&form) {
        return Ok(HtmlTemplate(AddTagTemplate {
            nav,
            feedback: FormFeedback::incorrect(errors),
        })
        .into_response());
    }

    match state.repo.create_tag(form.name.trim()).await? {
        Some(tag) => {
            info!(tag_id = tag.id, user_id = %user.id, "Added tag");
            Ok(Redirect::to("/").into_response())
        }
        None => Ok(HtmlTemplate(AddTagTemplate {
            nav,
            feedback: FormFeedback::incorrect(vec![FieldError {
                field: "name",
                message: "Tag with this Name already exists.".to_string(),
            }]),
        })
        .into_response()),
    }
}
