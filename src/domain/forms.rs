//! Submitted forms and their field constraints.
//!
//! Fields default to empty so a missing input is reported by [`validate`]
//! as "required" instead of failing deserialization.

use serde::Deserialize;

use crate::domain::validation::{validate, FieldError, FieldRule, FormSchema, ValidationErrors};

const USERNAME: FieldRule = FieldRule::text("username").required().max_len(30);
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 20;

/// Site registration form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

impl FormSchema for RegisterForm {
    const RULES: &'static [FieldRule] = &[
        USERNAME,
        FieldRule::email("email").required().max_len(50),
        FieldRule::text("password1")
            .required()
            .min_len(PASSWORD_MIN)
            .max_len(PASSWORD_MAX),
        FieldRule::text("password2")
            .required()
            .min_len(PASSWORD_MIN)
            .max_len(PASSWORD_MAX),
    ];

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "username" => Some(&self.username),
            "email" => Some(&self.email),
            "password1" => Some(&self.password1),
            "password2" => Some(&self.password2),
            _ => None,
        }
    }
}

impl RegisterForm {
    /// Field rules plus the password confirmation check.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate(self)?;
        if self.password1 != self.password2 {
            return Err(ValidationErrors::single(
                "password2",
                "The two password fields didn't match.",
            ));
        }
        Ok(())
    }
}

/// Site login form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl FormSchema for LoginForm {
    const RULES: &'static [FieldRule] = &[
        USERNAME,
        FieldRule::text("password")
            .required()
            .min_len(PASSWORD_MIN)
            .max_len(PASSWORD_MAX),
    ];

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "username" => Some(&self.username),
            "password" => Some(&self.password),
            _ => None,
        }
    }
}

/// JSON signup body of the contacts API.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl FormSchema for SignupRequest {
    const RULES: &'static [FieldRule] = &[
        USERNAME,
        FieldRule::email("email").required().max_len(50),
        FieldRule::text("password")
            .required()
            .min_len(PASSWORD_MIN)
            .max_len(PASSWORD_MAX),
    ];

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "username" => Some(&self.username),
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthorForm {
    pub fullname: String,
    pub born_date: String,
    pub born_location: String,
    pub description: String,
}

impl FormSchema for AuthorForm {
    const RULES: &'static [FieldRule] = &[
        FieldRule::text("fullname").required().max_len(50),
        FieldRule::text("born_date").required().max_len(50),
        FieldRule::text("born_location").required().max_len(150),
        FieldRule::text("description").required(),
    ];

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "fullname" => Some(&self.fullname),
            "born_date" => Some(&self.born_date),
            "born_location" => Some(&self.born_location),
            "description" => Some(&self.description),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagForm {
    pub name: String,
}

impl FormSchema for TagForm {
    const RULES: &'static [FieldRule] = &[FieldRule::text("name").required().max_len(25)];

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            _ => None,
        }
    }
}

/// Quote creation form; `tags` may repeat.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuoteForm {
    pub quote: String,
    pub author: String,
    pub tags: Vec<String>,
}

impl FormSchema for QuoteForm {
    const RULES: &'static [FieldRule] = &[
        FieldRule::text("quote").required().max_len(2000),
        FieldRule::text("author").required(),
    ];

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "quote" => Some(&self.quote),
            "author" => Some(&self.author),
            _ => None,
        }
    }
}

/// Author and tag ids picked on a [`QuoteForm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteChoices {
    pub author_id: i64,
    pub tag_ids: Vec<i64>,
}

impl QuoteForm {
    /// Field rules plus numeric author and tag ids.
    pub fn validate(&self) -> Result<QuoteChoices, ValidationErrors> {
        validate(self)?;

        let author_id = self.author.trim().parse::<i64>();
        let tag_ids = self
            .tags
            .iter()
            .map(|tag| tag.trim().parse::<i64>())
            .collect::<Result<Vec<_>, _>>();

        let mut errors = Vec::new();
        if author_id.is_err() {
            errors.push(invalid_choice("author"));
        }
        if tag_ids.is_err() {
            errors.push(invalid_choice("tags"));
        }

        match (author_id, tag_ids) {
            (Ok(author_id), Ok(tag_ids)) => Ok(QuoteChoices { author_id, tag_ids }),
            _ => Err(ValidationErrors(errors)),
        }
    }
}

/// The error for a select value that names no known option.
pub fn invalid_choice(field: &'static str) -> FieldError {
    FieldError {
        field,
        message: "Select a valid choice.".to_string(),
    }
}
