//! Domain types shared by the contacts API, the quotes site and the seeder.
//!
//! This module provides:
//! - Users, roles and contacts
//! - Authors, quotes, tags and tag lookup
//! - Declarative field validation and the forms built on it
//! - Page arithmetic for listings

pub mod contact;
pub mod forms;
pub mod pagination;
pub mod quote;
pub mod user;
pub mod validation;

pub use contact::{upcoming_birthday_window, Contact, ContactFields};
pub use pagination::{PageWindow, Paginator};
pub use quote::{Author, NewAuthor, NewQuote, Quote, Tag, TagCount, TagLookup};
pub use user::{NewUser, Role, User, UserId};
pub use validation::{validate, FieldError, FieldRule, FormSchema, ValidationErrors};
