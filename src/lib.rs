pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod seed;
pub mod web;

pub use config::{Config, SeedConfig};
pub use db::{init_db, Repository, Schema};
pub use domain::{Contact, ContactFields, Quote, Role, User, UserId};
pub use error::AppError;
