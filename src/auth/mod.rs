//! Credentials shared by both applications: password hashing and access tokens.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtService};
pub use password::{hash_password, verify_password};
