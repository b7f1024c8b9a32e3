//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `users.rs` - Account registration and lookup (both applications)
//! - `contacts.rs` - Owner-scoped contact queries
//! - `quotes.rs` - Authors, quotes, tags and tag ranking

mod contacts;
mod quotes;
mod users;

use sqlx::sqlite::SqlitePool;

/// Repository for database operations.
///
/// Each application opens its own pool; the methods only touch the tables of
/// the schema the pool was initialized with.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Run a trivial query to check the pool can serve requests.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
