//! Database migrations and initialization.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

/// Which application's tables to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// Users and their contacts.
    Contacts,
    /// Users, authors, quotes and tags.
    Quotes,
}

impl Schema {
    fn sql(&self) -> &'static str {
        match self {
            Schema::Contacts => include_str!("contacts_schema.sql"),
            Schema::Quotes => include_str!("quotes_schema.sql"),
        }
    }
}

/// Initialize the SQLite database with schema and pragmas.
pub async fn init_db(db_path: &str, schema: Schema) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .after_connect(|conn, _meta| Box::pin(async move { configure_pragmas_conn(conn).await }))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    run_migrations(&pool, schema).await?;

    info!(?schema, "Database initialized successfully at {}", db_path);
    Ok(pool)
}

/// Run all statements of `schema`; every statement is idempotent.
async fn run_migrations(pool: &SqlitePool, schema: Schema) -> Result<(), sqlx::Error> {
    info!(?schema, "Running database migrations...");

    for statement in schema.sql().split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    info!("Migrations completed successfully");
    Ok(())
}

async fn configure_pragmas_conn(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    use sqlx::Row;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;

    // journal_mode returns the actual mode set; must use fetch to get result
    let row = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    let journal_mode: String = row.get(0);
    tracing::debug!("SQLite journal_mode set to: {}", journal_mode);

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;

    Ok(())
}
