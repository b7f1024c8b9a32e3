use anyhow::{Context, Result};
use contacts_quotes::config::SeedConfig;
use contacts_quotes::db::{init_db, Schema};
use contacts_quotes::{seed, Repository};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = SeedConfig::from_env()?;

    let pool = init_db(&config.database_path, Schema::Quotes)
        .await
        .context("Failed to initialize database")?;
    let repo = Repository::new(pool);

    let (authors, quotes) = seed::load_fixtures(Path::new(&config.fixtures_dir))?;
    tracing::info!(
        authors = authors.len(),
        quotes = quotes.len(),
        dir = %config.fixtures_dir,
        "Loaded fixtures"
    );

    seed::run(&repo, &authors, &quotes).await?;

    Ok(())
}
