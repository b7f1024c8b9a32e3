//! One-off import of the quotes fixtures.
//!
//! Reads `authors.json` and `quotes.json`, inserts every author (hyphens
//! stripped from the full name), then inserts each quote whose author name
//! resolves to a stored author. Running it twice inserts everything twice.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::db::Repository;
use crate::domain::{NewAuthor, NewQuote};

pub const AUTHORS_FILE: &str = "authors.json";
pub const QUOTES_FILE: &str = "quotes.json";

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorFixture {
    pub fullname: String,
    pub born_date: String,
    pub born_location: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteFixture {
    pub quote: String,
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub authors_inserted: usize,
    pub quotes_inserted: usize,
    pub quotes_skipped: usize,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, SeedError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SeedError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load both fixture files from `dir`.
pub fn load_fixtures(dir: &Path) -> Result<(Vec<AuthorFixture>, Vec<QuoteFixture>), SeedError> {
    let authors = read_json(&dir.join(AUTHORS_FILE))?;
    let quotes = read_json(&dir.join(QUOTES_FILE))?;
    Ok((authors, quotes))
}

/// Insert authors, then quotes whose `author` matches a stored full name exactly.
///
/// Tags are created by name the first time they are seen.
pub async fn run(
    repo: &Repository,
    authors: &[AuthorFixture],
    quotes: &[QuoteFixture],
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    for author in authors {
        repo.create_author(&NewAuthor {
            fullname: author.fullname.replace('-', ""),
            born_date: author.born_date.clone(),
            born_location: author.born_location.clone(),
            description: author.description.clone(),
        })
        .await?;
        report.authors_inserted += 1;
    }

    for quote in quotes {
        let Some(author) = repo.find_author_by_fullname(&quote.author).await? else {
            debug!(author = %quote.author, "No author for quote, skipping");
            report.quotes_skipped += 1;
            continue;
        };

        let mut tag_ids = Vec::with_capacity(quote.tags.len());
        for name in &quote.tags {
            tag_ids.push(repo.get_or_create_tag(name).await?.id);
        }

        repo.create_quote(&NewQuote {
            quote: quote.quote.clone(),
            author_id: author.id,
            tag_ids,
        })
        .await?;
        report.quotes_inserted += 1;
    }

    info!(
        authors = report.authors_inserted,
        quotes = report.quotes_inserted,
        skipped = report.quotes_skipped,
        "Seeding complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_fixtures() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(AUTHORS_FILE),
            r#"[{"fullname":"Albert Einstein","born_date":"March 14, 1879","born_location":"in Ulm, Germany","description":"Physicist"}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(QUOTES_FILE),
            r#"[{"tags":["change","world"],"author":"Albert Einstein","quote":"The world as we have created it"}]"#,
        )
        .unwrap();

        let (authors, quotes) = load_fixtures(dir.path()).unwrap();
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].born_location, "in Ulm, Germany");
        assert_eq!(quotes[0].tags, vec!["change", "world"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_fixtures(dir.path()),
            Err(SeedError::Io { .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_json_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(AUTHORS_FILE), "{not json").unwrap();
        assert!(matches!(
            load_fixtures(dir.path()),
            Err(SeedError::Json { .. })
        ));
    }
}
