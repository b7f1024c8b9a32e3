//! Author, quote and tag operations for the repository.

use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{QueryBuilder, Row};
use std::collections::HashMap;

use super::Repository;
use crate::domain::{Author, NewAuthor, NewQuote, Quote, Tag, TagCount, TagLookup};

fn author_from_row(row: &SqliteRow) -> Author {
    Author {
        id: row.get("id"),
        fullname: row.get("fullname"),
        born_date: row.get("born_date"),
        born_location: row.get("born_location"),
        description: row.get("description"),
    }
}

fn tag_from_row(row: &SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
    }
}

impl Repository {
    // =========================================================================
    // Quotes
    // =========================================================================

    pub async fn count_quotes(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM quotes")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Page of all quotes in storage order, with author names and tags.
    pub async fn list_quotes(&self, limit: i64, offset: i64) -> Result<Vec<Quote>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT q.id, q.quote, q.author_id, a.fullname AS author_name
            FROM quotes q
            JOIN authors a ON a.id = q.author_id
            ORDER BY q.id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        self.with_tags(rows).await
    }

    pub async fn count_quotes_with_tag(&self, tag_id: i64) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM quote_tags WHERE tag_id = ?")
            .bind(tag_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Page of quotes carrying `tag_id`, in storage order.
    pub async fn list_quotes_with_tag(
        &self,
        tag_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Quote>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT q.id, q.quote, q.author_id, a.fullname AS author_name
            FROM quotes q
            JOIN authors a ON a.id = q.author_id
            JOIN quote_tags qt ON qt.quote_id = q.id
            WHERE qt.tag_id = ?
            ORDER BY q.id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(tag_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        self.with_tags(rows).await
    }

    /// Load the tags of the quotes in `rows` with one query and assemble them.
    async fn with_tags(&self, rows: Vec<SqliteRow>) -> Result<Vec<Quote>, sqlx::Error> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut quotes: Vec<Quote> = rows
            .iter()
            .map(|row| Quote {
                id: row.get("id"),
                quote: row.get("quote"),
                author_id: row.get("author_id"),
                author_name: row.get("author_name"),
                tags: Vec::new(),
            })
            .collect();

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT qt.quote_id, t.id, t.name FROM quote_tags qt JOIN tags t ON t.id = qt.tag_id WHERE qt.quote_id IN (",
        );
        let mut ids = builder.separated(", ");
        for quote in &quotes {
            ids.push_bind(quote.id);
        }
        ids.push_unseparated(") ORDER BY t.name ASC");

        let tag_rows = builder.build().fetch_all(&self.pool).await?;

        let mut by_quote: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in &tag_rows {
            by_quote
                .entry(row.get("quote_id"))
                .or_default()
                .push(tag_from_row(row));
        }
        for quote in &mut quotes {
            quote.tags = by_quote.remove(&quote.id).unwrap_or_default();
        }

        Ok(quotes)
    }

    /// Insert a quote and its tag links atomically. Returns the new quote id.
    pub async fn create_quote(&self, new_quote: &NewQuote) -> Result<i64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("INSERT INTO quotes (quote, author_id) VALUES (?, ?) RETURNING id")
            .bind(&new_quote.quote)
            .bind(new_quote.author_id)
            .fetch_one(&mut *tx)
            .await?;
        let quote_id: i64 = row.get("id");

        for tag_id in &new_quote.tag_ids {
            sqlx::query(
                "INSERT INTO quote_tags (quote_id, tag_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
            )
            .bind(quote_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(quote_id)
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Tags ranked by how many quotes carry them, most used first.
    ///
    /// Ties are broken by ascending tag id.
    pub async fn top_tags(&self, limit: i64) -> Result<Vec<TagCount>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name, COUNT(*) AS quote_count
            FROM quote_tags qt
            JOIN tags t ON t.id = qt.tag_id
            GROUP BY t.id, t.name
            ORDER BY quote_count DESC, t.id ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| TagCount {
                id: row.get("id"),
                name: row.get("name"),
                quote_count: row.get("quote_count"),
            })
            .collect())
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, sqlx::Error> {
        let rows = sqlx::query("SELECT id, name FROM tags ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(tag_from_row).collect())
    }

    pub async fn find_tag(&self, lookup: &TagLookup) -> Result<Option<Tag>, sqlx::Error> {
        let row = match lookup {
            TagLookup::ById(id) => {
                sqlx::query("SELECT id, name FROM tags WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            TagLookup::ByName(name) => {
                sqlx::query("SELECT id, name FROM tags WHERE name = ?")
                    .bind(name)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(row.as_ref().map(tag_from_row))
    }

    /// Insert a tag. Returns `None` when the name is already taken.
    pub async fn create_tag(&self, name: &str) -> Result<Option<Tag>, sqlx::Error> {
        let row = sqlx::query(
            "INSERT INTO tags (name) VALUES (?) ON CONFLICT(name) DO NOTHING RETURNING id, name",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(tag_from_row))
    }

    /// Fetch a tag by name, inserting it first if needed.
    pub async fn get_or_create_tag(&self, name: &str) -> Result<Tag, sqlx::Error> {
        if let Some(tag) = self.create_tag(name).await? {
            return Ok(tag);
        }
        let row = sqlx::query("SELECT id, name FROM tags WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(tag_from_row(&row))
    }

    // =========================================================================
    // Authors
    // =========================================================================

    pub async fn get_author(&self, id: i64) -> Result<Option<Author>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, fullname, born_date, born_location, description FROM authors WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(author_from_row))
    }

    /// First author (lowest id) whose full name matches exactly.
    pub async fn find_author_by_fullname(
        &self,
        fullname: &str,
    ) -> Result<Option<Author>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, fullname, born_date, born_location, description
            FROM authors
            WHERE fullname = ?
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(fullname)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(author_from_row))
    }

    pub async fn list_authors(&self) -> Result<Vec<Author>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, fullname, born_date, born_location, description FROM authors ORDER BY fullname ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(author_from_row).collect())
    }

    pub async fn create_author(&self, author: &NewAuthor) -> Result<Author, sqlx::Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO authors (fullname, born_date, born_location, description)
            VALUES (?, ?, ?, ?)
            RETURNING id, fullname, born_date, born_location, description
            "#,
        )
        .bind(&author.fullname)
        .bind(&author.born_date)
        .bind(&author.born_location)
        .bind(&author.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(author_from_row(&row))
    }

    pub async fn count_authors(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}
