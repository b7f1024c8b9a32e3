//! Quotes, their authors and tags.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub fullname: String,
    pub born_date: String,
    pub born_location: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub fullname: String,
    pub born_date: String,
    pub born_location: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A tag with the number of quotes carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub id: i64,
    pub name: String,
    pub quote_count: i64,
}

/// A quote joined with its author's name and its tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub id: i64,
    pub quote: String,
    pub author_id: i64,
    pub author_name: String,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuote {
    pub quote: String,
    pub author_id: i64,
    pub tag_ids: Vec<i64>,
}

/// How a tag is addressed in `/tag/{id_or_name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagLookup {
    ById(i64),
    ByName(String),
}

impl TagLookup {
    /// All-digit segments are ids, anything else is a name.
    pub fn parse(segment: &str) -> Self {
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = segment.parse::<i64>() {
                return TagLookup::ById(id);
            }
        }
        TagLookup::ByName(segment.to_string())
    }
}

impl std::fmt::Display for TagLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagLookup::ById(id) => write!(f, "{}", id),
            TagLookup::ByName(name) => f.write_str(name),
        }
    }
}
