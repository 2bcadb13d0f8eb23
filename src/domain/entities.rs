//! Domain records mirrored from the remote content API.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::error::DomainError;

/// Identifier of an article or product: a positive integer assigned by the
/// remote store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct ContentId(i64);

impl ContentId {
    pub fn new(raw: i64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// Parse a raw route segment. Non-numeric, zero and negative input all
    /// yield `None`; callers treat that as not-found rather than an error.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().and_then(Self::new)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for ContentId {
    type Error = DomainError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| DomainError::validation("content id must be a positive integer"))
    }
}

impl From<ContentId> for i64 {
    fn from(id: ContentId) -> Self {
        id.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One article as stored remotely. Wire names (`date`, `content`) follow the
/// backend's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: ContentId,
    pub title: String,
    #[serde(rename = "date", with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub summary: String,
    #[serde(rename = "content", default)]
    pub body: Vec<String>,
}

impl ArticleRecord {
    /// Paragraphs as rendered: a missing or empty body degrades to a single
    /// empty paragraph so consumers never iterate over nothing.
    pub fn paragraphs(&self) -> Vec<&str> {
        if self.body.is_empty() {
            vec![""]
        } else {
            self.body.iter().map(String::as_str).collect()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ContentId,
    pub name: String,
    pub price: f64,
    pub image_url: String,
    pub description: String,
}
