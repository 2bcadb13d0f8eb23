//! Remote content source abstraction.
//!
//! The cache and lookup layers consume the remote store exclusively through
//! [`ContentSource`]; the HTTP adapter lives in `infra::http`.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

use crate::domain::entities::{ArticleRecord, ContentId, ProductRecord};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote returned status {code}")]
    Status { code: u16 },
    #[error("remote call timed out")]
    Timeout,
    #[error("failed to decode remote payload: {0}")]
    Decode(String),
}

impl SourceError {
    pub fn from_transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn from_decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewArticle {
    pub title: String,
    /// Defaults to the submission time when absent, matching the remote API.
    #[serde(rename = "date", with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    pub image_url: String,
    pub summary: String,
    #[serde(rename = "content")]
    pub body: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateArticle {
    pub title: String,
    #[serde(rename = "date", with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    pub image_url: String,
    pub summary: String,
    #[serde(rename = "content")]
    pub body: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub image_url: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateProduct {
    pub name: String,
    pub price: f64,
    pub image_url: String,
    pub description: String,
}

/// Query and mutation surface of the remote content store. Every call
/// succeeds or fails as a unit; there are no partial writes.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn list_articles(&self) -> Result<Vec<ArticleRecord>, SourceError>;

    async fn list_products(&self) -> Result<Vec<ProductRecord>, SourceError>;

    async fn article_by_id(&self, id: ContentId) -> Result<Option<ArticleRecord>, SourceError>;

    async fn product_by_id(&self, id: ContentId) -> Result<Option<ProductRecord>, SourceError>;

    async fn create_article(&self, params: NewArticle) -> Result<ArticleRecord, SourceError>;

    async fn update_article(
        &self,
        id: ContentId,
        params: UpdateArticle,
    ) -> Result<ArticleRecord, SourceError>;

    async fn delete_article(&self, id: ContentId) -> Result<(), SourceError>;

    async fn create_product(&self, params: NewProduct) -> Result<ProductRecord, SourceError>;

    async fn update_product(
        &self,
        id: ContentId,
        params: UpdateProduct,
    ) -> Result<ProductRecord, SourceError>;

    async fn delete_product(&self, id: ContentId) -> Result<(), SourceError>;
}
