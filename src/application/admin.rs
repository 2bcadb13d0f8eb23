//! Admin mutations with snapshot invalidation.
//!
//! Writes go straight to the remote store; after every successful mutation the
//! shared snapshot is refreshed so the next read reflects the change. Failed
//! mutations leave the snapshot untouched.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::accessor::ContentAccessor;
use crate::application::source::{
    ContentSource, NewArticle, NewProduct, SourceError, UpdateArticle, UpdateProduct,
};
use crate::domain::entities::{ArticleRecord, ContentId, ProductRecord};
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("remote write failed: {0}")]
    Source(#[from] SourceError),
}

pub struct AdminContentService {
    source: Arc<dyn ContentSource>,
    accessor: Arc<ContentAccessor>,
}

impl AdminContentService {
    pub fn new(source: Arc<dyn ContentSource>, accessor: Arc<ContentAccessor>) -> Self {
        Self { source, accessor }
    }

    pub async fn create_article(&self, params: NewArticle) -> Result<ArticleRecord, AdminError> {
        validate_article(&params.title, &params.body)?;
        let article = self.source.create_article(params).await?;
        info!(id = %article.id, "article created");
        self.accessor.refresh().await;
        Ok(article)
    }

    pub async fn update_article(
        &self,
        id: ContentId,
        params: UpdateArticle,
    ) -> Result<ArticleRecord, AdminError> {
        validate_article(&params.title, &params.body)?;
        let article = self.source.update_article(id, params).await?;
        info!(%id, "article updated");
        self.accessor.refresh().await;
        Ok(article)
    }

    pub async fn delete_article(&self, id: ContentId) -> Result<(), AdminError> {
        self.source.delete_article(id).await?;
        info!(%id, "article deleted");
        self.accessor.refresh().await;
        Ok(())
    }

    pub async fn create_product(&self, params: NewProduct) -> Result<ProductRecord, AdminError> {
        validate_product(&params.name, params.price)?;
        let product = self.source.create_product(params).await?;
        info!(id = %product.id, "product created");
        self.accessor.refresh().await;
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: ContentId,
        params: UpdateProduct,
    ) -> Result<ProductRecord, AdminError> {
        validate_product(&params.name, params.price)?;
        let product = self.source.update_product(id, params).await?;
        info!(%id, "product updated");
        self.accessor.refresh().await;
        Ok(product)
    }

    pub async fn delete_product(&self, id: ContentId) -> Result<(), AdminError> {
        self.source.delete_product(id).await?;
        info!(%id, "product deleted");
        self.accessor.refresh().await;
        Ok(())
    }
}

// The remote API requires a title and a non-empty body for articles.
fn validate_article(title: &str, body: &[String]) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("article title is required"));
    }
    if body.iter().all(|paragraph| paragraph.trim().is_empty()) {
        return Err(DomainError::validation("article body is required"));
    }
    Ok(())
}

fn validate_product(name: &str, price: f64) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("product name is required"));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::validation(
            "product price must be a non-negative number",
        ));
    }
    Ok(())
}
