//! Read-through single-item lookup for detail views.
//!
//! A populated snapshot serves detail reads synchronously; only a miss falls
//! through to a by-id remote fetch. The fall-through result is not written
//! back to the shared snapshot (no negative caching): repeated visits to an
//! uncached item re-fetch it until the next full refresh.

use std::future::Future;
use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::debug;

use crate::application::source::{ContentSource, SourceError};
use crate::cache::{CacheConfig, SnapshotStore};
use crate::domain::entities::{ArticleRecord, ContentId, ProductRecord};

const METRIC_DETAIL_HIT: &str = "vitrine_detail_hit_total";
const METRIC_DETAIL_MISS: &str = "vitrine_detail_miss_total";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("failed to load content item: {0}")]
    Source(#[from] SourceError),
}

pub struct DetailLookup {
    config: CacheConfig,
    store: Arc<SnapshotStore>,
    source: Arc<dyn ContentSource>,
}

impl DetailLookup {
    pub fn new(config: CacheConfig, store: Arc<SnapshotStore>, source: Arc<dyn ContentSource>) -> Self {
        Self {
            config,
            store,
            source,
        }
    }

    /// One article: snapshot scan first, remote by-id fetch on a miss.
    /// `Ok(None)` means not found; transport problems are errors.
    pub async fn article(&self, id: ContentId) -> Result<Option<ArticleRecord>, LookupError> {
        let state = self.store.read();
        if let Some(snapshot) = state.snapshot() {
            if !snapshot.articles.is_empty() {
                if let Some(article) = snapshot.article(id) {
                    counter!(METRIC_DETAIL_HIT).increment(1);
                    debug!(%id, "article served from snapshot");
                    return Ok(Some(article.clone()));
                }
            }
        }
        counter!(METRIC_DETAIL_MISS).increment(1);
        self.fetch_one(self.source.article_by_id(id)).await
    }

    /// One product, same policy as [`article`](Self::article).
    pub async fn product(&self, id: ContentId) -> Result<Option<ProductRecord>, LookupError> {
        let state = self.store.read();
        if let Some(snapshot) = state.snapshot() {
            if !snapshot.products.is_empty() {
                if let Some(product) = snapshot.product(id) {
                    counter!(METRIC_DETAIL_HIT).increment(1);
                    debug!(%id, "product served from snapshot");
                    return Ok(Some(product.clone()));
                }
            }
        }
        counter!(METRIC_DETAIL_MISS).increment(1);
        self.fetch_one(self.source.product_by_id(id)).await
    }

    /// Resolve a raw route segment to an article. Malformed identifiers are
    /// not-found, never an error.
    pub async fn article_from_route(&self, raw: &str) -> Result<Option<ArticleRecord>, LookupError> {
        match ContentId::parse(raw) {
            Some(id) => self.article(id).await,
            None => {
                debug!(raw, "malformed article id in route");
                Ok(None)
            }
        }
    }

    /// Resolve a raw route segment to a product.
    pub async fn product_from_route(&self, raw: &str) -> Result<Option<ProductRecord>, LookupError> {
        match ContentId::parse(raw) {
            Some(id) => self.product(id).await,
            None => {
                debug!(raw, "malformed product id in route");
                Ok(None)
            }
        }
    }

    async fn fetch_one<T>(
        &self,
        fetch: impl Future<Output = Result<Option<T>, SourceError>>,
    ) -> Result<Option<T>, LookupError> {
        match tokio::time::timeout(self.config.fetch_timeout(), fetch).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(SourceError::Timeout.into()),
        }
    }
}
