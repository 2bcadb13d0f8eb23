//! Per-consumer binding to the shared snapshot store.
//!
//! Every view-level consumer (home, listings, admin) goes through
//! [`ContentAccessor`]: it returns the cached collections when the store is
//! settled, attaches late arrivals to an already in-flight fetch instead of
//! issuing a second one, and exposes `refresh` as the sole invalidation path.
//!
//! Fetches run as detached tasks. The store outlives any consumer: a caller
//! that goes away mid-fetch cancels nothing, the fetch still completes and
//! still writes.

use std::sync::Arc;

use metrics::counter;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::application::source::{ContentSource, SourceError};
use crate::cache::{CacheConfig, ContentSnapshot, ContentView, Generation, SnapshotState, SnapshotStore};

const METRIC_CACHE_HIT: &str = "vitrine_content_cache_hit_total";
const METRIC_CACHE_MISS: &str = "vitrine_content_cache_miss_total";
const METRIC_FETCH: &str = "vitrine_content_fetch_total";
const METRIC_FETCH_FAILURE: &str = "vitrine_content_fetch_failure_total";

pub struct ContentAccessor {
    config: CacheConfig,
    store: Arc<SnapshotStore>,
    source: Arc<dyn ContentSource>,
}

impl ContentAccessor {
    pub fn new(config: CacheConfig, store: Arc<SnapshotStore>, source: Arc<dyn ContentSource>) -> Self {
        Self {
            config,
            store,
            source,
        }
    }

    /// Register an observer of snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<SnapshotState> {
        self.store.subscribe()
    }

    /// Current content, populating the store on first use.
    ///
    /// A settled store (`Ready` or `Failed`) is returned as-is with zero
    /// remote calls. While a fetch is in flight, callers wait on it rather
    /// than starting their own.
    pub async fn content(&self) -> ContentView {
        match self.store.read() {
            SnapshotState::Ready(_) | SnapshotState::Failed { .. } => {
                counter!(METRIC_CACHE_HIT).increment(1);
                return self.store.view();
            }
            SnapshotState::Loading { .. } => return self.wait_settled().await,
            SnapshotState::Uninitialized => {}
        }

        // On `None` another caller claimed the cold fetch between read and
        // claim; either way the result arrives through the channel.
        if let Some(generation) = self.store.begin_initial_fetch() {
            counter!(METRIC_CACHE_MISS).increment(1);
            self.spawn_fetch(generation);
        }
        self.wait_settled().await
    }

    /// Unconditional re-fetch and wholesale replacement; the invalidation
    /// path admin writes use. There is no background revalidation.
    pub async fn refresh(&self) -> ContentView {
        let generation = self.store.begin_refresh();
        self.spawn_fetch(generation);
        self.wait_settled().await
    }

    async fn wait_settled(&self) -> ContentView {
        let mut rx = self.store.subscribe();
        // An Err means the store was dropped mid-wait; fall through to
        // whatever value the channel last held.
        let _ = rx.wait_for(|state| !state.is_loading()).await;
        rx.borrow().view()
    }

    /// Run the fetch detached from the initiating caller. Dropping the caller
    /// cancels its wait, never the fetch itself.
    fn spawn_fetch(&self, generation: Generation) {
        let config = self.config.clone();
        let store = self.store.clone();
        let source = self.source.clone();
        tokio::spawn(async move {
            counter!(METRIC_FETCH).increment(1);
            let outcome = match fetch_snapshot(&config, source.as_ref()).await {
                Ok(snapshot) => {
                    info!(
                        generation,
                        articles = snapshot.articles.len(),
                        products = snapshot.products.len(),
                        "content snapshot fetched"
                    );
                    Ok(snapshot)
                }
                Err(err) => {
                    counter!(METRIC_FETCH_FAILURE).increment(1);
                    warn!(generation, error = %err, "content fetch failed");
                    Err(fetch_error_message(&err))
                }
            };

            if !store.complete(generation, outcome, config.stale_if_error) {
                // A newer fetch owns the slot; callers follow it instead.
                debug!(generation, "discarded fetch result, a newer one owns the slot");
            }
        });
    }
}

async fn fetch_snapshot(
    config: &CacheConfig,
    source: &dyn ContentSource,
) -> Result<ContentSnapshot, SourceError> {
    let fetch = async {
        let (articles, products) =
            futures::future::try_join(source.list_articles(), source.list_products()).await?;
        Ok::<_, SourceError>(ContentSnapshot::new(articles, products))
    };

    match tokio::time::timeout(config.fetch_timeout(), fetch).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout),
    }
}

fn fetch_error_message(err: &SourceError) -> String {
    format!("failed to load content: {err}")
}
