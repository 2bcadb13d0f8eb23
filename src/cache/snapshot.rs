//! Snapshot state machine shared by every content consumer.

use time::OffsetDateTime;

use crate::domain::entities::{ArticleRecord, ContentId, ProductRecord};

/// Both collections fetched together, replaced wholesale on each successful
/// fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSnapshot {
    pub articles: Vec<ArticleRecord>,
    pub products: Vec<ProductRecord>,
    pub fetched_at: OffsetDateTime,
}

impl ContentSnapshot {
    pub fn new(articles: Vec<ArticleRecord>, products: Vec<ProductRecord>) -> Self {
        Self {
            articles,
            products,
            fetched_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn article(&self, id: ContentId) -> Option<&ArticleRecord> {
        self.articles.iter().find(|article| article.id == id)
    }

    pub fn product(&self, id: ContentId) -> Option<&ProductRecord> {
        self.products.iter().find(|product| product.id == id)
    }
}

/// Fetch generation. Monotonic per store; stamps each in-flight fetch so that
/// out-of-order completions resolve to latest-started-wins.
pub type Generation = u64;

/// The single state machine owned by the store.
///
/// `Loading` and `Failed` carry the last snapshot so consumers keep rendering
/// previous content while a refresh runs or after it fails.
#[derive(Debug, Clone, Default)]
pub enum SnapshotState {
    #[default]
    Uninitialized,
    Loading {
        generation: Generation,
        stale: Option<ContentSnapshot>,
    },
    Ready(ContentSnapshot),
    Failed {
        error: String,
        stale: Option<ContentSnapshot>,
    },
}

impl SnapshotState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::Loading { .. })
    }

    /// Latest snapshot visible in this state, fresh or stale.
    pub fn snapshot(&self) -> Option<&ContentSnapshot> {
        match self {
            Self::Uninitialized => None,
            Self::Loading { stale, .. } | Self::Failed { stale, .. } => stale.as_ref(),
            Self::Ready(snapshot) => Some(snapshot),
        }
    }

    pub(crate) fn into_snapshot(self) -> Option<ContentSnapshot> {
        match self {
            Self::Uninitialized => None,
            Self::Loading { stale, .. } | Self::Failed { stale, .. } => stale,
            Self::Ready(snapshot) => Some(snapshot),
        }
    }

    /// Consumer-facing projection.
    pub fn view(&self) -> ContentView {
        let (articles, products) = match self.snapshot() {
            Some(snapshot) => (snapshot.articles.clone(), snapshot.products.clone()),
            None => (Vec::new(), Vec::new()),
        };
        ContentView {
            articles,
            products,
            is_loading: self.is_loading(),
            error: match self {
                Self::Failed { error, .. } => Some(error.clone()),
                _ => None,
            },
        }
    }
}

/// What a view binds to: collections plus status fields, mutually consistent
/// because they are derived from one state value.
#[derive(Debug, Clone, Default)]
pub struct ContentView {
    pub articles: Vec<ArticleRecord>,
    pub products: Vec<ProductRecord>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> ContentSnapshot {
        let article = ArticleRecord {
            id: ContentId::new(1).expect("positive id"),
            title: "Tissus".to_string(),
            published_at: OffsetDateTime::UNIX_EPOCH,
            image_url: String::new(),
            summary: String::new(),
            body: vec!["Un paragraphe.".to_string()],
        };
        ContentSnapshot::new(vec![article], Vec::new())
    }

    #[test]
    fn uninitialized_view_is_loading_and_empty() {
        let view = SnapshotState::Uninitialized.view();
        assert!(view.is_loading);
        assert!(view.articles.is_empty());
        assert!(view.products.is_empty());
        assert!(view.error.is_none());
    }

    #[test]
    fn loading_keeps_stale_collections_visible() {
        let state = SnapshotState::Loading {
            generation: 2,
            stale: Some(sample_snapshot()),
        };
        let view = state.view();
        assert!(view.is_loading);
        assert_eq!(view.articles.len(), 1);
        assert!(view.error.is_none());
    }

    #[test]
    fn ready_view_exposes_collections() {
        let view = SnapshotState::Ready(sample_snapshot()).view();
        assert!(!view.is_loading);
        assert_eq!(view.articles.len(), 1);
        assert!(view.error.is_none());
    }

    #[test]
    fn failed_view_carries_error_and_stale_data() {
        let state = SnapshotState::Failed {
            error: "boom".to_string(),
            stale: Some(sample_snapshot()),
        };
        let view = state.view();
        assert!(!view.is_loading);
        assert_eq!(view.error.as_deref(), Some("boom"));
        assert_eq!(view.articles.len(), 1);
    }

    #[test]
    fn snapshot_lookup_by_id() {
        let snapshot = sample_snapshot();
        let hit = ContentId::new(1).expect("positive id");
        let miss = ContentId::new(9).expect("positive id");
        assert!(snapshot.article(hit).is_some());
        assert!(snapshot.article(miss).is_none());
        assert!(snapshot.product(hit).is_none());
    }
}
