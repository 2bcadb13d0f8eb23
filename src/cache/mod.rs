//! Vitrine content cache.
//!
//! One process-wide snapshot slot shared by every consumer:
//!
//! - **Snapshot**: both collections (articles and products) fetched together and
//!   replaced wholesale, never patched field by field.
//! - **State machine**: `Uninitialized -> Loading -> Ready | Failed`, queried
//!   uniformly by every consumer instead of per-view null checks.
//! - **Broadcast**: replacements are observed through a `watch` channel;
//!   dropping a receiver deregisters the observer.
//!
//! There is no eviction and no TTL. Staleness is resolved only by an explicit
//! refresh, which admin mutations trigger after every successful write.

mod config;
mod snapshot;
mod store;

pub use config::CacheConfig;
pub use snapshot::{ContentSnapshot, ContentView, Generation, SnapshotState};
pub use store::SnapshotStore;
