//! Single-slot snapshot store with broadcast semantics.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use super::snapshot::{ContentSnapshot, ContentView, Generation, SnapshotState};

/// Process-wide store for the content snapshot.
///
/// State is carried on a `watch` channel: `read` is a synchronous copy of the
/// latest value, replacements are whole-value sends so no subscriber can
/// observe a partially updated snapshot, and `subscribe` hands out a receiver
/// whose drop deregisters the observer.
///
/// Fetch ownership and out-of-order completion are resolved with generations:
/// every fetch is stamped when it starts, and a completion only lands while
/// its generation is still the latest issued. A refresh started after a cold
/// fetch therefore wins regardless of which response arrives first.
pub struct SnapshotStore {
    state: watch::Sender<SnapshotState>,
    issued: AtomicU64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(SnapshotState::Uninitialized),
            issued: AtomicU64::new(0),
        }
    }

    /// Current state, synchronously. Never touches the network.
    pub fn read(&self) -> SnapshotState {
        self.state.borrow().clone()
    }

    /// Consumer-facing projection of [`read`](Self::read).
    pub fn view(&self) -> ContentView {
        self.state.borrow().view()
    }

    /// Register an observer. Every state replacement wakes all receivers;
    /// dropping the receiver deregisters it.
    pub fn subscribe(&self) -> watch::Receiver<SnapshotState> {
        self.state.subscribe()
    }

    /// Claim ownership of the cold-start fetch.
    ///
    /// Returns the stamped generation when this caller moved the store from
    /// `Uninitialized` to `Loading`; `None` when another fetch already ran or
    /// is in flight, in which case the caller should wait on the channel
    /// instead of fetching.
    pub(crate) fn begin_initial_fetch(&self) -> Option<Generation> {
        let mut claimed = None;
        self.state.send_if_modified(|state| {
            if !matches!(state, SnapshotState::Uninitialized) {
                return false;
            }
            let generation = self.next_generation();
            *state = SnapshotState::Loading {
                generation,
                stale: None,
            };
            claimed = Some(generation);
            true
        });
        claimed
    }

    /// Stamp an unconditional refresh and move the store to `Loading`,
    /// keeping previously cached collections visible while it runs.
    pub(crate) fn begin_refresh(&self) -> Generation {
        let mut stamped = 0;
        self.state.send_modify(|state| {
            let generation = self.next_generation();
            let stale = std::mem::take(state).into_snapshot();
            *state = SnapshotState::Loading { generation, stale };
            stamped = generation;
        });
        stamped
    }

    /// Land a completed fetch. Returns false when a newer fetch was issued
    /// after this one started; the result is then discarded and the newer
    /// fetch remains in charge of the slot.
    pub(crate) fn complete(
        &self,
        generation: Generation,
        outcome: Result<ContentSnapshot, String>,
        stale_if_error: bool,
    ) -> bool {
        self.state.send_if_modified(|state| {
            if self.issued.load(Ordering::SeqCst) != generation {
                debug!(generation, "discarding superseded fetch result");
                return false;
            }
            *state = match outcome {
                Ok(snapshot) => SnapshotState::Ready(snapshot),
                Err(error) => SnapshotState::Failed {
                    error,
                    stale: if stale_if_error {
                        std::mem::take(state).into_snapshot()
                    } else {
                        None
                    },
                },
            };
            true
        })
    }

    fn next_generation(&self) -> Generation {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
