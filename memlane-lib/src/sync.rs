//! Store to URL synchronization.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::location::Location;
use crate::query::{QueryCodec, QueryParams};
use crate::state::{StoreChange, SubscriptionId, TableStore};

/// Writes every store change back to the location's query string.
///
/// `UrlSync` is the only writer of table query parameters. It always uses
/// `replace`, so a burst of changes leaves one history entry holding the
/// last state. Nothing is written when the encoded state already matches the
/// location, which keeps URL hydration from echoing back into the URL.
/// Changes older than the last one written are dropped. Writes are
/// serialized, so a change notified on another thread can never overwrite a
/// newer one. A [`Location`] must not notify the store synchronously from
/// `replace`.
pub struct UrlSync {
    store: TableStore,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl UrlSync {
    /// Subscribes to `store`. The location is not touched until the first
    /// change.
    pub fn attach(store: &TableStore, codec: QueryCodec, location: Arc<dyn Location>) -> Self {
        let last_written = Mutex::new(store.revision());
        let id = store.subscribe(move |change| {
            // Held across the check and the write.
            let mut last = last_written
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if *last >= change.revision {
                log::trace!("url sync: dropping stale revision {}", change.revision);
                return;
            }
            *last = change.revision;
            write_change(&codec, location.as_ref(), change);
        });

        Self {
            store: store.clone(),
            subscription: Mutex::new(Some(id)),
        }
    }

    /// Stops syncing. Returns `false` if already detached.
    pub fn detach(&self) -> bool {
        let id = self
            .subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        match id {
            Some(id) => {
                log::debug!("url sync detached");
                self.store.unsubscribe(id)
            }
            None => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }
}

impl Drop for UrlSync {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for UrlSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlSync")
            .field("attached", &self.is_attached())
            .finish()
    }
}

fn write_change(codec: &QueryCodec, location: &dyn Location, change: &StoreChange) {
    let current = QueryParams::parse(&location.search());
    let next = codec.merge(&change.state, &current);
    if next.multiset_eq(&current) {
        log::trace!("url sync: revision {} already in url", change.revision);
        return;
    }

    let query = next.to_query_string();
    log::debug!("url sync: revision {} -> ?{}", change.revision, query);
    location.replace(&query);
}
