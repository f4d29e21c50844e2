//! Cancellable debounce timer.
//!
//! Coalesces a burst of values into a single commit of the last one, once the
//! input has been quiet for the configured delay.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

struct Slot {
    /// Bumped on every schedule; a timer only commits if it is still current.
    generation: u64,
    cancel: Option<CancellationToken>,
}

struct DebouncerInner<T> {
    delay: Duration,
    commit: Box<dyn Fn(T) + Send + Sync>,
    slot: Mutex<Slot>,
}

impl<T> DebouncerInner<T> {
    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Delays a commit until no new value arrived for `delay`.
///
/// Each [`schedule`](Self::schedule) cancels the pending commit and starts a
/// new timer, so only the most recent value is ever committed. Earlier values
/// are superseded, never queued.
///
/// Clones share the same pending slot.
///
/// Timers run on the tokio runtime of the caller. Scheduling outside a
/// runtime, or with a zero delay, commits immediately.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
/// use memlane_lib::debounce::Debouncer;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let committed = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&committed);
/// let debouncer = Debouncer::new(Duration::from_millis(10), move |value: String| {
///     sink.lock().unwrap().push(value);
/// });
///
/// debouncer.schedule("a".to_string());
/// debouncer.schedule("ab".to_string());
/// tokio::time::sleep(Duration::from_millis(50)).await;
/// assert_eq!(*committed.lock().unwrap(), vec!["ab".to_string()]);
/// # }
/// ```
pub struct Debouncer<T> {
    inner: Arc<DebouncerInner<T>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, commit: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(DebouncerInner {
                delay,
                commit: Box::new(commit),
                slot: Mutex::new(Slot {
                    generation: 0,
                    cancel: None,
                }),
            }),
        }
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Schedules `value`, superseding any pending commit.
    pub fn schedule(&self, value: T) {
        if self.inner.delay.is_zero() {
            self.cancel();
            (self.inner.commit)(value);
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            log::warn!("debounce scheduled outside a tokio runtime, committing immediately");
            self.cancel();
            (self.inner.commit)(value);
            return;
        };

        let token = CancellationToken::new();
        let generation = {
            let mut slot = self.inner.slot();
            if let Some(previous) = slot.cancel.replace(token.clone()) {
                previous.cancel();
            }
            slot.generation += 1;
            slot.generation
        };

        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    log::trace!("debounce #{generation} superseded");
                }
                _ = tokio::time::sleep(inner.delay) => {
                    let current = {
                        let mut slot = inner.slot();
                        let current = slot.generation == generation && !token.is_cancelled();
                        if current {
                            slot.cancel = None;
                        }
                        current
                    };
                    if current {
                        log::trace!("debounce #{generation} committing");
                        (inner.commit)(value);
                    }
                }
            }
        });
    }

    /// Drops the pending commit, if any. Returns `true` if one was pending.
    pub fn cancel(&self) -> bool {
        match self.inner.slot().cancel.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Returns `true` while a commit is waiting for its delay to elapse.
    pub fn is_pending(&self) -> bool {
        self.inner.slot().cancel.is_some()
    }
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.inner.delay)
            .field("pending", &self.inner.slot().cancel.is_some())
            .finish()
    }
}
