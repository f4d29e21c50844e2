//! Browser location seam.

use std::sync::{Arc, Mutex, MutexGuard};

/// The current location's query string and its history.
///
/// Query strings are passed without the leading `?`.
pub trait Location: Send + Sync {
    /// The current query string.
    fn search(&self) -> String;

    /// Replaces the current history entry's query string.
    fn replace(&self, query: &str);

    /// Pushes a new history entry with the given query string.
    fn push(&self, query: &str);
}

#[derive(Debug)]
struct History {
    entries: Vec<String>,
    cursor: usize,
    writes: usize,
}

/// In-memory location with back/forward history.
///
/// Clones share the same history.
///
/// # Example
///
/// ```
/// use memlane_lib::location::{Location, MemoryLocation};
///
/// let location = MemoryLocation::new("?page=2");
/// location.push("page=3");
/// location.replace("page=4");
/// assert_eq!(location.entries(), ["page=2", "page=4"]);
///
/// assert!(location.back());
/// assert_eq!(location.search(), "page=2");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    history: Arc<Mutex<History>>,
}

impl MemoryLocation {
    /// Creates a location with a single history entry.
    pub fn new(query: &str) -> Self {
        Self {
            history: Arc::new(Mutex::new(History {
                entries: vec![strip(query).to_string()],
                cursor: 0,
                writes: 0,
            })),
        }
    }

    fn history(&self) -> MutexGuard<'_, History> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Moves back one entry. Returns `false` at the start of history.
    pub fn back(&self) -> bool {
        let mut history = self.history();
        if history.cursor == 0 {
            return false;
        }
        history.cursor -= 1;
        true
    }

    /// Moves forward one entry. Returns `false` at the end of history.
    pub fn forward(&self) -> bool {
        let mut history = self.history();
        if history.cursor + 1 >= history.entries.len() {
            return false;
        }
        history.cursor += 1;
        true
    }

    /// All history entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.history().entries.clone()
    }

    /// Number of `replace`/`push` calls so far.
    pub fn writes(&self) -> usize {
        self.history().writes
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl Location for MemoryLocation {
    fn search(&self) -> String {
        let history = self.history();
        history.entries[history.cursor].clone()
    }

    fn replace(&self, query: &str) {
        let mut history = self.history();
        let cursor = history.cursor;
        history.entries[cursor] = strip(query).to_string();
        history.writes += 1;
    }

    fn push(&self, query: &str) {
        let mut history = self.history();
        let next = history.cursor + 1;
        history.entries.truncate(next);
        history.entries.push(strip(query).to_string());
        history.cursor = next;
        history.writes += 1;
    }
}

fn strip(query: &str) -> &str {
    query.strip_prefix('?').unwrap_or(query)
}
