//! Bounded command history with recall by recency.
//!
//! Stores previously submitted commands, oldest first, and lets the input
//! field step back through them the way a shell does with Up/Down.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ConsoleError;

/// Default number of commands kept by a console.
pub const DEFAULT_CAPACITY: usize = 100;

/// Bounded, deduplicating command history.
///
/// Consecutive duplicates are collapsed and the oldest entries are evicted
/// once `capacity` is exceeded. The storage is shared so that the console can
/// also expose it as an observable sequence; [`clamp`](Self::clamp) restores
/// the capacity bound after outside edits.
///
/// # Example
///
/// ```
/// use snapconsole_core::history::CommandHistory;
///
/// let history = CommandHistory::new(100);
/// history.append("help");
/// history.append("help");
/// history.append("add x");
///
/// assert_eq!(history.entries(), vec!["help", "add x"]);
/// assert_eq!(history.recall(1).unwrap().as_deref(), Some("add x"));
/// assert_eq!(history.recall(0).unwrap(), None);
/// assert!(history.recall(3).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: Rc<RefCell<Vec<String>>>,
    capacity: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl CommandHistory {
    /// Create an empty history holding at most `capacity` commands.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
            capacity,
        }
    }

    /// Record a submitted command.
    ///
    /// Returns `false` without changing anything when `command` equals the
    /// most recent entry. Otherwise appends it and evicts the oldest entries
    /// until the history fits its capacity.
    pub fn append(&self, command: impl Into<String>) -> bool {
        let command = command.into();
        let mut entries = self.entries.borrow_mut();
        if entries.last() == Some(&command) {
            return false;
        }
        entries.push(command);
        trim(&mut entries, self.capacity);
        true
    }

    /// Look up the `k`-th most recent command.
    ///
    /// `k == 0` addresses the live edit buffer and yields `None`. Fails with
    /// [`ConsoleError::IndexOutOfRange`] when `k` exceeds the history length.
    pub fn recall(&self, k: usize) -> Result<Option<String>, ConsoleError> {
        let entries = self.entries.borrow();
        if k > entries.len() {
            return Err(ConsoleError::IndexOutOfRange {
                index: k,
                len: entries.len(),
            });
        }
        if k == 0 {
            return Ok(None);
        }
        Ok(Some(entries[entries.len() - k].clone()))
    }

    /// Evict the oldest entries until the history fits its capacity.
    pub fn clamp(&self) {
        trim(&mut self.entries.borrow_mut(), self.capacity);
    }

    /// Maximum number of entries kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of entries in the history.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// A snapshot of all entries (oldest first).
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    /// The storage, for binding an observable view onto it.
    pub fn shared(&self) -> Rc<RefCell<Vec<String>>> {
        self.entries.clone()
    }
}

fn trim(entries: &mut Vec<String>, capacity: usize) {
    if entries.len() > capacity {
        let excess = entries.len() - capacity;
        entries.drain(..excess);
    }
}
