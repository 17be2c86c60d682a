//! # Routing table: key → handler.
//!
//! [`HandlerTable`] maps a routing key (message name, timer id, signal number)
//! to a [`HandlerRef`]. Registration is insert-or-replace: the last
//! registration for a key wins. Entries live as long as the table unless
//! re-registered.
//!
//! ## Rules
//! - Each table has its own lock, so registering a timer handler never waits
//!   on a lookup in the message table.
//! - `get` clones the `Arc` and releases the lock before the caller invokes the
//!   handler: a running handler may register other handlers without deadlock.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock};

use super::handler::HandlerRef;

/// Thread-safe insert-or-replace mapping from `K` to `HandlerRef<A>`.
pub struct HandlerTable<K, A> {
    entries: RwLock<HashMap<K, HandlerRef<A>>>,
}

impl<K, A> HandlerTable<K, A>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts or replaces the handler for `key`.
    ///
    /// Returns `true` if an earlier handler was replaced.
    pub fn insert(&self, key: K, handler: HandlerRef<A>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, handler).is_some()
    }

    /// Looks up the handler for `key`.
    pub fn get(&self, key: &K) -> Option<HandlerRef<A>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// True if a handler is registered for `key`.
    pub fn contains(&self, key: &K) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(key)
    }

    /// Snapshot of the registered keys (unordered).
    pub fn keys(&self) -> Vec<K> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.keys().cloned().collect()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, A> Default for HandlerTable<K, A>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::handlers::HandlerFn;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting(counter: &Arc<AtomicU32>, add: u32) -> HandlerRef<u32> {
        let counter = Arc::clone(counter);
        HandlerFn::arc(move |_arg: u32| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(add, Ordering::SeqCst);
                Ok::<_, HandlerError>(())
            }
        })
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let counter = Arc::new(AtomicU32::new(0));
        let table: HandlerTable<&'static str, u32> = HandlerTable::new();

        assert!(!table.insert("ping", counting(&counter, 1)));
        assert!(table.insert("ping", counting(&counter, 10)));
        assert_eq!(table.len(), 1);

        let h = table.get(&"ping").expect("registered");
        h.call(0).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_missing_key() {
        let table: HandlerTable<u64, u32> = HandlerTable::default();
        assert!(table.is_empty());
        assert!(table.get(&7).is_none());
        assert!(!table.contains(&7));
    }

    #[test]
    fn test_keys_snapshot() {
        let counter = Arc::new(AtomicU32::new(0));
        let table: HandlerTable<i32, u32> = HandlerTable::new();
        table.insert(2, counting(&counter, 1));
        table.insert(15, counting(&counter, 1));

        let mut keys = table.keys();
        keys.sort_unstable();
        assert_eq!(keys, vec![2, 15]);
    }
}
