use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;

use parking_lot::Mutex;

/// Mutex-guarded key-existence set.
///
/// [`SafeSet::try_set`] is an atomic test-and-set: among any number of
/// concurrent calls for the same key, exactly one returns `true`.
#[derive(Debug)]
pub struct SafeSet<T> {
    store: Mutex<HashSet<T>>,
}

impl<T: Eq + Hash> SafeSet<T> {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashSet::new()),
        }
    }

    pub fn exist<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.store.lock().contains(key)
    }

    pub fn set(&self, key: T) {
        self.store.lock().insert(key);
    }

    /// Inserts `key` if absent. Returns `false` when it was already present.
    pub fn try_set(&self, key: T) -> bool {
        self.store.lock().insert(key)
    }

    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.store.lock().remove(key)
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }
}

impl<T: Eq + Hash> Default for SafeSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn try_set_wins_exactly_once() {
        let set: SafeSet<&str> = SafeSet::new();
        let winners = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..64 {
                s.spawn(|| {
                    if set.try_set("leader") {
                        winners.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });

        assert_eq!(winners.load(Ordering::Relaxed), 1);
        assert!(set.exist("leader"));
    }

    #[test]
    fn concurrent_distinct_try_sets_all_succeed() {
        let set: SafeSet<usize> = SafeSet::new();
        let successes = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for t in 0..10 {
                let (set, successes) = (&set, &successes);
                s.spawn(move || {
                    for i in 0..100 {
                        if set.try_set(t * 100 + i) {
                            successes.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });

        assert_eq!(successes.load(Ordering::Relaxed), 1000);
        assert_eq!(set.len(), 1000);
        assert!((0..1000).all(|k| set.exist(&k)));
    }

    #[test]
    fn set_then_remove() {
        let set = SafeSet::new();
        set.set(7u8);
        assert!(!set.try_set(7));
        assert!(set.remove(&7));
        assert!(!set.exist(&7));
        assert!(set.is_empty());
    }
}
