use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::Mutex;

/// Mutex-guarded key → value map.
///
/// # Example
/// ```
/// use slotvisor::SafeMap;
///
/// let m: SafeMap<String, u32> = SafeMap::new();
/// assert_eq!(m.set("a".into(), 1), ("a".to_string(), 1));
/// assert_eq!(m.get("a"), Some(1));
/// assert_eq!(m.get("b"), None);
/// ```
#[derive(Debug)]
pub struct SafeMap<K, V> {
    store: Mutex<HashMap<K, V>>,
}

impl<K, V> SafeMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a clone of the value stored under `key`, if any.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
        V: Clone,
    {
        self.store.lock().get(key).cloned()
    }

    /// Stores `value` under `key` and hands both back.
    pub fn set(&self, key: K, value: V) -> (K, V)
    where
        K: Clone,
        V: Clone,
    {
        self.store.lock().insert(key.clone(), value.clone());
        (key, value)
    }

    /// Removes `key`, returning the value it held.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
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

impl<K: Eq + Hash, V> Default for SafeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
