use parking_lot::Mutex;

/// Mutex-guarded, index-addressable resizable array.
///
/// Used for worker slots (fixed size, addressed by index) and for an
/// orchestrator's pools (append-only).
///
/// # Example
/// ```
/// use slotvisor::SafeArray;
///
/// let a = SafeArray::from_vec(vec![0, 1, 2, 3, 4, 5]);
/// assert!(a.set(0, 10));
/// assert!(!a.set(6, 60)); // out of range
/// assert_eq!(a.get(0), Some(10));
/// assert_eq!(a.slice_step(0, 6, 2).to_vec(), vec![10, 2, 4]);
/// ```
#[derive(Debug)]
pub struct SafeArray<T> {
    items: Mutex<Vec<T>>,
}

impl<T> SafeArray<T> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    /// Creates an array of `size` default elements.
    pub fn with_size(size: usize) -> Self
    where
        T: Default,
    {
        Self::from_vec(std::iter::repeat_with(T::default).take(size).collect())
    }

    pub fn append(&self, item: T) {
        self.items.lock().push(item);
    }

    /// Returns a clone of element `i`, or `None` when out of range.
    pub fn get(&self, i: usize) -> Option<T>
    where
        T: Clone,
    {
        self.items.lock().get(i).cloned()
    }

    /// Replaces element `i`. Returns `false` (and drops `item`) when out of range.
    pub fn set(&self, i: usize, item: T) -> bool {
        match self.items.lock().get_mut(i) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Copies `[start, end)` into a new, independently locked array.
    pub fn slice(&self, start: usize, end: usize) -> SafeArray<T>
    where
        T: Clone,
    {
        self.slice_step(start, end, 1)
    }

    /// Copies every `step`-th element of `[start, end)` into a new array.
    ///
    /// `end` is clamped to the current length; `step = 0` is treated as 1.
    pub fn slice_step(&self, start: usize, end: usize, step: usize) -> SafeArray<T>
    where
        T: Clone,
    {
        let items = self.items.lock();
        let end = end.min(items.len());
        let copied = if start >= end {
            Vec::new()
        } else {
            items[start..end]
                .iter()
                .step_by(step.max(1))
                .cloned()
                .collect()
        };
        SafeArray::from_vec(copied)
    }

    /// Consistent snapshot of all elements.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl<T> Default for SafeArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_is_not_found() {
        let a: SafeArray<u8> = SafeArray::with_size(2);
        assert_eq!(a.get(1), Some(0));
        assert_eq!(a.get(2), None);
        assert!(!a.set(2, 1));
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn slice_does_not_alias_source() {
        let src = SafeArray::from_vec(vec![1, 2, 3, 4]);
        let part = src.slice(1, 3);
        part.append(99);
        src.append(5);

        assert_eq!(part.to_vec(), vec![2, 3, 99]);
        assert_eq!(src.to_vec(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn slice_clamps_and_handles_empty_ranges() {
        let a = SafeArray::from_vec(vec!['a', 'b', 'c']);
        assert_eq!(a.slice(1, 100).to_vec(), vec!['b', 'c']);
        assert!(a.slice(2, 1).is_empty());
        assert!(a.slice(5, 9).is_empty());
        assert_eq!(a.slice_step(0, 3, 0).to_vec(), vec!['a', 'b', 'c']);
    }

    #[test]
    fn concurrent_appends_are_not_lost() {
        let a: SafeArray<usize> = SafeArray::new();
        std::thread::scope(|s| {
            for t in 0..10 {
                let a = &a;
                s.spawn(move || {
                    for i in 0..100 {
                        a.append(t * 100 + i);
                    }
                });
            }
        });

        let mut seen = a.to_vec();
        seen.sort_unstable();
        assert_eq!(seen, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn concurrent_indexed_sets_land_in_place() {
        let a: SafeArray<Option<usize>> = SafeArray::with_size(1000);
        std::thread::scope(|s| {
            for t in 0..10 {
                let a = &a;
                s.spawn(move || {
                    for i in 0..100 {
                        let idx = t * 100 + i;
                        assert!(a.set(idx, Some(idx)));
                    }
                });
            }
        });

        for idx in 0..1000 {
            assert_eq!(a.get(idx), Some(Some(idx)));
        }
    }
}
