use std::collections::VecDeque;

use parking_lot::Mutex;

/// Mutex-guarded bounded FIFO queue.
///
/// `push` on a full queue hands the item back instead of blocking.
#[derive(Debug)]
pub struct SafeQueue<T> {
    items: Mutex<VecDeque<T>>,
    capacity: usize,
}

impl<T> SafeQueue<T> {
    /// Creates a queue holding at most `capacity` items (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Enqueues `item`, or returns it as `Err` when the queue is full.
    pub fn push(&self, item: T) -> Result<(), T> {
        let mut items = self.items.lock();
        if items.len() >= self.capacity {
            return Err(item);
        }
        items.push_back(item);
        Ok(())
    }

    /// Dequeues the oldest item.
    pub fn pull(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
