//! Ring Buffer Implementation

/// Fixed-capacity ring buffer, overwrites oldest when full
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Pre-allocated storage
    storage: Vec<T>,
    /// Capacity of the buffer
    capacity: usize,
    /// Next write position once the buffer is full
    head: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer with given capacity
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            storage: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Push an item (overwrites oldest if full)
    pub fn push(&mut self, item: T) {
        if self.storage.len() < self.capacity {
            self.storage.push(item);
        } else {
            self.storage[self.head] = item;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Number of items currently held
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.storage.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let (newer, older) = self.storage.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.storage.clear();
        self.head = 0;
    }
}
