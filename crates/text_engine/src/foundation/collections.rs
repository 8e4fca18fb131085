//! Specialized collection types

/// Objects that can be returned to a [`Pool`]
///
/// `reset` runs when the object is released so that stale geometry never
/// leaks into the next user.
pub trait Poolable {
    /// Clear per-use state before the object is stored for reuse
    fn reset(&mut self);
}

/// Fixed-capacity free list for object pooling
///
/// Acquiring from an empty pool hands out `None`, leaving allocation to the
/// caller; releasing into a full pool drops the object.
#[derive(Debug)]
pub struct Pool<T: Poolable> {
    free: Vec<T>,
    capacity: usize,
}

impl<T: Poolable> Pool<T> {
    /// Create an empty pool that keeps at most `capacity` objects
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Take a pooled object if one is available
    pub fn acquire(&mut self) -> Option<T> {
        self.free.pop()
    }

    /// Take a pooled object or build a fresh one
    pub fn acquire_or_else(&mut self, create: impl FnOnce() -> T) -> T {
        self.free.pop().unwrap_or_else(create)
    }

    /// Return an object to the pool
    ///
    /// Returns `false` when the pool was full and the object was discarded.
    pub fn release(&mut self, mut item: T) -> bool {
        if self.free.len() >= self.capacity {
            return false;
        }
        item.reset();
        self.free.push(item);
        true
    }

    /// Number of objects waiting for reuse
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Whether the pool has no objects waiting
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Maximum number of objects kept
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
