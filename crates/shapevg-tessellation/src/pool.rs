use std::cell::{Cell, RefCell};
use std::ops::Deref;

use rustc_hash::FxHashMap;

use crate::error::TessellationError;

/// A pool of reusable scratch buffers.
///
/// Buffers are bucketed by power-of-two capacity. A [`Lease`] hands its
/// storage back to the pool when it is dropped, so a buffer is returned on
/// every exit path of a tessellation call, including errors.
///
/// The pool is meant to be owned by one thread. See
/// [`with_shared_pools`](crate::with_shared_pools) for the per-thread instance.
pub struct BufferPool<T> {
    free: RefCell<FxHashMap<usize, Vec<Vec<T>>>>,
    leased: Cell<usize>,
}

impl<T> BufferPool<T> {
    pub fn new() -> Self {
        Self {
            free: RefCell::new(FxHashMap::default()),
            leased: Cell::new(0),
        }
    }

    /// Leases a buffer that accepts up to `capacity` records.
    pub fn acquire(&self, capacity: usize) -> Lease<'_, T> {
        let bucket = capacity.max(1).next_power_of_two();

        let storage = self
            .free
            .borrow_mut()
            .get_mut(&bucket)
            .and_then(Vec::pop)
            .unwrap_or_else(|| Vec::with_capacity(bucket));

        self.leased.set(self.leased.get() + 1);

        Lease {
            pool: self,
            storage,
            capacity,
            bucket,
        }
    }

    /// The number of leases that have not been dropped yet.
    pub fn outstanding_leases(&self) -> usize {
        self.leased.get()
    }

    /// The number of idle buffers kept for reuse.
    pub fn idle_buffers(&self) -> usize {
        self.free.borrow().values().map(Vec::len).sum()
    }

    fn give_back(&self, mut storage: Vec<T>, bucket: usize) {
        storage.clear();
        self.free.borrow_mut().entry(bucket).or_default().push(storage);
        self.leased.set(self.leased.get().saturating_sub(1));
    }
}

impl<T> Default for BufferPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for BufferPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("leased", &self.leased.get())
            .field("idle", &self.idle_buffers())
            .finish()
    }
}

/// A fixed-capacity buffer borrowed from a [`BufferPool`].
pub struct Lease<'a, T> {
    pool: &'a BufferPool<T>,
    storage: Vec<T>,
    capacity: usize,
    bucket: usize,
}

impl<'a, T> Lease<'a, T> {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a record and returns its position in the buffer.
    pub fn append(&mut self, item: T) -> Result<usize, TessellationError> {
        if self.storage.len() >= self.capacity {
            log::error!(
                "pooled buffer overflow: tried to append past {} records",
                self.capacity
            );
            return Err(TessellationError::BufferCapacityExceeded {
                capacity: self.capacity,
            });
        }

        self.storage.push(item);
        Ok(self.storage.len() - 1)
    }

    /// Gives the storage back to the pool. Same as dropping the lease.
    pub fn release(self) {}
}

impl<'a, T> Deref for Lease<'a, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.storage
    }
}

impl<'a, T> Drop for Lease<'a, T> {
    fn drop(&mut self) {
        let storage = std::mem::take(&mut self.storage);
        self.pool.give_back(storage, self.bucket);
    }
}

/// Wrap-around access to the records of a closed contour.
pub trait Circular<T> {
    /// Returns `(items[i % len], items[(i + len - 1) % len])`.
    ///
    /// # Panics
    ///
    /// Panics if the slice is empty.
    fn circular_pair(&self, i: usize) -> (&T, &T);

    /// Returns the previous, current and next records around `i`.
    ///
    /// # Panics
    ///
    /// Panics if the slice is empty.
    fn circular_trio(&self, i: usize) -> (&T, &T, &T);
}

impl<T> Circular<T> for [T] {
    fn circular_pair(&self, i: usize) -> (&T, &T) {
        let len = self.len();
        (&self[i % len], &self[(i + len - 1) % len])
    }

    fn circular_trio(&self, i: usize) -> (&T, &T, &T) {
        let len = self.len();
        (
            &self[(i + len - 1) % len],
            &self[i % len],
            &self[(i + 1) % len],
        )
    }
}
