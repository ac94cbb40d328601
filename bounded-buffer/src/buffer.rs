//! Fixed-capacity circular buffer with blocking put/get.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::{Closed, Error};

/// Slot array and cursors. Only ever touched with the buffer lock held.
struct Ring<T> {
    slots: Vec<Option<T>>,
    write: usize,
    read: usize,
    count: usize,
    closed: bool,
}

/// A blocking FIFO queue holding at most `capacity` items.
///
/// All state lives behind a single mutex. Producers wait on `not_full`,
/// consumers on `not_empty`; both waits re-check their predicate after
/// every wakeup.
///
/// # Termination
///
/// Once [`close`](Self::close) has been called, [`get`](Self::get) keeps
/// handing out the items already buffered and then returns `None` instead of
/// blocking. A consumer therefore never waits forever for data that will not
/// arrive.
///
/// # Example
///
/// ```
/// use bounded_buffer::BoundedBuffer;
///
/// let buffer = BoundedBuffer::new(2).unwrap();
/// buffer.put("a").unwrap();
/// buffer.put("b").unwrap();
/// buffer.close();
///
/// assert_eq!(buffer.get(), Some("a"));
/// assert_eq!(buffer.get(), Some("b"));
/// assert_eq!(buffer.get(), None);
/// ```
pub struct BoundedBuffer<T> {
    inner: Mutex<Ring<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    /// Creates an empty buffer with room for `capacity` items.
    ///
    /// Slot storage is reserved up front; an allocation failure is reported
    /// as [`Error::Allocation`] rather than aborting the process.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|source| Error::Allocation { capacity, source })?;
        slots.resize_with(capacity, || None);

        Ok(Self {
            inner: Mutex::new(Ring {
                slots,
                write: 0,
                read: 0,
                count: 0,
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
        })
    }

    /// Inserts `item`, blocking while the buffer is full.
    ///
    /// Fails only if the buffer is closed, in which case the item is handed
    /// back inside [`Closed`].
    pub fn put(&self, item: T) -> Result<(), Closed<T>> {
        let ring = self.lock();
        let mut ring = self
            .not_full
            .wait_while(ring, |r| r.count == self.capacity && !r.closed)
            .unwrap_or_else(PoisonError::into_inner);

        if ring.closed {
            return Err(Closed(item));
        }

        let at = ring.write;
        ring.slots[at] = Some(item);
        ring.write = (at + 1) % self.capacity;
        ring.count += 1;
        drop(ring);

        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the oldest item, blocking while the buffer is empty.
    ///
    /// Returns `None` once the buffer is both empty and closed.
    pub fn get(&self) -> Option<T> {
        let ring = self.lock();
        let mut ring = self
            .not_empty
            .wait_while(ring, |r| r.count == 0 && !r.closed)
            .unwrap_or_else(PoisonError::into_inner);

        if ring.count == 0 {
            return None;
        }

        let at = ring.read;
        let item = ring.slots[at].take();
        debug_assert!(item.is_some(), "occupied slot {at} was empty");
        ring.read = (at + 1) % self.capacity;
        ring.count -= 1;
        drop(ring);

        self.not_full.notify_one();
        item
    }

    /// Marks the buffer as finished: no further puts are accepted and
    /// every blocked caller is woken. Calling it again is a no-op.
    pub fn close(&self) {
        let mut ring = self.lock();
        if ring.closed {
            return;
        }
        ring.closed = true;
        let remaining = ring.count;
        drop(ring);

        debug!(remaining, "bounded buffer closed");
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently held.
    pub fn len(&self) -> usize {
        self.lock().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    // Ring state is only mutated in panic-free sections, so a poisoned lock
    // still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
