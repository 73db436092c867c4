// Lock-free single-producer single-consumer ring buffer
//
// The producer and consumer each keep a cached copy of the opposite
// counter so the common case touches only one shared cache line.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Cache-aligned wrapper to prevent false sharing
#[repr(align(64))]
struct CacheAligned<T>(T);

/// Lock-free single-producer single-consumer bounded queue.
///
/// One slot is reserved to distinguish full from empty, so a ring of
/// capacity `C` holds at most `C - 1` elements.
///
/// Only one thread may call [`enqueue`](Self::enqueue) and only one
/// thread may call [`dequeue`](Self::dequeue); the logger guarantees
/// this by giving each producer thread a private ring and running a
/// single consumer.
pub struct SpscRing<T> {
    /// Consumer-side counter; only the consumer stores it.
    head: CacheAligned<AtomicUsize>,
    /// Producer-side counter; only the producer stores it.
    tail: CacheAligned<AtomicUsize>,
    /// Producer's cached copy of `head`.
    head_cache: CacheAligned<UnsafeCell<usize>>,
    /// Consumer's cached copy of `tail`.
    tail_cache: CacheAligned<UnsafeCell<usize>>,
    cells: Box<[UnsafeCell<MaybeUninit<T>>]>,
    mask: usize,
}

// SAFETY: SpscRing is Sync because:
// - Only one thread writes `tail` and `head_cache` (the producer)
// - Only one thread writes `head` and `tail_cache` (the consumer)
// - A cell is written strictly before the release store of `tail` that
//   publishes it, and read strictly after the acquire load that observes
//   that store (symmetrically for `head`)
unsafe impl<T: Send> Sync for SpscRing<T> {}
unsafe impl<T: Send> Send for SpscRing<T> {}

impl<T> SpscRing<T> {
    /// Create a new ring.
    ///
    /// # Panics
    /// Panics if `capacity` is not a power of two or is below 2.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "capacity must be >= 2");
        assert!(capacity.is_power_of_two(), "capacity must be power of 2");

        let cells: Vec<UnsafeCell<MaybeUninit<T>>> = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();

        Self {
            head: CacheAligned(AtomicUsize::new(0)),
            tail: CacheAligned(AtomicUsize::new(0)),
            head_cache: CacheAligned(UnsafeCell::new(0)),
            tail_cache: CacheAligned(UnsafeCell::new(0)),
            cells: cells.into_boxed_slice(),
            mask: capacity - 1,
        }
    }

    /// Append an element (producer side only).
    ///
    /// Returns `false` without touching the element's slot when the ring
    /// is full. Never blocks, never allocates.
    pub fn enqueue(&self, item: T) -> bool {
        let tail = self.tail.0.load(Ordering::Relaxed);
        let next = (tail + 1) & self.mask;

        // SAFETY: only the producer touches head_cache.
        let head_cache = unsafe { &mut *self.head_cache.0.get() };
        if next == *head_cache {
            *head_cache = self.head.0.load(Ordering::Acquire);
            if next == *head_cache {
                return false; // full
            }
        }

        // SAFETY: the slot at `tail` is unreachable by the consumer until
        // the release store below, and any previous occupant was moved out
        // by a dequeue that advanced `head` past it.
        unsafe { (*self.cells[tail].get()).write(item) };
        self.tail.0.store(next, Ordering::Release);
        true
    }

    /// Remove the oldest element (consumer side only).
    ///
    /// Returns `None` when the ring is empty.
    pub fn dequeue(&self) -> Option<T> {
        let head = self.head.0.load(Ordering::Relaxed);

        // SAFETY: only the consumer touches tail_cache.
        let tail_cache = unsafe { &mut *self.tail_cache.0.get() };
        if head == *tail_cache {
            *tail_cache = self.tail.0.load(Ordering::Acquire);
            if head == *tail_cache {
                return None; // empty
            }
        }

        // SAFETY: head != tail, so the cell at `head` holds an initialized
        // element published by the producer's release store of `tail`.
        let item = unsafe { (*self.cells[head].get()).assume_init_read() };
        self.head.0.store((head + 1) & self.mask, Ordering::Release);
        Some(item)
    }

    /// Number of resident elements.
    ///
    /// Approximate while the other side is running; exact when the caller
    /// is the only user of either side.
    pub fn approx_size(&self) -> usize {
        let head = self.head.0.load(Ordering::Acquire);
        let tail = self.tail.0.load(Ordering::Acquire);
        (tail.wrapping_sub(head)) & self.mask
    }

    /// Check if the ring is empty
    pub fn is_empty(&self) -> bool {
        self.approx_size() == 0
    }

    /// Total slot count; usable capacity is one less.
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }
}

impl<T> Drop for SpscRing<T> {
    fn drop(&mut self) {
        // Drop every resident element exactly once.
        while self.dequeue().is_some() {}
    }
}
