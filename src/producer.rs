// Per-thread producer state and the enqueue fast path
//
// Each producing thread owns the write side of a private SPSC ring. The
// ring lives in a heap node that is CAS-pushed onto an intrusive list the
// consumer walks; nodes are never unlinked, only marked inactive when
// the owning thread exits.

use crate::config::BackpressurePolicy;
use crate::record::{ArgSlot, Record};
use crate::ring::SpscRing;
use std::cell::OnceCell;
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicPtr, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

pub(crate) struct ProducerNode {
    pub(crate) ring: SpscRing<Record>,
    /// True until the owning thread's TLS handle drops. Transitions
    /// true -> false exactly once.
    pub(crate) active: AtomicBool,
    /// Records rejected under the Drop policy.
    pub(crate) dropped: AtomicU64,
    next: AtomicPtr<ProducerNode>,
}

/// Intrusive append-only list of producer nodes.
///
/// Push-front with CAS; node addresses are stable for the life of the
/// list, so the single consumer can walk raw pointers without
/// synchronization beyond the acquire load of the head.
#[derive(Debug)]
pub(crate) struct ProducerList {
    head: AtomicPtr<ProducerNode>,
}

impl ProducerList {
    pub(crate) fn new() -> Self {
        Self {
            head: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Allocate a node with a fresh ring and link it at the front.
    pub(crate) fn push(&self, ring_capacity: usize) -> *const ProducerNode {
        let node = Box::into_raw(Box::new(ProducerNode {
            ring: SpscRing::new(ring_capacity),
            active: AtomicBool::new(true),
            dropped: AtomicU64::new(0),
            next: AtomicPtr::new(ptr::null_mut()),
        }));

        let mut head = self.head.load(Ordering::Relaxed);
        loop {
            // SAFETY: `node` is freshly allocated and unpublished.
            unsafe { (*node).next.store(head, Ordering::Relaxed) };
            match self
                .head
                .compare_exchange_weak(head, node, Ordering::Release, Ordering::Relaxed)
            {
                Ok(_) => return node,
                Err(current) => head = current,
            }
        }
    }

    /// Walk the list in push order (most recent first).
    pub(crate) fn iter(&self) -> impl Iterator<Item = &ProducerNode> + '_ {
        let mut current = self.head.load(Ordering::Acquire);
        std::iter::from_fn(move || {
            if current.is_null() {
                return None;
            }
            // SAFETY: nodes are heap-allocated, never unlinked, and freed
            // only when the list itself drops; the list outlives this
            // borrow.
            let node = unsafe { &*current };
            current = node.next.load(Ordering::Relaxed);
            Some(node)
        })
    }
}

impl Drop for ProducerList {
    fn drop(&mut self) {
        let mut current = self.head.load(Ordering::Relaxed);
        while !current.is_null() {
            // SAFETY: exclusive access during drop; each node was created
            // by Box::into_raw in push().
            let node = unsafe { Box::from_raw(current) };
            current = node.next.load(Ordering::Relaxed);
        }
    }
}

/// Write side of one thread's private ring.
///
/// Obtained from [`Logger::handle`](crate::Logger::handle) (or lazily
/// through the logging macros). Dropping it marks the node inactive; the
/// consumer drains whatever is left and then skips the node.
pub struct ProducerHandle {
    node: *const ProducerNode,
    core: Arc<crate::logger::Core>,
}

// SAFETY: a handle may move between threads, but it is not Sync, so at
// any moment exactly one thread can reach the ring's write side. That is
// the whole SPSC contract; the node itself is kept alive by `core`.
unsafe impl Send for ProducerHandle {}

impl ProducerHandle {
    pub(crate) fn new(node: *const ProducerNode, core: Arc<crate::logger::Core>) -> Self {
        Self { node, core }
    }

    /// Pack `args` into a record and enqueue it under the configured
    /// backpressure policy. The only failure mode is a silent, counted
    /// drop.
    #[inline]
    pub fn log(&self, format_id: u32, args: &[ArgSlot]) {
        let record = Record::new(format_id, args);
        // SAFETY: the node outlives the handle (kept alive by `core`).
        let node = unsafe { &*self.node };

        match self.core.config.policy {
            BackpressurePolicy::Drop => {
                let mut attempts = self.core.config.enqueue_retries;
                loop {
                    if node.ring.enqueue(record) {
                        return;
                    }
                    attempts -= 1;
                    if attempts == 0 {
                        node.dropped.fetch_add(1, Ordering::Relaxed);
                        return;
                    }
                    thread::yield_now();
                }
            }
            BackpressurePolicy::Block => {
                while !node.ring.enqueue(record) {
                    thread::yield_now();
                }
            }
        }
    }

    /// Records this thread has dropped under the Drop policy.
    pub fn dropped(&self) -> u64 {
        // SAFETY: see log().
        unsafe { &*self.node }.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for ProducerHandle {
    fn drop(&mut self) {
        // SAFETY: see log(). Release pairs with the consumer's acquire so
        // everything enqueued before the flag flip is visible first.
        unsafe { &*self.node }.active.store(false, Ordering::Release);
    }
}

thread_local! {
    static TLS_PRODUCER: OnceCell<ProducerHandle> = const { OnceCell::new() };
}

/// Macro entry point: enqueue on the calling thread's ring, creating and
/// registering the ring on first use.
#[doc(hidden)]
pub fn log_current_thread(format_id: u32, args: &[ArgSlot]) {
    // try_with: a log call from another TLS destructor after this slot is
    // gone is silently discarded.
    let _ = TLS_PRODUCER.try_with(|cell| {
        let handle = cell.get_or_init(|| crate::logger::global().handle());
        handle.log(format_id, args);
    });
}
