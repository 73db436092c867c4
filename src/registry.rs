// Lock-free format-string registry
//
// Open-addressed table keyed by the 32-bit format identifier. Slots are
// claimed with a single CAS on the key; the pointer is published last so
// readers never observe a torn entry.

use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicU32, AtomicUsize, Ordering};
use thiserror::Error;

/// Errors surfaced by format registration.
///
/// Both kinds are configuration bugs: the table was sized too small for
/// the program's call-site count, or two distinct literals hashed to the
/// same identifier. The macro registration path treats them as fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("format registry is full (capacity {capacity})")]
    Full { capacity: usize },

    #[error("format id {id:#010x} collides: {existing:?} vs {new:?}")]
    Collision {
        id: u32,
        existing: &'static str,
        new: &'static str,
    },
}

/// One table slot. `key == 0` means empty.
#[derive(Debug)]
struct Slot {
    key: AtomicU32,
    ptr: AtomicPtr<u8>,
    len: AtomicUsize,
}

/// Append-only map from format identifier to the literal's bytes.
///
/// The registry never owns or copies the bytes; entries point into
/// `'static` string data and are stable once published.
#[derive(Debug)]
pub struct FormatRegistry {
    slots: Box<[Slot]>,
    mask: usize,
}

impl FormatRegistry {
    /// # Panics
    /// Panics if `capacity` is not a power of two.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity.is_power_of_two(), "capacity must be power of 2");

        let slots: Vec<Slot> = (0..capacity)
            .map(|_| Slot {
                key: AtomicU32::new(0),
                ptr: AtomicPtr::new(ptr::null_mut()),
                len: AtomicUsize::new(0),
            })
            .collect();

        Self {
            slots: slots.into_boxed_slice(),
            mask: capacity - 1,
        }
    }

    /// Register `literal` under `id`. Idempotent for a given id.
    ///
    /// Linear-probes from `id & mask`. The first empty slot is claimed
    /// with a CAS on the key; the length is stored before the pointer and
    /// the pointer store carries release ordering, so a reader that
    /// observes the pointer also observes the length.
    pub fn register(&self, id: u32, literal: &'static str) -> Result<(), RegistryError> {
        debug_assert_ne!(id, 0, "0 is the empty-slot sentinel");

        let mut index = (id as usize) & self.mask;
        for _ in 0..self.slots.len() {
            let slot = &self.slots[index];
            match slot
                .key
                .compare_exchange(0, id, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    slot.len.store(literal.len(), Ordering::Relaxed);
                    slot.ptr.store(literal.as_ptr() as *mut u8, Ordering::Release);
                    return Ok(());
                }
                Err(found) if found == id => {
                    // The id is already claimed. The winner publishes its
                    // pointer right after the CAS; wait it out so a racing
                    // collision cannot slip through as success.
                    let existing = loop {
                        if let Some(existing) = Self::slot_literal(slot) {
                            break existing;
                        }
                        std::hint::spin_loop();
                    };
                    return if existing == literal {
                        Ok(())
                    } else {
                        Err(RegistryError::Collision {
                            id,
                            existing,
                            new: literal,
                        })
                    };
                }
                Err(_) => index = (index + 1) & self.mask,
            }
        }

        Err(RegistryError::Full {
            capacity: self.slots.len(),
        })
    }

    /// Resolve an identifier to its literal.
    ///
    /// Probing stops at the first empty slot. A matching key whose
    /// pointer is momentarily null (registration in progress) is retried
    /// once, then reported as absent.
    pub fn lookup(&self, id: u32) -> Option<&'static str> {
        let mut index = (id as usize) & self.mask;
        for _ in 0..self.slots.len() {
            let slot = &self.slots[index];
            match slot.key.load(Ordering::Acquire) {
                0 => return None,
                key if key == id => {
                    let literal = Self::slot_literal(slot);
                    if literal.is_some() {
                        return literal;
                    }
                    std::hint::spin_loop();
                    return Self::slot_literal(slot);
                }
                _ => index = (index + 1) & self.mask,
            }
        }
        None
    }

    fn slot_literal(slot: &Slot) -> Option<&'static str> {
        let ptr = slot.ptr.load(Ordering::Acquire);
        if ptr.is_null() {
            return None;
        }
        let len = slot.len.load(Ordering::Relaxed);
        // SAFETY: (ptr, len) were taken from a &'static str and published
        // with release ordering after the length store; the acquire load
        // above makes both visible.
        Some(unsafe { std::str::from_utf8_unchecked(std::slice::from_raw_parts(ptr, len)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_register_then_lookup() {
        let registry = FormatRegistry::new(64);
        registry.register(42, "[INFO] hello {}").unwrap();
        assert_eq!(registry.lookup(42), Some("[INFO] hello {}"));
    }

    #[test]
    fn test_lookup_missing_is_none() {
        let registry = FormatRegistry::new(64);
        assert_eq!(registry.lookup(7), None);
        registry.register(42, "[INFO] x").unwrap();
        assert_eq!(registry.lookup(7), None);
    }

    #[test]
    fn test_registration_is_idempotent() {
        let registry = FormatRegistry::new(64);
        registry.register(42, "[INFO] once").unwrap();
        registry.register(42, "[INFO] once").unwrap();
        assert_eq!(registry.lookup(42), Some("[INFO] once"));
    }

    #[test]
    fn test_write_once_collision_detected() {
        let registry = FormatRegistry::new(64);
        registry.register(42, "[INFO] first").unwrap();
        let err = registry.register(42, "[INFO] second").unwrap_err();
        assert!(matches!(err, RegistryError::Collision { id: 42, .. }));
        // The stored bytes did not change.
        assert_eq!(registry.lookup(42), Some("[INFO] first"));
    }

    #[test]
    fn test_probing_past_occupied_slots() {
        let registry = FormatRegistry::new(8);
        // 1 and 9 both land on slot 1; 17 lands there too.
        registry.register(1, "[INFO] a").unwrap();
        registry.register(9, "[INFO] b").unwrap();
        registry.register(17, "[INFO] c").unwrap();
        assert_eq!(registry.lookup(1), Some("[INFO] a"));
        assert_eq!(registry.lookup(9), Some("[INFO] b"));
        assert_eq!(registry.lookup(17), Some("[INFO] c"));
    }

    #[test]
    fn test_full_table_reported() {
        let registry = FormatRegistry::new(2);
        registry.register(1, "[INFO] a").unwrap();
        registry.register(2, "[INFO] b").unwrap();
        let err = registry.register(3, "[INFO] c").unwrap_err();
        assert_eq!(err, RegistryError::Full { capacity: 2 });
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(FormatRegistry::new(256));
        let mut handles = vec![];
        for _ in 0..4 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                // Several threads race on the same ids with the same
                // literal; every registration must succeed.
                for i in 1..=32u32 {
                    registry.register(i, "[DEBUG] shared").unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        for i in 1..=32u32 {
            assert_eq!(registry.lookup(i), Some("[DEBUG] shared"));
        }
    }
}
