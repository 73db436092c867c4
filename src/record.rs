// SPDX-License-Identifier: Apache-2.0 OR MIT
// Fixed-size log record and argument packing

/// Maximum number of placeholder arguments a single call site may carry.
/// Exceeding it is rejected at compile time by the logging macros.
pub const MAX_ARGS: usize = 8;

/// Borrowed view of string bytes (pointer + length, no copy).
///
/// The producer stores only the view; the bytes themselves are read by
/// the consumer when the record is formatted. The safe constructor
/// therefore accepts `&'static str` only. [`StrView::from_borrowed`] is
/// the escape hatch for non-static bytes and carries the lifetime
/// contract in its safety requirements.
#[derive(Clone, Copy, Debug)]
pub struct StrView {
    ptr: *const u8,
    len: usize,
}

// SAFETY: StrView is a read-only view of UTF-8 bytes that the caller
// guarantees outlive the format step (trivially true for the safe
// &'static str constructor). Sending the view to the consumer thread
// transfers no ownership.
unsafe impl Send for StrView {}

impl StrView {
    pub fn from_static(s: &'static str) -> Self {
        Self {
            ptr: s.as_ptr(),
            len: s.len(),
        }
    }

    /// Build a view of non-static bytes.
    ///
    /// # Safety
    /// The referenced bytes must stay valid and unmodified until the
    /// record has been formatted by the consumer; in practice that means
    /// until [`shutdown`](crate::shutdown) (or the owning logger's
    /// shutdown) has returned.
    pub unsafe fn from_borrowed(s: &str) -> Self {
        Self {
            ptr: s.as_ptr(),
            len: s.len(),
        }
    }

    /// # Safety
    /// Caller must uphold the lifetime contract of the constructor used.
    pub(crate) unsafe fn as_str<'a>(&self) -> &'a str {
        std::str::from_utf8_unchecked(std::slice::from_raw_parts(self.ptr, self.len))
    }
}

/// One packed argument.
///
/// Integers of every width travel as `U64` (signed values keep their
/// two's-complement bit pattern), floats widen to `F64`, strings travel
/// as a borrowed view.
#[derive(Clone, Copy, Debug)]
pub enum ArgSlot {
    U64(u64),
    F64(f64),
    Str(StrView),
}

/// Conversion into an [`ArgSlot`].
///
/// Implemented for the primitive integers, `f32`/`f64` and
/// `&'static str`; anything else fails to compile at the call site.
pub trait LogArg {
    fn as_slot(&self) -> ArgSlot;
}

macro_rules! impl_log_arg_unsigned {
    ($($ty:ty),*) => {
        $(impl LogArg for $ty {
            #[inline]
            fn as_slot(&self) -> ArgSlot {
                ArgSlot::U64(*self as u64)
            }
        })*
    };
}

macro_rules! impl_log_arg_signed {
    ($($ty:ty),*) => {
        $(impl LogArg for $ty {
            #[inline]
            fn as_slot(&self) -> ArgSlot {
                // Sign-extend, then keep the bit pattern.
                ArgSlot::U64(*self as i64 as u64)
            }
        })*
    };
}

impl_log_arg_unsigned!(u8, u16, u32, u64, usize);
impl_log_arg_signed!(i8, i16, i32, i64, isize);

impl LogArg for f32 {
    #[inline]
    fn as_slot(&self) -> ArgSlot {
        ArgSlot::F64(*self as f64)
    }
}

impl LogArg for f64 {
    #[inline]
    fn as_slot(&self) -> ArgSlot {
        ArgSlot::F64(*self)
    }
}

impl LogArg for &'static str {
    #[inline]
    fn as_slot(&self) -> ArgSlot {
        ArgSlot::Str(StrView::from_static(self))
    }
}

/// Fixed-layout record handed across the ring.
///
/// The producer copies at most `MAX_ARGS` slots; unused slots keep
/// whatever the initializer put there and are never read.
#[derive(Clone, Copy, Debug)]
pub struct Record {
    pub(crate) format_id: u32,
    pub(crate) arg_count: u8,
    pub(crate) args: [ArgSlot; MAX_ARGS],
}

impl Record {
    pub(crate) fn new(format_id: u32, args: &[ArgSlot]) -> Self {
        debug_assert!(args.len() <= MAX_ARGS);
        let count = args.len().min(MAX_ARGS);
        let mut slots = [ArgSlot::U64(0); MAX_ARGS];
        slots[..count].copy_from_slice(&args[..count]);
        Self {
            format_id,
            arg_count: count as u8,
            args: slots,
        }
    }

    pub(crate) fn format_id(&self) -> u32 {
        self.format_id
    }

    pub(crate) fn args(&self) -> &[ArgSlot] {
        &self.args[..self.arg_count as usize]
    }
}
