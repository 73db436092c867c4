// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logging macros: the compile-time half of the producer fast path
//
// Each call site gets a const-evaluated format identifier (level prefix
// baked into the literal), a Once-guarded registration, and a constant
// minimum-level gate. A sub-threshold call site expands to nothing.

#[doc(hidden)]
#[macro_export]
macro_rules! __count_one {
    ($arg:expr) => {
        1usize
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_impl {
    ($lvl:expr, $fmt:expr $(, $arg:expr)*) => {{
        const __ENABLED: bool = ($lvl as u8) >= ($crate::MIN_LEVEL as u8);
        if __ENABLED {
            const __FMT: &str = $fmt;
            const __ID: u32 = $crate::format_id(__FMT);
            const __ARGC: usize = 0usize $(+ $crate::__count_one!($arg))*;
            const _: () = ::std::assert!(
                __ARGC <= $crate::MAX_ARGS,
                "too many log arguments for one call site"
            );
            static __INTERN: ::std::sync::Once = ::std::sync::Once::new();
            __INTERN.call_once(|| $crate::__register(__ID, __FMT));
            let __args: [$crate::ArgSlot; __ARGC] = [$($crate::LogArg::as_slot(&$arg)),*];
            $crate::__log(__ID, &__args);
        }
    }};
}

/// Log at debug level
///
/// # Examples
/// ```ignore
/// log_debug!("worker iteration {}", i);
/// ```
#[macro_export]
macro_rules! log_debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__log_impl!($crate::Level::Debug, concat!("[DEBUG] ", $fmt) $(, $arg)*)
    };
}

/// Log at info level
///
/// # Examples
/// ```ignore
/// log_info!("listening on port {}", port);
/// ```
#[macro_export]
macro_rules! log_info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__log_impl!($crate::Level::Info, concat!("[INFO] ", $fmt) $(, $arg)*)
    };
}

/// Log at warning level
#[macro_export]
macro_rules! log_warn {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__log_impl!($crate::Level::Warning, concat!("[WARNING] ", $fmt) $(, $arg)*)
    };
}

/// Log at error level
#[macro_export]
macro_rules! log_error {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__log_impl!($crate::Level::Error, concat!("[ERROR] ", $fmt) $(, $arg)*)
    };
}

/// Log at an explicit level, named by its `Level` variant
///
/// # Examples
/// ```ignore
/// log!(Info, "rule {} added", rule_id);
/// ```
#[macro_export]
macro_rules! log {
    (Debug, $($rest:tt)+) => { $crate::log_debug!($($rest)+) };
    (Info, $($rest:tt)+) => { $crate::log_info!($($rest)+) };
    (Warning, $($rest:tt)+) => { $crate::log_warn!($($rest)+) };
    (Error, $($rest:tt)+) => { $crate::log_error!($($rest)+) };
}
