//! Performance profiling utilities
//!
//! Both helpers only emit anything when the `perf_stats` feature is enabled.
//! Zero overhead when disabled.

// Re-export the profile macro
pub use peregrine_macros::profile;

/// Log a message every 100 ticks when the perf_stats feature is enabled.
///
/// `$tick` is any `u64` counter: a simulation tick, or the number of jobs a
/// scheduler has executed. When the perf_stats feature is disabled this
/// expands to an empty block and the arguments are never evaluated.
///
/// # Example
/// ```
/// let tick: u64 = 200;
/// peregrine_kernel::profile_log!(tick, "Resolved {} contacts", 17);
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {
        if $tick % 100 == 0 {
            ::tracing::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {};
}
