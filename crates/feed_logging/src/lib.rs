#![deny(missing_docs)]
//! Shared logging utilities for the feed reader workspace.
//!
//! This crate provides the `feed_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every line is
//! prefixed with the store generation (`[g3]`) so results discarded after a
//! clear can be matched to the session they were started in.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[doc(hidden)]
pub use log as __log;

static STORE_GENERATION: AtomicU64 = AtomicU64::new(0);

/// Records the current store generation for subsequent log lines.
/// Called by the loop that owns the store after every update.
pub fn set_store_generation(generation: u64) {
    STORE_GENERATION.store(generation, Ordering::Relaxed);
}

/// Generation last recorded with [`set_store_generation`]; 0 before that.
pub fn store_generation() -> u64 {
    STORE_GENERATION.load(Ordering::Relaxed)
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! feed_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!("[g{}] {}", $crate::store_generation(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! feed_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!("[g{}] {}", $crate::store_generation(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! feed_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!("[g{}] {}", $crate::store_generation(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! feed_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!("[g{}] {}", $crate::store_generation(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! feed_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!("[g{}] {}", $crate::store_generation(), format_args!($($arg)*));
    }};
}

/// Milliseconds elapsed since `start`, for timing log lines.
pub fn elapsed_ms(start: Instant) -> u128 {
    start.elapsed().as_millis()
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::{set_store_generation, store_generation};

    #[test]
    fn generation_is_shared_across_threads() {
        set_store_generation(4);
        let seen = std::thread::spawn(store_generation).join().unwrap();
        assert_eq!(seen, 4);
        feed_info!("generation {} recorded", seen);
    }
}
