#![deny(missing_docs)]
//! Shared logging utilities for the game-init workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every record is
//! prefixed with the UI tick it was emitted on, so interleaved engine and UI
//! output can be lined up afterwards.

use std::sync::atomic::{AtomicU64, Ordering};

#[doc(hidden)]
pub use log as __log;

/// Tick counter of the UI loop. Engine threads read it too, hence atomic.
static UI_TICK: AtomicU64 = AtomicU64::new(0);

/// Sets the current UI tick.
/// This should be called by the UI loop once per tick.
pub fn set_ui_tick(tick: u64) {
    UI_TICK.store(tick, Ordering::Relaxed);
}

/// Retrieves the current UI tick.
/// Returns 0 if the loop has not started ticking yet.
pub fn ui_tick() -> u64 {
    UI_TICK.load(Ordering::Relaxed)
}

/// Logs a trace-level message, stamped with the UI tick.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!("[t{}] {}", $crate::ui_tick(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message, stamped with the UI tick.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!("[t{}] {}", $crate::ui_tick(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message, stamped with the UI tick.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!("[t{}] {}", $crate::ui_tick(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message, stamped with the UI tick.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!("[t{}] {}", $crate::ui_tick(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message, stamped with the UI tick.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!("[t{}] {}", $crate::ui_tick(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
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
