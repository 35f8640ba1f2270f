#![deny(missing_docs)]
//! Shared logging utilities for the codewall workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! a per-thread display frame counter for correlating animation-loop output,
//! and a minimal test initializer for the global logger.

use std::cell::Cell;

thread_local! {
    /// Thread-local storage for the frame most recently rendered on this thread.
    static DISPLAY_FRAME: Cell<u64> = const { Cell::new(0) };
}

/// Records the display frame number for the current thread.
/// The animation loop calls this once per rendered frame.
pub fn set_display_frame(frame: u64) {
    DISPLAY_FRAME.with(|v| v.set(frame));
}

/// Retrieves the display frame number for the current thread.
/// Returns 0 on threads that never rendered a frame.
pub fn display_frame() -> u64 {
    DISPLAY_FRAME.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Logs a trace-level message tagged with the current thread's display frame.
#[macro_export]
macro_rules! engine_frame_trace {
    ($($arg:tt)*) => {{
        log::trace!("[frame {}] {}", $crate::display_frame(), format_args!($($arg)*));
    }};
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
    use super::{display_frame, set_display_frame};

    #[test]
    fn frame_counter_is_per_thread() {
        set_display_frame(42);
        assert_eq!(display_frame(), 42);

        let other = std::thread::spawn(display_frame).join().unwrap();
        assert_eq!(other, 0);
    }
}
