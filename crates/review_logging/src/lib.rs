#![deny(missing_docs)]
//! Shared logging utilities for the review client workspace.
//!
//! This crate provides the `review_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every message is
//! prefixed with a per-thread context label so that lines emitted by the UI
//! thread (labelled with the chapter under review) can be told apart from
//! lines emitted by the engine runtime.

use std::cell::RefCell;

thread_local! {
    /// Thread-local context label prepended to every `review_*` log line.
    static CONTEXT: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Sets the context label for the current thread.
pub fn set_context(label: impl Into<String>) {
    let label = label.into();
    CONTEXT.with(|v| *v.borrow_mut() = label);
}

/// Returns the context label for the current thread, or `-` if none was set.
pub fn context() -> String {
    CONTEXT.with(|v| {
        let label = v.borrow();
        if label.is_empty() {
            "-".to_string()
        } else {
            label.clone()
        }
    })
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! review_trace {
    ($($arg:tt)*) => {{
        log::trace!("[{}] {}", $crate::context(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! review_info {
    ($($arg:tt)*) => {{
        log::info!("[{}] {}", $crate::context(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! review_debug {
    ($($arg:tt)*) => {{
        log::debug!("[{}] {}", $crate::context(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! review_warn {
    ($($arg:tt)*) => {{
        log::warn!("[{}] {}", $crate::context(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! review_error {
    ($($arg:tt)*) => {{
        log::error!("[{}] {}", $crate::context(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

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
