//! Logging macros for ergonomic log message formatting.
//!
//! The level macros format their message like `format!`, record the call site,
//! and skip formatting entirely when the logger's sink rejects the level.
//! Write errors are reported to stderr.
//!
//! # Examples
//!
//! ```
//! use rust_telegram_logger::prelude::*;
//! use rust_telegram_logger::{fields, warn};
//!
//! let logger = Logger::new(ConsoleSink::new(LogLevel::Info).with_colors(false));
//!
//! let retries = 3;
//! warn!(logger, "upstream timed out after {} retries", retries);
//!
//! let fields = fields! { "upstream" => "payments", "retries" => retries };
//! logger.log(LogLevel::Error, "giving up", &fields).ok();
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_telegram_logger::prelude::*;
/// # let logger = Logger::new(ConsoleSink::new(LogLevel::Debug));
/// use rust_telegram_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let level: $crate::LogLevel = $level;
        let logger = &$logger;
        if logger.enabled(level) {
            let caller = $crate::Caller::new(file!(), line!()).with_module_path(module_path!());
            if let Err(e) = logger.log_at(level, format!($($arg)+), &[], Some(caller)) {
                eprintln!("[TELEGRAM LOGGER ERROR] failed to write {} entry: {}", level, e);
            }
        }
    }};
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_telegram_logger::prelude::*;
/// # let logger = Logger::new(ConsoleSink::new(LogLevel::Debug));
/// use rust_telegram_logger::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message. Does not exit the process.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

/// Build an ordered `Vec<Field>` from `key => value` pairs.
///
/// # Examples
///
/// ```
/// use rust_telegram_logger::{fields, Field};
///
/// let fields = fields! { "user" => "alice", "attempt" => 2 };
/// assert_eq!(fields, vec![Field::new("user", "alice"), Field::new("attempt", 2)]);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        ::std::vec::Vec::<$crate::Field>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        vec![$($crate::Field::new($key, $value)),+]
    };
}
