//! Kernel-style print macros
//!
//! Leveled, mutex-serialized diagnostic output to stderr.
//!
//! # Environment Variables
//!
//! - `ITH_LOG_LEVEL=<level>` - off, error, warn, info, debug (default: warn)
//! - `ITH_LOG_FLUSH=1` - flush stderr after every line (useful when
//!   debugging crashes)
//!
//! # Usage
//!
//! ```ignore
//! use ithread_core::{kerror, kwarn, kinfo, kdebug};
//!
//! kinfo!("worker {} started", id);
//! kwarn!("task panicked: {}", msg);
//! ```

use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Log levels, lowest to most verbose
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl LogLevel {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "[ERROR]",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Info => "[INFO] ",
            LogLevel::Debug => "[DEBUG]",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Ok(LogLevel::Off),
            "error" | "1" => Ok(LogLevel::Error),
            "warn" | "2" => Ok(LogLevel::Warn),
            "info" | "3" => Ok(LogLevel::Info),
            "debug" | "4" => Ok(LogLevel::Debug),
            _ => Err(()),
        }
    }
}

// Lazily initialized from the environment on first use.
const UNSET: u8 = u8::MAX;
static LEVEL: AtomicU8 = AtomicU8::new(UNSET);
static FLUSH: AtomicU8 = AtomicU8::new(UNSET);

/// Current log level (reads `ITH_LOG_LEVEL` on first call)
#[inline]
pub fn log_level() -> LogLevel {
    let v = LEVEL.load(Ordering::Relaxed);
    if v != UNSET {
        return LogLevel::from_u8(v);
    }
    let level = crate::env::env_get("ITH_LOG_LEVEL", LogLevel::Warn);
    LEVEL.store(level as u8, Ordering::Relaxed);
    level
}

/// Set the log level programmatically, overriding the environment
pub fn set_log_level(level: LogLevel) {
    LEVEL.store(level as u8, Ordering::Relaxed);
}

fn flush_enabled() -> bool {
    let v = FLUSH.load(Ordering::Relaxed);
    if v != UNSET {
        return v != 0;
    }
    let flush = crate::env::env_get_bool("ITH_LOG_FLUSH", false);
    FLUSH.store(flush as u8, Ordering::Relaxed);
    flush
}

/// Internal: leveled write, one locked line per call
#[doc(hidden)]
pub fn _klog_impl(level: LogLevel, args: std::fmt::Arguments<'_>) {
    if level == LogLevel::Off || level > log_level() {
        return;
    }
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = write!(handle, "{} ", level.prefix());
    let _ = handle.write_fmt(args);
    let _ = handle.write_all(b"\n");
    if flush_enabled() {
        let _ = handle.flush();
    }
}

/// Error level log
#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Error,
            format_args!($($arg)*)
        );
    }};
}

/// Warning level log
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Warn,
            format_args!($($arg)*)
        );
    }};
}

/// Info level log
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Info,
            format_args!($($arg)*)
        );
    }};
}

/// Debug level log (most verbose)
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Debug,
            format_args!($($arg)*)
        );
    }};
}
