//! Structured event log and its reporter.

pub mod logger;
pub mod reporter;

use colored::Colorize;

/// Print a non-fatal warning to stderr.
pub fn warn(message: &str) {
    eprintln!("{} {}", "[loginscope]".yellow().bold(), message);
}
