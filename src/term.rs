//! Terminal diagnostics

use colored::*;

/// Print an error message to stderr
pub fn print_error(text: &str) {
    eprintln!("{} {}", "error:".red().bold(), text);
}

/// Print a warning message to stderr
pub fn print_warning(text: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), text);
}
