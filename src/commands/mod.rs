pub mod completions;
pub mod config;
pub mod export;
pub mod harness;
pub mod skill;
pub mod validate;

use colored::*;
use eyre::{Context, Result};
use std::future::Future;

/// Run an async export step to completion on a fresh runtime
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

/// Print warnings to stderr
pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {}", "⚠".yellow(), warning);
    }
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f < KB {
        format!("{} B", bytes)
    } else if bytes_f < KB * KB {
        format!("{:.1} KB", bytes_f / KB)
    } else {
        format!("{:.1} MB", bytes_f / (KB * KB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_block_on() {
        assert_eq!(block_on(async { 7 }).unwrap(), 7);
    }
}
