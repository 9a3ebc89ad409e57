// src/utils/report.rs

//! Console report lines for the CLI.
//!
//! Library code logs through the `log` facade. These helpers are for
//! user-facing output (headers, progress, summaries) and go to stderr so
//! stdout stays clean for JSON results.

use std::sync::OnceLock;

use chrono::Local;

use crate::models::LoadingProgress;

static QUIET: OnceLock<bool> = OnceLock::new();

/// Suppress all report output (set once, at startup).
pub fn set_quiet(quiet: bool) {
    let _ = QUIET.set(quiet);
}

fn enabled() -> bool {
    !QUIET.get().copied().unwrap_or(false)
}

fn format_line(tag: &str, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, tag, message)
}

fn emit(tag: &str, message: &str) {
    if enabled() {
        eprintln!("{}", format_line(tag, message));
    }
}

pub fn header(title: &str) {
    let border = "═".repeat(60);
    emit("INFO", &border);
    emit("INFO", &format!("  {}", title));
    emit("INFO", &border);
}

pub fn info(message: &str) {
    emit("INFO", message);
}

pub fn warn(message: &str) {
    emit("WARN", message);
}

/// One crawl progress line with a text bar.
pub fn progress(progress: &LoadingProgress) {
    emit("CRAWL", &progress_line(progress));
}

fn progress_line(progress: &LoadingProgress) -> String {
    const WIDTH: usize = 30;
    let filled = (usize::from(progress.percentage) * WIDTH / 100).min(WIDTH);
    format!(
        "[{}{}] {:>3}% ({}/{} pages)",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        progress.percentage,
        progress.current,
        progress.total
    )
}

pub fn summary(title: &str, items: &[(&str, String)]) {
    if !enabled() {
        return;
    }
    eprintln!();
    emit("SUMMARY", title);
    for (key, value) in items {
        emit("SUMMARY", &format!("    {}: {}", key, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_line() {
        let line = progress_line(&LoadingProgress::new(500, 1000));
        assert!(line.starts_with("[###############---------------]"));
        assert!(line.ends_with(" 50% (500/1000 pages)"));

        let full = progress_line(&LoadingProgress::new(1200, 1000));
        assert!(full.contains("100%"));
        assert!(!full.contains('-'));
    }

    #[test]
    fn test_format_line_tags() {
        let line = format_line("WARN", "snapshot missing");
        assert!(line.ends_with("[WARN] snapshot missing"));
        assert!(line.starts_with('['));
    }
}
