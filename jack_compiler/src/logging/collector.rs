//! Per-file event collection with cargo-style output
//!
//! Batch runs process many files at once; the collector keeps each file's
//! events apart so the final report can be grouped by file.

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

// ============================================================================
// FILE PROCESSING CONTEXT
// ============================================================================

/// Context information for file processing
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.successful_files as f64 / self.total_files as f64
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

/// Thread-safe error collector for batch processing
pub struct ErrorCollector {
    /// Events organized by file path for cargo-style output
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    processing_start: Instant,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    /// Record an event for a file; past the per-file limit a single overflow
    /// warning is kept and further events are dropped
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = lock(&self.file_events);
        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        lock(&self.file_events)
            .get(file_path)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        lock(&self.file_events)
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        lock(&self.file_events).clone()
    }

    pub fn get_files_with_errors(&self) -> Vec<PathBuf> {
        lock(&self.file_events)
            .iter()
            .filter(|(_, events)| events.iter().any(|e| e.is_error()))
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = lock(&self.file_events);

        let mut summary = ProcessingSummary {
            total_files: events.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..Default::default()
        };

        for file_events in events.values() {
            if file_events.iter().any(|e| e.is_error()) {
                summary.failed_files += 1;
            } else {
                summary.successful_files += 1;
            }
            summary.total_errors += file_events.iter().filter(|e| e.is_error()).count();
            summary.total_warnings += file_events.iter().filter(|e| e.is_warning()).count();
        }

        summary
    }

    pub fn total_event_count(&self) -> usize {
        lock(&self.file_events).values().map(|v| v.len()).sum()
    }

    /// (current events, buffer size, fill ratio)
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let current = self.total_event_count();
        let ratio = if LOG_BUFFER_SIZE > 0 {
            current as f64 / LOG_BUFFER_SIZE as f64
        } else {
            0.0
        };
        (current, LOG_BUFFER_SIZE, ratio)
    }

    pub fn clear(&self) {
        lock(&self.file_events).clear();
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

fn location(file_path: &Path, event: &LogEvent) -> String {
    event
        .span
        .as_ref()
        .map(|s| {
            format!(
                " --> {}:{}:{}",
                file_path.display(),
                s.start().line,
                s.start().column
            )
        })
        .unwrap_or_default()
}

fn push_context(output: &mut String, event: &LogEvent) {
    let mut keys: Vec<&String> = event
        .context
        .keys()
        .filter(|k| k.as_str() != "file" && k.as_str() != "file_id")
        .collect();
    keys.sort();
    for key in keys {
        output.push_str(&format!("  = {}: {}\n", key, event.context[key]));
    }
}

/// Format errors and warnings grouped by file, cargo style
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let errors: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warnings: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();

        if errors.is_empty() && warnings.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));

        for event in errors {
            output.push_str(&format!(
                "error[{}]: {}{}\n",
                event.code.as_str(),
                event.message,
                location(file_path, event)
            ));
            output.push_str(&format!(
                "  = severity: {}, category: {}\n",
                event.severity(),
                event.category()
            ));
            push_context(&mut output, event);

            let action = event.recommended_action();
            if action != "No specific action available" {
                output.push_str(&format!("  = help: {}\n", action));
            }
        }

        for event in warnings {
            output.push_str(&format!(
                "warning[{}]: {}{}\n",
                event.code.as_str(),
                event.message,
                location(file_path, event)
            ));
            push_context(&mut output, event);
        }

        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

/// Per-file diagnostics when `cargo_style` is set, otherwise a one-line count
pub fn render_report(collector: &ErrorCollector, cargo_style: bool) -> String {
    if cargo_style {
        return format_cargo_style_errors(collector);
    }

    let summary = collector.get_summary();
    if summary.total_errors == 0 && summary.total_warnings == 0 {
        return String::new();
    }
    format!(
        "{} error(s), {} warning(s) in {} of {} file(s)\n",
        summary.total_errors, summary.total_warnings, summary.failed_files, summary.total_files
    )
}
