//! Global logging for the Jack compiler
//!
//! Thread-safe global logging with per-file context for batch runs,
//! cargo-style error reporting and a macro interface. Every macro is a
//! no-op until `init_global_logging` installs a service, so the tokenizer
//! and parser can be used as a plain library.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

// Re-export main types
pub use codes::Code;
pub use collector::{ErrorCollector, FileProcessingContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileProcessingContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());
    init_global_logging_with_service(logging_service.clone())?;

    for code in ["ERR001", "E005", "E020", "E050", "E060"] {
        if codes::get_description(code) == "Unknown error" {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())?;

    GLOBAL_ERROR_COLLECTOR
        .set(Arc::new(ErrorCollector::new()))
        .map_err(|_| "Global error collector already initialized".to_string())?;

    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some() && GLOBAL_ERROR_COLLECTOR.get().is_some()
}

// ============================================================================
// GLOBAL ACCESS
// ============================================================================

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

// ============================================================================
// FILE CONTEXT MANAGEMENT
// ============================================================================

/// Set file context for current thread
pub fn set_file_context(file_path: PathBuf, file_id: usize) {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(FileProcessingContext::new(file_path, file_id));
    });
}

/// Clear file context for current thread
pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with the file context set, restoring the previous context afterwards
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ContextGuard {
        previous: get_current_file_context(),
    };
    set_file_context(file_path, file_id);
    f()
}

/// Puts the previous file context back on drop, including during unwinding
struct ContextGuard {
    previous: Option<FileProcessingContext>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        FILE_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = previous;
        });
    }
}

/// Route all events to one shared memory logger for the rest of the test run
#[cfg(test)]
pub(crate) fn install_test_logging() -> Arc<MemoryLogger> {
    static MEMORY: OnceLock<Arc<MemoryLogger>> = OnceLock::new();
    MEMORY
        .get_or_init(|| {
            let memory = Arc::new(MemoryLogger::new());
            let service = LoggingService::new(memory.clone(), LogLevel::Debug);
            init_global_logging_with_service(Arc::new(service))
                .expect("no other test installs a global logger");
            memory
        })
        .clone()
}

/// Get current file context (used by macros)
pub fn get_current_file_context() -> Option<FileProcessingContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn attach(mut event: LogEvent, span: Option<crate::utils::Span>, context: Vec<(&str, &str)>) -> LogEvent {
    if let Some(s) = span {
        event = event.with_span(s);
    }

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if config::include_file_context() {
        if let Some(file_ctx) = get_current_file_context() {
            event = event.with_context("file", &file_ctx.file_path.display().to_string());
            event = event.with_context("file_id", &file_ctx.file_id.to_string());
        }
    }

    event
}

/// Log the event and, for errors and warnings, record it against the current file
fn dispatch(event: LogEvent) {
    let collect = event.is_error() || event.is_warning();

    if collect {
        if let (Some(file_ctx), Some(collector)) =
            (get_current_file_context(), try_get_global_error_collector())
        {
            collector.record_event(&file_ctx.file_path, event.clone());
        }
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Backend of `log_error!`
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    dispatch(attach(LogEvent::error(code, message), span, context));
}

/// Backend of `log_success!`
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(attach(LogEvent::success(code, message), None, context));
}

/// Backend of `log_info!`
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(attach(LogEvent::info(message), None, context));
}

/// Backend of `log_warning!`
pub fn log_warning_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(attach(LogEvent::warning(message), None, context));
}

/// Backend of `log_debug!`
pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(attach(LogEvent::debug(message), None, context));
}

// ============================================================================
// BATCH REPORTING
// ============================================================================

pub fn get_file_errors(file_path: &Path) -> Vec<LogEvent> {
    try_get_global_error_collector()
        .map(|collector| collector.get_file_errors(file_path))
        .unwrap_or_default()
}

/// Print collected diagnostics to stderr, cargo-style unless disabled
pub fn print_cargo_style_summary() {
    if let Some(collector) = try_get_global_error_collector() {
        let report = collector::render_report(collector, config::use_cargo_style_output());
        if !report.is_empty() {
            eprint!("{}", report);
        }
    }
}

pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::new();

    diagnostics.push_str("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));

    if let Some(collector) = try_get_global_error_collector() {
        let (current, max, ratio) = collector.get_capacity_info();
        diagnostics.push_str(&format!(
            "Capacity: {}/{} ({:.1}%)\n",
            current,
            max,
            ratio * 100.0
        ));

        let summary = collector.get_summary();
        diagnostics.push_str(&format!("Files processed: {}\n", summary.total_files));
        diagnostics.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }

    diagnostics.push('\n');
    diagnostics.push_str(&config::get_config_summary());

    diagnostics
}

/// Error logging that falls back to stderr when uninitialized
pub fn safe_log_error(code: Code, message: &str) {
    match try_get_global_logger() {
        Some(logger) => logger.log_event(LogEvent::error(code, message)),
        None => eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_context_management() {
        let file_path = PathBuf::from("Main.jack");

        assert!(get_current_file_context().is_none());

        set_file_context(file_path.clone(), 1);
        assert_eq!(get_current_file_context().unwrap().file_path, file_path);

        clear_file_context();
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_with_file_context_restores_previous() {
        set_file_context(PathBuf::from("Outer.jack"), 1);

        let result = with_file_context(PathBuf::from("Inner.jack"), 2, || {
            let context = get_current_file_context().unwrap();
            assert_eq!(context.file_path, PathBuf::from("Inner.jack"));
            assert_eq!(context.file_id, 2);
            42
        });

        assert_eq!(result, 42);
        assert_eq!(
            get_current_file_context().unwrap().file_path,
            PathBuf::from("Outer.jack")
        );
        clear_file_context();
    }

    #[test]
    fn test_with_file_context_restores_after_panic() {
        set_file_context(PathBuf::from("Outer.jack"), 1);

        let outcome = std::panic::catch_unwind(|| {
            with_file_context(PathBuf::from("Crash.jack"), 2, || panic!("worker failed"))
        });

        assert!(outcome.is_err());
        assert_eq!(
            get_current_file_context().unwrap().file_path,
            PathBuf::from("Outer.jack")
        );
        clear_file_context();
    }

    #[test]
    fn test_attach_adds_file_context() {
        let event = with_file_context(PathBuf::from("Square.jack"), 7, || {
            attach(LogEvent::info("x"), None, vec![("tokens", "12")])
        });

        assert_eq!(event.context.get("tokens").map(String::as_str), Some("12"));
        if config::include_file_context() {
            assert_eq!(
                event.context.get("file").map(String::as_str),
                Some("Square.jack")
            );
            assert_eq!(event.context.get("file_id").map(String::as_str), Some("7"));
        }
    }

    #[test]
    fn test_uninitialized_logging_is_silent() {
        log_error_with_context(codes::system::INTERNAL_ERROR, "no logger", None, vec![]);
        safe_log_error(codes::system::INTERNAL_ERROR, "fallback");
    }

    #[test]
    fn test_diagnostics() {
        let diagnostics = get_system_diagnostics();
        assert!(diagnostics.contains("Logging System Diagnostics"));
        assert!(diagnostics.contains("Initialized:"));
    }
}
