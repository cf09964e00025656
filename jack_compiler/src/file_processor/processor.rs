//! Source file loading with compile-time limits and global logging integration

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Extension a compilation unit must carry when the extension check is on
pub const SOURCE_EXTENSION: &str = "jack";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .jack, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty: {path}")]
    EmptyFile { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            Self::InvalidExtension { .. } => codes::file_processing::INVALID_EXTENSION,
            Self::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            Self::EmptyFile { .. } => codes::file_processing::EMPTY_FILE,
            Self::PermissionDenied { .. } => codes::file_processing::PERMISSION_DENIED,
            Self::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            Self::IoError { .. } => codes::file_processing::IO_ERROR,
            Self::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
            Self::TooManyLines { .. } => codes::file_processing::TOO_MANY_LINES,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    fn from_io(error: &std::io::Error, path: &Path) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound {
                path: path.display().to_string(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.display().to_string(),
            },
            std::io::ErrorKind::InvalidData => Self::InvalidEncoding {
                path: path.display().to_string(),
            },
            _ => Self::IoError {
                message: format!("'{}': {}", path.display(), error),
            },
        }
    }
}

/// File metadata collected during processing
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical file path
    pub path: PathBuf,
    pub size: u64,
    pub extension: Option<String>,
    pub line_count: usize,
    pub is_jack_file: bool,
    pub modified: Option<SystemTime>,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        human_readable_size(self.size)
    }

    /// Uses the compile-time large file threshold
    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }

    /// Class name implied by the file stem
    pub fn class_name(&self) -> Option<&str> {
        self.path.file_stem().and_then(|stem| stem.to_str())
    }
}

pub(crate) fn human_readable_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Source text of one compilation unit plus its metadata
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }

    /// Only whitespace in the file
    pub fn is_effectively_empty(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// Characters per millisecond
    pub fn processing_rate(&self) -> f64 {
        let duration_ms = self.processing_duration.as_secs_f64() * 1000.0;
        if duration_ms > 0.0 {
            self.char_count() as f64 / duration_ms
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessor {
    pub require_jack_extension: bool,
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self::from_preferences(&FileProcessorPreferences::default())
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_jack_extension: prefs.require_jack_extension,
            enable_performance_logging: prefs.enable_performance_logging,
        }
    }

    pub fn with_jack_extension_required(mut self, required: bool) -> Self {
        self.require_jack_extension = required;
        self
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    /// Read and validate one source file
    pub fn process_file(&self, file_path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
        let start_time = Instant::now();
        let display = file_path.display().to_string();

        log_debug!("Starting file processing", "file" => display);

        let path = self.validate_path(file_path)?;
        let mut metadata = self.get_metadata(&path)?;
        self.validate_file(&metadata, &display)?;
        let source = self.read_file(&path, &display)?;

        let line_count = source.lines().count();
        if line_count > MAX_LINE_COUNT {
            let error = FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: MAX_LINE_COUNT,
            };
            log_error!(error.error_code(), "File exceeds maximum line count",
                "file" => display,
                "lines" => line_count,
                "max_lines" => MAX_LINE_COUNT);
            return Err(error);
        }
        metadata.line_count = line_count;

        let result = FileProcessingResult {
            source,
            metadata,
            processing_duration: start_time.elapsed(),
        };

        self.log_processing_success(&result, &display);
        Ok(result)
    }

    fn log_processing_success(&self, result: &FileProcessingResult, file_path: &str) {
        let duration_ms = format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0);

        if self.enable_performance_logging {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully with performance metrics",
                "file" => file_path,
                "size_bytes" => result.metadata.size,
                "size_human" => result.metadata.human_readable_size(),
                "lines" => result.metadata.line_count,
                "chars" => result.char_count(),
                "duration_ms" => duration_ms,
                "chars_per_ms" => format!("{:.2}", result.processing_rate()),
                "is_large_file" => result.metadata.is_large_file()
            );
        } else {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully",
                "file" => file_path,
                "size_bytes" => result.metadata.size,
                "lines" => result.metadata.line_count
            );
        }
    }

    fn validate_path(&self, file_path: &Path) -> Result<PathBuf, FileProcessorError> {
        let display = file_path.display().to_string();

        if file_path.as_os_str().is_empty() {
            let error = FileProcessorError::InvalidPath { path: display };
            log_error!(error.error_code(), "Empty file path provided");
            return Err(error);
        }

        if !file_path.exists() {
            let error = FileProcessorError::FileNotFound {
                path: display.clone(),
            };
            log_error!(error.error_code(), "File not found", "path" => display);
            return Err(error);
        }

        if !file_path.is_file() {
            let error = FileProcessorError::InvalidPath {
                path: display.clone(),
            };
            log_error!(error.error_code(), "Path is not a file", "path" => display);
            return Err(error);
        }

        file_path.canonicalize().map_err(|e| {
            let error = FileProcessorError::from_io(&e, file_path);
            log_error!(error.error_code(), "Failed to canonicalize path",
                "path" => display,
                "io_error" => e);
            error
        })
    }

    fn get_metadata(&self, path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let metadata = fs::metadata(path).map_err(|e| {
            let error = FileProcessorError::from_io(&e, path);
            log_error!(error.error_code(), "Failed to read file metadata",
                "path" => path.display(),
                "io_error" => e);
            error
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_string());
        let is_jack_file = extension.as_deref() == Some(SOURCE_EXTENSION);

        let file_metadata = FileMetadata {
            path: path.to_path_buf(),
            size: metadata.len(),
            extension,
            line_count: 0,
            is_jack_file,
            modified: metadata.modified().ok(),
        };

        log_debug!("File metadata collected",
            "size_bytes" => file_metadata.size,
            "size_human" => file_metadata.human_readable_size(),
            "extension" => file_metadata.extension.as_deref().unwrap_or("none"),
            "is_large_file" => file_metadata.is_large_file());

        Ok(file_metadata)
    }

    fn validate_file(&self, metadata: &FileMetadata, file_path: &str) -> Result<(), FileProcessorError> {
        if self.require_jack_extension && !metadata.is_jack_file {
            let error = FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            };
            log_error!(error.error_code(), "File does not have required .jack extension",
                "file" => file_path,
                "extension" => metadata.extension.as_deref().unwrap_or("none"));
            return Err(error);
        }

        if metadata.size > MAX_FILE_SIZE {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            };
            log_error!(error.error_code(), "File exceeds compile-time maximum size limit",
                "file" => file_path,
                "size_human" => metadata.human_readable_size(),
                "limit_human" => human_readable_size(MAX_FILE_SIZE));
            return Err(error);
        }

        if metadata.size == 0 {
            let error = FileProcessorError::EmptyFile {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "File is empty", "file" => file_path);
            return Err(error);
        }

        Ok(())
    }

    fn read_file(&self, path: &Path, file_path: &str) -> Result<String, FileProcessorError> {
        let content = fs::read_to_string(path).map_err(|e| {
            let error = FileProcessorError::from_io(&e, path);
            log_error!(error.error_code(), "Failed to read file",
                "file" => file_path,
                "io_error" => e);
            error
        })?;

        log_debug!("File content read successfully",
            "file" => file_path,
            "bytes" => content.len());

        Ok(content)
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    const MAIN: &str = "class Main {\n  function void main() {\n    return;\n  }\n}\n";

    #[test]
    fn test_process_valid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Main.jack");
        fs::write(&file_path, MAIN).unwrap();

        let result = FileProcessor::new().process_file(&file_path).unwrap();

        assert_eq!(result.source, MAIN);
        assert_eq!(result.metadata.line_count, 5);
        assert!(result.metadata.is_jack_file);
        assert_eq!(result.metadata.class_name(), Some("Main"));
        assert!(!result.is_effectively_empty());
        assert!(result.metadata.modified.is_some());
    }

    #[test]
    fn test_file_not_found() {
        let dir = tempdir().unwrap();
        let result = FileProcessor::new().process_file(&dir.path().join("Missing.jack"));
        assert_matches!(result, Err(FileProcessorError::FileNotFound { .. }));
    }

    #[test]
    fn test_directory_is_invalid_path() {
        let dir = tempdir().unwrap();
        let result = FileProcessor::new().process_file(dir.path());
        assert_matches!(result, Err(FileProcessorError::InvalidPath { .. }));
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Main.txt");
        fs::write(&file_path, MAIN).unwrap();

        let strict = FileProcessor::new().with_jack_extension_required(true);
        assert_matches!(
            strict.process_file(&file_path),
            Err(FileProcessorError::InvalidExtension { extension: Some(ref ext) }) if ext == "txt"
        );

        let lenient = FileProcessor::new().with_jack_extension_required(false);
        assert!(lenient.process_file(&file_path).is_ok());
    }

    #[test]
    fn test_extension_is_case_sensitive() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Main.JACK");
        fs::write(&file_path, MAIN).unwrap();

        let strict = FileProcessor::new().with_jack_extension_required(true);
        assert_matches!(
            strict.process_file(&file_path),
            Err(FileProcessorError::InvalidExtension { .. })
        );
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Empty.jack");
        fs::write(&file_path, "").unwrap();

        assert_matches!(
            FileProcessor::new().process_file(&file_path),
            Err(FileProcessorError::EmptyFile { .. })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Bad.jack");
        fs::write(&file_path, [0x63, 0x6c, 0xff, 0xfe]).unwrap();

        assert_matches!(
            FileProcessor::new().process_file(&file_path),
            Err(FileProcessorError::InvalidEncoding { .. })
        );
    }

    #[test]
    fn test_too_many_lines() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Long.jack");
        fs::write(&file_path, "\n".repeat(MAX_LINE_COUNT + 1)).unwrap();

        let result = FileProcessor::new().process_file(&file_path);
        if (MAX_LINE_COUNT as u64 + 1) <= MAX_FILE_SIZE {
            assert_matches!(
                result,
                Err(FileProcessorError::TooManyLines { max_lines, .. }) if max_lines == MAX_LINE_COUNT
            );
        }
    }

    #[test]
    fn test_error_metadata() {
        let error = FileProcessorError::FileNotFound {
            path: "Main.jack".to_string(),
        };

        assert_eq!(error.error_code().as_str(), "E005");
        assert_eq!(error.category(), "FileProcessing");
        assert_eq!(error.severity(), "High");
        assert!(error.is_recoverable());
        assert!(!error.requires_halt());

        let lines = FileProcessorError::TooManyLines {
            lines: 10,
            max_lines: 5,
        };
        assert_eq!(lines.error_code().as_str(), "E013");
    }

    #[test]
    fn test_human_readable_size() {
        assert_eq!(human_readable_size(512), "512 B");
        assert_eq!(human_readable_size(1536), "1.50 KB");
        assert_eq!(human_readable_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_from_preferences() {
        let prefs = FileProcessorPreferences {
            require_jack_extension: false,
            enable_performance_logging: false,
        };

        let processor = FileProcessor::from_preferences(&prefs);
        assert!(!processor.require_jack_extension);
        assert!(!processor.enable_performance_logging);
    }
}
