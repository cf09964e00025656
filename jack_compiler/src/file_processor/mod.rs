//! Source file loading
//!
//! Reads one `.jack` compilation unit into memory, enforcing the
//! compile-time size and line limits before any lexing happens.

mod processor;

use std::path::Path;

pub use processor::{
    FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError, SOURCE_EXTENSION,
};

/// Process a file with default preferences
pub fn process_file(file_path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

/// True if `path` names a file with the `.jack` extension
pub fn is_source_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(SOURCE_EXTENSION)
}
