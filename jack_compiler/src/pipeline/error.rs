use crate::file_processor::FileProcessorError;
use crate::lexical::LexicalError;
use crate::logging::{codes, Code};
use crate::syntax::ParseError;
use crate::utils::Span;

/// Failures of a single-file analysis run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Failed to write {path}: {message}")]
    Output { path: String, message: String },

    #[error("Failed to serialize parse tree: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<LexicalError> for PipelineError {
    fn from(error: LexicalError) -> Self {
        Self::Parse(ParseError::Lexical(error))
    }
}

impl PipelineError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(e) => e.error_code(),
            Self::Parse(e) => e.error_code(),
            Self::Output { .. } => codes::file_processing::OUTPUT_WRITE_FAILED,
            Self::Serialization(_) => codes::system::INTERNAL_ERROR,
        }
    }

    /// Source location of the failure, when it came from the parser
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Parse(e) => e.span(),
            _ => None,
        }
    }

    pub fn output_error(path: &std::path::Path, error: &std::io::Error) -> Self {
        Self::Output {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }
}
