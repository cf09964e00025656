//! Jack language front-end
//!
//! A tokenizer and recursive-descent parser for Jack class files. The parser
//! reports its progress as a balanced stream of open, leaf and close events,
//! which the bundled sinks render as indented XML or collect into a tree.

pub mod batch;
pub mod config;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use lexical::{LexicalError, Tokenizer};
pub use pipeline::{AnalysisResult, PipelineError};
pub use syntax::{CompilationEngine, EventSink, ParseError, Production};
pub use tokens::{Keyword, Token, TokenKind};
