//! Syntax analysis: recursive-descent recognition of one Jack class
//!
//! [`CompilationEngine`] drives a [`Tokenizer`](crate::lexical::Tokenizer)
//! and reports structure through an [`EventSink`]. The sinks in this module
//! turn that event stream into markup ([`XmlWriter`]), a tree
//! ([`TreeBuilder`]) or a raw event list ([`EventRecorder`]).

pub mod engine;
pub mod error;
pub mod events;
pub mod statement;
pub mod tree;
pub mod xml;

pub use engine::{CompilationEngine, ParseSummary};
pub use error::{ParseError, ParseResult, SyntaxError};
pub use events::{EventRecorder, EventSink, ParseEvent, Production};
pub use statement::StatementKind;
pub use tree::{ParseNode, TreeBuilder};
pub use xml::{escape_xml, render_token_xml, XmlWriter};

use crate::config::runtime::LexicalPreferences;
use crate::lexical::Tokenizer;
use crate::logging::codes;

/// Parse `source` as one class, feeding events to `sink`
pub fn parse_source<S: EventSink>(source: &str, sink: S) -> ParseResult<ParseSummary> {
    parse_source_with_preferences(source, LexicalPreferences::default(), sink)
}

pub fn parse_source_with_preferences<S: EventSink>(
    source: &str,
    preferences: LexicalPreferences,
    sink: S,
) -> ParseResult<ParseSummary> {
    let mut tokenizer = Tokenizer::with_preferences(source, preferences);
    CompilationEngine::new(&mut tokenizer, sink).compile_class()
}

/// Parse and render the parse-tree markup
pub fn parse_source_to_xml(source: &str) -> ParseResult<String> {
    let mut writer = XmlWriter::new();
    parse_source(source, &mut writer)?;
    Ok(writer.finish())
}

/// Parse and build the in-memory tree
pub fn parse_source_to_tree(source: &str) -> ParseResult<ParseNode> {
    let mut builder = TreeBuilder::new();
    parse_source(source, &mut builder)?;
    builder.finish().ok_or_else(|| {
        SyntaxError::UnexpectedEndOfInput {
            production: Production::Class,
            expected: "'class'".to_string(),
        }
        .into()
    })
}

/// Check that every syntax and usage error code has registry metadata
pub fn validate_syntax_codes() -> Result<(), String> {
    let syntax_codes = [
        codes::syntax::UNEXPECTED_TOKEN,
        codes::syntax::UNEXPECTED_END_OF_INPUT,
        codes::syntax::TRAILING_TOKENS,
        codes::syntax::MAX_RECURSION_DEPTH,
        codes::usage::ENGINE_ALREADY_USED,
        codes::usage::STREAM_ALREADY_ADVANCED,
        codes::usage::NO_CURRENT_TOKEN,
        codes::usage::WRONG_TOKEN_KIND,
    ];

    for code in &syntax_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Syntax error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }
    Ok(())
}
