//! Syntax errors and the combined parse error
//!
//! A failing production aborts the parse. Errors carry the production that
//! failed, what it expected, and the offending token with its span.

use super::events::Production;
use crate::lexical::LexicalError;
use crate::logging::{codes, Code};
use crate::tokens::UsageError;
use crate::utils::Span;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("In {production}: expected {expected}, found '{found}' at {span}")]
    UnexpectedToken {
        production: Production,
        expected: String,
        found: String,
        span: Span,
    },

    #[error("In {production}: expected {expected}, found end of input")]
    UnexpectedEndOfInput {
        production: Production,
        expected: String,
    },

    #[error("Unexpected '{found}' at {span} after the end of the class")]
    TrailingTokens { found: String, span: Span },

    #[error("Nesting too deep in {production}: depth {depth} at {span}")]
    NestingTooDeep {
        production: Production,
        depth: usize,
        span: Span,
    },
}

impl SyntaxError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            Self::TrailingTokens { .. } => codes::syntax::TRAILING_TOKENS,
            Self::NestingTooDeep { .. } => codes::syntax::MAX_RECURSION_DEPTH,
        }
    }

    /// Production named by the error, if any
    pub fn production(&self) -> Option<Production> {
        match self {
            Self::UnexpectedToken { production, .. }
            | Self::UnexpectedEndOfInput { production, .. }
            | Self::NestingTooDeep { production, .. } => Some(*production),
            Self::TrailingTokens { .. } => None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::TrailingTokens { span, .. }
            | Self::NestingTooDeep { span, .. } => Some(*span),
            Self::UnexpectedEndOfInput { .. } => None,
        }
    }
}

/// Any failure of a parse run
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Lexical error: {0}")]
    Lexical(#[from] LexicalError),

    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),
}

impl ParseError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Lexical(e) => e.error_code(),
            Self::Syntax(e) => e.error_code(),
            Self::Usage(e) => e.error_code(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexical(e) => Some(Span::at(e.position())),
            Self::Syntax(e) => e.span(),
            Self::Usage(_) => None,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    #[test]
    fn test_syntax_error_messages() {
        let error = SyntaxError::UnexpectedToken {
            production: Production::LetStatement,
            expected: "'='".to_string(),
            found: ";".to_string(),
            span: Span::at(Position::new(10, 2, 9)),
        };
        assert_eq!(
            error.to_string(),
            "In letStatement: expected '=', found ';' at 2:9-9"
        );
        assert_eq!(error.error_code().as_str(), "E050");
        assert_eq!(error.production(), Some(Production::LetStatement));
    }

    #[test]
    fn test_parse_error_conversions() {
        let lexical: ParseError = LexicalError::UnterminatedComment {
            at: Position::new(4, 1, 5),
        }
        .into();
        assert_eq!(lexical.error_code().as_str(), "E028");
        assert_eq!(lexical.span().map(|s| s.start.column), Some(5));

        let usage: ParseError = UsageError::EngineAlreadyUsed.into();
        assert_eq!(usage.error_code().as_str(), "E060");
        assert_eq!(usage.span(), None);

        let syntax: ParseError = SyntaxError::UnexpectedEndOfInput {
            production: Production::Class,
            expected: "'}'".to_string(),
        }
        .into();
        assert_eq!(syntax.error_code().as_str(), "E040");
        assert!(syntax.to_string().starts_with("Syntax error: In class"));
    }
}
