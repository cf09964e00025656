//! Misuse of the tokenizer or compilation engine API

use super::token::TokenKind;
use crate::logging::codes::{self, Code};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UsageError {
    #[error("{operation} called with no current token; call advance first")]
    NoCurrentToken { operation: &'static str },

    #[error("{operation} requires a {expected} token but the current token is {found} '{lexeme}'")]
    WrongTokenKind {
        operation: &'static str,
        expected: TokenKind,
        found: TokenKind,
        lexeme: String,
    },

    #[error("compile_class can only be called once per engine")]
    EngineAlreadyUsed,

    #[error("Tokenizer was already advanced to '{lexeme}' before compilation started")]
    StreamAlreadyAdvanced { lexeme: String },
}

impl UsageError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::NoCurrentToken { .. } => codes::usage::NO_CURRENT_TOKEN,
            Self::WrongTokenKind { .. } => codes::usage::WRONG_TOKEN_KIND,
            Self::EngineAlreadyUsed => codes::usage::ENGINE_ALREADY_USED,
            Self::StreamAlreadyAdvanced { .. } => codes::usage::STREAM_ALREADY_ADVANCED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_kind_message() {
        let error = UsageError::WrongTokenKind {
            operation: "int_val",
            expected: TokenKind::IntegerConstant,
            found: TokenKind::Identifier,
            lexeme: "x".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "int_val requires a integerConstant token but the current token is identifier 'x'"
        );
        assert_eq!(error.error_code().as_str(), "E063");
    }

    #[test]
    fn test_codes() {
        assert_eq!(UsageError::EngineAlreadyUsed.error_code().as_str(), "E060");
        assert_eq!(
            UsageError::NoCurrentToken { operation: "symbol" }
                .error_code()
                .as_str(),
            "E062"
        );
    }
}
