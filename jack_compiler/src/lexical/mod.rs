//! Lexical analysis for Jack source
//!
//! [`Tokenizer`] is the pull interface the parser drives. The functions here
//! run it to completion for callers that want the whole token sequence, such
//! as token-markup output.

pub mod tokenizer;

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::Token;
use crate::{log_debug, log_success};

pub use tokenizer::{LexicalError, LexicalMetrics, Tokenizer};

/// Tokenize a whole source text with default preferences
pub fn tokenize_source(source: &str) -> Result<Vec<Token>, LexicalError> {
    tokenize_with_metrics(source, LexicalPreferences::default()).map(|(tokens, _)| tokens)
}

/// Tokenize a whole source text, returning the tokens and collected metrics
pub fn tokenize_with_metrics(
    source: &str,
    preferences: LexicalPreferences,
) -> Result<(Vec<Token>, LexicalMetrics), LexicalError> {
    let mut tokenizer = Tokenizer::with_preferences(source, preferences);
    let mut tokens = Vec::new();

    while tokenizer.has_more_tokens() {
        tokenizer.advance()?;
        if let Some(token) = tokenizer.current_token() {
            tokens.push(token.clone());
        }
    }

    log_success!(
        codes::success::TOKENIZATION_COMPLETE,
        "Tokenization completed",
        "tokens" => tokens.len(),
        "bytes" => source.len()
    );

    Ok((tokens, tokenizer.metrics().clone()))
}

/// Compile-time lexical limits, for diagnostics output
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LexicalLimits {
    pub max_string_size: usize,
    pub max_identifier_length: usize,
    pub max_comment_length: usize,
    pub max_token_count: usize,
    pub max_integer_constant: u16,
}

pub fn get_lexical_limits() -> LexicalLimits {
    LexicalLimits {
        max_string_size: MAX_STRING_SIZE,
        max_identifier_length: MAX_IDENTIFIER_LENGTH,
        max_comment_length: MAX_COMMENT_LENGTH,
        max_token_count: MAX_TOKEN_COUNT,
        max_integer_constant: MAX_INTEGER_CONSTANT,
    }
}

/// Check that every lexical error code has registry metadata
pub fn validate_lexical_codes() -> Result<(), String> {
    let lexical_codes = [
        codes::lexical::INVALID_CHARACTER,
        codes::lexical::UNTERMINATED_STRING,
        codes::lexical::INVALID_NUMBER,
        codes::lexical::IDENTIFIER_TOO_LONG,
        codes::lexical::STRING_TOO_LARGE,
        codes::lexical::INTEGER_OUT_OF_RANGE,
        codes::lexical::COMMENT_TOO_LONG,
        codes::lexical::TOO_MANY_TOKENS,
        codes::lexical::UNTERMINATED_COMMENT,
        codes::lexical::END_OF_INPUT,
    ];

    for code in &lexical_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("Lexical limits",
        "max_string_size" => MAX_STRING_SIZE,
        "max_identifier_length" => MAX_IDENTIFIER_LENGTH,
        "max_integer_constant" => MAX_INTEGER_CONSTANT
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;
    use assert_matches::assert_matches;

    #[test]
    fn test_tokenize_source_collects_all_tokens() {
        let tokens = tokenize_source("class Main {\n  // nothing\n}\n").unwrap();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["class", "Main", "{", "}"]);
    }

    #[test]
    fn test_empty_source_yields_no_tokens() {
        assert!(tokenize_source("").unwrap().is_empty());
        assert!(tokenize_source("/** only a comment */\n").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_propagates_errors() {
        assert_matches!(
            tokenize_source("let x = \"open;"),
            Err(LexicalError::UnterminatedString { .. })
        );
    }

    #[test]
    fn test_metrics_follow_preferences() {
        let preferences = LexicalPreferences {
            collect_detailed_metrics: true,
            include_position_in_errors: false,
        };
        let (tokens, metrics) = tokenize_with_metrics("do f(1, \"s\");", preferences).unwrap();

        assert_eq!(metrics.total_tokens(), tokens.len());
        assert_eq!(metrics.integer_tokens, 1);
        assert_eq!(tokens[4].kind, TokenKind::IntegerConstant);

        let quiet = LexicalPreferences {
            collect_detailed_metrics: false,
            include_position_in_errors: false,
        };
        let (_, metrics) = tokenize_with_metrics("do f();", quiet).unwrap();
        assert_eq!(metrics.total_tokens(), 0);
    }

    #[test]
    fn test_limits_and_codes() {
        let limits = get_lexical_limits();
        assert!(limits.max_integer_constant <= 32767);
        assert!(limits.max_identifier_length > 0);
        assert!(validate_lexical_codes().is_ok());
    }
}
