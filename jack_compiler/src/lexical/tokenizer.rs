//! Pull-based tokenizer for Jack source
//!
//! The tokenizer owns the source text and a single forward cursor. Each
//! `advance` skips whitespace and comments, then classifies the next lexeme.
//! `peek` lexes one token ahead without changing the current token, which is
//! what the parser uses to choose between grammar alternatives.

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{is_symbol_char, Keyword, Token, TokenKind, UsageError};
use crate::utils::{Position, Span};
use crate::{log_debug, log_error};
use serde::Serialize;

/// Lexical errors; every variant carries the position where lexing failed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexicalError {
    #[error("Unterminated block comment starting at {at}")]
    UnterminatedComment { at: Position },

    #[error("Unterminated string constant starting at {at}")]
    UnterminatedString { at: Position },

    #[error("Invalid character '{character}' at {at}")]
    InvalidCharacter { character: char, at: Position },

    #[error("Malformed integer constant '{lexeme}' at {at}")]
    InvalidNumber { lexeme: String, at: Position },

    #[error("Integer constant {lexeme} at {at} exceeds {max}")]
    IntegerOutOfRange { lexeme: String, max: u16, at: Position },

    #[error("Identifier too long: {length} characters (max {max}) at {at}")]
    IdentifierTooLong { length: usize, max: usize, at: Position },

    #[error("String constant too large: {length} bytes (max {max}) at {at}")]
    StringTooLarge { length: usize, max: usize, at: Position },

    #[error("Comment too long: {length} bytes (max {max}) at {at}")]
    CommentTooLong { length: usize, max: usize, at: Position },

    #[error("Too many tokens (max {max}) at {at}")]
    TooManyTokens { max: usize, at: Position },

    #[error("No more tokens: advance called at end of input ({at})")]
    UnexpectedEndOfInput { at: Position },
}

impl LexicalError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::UnterminatedComment { .. } => codes::lexical::UNTERMINATED_COMMENT,
            Self::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            Self::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            Self::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            Self::IntegerOutOfRange { .. } => codes::lexical::INTEGER_OUT_OF_RANGE,
            Self::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            Self::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            Self::CommentTooLong { .. } => codes::lexical::COMMENT_TOO_LONG,
            Self::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            Self::UnexpectedEndOfInput { .. } => codes::lexical::END_OF_INPUT,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::UnterminatedComment { at }
            | Self::UnterminatedString { at }
            | Self::InvalidCharacter { at, .. }
            | Self::InvalidNumber { at, .. }
            | Self::IntegerOutOfRange { at, .. }
            | Self::IdentifierTooLong { at, .. }
            | Self::StringTooLarge { at, .. }
            | Self::CommentTooLong { at, .. }
            | Self::TooManyTokens { at, .. }
            | Self::UnexpectedEndOfInput { at } => *at,
        }
    }
}

/// Per-kind token counts and size statistics
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LexicalMetrics {
    pub keyword_tokens: usize,
    pub symbol_tokens: usize,
    pub integer_tokens: usize,
    pub string_tokens: usize,
    pub identifier_tokens: usize,
    pub comment_count: usize,
    pub max_identifier_length: usize,
    pub max_string_length: usize,
    pub max_comment_length: usize,
}

impl LexicalMetrics {
    fn record_token(&mut self, token: &Token) {
        match token.kind {
            TokenKind::Keyword => self.keyword_tokens += 1,
            TokenKind::Symbol => self.symbol_tokens += 1,
            TokenKind::IntegerConstant => self.integer_tokens += 1,
            TokenKind::StringConstant => {
                self.string_tokens += 1;
                let length = token.string_val().map_or(0, str::len);
                self.max_string_length = self.max_string_length.max(length);
            }
            TokenKind::Identifier => {
                self.identifier_tokens += 1;
                self.max_identifier_length = self.max_identifier_length.max(token.lexeme.len());
            }
        }
    }

    fn record_trivia(&mut self, trivia: &Trivia) {
        self.comment_count += trivia.comments;
        self.max_comment_length = self.max_comment_length.max(trivia.longest_comment);
    }

    pub fn total_tokens(&self) -> usize {
        self.keyword_tokens
            + self.symbol_tokens
            + self.integer_tokens
            + self.string_tokens
            + self.identifier_tokens
    }
}

/// Whitespace and comments skipped before a token
#[derive(Debug, Default)]
struct Trivia {
    end: Position,
    comments: usize,
    longest_comment: usize,
}

pub struct Tokenizer {
    source: String,
    /// Next unread position
    cursor: Position,
    current: Option<Token>,
    /// Token lexed by `peek` but not yet made current
    lookahead: Option<Token>,
    token_count: usize,
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl Tokenizer {
    pub fn new(source: impl Into<String>) -> Self {
        Self::with_preferences(source, LexicalPreferences::default())
    }

    pub fn with_preferences(source: impl Into<String>, preferences: LexicalPreferences) -> Self {
        Self {
            source: source.into(),
            cursor: Position::start(),
            current: None,
            lookahead: None,
            token_count: 0,
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    // ========================================================================
    // Stream control
    // ========================================================================

    /// True while a token remains. An unterminated comment counts as
    /// remaining input so that `advance` can report it.
    pub fn has_more_tokens(&self) -> bool {
        if self.lookahead.is_some() {
            return true;
        }
        match self.skip_trivia(self.cursor) {
            Ok(trivia) => trivia.end.offset < self.source.len(),
            Err(_) => true,
        }
    }

    /// Make the next token current. Fails at end of input or on malformed text.
    pub fn advance(&mut self) -> Result<(), LexicalError> {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.lex_next()?,
        };
        self.current = Some(token);
        Ok(())
    }

    /// The token after the current one, without making it current.
    /// Returns `None` at end of input.
    pub fn peek(&mut self) -> Result<Option<&Token>, LexicalError> {
        if self.lookahead.is_none() && self.has_more_tokens() {
            let token = self.lex_next()?;
            self.lookahead = Some(token);
        }
        Ok(self.lookahead.as_ref())
    }

    /// True once `advance` has produced at least one token
    pub fn has_advanced(&self) -> bool {
        self.current.is_some()
    }

    // ========================================================================
    // Current token accessors
    // ========================================================================

    pub fn current_token(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    pub fn current(&self) -> Result<&Token, UsageError> {
        self.current
            .as_ref()
            .ok_or(UsageError::NoCurrentToken {
                operation: "current",
            })
    }

    pub fn token_type(&self) -> Result<TokenKind, UsageError> {
        self.require("token_type").map(|token| token.kind)
    }

    /// Keyword of the current token
    pub fn keyword(&self) -> Result<Keyword, UsageError> {
        let token = self.require_kind("keyword", TokenKind::Keyword)?;
        token
            .as_keyword()
            .ok_or_else(|| wrong_kind("keyword", TokenKind::Keyword, token))
    }

    pub fn symbol(&self) -> Result<char, UsageError> {
        let token = self.require_kind("symbol", TokenKind::Symbol)?;
        token
            .as_symbol()
            .ok_or_else(|| wrong_kind("symbol", TokenKind::Symbol, token))
    }

    pub fn identifier(&self) -> Result<&str, UsageError> {
        self.require_kind("identifier", TokenKind::Identifier)
            .map(|token| token.lexeme.as_str())
    }

    pub fn int_val(&self) -> Result<u16, UsageError> {
        let token = self.require_kind("int_val", TokenKind::IntegerConstant)?;
        token
            .int_val()
            .ok_or_else(|| wrong_kind("int_val", TokenKind::IntegerConstant, token))
    }

    /// Current string constant without its quotes
    pub fn string_val(&self) -> Result<&str, UsageError> {
        let token = self.require_kind("string_val", TokenKind::StringConstant)?;
        token
            .string_val()
            .ok_or_else(|| wrong_kind("string_val", TokenKind::StringConstant, token))
    }

    fn require(&self, operation: &'static str) -> Result<&Token, UsageError> {
        self.current
            .as_ref()
            .ok_or(UsageError::NoCurrentToken { operation })
    }

    fn require_kind(
        &self,
        operation: &'static str,
        expected: TokenKind,
    ) -> Result<&Token, UsageError> {
        let token = self.require(operation)?;
        if token.kind == expected {
            Ok(token)
        } else {
            Err(wrong_kind(operation, expected, token))
        }
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Tokens lexed so far, including a pending lookahead
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Position just past the last lexed character
    pub fn position(&self) -> Position {
        self.cursor
    }

    // ========================================================================
    // Lexing with limits
    // ========================================================================

    fn rest(&self, pos: Position) -> &str {
        self.source.get(pos.offset..).unwrap_or("")
    }

    fn lex_next(&mut self) -> Result<Token, LexicalError> {
        let trivia = self.skip_trivia(self.cursor).map_err(|e| self.report(e))?;
        if self.preferences.collect_detailed_metrics {
            self.metrics.record_trivia(&trivia);
        }
        self.cursor = trivia.end;

        if trivia.end.offset >= self.source.len() {
            return Err(self.report(LexicalError::UnexpectedEndOfInput { at: trivia.end }));
        }

        if self.token_count >= MAX_TOKEN_COUNT {
            return Err(self.report(LexicalError::TooManyTokens {
                max: MAX_TOKEN_COUNT,
                at: trivia.end,
            }));
        }

        let token = self.lex_token(trivia.end).map_err(|e| self.report(e))?;
        self.cursor = token.span.end;
        self.token_count += 1;

        if self.preferences.collect_detailed_metrics {
            self.metrics.record_token(&token);
        }

        Ok(token)
    }

    fn skip_trivia(&self, from: Position) -> Result<Trivia, LexicalError> {
        let mut pos = from;
        let mut trivia = Trivia::default();

        loop {
            let rest = self.rest(pos);
            let comment = match rest.chars().next() {
                Some(ch) if ch.is_whitespace() => {
                    pos = pos.advance(ch);
                    continue;
                }
                Some('/') if rest.starts_with("//") => {
                    &rest[..rest.find('\n').unwrap_or(rest.len())]
                }
                Some('/') if rest.starts_with("/*") => match rest[2..].find("*/") {
                    Some(close) => &rest[..close + 4],
                    None => return Err(LexicalError::UnterminatedComment { at: pos }),
                },
                _ => {
                    trivia.end = pos;
                    return Ok(trivia);
                }
            };

            if comment.len() > MAX_COMMENT_LENGTH {
                return Err(LexicalError::CommentTooLong {
                    length: comment.len(),
                    max: MAX_COMMENT_LENGTH,
                    at: pos,
                });
            }

            trivia.comments += 1;
            trivia.longest_comment = trivia.longest_comment.max(comment.len());
            pos = pos.advance_str(comment);
        }
    }

    fn lex_token(&self, start: Position) -> Result<Token, LexicalError> {
        let rest = self.rest(start);
        let first = rest
            .chars()
            .next()
            .ok_or(LexicalError::UnexpectedEndOfInput { at: start })?;

        if is_symbol_char(first) {
            let span = Span::new(start, start.advance(first));
            return Ok(Token::new(TokenKind::Symbol, first.to_string(), span));
        }

        if first == '"' {
            return self.lex_string(start, rest);
        }

        let length = rest
            .find(|ch: char| ch.is_whitespace() || is_symbol_char(ch) || ch == '"')
            .unwrap_or(rest.len());
        let word = &rest[..length];
        let span = Span::new(start, start.advance_str(word));

        classify_word(word, span)
    }

    /// String constants run to the next quote on the same line
    fn lex_string(&self, start: Position, rest: &str) -> Result<Token, LexicalError> {
        let body = &rest[1..];
        let close = match body.find(['"', '\n']) {
            Some(index) if body[index..].starts_with('"') => index,
            _ => return Err(LexicalError::UnterminatedString { at: start }),
        };

        if close > MAX_STRING_SIZE {
            return Err(LexicalError::StringTooLarge {
                length: close,
                max: MAX_STRING_SIZE,
                at: start,
            });
        }

        let lexeme = &rest[..close + 2];
        let span = Span::new(start, start.advance_str(lexeme));
        Ok(Token::new(TokenKind::StringConstant, lexeme, span))
    }

    fn report(&self, error: LexicalError) -> LexicalError {
        let message = error.to_string();
        if self.preferences.include_position_in_errors {
            log_error!(
                error.error_code(),
                &message,
                span = Span::at(error.position()),
                "tokens_read" => self.token_count
            );
        } else {
            log_error!(error.error_code(), &message, "tokens_read" => self.token_count);
        }
        error
    }
}

fn wrong_kind(operation: &'static str, expected: TokenKind, token: &Token) -> UsageError {
    UsageError::WrongTokenKind {
        operation,
        expected,
        found: token.kind,
        lexeme: token.lexeme.clone(),
    }
}

/// Classify a maximal non-symbol run: keyword, integer, then identifier
fn classify_word(word: &str, span: Span) -> Result<Token, LexicalError> {
    let at = span.start;

    if let Some(keyword) = Keyword::lookup(word) {
        return Ok(Token::new(TokenKind::Keyword, keyword.as_str(), span));
    }

    if word.bytes().all(|b| b.is_ascii_digit()) {
        return classify_integer(word, span);
    }

    if let Some((index, character)) = word
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '_'))
    {
        return Err(LexicalError::InvalidCharacter {
            character,
            at: at.advance_str(&word[..index]),
        });
    }

    if word.starts_with(|ch: char| ch.is_ascii_digit()) {
        return Err(LexicalError::InvalidNumber {
            lexeme: word.to_string(),
            at,
        });
    }

    if word.len() > MAX_IDENTIFIER_LENGTH {
        return Err(LexicalError::IdentifierTooLong {
            length: word.len(),
            max: MAX_IDENTIFIER_LENGTH,
            at,
        });
    }

    log_debug!("Identifier classified", "name" => word, "at" => at);
    Ok(Token::new(TokenKind::Identifier, word, span))
}

/// Canonical decimal in 0..=MAX_INTEGER_CONSTANT; leading zeros are rejected
fn classify_integer(word: &str, span: Span) -> Result<Token, LexicalError> {
    let at = span.start;

    if word.len() > 1 && word.starts_with('0') {
        return Err(LexicalError::InvalidNumber {
            lexeme: word.to_string(),
            at,
        });
    }

    let in_range = word.len() <= 5
        && word
            .parse::<u32>()
            .is_ok_and(|value| value <= u32::from(MAX_INTEGER_CONSTANT));

    if !in_range {
        return Err(LexicalError::IntegerOutOfRange {
            lexeme: word.to_string(),
            max: MAX_INTEGER_CONSTANT,
            at,
        });
    }

    Ok(Token::new(TokenKind::IntegerConstant, word, span))
}
