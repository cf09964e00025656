//! Classified tokens and the fixed symbol alphabet
use super::keyword::Keyword;
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// SYMBOL ALPHABET
// ============================================================================

/// Every single-character symbol; each is a token on its own
pub const SYMBOLS: [char; 21] = [
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
    '^', '#',
];

/// Binary operators of `expression`; all share one precedence level
pub const BINARY_OPERATORS: [char; 9] = ['+', '-', '*', '/', '&', '|', '<', '>', '='];

/// Prefix operators of `term`: negate, not, shift left, shift right
pub const UNARY_OPERATORS: [char; 4] = ['-', '~', '^', '#'];

pub fn is_symbol_char(ch: char) -> bool {
    SYMBOLS.contains(&ch)
}

pub fn is_binary_operator(ch: char) -> bool {
    BINARY_OPERATORS.contains(&ch)
}

pub fn is_unary_operator(ch: char) -> bool {
    UNARY_OPERATORS.contains(&ch)
}

// ============================================================================
// TOKEN
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    Keyword,
    Symbol,
    IntegerConstant,
    StringConstant,
    Identifier,
}

impl TokenKind {
    /// Markup tag for leaves of this kind
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Symbol => "symbol",
            Self::IntegerConstant => "integerConstant",
            Self::StringConstant => "stringConstant",
            Self::Identifier => "identifier",
        }
    }

    /// Name reported by the tokenizer's `token_type` accessor
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Keyword => "KEYWORD",
            Self::Symbol => "SYMBOL",
            Self::IntegerConstant => "INT_CONST",
            Self::StringConstant => "STRING_CONST",
            Self::Identifier => "IDENTIFIER",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One classified lexeme. String constants keep their quotes in `lexeme`.
///
/// Equality compares kind and lexeme only; the span is diagnostic metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.lexeme == other.lexeme
    }
}

impl Eq for Token {}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn keyword(kw: Keyword) -> Self {
        Self::new(TokenKind::Keyword, kw.as_str(), Span::dummy())
    }

    pub fn symbol(ch: char) -> Self {
        Self::new(TokenKind::Symbol, ch.to_string(), Span::dummy())
    }

    pub fn identifier(name: &str) -> Self {
        Self::new(TokenKind::Identifier, name, Span::dummy())
    }

    pub fn integer(value: u16) -> Self {
        Self::new(TokenKind::IntegerConstant, value.to_string(), Span::dummy())
    }

    /// String constant from its content, quotes added
    pub fn string(content: &str) -> Self {
        Self::new(
            TokenKind::StringConstant,
            format!("\"{}\"", content),
            Span::dummy(),
        )
    }

    // === TYPED ACCESSORS ===

    pub fn as_keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword => Keyword::lookup(&self.lexeme),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<char> {
        match self.kind {
            TokenKind::Symbol => self.lexeme.chars().next(),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self.kind {
            TokenKind::Identifier => Some(&self.lexeme),
            _ => None,
        }
    }

    pub fn int_val(&self) -> Option<u16> {
        match self.kind {
            TokenKind::IntegerConstant => self.lexeme.parse().ok(),
            _ => None,
        }
    }

    /// String content without the surrounding quotes
    pub fn string_val(&self) -> Option<&str> {
        match self.kind {
            TokenKind::StringConstant => self
                .lexeme
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"')),
            _ => None,
        }
    }

    /// Text shown between the leaf tags: the string value for string
    /// constants, the lexeme otherwise
    pub fn value(&self) -> &str {
        self.string_val().unwrap_or(&self.lexeme)
    }

    // === PREDICATES ===

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.as_keyword() == Some(kw)
    }

    pub fn is_symbol(&self, ch: char) -> bool {
        self.as_symbol() == Some(ch)
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    pub fn is_binary_operator(&self) -> bool {
        self.as_symbol().is_some_and(is_binary_operator)
    }

    pub fn is_unary_operator(&self) -> bool {
        self.as_symbol().is_some_and(is_unary_operator)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.lexeme)
    }
}
