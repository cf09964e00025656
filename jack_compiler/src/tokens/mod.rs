//! Token model for Jack source
//!
//! A [`Token`] pairs a [`TokenKind`] with its lexeme and source span. The
//! fixed keyword set lives in [`Keyword`]; the symbol alphabet and the
//! operator subsets are constants in [`token`].

pub mod error;
pub mod keyword;
pub mod token;

pub use error::UsageError;
pub use keyword::Keyword;
pub use token::{
    is_binary_operator, is_symbol_char, is_unary_operator, Token, TokenKind, BINARY_OPERATORS,
    SYMBOLS, UNARY_OPERATORS,
};
