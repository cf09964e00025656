//! The 21 reserved words of Jack
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    // === PROGRAM STRUCTURE ===
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,

    // === TYPES ===
    Int,
    Char,
    Boolean,
    Void,

    // === CONSTANTS ===
    True,
    False,
    Null,
    This,

    // === STATEMENTS ===
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    pub const ALL: [Keyword; 21] = [
        Self::Class,
        Self::Constructor,
        Self::Function,
        Self::Method,
        Self::Field,
        Self::Static,
        Self::Var,
        Self::Int,
        Self::Char,
        Self::Boolean,
        Self::Void,
        Self::True,
        Self::False,
        Self::Null,
        Self::This,
        Self::Let,
        Self::Do,
        Self::If,
        Self::Else,
        Self::While,
        Self::Return,
    ];

    /// Spelling in source
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Constructor => "constructor",
            Self::Function => "function",
            Self::Method => "method",
            Self::Field => "field",
            Self::Static => "static",
            Self::Var => "var",
            Self::Int => "int",
            Self::Char => "char",
            Self::Boolean => "boolean",
            Self::Void => "void",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::This => "this",
            Self::Let => "let",
            Self::Do => "do",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::Return => "return",
        }
    }

    /// Upper-case name used by the tokenizer's keyword accessor ("CLASS", "RETURN")
    pub fn as_upper(self) -> String {
        self.as_str().to_ascii_uppercase()
    }

    /// Exact, case-sensitive lookup; `Class` is an identifier, not a keyword
    pub fn lookup(word: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kw| kw.as_str() == word)
    }

    /// `static` or `field`, the lookahead set of classVarDec
    pub fn starts_class_var_dec(self) -> bool {
        matches!(self, Self::Static | Self::Field)
    }

    /// `constructor`, `function` or `method`, the lookahead set of subroutineDec
    pub fn starts_subroutine(self) -> bool {
        matches!(self, Self::Constructor | Self::Function | Self::Method)
    }

    /// `true`, `false`, `null` or `this`
    pub fn is_keyword_constant(self) -> bool {
        matches!(self, Self::True | Self::False | Self::Null | Self::This)
    }

    /// Built-in types allowed where the grammar says `type`
    pub fn is_primitive_type(self) -> bool {
        matches!(self, Self::Int | Self::Char | Self::Boolean)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_round_trips_every_keyword() {
        for kw in Keyword::ALL {
            assert_eq!(Keyword::lookup(kw.as_str()), Some(kw));
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(Keyword::lookup("Class"), None);
        assert_eq!(Keyword::lookup("RETURN"), None);
        assert_eq!(Keyword::lookup("classes"), None);
    }

    #[test]
    fn test_upper_case_rendering() {
        assert_eq!(Keyword::Constructor.as_upper(), "CONSTRUCTOR");
        assert_eq!(Keyword::This.to_string(), "this");
    }

    #[test]
    fn test_lookahead_sets() {
        assert!(Keyword::Field.starts_class_var_dec());
        assert!(!Keyword::Var.starts_class_var_dec());
        assert!(Keyword::Method.starts_subroutine());
        assert!(Keyword::Null.is_keyword_constant());
        assert!(!Keyword::Void.is_primitive_type());
    }
}
