//! Statement dispatch by leading keyword

use super::events::Production;
use crate::tokens::Keyword;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Let,
    If,
    While,
    Do,
    Return,
}

impl StatementKind {
    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::Let => Some(Self::Let),
            Keyword::If => Some(Self::If),
            Keyword::While => Some(Self::While),
            Keyword::Do => Some(Self::Do),
            Keyword::Return => Some(Self::Return),
            _ => None,
        }
    }

    pub fn keyword(self) -> Keyword {
        match self {
            Self::Let => Keyword::Let,
            Self::If => Keyword::If,
            Self::While => Keyword::While,
            Self::Do => Keyword::Do,
            Self::Return => Keyword::Return,
        }
    }

    pub fn production(self) -> Production {
        match self {
            Self::Let => Production::LetStatement,
            Self::If => Production::IfStatement,
            Self::While => Production::WhileStatement,
            Self::Do => Production::DoStatement,
            Self::Return => Production::ReturnStatement,
        }
    }
}
