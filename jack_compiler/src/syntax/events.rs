//! Structural events emitted by the compilation engine
//!
//! The engine never builds a tree itself. It calls into an [`EventSink`]
//! with `open`/`leaf`/`close` in depth-first, left-to-right order, and the
//! sink decides what to do with them.

use crate::tokens::Token;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grammar productions that appear as nonterminal tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Production {
    Class,
    ClassVarDec,
    SubroutineDec,
    ParameterList,
    SubroutineBody,
    VarDec,
    Statements,
    LetStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ReturnStatement,
    Expression,
    Term,
    ExpressionList,
}

impl Production {
    pub const ALL: [Production; 15] = [
        Self::Class,
        Self::ClassVarDec,
        Self::SubroutineDec,
        Self::ParameterList,
        Self::SubroutineBody,
        Self::VarDec,
        Self::Statements,
        Self::LetStatement,
        Self::IfStatement,
        Self::WhileStatement,
        Self::DoStatement,
        Self::ReturnStatement,
        Self::Expression,
        Self::Term,
        Self::ExpressionList,
    ];

    /// Tag name used in markup output
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::ClassVarDec => "classVarDec",
            Self::SubroutineDec => "subroutineDec",
            Self::ParameterList => "parameterList",
            Self::SubroutineBody => "subroutineBody",
            Self::VarDec => "varDec",
            Self::Statements => "statements",
            Self::LetStatement => "letStatement",
            Self::IfStatement => "ifStatement",
            Self::WhileStatement => "whileStatement",
            Self::DoStatement => "doStatement",
            Self::ReturnStatement => "returnStatement",
            Self::Expression => "expression",
            Self::Term => "term",
            Self::ExpressionList => "expressionList",
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseEvent {
    Open(Production),
    Leaf(Token),
    Close(Production),
}

/// Consumer of the engine's event stream
pub trait EventSink {
    fn open(&mut self, production: Production);
    fn leaf(&mut self, token: &Token);
    fn close(&mut self, production: Production);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn open(&mut self, production: Production) {
        (**self).open(production)
    }

    fn leaf(&mut self, token: &Token) {
        (**self).leaf(token)
    }

    fn close(&mut self, production: Production) {
        (**self).close(production)
    }
}

/// Fan out every event to both sinks, first `A` then `B`
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn open(&mut self, production: Production) {
        self.0.open(production);
        self.1.open(production);
    }

    fn leaf(&mut self, token: &Token) {
        self.0.leaf(token);
        self.1.leaf(token);
    }

    fn close(&mut self, production: Production) {
        self.0.close(production);
        self.1.close(production);
    }
}

/// Sink that keeps the raw event list
#[derive(Debug, Default, Clone)]
pub struct EventRecorder {
    events: Vec<ParseEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ParseEvent] {
        &self.events
    }

    /// Every Open has one matching Close and depth returns to zero
    pub fn is_balanced(&self) -> bool {
        let mut open = Vec::new();
        for event in &self.events {
            match event {
                ParseEvent::Open(production) => open.push(*production),
                ParseEvent::Close(production) => {
                    if open.pop() != Some(*production) {
                        return false;
                    }
                }
                ParseEvent::Leaf(_) => {
                    if open.is_empty() {
                        return false;
                    }
                }
            }
        }
        open.is_empty()
    }

    /// Leaf lexemes in emission order
    pub fn lexemes(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ParseEvent::Leaf(token) => Some(token.lexeme.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count_opens(&self, production: Production) -> usize {
        self.events
            .iter()
            .filter(|event| **event == ParseEvent::Open(production))
            .count()
    }
}

impl EventSink for EventRecorder {
    fn open(&mut self, production: Production) {
        self.events.push(ParseEvent::Open(production));
    }

    fn leaf(&mut self, token: &Token) {
        self.events.push(ParseEvent::Leaf(token.clone()));
    }

    fn close(&mut self, production: Production) {
        self.events.push(ParseEvent::Close(production));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_tags() {
        assert_eq!(Production::ClassVarDec.as_str(), "classVarDec");
        assert_eq!(Production::ExpressionList.to_string(), "expressionList");
        assert_eq!(
            serde_json::to_string(&Production::SubroutineBody).unwrap(),
            "\"subroutineBody\""
        );
        for production in Production::ALL {
            let json = serde_json::to_string(&production).unwrap();
            assert_eq!(json, format!("\"{}\"", production.as_str()));
        }
    }

    #[test]
    fn test_balance_check() {
        let mut recorder = EventRecorder::new();
        recorder.open(Production::Term);
        recorder.leaf(&Token::identifier("x"));
        recorder.close(Production::Term);
        assert!(recorder.is_balanced());

        recorder.open(Production::Expression);
        assert!(!recorder.is_balanced());

        let mut crossed = EventRecorder::new();
        crossed.open(Production::Term);
        crossed.close(Production::Expression);
        assert!(!crossed.is_balanced());
    }

    #[test]
    fn test_leaf_outside_production_is_unbalanced() {
        let mut recorder = EventRecorder::new();
        recorder.leaf(&Token::symbol(';'));
        assert!(!recorder.is_balanced());
    }

    #[test]
    fn test_pair_fans_out() {
        let mut pair = (EventRecorder::new(), EventRecorder::new());
        {
            let sink: &mut dyn EventSink = &mut pair;
            sink.open(Production::Statements);
            sink.close(Production::Statements);
        }
        assert_eq!(pair.0.events(), pair.1.events());
        assert_eq!(pair.0.count_opens(Production::Statements), 1);
    }

    #[test]
    fn test_mut_ref_is_a_sink() {
        fn emit<S: EventSink>(mut sink: S) {
            sink.leaf(&Token::integer(7));
        }

        let mut recorder = EventRecorder::new();
        emit(&mut recorder);
        assert_eq!(recorder.lexemes(), vec!["7"]);
    }
}
