//! In-memory parse tree built from engine events

use super::events::{EventSink, Production};
use crate::tokens::Token;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParseNode {
    Branch {
        production: Production,
        children: Vec<ParseNode>,
    },
    Leaf(Token),
}

impl ParseNode {
    pub fn production(&self) -> Option<Production> {
        match self {
            Self::Branch { production, .. } => Some(*production),
            Self::Leaf(_) => None,
        }
    }

    pub fn children(&self) -> &[ParseNode] {
        match self {
            Self::Branch { children, .. } => children,
            Self::Leaf(_) => &[],
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::Leaf(token) => Some(token),
            Self::Branch { .. } => None,
        }
    }

    /// Direct children that are branches of `production`
    pub fn child_branches(&self, production: Production) -> Vec<&ParseNode> {
        self.children()
            .iter()
            .filter(|child| child.production() == Some(production))
            .collect()
    }

    /// All branches of `production` in pre-order, including `self`
    pub fn find_all(&self, production: Production) -> Vec<&ParseNode> {
        let mut found = Vec::new();
        self.collect(production, &mut found);
        found
    }

    fn collect<'a>(&'a self, production: Production, found: &mut Vec<&'a ParseNode>) {
        if self.production() == Some(production) {
            found.push(self);
        }
        for child in self.children() {
            child.collect(production, found);
        }
    }

    /// Leaf lexemes under this node, left to right
    pub fn lexemes(&self) -> Vec<&str> {
        match self {
            Self::Leaf(token) => vec![token.lexeme.as_str()],
            Self::Branch { children, .. } => children.iter().flat_map(|c| c.lexemes()).collect(),
        }
    }

    /// Leaf tokens under this node, left to right
    pub fn tokens(&self) -> Vec<&Token> {
        match self {
            Self::Leaf(token) => vec![token],
            Self::Branch { children, .. } => children.iter().flat_map(|c| c.tokens()).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Sink that assembles a [`ParseNode`] tree
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stack: Vec<(Production, Vec<ParseNode>)>,
    roots: Vec<ParseNode>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The completed root, or `None` if nothing was closed at top level
    pub fn finish(mut self) -> Option<ParseNode> {
        self.roots.pop()
    }

    pub fn is_complete(&self) -> bool {
        self.stack.is_empty() && !self.roots.is_empty()
    }

    fn attach(&mut self, node: ParseNode) {
        match self.stack.last_mut() {
            Some((_, children)) => children.push(node),
            None => self.roots.push(node),
        }
    }
}

impl EventSink for TreeBuilder {
    fn open(&mut self, production: Production) {
        self.stack.push((production, Vec::new()));
    }

    fn leaf(&mut self, token: &Token) {
        self.attach(ParseNode::Leaf(token.clone()));
    }

    fn close(&mut self, _production: Production) {
        if let Some((production, children)) = self.stack.pop() {
            self.attach(ParseNode::Branch {
                production,
                children,
            });
        }
    }
}
