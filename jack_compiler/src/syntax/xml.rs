//! Markup rendering for parse events and token sequences

use super::events::{EventSink, Production};
use crate::tokens::Token;

const INDENT: &str = "  ";

/// Escape the characters that cannot appear literally in markup text
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// `<category> value </category>`, with string constants shown unquoted
pub fn leaf_line(token: &Token) -> String {
    let tag = token.kind.tag();
    format!("<{tag}> {} </{tag}>", escape_xml(token.value()))
}

/// Flat token listing wrapped in `<tokens>`
pub fn render_token_xml(tokens: &[Token]) -> String {
    let mut out = String::from("<tokens>\n");
    for token in tokens {
        out.push_str(&leaf_line(token));
        out.push('\n');
    }
    out.push_str("</tokens>\n");
    out
}

/// Sink that renders the parse tree as indented markup
#[derive(Debug, Default, Clone)]
pub struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}

impl EventSink for XmlWriter {
    fn open(&mut self, production: Production) {
        self.line(&format!("<{}>", production.as_str()));
        self.depth += 1;
    }

    fn leaf(&mut self, token: &Token) {
        self.line(&leaf_line(token));
    }

    fn close(&mut self, production: Production) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("</{}>", production.as_str()));
    }
}
