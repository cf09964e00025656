//! Recursive-descent compilation engine
//!
//! One engine recognizes one class. The engine's current token is always the
//! next unconsumed token; consuming it emits a leaf and advances the
//! tokenizer. Alternatives that cannot be decided from the current token use
//! the tokenizer's `peek`, so no token is consumed speculatively.

use super::error::{ParseError, ParseResult, SyntaxError};
use super::events::{EventSink, Production};
use super::statement::StatementKind;
use crate::config::compile_time::syntax::*;
use crate::lexical::Tokenizer;
use crate::logging::codes;
use crate::tokens::{Keyword, Token, TokenKind, UsageError};
use crate::utils::Span;
use crate::{log_debug, log_error, log_success};
use serde::Serialize;

/// Counters from a completed parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseSummary {
    pub tokens_consumed: usize,
    pub events_emitted: usize,
    pub max_depth: usize,
}

pub struct CompilationEngine<'t, S: EventSink> {
    tokenizer: &'t mut Tokenizer,
    sink: S,
    /// Productions currently open, innermost last
    open: Vec<Production>,
    depth_limit: usize,
    max_depth: usize,
    /// Set once the last token has been consumed
    exhausted: bool,
    used: bool,
    tokens_consumed: usize,
    events_emitted: usize,
}

impl<'t, S: EventSink> CompilationEngine<'t, S> {
    pub fn new(tokenizer: &'t mut Tokenizer, sink: S) -> Self {
        Self {
            tokenizer,
            sink,
            open: Vec::new(),
            depth_limit: MAX_PARSE_DEPTH,
            max_depth: 0,
            exhausted: false,
            used: false,
            tokens_consumed: 0,
            events_emitted: 0,
        }
    }

    /// Lower the nesting limit; it never exceeds the compiled maximum
    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.depth_limit = limit.min(MAX_PARSE_DEPTH);
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Parse one class from a fresh tokenizer. May be called only once.
    pub fn compile_class(&mut self) -> ParseResult<ParseSummary> {
        if self.used {
            let error = UsageError::EngineAlreadyUsed;
            log_error!(error.error_code(), &error.to_string());
            return Err(error.into());
        }
        self.used = true;

        if let Some(token) = self.tokenizer.current_token() {
            let error = UsageError::StreamAlreadyAdvanced {
                lexeme: token.lexeme.clone(),
            };
            log_error!(error.error_code(), &error.to_string());
            return Err(error.into());
        }

        log_debug!("Starting class compilation",
            "source_bytes" => self.tokenizer.source().len(),
            "depth_limit" => self.depth_limit
        );

        match self.run() {
            Ok(summary) => {
                log_success!(
                    codes::success::PARSE_COMPLETE,
                    "Class parsed successfully",
                    "tokens" => summary.tokens_consumed,
                    "events" => summary.events_emitted,
                    "max_depth" => summary.max_depth
                );
                Ok(summary)
            }
            // The tokenizer logs lexical errors where they occur
            Err(error @ ParseError::Lexical(_)) => Err(error),
            Err(error) => {
                log_error!(
                    error.error_code(),
                    &error.to_string(),
                    span = error.span().unwrap_or_else(|| self.current_span()),
                    "context" => self.context_path(),
                    "tokens_consumed" => self.tokens_consumed
                );
                Err(error)
            }
        }
    }

    fn run(&mut self) -> ParseResult<ParseSummary> {
        self.step()?;
        self.compile_class_production()?;

        if let Some(token) = self.current() {
            return Err(SyntaxError::TrailingTokens {
                found: token.lexeme.clone(),
                span: token.span,
            }
            .into());
        }

        Ok(ParseSummary {
            tokens_consumed: self.tokens_consumed,
            events_emitted: self.events_emitted,
            max_depth: self.max_depth,
        })
    }

    // ========================================================================
    // Program structure
    // ========================================================================

    /// 'class' className '{' classVarDec* subroutineDec* '}'
    fn compile_class_production(&mut self) -> ParseResult<()> {
        let p = Production::Class;
        self.open(p)?;
        self.expect_keyword(p, &[Keyword::Class])?;
        self.expect_identifier(p, "class name")?;
        self.expect_symbol(p, '{')?;

        while self
            .current_keyword()
            .is_some_and(Keyword::starts_class_var_dec)
        {
            self.compile_class_var_dec()?;
        }

        while self.current_keyword().is_some_and(Keyword::starts_subroutine) {
            self.compile_subroutine_dec()?;
        }

        self.expect_symbol(p, '}')?;
        self.close();
        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> ParseResult<()> {
        self.compile_variable_declaration(
            Production::ClassVarDec,
            &[Keyword::Static, Keyword::Field],
        )
    }

    fn compile_var_dec(&mut self) -> ParseResult<()> {
        self.compile_variable_declaration(Production::VarDec, &[Keyword::Var])
    }

    /// ('static'|'field'|'var') type varName (',' varName)* ';'
    fn compile_variable_declaration(
        &mut self,
        p: Production,
        keywords: &[Keyword],
    ) -> ParseResult<()> {
        self.open(p)?;
        self.expect_keyword(p, keywords)?;
        self.expect_type(p, false)?;
        self.expect_identifier(p, "variable name")?;
        while self.check_symbol(',') {
            self.consume()?;
            self.expect_identifier(p, "variable name")?;
        }
        self.expect_symbol(p, ';')?;
        self.close();
        Ok(())
    }

    fn compile_subroutine_dec(&mut self) -> ParseResult<()> {
        let p = Production::SubroutineDec;
        self.open(p)?;
        self.expect_keyword(p, &[Keyword::Constructor, Keyword::Function, Keyword::Method])?;
        self.expect_type(p, true)?;
        self.expect_identifier(p, "subroutine name")?;
        self.expect_symbol(p, '(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(p, ')')?;
        self.compile_subroutine_body()?;
        self.close();
        Ok(())
    }

    /// ((type varName) (',' type varName)*)?
    fn compile_parameter_list(&mut self) -> ParseResult<()> {
        let p = Production::ParameterList;
        self.open(p)?;
        if !self.check_symbol(')') {
            self.expect_type(p, false)?;
            self.expect_identifier(p, "parameter name")?;
            while self.check_symbol(',') {
                self.consume()?;
                self.expect_type(p, false)?;
                self.expect_identifier(p, "parameter name")?;
            }
        }
        self.close();
        Ok(())
    }

    fn compile_subroutine_body(&mut self) -> ParseResult<()> {
        let p = Production::SubroutineBody;
        self.open(p)?;
        self.expect_symbol(p, '{')?;
        while self.check_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }
        self.compile_statements()?;
        self.expect_block_end()?;
        self.close();
        Ok(())
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn compile_statements(&mut self) -> ParseResult<()> {
        self.open(Production::Statements)?;
        while let Some(kind) = self
            .current_keyword()
            .and_then(StatementKind::from_keyword)
        {
            self.compile_statement(kind)?;
        }
        self.close();
        Ok(())
    }

    fn compile_statement(&mut self, kind: StatementKind) -> ParseResult<()> {
        let p = kind.production();
        self.open(p)?;
        self.expect_keyword(p, &[kind.keyword()])?;
        match kind {
            StatementKind::Let => self.compile_let_tail(p)?,
            StatementKind::If => self.compile_if_tail(p)?,
            StatementKind::While => self.compile_conditional_block(p)?,
            StatementKind::Do => {
                self.compile_subroutine_call(p)?;
                self.expect_symbol(p, ';')?;
            }
            StatementKind::Return => {
                if !self.check_symbol(';') {
                    self.compile_expression()?;
                }
                self.expect_symbol(p, ';')?;
            }
        }
        self.close();
        Ok(())
    }

    /// varName ('[' expression ']')? '=' expression ';'
    fn compile_let_tail(&mut self, p: Production) -> ParseResult<()> {
        self.expect_identifier(p, "variable name")?;
        if self.check_symbol('[') {
            self.consume()?;
            self.compile_expression()?;
            self.expect_symbol(p, ']')?;
        }
        self.expect_symbol(p, '=')?;
        self.compile_expression()?;
        self.expect_symbol(p, ';')
    }

    fn compile_if_tail(&mut self, p: Production) -> ParseResult<()> {
        self.compile_conditional_block(p)?;
        if self.check_keyword(Keyword::Else) {
            self.consume()?;
            self.expect_symbol(p, '{')?;
            self.compile_statements()?;
            self.expect_block_end()?;
        }
        Ok(())
    }

    /// '(' expression ')' '{' statements '}'
    fn compile_conditional_block(&mut self, p: Production) -> ParseResult<()> {
        self.expect_symbol(p, '(')?;
        self.compile_expression()?;
        self.expect_symbol(p, ')')?;
        self.expect_symbol(p, '{')?;
        self.compile_statements()?;
        self.expect_block_end()
    }

    /// Closing brace of a statement block. Anything else here is a token
    /// that could not start a statement.
    fn expect_block_end(&mut self) -> ParseResult<()> {
        if self.check_symbol('}') {
            self.consume()
        } else {
            Err(self.unexpected(
                Production::Statements,
                "a statement (let, if, while, do, return) or '}'",
            ))
        }
    }

    /// name '(' expressionList ')' | name '.' name '(' expressionList ')'
    fn compile_subroutine_call(&mut self, p: Production) -> ParseResult<()> {
        self.expect_identifier(p, "subroutine, class or variable name")?;
        if self.check_symbol('.') {
            self.consume()?;
            self.expect_identifier(p, "subroutine name")?;
        }
        self.expect_symbol(p, '(')?;
        self.compile_expression_list()?;
        self.expect_symbol(p, ')')
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// term (op term)*, strictly left to right
    fn compile_expression(&mut self) -> ParseResult<()> {
        self.open(Production::Expression)?;
        self.compile_term()?;
        while self.current().is_some_and(Token::is_binary_operator) {
            self.consume()?;
            self.compile_term()?;
        }
        self.close();
        Ok(())
    }

    fn compile_term(&mut self) -> ParseResult<()> {
        let p = Production::Term;
        self.open(p)?;

        let Some(token) = self.current() else {
            return Err(self.unexpected(p, "a term"));
        };
        let kind = token.kind;
        let is_constant = token.as_keyword().is_some_and(Keyword::is_keyword_constant);
        let opens_group = token.is_symbol('(');
        let is_unary = token.is_unary_operator();

        match kind {
            TokenKind::IntegerConstant | TokenKind::StringConstant => self.consume()?,
            TokenKind::Keyword if is_constant => self.consume()?,
            TokenKind::Symbol if opens_group => {
                self.consume()?;
                self.compile_expression()?;
                self.expect_symbol(p, ')')?;
            }
            TokenKind::Symbol if is_unary => {
                self.consume()?;
                self.compile_term()?;
            }
            TokenKind::Identifier => {
                let next = self.tokenizer.peek()?.and_then(Token::as_symbol);
                match next {
                    Some('[') => {
                        self.consume()?;
                        self.consume()?;
                        self.compile_expression()?;
                        self.expect_symbol(p, ']')?;
                    }
                    Some('(') | Some('.') => self.compile_subroutine_call(p)?,
                    _ => self.consume()?,
                }
            }
            _ => return Err(self.unexpected(p, "a term")),
        }

        self.close();
        Ok(())
    }

    /// (expression (',' expression)*)?
    fn compile_expression_list(&mut self) -> ParseResult<()> {
        self.open(Production::ExpressionList)?;
        if !self.check_symbol(')') {
            self.compile_expression()?;
            while self.check_symbol(',') {
                self.consume()?;
                self.compile_expression()?;
            }
        }
        self.close();
        Ok(())
    }

    // ========================================================================
    // Token cursor
    // ========================================================================

    fn current(&self) -> Option<&Token> {
        if self.exhausted {
            None
        } else {
            self.tokenizer.current_token()
        }
    }

    fn current_keyword(&self) -> Option<Keyword> {
        self.current().and_then(Token::as_keyword)
    }

    fn check_symbol(&self, ch: char) -> bool {
        self.current().is_some_and(|token| token.is_symbol(ch))
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current_keyword() == Some(keyword)
    }

    fn current_span(&self) -> Span {
        self.current()
            .map(|token| token.span)
            .unwrap_or_else(|| Span::at(self.tokenizer.position()))
    }

    /// Move to the next token, or mark the stream exhausted
    fn step(&mut self) -> ParseResult<()> {
        if self.tokenizer.has_more_tokens() {
            self.tokenizer.advance()?;
        } else {
            self.exhausted = true;
        }
        Ok(())
    }

    /// Emit the current token as a leaf and step past it
    fn consume(&mut self) -> ParseResult<()> {
        if !self.exhausted {
            if let Some(token) = self.tokenizer.current_token() {
                self.sink.leaf(token);
                self.events_emitted += 1;
                self.tokens_consumed += 1;
            }
        }
        self.step()
    }

    fn expect_symbol(&mut self, p: Production, ch: char) -> ParseResult<()> {
        if self.check_symbol(ch) {
            self.consume()
        } else {
            Err(self.unexpected(p, format!("'{ch}'")))
        }
    }

    fn expect_keyword(&mut self, p: Production, allowed: &[Keyword]) -> ParseResult<()> {
        match self.current_keyword() {
            Some(keyword) if allowed.contains(&keyword) => self.consume(),
            _ => Err(self.unexpected(p, describe_keywords(allowed))),
        }
    }

    fn expect_identifier(&mut self, p: Production, what: &str) -> ParseResult<()> {
        if self.current().is_some_and(Token::is_identifier) {
            self.consume()
        } else {
            Err(self.unexpected(p, what))
        }
    }

    /// 'int' | 'char' | 'boolean' | className, plus 'void' for return types
    fn expect_type(&mut self, p: Production, allow_void: bool) -> ParseResult<()> {
        let is_type = match self.current() {
            Some(token) if token.is_identifier() => true,
            Some(token) => token.as_keyword().is_some_and(|keyword| {
                keyword.is_primitive_type() || (allow_void && keyword == Keyword::Void)
            }),
            None => false,
        };

        if is_type {
            self.consume()
        } else if allow_void {
            Err(self.unexpected(p, "'void' or a type"))
        } else {
            Err(self.unexpected(p, "a type (int, char, boolean or a class name)"))
        }
    }

    fn unexpected(&self, production: Production, expected: impl Into<String>) -> ParseError {
        let expected = expected.into();
        match self.current() {
            Some(token) => SyntaxError::UnexpectedToken {
                production,
                expected,
                found: token.lexeme.clone(),
                span: token.span,
            },
            None => SyntaxError::UnexpectedEndOfInput {
                production,
                expected,
            },
        }
        .into()
    }

    // ========================================================================
    // Event emission
    // ========================================================================

    fn open(&mut self, production: Production) -> ParseResult<()> {
        let depth = self.open.len() + 1;
        if depth > self.depth_limit {
            return Err(SyntaxError::NestingTooDeep {
                production,
                depth,
                span: self.current_span(),
            }
            .into());
        }

        self.open.push(production);
        self.max_depth = self.max_depth.max(depth);
        self.sink.open(production);
        self.events_emitted += 1;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(production) = self.open.pop() {
            self.sink.close(production);
            self.events_emitted += 1;
        }
    }

    /// Innermost open productions, outermost first
    fn context_path(&self) -> String {
        let skip = self.open.len().saturating_sub(MAX_CONTEXT_STACK_DEPTH);
        self.open[skip..]
            .iter()
            .map(|production| production.as_str())
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

fn describe_keywords(keywords: &[Keyword]) -> String {
    let quoted: Vec<String> = keywords.iter().map(|kw| format!("'{kw}'")).collect();
    match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => "a keyword".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::LexicalError;
    use crate::syntax::events::{EventRecorder, ParseEvent};
    use crate::syntax::tree::{ParseNode, TreeBuilder};
    use crate::syntax::xml::XmlWriter;
    use crate::syntax::ParseError;
    use assert_matches::assert_matches;

    fn record(source: &str) -> ParseResult<EventRecorder> {
        let mut tokenizer = Tokenizer::new(source);
        let mut recorder = EventRecorder::new();
        CompilationEngine::new(&mut tokenizer, &mut recorder).compile_class()?;
        Ok(recorder)
    }

    fn tree(source: &str) -> ParseNode {
        let mut tokenizer = Tokenizer::new(source);
        let mut builder = TreeBuilder::new();
        CompilationEngine::new(&mut tokenizer, &mut builder)
            .compile_class()
            .unwrap();
        builder.finish().unwrap()
    }

    /// Wrap statements in a minimal class and subroutine
    fn in_function(body: &str) -> String {
        format!("class Main {{ function void main() {{ {body} }} }}")
    }

    fn first_term_after<'a>(root: &'a ParseNode, statement: Production) -> &'a ParseNode {
        let statement = root.find_all(statement)[0];
        statement.find_all(Production::Term)[0]
    }

    #[test]
    fn test_class_with_single_field() {
        let root = tree("class Foo { field int x; }");
        assert_eq!(root.production(), Some(Production::Class));

        let var_decs = root.child_branches(Production::ClassVarDec);
        assert_eq!(var_decs.len(), 1);
        assert_eq!(var_decs[0].lexemes(), vec!["field", "int", "x", ";"]);
        assert!(root.child_branches(Production::SubroutineDec).is_empty());
    }

    #[test]
    fn test_class_markup() {
        let mut tokenizer = Tokenizer::new("class Foo { field int x; }");
        let mut writer = XmlWriter::new();
        CompilationEngine::new(&mut tokenizer, &mut writer)
            .compile_class()
            .unwrap();

        let expected = "\
<class>
  <keyword> class </keyword>
  <identifier> Foo </identifier>
  <symbol> { </symbol>
  <classVarDec>
    <keyword> field </keyword>
    <keyword> int </keyword>
    <identifier> x </identifier>
    <symbol> ; </symbol>
  </classVarDec>
  <symbol> } </symbol>
</class>
";
        assert_eq!(writer.finish(), expected);
    }

    #[test]
    fn test_full_class_markup() {
        let source = r#"
class Box {
    field int size;

    method int area(int w, Array a) {
        var boolean ok;
        let a[0] = -w;
        if ((w < 3) & ok) {
            do Output.printString("a<b & c>d");
        } else {
            do reset();
        }
        while (w > 0) {
            let w = w - 1;
        }
        return size * w;
    }

    function void main() {
        return;
    }
}
"#;
        let mut tokenizer = Tokenizer::new(source);
        let mut writer = XmlWriter::new();
        CompilationEngine::new(&mut tokenizer, &mut writer)
            .compile_class()
            .unwrap();

        let expected = "\
<class>
  <keyword> class </keyword>
  <identifier> Box </identifier>
  <symbol> { </symbol>
  <classVarDec>
    <keyword> field </keyword>
    <keyword> int </keyword>
    <identifier> size </identifier>
    <symbol> ; </symbol>
  </classVarDec>
  <subroutineDec>
    <keyword> method </keyword>
    <keyword> int </keyword>
    <identifier> area </identifier>
    <symbol> ( </symbol>
    <parameterList>
      <keyword> int </keyword>
      <identifier> w </identifier>
      <symbol> , </symbol>
      <identifier> Array </identifier>
      <identifier> a </identifier>
    </parameterList>
    <symbol> ) </symbol>
    <subroutineBody>
      <symbol> { </symbol>
      <varDec>
        <keyword> var </keyword>
        <keyword> boolean </keyword>
        <identifier> ok </identifier>
        <symbol> ; </symbol>
      </varDec>
      <statements>
        <letStatement>
          <keyword> let </keyword>
          <identifier> a </identifier>
          <symbol> [ </symbol>
          <expression>
            <term>
              <integerConstant> 0 </integerConstant>
            </term>
          </expression>
          <symbol> ] </symbol>
          <symbol> = </symbol>
          <expression>
            <term>
              <symbol> - </symbol>
              <term>
                <identifier> w </identifier>
              </term>
            </term>
          </expression>
          <symbol> ; </symbol>
        </letStatement>
        <ifStatement>
          <keyword> if </keyword>
          <symbol> ( </symbol>
          <expression>
            <term>
              <symbol> ( </symbol>
              <expression>
                <term>
                  <identifier> w </identifier>
                </term>
                <symbol> &lt; </symbol>
                <term>
                  <integerConstant> 3 </integerConstant>
                </term>
              </expression>
              <symbol> ) </symbol>
            </term>
            <symbol> &amp; </symbol>
            <term>
              <identifier> ok </identifier>
            </term>
          </expression>
          <symbol> ) </symbol>
          <symbol> { </symbol>
          <statements>
            <doStatement>
              <keyword> do </keyword>
              <identifier> Output </identifier>
              <symbol> . </symbol>
              <identifier> printString </identifier>
              <symbol> ( </symbol>
              <expressionList>
                <expression>
                  <term>
                    <stringConstant> a&lt;b &amp; c&gt;d </stringConstant>
                  </term>
                </expression>
              </expressionList>
              <symbol> ) </symbol>
              <symbol> ; </symbol>
            </doStatement>
          </statements>
          <symbol> } </symbol>
          <keyword> else </keyword>
          <symbol> { </symbol>
          <statements>
            <doStatement>
              <keyword> do </keyword>
              <identifier> reset </identifier>
              <symbol> ( </symbol>
              <expressionList>
              </expressionList>
              <symbol> ) </symbol>
              <symbol> ; </symbol>
            </doStatement>
          </statements>
          <symbol> } </symbol>
        </ifStatement>
        <whileStatement>
          <keyword> while </keyword>
          <symbol> ( </symbol>
          <expression>
            <term>
              <identifier> w </identifier>
            </term>
            <symbol> &gt; </symbol>
            <term>
              <integerConstant> 0 </integerConstant>
            </term>
          </expression>
          <symbol> ) </symbol>
          <symbol> { </symbol>
          <statements>
            <letStatement>
              <keyword> let </keyword>
              <identifier> w </identifier>
              <symbol> = </symbol>
              <expression>
                <term>
                  <identifier> w </identifier>
                </term>
                <symbol> - </symbol>
                <term>
                  <integerConstant> 1 </integerConstant>
                </term>
              </expression>
              <symbol> ; </symbol>
            </letStatement>
          </statements>
          <symbol> } </symbol>
        </whileStatement>
        <returnStatement>
          <keyword> return </keyword>
          <expression>
            <term>
              <identifier> size </identifier>
            </term>
            <symbol> * </symbol>
            <term>
              <identifier> w </identifier>
            </term>
          </expression>
          <symbol> ; </symbol>
        </returnStatement>
      </statements>
      <symbol> } </symbol>
    </subroutineBody>
  </subroutineDec>
  <subroutineDec>
    <keyword> function </keyword>
    <keyword> void </keyword>
    <identifier> main </identifier>
    <symbol> ( </symbol>
    <parameterList>
    </parameterList>
    <symbol> ) </symbol>
    <subroutineBody>
      <symbol> { </symbol>
      <statements>
        <returnStatement>
          <keyword> return </keyword>
          <symbol> ; </symbol>
        </returnStatement>
      </statements>
      <symbol> } </symbol>
    </subroutineBody>
  </subroutineDec>
  <symbol> } </symbol>
</class>
";
        assert_eq!(writer.finish(), expected);
    }

    #[test]
    fn test_let_with_flat_expression() {
        let root = tree(&in_function("let x = 1 + 2; return;"));
        let let_statement = root.find_all(Production::LetStatement)[0];

        assert_eq!(let_statement.lexemes(), vec!["let", "x", "=", "1", "+", "2", ";"]);
        let expression = let_statement.child_branches(Production::Expression);
        assert_eq!(expression.len(), 1);
        assert_eq!(expression[0].child_branches(Production::Term).len(), 2);
        assert_eq!(expression[0].children()[1].token(), Some(&Token::symbol('+')));
    }

    #[test]
    fn test_expressions_have_no_precedence() {
        let root = tree(&in_function("return 1 + 2 * 3 - 4;"));
        let expression = root.find_all(Production::Expression)[0];
        assert_eq!(expression.child_branches(Production::Term).len(), 4);
        assert_eq!(root.find_all(Production::Expression).len(), 1);
    }

    #[test]
    fn test_do_with_qualified_call() {
        let root = tree(&in_function("do Output.printInt(5); return;"));
        let do_statement = root.find_all(Production::DoStatement)[0];

        assert_eq!(
            do_statement.lexemes(),
            vec!["do", "Output", ".", "printInt", "(", "5", ")", ";"]
        );
        let lists = do_statement.child_branches(Production::ExpressionList);
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].child_branches(Production::Expression).len(), 1);
        // a subroutine call in a do statement is not wrapped in a term
        assert!(do_statement.child_branches(Production::Term).is_empty());
    }

    #[test]
    fn test_term_disambiguation() {
        let cases: [(&str, Vec<&str>); 4] = [
            ("x", vec!["x"]),
            ("x[1]", vec!["x", "[", "1", "]"]),
            ("x(1)", vec!["x", "(", "1", ")"]),
            ("x.y(1)", vec!["x", ".", "y", "(", "1", ")"]),
        ];

        for (term, expected) in cases {
            let root = tree(&in_function(&format!("let a = {term}; return;")));
            let term_node = first_term_after(&root, Production::LetStatement);
            assert_eq!(term_node.lexemes(), expected, "term {term}");
        }
    }

    #[test]
    fn test_bare_reference_consumes_only_identifier() {
        let root = tree(&in_function("let a = x; return;"));
        let let_statement = root.find_all(Production::LetStatement)[0];
        let last = let_statement.children().last().and_then(ParseNode::token);
        assert_eq!(last, Some(&Token::symbol(';')));
        assert_eq!(first_term_after(&root, Production::LetStatement).children().len(), 1);
    }

    #[test]
    fn test_unary_and_grouped_terms() {
        let root = tree(&in_function("return -(~a ^ #b);"));
        let terms = root.find_all(Production::Term);
        assert_eq!(terms[0].lexemes(), vec!["-", "(", "~", "a", "^", "#", "b", ")"]);
        assert_eq!(terms[0].child_branches(Production::Term).len(), 1);
    }

    #[test]
    fn test_keyword_constants_and_strings() {
        let root = tree(&in_function("do f(true, null, this, \"a < b\"); return;"));
        let list = root.find_all(Production::ExpressionList)[0];
        assert_eq!(list.child_branches(Production::Expression).len(), 4);
        assert_eq!(list.lexemes()[6], "\"a < b\"");
    }

    #[test]
    fn test_if_else_and_while() {
        let source = in_function(
            "if (x) { let y = 1; } else { while (y < 3) { let y = y + 1; } } return y;",
        );
        let root = tree(&source);

        let if_statement = root.find_all(Production::IfStatement)[0];
        assert_eq!(if_statement.child_branches(Production::Statements).len(), 2);
        assert_eq!(root.find_all(Production::WhileStatement).len(), 1);
        assert_eq!(root.find_all(Production::ReturnStatement).len(), 1);
    }

    #[test]
    fn test_if_without_else_leaves_next_statement() {
        let root = tree(&in_function("if (x) { } let y = 2; return;"));
        let statements = root.find_all(Production::Statements)[0];
        let kinds: Vec<Option<Production>> =
            statements.children().iter().map(ParseNode::production).collect();
        assert_eq!(
            kinds,
            vec![
                Some(Production::IfStatement),
                Some(Production::LetStatement),
                Some(Production::ReturnStatement),
            ]
        );
    }

    #[test]
    fn test_empty_lists_still_open_and_close() {
        let recorder = record("class A { method void m() { do g(); return; } }").unwrap();
        assert!(recorder.is_balanced());
        assert_eq!(recorder.count_opens(Production::ParameterList), 1);
        assert_eq!(recorder.count_opens(Production::ExpressionList), 1);

        let events = recorder.events();
        let open_params = events
            .iter()
            .position(|e| *e == ParseEvent::Open(Production::ParameterList))
            .unwrap();
        assert_eq!(events[open_params + 1], ParseEvent::Close(Production::ParameterList));
    }

    #[test]
    fn test_full_class_is_balanced_and_preserves_tokens() {
        let source = r#"
            // Square demo
            class Square {
                field int x, y;
                static boolean debug;

                constructor Square new(int ax, int ay) {
                    let x = ax;
                    let y = ay;
                    return this;
                }

                method void draw(Array a, char c) {
                    var int i, j;
                    let a[i] = c;
                    while (~(i > 10)) {
                        do Screen.drawRectangle(x, y, x + i, y + j);
                        let i = i + 1;
                    }
                    if (debug) { do Output.printString("done & dusted"); }
                    return;
                }
            }
        "#;

        let recorder = record(source).unwrap();
        assert!(recorder.is_balanced());

        let expected = crate::lexical::tokenize_source(source).unwrap();
        let expected: Vec<&str> = expected.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(recorder.lexemes(), expected);
    }

    #[test]
    fn test_summary_counts() {
        let mut tokenizer = Tokenizer::new("class A { }");
        let mut recorder = EventRecorder::new();
        let summary = CompilationEngine::new(&mut tokenizer, &mut recorder)
            .compile_class()
            .unwrap();

        assert_eq!(
            summary,
            ParseSummary {
                tokens_consumed: 4,
                events_emitted: 6,
                max_depth: 1,
            }
        );
        assert_eq!(recorder.events().len(), summary.events_emitted);
    }

    #[test]
    fn test_unclosed_comment_is_lexical_error() {
        assert_matches!(
            record("class A { } /* never closed"),
            Err(ParseError::Lexical(LexicalError::UnterminatedComment { .. }))
        );
    }

    #[test]
    fn test_unknown_statement_start_names_statements() {
        let result = record(&in_function("let x = 1; var int y; return;"));
        assert_matches!(
            result,
            Err(ParseError::Syntax(SyntaxError::UnexpectedToken {
                production: Production::Statements,
                ref found,
                ..
            })) if found == "var"
        );
    }

    #[test]
    fn test_statements_loop_stops_without_error() {
        let recorder = record(&in_function("")).unwrap();
        assert_eq!(recorder.count_opens(Production::Statements), 1);
    }

    #[test]
    fn test_missing_terminal_names_production() {
        assert_matches!(
            record(&in_function("let x 1; return;")),
            Err(ParseError::Syntax(SyntaxError::UnexpectedToken {
                production: Production::LetStatement,
                ..
            }))
        );
        assert_matches!(
            record("class A { field int; }"),
            Err(ParseError::Syntax(SyntaxError::UnexpectedToken {
                production: Production::ClassVarDec,
                ..
            }))
        );
        assert_matches!(
            record(&in_function("return );")),
            Err(ParseError::Syntax(SyntaxError::UnexpectedToken {
                production: Production::Term,
                ..
            }))
        );
    }

    #[test]
    fn test_truncated_input() {
        assert_matches!(
            record("class A { function void f() { return"),
            Err(ParseError::Syntax(SyntaxError::UnexpectedEndOfInput {
                production: Production::Term,
                ..
            }))
        );
        assert_matches!(
            record(""),
            Err(ParseError::Syntax(SyntaxError::UnexpectedEndOfInput {
                production: Production::Class,
                ..
            }))
        );
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert_matches!(
            record("class A { } class B { }"),
            Err(ParseError::Syntax(SyntaxError::TrailingTokens { ref found, .. })) if found == "class"
        );
    }

    #[test]
    fn test_engine_is_one_shot() {
        let mut tokenizer = Tokenizer::new("class A { }");
        let mut engine = CompilationEngine::new(&mut tokenizer, EventRecorder::new());
        assert!(engine.compile_class().is_ok());
        assert_matches!(
            engine.compile_class(),
            Err(ParseError::Usage(UsageError::EngineAlreadyUsed))
        );
        assert!(engine.into_sink().is_balanced());
    }

    #[test]
    fn test_engine_requires_fresh_tokenizer() {
        let mut tokenizer = Tokenizer::new("class A { }");
        tokenizer.advance().unwrap();
        let mut engine = CompilationEngine::new(&mut tokenizer, EventRecorder::new());
        assert_matches!(
            engine.compile_class(),
            Err(ParseError::Usage(UsageError::StreamAlreadyAdvanced { ref lexeme })) if lexeme == "class"
        );
        assert!(engine.sink().events().is_empty());
    }

    #[test]
    fn test_nesting_limit() {
        let source = in_function("return ((((1))));");
        let mut tokenizer = Tokenizer::new(source.as_str());
        let mut engine = CompilationEngine::new(&mut tokenizer, EventRecorder::new())
            .with_depth_limit(10);
        assert_matches!(
            engine.compile_class(),
            Err(ParseError::Syntax(SyntaxError::NestingTooDeep { depth: 11, .. }))
        );

        let deep = format!("return {}1{};", "(".repeat(400), ")".repeat(400));
        assert_matches!(
            record(&in_function(&deep)),
            Err(ParseError::Syntax(SyntaxError::NestingTooDeep { .. }))
        );
    }

    #[test]
    fn test_partial_output_before_failure() {
        let mut tokenizer = Tokenizer::new("class A { field int x; field }");
        let mut recorder = EventRecorder::new();
        let result = CompilationEngine::new(&mut tokenizer, &mut recorder).compile_class();

        assert!(result.is_err());
        assert!(!recorder.is_balanced());
        assert_eq!(recorder.count_opens(Production::ClassVarDec), 2);
    }

    #[test]
    fn test_describe_keywords() {
        assert_eq!(describe_keywords(&[Keyword::Class]), "'class'");
        assert_eq!(
            describe_keywords(&[Keyword::Constructor, Keyword::Function, Keyword::Method]),
            "'constructor', 'function' or 'method'"
        );
    }
}
