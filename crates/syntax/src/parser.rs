//! # Parser
//!
//! A hand-written Pratt parser over the token stream, producing the syntax
//! tree in [`crate::ast`].
//!
//! Newlines terminate an expression unless the line ends with a binary
//! operator, or the next line starts with one which could not open a new
//! expression (so pipelines may be written with `|>` at the line start).

use crate::{
  ast::{
    Callee, Clause, DoSection, Expr, Interpolation, Meta, SectionBody, SectionKeyword,
    StringSegment,
  },
  operators::{Associativity, BinaryOp, CAPTURE_PRECEDENCE, UnaryOp},
  tokeniser::{Token, TokenKind},
};
use std::{error, fmt};
use thin_vec::{ThinVec, thin_vec};

/// A problem found while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
  /// The line the problem was found on (1-based)
  pub line: u32,
  /// The source text of the offending token, if one was seen
  pub token: Option<String>,
  /// A description of the problem
  pub message: String,
}

impl ParseError {
  /// The problem together with the offending token
  #[must_use]
  pub fn description(&self) -> String {
    match &self.token {
      Some(token) => format!("{}, found `{token}`", self.message),
      None => self.message.clone(),
    }
  }
}

impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "line {}: {}", self.line, self.description())
  }
}
impl error::Error for ParseError {}

type ParseResult<T> = Result<T, ParseError>;

/// Operators which could start a fresh expression, so a line starting with
/// one never continues the previous line
const PREFIX_OPERATORS: [&str; 6] = ["+", "-", "!", "^", "~~~", "not"];

pub struct Parser<'source> {
  source: &'source str,
  tokens: &'source [Token],
  position: usize,
  /// May a `do` block attach to the call being parsed? `do` binds to the
  /// outermost call without parentheses, so this is off while parsing its
  /// arguments and on again inside any bracketed context.
  block_allowed: bool,
  pub errors: Vec<ParseError>,
}

impl<'source> Parser<'source> {
  pub fn new(source: &'source str, tokens: &'source [Token]) -> Self {
    Self {
      source,
      tokens,
      position: 0,
      block_allowed: true,
      errors: Vec::new(),
    }
  }

  fn with_blocks<T>(&mut self, allowed: bool, f: impl FnOnce(&mut Self) -> T) -> T {
    let previous = std::mem::replace(&mut self.block_allowed, allowed);
    let result = f(self);
    self.block_allowed = previous;
    result
  }

  pub fn parse_program(&mut self) -> Vec<Expr> {
    let mut body = Vec::new();

    loop {
      self.skip_terminators();
      if self.current_kind() == TokenKind::EndOfFile {
        break;
      }
      match self.expression(0) {
        Ok(expression) => body.push(expression),
        Err(error) => {
          self.errors.push(error);
          self.recover();
        }
      }
    }

    body
  }

  /// Skip to the end of the line after an error, so parsing can restart on a
  /// fresh statement
  fn recover(&mut self) {
    while !matches!(
      self.current_kind(),
      TokenKind::EndOfLine | TokenKind::EndOfFile
    ) {
      self.position += 1;
    }
  }

  fn current(&self) -> Token {
    self.tokens[self.position]
  }

  fn current_kind(&self) -> TokenKind {
    self.current().kind
  }

  fn token_text(&self, token: Token) -> &'source str {
    &self.source[token.start as usize..token.end as usize]
  }

  fn advance(&mut self) -> Token {
    let token = self.current();
    if token.kind != TokenKind::EndOfFile {
      self.position += 1;
    }
    token
  }

  fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
    if self.current_kind() == kind {
      Ok(self.advance())
    } else {
      Err(self.error_here(format!("expected {expected}")))
    }
  }

  fn error_here(&self, message: String) -> ParseError {
    self.error_at(self.current(), message)
  }

  fn error_at(&self, token: Token, message: String) -> ParseError {
    let text = match token.kind {
      TokenKind::EndOfFile | TokenKind::EndOfLine => None,
      _ => Some(self.token_text(token).to_owned()),
    };
    ParseError { line: token.line, token: text, message }
  }

  fn skip_newlines(&mut self) {
    while self.current_kind() == TokenKind::EndOfLine {
      self.position += 1;
    }
  }

  fn skip_terminators(&mut self) {
    while matches!(
      self.current_kind(),
      TokenKind::EndOfLine | TokenKind::Semicolon
    ) {
      self.position += 1;
    }
  }

  fn is_operator(&self, symbol: &str) -> bool {
    self.current_kind() == TokenKind::Operator && self.token_text(self.current()) == symbol
  }

  /// The binary operator continuing the current expression, if there is one.
  /// Newlines are looked through only when the following operator could not
  /// begin a new expression.
  fn next_binary_operator(&self) -> Option<(BinaryOp, bool)> {
    let token = self.current();
    if token.kind == TokenKind::Operator {
      return self.binary_operator_at(self.position).map(|op| (op, false));
    }

    if token.kind == TokenKind::EndOfLine {
      let mut index = self.position;
      while self.tokens[index].kind == TokenKind::EndOfLine {
        index += 1;
      }
      let token = self.tokens[index];
      if token.kind == TokenKind::Operator
        && !PREFIX_OPERATORS.contains(&self.token_text(token))
      {
        return self.binary_operator_at(index).map(|op| (op, true));
      }
    }

    None
  }

  fn binary_operator_at(&self, index: usize) -> Option<BinaryOp> {
    let text = self.token_text(self.tokens[index]);
    if text == "not" {
      let next = self.tokens[index + 1];
      if next.kind == TokenKind::Operator && self.token_text(next) == "in" {
        return Some(BinaryOp::NotIn);
      }
      return None;
    }
    BinaryOp::from_symbol(text)
  }

  fn expression(&mut self, min_precedence: u8) -> ParseResult<Expr> {
    let mut left = self.unary()?;

    loop {
      let Some((op, across_newline)) = self.next_binary_operator() else {
        break;
      };
      if op.precedence() < min_precedence {
        break;
      }

      if across_newline {
        self.skip_newlines();
      }
      let op_token = self.advance();
      if op == BinaryOp::NotIn {
        self.advance();
      }
      self.skip_newlines();

      let next_min = match op.associativity() {
        Associativity::Left => op.precedence() + 1,
        Associativity::Right => op.precedence(),
      };
      let right = self.expression(next_min)?;

      left = Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        meta: Meta::line(op_token.line),
      };
    }

    Ok(left)
  }

  fn unary(&mut self) -> ParseResult<Expr> {
    let token = self.current();
    if token.kind == TokenKind::Operator {
      if let Some(op) = UnaryOp::from_symbol(self.token_text(token)) {
        self.advance();
        let operand = self.unary()?;
        return Ok(Expr::Unary {
          op,
          operand: Box::new(operand),
          meta: Meta::line(token.line),
        });
      }
    }

    self.with_postfix()
  }

  fn with_postfix(&mut self) -> ParseResult<Expr> {
    let mut expression = self.primary()?;

    while self.current_kind() == TokenKind::Dot {
      let next = self.tokens[self.position + 1];
      match next.kind {
        TokenKind::Identifier => {
          self.advance();
          let name_token = self.advance();
          expression = self.remote_call(expression, name_token)?;
        }
        TokenKind::LeftParen => {
          let dot = self.advance();
          let callee = Callee::Anonymous(Box::new(expression));
          expression = self.paren_call(callee, dot.line)?;
        }
        _ => {
          return Err(self.error_at(next, "expected a function name after `.`".to_owned()));
        }
      }
    }

    Ok(expression)
  }

  fn remote_call(&mut self, receiver: Expr, name_token: Token) -> ParseResult<Expr> {
    let callee = Callee::Remote {
      receiver: Box::new(receiver),
      name: self.token_text(name_token).to_owned(),
    };
    let line = name_token.line;
    let current = self.current();

    if current.kind == TokenKind::LeftParen && current.line == line {
      self.paren_call(callee, line)
    } else if current.kind == TokenKind::Do && self.block_allowed {
      self.block_call(callee, thin_vec![], false, line)
    } else if current.line == line && starts_argument(current.kind) {
      self.no_paren_call(callee, line)
    } else {
      Ok(Expr::Call {
        callee,
        args: thin_vec![],
        sections: Vec::new(),
        parens: false,
        meta: Meta::line(line),
      })
    }
  }

  fn paren_call(&mut self, callee: Callee, line: u32) -> ParseResult<Expr> {
    self.advance();

    let args = self.with_blocks(true, |parser| {
      parser.skip_newlines();
      let mut args = thin_vec![];
      if parser.current_kind() != TokenKind::RightParen {
        loop {
          args.push(parser.keyword_or_expression()?);
          parser.skip_newlines();
          if parser.current_kind() == TokenKind::Comma {
            parser.advance();
            parser.skip_newlines();
            if parser.current_kind() == TokenKind::RightParen {
              break;
            }
          } else {
            break;
          }
        }
      }
      Ok(args)
    })?;
    let close = self.expect(TokenKind::RightParen, "`)` to close the arguments")?;
    let args = group_keyword_tail(args);

    if self.current_kind() == TokenKind::Do && self.block_allowed {
      self.block_call(callee, args, true, line)
    } else {
      Ok(Expr::Call {
        callee,
        args,
        sections: Vec::new(),
        parens: true,
        meta: Meta { line, end_line: Some(close.line) },
      })
    }
  }

  fn no_paren_call(&mut self, callee: Callee, line: u32) -> ParseResult<Expr> {
    let args = self.with_blocks(false, |parser| {
      let mut args = thin_vec![];
      loop {
        args.push(parser.keyword_or_expression()?);
        if parser.current_kind() == TokenKind::Comma {
          parser.advance();
          parser.skip_newlines();
        } else {
          break;
        }
      }
      Ok(args)
    })?;
    let args = group_keyword_tail(args);

    if self.current_kind() == TokenKind::Do && self.block_allowed {
      self.block_call(callee, args, false, line)
    } else {
      Ok(Expr::Call {
        callee,
        args,
        sections: Vec::new(),
        parens: false,
        meta: Meta::line(line),
      })
    }
  }

  /// Finish a call which carries a `do` block
  fn block_call(
    &mut self,
    callee: Callee,
    args: ThinVec<Expr>,
    parens: bool,
    line: u32,
  ) -> ParseResult<Expr> {
    let (sections, end_line) = self.do_sections()?;
    Ok(Expr::Call {
      callee,
      args,
      sections,
      parens,
      meta: Meta { line, end_line: Some(end_line) },
    })
  }

  fn do_sections(&mut self) -> ParseResult<(Vec<DoSection>, u32)> {
    let mut sections = Vec::new();

    loop {
      let keyword_token = self.advance();
      let keyword = match keyword_token.kind {
        TokenKind::Do => SectionKeyword::Do,
        TokenKind::Else => SectionKeyword::Else,
        TokenKind::Rescue => SectionKeyword::Rescue,
        TokenKind::Catch => SectionKeyword::Catch,
        TokenKind::After => SectionKeyword::After,
        _ => {
          return Err(self.error_at(keyword_token, "expected a block keyword".to_owned()));
        }
      };

      let body = if self.section_has_clauses() {
        SectionBody::Clauses(self.clauses()?)
      } else {
        SectionBody::Exprs(self.section_exprs())
      };
      sections.push(DoSection { keyword, line: keyword_token.line, body });

      match self.current_kind() {
        TokenKind::End => {
          let end = self.advance();
          return Ok((sections, end.line));
        }
        TokenKind::Else | TokenKind::Rescue | TokenKind::Catch | TokenKind::After => {}
        _ => return Err(self.error_here("expected `end` to close the block".to_owned())),
      }
    }
  }

  /// Does the section starting at the current position hold `->` clauses
  /// rather than plain expressions?
  fn section_has_clauses(&self) -> bool {
    let mut depth = 0_u32;

    for token in &self.tokens[self.position..] {
      match token.kind {
        TokenKind::Arrow if depth == 0 => return true,
        TokenKind::Else
        | TokenKind::Rescue
        | TokenKind::Catch
        | TokenKind::After
          if depth == 0 =>
        {
          return false;
        }
        TokenKind::End => {
          if depth == 0 {
            return false;
          }
          depth -= 1;
        }
        TokenKind::LeftParen
        | TokenKind::LeftBracket
        | TokenKind::LeftBrace
        | TokenKind::BitstringOpen
        | TokenKind::Fn
        | TokenKind::Do => depth += 1,
        TokenKind::RightParen
        | TokenKind::RightBracket
        | TokenKind::RightBrace
        | TokenKind::BitstringClose => depth = depth.saturating_sub(1),
        TokenKind::EndOfFile => return false,
        _ => {}
      }
    }

    false
  }

  fn section_exprs(&mut self) -> Vec<Expr> {
    let mut body = Vec::new();

    loop {
      self.skip_terminators();
      if matches!(
        self.current_kind(),
        TokenKind::End
          | TokenKind::Else
          | TokenKind::Rescue
          | TokenKind::Catch
          | TokenKind::After
          | TokenKind::EndOfFile
      ) {
        break;
      }
      match self.expression(0) {
        Ok(expression) => body.push(expression),
        Err(error) => {
          self.errors.push(error);
          self.recover();
        }
      }
    }

    body
  }

  fn clauses(&mut self) -> ParseResult<Vec<Clause>> {
    let mut clauses = Vec::new();

    loop {
      self.skip_terminators();
      if matches!(
        self.current_kind(),
        TokenKind::End
          | TokenKind::Else
          | TokenKind::Rescue
          | TokenKind::Catch
          | TokenKind::After
          | TokenKind::EndOfFile
      ) {
        break;
      }
      clauses.push(self.clause()?);
    }

    Ok(clauses)
  }

  fn clause(&mut self) -> ParseResult<Clause> {
    let start = self.current();

    let mut patterns = thin_vec![];
    if self.current_kind() != TokenKind::Arrow {
      loop {
        patterns.push(self.expression(6)?);
        if self.current_kind() == TokenKind::Comma {
          self.advance();
          self.skip_newlines();
        } else {
          break;
        }
      }
    }

    let guard = if self.is_operator("when") {
      self.advance();
      self.skip_newlines();
      Some(Box::new(self.expression(5)?))
    } else {
      None
    };

    self.expect(TokenKind::Arrow, "`->` to start the clause body")?;

    let mut body = Vec::new();
    loop {
      self.skip_terminators();
      if matches!(
        self.current_kind(),
        TokenKind::End
          | TokenKind::Else
          | TokenKind::Rescue
          | TokenKind::Catch
          | TokenKind::After
          | TokenKind::EndOfFile
      ) {
        break;
      }
      if self.line_starts_clause() {
        break;
      }
      match self.expression(0) {
        Ok(expression) => body.push(expression),
        Err(error) => {
          self.errors.push(error);
          self.recover();
        }
      }
    }

    Ok(Clause { line: start.line, patterns, guard, body })
  }

  /// Does the current line contain a top-level `->`, meaning it begins the
  /// next clause rather than continuing the current body?
  fn line_starts_clause(&self) -> bool {
    let mut depth = 0_u32;

    for token in &self.tokens[self.position..] {
      match token.kind {
        TokenKind::Arrow if depth == 0 => return true,
        TokenKind::EndOfLine | TokenKind::EndOfFile if depth == 0 => return false,
        TokenKind::End => {
          if depth == 0 {
            return false;
          }
          depth -= 1;
        }
        TokenKind::LeftParen
        | TokenKind::LeftBracket
        | TokenKind::LeftBrace
        | TokenKind::BitstringOpen
        | TokenKind::Fn
        | TokenKind::Do => depth += 1,
        TokenKind::RightParen
        | TokenKind::RightBracket
        | TokenKind::RightBrace
        | TokenKind::BitstringClose => depth = depth.saturating_sub(1),
        _ => {}
      }
    }

    false
  }

  /// A `key: value` pair if the current token is a keyword key, otherwise a
  /// plain expression. Used for call arguments and collection elements.
  fn keyword_or_expression(&mut self) -> ParseResult<Expr> {
    if self.current_kind() == TokenKind::KeywordKey {
      let token = self.advance();
      let text = self.token_text(token);
      let key = Expr::Atom {
        name: text[..text.len() - 1].to_owned(),
        quoted: false,
        meta: Meta::line(token.line),
      };
      self.skip_newlines();
      let value = self.expression(0)?;
      Ok(Expr::Pair {
        key: Box::new(key),
        value: Box::new(value),
        keyword: true,
      })
    } else {
      self.expression(0)
    }
  }

  fn primary(&mut self) -> ParseResult<Expr> {
    let token = self.current();

    match token.kind {
      TokenKind::Integer => {
        self.advance();
        Ok(Expr::Integer {
          raw: self.token_text(token).to_owned(),
          meta: Meta::line(token.line),
        })
      }
      TokenKind::Float => {
        self.advance();
        Ok(Expr::Float {
          raw: self.token_text(token).to_owned(),
          meta: Meta::line(token.line),
        })
      }
      TokenKind::Atom => {
        self.advance();
        Ok(Expr::Atom {
          name: self.token_text(token)[1..].to_owned(),
          quoted: false,
          meta: Meta::line(token.line),
        })
      }
      TokenKind::QuotedAtom => {
        self.advance();
        let text = self.token_text(token);
        Ok(Expr::Atom {
          name: text[2..text.len() - 1].to_owned(),
          quoted: true,
          meta: Meta::line(token.line),
        })
      }
      TokenKind::String => self.string_literal(b'"'),
      TokenKind::Charlist => self.string_literal(b'\''),
      TokenKind::Heredoc => self.heredoc_literal(b'"'),
      TokenKind::CharlistHeredoc => self.heredoc_literal(b'\''),
      TokenKind::Sigil => self.sigil(),
      TokenKind::Identifier => self.word(),
      TokenKind::AliasName => self.alias_path(),
      TokenKind::At => self.module_attribute(),
      TokenKind::Capture => self.capture(),
      TokenKind::Fn => self.fn_expression(),
      TokenKind::LeftParen => self.grouping(),
      TokenKind::LeftBracket => self.list(),
      TokenKind::LeftBrace => self.tuple(),
      TokenKind::Percent => self.map(),
      TokenKind::BitstringOpen => self.bitstring(),
      _ => Err(self.error_at(token, "expected an expression".to_owned())),
    }
  }

  fn word(&mut self) -> ParseResult<Expr> {
    let token = self.advance();
    let text = self.token_text(token);

    match text {
      "true" => return Ok(Expr::Boolean { value: true, meta: Meta::line(token.line) }),
      "false" => return Ok(Expr::Boolean { value: false, meta: Meta::line(token.line) }),
      "nil" => return Ok(Expr::Nil { meta: Meta::line(token.line) }),
      _ => {}
    }

    let name = text.to_owned();
    let current = self.current();

    if current.kind == TokenKind::LeftParen
      && current.line == token.line
      && current.start == token.end
    {
      self.paren_call(Callee::Local(name), token.line)
    } else if current.kind == TokenKind::Do && self.block_allowed {
      self.block_call(Callee::Local(name), thin_vec![], false, token.line)
    } else if current.line == token.line && starts_argument(current.kind) {
      self.no_paren_call(Callee::Local(name), token.line)
    } else {
      Ok(Expr::Var { name, meta: Meta::line(token.line) })
    }
  }

  fn alias_path(&mut self) -> ParseResult<Expr> {
    let token = self.advance();
    let mut segments = thin_vec![self.token_text(token).to_owned()];

    while self.current_kind() == TokenKind::Dot
      && self.tokens[self.position + 1].kind == TokenKind::AliasName
    {
      self.advance();
      let segment = self.advance();
      segments.push(self.token_text(segment).to_owned());
    }

    Ok(Expr::Alias { segments, meta: Meta::line(token.line) })
  }

  fn module_attribute(&mut self) -> ParseResult<Expr> {
    let at = self.advance();
    let name_token = self.expect(TokenKind::Identifier, "an attribute name after `@`")?;
    let name = self.token_text(name_token).to_owned();

    let current = self.current();
    let value = if current.line == name_token.line && starts_argument(current.kind) {
      Some(Box::new(self.expression(0)?))
    } else {
      None
    };

    Ok(Expr::ModuleAttribute { name, value, meta: Meta::line(at.line) })
  }

  fn capture(&mut self) -> ParseResult<Expr> {
    let token = self.advance();
    let current = self.current();

    // `&1` style argument slots bind directly to the digits
    if current.kind == TokenKind::Integer && current.start == token.end {
      self.advance();
      let index = self.token_text(current).parse().unwrap_or(0);
      return Ok(Expr::CaptureSlot { index, meta: Meta::line(token.line) });
    }

    let body = self.expression(CAPTURE_PRECEDENCE)?;
    Ok(into_capture(body, Meta::line(token.line)))
  }

  fn fn_expression(&mut self) -> ParseResult<Expr> {
    let token = self.advance();
    let clauses = self.with_blocks(true, |parser| {
      let mut clauses = Vec::new();
      loop {
        parser.skip_terminators();
        match parser.current_kind() {
          TokenKind::End => break,
          TokenKind::EndOfFile => {
            return Err(parser.error_here("expected `end` to close `fn`".to_owned()));
          }
          _ => clauses.push(parser.clause()?),
        }
      }
      Ok(clauses)
    })?;
    let end = self.advance();

    Ok(Expr::Fn {
      clauses,
      meta: Meta { line: token.line, end_line: Some(end.line) },
    })
  }

  /// Parentheses used purely for grouping produce no node of their own, the
  /// formatter re-derives which parentheses are needed
  fn grouping(&mut self) -> ParseResult<Expr> {
    self.advance();
    let expression = self.with_blocks(true, |parser| {
      parser.skip_newlines();
      let expression = parser.expression(0)?;
      parser.skip_newlines();
      Ok(expression)
    })?;
    self.expect(TokenKind::RightParen, "`)` to close the group")?;
    Ok(expression)
  }

  fn list(&mut self) -> ParseResult<Expr> {
    let open = self.advance();
    let (items, close) =
      self.elements_until(TokenKind::RightBracket, "`]` to close the list")?;
    Ok(Expr::List {
      items,
      meta: Meta { line: open.line, end_line: Some(close.line) },
    })
  }

  fn tuple(&mut self) -> ParseResult<Expr> {
    let open = self.advance();
    let (items, close) =
      self.elements_until(TokenKind::RightBrace, "`}` to close the tuple")?;
    Ok(Expr::Tuple {
      items,
      meta: Meta { line: open.line, end_line: Some(close.line) },
    })
  }

  fn elements_until(
    &mut self,
    closer: TokenKind,
    expected: &str,
  ) -> ParseResult<(ThinVec<Expr>, Token)> {
    let items = self.with_blocks(true, |parser| {
      parser.skip_newlines();
      let mut items = thin_vec![];

      if parser.current_kind() != closer {
        loop {
          items.push(parser.keyword_or_expression()?);
          parser.skip_newlines();
          if parser.current_kind() == TokenKind::Comma {
            parser.advance();
            parser.skip_newlines();
            if parser.current_kind() == closer {
              break;
            }
          } else {
            break;
          }
        }
      }
      Ok(items)
    })?;

    let close = self.expect(closer, expected)?;
    Ok((items, close))
  }

  fn map(&mut self) -> ParseResult<Expr> {
    let percent = self.advance();
    self.expect(TokenKind::LeftBrace, "`{` to open the map")?;

    let (base, fields) = self.with_blocks(true, |parser| {
      parser.skip_newlines();
      let mut base = None;
      let mut fields = thin_vec![];

      if parser.current_kind() != TokenKind::RightBrace {
        let mut first = true;
        loop {
          if first && parser.current_kind() != TokenKind::KeywordKey {
            let expression = parser.expression(8)?;
            first = false;
            if parser.is_operator("|") {
              parser.advance();
              parser.skip_newlines();
              base = Some(Box::new(expression));
              continue;
            }
            fields.push(parser.map_field_value(expression)?);
          } else {
            first = false;
            fields.push(parser.map_field()?);
          }

          parser.skip_newlines();
          if parser.current_kind() == TokenKind::Comma {
            parser.advance();
            parser.skip_newlines();
            if parser.current_kind() == TokenKind::RightBrace {
              break;
            }
          } else {
            break;
          }
        }
      }
      Ok((base, fields))
    })?;

    let close = self.expect(TokenKind::RightBrace, "`}` to close the map")?;
    Ok(Expr::Map {
      base,
      fields,
      meta: Meta { line: percent.line, end_line: Some(close.line) },
    })
  }

  fn map_field(&mut self) -> ParseResult<Expr> {
    if self.current_kind() == TokenKind::KeywordKey {
      self.keyword_or_expression()
    } else {
      let key = self.expression(8)?;
      self.map_field_value(key)
    }
  }

  fn map_field_value(&mut self, key: Expr) -> ParseResult<Expr> {
    self.expect(TokenKind::FatArrow, "`=>` between the key and value")?;
    self.skip_newlines();
    let value = self.expression(0)?;
    Ok(Expr::Pair {
      key: Box::new(key),
      value: Box::new(value),
      keyword: false,
    })
  }

  fn bitstring(&mut self) -> ParseResult<Expr> {
    let open = self.advance();
    let segments = self.with_blocks(true, |parser| {
      parser.skip_newlines();
      let mut segments = thin_vec![];

      if parser.current_kind() != TokenKind::BitstringClose {
        loop {
          segments.push(parser.expression(0)?);
          parser.skip_newlines();
          if parser.current_kind() == TokenKind::Comma {
            parser.advance();
            parser.skip_newlines();
          } else {
            break;
          }
        }
      }
      Ok(segments)
    })?;

    let close = self.expect(TokenKind::BitstringClose, "`>>` to close the bitstring")?;
    Ok(Expr::Bitstring {
      segments,
      meta: Meta { line: open.line, end_line: Some(close.line) },
    })
  }

  fn string_literal(&mut self, delimiter: u8) -> ParseResult<Expr> {
    let token = self.advance();
    let raw = self.token_text(token);
    let inner = if raw.len() >= 2 { &raw[1..raw.len() - 1] } else { "" };
    let segments = self.segments(inner, token.line, true);
    let meta = literal_meta(token.line, raw);

    if delimiter == b'"' {
      Ok(Expr::String { segments, heredoc: false, meta })
    } else {
      Ok(Expr::Charlist { segments, heredoc: false, meta })
    }
  }

  fn heredoc_literal(&mut self, delimiter: u8) -> ParseResult<Expr> {
    let token = self.advance();
    let raw = self.token_text(token);
    let content = heredoc_content(raw, raw.len() - 3);
    let segments = self.segments(&content, token.line, true);
    let meta = literal_meta(token.line, raw);

    if delimiter == b'"' {
      Ok(Expr::String { segments, heredoc: true, meta })
    } else {
      Ok(Expr::Charlist { segments, heredoc: true, meta })
    }
  }

  fn sigil(&mut self) -> ParseResult<Expr> {
    let token = self.advance();
    let raw = self.token_text(token);
    let rest = &raw[1..];

    let lowercase = rest.bytes().next().is_some_and(|byte| byte.is_ascii_lowercase());
    let name_end = if lowercase {
      1
    } else {
      rest.bytes().take_while(u8::is_ascii_uppercase).count()
    };
    let name = rest[..name_end].to_owned();
    let body = &rest[name_end..];

    let open = body.chars().next().unwrap_or('(');
    let close = match open {
      '(' => b')',
      '[' => b']',
      '{' => b'}',
      '<' => b'>',
      _ => open as u8,
    };
    let heredoc = matches!(open, '"' | '\'')
      && body.len() >= 3
      && body.as_bytes()[1] == open as u8
      && body.as_bytes()[2] == open as u8;

    let (content, modifiers) = if heredoc {
      let trimmed = body.trim_end_matches(|c: char| c.is_ascii_alphanumeric());
      let modifiers = body[trimmed.len()..].to_owned();
      (heredoc_content(body, trimmed.len() - 3), modifiers)
    } else {
      let bytes = body.as_bytes();
      let mut index = 1;
      while index < bytes.len() && bytes[index] != close {
        match bytes[index] {
          b'\\' => index += 2,
          b'#' if lowercase && bytes.get(index + 1) == Some(&b'{') => {
            index = skip_interpolation(bytes, index);
          }
          _ => index += 1,
        }
      }
      let content = body[1..index.min(bytes.len())].to_owned();
      let modifiers = body
        .get(index + 1..)
        .map_or(String::new(), str::to_owned);
      (content, modifiers)
    };

    let segments = if lowercase {
      self.segments(&content, token.line, true)
    } else if content.is_empty() {
      Vec::new()
    } else {
      vec![StringSegment::Literal(content)]
    };

    Ok(Expr::Sigil {
      name,
      segments,
      open,
      modifiers,
      heredoc,
      meta: literal_meta(token.line, raw),
    })
  }

  /// Split string-like contents into literal and `#{...}` interpolation
  /// segments. Interpolation bodies are parsed as standalone sources, with
  /// lines counted from the interpolation itself.
  fn segments(
    &mut self,
    content: &str,
    line: u32,
    interpolation: bool,
  ) -> Vec<StringSegment> {
    let bytes = content.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut index = 0;

    while index < bytes.len() {
      if interpolation && bytes[index] == b'#' && bytes.get(index + 1) == Some(&b'{') {
        if literal_start < index {
          segments.push(StringSegment::Literal(content[literal_start..index].to_owned()));
        }

        let end = skip_interpolation(bytes, index);
        let close = end.saturating_sub(1).max(index + 2);
        let inner = &content[index + 2..close];
        let ast = crate::parse(inner);
        self.errors.extend(ast.errors);
        segments.push(StringSegment::Interpolation(Interpolation {
          line: line + count_newlines(&content[..index]),
          body: ast.body,
          comments: ast.comments,
        }));

        index = end;
        literal_start = end;
      } else if bytes[index] == b'\\' {
        index += 2;
      } else {
        index += 1;
      }
    }

    if literal_start < bytes.len() {
      segments.push(StringSegment::Literal(content[literal_start..].to_owned()));
    }
    segments
  }
}

/// Is this token able to begin an argument of a call without parentheses?
fn starts_argument(kind: TokenKind) -> bool {
  matches!(
    kind,
    TokenKind::Integer
      | TokenKind::Float
      | TokenKind::Atom
      | TokenKind::QuotedAtom
      | TokenKind::String
      | TokenKind::Heredoc
      | TokenKind::Charlist
      | TokenKind::CharlistHeredoc
      | TokenKind::Sigil
      | TokenKind::Identifier
      | TokenKind::AliasName
      | TokenKind::KeywordKey
      | TokenKind::Capture
      | TokenKind::At
      | TokenKind::LeftParen
      | TokenKind::LeftBracket
      | TokenKind::LeftBrace
      | TokenKind::Percent
      | TokenKind::BitstringOpen
      | TokenKind::Fn
  )
}

/// Collect a trailing run of keyword pairs in call arguments into a single
/// keyword list argument, so `f(a, x: 1, y: 2)` and `f(a, [x: 1, y: 2])`
/// parse identically
fn group_keyword_tail(args: ThinVec<Expr>) -> ThinVec<Expr> {
  let first_keyword = args
    .iter()
    .rposition(|arg| !arg.is_keyword_pair())
    .map_or(0, |index| index + 1);
  if first_keyword >= args.len() {
    return args;
  }

  let mut grouped = ThinVec::with_capacity(first_keyword + 1);
  let mut tail = thin_vec![];
  for (index, arg) in args.into_iter().enumerate() {
    if index < first_keyword {
      grouped.push(arg);
    } else {
      tail.push(arg);
    }
  }

  let line = tail[0].start_line();
  grouped.push(Expr::List { items: tail, meta: Meta::line(line) });
  grouped
}

/// Recognise `&name/arity` and `&Module.name/arity` captures, anything else
/// stays a whole-expression capture
fn into_capture(body: Expr, meta: Meta) -> Expr {
  match body {
    Expr::Binary { op: BinaryOp::Divide, left, right, meta: divide_meta } => {
      match (*left, *right) {
        (Expr::Var { name, .. }, Expr::Integer { raw, .. })
          if raw.parse::<u32>().is_ok() =>
        {
          Expr::CaptureName {
            receiver: None,
            name,
            arity: raw.parse().unwrap_or(0),
            meta,
          }
        }
        (
          Expr::Call {
            callee: Callee::Remote { receiver, name },
            args,
            sections,
            parens: false,
            ..
          },
          Expr::Integer { raw, .. },
        ) if args.is_empty() && sections.is_empty() && raw.parse::<u32>().is_ok() => {
          Expr::CaptureName {
            receiver: Some(receiver),
            name,
            arity: raw.parse().unwrap_or(0),
            meta,
          }
        }
        (left, right) => Expr::Capture {
          body: Box::new(Expr::Binary {
            op: BinaryOp::Divide,
            left: Box::new(left),
            right: Box::new(right),
            meta: divide_meta,
          }),
          meta,
        },
      }
    }
    body => Expr::Capture { body: Box::new(body), meta },
  }
}

/// Extract heredoc contents given the index of the closing triple delimiter,
/// stripping the closing delimiter's indentation from every line
fn heredoc_content(raw: &str, close_index: usize) -> String {
  let Some(first_newline) = raw.find('\n') else { return String::new() };
  let line_start = raw[..close_index].rfind('\n').map_or(close_index, |i| i + 1);
  let indent = close_index - line_start;
  let content = &raw[(first_newline + 1).min(line_start)..line_start];

  let mut result = String::with_capacity(content.len());
  for (index, line) in content.split('\n').enumerate() {
    if index > 0 {
      result.push('\n');
    }
    let bytes = line.as_bytes();
    let mut stripped = 0;
    while stripped < indent
      && stripped < bytes.len()
      && matches!(bytes[stripped], b' ' | b'\t')
    {
      stripped += 1;
    }
    result.push_str(&line[stripped..]);
  }
  result
}

/// Skip a `#{...}` interpolation starting at the `#`, returning the index
/// just past the closing `}`
fn skip_interpolation(bytes: &[u8], mut index: usize) -> usize {
  index += 2;
  let mut depth = 1_usize;

  while index < bytes.len() && depth > 0 {
    match bytes[index] {
      b'{' => {
        depth += 1;
        index += 1;
      }
      b'}' => {
        depth -= 1;
        index += 1;
      }
      b'\\' => index += 2,
      b'"' => index = skip_quoted(bytes, index, b'"'),
      b'\'' => index = skip_quoted(bytes, index, b'\''),
      _ => index += 1,
    }
  }

  index
}

fn skip_quoted(bytes: &[u8], mut index: usize, delimiter: u8) -> usize {
  index += 1;
  while index < bytes.len() {
    match bytes[index] {
      byte if byte == delimiter => return index + 1,
      b'\\' => index += 2,
      b'#' if bytes.get(index + 1) == Some(&b'{') => {
        index = skip_interpolation(bytes, index);
      }
      _ => index += 1,
    }
  }
  index
}

fn literal_meta(line: u32, raw: &str) -> Meta {
  let newlines = count_newlines(raw);
  Meta {
    line,
    end_line: if newlines > 0 { Some(line + newlines) } else { None },
  }
}

#[allow(clippy::cast_possible_truncation, reason = "sources are under 4GB")]
fn count_newlines(text: &str) -> u32 {
  text.bytes().filter(|byte| *byte == b'\n').count() as u32
}
