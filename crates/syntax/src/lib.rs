//! # Sable Syntax
//!
//! Tokeniser, parser, and syntax tree for Sable source code.
//!
//! Parsing never gives up: problems are collected into the returned
//! [`AST`] and the parser recovers at the next statement, so tooling can
//! still inspect whatever did parse.

pub mod ast;
pub mod operators;
mod parser;
mod tokeniser;

#[cfg(test)]
mod test;

pub use parser::ParseError;
pub use tokeniser::{Token, TokenKind, tokenise};

use ast::{Comment, Expr};

/// A parsed source file
#[derive(Debug)]
pub struct AST {
  /// The top-level expressions, in source order
  pub body: Vec<Expr>,
  /// Comments captured during tokenisation, in source order
  pub comments: Vec<Comment>,
  /// Problems found while parsing
  pub errors: Vec<ParseError>,
}

impl AST {
  /// Did the source parse without any problems?
  #[must_use]
  pub fn is_valid(&self) -> bool {
    self.errors.is_empty()
  }
}

/// Parse a source string into an [`AST`]
#[must_use]
pub fn parse(source: &str) -> AST {
  let (tokens, comments) = tokenise(source);
  let mut parser = parser::Parser::new(source, &tokens);
  let body = parser.parse_program();

  AST { body, comments, errors: parser.errors }
}
