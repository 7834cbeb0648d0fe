//! Core formatter state, and the sequencing of statements and clauses.
//!
//! Bodies are printed one item per line. A single blank line from the
//! source is kept, longer runs collapse to one. Comments are pulled from
//! the comment cursor as the tree is walked: those above an item come out
//! above it, one trailing code stays on its line, and anything trapped
//! inside an item's span floats out below it.

use crate::{comments::Comments, config::Config, expression::Context};
use bumpalo::Bump;
use sable_doc::{DocBuilder, Document};
use sable_syntax::ast::{Clause, Comment, Expr};

pub struct Formatter<'a, 'c> {
  pub docs: DocBuilder<'a>,
  pub allocator: &'a Bump,
  pub config: &'c Config,
  pub comments: Comments<'c>,
}

impl<'a, 'c> Formatter<'a, 'c> {
  pub fn new(allocator: &'a Bump, config: &'c Config, comments: &'c [Comment]) -> Self {
    Self {
      docs: DocBuilder::new(allocator),
      allocator,
      config,
      comments: Comments::new(comments),
    }
  }

  /// Format a whole file, consuming any comments after the final statement
  pub fn file(&mut self, body: &'c [Expr]) -> Document<'a> {
    self.body(body, u32::MAX)
  }

  /// A sequence of statements, with comments up to `boundary` woven in
  pub fn body(&mut self, statements: &'c [Expr], boundary: u32) -> Document<'a> {
    let docs = self.docs;
    let mut parts: Vec<Document<'a>> = Vec::new();
    let mut previous_end: Option<u32> = None;
    let mut after_comment: Option<u32> = None;

    for statement in statements {
      let start = statement.start_line();
      while let Some(comment) = self.comments.next_before(start) {
        if previous_end.is_some() {
          push_measured_gap(&mut parts, comment.newlines_before.unwrap_or(1));
        }
        parts.push(docs.text(&comment.text));
        previous_end = Some(comment.line);
        after_comment = Some(comment.newlines_after);
      }

      let end = statement.end_line();
      let statement_doc = self.statement(statement);
      let mut doc = docs.group(statement_doc);
      while let Some(comment) = self.comments.next_trailing(end) {
        doc = docs.concat([doc, docs.text(format!(" {}", comment.text))]);
      }

      match after_comment.take() {
        Some(newlines) => push_measured_gap(&mut parts, newlines),
        None => push_gap(&mut parts, previous_end, start),
      }
      parts.push(doc);
      previous_end = Some(end);

      while let Some(comment) = self.comments.next_within(end) {
        parts.push(Document::Line);
        parts.push(docs.text(&comment.text));
      }
    }

    while let Some(comment) = self.comments.next_before(boundary) {
      if previous_end.is_some() {
        push_measured_gap(&mut parts, comment.newlines_before.unwrap_or(1));
      }
      parts.push(docs.text(&comment.text));
      previous_end = Some(comment.line);
    }

    docs.concat(parts)
  }

  /// A sequence of `-> ` clauses, with comments up to `boundary` woven in
  pub fn clauses(&mut self, clauses: &'c [Clause], boundary: u32) -> Document<'a> {
    let docs = self.docs;
    let mut parts: Vec<Document<'a>> = Vec::new();
    let mut previous_end: Option<u32> = None;
    let mut after_comment: Option<u32> = None;

    for clause in clauses {
      while let Some(comment) = self.comments.next_before(clause.line) {
        if previous_end.is_some() {
          push_measured_gap(&mut parts, comment.newlines_before.unwrap_or(1));
        }
        parts.push(docs.text(&comment.text));
        previous_end = Some(comment.line);
        after_comment = Some(comment.newlines_after);
      }

      let end = clause.end_line();
      let (pieces, force) = self.clause_pieces(clause);
      let mut doc = docs.group(if force { docs.force_break(pieces) } else { pieces });
      while let Some(comment) = self.comments.next_trailing(end) {
        doc = docs.concat([doc, docs.text(format!(" {}", comment.text))]);
      }

      match after_comment.take() {
        Some(newlines) => push_measured_gap(&mut parts, newlines),
        None => push_gap(&mut parts, previous_end, clause.line),
      }
      parts.push(doc);
      previous_end = Some(end);

      while let Some(comment) = self.comments.next_within(end) {
        parts.push(Document::Line);
        parts.push(docs.text(&comment.text));
      }
    }

    while let Some(comment) = self.comments.next_before(boundary) {
      if previous_end.is_some() {
        push_measured_gap(&mut parts, comment.newlines_before.unwrap_or(1));
      }
      parts.push(docs.text(&comment.text));
      previous_end = Some(comment.line);
    }

    docs.concat(parts)
  }

  fn statement(&mut self, statement: &'c Expr) -> Document<'a> {
    self.expression(statement, Context::Block)
  }
}

/// Separate two body items by the lines between them in the source
fn push_gap(parts: &mut Vec<Document>, previous_end: Option<u32>, start: u32) {
  if let Some(previous) = previous_end {
    push_measured_gap(parts, start.saturating_sub(previous));
  }
}

/// Separate two body items, keeping at most one blank line between them
fn push_measured_gap(parts: &mut Vec<Document>, newlines: u32) {
  parts.push(Document::Line);
  if newlines >= 2 {
    parts.push(Document::Line);
  }
}
