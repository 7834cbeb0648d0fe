//! A serial cursor over the comments of a source file.
//!
//! Comments are attached to the tree while it is printed: each statement
//! takes the comments sitting above it, then any comments trapped inside
//! its span, so every comment is emitted exactly once and in source order.

use sable_syntax::ast::Comment;

pub(crate) struct Comments<'c> {
  comments: &'c [Comment],
  position: usize,
}

impl<'c> Comments<'c> {
  pub fn new(comments: &'c [Comment]) -> Self {
    Self { comments, position: 0 }
  }

  pub fn peek(&self) -> Option<&'c Comment> {
    self.comments.get(self.position)
  }

  /// The next comment, if it starts before the given line
  pub fn next_before(&mut self, line: u32) -> Option<&'c Comment> {
    let comment = self.peek()?;
    if comment.line < line {
      self.position += 1;
      Some(comment)
    } else {
      None
    }
  }

  /// The next comment, if it trails code on a line within the given span
  pub fn next_trailing(&mut self, end_line: u32) -> Option<&'c Comment> {
    let comment = self.peek()?;
    if comment.newlines_before.is_none() && comment.line <= end_line {
      self.position += 1;
      Some(comment)
    } else {
      None
    }
  }

  /// The next comment, if it sits on its own line within the given span
  pub fn next_within(&mut self, end_line: u32) -> Option<&'c Comment> {
    let comment = self.peek()?;
    if comment.line <= end_line {
      self.position += 1;
      Some(comment)
    } else {
      None
    }
  }
}
