//! # Doc
//!
//! Width-aware layout documents for the formatter.
//!
//! A document describes renderable content with embedded breaking and
//! indentation choices. The renderer walks the document deciding, group by
//! group, whether the content fits flat on the remaining line width or has
//! to break. Based upon the algorithm described by Philip Wadler in
//! [`A prettier printer`](https://homepages.inf.ed.ac.uk/wadler/papers/prettier/prettier.pdf),
//! extended with forced breaks and a "next break fits" lookahead so a
//! trailing payload can own its breaking decision.
//!
//! Documents are allocated in a [`bumpalo`] arena and are plain [`Copy`]
//! values: combining documents never mutates them, and they are freely
//! shared within one format call.

#![deny(unsafe_code)]

use bumpalo::Bump;

#[cfg(test)]
mod test;

/// Part of a file to be rendered, with layout choices embedded
#[derive(Clone, Copy, Debug, Default)]
pub enum Document<'a> {
  /// No content
  #[default]
  Empty,
  /// String content, must not contain newlines
  Text(&'a str),
  /// A sequence of documents
  Concat(&'a [Document<'a>]),
  /// Indent the lines of the given document
  Nest(&'a Document<'a>, Indent, NestMode),
  /// Renders as its text when flat, or as a newline when broken
  Break(&'a str),
  /// Like [`Document::Break`], but decided on its own rather than by the
  /// enclosing group - it only breaks once the line is full
  FlexBreak(&'a str),
  /// Always a newline, regardless of width
  Line,
  /// A region deciding independently whether its breaks render flat
  Group(&'a Document<'a>, GroupMode),
  /// Content which never fits flat - forces the enclosing group to break
  ForceBreak(&'a Document<'a>),
  /// Lookahead marker: when enabled, the enclosing group's fit check
  /// succeeds as soon as this document could break, deferring the layout
  /// decision to the document itself. When disabled, the content is
  /// measured flat and any enabled marker inside it is ignored, shielding
  /// outer groups from the lookahead
  NextBreakFits(&'a Document<'a>, bool),
}

/// How far a [`Document::Nest`] indents the lines it contains
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indent {
  /// Indent by a fixed number of columns
  Columns(u16),
  /// Indent to the current cursor column
  Cursor,
}

/// When a [`Document::Nest`] applies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NestMode {
  /// The indentation always applies
  Always,
  /// The indentation only applies if the enclosing group is broken.
  ///
  /// Used around call arguments, so a trailing payload which fits the
  /// current line but breaks internally (a heredoc, a multi-line list)
  /// keeps the surrounding indentation level.
  IfBroken,
}

/// How a [`Document::Group`] makes its breaking decision
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupMode {
  /// The group decides for itself whether it fits
  Decide,
  /// The group breaks whenever its parent group is broken.
  ///
  /// Used for chains of the same operator, so a long chain breaks at every
  /// operator rather than gaining one nesting level per link.
  Inherit,
}

/// Allocates documents within an arena.
///
/// Variants holding only static text can be constructed directly; anything
/// which owns children or computed text goes through the builder.
#[derive(Clone, Copy)]
pub struct DocBuilder<'a> {
  allocator: &'a Bump,
}
impl<'a> DocBuilder<'a> {
  /// Create a builder allocating into the given arena
  #[must_use]
  pub fn new(allocator: &'a Bump) -> Self {
    Self { allocator }
  }

  /// A text document from an owned string
  pub fn text(&self, string: impl AsRef<str>) -> Document<'a> {
    Document::Text(self.allocator.alloc_str(string.as_ref()))
  }

  /// Merge multiple documents into a single document
  pub fn concat(
    &self,
    documents: impl IntoIterator<Item = Document<'a>>,
  ) -> Document<'a> {
    let documents: Vec<Document<'a>> = documents.into_iter().collect();

    match documents.len() {
      0 => Document::Empty,
      1 => documents[0],
      _ => Document::Concat(self.allocator.alloc_slice_copy(&documents)),
    }
  }

  /// Indent the lines of a document by a fixed number of columns
  pub fn nest(&self, document: Document<'a>, columns: u16) -> Document<'a> {
    Document::Nest(
      self.allocator.alloc(document),
      Indent::Columns(columns),
      NestMode::Always,
    )
  }

  /// Indent the lines of a document, but only when the enclosing group breaks
  pub fn nest_if_broken(&self, document: Document<'a>, columns: u16) -> Document<'a> {
    Document::Nest(
      self.allocator.alloc(document),
      Indent::Columns(columns),
      NestMode::IfBroken,
    )
  }

  /// Indent the lines of a document to the current cursor column
  pub fn nest_to_cursor(&self, document: Document<'a>) -> Document<'a> {
    Document::Nest(self.allocator.alloc(document), Indent::Cursor, NestMode::Always)
  }

  /// A new group, an independent option for the renderer to break on
  pub fn group(&self, document: Document<'a>) -> Document<'a> {
    Document::Group(self.allocator.alloc(document), GroupMode::Decide)
  }

  /// A group which breaks whenever its parent group breaks
  pub fn group_inherit(&self, document: Document<'a>) -> Document<'a> {
    Document::Group(self.allocator.alloc(document), GroupMode::Inherit)
  }

  /// Mark a document as never fitting flat
  pub fn force_break(&self, document: Document<'a>) -> Document<'a> {
    Document::ForceBreak(self.allocator.alloc(document))
  }

  /// Defer the enclosing group's breaking decision to this document
  pub fn next_break_fits(&self, document: Document<'a>, enabled: bool) -> Document<'a> {
    Document::NextBreakFits(self.allocator.alloc(document), enabled)
  }
}

/// Render mode for a stack entry.
///
/// The `NoBreak`/`NoFlat` variants only occur during fit checks, marking
/// regions where [`Document::NextBreakFits`] has pinned the outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
  Flat,
  FlatNoBreak,
  Break,
  BreakNoFlat,
}

#[derive(Clone, Copy)]
struct Entry<'a> {
  indent: u16,
  mode: Mode,
  document: Document<'a>,
}

/// Maximum width used for "render at infinite width" lookahead
pub const UNLIMITED_WIDTH: u16 = u16::MAX;

/// Render a document to text, breaking groups which do not fit within
/// `print_width` columns
#[must_use]
pub fn render(document: Document, print_width: u16, line_ending: &str) -> String {
  let mut output = String::new();
  let mut column: usize = 0;
  // Indentation owed for the current line, written once text arrives so
  // blank lines carry no trailing spaces
  let mut pending_indent: usize = 0;
  let mut at_line_start = false;

  let mut stack = vec![Entry {
    indent: 0,
    mode: Mode::Break,
    document,
  }];

  while let Some(Entry { indent, mode, document }) = stack.pop() {
    match document {
      Document::Empty => {}
      Document::Text(text) => {
        if at_line_start && !text.is_empty() {
          output.extend(std::iter::repeat_n(' ', pending_indent));
          at_line_start = false;
        }
        output.push_str(text);
        column += text.len();
      }
      Document::Concat(documents) => {
        for document in documents.iter().rev() {
          stack.push(Entry { indent, mode, document: *document });
        }
      }
      Document::Nest(document, amount, nest_mode) => {
        let indent = match (nest_mode, mode) {
          (NestMode::IfBroken, Mode::Flat | Mode::FlatNoBreak) => indent,
          _ => match amount {
            Indent::Columns(columns) => indent + columns,
            Indent::Cursor => u16::try_from(column).unwrap_or(u16::MAX),
          },
        };
        stack.push(Entry { indent, mode, document: *document });
      }
      Document::Break(text) => match mode {
        Mode::Flat | Mode::FlatNoBreak => {
          stack.push(Entry { indent, mode, document: Document::Text(text) });
        }
        Mode::Break | Mode::BreakNoFlat => {
          output.push_str(line_ending);
          column = usize::from(indent);
          pending_indent = usize::from(indent);
          at_line_start = true;
        }
      },
      Document::FlexBreak(text) => {
        let flat = matches!(mode, Mode::Flat | Mode::FlatNoBreak)
          || fits(print_width, column + text.len(), stack.clone());

        if flat {
          stack.push(Entry { indent, mode, document: Document::Text(text) });
        } else {
          output.push_str(line_ending);
          column = usize::from(indent);
          pending_indent = usize::from(indent);
          at_line_start = true;
        }
      }
      Document::Line => {
        output.push_str(line_ending);
        column = usize::from(indent);
        pending_indent = usize::from(indent);
        at_line_start = true;
      }
      Document::Group(inner, group_mode) => {
        let mode = match (mode, group_mode) {
          (Mode::FlatNoBreak, _) => Mode::FlatNoBreak,
          (Mode::Break | Mode::BreakNoFlat, GroupMode::Inherit) => Mode::Break,
          _ => {
            let mut lookahead = stack.clone();
            lookahead.push(Entry { indent, mode: Mode::Flat, document: *inner });

            if fits(print_width, column, lookahead) {
              Mode::Flat
            } else {
              Mode::Break
            }
          }
        };
        stack.push(Entry { indent, mode, document: *inner });
      }
      Document::ForceBreak(inner) | Document::NextBreakFits(inner, _) => {
        stack.push(Entry { indent, mode, document: *inner });
      }
    }
  }

  output
}

/// Would the documents on the stack fit flat on the rest of the line?
///
/// Walks entries until the line ends: an actual break in the pending
/// content means everything before it fit, overflowing the width means it
/// did not.
fn fits(print_width: u16, column: usize, mut queue: Vec<Entry>) -> bool {
  let print_width = usize::from(print_width);
  let mut column = column;

  while let Some(Entry { indent, mode, document }) = queue.pop() {
    if column > print_width {
      return false;
    }

    match document {
      Document::Empty => {}
      Document::Text(text) => column += text.len(),
      Document::Concat(documents) => {
        for document in documents.iter().rev() {
          queue.push(Entry { indent, mode, document: *document });
        }
      }
      Document::Nest(document, _, _) => {
        queue.push(Entry { indent, mode, document: *document });
      }
      Document::Break(text) | Document::FlexBreak(text) => match mode {
        Mode::Flat | Mode::FlatNoBreak => column += text.len(),
        Mode::Break | Mode::BreakNoFlat => return true,
      },
      Document::Line => return true,
      Document::Group(inner, _) => {
        queue.push(Entry { indent, mode, document: *inner });
      }
      Document::ForceBreak(inner) => {
        if mode == Mode::BreakNoFlat {
          queue.push(Entry { indent, mode, document: *inner });
        } else {
          return false;
        }
      }
      Document::NextBreakFits(inner, enabled) => {
        // A disabled marker pins flat measurement for its whole subtree,
        // and an enabled marker inside it cannot switch back - this keeps
        // the lookahead scoped to the group which asked for it
        let mode = match (mode, enabled) {
          (_, false) | (Mode::FlatNoBreak, true) => Mode::FlatNoBreak,
          (_, true) => Mode::BreakNoFlat,
        };
        queue.push(Entry { indent, mode, document: *inner });
      }
    }
  }

  column <= print_width
}
