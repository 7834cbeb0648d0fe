//! # AST
//!
//! The definition of the Abstract Syntax Tree: a closed sum type over every
//! node shape of the language, annotated with enough source metadata (start
//! and closing lines) for the formatter to reproduce the user's blank-line
//! and heredoc layout.
//!
//! Metadata is advisory only: dropping it may change how a node is laid
//! out, never what it means.

use crate::operators::{BinaryOp, UnaryOp};
use thin_vec::ThinVec;

/// Source metadata attached to a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Meta {
  /// The line the node starts on (1-based)
  pub line: u32,
  /// The line of the node's closing token, if it has one (`)`, `]`, `end`)
  pub end_line: Option<u32>,
}

impl Meta {
  /// Metadata for a single-line node
  #[must_use]
  pub fn line(line: u32) -> Self {
    Self { line, end_line: None }
  }
}

/// A source comment, captured out-of-band during tokenisation.
///
/// Comments are collected in ascending line order and consumed exactly once
/// by the formatter as it walks the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
  /// The line the comment is on
  pub line: u32,
  /// Newlines between the previous token and the comment.
  /// `None` means the comment trails code on the same line.
  pub newlines_before: Option<u32>,
  /// Newlines between the comment and whatever follows it
  pub newlines_after: u32,
  /// The normalized comment text, including the leading `#`
  pub text: String,
}

/// A piece of a string, charlist, or sigil literal
#[derive(Debug, Clone, PartialEq)]
pub enum StringSegment {
  /// Literal text, kept exactly as written (escapes included)
  Literal(String),
  /// An embedded `#{...}` expression
  Interpolation(Interpolation),
}

/// An embedded `#{...}` expression inside a string-like literal.
///
/// The body is parsed separately with its own comment list, so comments
/// written inside an interpolation survive formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
  /// The line of the opening `#{`, relative to the enclosing literal
  pub line: u32,
  /// The expressions of the interpolation
  pub body: Vec<Expr>,
  /// Comments captured while parsing the interpolation body
  pub comments: Vec<Comment>,
}

/// What a call invokes
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
  /// A plain named call, `foo(...)`
  Local(String),
  /// A dotted call, `receiver.name(...)`
  Remote {
    /// The expression before the dot
    receiver: Box<Expr>,
    /// The function name after the dot
    name: String,
  },
  /// Calling an anonymous function value, `fun.(...)`
  Anonymous(Box<Expr>),
}

/// One `pattern -> body` clause of a `fn` or a `do` block
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
  /// The line the clause head starts on
  pub line: u32,
  /// The patterns before the arrow
  pub patterns: ThinVec<Expr>,
  /// An optional `when` guard on the head
  pub guard: Option<Box<Expr>>,
  /// The expressions of the clause body
  pub body: Vec<Expr>,
}

/// The keyword opening a section of a `do` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKeyword {
  /// `do`
  Do,
  /// `else`
  Else,
  /// `rescue`
  Rescue,
  /// `catch`
  Catch,
  /// `after`
  After,
}

impl SectionKeyword {
  /// The keyword's source text
  #[must_use]
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Do => "do",
      Self::Else => "else",
      Self::Rescue => "rescue",
      Self::Catch => "catch",
      Self::After => "after",
    }
  }
}

/// The contents of one section of a `do` block
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
  /// A sequence of expressions
  Exprs(Vec<Expr>),
  /// A sequence of `-> ` clauses
  Clauses(Vec<Clause>),
}

/// One section of a `do` block (`do`, `else`, `rescue`, `catch`, `after`)
#[derive(Debug, Clone, PartialEq)]
pub struct DoSection {
  /// The section keyword
  pub keyword: SectionKeyword,
  /// The line of the section keyword
  pub line: u32,
  /// The section contents
  pub body: SectionBody,
}

/// An expression of the language
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  /// An integer literal, kept as written (`255`, `0xFF`, `1_000`)
  Integer {
    /// The literal source text
    raw: String,
    /// Source metadata
    meta: Meta,
  },
  /// A float literal, kept as written
  Float {
    /// The literal source text
    raw: String,
    /// Source metadata
    meta: Meta,
  },
  /// `true` or `false`
  Boolean {
    /// The literal value
    value: bool,
    /// Source metadata
    meta: Meta,
  },
  /// `nil`
  Nil {
    /// Source metadata
    meta: Meta,
  },
  /// An atom literal, `:name` or `:"quoted"`
  Atom {
    /// The atom's name, without the colon or quotes
    name: String,
    /// Was the atom written with quotes?
    quoted: bool,
    /// Source metadata
    meta: Meta,
  },
  /// A string literal, `"..."` or a `"""` heredoc
  String {
    /// The pieces of the string
    segments: Vec<StringSegment>,
    /// Was the string written as a heredoc?
    heredoc: bool,
    /// Source metadata
    meta: Meta,
  },
  /// A charlist literal, `'...'` or a `'''` heredoc
  Charlist {
    /// The pieces of the charlist
    segments: Vec<StringSegment>,
    /// Was the charlist written as a heredoc?
    heredoc: bool,
    /// Source metadata
    meta: Meta,
  },
  /// A sigil literal, `~r/.../i`
  Sigil {
    /// The sigil letter(s), e.g. `r` or `UP`
    name: String,
    /// The pieces of the sigil contents
    segments: Vec<StringSegment>,
    /// The opening delimiter character, `"` for heredoc sigils
    open: char,
    /// Trailing modifier letters
    modifiers: String,
    /// Was the sigil written with heredoc delimiters?
    heredoc: bool,
    /// Source metadata
    meta: Meta,
  },
  /// A variable reference
  Var {
    /// The variable name
    name: String,
    /// Source metadata
    meta: Meta,
  },
  /// An alias path, `Foo` or `Foo.Bar.Baz`
  Alias {
    /// The dotted segments of the path
    segments: ThinVec<String>,
    /// Source metadata
    meta: Meta,
  },
  /// A module attribute, `@name` or `@name value`
  ModuleAttribute {
    /// The attribute name
    name: String,
    /// The attribute value, `None` for a bare read
    value: Option<Box<Expr>>,
    /// Source metadata
    meta: Meta,
  },
  /// A list literal
  List {
    /// The list items
    items: ThinVec<Expr>,
    /// Source metadata
    meta: Meta,
  },
  /// A tuple literal
  Tuple {
    /// The tuple items
    items: ThinVec<Expr>,
    /// Source metadata
    meta: Meta,
  },
  /// A map literal, `%{...}` or the update form `%{base | ...}`
  Map {
    /// The value being updated, if the update syntax was used
    base: Option<Box<Expr>>,
    /// The map fields, each a [`Expr::Pair`]
    fields: ThinVec<Expr>,
    /// Source metadata
    meta: Meta,
  },
  /// A bitstring literal, `<<...>>`
  Bitstring {
    /// The bitstring segments
    segments: ThinVec<Expr>,
    /// Source metadata
    meta: Meta,
  },
  /// A capture argument slot, `&1`
  CaptureSlot {
    /// The slot number
    index: u32,
    /// Source metadata
    meta: Meta,
  },
  /// A function capture by name and arity, `&foo/2` or `&Mod.foo/2`
  CaptureName {
    /// The module the function lives on, if any
    receiver: Option<Box<Expr>>,
    /// The function name
    name: String,
    /// The function arity
    arity: u32,
    /// Source metadata
    meta: Meta,
  },
  /// A capture of an arbitrary expression, `&(... &1 ...)`
  Capture {
    /// The captured expression
    body: Box<Expr>,
    /// Source metadata
    meta: Meta,
  },
  /// An anonymous function, `fn ... end`
  Fn {
    /// The function's clauses
    clauses: Vec<Clause>,
    /// Source metadata
    meta: Meta,
  },
  /// A unary operator application
  Unary {
    /// The operator
    op: UnaryOp,
    /// The operand
    operand: Box<Expr>,
    /// Source metadata
    meta: Meta,
  },
  /// A binary operator application
  Binary {
    /// The operator
    op: BinaryOp,
    /// The left operand
    left: Box<Expr>,
    /// The right operand
    right: Box<Expr>,
    /// Source metadata
    meta: Meta,
  },
  /// A key/value pair, either `key: value` or `key => value`
  Pair {
    /// The key
    key: Box<Expr>,
    /// The value
    value: Box<Expr>,
    /// Was the pair written with the `key: value` keyword shorthand?
    keyword: bool,
  },
  /// A call, possibly carrying a `do` block
  Call {
    /// What is being called
    callee: Callee,
    /// The call arguments
    args: ThinVec<Expr>,
    /// The `do` block sections, empty when there is no block
    sections: Vec<DoSection>,
    /// Did the source write parentheses around the arguments?
    parens: bool,
    /// Source metadata
    meta: Meta,
  },
}

impl Expr {
  /// The node's source metadata
  #[must_use]
  pub fn meta(&self) -> Meta {
    match self {
      Self::Integer { meta, .. }
      | Self::Float { meta, .. }
      | Self::Boolean { meta, .. }
      | Self::Nil { meta }
      | Self::Atom { meta, .. }
      | Self::String { meta, .. }
      | Self::Charlist { meta, .. }
      | Self::Sigil { meta, .. }
      | Self::Var { meta, .. }
      | Self::Alias { meta, .. }
      | Self::ModuleAttribute { meta, .. }
      | Self::List { meta, .. }
      | Self::Tuple { meta, .. }
      | Self::Map { meta, .. }
      | Self::Bitstring { meta, .. }
      | Self::CaptureSlot { meta, .. }
      | Self::CaptureName { meta, .. }
      | Self::Capture { meta, .. }
      | Self::Fn { meta, .. }
      | Self::Unary { meta, .. }
      | Self::Binary { meta, .. }
      | Self::Call { meta, .. } => *meta,
      Self::Pair { key, .. } => key.meta(),
    }
  }

  /// The first source line the node spans
  #[must_use]
  pub fn start_line(&self) -> u32 {
    match self {
      Self::Pair { key, .. } => key.start_line(),
      Self::Binary { left, meta, .. } => left.start_line().min(meta.line),
      _ => self.meta().line,
    }
  }

  /// The last source line the node spans, considering all its children
  #[must_use]
  pub fn end_line(&self) -> u32 {
    let meta = self.meta();
    let own = meta.end_line.unwrap_or(meta.line);

    let children = match self {
      Self::Integer { .. }
      | Self::Float { .. }
      | Self::Boolean { .. }
      | Self::Nil { .. }
      | Self::Atom { .. }
      | Self::Var { .. }
      | Self::Alias { .. }
      | Self::CaptureSlot { .. }
      | Self::CaptureName { .. } => own,
      Self::String { meta, .. }
      | Self::Charlist { meta, .. }
      | Self::Sigil { meta, .. } => meta.end_line.unwrap_or(meta.line),
      Self::ModuleAttribute { value, .. } => {
        value.as_ref().map_or(own, |value| value.end_line())
      }
      Self::List { items, .. } | Self::Tuple { items, .. } => {
        items.iter().map(Expr::end_line).max().unwrap_or(own)
      }
      Self::Map { base, fields, .. } => base
        .iter()
        .map(|base| base.end_line())
        .chain(fields.iter().map(Expr::end_line))
        .max()
        .unwrap_or(own),
      Self::Bitstring { segments, .. } => {
        segments.iter().map(Expr::end_line).max().unwrap_or(own)
      }
      Self::Capture { body, .. } => body.end_line(),
      Self::Fn { clauses, .. } => {
        clauses.iter().map(Clause::end_line).max().unwrap_or(own)
      }
      Self::Unary { operand, .. } => operand.end_line(),
      Self::Binary { right, .. } => right.end_line(),
      Self::Pair { value, .. } => value.end_line(),
      Self::Call { args, sections, .. } => args
        .iter()
        .map(Expr::end_line)
        .chain(sections.iter().map(DoSection::end_line))
        .max()
        .unwrap_or(own),
    };

    own.max(children)
  }

  /// Is the node a `key: value` keyword pair?
  #[must_use]
  pub fn is_keyword_pair(&self) -> bool {
    matches!(self, Self::Pair { keyword: true, .. })
  }

  /// Is the node a non-empty list made up entirely of keyword pairs?
  #[must_use]
  pub fn is_keyword_list(&self) -> bool {
    match self {
      Self::List { items, .. } => {
        !items.is_empty() && items.iter().all(Expr::is_keyword_pair)
      }
      _ => false,
    }
  }
}

impl Clause {
  /// The last source line the clause spans
  #[must_use]
  pub fn end_line(&self) -> u32 {
    self
      .body
      .iter()
      .map(Expr::end_line)
      .chain(self.guard.iter().map(|guard| guard.end_line()))
      .chain(self.patterns.iter().map(Expr::end_line))
      .max()
      .unwrap_or(self.line)
  }
}

impl DoSection {
  /// The last source line the section spans
  #[must_use]
  pub fn end_line(&self) -> u32 {
    match &self.body {
      SectionBody::Exprs(exprs) => {
        exprs.iter().map(Expr::end_line).max().unwrap_or(self.line)
      }
      SectionBody::Clauses(clauses) => {
        clauses.iter().map(Clause::end_line).max().unwrap_or(self.line)
      }
    }
  }
}
