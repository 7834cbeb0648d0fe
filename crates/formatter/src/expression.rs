//! Rendering of expressions: literals, collections, and operator chains.
//!
//! Operator layout is driven by the spacing class of each operator, and
//! chains of the same operator on its associative side render as one flat
//! run which breaks at every operator together. Parentheses from the
//! source are not kept, they are re-derived from precedence.

use crate::formatter::Formatter;
use crate::literals;
use sable_doc::Document;
use sable_syntax::{
  ast::{Expr, Interpolation, StringSegment},
  operators::{Associativity, BinaryOp, OperatorSpacing, UnaryOp},
};

/// Where an expression appears, deciding how calls may omit parentheses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Context {
  /// A statement position: definition and control-flow calls may keep
  /// their arguments bare
  Block,
  /// An operand of an operator
  Operand,
  /// An argument, collection element, or other nested position
  Argument,
}

impl Context {
  /// May definition and control-flow calls in this position keep their
  /// arguments bare? Only where a following comma or operator could not
  /// be swallowed into the bare argument list on a re-parse.
  pub(crate) fn allows_elision(self) -> bool {
    matches!(self, Context::Block | Context::Operand)
  }
}

/// Which operand of a binary operator an expression is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
  Left,
  Right,
}

/// Operators whose operands always take parentheses when they are
/// themselves operator applications
const REQUIRED_PARENS: &[BinaryOp] = &[
  BinaryOp::Pipe,
  BinaryOp::ShiftLeft,
  BinaryOp::ShiftRight,
  BinaryOp::LeftWave,
  BinaryOp::RightWave,
  BinaryOp::DoubleLeftWave,
  BinaryOp::DoubleRightWave,
  BinaryOp::BothWave,
  BinaryOp::In,
  BinaryOp::NotIn,
  BinaryOp::Concat,
  BinaryOp::Remove,
  BinaryOp::ConcatAll,
  BinaryOp::RemoveAll,
  BinaryOp::StringConcat,
];

const LOGICAL: &[BinaryOp] =
  &[BinaryOp::And, BinaryOp::AndAnd, BinaryOp::Or, BinaryOp::OrOr];

impl<'a, 'c> Formatter<'a, 'c> {
  pub fn expression(&mut self, expression: &'c Expr, context: Context) -> Document<'a> {
    let docs = self.docs;

    match expression {
      Expr::Integer { raw, .. } => docs.text(literals::integer(raw)),
      Expr::Float { raw, .. } => docs.text(literals::float(raw)),
      Expr::Boolean { value, .. } => {
        Document::Text(if *value { "true" } else { "false" })
      }
      Expr::Nil { .. } => Document::Text("nil"),
      Expr::Atom { name, quoted, .. } => self.atom(name, *quoted),
      Expr::String { segments, heredoc, .. } => {
        self.quoted_literal(segments, *heredoc, "\"", "\"\"\"")
      }
      Expr::Charlist { segments, heredoc, .. } => {
        self.quoted_literal(segments, *heredoc, "'", "'''")
      }
      Expr::Sigil { name, segments, open, modifiers, heredoc, .. } => {
        self.sigil(name, segments, *open, modifiers, *heredoc)
      }
      Expr::Var { name, .. } => docs.text(name),
      Expr::Alias { segments, .. } => docs.text(segments.join(".")),
      Expr::ModuleAttribute { name, value, .. } => {
        self.module_attribute(name, value.as_deref(), context)
      }
      Expr::List { items, .. } => self.container(items, "[", "]"),
      Expr::Tuple { items, .. } => self.container(items, "{", "}"),
      Expr::Map { base, fields, .. } => self.map(base.as_deref(), fields),
      Expr::Bitstring { segments, .. } => self.container(segments, "<<", ">>"),
      Expr::CaptureSlot { index, .. } => docs.text(format!("&{index}")),
      Expr::CaptureName { receiver, name, arity, .. } => {
        self.capture_name(receiver.as_deref(), name, *arity)
      }
      Expr::Capture { body, .. } => self.capture(body),
      Expr::Fn { clauses, meta } => {
        self.fn_expression(clauses, meta.end_line.unwrap_or(meta.line))
      }
      Expr::Unary { op, operand, .. } => self.unary(*op, operand, context),
      Expr::Binary { op, left, right, .. } => self.binary(*op, left, right, context),
      Expr::Pair { key, value, keyword } => self.pair(key, value, *keyword),
      Expr::Call { .. } => self.call(expression, context),
    }
  }

  fn atom(&self, name: &str, quoted: bool) -> Document<'a> {
    if !quoted || literals::plain_atom(name) {
      self.docs.text(format!(":{name}"))
    } else {
      self.docs.text(format!(":\"{name}\""))
    }
  }

  fn module_attribute(
    &mut self,
    name: &str,
    value: Option<&'c Expr>,
    context: Context,
  ) -> Document<'a> {
    let docs = self.docs;
    let value_context = if context.allows_elision() {
      Context::Operand
    } else {
      Context::Argument
    };

    match value {
      None => docs.text(format!("@{name}")),
      Some(value) => {
        let value_doc = self.expression(value, value_context);
        docs.concat([docs.text(format!("@{name} ")), value_doc])
      }
    }
  }

  fn pair(&mut self, key: &'c Expr, value: &'c Expr, keyword: bool) -> Document<'a> {
    let docs = self.docs;
    let value_doc = self.expression(value, Context::Argument);

    if keyword {
      let key_doc = match key {
        Expr::Atom { name, .. } if literals::plain_atom(name) => {
          docs.text(format!("{name}: "))
        }
        Expr::Atom { name, .. } => docs.text(format!("\"{name}\": ")),
        _ => {
          let key_doc = self.expression(key, Context::Argument);
          docs.concat([key_doc, Document::Text(": ")])
        }
      };
      docs.concat([key_doc, value_doc])
    } else {
      let key_doc = self.expression(key, Context::Argument);
      docs.concat([key_doc, Document::Text(" => "), value_doc])
    }
  }

  fn container(
    &mut self,
    items: &'c [Expr],
    open: &'static str,
    close: &'static str,
  ) -> Document<'a> {
    let docs = self.docs;
    if items.is_empty() {
      return docs.text(format!("{open}{close}"));
    }

    let elements = self.separated(items);
    docs.group(docs.concat([
      Document::Text(open),
      docs.nest_if_broken(docs.concat([Document::Break(""), elements]), 2),
      Document::Break(""),
      Document::Text(close),
    ]))
  }

  fn map(&mut self, base: Option<&'c Expr>, fields: &'c [Expr]) -> Document<'a> {
    let docs = self.docs;
    if base.is_none() && fields.is_empty() {
      return Document::Text("%{}");
    }

    let mut inner = Vec::new();
    if let Some(base) = base {
      inner.push(self.expression(base, Context::Argument));
      inner.push(Document::Text(" |"));
      inner.push(Document::Break(" "));
    }
    inner.push(self.separated(fields));
    let inner = docs.concat(inner);

    docs.group(docs.concat([
      Document::Text("%{"),
      docs.nest_if_broken(docs.concat([Document::Break(""), inner]), 2),
      Document::Break(""),
      Document::Text("}"),
    ]))
  }

  /// Comma-separated elements, each breakable onto its own line
  fn separated(&mut self, items: &'c [Expr]) -> Document<'a> {
    let docs = self.docs;
    let mut parts = Vec::new();
    for (index, item) in items.iter().enumerate() {
      if index > 0 {
        parts.push(Document::Text(","));
        parts.push(Document::Break(" "));
      }
      parts.push(self.expression(item, Context::Argument));
    }
    docs.concat(parts)
  }

  fn capture(&mut self, body: &'c Expr) -> Document<'a> {
    let docs = self.docs;
    match body {
      Expr::Binary { .. } | Expr::Unary { .. } => {
        let inner = self.expression(body, Context::Argument);
        docs.concat([Document::Text("&("), inner, Document::Text(")")])
      }
      _ => {
        let inner = self.expression(body, Context::Argument);
        docs.concat([Document::Text("&"), inner])
      }
    }
  }

  fn capture_name(
    &mut self,
    receiver: Option<&'c Expr>,
    name: &str,
    arity: u32,
  ) -> Document<'a> {
    let docs = self.docs;
    match receiver {
      Some(receiver) => {
        let receiver_doc = self.expression(receiver, Context::Argument);
        docs.concat([
          Document::Text("&"),
          receiver_doc,
          docs.text(format!(".{name}/{arity}")),
        ])
      }
      None => docs.text(format!("&{name}/{arity}")),
    }
  }

  fn unary(&mut self, op: UnaryOp, operand: &'c Expr, context: Context) -> Document<'a> {
    let docs = self.docs;
    let prefix = if op.is_word() {
      docs.text(format!("{} ", op.symbol()))
    } else {
      Document::Text(op.symbol())
    };

    let needs_parens = match operand {
      Expr::Binary { .. } => true,
      Expr::Unary { op: child, .. } => {
        !(matches!(op, UnaryOp::Not | UnaryOp::Bang) && *child == op)
      }
      _ => false,
    };

    if needs_parens {
      let inner = self.expression(operand, Context::Argument);
      docs.concat([prefix, Document::Text("("), inner, Document::Text(")")])
    } else {
      let operand_context = if context.allows_elision() {
        Context::Operand
      } else {
        Context::Argument
      };
      let inner = self.expression(operand, operand_context);
      docs.concat([prefix, inner])
    }
  }

  fn binary(
    &mut self,
    op: BinaryOp,
    left: &'c Expr,
    right: &'c Expr,
    context: Context,
  ) -> Document<'a> {
    let docs = self.docs;

    let mut operands = Vec::new();
    match op.associativity() {
      Associativity::Left => {
        collect_chain(op, left, &mut operands);
        operands.push(right);
      }
      Associativity::Right => {
        operands.push(left);
        collect_chain(op, right, &mut operands);
      }
    }

    let symbol = op.symbol();
    let mut parts = Vec::new();
    for (index, operand) in operands.iter().enumerate() {
      let side = side_of(index, operands.len(), op.associativity());
      // Only the final operand ends the statement, so only there can a
      // bare argument list not swallow what follows
      let operand_context = if index + 1 == operands.len() && context.allows_elision() {
        Context::Operand
      } else {
        Context::Argument
      };
      let doc = self.operand(operand, op, side, operand_context);
      if index == 0 {
        parts.push(doc);
        continue;
      }

      match op.spacing() {
        OperatorSpacing::NoSpace => {
          parts.push(docs.text(symbol));
          parts.push(doc);
        }
        OperatorSpacing::NoNewline => {
          parts.push(docs.text(format!(" {symbol} ")));
          parts.push(doc);
        }
        OperatorSpacing::LeftBreak => {
          parts.push(docs.group_inherit(docs.concat([
            Document::Break(" "),
            docs.text(format!("{symbol} ")),
            doc,
          ])));
        }
        OperatorSpacing::RightBreak | OperatorSpacing::Flexible => {
          parts.push(docs.text(format!(" {symbol}")));
          parts.push(
            docs.group_inherit(docs.nest(docs.concat([Document::Break(" "), doc]), 2)),
          );
        }
      }
    }

    docs.group(docs.concat(parts))
  }

  fn operand(
    &mut self,
    operand: &'c Expr,
    parent: BinaryOp,
    side: Side,
    context: Context,
  ) -> Document<'a> {
    if let Expr::Binary { op: child, .. } = operand {
      if needs_operand_parens(parent, *child, side) {
        return self.parenthesized(operand);
      }
    }
    self.expression(operand, context)
  }

  pub(crate) fn parenthesized(&mut self, expression: &'c Expr) -> Document<'a> {
    let docs = self.docs;
    let inner = self.expression(expression, Context::Argument);
    docs.group(docs.concat([
      Document::Text("("),
      docs.nest_if_broken(docs.concat([Document::Break(""), inner]), 2),
      Document::Break(""),
      Document::Text(")"),
    ]))
  }

  fn quoted_literal(
    &mut self,
    segments: &'c [StringSegment],
    heredoc: bool,
    delimiter: &'static str,
    triple: &'static str,
  ) -> Document<'a> {
    let docs = self.docs;
    if heredoc {
      let mut parts = vec![Document::Text(triple), Document::Line];
      parts.extend(self.segment_docs(segments, true));
      parts.push(Document::Text(triple));
      docs.concat(parts)
    } else {
      let mut parts = vec![Document::Text(delimiter)];
      parts.extend(self.segment_docs(segments, false));
      parts.push(Document::Text(delimiter));
      docs.concat(parts)
    }
  }

  fn sigil(
    &mut self,
    name: &str,
    segments: &'c [StringSegment],
    open: char,
    modifiers: &str,
    heredoc: bool,
  ) -> Document<'a> {
    let docs = self.docs;
    let close = match open {
      '(' => ')',
      '[' => ']',
      '{' => '}',
      '<' => '>',
      _ => open,
    };

    if heredoc {
      let triple: String = std::iter::repeat_n(open, 3).collect();
      let mut parts = vec![docs.text(format!("~{name}{triple}")), Document::Line];
      parts.extend(self.segment_docs(segments, true));
      parts.push(docs.text(format!("{triple}{modifiers}")));
      docs.concat(parts)
    } else {
      let mut parts = vec![docs.text(format!("~{name}{open}"))];
      parts.extend(self.segment_docs(segments, false));
      parts.push(docs.text(format!("{close}{modifiers}")));
      docs.concat(parts)
    }
  }

  /// The pieces of a string-like literal. In multiline literals the content
  /// newlines become layout lines, so the content follows the indentation
  /// of wherever the literal ends up.
  fn segment_docs(
    &mut self,
    segments: &'c [StringSegment],
    multiline: bool,
  ) -> Vec<Document<'a>> {
    let docs = self.docs;
    let mut parts = Vec::new();

    for segment in segments {
      match segment {
        StringSegment::Literal(text) => {
          if multiline {
            for (index, piece) in text.split('\n').enumerate() {
              if index > 0 {
                parts.push(Document::Line);
              }
              if !piece.is_empty() {
                parts.push(docs.text(piece));
              }
            }
          } else {
            parts.push(docs.text(text));
          }
        }
        StringSegment::Interpolation(interpolation) => {
          parts.push(self.interpolation(interpolation));
        }
      }
    }

    parts
  }

  fn interpolation(&mut self, interpolation: &'c Interpolation) -> Document<'a> {
    let docs = self.docs;
    let mut inner =
      Formatter::new(self.allocator, self.config, &interpolation.comments);

    let body = if interpolation.comments.is_empty() && interpolation.body.len() <= 1 {
      match interpolation.body.first() {
        Some(expression) => inner.expression(expression, Context::Block),
        None => Document::Empty,
      }
    } else {
      inner.body(&interpolation.body, u32::MAX)
    };

    docs.concat([Document::Text("#{"), body, Document::Text("}")])
  }
}

/// Flatten nested applications of the same operator on its associative side
fn collect_chain<'c>(op: BinaryOp, expression: &'c Expr, operands: &mut Vec<&'c Expr>) {
  if let Expr::Binary { op: child, left, right, .. } = expression {
    if *child == op {
      match op.associativity() {
        Associativity::Left => {
          collect_chain(op, left, operands);
          operands.push(right);
        }
        Associativity::Right => {
          operands.push(left);
          collect_chain(op, right, operands);
        }
      }
      return;
    }
  }
  operands.push(expression);
}

fn side_of(index: usize, count: usize, associativity: Associativity) -> Side {
  match associativity {
    Associativity::Left => {
      if index == 0 { Side::Left } else { Side::Right }
    }
    Associativity::Right => {
      if index + 1 == count { Side::Right } else { Side::Left }
    }
  }
}

fn needs_operand_parens(parent: BinaryOp, child: BinaryOp, side: Side) -> bool {
  if REQUIRED_PARENS.contains(&parent) {
    return true;
  }
  if LOGICAL.contains(&parent) && LOGICAL.contains(&child) && parent != child {
    return true;
  }
  if child.precedence() < parent.precedence() {
    return true;
  }
  if child.precedence() == parent.precedence() {
    let associative_side = match parent.associativity() {
      Associativity::Left => Side::Left,
      Associativity::Right => Side::Right,
    };
    return side != associative_side;
  }
  false
}
