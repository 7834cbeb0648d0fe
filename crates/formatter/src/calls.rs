//! Rendering of calls: argument lists, `do` blocks, and `fn` expressions.
//!
//! Parentheses are normalised independently of how the call was written:
//! known definition and control flow forms drop them wherever the bare
//! arguments re-parse unambiguously, every other call gains them. A
//! trailing keyword list renders bare, and a trailing collection or `fn`
//! may take the breaking decision for the whole argument list, hugging
//! the closing parenthesis.

use crate::expression::Context;
use crate::formatter::Formatter;
use sable_doc::{DocBuilder, Document};
use sable_syntax::{
  ast::{Callee, Clause, DoSection, Expr, Meta, SectionBody},
  operators::BinaryOp,
};

impl<'a, 'c> Formatter<'a, 'c> {
  pub(crate) fn call(&mut self, expression: &'c Expr, context: Context) -> Document<'a> {
    let docs = self.docs;
    let Expr::Call { callee, args, sections, parens, meta } = expression else {
      return Document::Empty;
    };

    if !sections.is_empty() {
      return self.block_call(callee, args, sections, meta);
    }

    let callee_doc = self.callee(callee, args.len());
    if args.is_empty() {
      // A dotted reference written bare, like `mod.fun`, stays bare
      return if *parens {
        docs.concat([callee_doc, Document::Text("()")])
      } else {
        callee_doc
      };
    }

    let keep_bare = context.allows_elision()
      && matches!(callee, Callee::Local(name) if self.config.allows_no_parens(name, args.len()));

    // The sole argument of a bare call ends the statement, so it may
    // itself stay bare
    let last_context = if keep_bare && args.len() == 1 {
      Context::Operand
    } else {
      Context::Argument
    };

    let (arguments, hugged) = self.call_args(args, last_context);
    let call_doc = if keep_bare {
      docs.group(docs.concat([
        callee_doc,
        Document::Text(" "),
        docs.nest(join(docs, arguments), 2),
      ]))
    } else {
      docs.group(docs.concat([
        callee_doc,
        Document::Text("("),
        docs.nest_if_broken(
          docs.concat([Document::Break(""), join(docs, arguments)]),
          2,
        ),
        Document::Break(""),
        Document::Text(")"),
      ]))
    };

    // Ancestor groups measure a hugging call at its flat width, keeping
    // the payload's lookahead scoped to the argument list which owns it
    if hugged {
      docs.next_break_fits(call_doc, false)
    } else {
      call_doc
    }
  }

  fn callee(&mut self, callee: &'c Callee, arity: usize) -> Document<'a> {
    let docs = self.docs;
    match callee {
      Callee::Local(name) => docs.text(name),
      Callee::Remote { receiver, name } => {
        let name = self.renamed(receiver, name, arity);
        let receiver_doc = match &**receiver {
          Expr::Binary { .. }
          | Expr::Unary { .. }
          | Expr::Fn { .. }
          | Expr::Capture { .. } => {
            let inner = self.expression(receiver, Context::Argument);
            docs.concat([Document::Text("("), inner, Document::Text(")")])
          }
          _ => self.expression(receiver, Context::Argument),
        };
        docs.concat([receiver_doc, docs.text(format!(".{name}"))])
      }
      Callee::Anonymous(inner) => {
        let needs_parens = !matches!(&**inner, Expr::Var { .. } | Expr::Call { .. });
        let inner_doc = self.expression(inner, Context::Argument);
        if needs_parens {
          docs.concat([
            Document::Text("("),
            inner_doc,
            Document::Text(")"),
            Document::Text("."),
          ])
        } else {
          docs.concat([inner_doc, Document::Text(".")])
        }
      }
    }
  }

  /// Deprecated standard library functions are rewritten to their
  /// replacements for recent enough target versions
  fn renamed(&self, receiver: &Expr, name: &'c str, arity: usize) -> &'c str {
    let on_enum = matches!(
      receiver,
      Expr::Alias { segments, .. } if segments.len() == 1 && segments[0] == "Enum"
    );
    if self.config.renames_deprecated() && on_enum && name == "partition" && arity == 2 {
      "split_with"
    } else {
      name
    }
  }

  /// The rendered arguments of a call, and whether the last one was
  /// marked to take the argument list's breaking decision for itself.
  /// A trailing keyword list loses its brackets.
  fn call_args(
    &mut self,
    args: &'c [Expr],
    last_context: Context,
  ) -> (Vec<Document<'a>>, bool) {
    let docs = self.docs;

    // Keyword sugar would read as a filter inside a multi-generator
    // comprehension, so it only applies below two generators
    let generators = args
      .iter()
      .filter(|arg| matches!(arg, Expr::Binary { op: BinaryOp::LeftArrow, .. }))
      .count();
    let (leading, keywords) = match keyword_tail(args) {
      Some((leading, keywords)) if generators < 2 => (leading, keywords),
      _ => (args, &[] as &[Expr]),
    };

    let mut hugged = false;
    let mut arguments = Vec::with_capacity(leading.len() + keywords.len());
    for (index, argument) in leading.iter().enumerate() {
      let last = index + 1 == leading.len() && keywords.is_empty();
      let context = if last { last_context } else { Context::Argument };
      let doc = self.expression(argument, context);
      if last && breakable_payload(argument) {
        arguments.push(docs.next_break_fits(doc, true));
        hugged = true;
      } else {
        arguments.push(doc);
      }
    }
    for keyword in keywords {
      arguments.push(self.expression(keyword, Context::Argument));
    }
    (arguments, hugged)
  }

  fn block_call(
    &mut self,
    callee: &'c Callee,
    args: &'c [Expr],
    sections: &'c [DoSection],
    meta: &Meta,
  ) -> Document<'a> {
    let docs = self.docs;
    let callee_doc = self.callee(callee, args.len());

    let head = if args.is_empty() {
      callee_doc
    } else {
      // The block counts as an argument when matching no-parens forms
      let keep_bare =
        matches!(callee, Callee::Local(name) if self.config.allows_no_parens(name, args.len() + 1));
      let last_context = if keep_bare && args.len() == 1 {
        Context::Operand
      } else {
        Context::Argument
      };
      let (arguments, hugged) = self.call_args(args, last_context);

      let head = if keep_bare {
        docs.group(docs.concat([
          callee_doc,
          Document::Text(" "),
          docs.nest(join(docs, arguments), 2),
        ]))
      } else {
        docs.group(docs.concat([
          callee_doc,
          Document::Text("("),
          docs.nest_if_broken(
            docs.concat([Document::Break(""), join(docs, arguments)]),
            2,
          ),
          Document::Break(""),
          Document::Text(")"),
        ]))
      };
      if hugged {
        docs.next_break_fits(head, false)
      } else {
        head
      }
    };

    let mut parts = vec![head];
    for (index, section) in sections.iter().enumerate() {
      if index == 0 {
        parts.push(docs.text(format!(" {}", section.keyword.as_str())));
      } else {
        parts.push(Document::Line);
        parts.push(Document::Text(section.keyword.as_str()));
      }

      let boundary = sections
        .get(index + 1)
        .map_or_else(|| meta.end_line.unwrap_or(section.line), |next| next.line);
      let body = match &section.body {
        SectionBody::Exprs(exprs) => self.body(exprs, boundary),
        SectionBody::Clauses(clauses) => self.clauses(clauses, boundary),
      };
      if !matches!(body, Document::Empty) {
        parts.push(docs.nest(docs.concat([Document::Line, body]), 2));
      }
    }
    parts.push(Document::Line);
    parts.push(Document::Text("end"));

    docs.concat(parts)
  }

  /// One `patterns [when guard] -> body` clause, and whether the clause
  /// must break because its body holds multiple statements
  pub(crate) fn clause_pieces(&mut self, clause: &'c Clause) -> (Document<'a>, bool) {
    let docs = self.docs;

    let mut head = Vec::new();
    for (index, pattern) in clause.patterns.iter().enumerate() {
      if index > 0 {
        head.push(Document::Text(", "));
      }
      head.push(self.expression(pattern, Context::Argument));
    }
    if let Some(guard) = &clause.guard {
      head.push(Document::Text(" when "));
      head.push(self.expression(guard, Context::Argument));
    }
    head.push(if head.is_empty() {
      Document::Text("->")
    } else {
      Document::Text(" ->")
    });
    let head = docs.concat(head);

    let body = self.body(&clause.body, 0);
    let pieces = if matches!(body, Document::Empty) {
      head
    } else {
      docs.concat([
        head,
        docs.nest(docs.concat([Document::Break(" "), body]), 2),
      ])
    };
    (pieces, clause.body.len() > 1)
  }

  pub(crate) fn fn_expression(
    &mut self,
    clauses: &'c [Clause],
    end_line: u32,
  ) -> Document<'a> {
    let docs = self.docs;

    if let [clause] = clauses {
      let (pieces, force) = self.clause_pieces(clause);
      let inner = docs.concat([
        Document::Text("fn "),
        pieces,
        Document::Break(" "),
        Document::Text("end"),
      ]);
      return docs.group(if force { docs.force_break(inner) } else { inner });
    }

    docs.concat([
      Document::Text("fn"),
      docs.nest(docs.concat([Document::Line, self.clauses(clauses, end_line)]), 2),
      Document::Line,
      Document::Text("end"),
    ])
  }
}

/// Split a trailing keyword list off an argument list
fn keyword_tail(args: &[Expr]) -> Option<(&[Expr], &[Expr])> {
  let (last, leading) = args.split_last()?;
  if !last.is_keyword_list() {
    return None;
  }
  let Expr::List { items, .. } = last else { return None };
  Some((leading, items.as_slice()))
}

/// Does the argument take the argument list's breaking decision for
/// itself when it is last?
fn breakable_payload(expression: &Expr) -> bool {
  match expression {
    Expr::String { heredoc, .. }
    | Expr::Charlist { heredoc, .. }
    | Expr::Sigil { heredoc, .. } => *heredoc,
    Expr::Map { .. }
    | Expr::List { .. }
    | Expr::Tuple { .. }
    | Expr::Bitstring { .. }
    | Expr::Fn { .. } => true,
    _ => false,
  }
}

/// Join argument documents with breakable comma separators
fn join<'a>(docs: DocBuilder<'a>, arguments: Vec<Document<'a>>) -> Document<'a> {
  let mut parts = Vec::with_capacity(arguments.len() * 3);
  for (index, argument) in arguments.into_iter().enumerate() {
    if index > 0 {
      parts.push(Document::Text(","));
      parts.push(Document::Break(" "));
    }
    parts.push(argument);
  }
  docs.concat(parts)
}
