use super::*;
use ast::{Callee, Expr, SectionBody, SectionKeyword, StringSegment};
use indoc::indoc;
use operators::{BinaryOp, UnaryOp};

fn parse_single(source: &str) -> Expr {
  let ast = parse(source);
  assert!(ast.is_valid(), "parse errors: {:?}", ast.errors);
  assert_eq!(ast.body.len(), 1, "expected a single expression");
  ast.body.into_iter().next().unwrap()
}

#[test]
fn match_is_binary_operator() {
  let expression = parse_single("a = 1");
  let Expr::Binary { op: BinaryOp::Match, left, right, .. } = expression else {
    panic!("expected a match");
  };
  assert!(matches!(*left, Expr::Var { ref name, .. } if name == "a"));
  assert!(matches!(*right, Expr::Integer { ref raw, .. } if raw == "1"));
}

#[test]
fn multiplication_binds_tighter_than_addition() {
  let expression = parse_single("1 + 2 * 3");
  let Expr::Binary { op: BinaryOp::Add, right, .. } = expression else {
    panic!("expected an addition");
  };
  assert!(matches!(*right, Expr::Binary { op: BinaryOp::Multiply, .. }));
}

#[test]
fn concat_is_right_associative() {
  let expression = parse_single("a ++ b ++ c");
  let Expr::Binary { op: BinaryOp::Concat, left, right, .. } = expression else {
    panic!("expected a concat");
  };
  assert!(matches!(*left, Expr::Var { .. }));
  assert!(matches!(*right, Expr::Binary { op: BinaryOp::Concat, .. }));
}

#[test]
fn pipeline_continues_across_newline() {
  let expression = parse_single(indoc! {"
    value
    |> transform()
  "});
  assert!(matches!(
    expression,
    Expr::Binary { op: BinaryOp::Pipe, .. }
  ));
}

#[test]
fn not_in_is_a_single_operator() {
  let expression = parse_single("x not in [1, 2]");
  assert!(matches!(
    expression,
    Expr::Binary { op: BinaryOp::NotIn, .. }
  ));
}

#[test]
fn unary_minus_applies_before_binary() {
  let expression = parse_single("-x + 1");
  let Expr::Binary { op: BinaryOp::Add, left, .. } = expression else {
    panic!("expected an addition");
  };
  assert!(matches!(
    *left,
    Expr::Unary { op: UnaryOp::Minus, .. }
  ));
}

#[test]
fn trailing_keyword_arguments_group_into_a_list() {
  let expression = parse_single("f(1, a: 2, b: 3)");
  let Expr::Call { args, parens: true, .. } = expression else {
    panic!("expected a call");
  };
  assert_eq!(args.len(), 2);
  assert!(args[1].is_keyword_list());
}

#[test]
fn call_without_parens_takes_a_block() {
  let expression = parse_single(indoc! {"
    if ready do
      1
    else
      2
    end
  "});
  let Expr::Call { callee, args, sections, parens: false, .. } = expression else {
    panic!("expected a call");
  };
  assert!(matches!(callee, Callee::Local(ref name) if name == "if"));
  assert_eq!(args.len(), 1);
  assert_eq!(sections.len(), 2);
  assert_eq!(sections[1].keyword, SectionKeyword::Else);
}

#[test]
fn block_binds_to_the_outermost_call() {
  let expression = parse_single(indoc! {"
    assert valid? user do
      :ok
    end
  "});
  let Expr::Call { callee, args, sections, .. } = expression else {
    panic!("expected a call");
  };
  assert!(matches!(callee, Callee::Local(ref name) if name == "assert"));
  assert_eq!(sections.len(), 1);

  // The inner call keeps its argument but not the block
  let Expr::Call { sections: inner, .. } = &args[0] else {
    panic!("expected an inner call");
  };
  assert!(inner.is_empty());
}

#[test]
fn case_sections_hold_clauses() {
  let expression = parse_single(indoc! {"
    case value do
      :ok -> 1
      :error -> 2
    end
  "});
  let Expr::Call { sections, .. } = expression else {
    panic!("expected a call");
  };
  let SectionBody::Clauses(clauses) = &sections[0].body else {
    panic!("expected clauses");
  };
  assert_eq!(clauses.len(), 2);
}

#[test]
fn clause_guards_sit_between_patterns_and_arrow() {
  let expression = parse_single("fn x when x > 0 -> x end");
  let Expr::Fn { clauses, .. } = expression else {
    panic!("expected a fn");
  };
  assert_eq!(clauses[0].patterns.len(), 1);
  assert!(clauses[0].guard.is_some());
  assert_eq!(clauses[0].body.len(), 1);
}

#[test]
fn remote_call_on_alias() {
  let expression = parse_single("String.trim(name)");
  let Expr::Call { callee: Callee::Remote { receiver, name }, .. } = expression else {
    panic!("expected a remote call");
  };
  assert!(matches!(*receiver, Expr::Alias { .. }));
  assert_eq!(name, "trim");
}

#[test]
fn capture_by_name_and_arity() {
  assert!(matches!(
    parse_single("&foo/2"),
    Expr::CaptureName { receiver: None, arity: 2, .. }
  ));
  assert!(matches!(
    parse_single("&Mod.fun/1"),
    Expr::CaptureName { receiver: Some(_), arity: 1, .. }
  ));
  assert!(matches!(parse_single("&1"), Expr::CaptureSlot { index: 1, .. }));
  assert!(matches!(parse_single("&(&1 + 1)"), Expr::Capture { .. }));
}

#[test]
fn map_update_keeps_the_base() {
  let expression = parse_single("%{map | a: 1}");
  let Expr::Map { base, fields, .. } = expression else {
    panic!("expected a map");
  };
  assert!(base.is_some());
  assert_eq!(fields.len(), 1);
}

#[test]
fn heredoc_contents_are_dedented() {
  let expression = parse_single(indoc! {r#"
    x = """
      hello
      """
  "#});
  let Expr::Binary { right, .. } = expression else {
    panic!("expected a match");
  };
  let Expr::String { segments, heredoc: true, .. } = *right else {
    panic!("expected a heredoc");
  };
  assert_eq!(segments, vec![StringSegment::Literal("hello\n".to_owned())]);
}

#[test]
fn interpolation_splits_string_segments() {
  let Expr::String { segments, .. } = parse_single(r#""a#{b}c""#) else {
    panic!("expected a string");
  };
  assert_eq!(segments.len(), 3);
  assert!(matches!(&segments[0], StringSegment::Literal(text) if text == "a"));
  let StringSegment::Interpolation(interpolation) = &segments[1] else {
    panic!("expected an interpolation");
  };
  assert!(matches!(interpolation.body[0], Expr::Var { .. }));
}

#[test]
fn comments_record_their_surrounding_gaps() {
  let ast = parse(indoc! {"
    # leading
    x = 1 # trailing

    # after blank
    y = 2
  "});
  assert!(ast.is_valid());
  assert_eq!(ast.comments.len(), 3);

  assert_eq!(ast.comments[0].newlines_before, Some(1));
  assert_eq!(ast.comments[1].newlines_before, None);
  assert_eq!(ast.comments[2].newlines_before, Some(2));
  assert_eq!(ast.comments[2].newlines_after, 1);
}

#[test]
fn comment_text_is_normalized() {
  let ast = parse("#no space\n## banner\n#");
  assert_eq!(ast.comments[0].text, "# no space");
  assert_eq!(ast.comments[1].text, "## banner");
  assert_eq!(ast.comments[2].text, "#");
}

#[test]
fn errors_recover_at_the_next_line() {
  let ast = parse(indoc! {"
    ] oops
    ok = 1
  "});
  assert_eq!(ast.errors.len(), 1);
  assert_eq!(ast.errors[0].line, 1);
  assert_eq!(ast.body.len(), 1);
}

#[test]
fn errors_name_the_offending_token() {
  let ast = parse("] oops");
  assert_eq!(ast.errors[0].token.as_deref(), Some("]"));
  assert_eq!(ast.errors[0].description(), "expected an expression, found `]`");

  let ast = parse("fn x -> x");
  assert_eq!(ast.errors[0].token, None);
}

#[test]
fn number_literals_keep_their_source_form() {
  assert!(matches!(
    parse_single("0xFF"),
    Expr::Integer { ref raw, .. } if raw == "0xFF"
  ));
  assert!(matches!(
    parse_single("1_000"),
    Expr::Integer { ref raw, .. } if raw == "1_000"
  ));
  assert!(matches!(
    parse_single("1.5e3"),
    Expr::Float { ref raw, .. } if raw == "1.5e3"
  ));
}

#[test]
fn sigils_capture_delimiter_and_modifiers() {
  let Expr::Sigil { name, open, modifiers, .. } = parse_single("~r/ab+c/i") else {
    panic!("expected a sigil");
  };
  assert_eq!(name, "r");
  assert_eq!(open, '/');
  assert_eq!(modifiers, "i");
}

#[test]
fn range_operator_has_no_spacing() {
  let expression = parse_single("1..10");
  assert!(matches!(
    expression,
    Expr::Binary { op: BinaryOp::Range, .. }
  ));
}
