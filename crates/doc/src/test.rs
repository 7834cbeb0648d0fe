use super::*;

fn build<'a>(allocator: &'a Bump) -> DocBuilder<'a> {
  DocBuilder::new(allocator)
}

fn call<'a>(docs: &DocBuilder<'a>, name: &'a str, argument: Document<'a>) -> Document<'a> {
  docs.group(docs.concat([
    Document::Text(name),
    Document::Text("("),
    docs.nest_if_broken(docs.concat([Document::Break(""), argument]), 2),
    Document::Break(""),
    Document::Text(")"),
  ]))
}

#[test]
fn text_concatenation() {
  let allocator = Bump::new();
  let docs = build(&allocator);

  let doc = docs.concat([Document::Text("a"), Document::Text(" + "), Document::Text("b")]);
  assert_eq!(render(doc, 80, "\n"), "a + b");
}

#[test]
fn group_fits_flat() {
  let allocator = Bump::new();
  let docs = build(&allocator);

  let doc = call(&docs, "print", Document::Text("value"));
  assert_eq!(render(doc, 80, "\n"), "print(value)");
}

#[test]
fn group_breaks_when_too_wide() {
  let allocator = Bump::new();
  let docs = build(&allocator);

  let doc = call(&docs, "print", Document::Text("value"));
  assert_eq!(render(doc, 8, "\n"), "print(\n  value\n)");
}

#[test]
fn nested_groups_decide_independently() {
  let allocator = Bump::new();
  let docs = build(&allocator);

  let inner = call(&docs, "inner", Document::Text("aaaaaaaaaa"));
  let doc = call(&docs, "outer", inner);
  assert_eq!(render(doc, 20, "\n"), "outer(\n  inner(aaaaaaaaaa)\n)");
}

#[test]
fn hard_line_always_breaks() {
  let allocator = Bump::new();
  let docs = build(&allocator);

  let doc = docs.concat([Document::Text("a"), Document::Line, Document::Text("b")]);
  assert_eq!(render(doc, 80, "\n"), "a\nb");
}

#[test]
fn force_break_unfits_enclosing_group() {
  let allocator = Bump::new();
  let docs = build(&allocator);

  let doc = call(&docs, "f", docs.force_break(Document::Text("x")));
  assert_eq!(render(doc, 80, "\n"), "f(\n  x\n)");
}

#[test]
fn next_break_fits_defers_to_payload() {
  let allocator = Bump::new();
  let docs = build(&allocator);

  // A payload which breaks internally, wrapped so the call parentheses
  // stay on the payload's first and last lines
  let payload = docs.group(docs.concat([
    Document::Text("["),
    docs.nest(
      docs.concat([
        Document::Break(""),
        Document::Text("aaaaaaaaaa"),
        Document::Text(","),
        Document::Break(" "),
        Document::Text("bbbbbbbbbb"),
      ]),
      2,
    ),
    Document::Break(""),
    Document::Text("]"),
  ]));
  let doc = call(&docs, "f", docs.next_break_fits(payload, true));

  assert_eq!(render(doc, 16, "\n"), "f([\n  aaaaaaaaaa,\n  bbbbbbbbbb\n])");
}

#[test]
fn next_break_fits_is_shielded_by_a_disabled_marker() {
  let allocator = Bump::new();
  let docs = build(&allocator);

  let payload = docs.group(docs.concat([
    Document::Text("["),
    docs.nest(
      docs.concat([Document::Break(""), Document::Text("aaaaaaaaaa")]),
      2,
    ),
    Document::Break(""),
    Document::Text("]"),
  ]));
  let call_doc = docs.next_break_fits(
    call(&docs, "f", docs.next_break_fits(payload, true)),
    false,
  );
  let doc = docs.group(docs.concat([
    Document::Text("xxxxx"),
    Document::Break(" "),
    call_doc,
  ]));

  // The outer group measures the call flat and breaks, instead of the
  // payload's lookahead leaking out and keeping everything on one line
  assert_eq!(render(doc, 12, "\n"), "xxxxx\nf([\n  aaaaaaaaaa\n])");
}

#[test]
fn inherit_group_follows_parent() {
  let allocator = Bump::new();
  let docs = build(&allocator);

  let chain = docs.group(docs.concat([
    Document::Text("aaaa"),
    docs.group_inherit(docs.nest(
      docs.concat([Document::Break(" "), Document::Text("|> bbbb")]),
      2,
    )),
    docs.group_inherit(docs.nest(
      docs.concat([Document::Break(" "), Document::Text("|> cccc")]),
      2,
    )),
  ]));

  assert_eq!(render(chain, 80, "\n"), "aaaa |> bbbb |> cccc");
  assert_eq!(render(chain, 10, "\n"), "aaaa\n  |> bbbb\n  |> cccc");
}

#[test]
fn flex_break_fills_lines() {
  let allocator = Bump::new();
  let docs = build(&allocator);

  let doc = docs.force_break(docs.group(docs.concat([
    Document::Text("aaa"),
    Document::FlexBreak(" "),
    Document::Text("bbb"),
    Document::FlexBreak(" "),
    Document::Text("ccc"),
  ])));

  assert_eq!(render(doc, 7, "\n"), "aaa bbb\nccc");
}

#[test]
fn blank_lines_have_no_trailing_whitespace() {
  let allocator = Bump::new();
  let docs = build(&allocator);

  let doc = docs.nest(
    docs.concat([
      Document::Text("a"),
      Document::Line,
      Document::Line,
      Document::Text("b"),
    ]),
    2,
  );

  assert_eq!(render(doc, 80, "\n"), "a\n\n  b");
}

#[test]
fn unlimited_width_never_breaks_groups() {
  let allocator = Bump::new();
  let docs = build(&allocator);

  let long = "a".repeat(300);
  let doc = call(&docs, "f", docs.text(long.clone()));
  assert_eq!(render(doc, UNLIMITED_WIDTH, "\n"), format!("f({long})"));
}
