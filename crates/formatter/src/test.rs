use crate::{Arity, Config, LineEnding, Version, format, literals};
use indoc::indoc;

fn config() -> Config {
  Config { line_ending: LineEnding::LineFeed, ..Config::default() }
}

fn format_source(source: &str, config: &Config) -> String {
  let ast = sable_syntax::parse(source);
  assert!(ast.is_valid(), "parse errors: {:?}", ast.errors);
  format(&ast, config)
}

#[track_caller]
fn assert_format_with(source: &str, expected: &str, config: &Config) {
  let output = format_source(source, config);
  assert_eq!(output, expected);

  let again = format_source(&output, config);
  assert_eq!(again, output, "formatting is not idempotent");
}

#[track_caller]
fn assert_format(source: &str, expected: &str) {
  assert_format_with(source, expected, &config());
}

#[track_caller]
fn assert_format_width(source: &str, expected: &str, width: u16) {
  let config = Config { print_width: width, ..config() };
  assert_format_with(source, expected, &config);
}

#[test]
fn empty_files_stay_empty() {
  assert_format("", "");
  assert_format("\n\n", "");
}

#[test]
fn operators_gain_canonical_spacing() {
  assert_format("x=1+2\n", "x = 1 + 2\n");
  assert_format("1 .. 5\n", "1..5\n");
  assert_format("x not in list\n", "x not in list\n");
  assert_format("fn x->x+1 end\n", "fn x -> x + 1 end\n");
}

#[test]
fn redundant_parentheses_are_removed() {
  assert_format("(1 * 2) * 3\n", "1 * 2 * 3\n");
  assert_format("(x)\n", "x\n");
}

#[test]
fn required_parentheses_are_kept() {
  assert_format("(1+2)*3\n", "(1 + 2) * 3\n");
  assert_format("a - (b - c)\n", "a - (b - c)\n");
  assert_format("a and (b or c)\n", "a and (b or c)\n");
  assert_format("(a == b) |> check()\n", "(a == b) |> check()\n");
}

#[test]
fn pipelines_break_with_the_operator_leading() {
  assert_format_width(
    "input |> first() |> second()\n",
    indoc! {"
      input
      |> first()
      |> second()
    "},
    20,
  );
}

#[test]
fn collections_break_one_element_per_line() {
  assert_format_width(
    "[1, 2, 3]\n",
    indoc! {"
      [
        1,
        2,
        3
      ]
    "},
    8,
  );
  assert_format("%{user | name: name}\n", "%{user | name: name}\n");
}

#[test]
fn trailing_keyword_lists_lose_their_brackets() {
  assert_format("foo(1, [a: 2, b: 3])\n", "foo(1, a: 2, b: 3)\n");
  assert_format("foo(1, a: 2, b: 3)\n", "foo(1, a: 2, b: 3)\n");
}

#[test]
fn definition_forms_keep_bare_arguments() {
  assert_format(
    indoc! {"
      def add(a, b) do
        a + b
      end
    "},
    indoc! {"
      def add(a, b) do
        a + b
      end
    "},
  );
  assert_format("alias Foo.Bar\n", "alias Foo.Bar\n");
}

#[test]
fn unknown_calls_gain_parentheses() {
  assert_format("double 2\n", "double(2)\n");
  assert_format("x = double 2\n", "x = double(2)\n");
}

#[test]
fn configured_locals_stay_bare() {
  let config = Config {
    locals_without_parens: vec![("double".to_owned(), Arity::Exact(1))],
    ..config()
  };
  assert_format_with("double 2\n", "double 2\n", &config);
  // The wrong arity still gains parentheses
  assert_format_with("double 2, 3\n", "double(2, 3)\n", &config);
}

#[test]
fn written_parentheses_are_removed_for_configured_locals() {
  let config = Config {
    locals_without_parens: vec![("foo".to_owned(), Arity::Exact(2))],
    ..config()
  };
  assert_format_with("foo(1, key: 2)\n", "foo 1, key: 2\n", &config);
  assert_format_with("foo(1, 2)\n", "foo 1, 2\n", &config);
}

#[test]
fn bare_calls_survive_in_operand_position() {
  let config = Config {
    locals_without_parens: vec![
      ("double".to_owned(), Arity::Exact(1)),
      ("assert".to_owned(), Arity::Exact(1)),
    ],
    ..config()
  };
  assert_format_with("x = double 2\n", "x = double 2\n", &config);
  // The sole argument of a bare call is itself a bare position
  assert_format_with("assert double 2\n", "assert double 2\n", &config);
  // Anywhere a comma or operator follows, the parentheses are required
  assert_format_with("[double(2), 3]\n", "[double(2), 3]\n", &config);
  assert_format_with("double(2) + 1\n", "double(2) + 1\n", &config);
}

#[test]
fn comments_keep_their_place() {
  assert_format(
    indoc! {"
      x = 1   #trailing


      #comment
      y = 2
    "},
    indoc! {"
      x = 1 # trailing

      # comment
      y = 2
    "},
  );
}

#[test]
fn blank_line_runs_collapse_to_one() {
  assert_format(
    indoc! {"
      def run do


        a



        b
      end
    "},
    indoc! {"
      def run do
        a

        b
      end
    "},
  );
}

#[test]
fn heredoc_arguments_hug_the_call() {
  assert_format(
    indoc! {r#"
      log("""
      message
      """)
    "#},
    indoc! {r#"
      log("""
      message
      """)
    "#},
  );
}

#[test]
fn case_clauses_lay_out_one_per_line() {
  assert_format(
    indoc! {"
      case value do
        :ok -> 1
        :error ->
          log()
          2
      end
    "},
    indoc! {"
      case value do
        :ok -> 1
        :error ->
          log()
          2
      end
    "},
  );
}

#[test]
fn multi_clause_fns_break() {
  assert_format(
    indoc! {"
      fn
        0 -> :zero
        n -> n
      end
    "},
    indoc! {"
      fn
        0 -> :zero
        n -> n
      end
    "},
  );
  assert_format("fn x when x > 0 -> x end\n", "fn x when x > 0 -> x end\n");
}

#[test]
fn captures_render_compactly() {
  assert_format("&(&1+1)\n", "&(&1 + 1)\n");
  assert_format("&Enum.map/2\n", "&Enum.map/2\n");
  assert_format("&valid?/1\n", "&valid?/1\n");
}

#[test]
fn atoms_drop_unneeded_quotes() {
  assert_format(":\"ok\"\n", ":ok\n");
  assert_format(":\"with space\"\n", ":\"with space\"\n");
}

#[test]
fn number_literals_are_normalised() {
  assert_format("1000000\n", "1_000_000\n");
  assert_format("0xff\n", "0xFF\n");
  assert_format("1.5E3\n", "1.5e3\n");
  assert_format("@timeout 5000\n", "@timeout 5000\n");
}

#[test]
fn interpolations_are_formatted_inside_strings() {
  assert_format("\"a#{ b }c\"\n", "\"a#{b}c\"\n");
  assert_format("~r/ab+c/i\n", "~r/ab+c/i\n");
}

#[test]
fn deprecated_calls_rename_for_recent_versions() {
  let renaming = Config {
    rename_deprecated_at: Some(Version::new(0, 2, 0)),
    ..config()
  };
  assert_format_with(
    "Enum.partition(items, pred)\n",
    "Enum.split_with(items, pred)\n",
    &renaming,
  );
  // Only the two-argument form is deprecated
  assert_format_with("Enum.partition(items)\n", "Enum.partition(items)\n", &renaming);
  assert_format("Enum.partition(items, pred)\n", "Enum.partition(items, pred)\n");
}

#[test]
fn integer_literal_normalisation() {
  assert_eq!(literals::integer("123"), "123");
  assert_eq!(literals::integer("123456"), "123_456");
  assert_eq!(literals::integer("1_0000"), "1_0000");
  assert_eq!(literals::integer("0b1010"), "0b1010");
  assert_eq!(literals::integer("0xdead"), "0xDEAD");
}

#[test]
fn plain_atom_names() {
  assert!(literals::plain_atom("ok"));
  assert!(literals::plain_atom("valid?"));
  assert!(literals::plain_atom("_private"));
  assert!(!literals::plain_atom("with space"));
  assert!(!literals::plain_atom("1starts_with_digit"));
  assert!(!literals::plain_atom(""));
}

#[test]
fn versions_parse_and_compare() {
  let version: Version = "1.2.3".parse().unwrap();
  assert_eq!(version, Version::new(1, 2, 3));
  assert!("1.2".parse::<Version>().is_err());
  assert!("1.2.3.4".parse::<Version>().is_err());
  assert!(Version::new(0, 10, 0) > Version::new(0, 9, 9));
}

#[test]
fn no_parens_arities() {
  let config = config();
  assert!(config.allows_no_parens("def", 2));
  assert!(!config.allows_no_parens("def", 3));
  assert!(config.allows_no_parens("for", 9));
  assert!(!config.allows_no_parens("unknown", 1));
}
