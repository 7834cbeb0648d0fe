//! # Formatter Tests
//!
//! Check that the output of the formatter matches the expected output.

use indoc::indoc;
use sable_formatter::{Config, LineEnding, Version};
use sable_syntax::parse;

fn format(source: &str, print_width: u16) -> String {
  let config = Config {
    print_width,
    line_ending: LineEnding::LineFeed,
    ..Config::default()
  };
  let ast = parse(source);
  assert!(ast.is_valid(), "expected source to parse");

  sable_formatter::format(&ast, &config)
}

macro_rules! assert_format {
  ($source:expr, $expected:expr, $print_width:expr) => {
    let output = format($source, $print_width);
    assert_eq!(output.trim_end(), $expected.trim_end());
    assert_eq!(format(&output, $print_width).trim_end(), output.trim_end());
  };
}

#[test]
fn module_with_pipeline() {
  let source = indoc! {"
    defmodule My.App do
      def run(items)   do
        items |> Enum.map(fn x -> x * 2 end) |> Enum.sum()
      end
    end
  "};
  let expected = indoc! {"
    defmodule My.App do
      def run(items) do
        items |> Enum.map(fn x -> x * 2 end) |> Enum.sum()
      end
    end
  "};
  assert_format!(source, expected, 98);

  let narrow = indoc! {"
    defmodule My.App do
      def run(items) do
        items
        |> Enum.map(fn x -> x * 2 end)
        |> Enum.sum()
      end
    end
  "};
  assert_format!(source, narrow, 40);
}

#[test]
fn call_arguments_break_one_per_line() {
  let source = "send_notification(user, \"Your export is ready\", channel)\n";
  assert_format!(source, source, 98);

  let expected = indoc! {r#"
    send_notification(
      user,
      "Your export is ready",
      channel
    )
  "#};
  assert_format!(source, expected, 30);
}

#[test]
fn trailing_keywords_keep_their_sugar() {
  assert_format!(
    "use GenServer, [restart: :transient]",
    "use GenServer, restart: :transient",
    98
  );
  assert_format!("for x <- list, do: x * 2", "for x <- list, do: x * 2", 98);
}

#[test]
fn multiple_generators_force_keyword_brackets() {
  // With two generators a bare `do:` would read as a filter, so the
  // trailing keyword list keeps its brackets
  assert_format!(
    "for x <- as, y <- bs, do: {x, y}",
    "for x <- as, y <- bs, [do: {x, y}]",
    98
  );
  assert_format!("for x <- as, do: x", "for x <- as, do: x", 98);
}

#[test]
fn comments_stay_with_their_clause() {
  let source = indoc! {"
    case status do
      :ok -> :continue
      # anything else stops the world
      _ -> :halt
    end
  "};
  assert_format!(source, source, 98);
}

#[test]
fn heredocs_keep_their_shape_in_blocks() {
  let source = indoc! {r#"
    def greeting(name) do
      """
      Hello #{name}!
      """
    end
  "#};
  assert_format!(source, source, 98);
}

#[test]
fn assignments_break_after_the_equals() {
  let source = "total = first_value + second_value + third_value\n";
  assert_format!(source, source, 98);

  let expected = indoc! {"
    total =
      first_value +
        second_value +
        third_value
  "};
  assert_format!(source, expected, 40);
}

#[test]
fn blocks_with_multiple_sections() {
  let source = indoc! {"
    if valid? do
      :ok
    else
      :error
    end
  "};
  assert_format!(source, source, 98);
}

#[test]
fn target_version_controls_deprecated_renames() {
  let ast = parse("Enum.partition(list, fun)");
  assert!(ast.is_valid());

  let mut config = Config {
    print_width: 98,
    line_ending: LineEnding::LineFeed,
    ..Config::default()
  };
  assert_eq!(
    sable_formatter::format(&ast, &config),
    "Enum.partition(list, fun)\n"
  );

  config.rename_deprecated_at = Some(Version::new(0, 2, 0));
  assert_eq!(
    sable_formatter::format(&ast, &config),
    "Enum.split_with(list, fun)\n"
  );
}
