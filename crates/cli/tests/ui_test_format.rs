//! # UI Tests for the Format Command
#![cfg(not(miri))]

use assert_cmd::Command;
use indoc::indoc;

fn run(args: &[&str], file: &str) -> std::process::Output {
  Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(args)
    .write_stdin(file)
    .output()
    .unwrap()
}

#[test]
fn formats_stdin() {
  let output = run(&["format", "-"], "x=1+2\n");

  assert!(output.status.success());
  assert!(output.stderr.is_empty());
  assert_eq!(String::from_utf8(output.stdout).unwrap(), "x = 1 + 2\n");
}

#[test]
fn fmt_alias() {
  let output = run(&["fmt", "-"], "[1,2,  3]\n");

  assert!(output.status.success());
  assert_eq!(String::from_utf8(output.stdout).unwrap(), "[1, 2, 3]\n");
}

#[test]
fn dryrun_prints_the_result() {
  let output = run(&["format", "-", "--dryrun"], "foo( 1 )\n");

  assert!(output.status.success());
  assert_eq!(String::from_utf8(output.stdout).unwrap(), "foo(1)\n");
}

#[test]
fn check_passes_formatted_input() {
  let output = run(&["format", "-", "--check"], "x = 1 + 2\n");

  assert!(output.status.success());
  assert!(output.stderr.is_empty());
}

#[test]
fn check_rejects_unformatted_input() {
  let output = run(&["format", "-", "--check"], "x=1+2\n");

  assert_eq!(output.status.code(), Some(1));
  let expected = indoc! {"
    ✕ Error: File is not formatted
    `-` is not formatted

  "};
  assert_eq!(String::from_utf8(output.stderr).unwrap(), expected);
}

#[test]
fn reports_parse_errors() {
  let output = run(&["format", "-"], "] oops\n");

  assert_eq!(output.status.code(), Some(2));
  assert!(output.stdout.is_empty());
  let expected = indoc! {"
    ✕ Error: Invalid Syntax
    expected an expression, found `]`

        ╭─[STDIN:1]
      1 │ ] oops
    ────╯
  "};
  assert_eq!(String::from_utf8(output.stderr).unwrap(), expected);
}

#[test]
fn print_width_is_configurable() {
  let output = run(
    &["format", "-", "--config-print-width", "10"],
    "alpha + beta + gamma\n",
  );

  assert!(output.status.success());
  let expected = indoc! {"
    alpha +
      beta +
      gamma
  "};
  assert_eq!(String::from_utf8(output.stdout).unwrap(), expected);
}

#[test]
fn target_version_renames_deprecated_calls() {
  let output = run(
    &["format", "-", "--config-target-version", "0.2.0"],
    "Enum.partition(list, fun)\n",
  );

  assert!(output.status.success());
  assert_eq!(
    String::from_utf8(output.stdout).unwrap(),
    "Enum.split_with(list, fun)\n"
  );
}

#[test]
fn missing_file_fails() {
  let output = run(&["format", "does_not_exist.sable"], "");

  assert_eq!(output.status.code(), Some(2));
  let stderr = String::from_utf8(output.stderr).unwrap();
  assert!(stderr.contains("File not found"));
}
