//! # Sable
//! An opinionated source formatter for the Sable language.
//!
//! Reads a file (or STDIN), parses it, and prints or writes back the
//! canonically formatted source.

#![allow(clippy::print_stdout)]

mod commands;
mod diagnostics;

use clap::builder::styling::{AnsiColor, Style, Styles};
use clap::{Args, Parser};
use commands::CommandStatus;
use owo_colors::*;
use sable_formatter::Version;
use std::process;

const STYLES: Styles = Styles::styled()
  .usage(Style::new().italic())
  .header(AnsiColor::BrightYellow.on_default().bold());

fn coloured_header() -> String {
  format!(
    "{} {}",
    "Sable".fg::<owo_colors::colors::css::MediumPurple>().bold(),
    "(v0.1.0)".italic().dimmed()
  )
}

fn about() -> String {
  format!("{}\nAn opinionated formatter for Sable source code.", coloured_header())
}

#[derive(Parser)]
#[clap(
  name = "sable",
  version,
  about = about(),
  styles = STYLES,
  disable_help_subcommand = true,
)]
enum App {
  /// Formats source files
  #[clap(alias = "fmt")]
  Format(FormatOptions),
}

#[derive(Args)]
struct FormatOptions {
  /// The file to format, `-` for STDIN
  file: String,
  /// Preview the results of the formatting
  #[clap(long)]
  dryrun: bool,
  /// Check the file is formatted. Do not write to file
  #[clap(long)]
  check: bool,

  /// Maximum line width
  #[clap(long, default_value_t = 98, help_heading = "Formatting Config")]
  config_print_width: u16,
  /// Rewrite deprecated calls to their replacements, when formatting for
  /// at least this language version
  #[clap(long, help_heading = "Formatting Config")]
  config_target_version: Option<Version>,
}

fn main() -> process::ExitCode {
  let args = App::parse();

  let result = match args {
    App::Format(options) => commands::format(&options),
  };

  match result {
    Ok(CommandStatus::Success) => process::ExitCode::from(0),
    Ok(CommandStatus::Failure) => process::ExitCode::from(1),
    Err(()) => process::ExitCode::from(2),
  }
}
