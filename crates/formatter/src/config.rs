//! The configuration options for the formatter

use std::{error, fmt, str};

/// Configuration for the formatter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
  /// The max print width to aim for
  pub print_width: u16,
  /// The line ending to use
  pub line_ending: LineEnding,
  /// Extra calls which may keep their argument parentheses omitted, on top
  /// of the built-in definition and control-flow forms
  pub locals_without_parens: Vec<(String, Arity)>,
  /// Rewrite calls to deprecated functions to their replacements, when
  /// formatting for at least this language version
  pub rename_deprecated_at: Option<Version>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      print_width: 98,
      line_ending: LineEnding::Native,
      locals_without_parens: Vec::new(),
      rename_deprecated_at: None,
    }
  }
}

/// Calls which read as definitions or control flow keep their arguments
/// without parentheses. The arity counts a `do` block as an argument.
const BUILTIN_NO_PARENS: &[(&str, Arity)] = &[
  ("def", Arity::Exact(2)),
  ("defp", Arity::Exact(2)),
  ("defmodule", Arity::Exact(2)),
  ("defprotocol", Arity::Exact(2)),
  ("defimpl", Arity::Exact(2)),
  ("defstruct", Arity::Exact(1)),
  ("alias", Arity::Exact(1)),
  ("alias", Arity::Exact(2)),
  ("import", Arity::Exact(1)),
  ("import", Arity::Exact(2)),
  ("require", Arity::Exact(1)),
  ("require", Arity::Exact(2)),
  ("use", Arity::Exact(1)),
  ("use", Arity::Exact(2)),
  ("raise", Arity::Exact(1)),
  ("raise", Arity::Exact(2)),
  ("if", Arity::Exact(2)),
  ("unless", Arity::Exact(2)),
  ("receive", Arity::Exact(1)),
  ("try", Arity::Exact(1)),
  ("case", Arity::Exact(2)),
  ("cond", Arity::Exact(1)),
  ("for", Arity::Any),
  ("quote", Arity::Any),
  ("assert", Arity::Exact(1)),
  ("refute", Arity::Exact(1)),
  ("spawn", Arity::Exact(1)),
];

impl Config {
  /// May a call to `name` with `arity` arguments stay without parentheses?
  pub(crate) fn allows_no_parens(&self, name: &str, arity: usize) -> bool {
    let matches = |entry_name: &str, entry_arity: Arity| {
      entry_name == name
        && match entry_arity {
          Arity::Any => true,
          Arity::Exact(count) => usize::from(count) == arity,
        }
    };

    BUILTIN_NO_PARENS
      .iter()
      .any(|(entry_name, entry_arity)| matches(entry_name, *entry_arity))
      || self
        .locals_without_parens
        .iter()
        .any(|(entry_name, entry_arity)| matches(entry_name, *entry_arity))
  }

  /// Are deprecated calls rewritten to their replacements?
  pub(crate) fn renames_deprecated(&self) -> bool {
    self
      .rename_deprecated_at
      .is_some_and(|version| version >= Version::new(0, 2, 0))
  }
}

/// The number of arguments a call form accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
  /// Exactly this many arguments
  Exact(u8),
  /// Any number of arguments
  Any,
}

/// A language version, e.g. `0.2.0`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
  /// The major version number
  pub major: u16,
  /// The minor version number
  pub minor: u16,
  /// The patch version number
  pub patch: u16,
}

impl Version {
  /// Create a version from its parts
  #[must_use]
  pub fn new(major: u16, minor: u16, patch: u16) -> Self {
    Self { major, minor, patch }
  }
}

impl str::FromStr for Version {
  type Err = InvalidVersion;

  fn from_str(string: &str) -> Result<Self, Self::Err> {
    let mut parts = string.split('.');
    let mut part = || {
      parts
        .next()
        .and_then(|part| part.parse().ok())
        .ok_or(InvalidVersion)
    };

    let version = Self { major: part()?, minor: part()?, patch: part()? };
    if parts.next().is_some() {
      return Err(InvalidVersion);
    }
    Ok(version)
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
  }
}

/// A version string which is not in `major.minor.patch` form
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidVersion;

impl fmt::Display for InvalidVersion {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "expected a version in `major.minor.patch` form")
  }
}
impl error::Error for InvalidVersion {}

/// The type of line endings to use for the file
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum LineEnding {
  /// Line Feed only (\n), common on Linux and macOS as well as inside git repos
  LineFeed,

  /// Carriage Return + Line Feed characters (\r\n), common on Windows
  CarriageReturnLineFeed,

  /// Line endings will be converted to `\n` on Unix and `\r\n` on Windows.
  #[default]
  Native,
}

impl LineEnding {
  pub(crate) const fn as_str(self) -> &'static str {
    match self {
      LineEnding::LineFeed => "\n",
      LineEnding::CarriageReturnLineFeed => "\r\n",

      #[cfg(not(target_os = "windows"))]
      LineEnding::Native => "\n",
      #[cfg(target_os = "windows")]
      LineEnding::Native => "\r\n",
    }
  }
}
