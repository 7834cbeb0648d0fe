//! # Sable Formatter
//!
//! An opinionated source formatter for Sable code.
//!
//! The syntax tree is compiled into a layout document describing where
//! lines may break, and the document is rendered against the configured
//! print width. Formatting an already formatted file gives it back
//! unchanged, and formatting never changes what a program means: only
//! whitespace, delimiters, and redundant parentheses are touched.

#![deny(unsafe_code)]

use bumpalo::Bump;
use sable_syntax::AST;

mod calls;
mod comments;
mod config;
mod expression;
mod formatter;
mod literals;

#[cfg(test)]
mod test;

pub use config::{Arity, Config, InvalidVersion, LineEnding, Version};

/// Format a parsed source file into its canonical text.
///
/// An empty file formats to the empty string, any other file ends with
/// exactly one trailing newline.
#[must_use]
pub fn format(ast: &AST, config: &Config) -> String {
  let allocator = Bump::new();
  let mut formatter = formatter::Formatter::new(&allocator, config, &ast.comments);
  let document = formatter.file(&ast.body);

  let output =
    sable_doc::render(document, config.print_width, config.line_ending.as_str());
  if output.is_empty() {
    output
  } else {
    output + config.line_ending.as_str()
  }
}
