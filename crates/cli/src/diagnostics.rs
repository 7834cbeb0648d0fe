use owo_colors::{OwoColorize, Style};
use sable_syntax::{ParseError, TokenKind, tokenise};
use std::fmt;

#[derive(Debug)]
pub enum Severity {
  Error,
  Warning,
}
pub struct Message {
  pub title: String,
  pub body: String,
  pub severity: Severity,
}
impl Message {
  pub fn error(message: String) -> Self {
    Self {
      title: message,
      body: String::new(),
      severity: Severity::Error,
    }
  }
  pub fn warning(message: String) -> Self {
    Self {
      title: message,
      body: String::new(),
      severity: Severity::Warning,
    }
  }
}
impl fmt::Display for Message {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.severity {
      Severity::Error => write!(f, "{}", "✕ Error".bold().red()),
      Severity::Warning => write!(f, "{}", "⚠ Warning".bold().yellow()),
    }?;
    writeln!(f, "{} {}", ":".bold(), &self.title.bold())?;

    if !self.body.is_empty() {
      writeln!(f, "{}", &self.body)?;
    }

    Ok(())
  }
}
impl From<&ParseError> for Message {
  fn from(error: &ParseError) -> Self {
    Self {
      title: "Invalid Syntax".to_owned(),
      body: error.description(),
      severity: Severity::Error,
    }
  }
}

pub struct CodeFrame<'a> {
  title: &'a str,
  source: &'a str,
  line: u32,
}
impl<'a> CodeFrame<'a> {
  pub fn new(title: &'a str, source: &'a str, line: u32) -> Self {
    Self {
      title: if title == "-" { "STDIN" } else { title },
      source,
      line: line.max(1),
    }
  }
}
impl fmt::Display for CodeFrame<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "    {}{}{}{}{}",
      "╭─[".dimmed(),
      self.title,
      ":".dimmed(),
      self.line,
      "]".dimmed()
    )?;

    let line_text = self
      .source
      .lines()
      .nth(self.line as usize - 1)
      .unwrap_or("");
    write!(f, "{:>3} {}", self.line, "│".dimmed())?;
    if !line_text.is_empty() {
      write!(f, " ")?;
      highlight_source(f, line_text)?;
    }
    writeln!(f)?;

    write!(f, "{}", "────╯".dimmed())
  }
}

/// Write a line of source with basic syntax colouring. Anything outside a
/// token (a trailing comment) is written verbatim, dimmed.
pub fn highlight_source(output: &mut dyn fmt::Write, source: &str) -> fmt::Result {
  let (tokens, _comments) = tokenise(source);

  let mut last = 0;
  for token in tokens {
    if matches!(token.kind, TokenKind::EndOfLine | TokenKind::EndOfFile) {
      continue;
    }

    let start = token.start as usize;
    let end = token.end as usize;
    if start > last {
      write!(output, "{}", &source[last..start])?;
    }

    let style = match token.kind {
      TokenKind::Integer | TokenKind::Float => Style::new().blue(),
      TokenKind::String
      | TokenKind::Heredoc
      | TokenKind::Charlist
      | TokenKind::CharlistHeredoc
      | TokenKind::Sigil => Style::new().green(),
      TokenKind::Atom | TokenKind::QuotedAtom | TokenKind::KeywordKey => {
        Style::new().magenta()
      }
      TokenKind::Fn
      | TokenKind::Do
      | TokenKind::End
      | TokenKind::Else
      | TokenKind::Rescue
      | TokenKind::Catch
      | TokenKind::After => Style::new().cyan(),
      _ => Style::new(),
    };
    write!(output, "{}", (&source[start..end]).style(style))?;

    last = end;
  }

  if last < source.len() {
    write!(output, "{}", (&source[last..]).dimmed())?;
  }

  Ok(())
}
