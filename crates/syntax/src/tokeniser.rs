//! # Tokeniser
//!
//! Scan source code into a list of tokens, capturing comments into a
//! separate side list as it goes. Tokens only carry spans, the text lives
//! in the source string.

use crate::ast::Comment;

/// A token of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
  /// What sort of token it is
  pub kind: TokenKind,
  /// Byte offset of the token start
  pub start: u32,
  /// Byte offset just past the token end
  pub end: u32,
  /// The line the token starts on (1-based)
  pub line: u32,
}

/// The type of a [`Token`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs, reason = "token names describe themselves")]
pub enum TokenKind {
  Integer,
  Float,
  Atom,
  QuotedAtom,
  String,
  Heredoc,
  Charlist,
  CharlistHeredoc,
  Sigil,
  Identifier,
  AliasName,
  KeywordKey,
  Operator,
  Capture,
  At,
  Comma,
  Semicolon,
  Dot,
  LeftParen,
  RightParen,
  LeftBracket,
  RightBracket,
  LeftBrace,
  RightBrace,
  Percent,
  BitstringOpen,
  BitstringClose,
  Arrow,
  FatArrow,
  Fn,
  Do,
  End,
  Else,
  Rescue,
  Catch,
  After,
  EndOfLine,
  EndOfFile,
  Unknown,
}

/// Tokenise a source string, returning the tokens and the captured comments
#[must_use]
pub fn tokenise(source: &str) -> (Vec<Token>, Vec<Comment>) {
  let mut tokeniser = Tokeniser {
    source,
    bytes: source.as_bytes(),
    position: 0,
    line: 1,
    newlines_run: 0,
    tokens: Vec::new(),
    comments: Vec::new(),
  };
  tokeniser.run();
  tokeniser.fill_comment_gaps();

  (tokeniser.tokens, tokeniser.comments)
}

struct Tokeniser<'source> {
  source: &'source str,
  bytes: &'source [u8],
  position: usize,
  line: u32,
  /// Consecutive newlines since the last token or comment
  newlines_run: u32,
  tokens: Vec<Token>,
  comments: Vec<Comment>,
}

impl Tokeniser<'_> {
  fn run(&mut self) {
    while self.position < self.bytes.len() {
      let start = self.position;
      let line = self.line;

      match self.bytes[self.position] {
        b' ' | b'\t' | b'\r' => self.position += 1,
        b'\n' => {
          self.position += 1;
          self.tokens.push(Token {
            kind: TokenKind::EndOfLine,
            start: offset(start),
            end: offset(self.position),
            line,
          });
          self.line += 1;
          self.newlines_run += 1;
        }
        b'#' => self.comment(),
        b'0'..=b'9' => self.number(start, line),
        b'a'..=b'z' | b'_' => self.word(start, line),
        b'A'..=b'Z' => {
          self.position += 1;
          while self.is_identifier_byte() {
            self.position += 1;
          }
          self.token(TokenKind::AliasName, start, line);
        }
        b':' => self.colon(start, line),
        b'"' => self.quoted(b'"', start, line),
        b'\'' => self.quoted(b'\'', start, line),
        b'~' => self.tilde(start, line),
        b'@' => self.single(TokenKind::At, start, line),
        b'&' => {
          if self.matches_text("&&&") || self.matches_text("&&") {
            self.token(TokenKind::Operator, start, line);
          } else {
            self.single(TokenKind::Capture, start, line);
          }
        }
        _ => self.punctuation(start, line),
      }
    }

    let end = offset(self.position);
    self.tokens.push(Token {
      kind: TokenKind::EndOfFile,
      start: end,
      end,
      line: self.line,
    });
  }

  fn token(&mut self, kind: TokenKind, start: usize, line: u32) {
    self.tokens.push(Token {
      kind,
      start: offset(start),
      end: offset(self.position),
      line,
    });
    self.newlines_run = 0;
  }

  fn single(&mut self, kind: TokenKind, start: usize, line: u32) {
    self.position += 1;
    self.token(kind, start, line);
  }

  fn peek(&self, ahead: usize) -> u8 {
    self.bytes.get(self.position + ahead).copied().unwrap_or(0)
  }

  fn is_identifier_byte(&self) -> bool {
    matches!(self.peek(0), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')
  }

  /// If the upcoming source matches `text`, consume it
  fn matches_text(&mut self, text: &str) -> bool {
    if self.source[self.position..].starts_with(text) {
      self.position += text.len();
      true
    } else {
      false
    }
  }

  fn comment(&mut self) {
    let start = self.position;
    let line = self.line;

    while self.position < self.bytes.len() && self.bytes[self.position] != b'\n' {
      self.position += 1;
    }

    let raw = &self.source[start..self.position];
    let hashes = raw.bytes().take_while(|byte| *byte == b'#').count();
    let text = if hashes > 1 {
      // A repeated `#` run is kept exactly as written
      raw.trim_end().to_owned()
    } else {
      let rest = raw[1..].trim();
      if rest.is_empty() { "#".to_owned() } else { format!("# {rest}") }
    };

    let newlines_before = if self.newlines_run > 0 {
      Some(self.newlines_run)
    } else if self.tokens.iter().all(|token| token.kind == TokenKind::EndOfLine)
      && self.comments.is_empty()
    {
      // A comment opening the file has nothing before it on its line
      Some(1)
    } else {
      None
    };

    self.comments.push(Comment {
      line,
      newlines_before,
      newlines_after: 1,
      text,
    });
    self.newlines_run = 0;
  }

  /// Compute `newlines_after` for every captured comment, now that the
  /// lines occupied by tokens are known
  fn fill_comment_gaps(&mut self) {
    let mut occupied: Vec<u32> = self
      .tokens
      .iter()
      .filter(|token| {
        !matches!(token.kind, TokenKind::EndOfLine | TokenKind::EndOfFile)
      })
      .map(|token| token.line)
      .chain(self.comments.iter().map(|comment| comment.line))
      .collect();
    occupied.sort_unstable();

    for comment in &mut self.comments {
      let next = occupied
        .iter()
        .find(|line| **line > comment.line)
        .copied();
      comment.newlines_after = next.map_or(1, |line| line - comment.line);
    }
  }

  fn number(&mut self, start: usize, line: u32) {
    if self.peek(0) == b'0' && matches!(self.peek(1), b'x' | b'b' | b'o') {
      self.position += 2;
      while matches!(self.peek(0), b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F' | b'_') {
        self.position += 1;
      }
      self.token(TokenKind::Integer, start, line);
      return;
    }

    while matches!(self.peek(0), b'0'..=b'9' | b'_') {
      self.position += 1;
    }

    let mut kind = TokenKind::Integer;
    if self.peek(0) == b'.' && self.peek(1).is_ascii_digit() {
      kind = TokenKind::Float;
      self.position += 1;
      while matches!(self.peek(0), b'0'..=b'9' | b'_') {
        self.position += 1;
      }
      if matches!(self.peek(0), b'e' | b'E') {
        let exponent_start = if matches!(self.peek(1), b'+' | b'-') { 2 } else { 1 };
        if self.peek(exponent_start).is_ascii_digit() {
          self.position += exponent_start;
          while self.peek(0).is_ascii_digit() {
            self.position += 1;
          }
        }
      }
    }

    self.token(kind, start, line);
  }

  fn word(&mut self, start: usize, line: u32) {
    self.position += 1;
    while self.is_identifier_byte() {
      self.position += 1;
    }
    if matches!(self.peek(0), b'?' | b'!') {
      self.position += 1;
    }

    // `name:` directly followed by anything but another colon is a keyword key
    if self.peek(0) == b':' && self.peek(1) != b':' {
      self.position += 1;
      self.token(TokenKind::KeywordKey, start, line);
      return;
    }

    let kind = match &self.source[start..self.position] {
      "fn" => TokenKind::Fn,
      "do" => TokenKind::Do,
      "end" => TokenKind::End,
      "else" => TokenKind::Else,
      "rescue" => TokenKind::Rescue,
      "catch" => TokenKind::Catch,
      "after" => TokenKind::After,
      "and" | "or" | "not" | "in" | "when" => TokenKind::Operator,
      _ => TokenKind::Identifier,
    };
    self.token(kind, start, line);
  }

  fn colon(&mut self, start: usize, line: u32) {
    if self.peek(1) == b':' {
      self.position += 2;
      self.token(TokenKind::Operator, start, line);
    } else if self.peek(1) == b'"' {
      self.position += 1;
      self.scan_delimited(b'"', true);
      self.token(TokenKind::QuotedAtom, start, line);
    } else if matches!(self.peek(1), b'a'..=b'z' | b'A'..=b'Z' | b'_') {
      self.position += 1;
      while self.is_identifier_byte() {
        self.position += 1;
      }
      if matches!(self.peek(0), b'?' | b'!') {
        self.position += 1;
      }
      self.token(TokenKind::Atom, start, line);
    } else {
      self.single(TokenKind::Unknown, start, line);
    }
  }

  fn quoted(&mut self, delimiter: u8, start: usize, line: u32) {
    let heredoc = self.peek(1) == delimiter && self.peek(2) == delimiter;

    if heredoc {
      self.position += 3;
      self.scan_heredoc(delimiter);
      let kind = if delimiter == b'"' {
        TokenKind::Heredoc
      } else {
        TokenKind::CharlistHeredoc
      };
      self.token(kind, start, line);
    } else {
      self.scan_delimited(delimiter, true);
      let kind = if delimiter == b'"' { TokenKind::String } else { TokenKind::Charlist };
      self.token(kind, start, line);
    }
  }

  /// Scan past a quoted literal, handling escapes and `#{}` interpolation.
  /// Starts on the opening delimiter and stops just past the closing one.
  fn scan_delimited(&mut self, delimiter: u8, interpolation: bool) {
    self.position += 1;

    while self.position < self.bytes.len() {
      match self.bytes[self.position] {
        byte if byte == delimiter => {
          self.position += 1;
          return;
        }
        b'\\' => self.position += 2,
        b'#' if interpolation && self.peek(1) == b'{' => self.skip_interpolation(),
        b'\n' => {
          self.line += 1;
          self.position += 1;
        }
        _ => self.position += 1,
      }
    }
  }

  /// Skip a `#{...}` interpolation, balancing braces and stepping over any
  /// nested string literals
  fn skip_interpolation(&mut self) {
    self.position += 2;
    let mut depth = 1_usize;

    while self.position < self.bytes.len() && depth > 0 {
      match self.bytes[self.position] {
        b'{' => {
          depth += 1;
          self.position += 1;
        }
        b'}' => {
          depth -= 1;
          self.position += 1;
        }
        b'\\' => self.position += 2,
        b'"' => self.scan_delimited(b'"', true),
        b'\'' => self.scan_delimited(b'\'', true),
        b'\n' => {
          self.line += 1;
          self.position += 1;
        }
        _ => self.position += 1,
      }
    }
  }

  /// Scan past heredoc contents, stopping just past the closing triple
  /// delimiter (which must be the first thing on its line)
  fn scan_heredoc(&mut self, delimiter: u8) {
    while self.position < self.bytes.len() {
      if self.bytes[self.position] == b'\n' {
        self.line += 1;
        self.position += 1;

        let mut lookahead = self.position;
        while matches!(self.bytes.get(lookahead), Some(b' ' | b'\t')) {
          lookahead += 1;
        }
        if self.bytes.get(lookahead) == Some(&delimiter)
          && self.bytes.get(lookahead + 1) == Some(&delimiter)
          && self.bytes.get(lookahead + 2) == Some(&delimiter)
        {
          self.position = lookahead + 3;
          return;
        }
      } else {
        self.position += 1;
      }
    }
  }

  fn tilde(&mut self, start: usize, line: u32) {
    if self.peek(1) == b'~' && self.peek(2) == b'~' {
      self.position += 3;
      self.token(TokenKind::Operator, start, line);
      return;
    }

    let lowercase = self.peek(1).is_ascii_lowercase();
    if lowercase {
      self.position += 2;
    } else if self.peek(1).is_ascii_uppercase() {
      self.position += 1;
      while self.peek(0).is_ascii_uppercase() {
        self.position += 1;
      }
    } else {
      self.single(TokenKind::Unknown, start, line);
      return;
    }

    let open = self.peek(0);
    let close = match open {
      b'(' => b')',
      b'[' => b']',
      b'{' => b'}',
      b'<' => b'>',
      b'/' | b'|' | b'"' | b'\'' => open,
      _ => {
        self.token(TokenKind::Unknown, start, line);
        return;
      }
    };

    if matches!(open, b'"' | b'\'') && self.peek(1) == open && self.peek(2) == open {
      self.position += 3;
      self.scan_heredoc(open);
    } else {
      self.scan_sigil_body(close, lowercase);
    }

    while self.peek(0).is_ascii_alphanumeric() {
      self.position += 1;
    }
    self.token(TokenKind::Sigil, start, line);
  }

  fn scan_sigil_body(&mut self, close: u8, interpolation: bool) {
    self.position += 1;

    while self.position < self.bytes.len() {
      match self.bytes[self.position] {
        byte if byte == close => {
          self.position += 1;
          return;
        }
        b'\\' => self.position += 2,
        b'#' if interpolation && self.peek(1) == b'{' => self.skip_interpolation(),
        b'\n' => {
          self.line += 1;
          self.position += 1;
        }
        _ => self.position += 1,
      }
    }
  }

  fn punctuation(&mut self, start: usize, line: u32) {
    const THREE: &[(&str, TokenKind)] = &[
      ("<<~", TokenKind::Operator),
      ("~>>", TokenKind::Operator),
      ("<~>", TokenKind::Operator),
      ("<<<", TokenKind::Operator),
      (">>>", TokenKind::Operator),
      ("^^^", TokenKind::Operator),
      ("!==", TokenKind::Operator),
      ("===", TokenKind::Operator),
      ("+++", TokenKind::Operator),
      ("---", TokenKind::Operator),
    ];
    const TWO: &[(&str, TokenKind)] = &[
      ("|>", TokenKind::Operator),
      ("=>", TokenKind::FatArrow),
      ("->", TokenKind::Arrow),
      ("<-", TokenKind::Operator),
      ("<>", TokenKind::Operator),
      ("++", TokenKind::Operator),
      ("--", TokenKind::Operator),
      ("..", TokenKind::Operator),
      ("||", TokenKind::Operator),
      ("==", TokenKind::Operator),
      ("!=", TokenKind::Operator),
      ("=~", TokenKind::Operator),
      ("<=", TokenKind::Operator),
      (">=", TokenKind::Operator),
      ("\\\\", TokenKind::Operator),
      ("<~", TokenKind::Operator),
      ("~>", TokenKind::Operator),
      ("<<", TokenKind::BitstringOpen),
      (">>", TokenKind::BitstringClose),
    ];
    const ONE: &[(&str, TokenKind)] = &[
      ("+", TokenKind::Operator),
      ("-", TokenKind::Operator),
      ("*", TokenKind::Operator),
      ("/", TokenKind::Operator),
      ("<", TokenKind::Operator),
      (">", TokenKind::Operator),
      ("=", TokenKind::Operator),
      ("!", TokenKind::Operator),
      ("^", TokenKind::Operator),
      ("|", TokenKind::Operator),
      (".", TokenKind::Dot),
      (",", TokenKind::Comma),
      (";", TokenKind::Semicolon),
      ("(", TokenKind::LeftParen),
      (")", TokenKind::RightParen),
      ("[", TokenKind::LeftBracket),
      ("]", TokenKind::RightBracket),
      ("{", TokenKind::LeftBrace),
      ("}", TokenKind::RightBrace),
      ("%", TokenKind::Percent),
    ];

    for table in [THREE, TWO, ONE] {
      for (text, kind) in table {
        if self.matches_text(text) {
          self.token(*kind, start, line);
          return;
        }
      }
    }

    self.single(TokenKind::Unknown, start, line);
  }
}

#[allow(clippy::cast_possible_truncation, reason = "sources are under 4GB")]
fn offset(position: usize) -> u32 {
  position as u32
}
