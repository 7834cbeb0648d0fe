//! Normalised rendering of literal tokens.
//!
//! Literals are kept as the user wrote them apart from a few canonical
//! touch-ups: digit grouping for long decimals, uppercase hex digits,
//! lowercase float exponents, and dropping quotes from atoms which do not
//! need them.

/// Render an integer literal from its source text
pub(crate) fn integer(raw: &str) -> String {
  if let Some(digits) = raw.strip_prefix("0x") {
    return format!("0x{}", digits.to_ascii_uppercase());
  }
  if raw.starts_with("0b") || raw.starts_with("0o") || raw.contains('_') {
    return raw.to_owned();
  }
  if raw.len() <= 5 {
    return raw.to_owned();
  }

  // Long plain decimals gain `_` separators every three digits
  let mut result = String::with_capacity(raw.len() + raw.len() / 3);
  for (index, digit) in raw.bytes().enumerate() {
    if index > 0 && (raw.len() - index) % 3 == 0 {
      result.push('_');
    }
    result.push(digit as char);
  }
  result
}

/// Render a float literal from its source text
pub(crate) fn float(raw: &str) -> String {
  raw.replace('E', "e")
}

/// Can an atom with this name be written without quotes?
pub(crate) fn plain_atom(name: &str) -> bool {
  let Some(first) = name.bytes().next() else { return false };
  if !first.is_ascii_alphabetic() && first != b'_' {
    return false;
  }

  let rest = &name.as_bytes()[1..];
  let (rest, _terminator) = match rest.split_last() {
    Some((last @ (b'?' | b'!'), rest)) => (rest, Some(*last)),
    _ => (rest, None),
  };
  rest
    .iter()
    .all(|byte| byte.is_ascii_alphanumeric() || *byte == b'_')
}
