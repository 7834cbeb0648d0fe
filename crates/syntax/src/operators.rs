//! # Operators
//!
//! The operator table shared by the parser and the formatter: precedence,
//! associativity, and the spacing class each binary operator renders with.

/// Which side an operator groups towards when chained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
  /// `a op b op c` is `(a op b) op c`
  Left,
  /// `a op b op c` is `a op (b op c)`
  Right,
}

/// How an operator is spaced and broken across lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorSpacing {
  /// No surrounding spaces and no line break, e.g. `1..10`
  NoSpace,
  /// Spaced, but never broken onto a new line, e.g. `x in list`
  NoNewline,
  /// When broken, the operator starts the new line, e.g. pipelines
  LeftBreak,
  /// When broken, the break comes after the operator, e.g. guards
  RightBreak,
  /// Spaced, breakable after the operator under width pressure
  Flexible,
}

/// A binary operator of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  /// `<-`
  LeftArrow,
  /// `\\`
  DefaultArg,
  /// `when`
  When,
  /// `::`
  Type,
  /// `|`
  Bar,
  /// `=`
  Match,
  /// `or`
  Or,
  /// `||`
  OrOr,
  /// `and`
  And,
  /// `&&`
  AndAnd,
  /// `==`
  Equal,
  /// `!=`
  NotEqual,
  /// `=~`
  Matches,
  /// `===`
  StrictEqual,
  /// `!==`
  StrictNotEqual,
  /// `<`
  Less,
  /// `>`
  Greater,
  /// `<=`
  LessEqual,
  /// `>=`
  GreaterEqual,
  /// `|>`
  Pipe,
  /// `<<<`
  ShiftLeft,
  /// `>>>`
  ShiftRight,
  /// `<~`
  LeftWave,
  /// `~>`
  RightWave,
  /// `<<~`
  DoubleLeftWave,
  /// `~>>`
  DoubleRightWave,
  /// `<~>`
  BothWave,
  /// `in`
  In,
  /// `not in`
  NotIn,
  /// `^^^`
  Xor,
  /// `++`
  Concat,
  /// `--`
  Remove,
  /// `+++`
  ConcatAll,
  /// `---`
  RemoveAll,
  /// `<>`
  StringConcat,
  /// `..`
  Range,
  /// `+`
  Add,
  /// `-`
  Subtract,
  /// `*`
  Multiply,
  /// `/`
  Divide,
}

impl BinaryOp {
  /// Look up a binary operator from its source text
  #[must_use]
  pub fn from_symbol(symbol: &str) -> Option<Self> {
    let op = match symbol {
      "<-" => Self::LeftArrow,
      "\\\\" => Self::DefaultArg,
      "when" => Self::When,
      "::" => Self::Type,
      "|" => Self::Bar,
      "=" => Self::Match,
      "or" => Self::Or,
      "||" => Self::OrOr,
      "and" => Self::And,
      "&&" => Self::AndAnd,
      "==" => Self::Equal,
      "!=" => Self::NotEqual,
      "=~" => Self::Matches,
      "===" => Self::StrictEqual,
      "!==" => Self::StrictNotEqual,
      "<" => Self::Less,
      ">" => Self::Greater,
      "<=" => Self::LessEqual,
      ">=" => Self::GreaterEqual,
      "|>" => Self::Pipe,
      "<<<" => Self::ShiftLeft,
      ">>>" => Self::ShiftRight,
      "<~" => Self::LeftWave,
      "~>" => Self::RightWave,
      "<<~" => Self::DoubleLeftWave,
      "~>>" => Self::DoubleRightWave,
      "<~>" => Self::BothWave,
      "in" => Self::In,
      "not in" => Self::NotIn,
      "^^^" => Self::Xor,
      "++" => Self::Concat,
      "--" => Self::Remove,
      "+++" => Self::ConcatAll,
      "---" => Self::RemoveAll,
      "<>" => Self::StringConcat,
      ".." => Self::Range,
      "+" => Self::Add,
      "-" => Self::Subtract,
      "*" => Self::Multiply,
      "/" => Self::Divide,
      _ => return None,
    };
    Some(op)
  }

  /// The source text of the operator
  #[must_use]
  pub fn symbol(self) -> &'static str {
    match self {
      Self::LeftArrow => "<-",
      Self::DefaultArg => "\\\\",
      Self::When => "when",
      Self::Type => "::",
      Self::Bar => "|",
      Self::Match => "=",
      Self::Or => "or",
      Self::OrOr => "||",
      Self::And => "and",
      Self::AndAnd => "&&",
      Self::Equal => "==",
      Self::NotEqual => "!=",
      Self::Matches => "=~",
      Self::StrictEqual => "===",
      Self::StrictNotEqual => "!==",
      Self::Less => "<",
      Self::Greater => ">",
      Self::LessEqual => "<=",
      Self::GreaterEqual => ">=",
      Self::Pipe => "|>",
      Self::ShiftLeft => "<<<",
      Self::ShiftRight => ">>>",
      Self::LeftWave => "<~",
      Self::RightWave => "~>",
      Self::DoubleLeftWave => "<<~",
      Self::DoubleRightWave => "~>>",
      Self::BothWave => "<~>",
      Self::In => "in",
      Self::NotIn => "not in",
      Self::Xor => "^^^",
      Self::Concat => "++",
      Self::Remove => "--",
      Self::ConcatAll => "+++",
      Self::RemoveAll => "---",
      Self::StringConcat => "<>",
      Self::Range => "..",
      Self::Add => "+",
      Self::Subtract => "-",
      Self::Multiply => "*",
      Self::Divide => "/",
    }
  }

  /// Binding strength, higher binds tighter
  #[must_use]
  pub fn precedence(self) -> u8 {
    match self {
      Self::LeftArrow | Self::DefaultArg => 4,
      Self::When => 5,
      Self::Type => 6,
      Self::Bar => 7,
      Self::Match => 10,
      Self::Or | Self::OrOr => 12,
      Self::And | Self::AndAnd => 13,
      Self::Equal
      | Self::NotEqual
      | Self::Matches
      | Self::StrictEqual
      | Self::StrictNotEqual => 14,
      Self::Less | Self::Greater | Self::LessEqual | Self::GreaterEqual => 15,
      Self::Pipe
      | Self::ShiftLeft
      | Self::ShiftRight
      | Self::LeftWave
      | Self::RightWave
      | Self::DoubleLeftWave
      | Self::DoubleRightWave
      | Self::BothWave => 16,
      Self::In | Self::NotIn => 17,
      Self::Xor => 18,
      Self::Concat
      | Self::Remove
      | Self::ConcatAll
      | Self::RemoveAll
      | Self::StringConcat => 19,
      Self::Range => 20,
      Self::Add | Self::Subtract => 21,
      Self::Multiply | Self::Divide => 22,
    }
  }

  /// Which side the operator groups towards
  #[must_use]
  pub fn associativity(self) -> Associativity {
    match self {
      Self::When
      | Self::Type
      | Self::Bar
      | Self::Match
      | Self::Concat
      | Self::Remove
      | Self::ConcatAll
      | Self::RemoveAll
      | Self::StringConcat
      | Self::Range => Associativity::Right,
      _ => Associativity::Left,
    }
  }

  /// The spacing class the formatter renders the operator with
  #[must_use]
  pub fn spacing(self) -> OperatorSpacing {
    match self {
      Self::Range => OperatorSpacing::NoSpace,
      Self::In | Self::NotIn | Self::LeftArrow | Self::DefaultArg => {
        OperatorSpacing::NoNewline
      }
      Self::Pipe
      | Self::ShiftLeft
      | Self::ShiftRight
      | Self::LeftWave
      | Self::RightWave
      | Self::DoubleLeftWave
      | Self::DoubleRightWave
      | Self::BothWave => OperatorSpacing::LeftBreak,
      Self::When | Self::Bar => OperatorSpacing::RightBreak,
      _ => OperatorSpacing::Flexible,
    }
  }
}

/// The precedence of unary operators, tighter than every binary operator
pub const UNARY_PRECEDENCE: u8 = 30;

/// The precedence of the `&` capture prefix, looser than most operators
pub const CAPTURE_PRECEDENCE: u8 = 9;

/// A unary (prefix) operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
  /// `+`
  Plus,
  /// `-`
  Minus,
  /// `!`
  Bang,
  /// `not`
  Not,
  /// `^`
  Pin,
  /// `~~~`
  BitwiseNot,
}

impl UnaryOp {
  /// Look up a unary operator from its source text
  #[must_use]
  pub fn from_symbol(symbol: &str) -> Option<Self> {
    let op = match symbol {
      "+" => Self::Plus,
      "-" => Self::Minus,
      "!" => Self::Bang,
      "not" => Self::Not,
      "^" => Self::Pin,
      "~~~" => Self::BitwiseNot,
      _ => return None,
    };
    Some(op)
  }

  /// The source text of the operator
  #[must_use]
  pub fn symbol(self) -> &'static str {
    match self {
      Self::Plus => "+",
      Self::Minus => "-",
      Self::Bang => "!",
      Self::Not => "not",
      Self::Pin => "^",
      Self::BitwiseNot => "~~~",
    }
  }

  /// Is the operator a word rather than a symbol, needing a space after it?
  #[must_use]
  pub fn is_word(self) -> bool {
    matches!(self, Self::Not)
  }
}
