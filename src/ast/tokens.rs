use std::fmt;

use serde::Serialize;

/// Location of a token in the source text.
///
/// `offset` counts chars from the start of the input; `line` and `column`
/// are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Simple property or keyword-like name
    ///
    /// Starts with a letter or underscore, continues with letters, digits,
    /// `.`, `_` or `-`.
    ///
    /// # Examples
    /// ```text
    /// uid
    /// entities
    /// ibm-primaryEmail
    /// ```
    Name,

    /// Prefix-qualified name
    ///
    /// # Examples
    /// ```text
    /// xsi:type
    /// ```
    CompositeName,

    /// String literal in single or double quotes
    ///
    /// The quote character is escaped by doubling it. The token text keeps
    /// the original quoting.
    ///
    /// # Examples
    /// ```text
    /// 'PersonAccount'
    /// "O""Brien"
    /// 'jdoe*'
    /// ```
    StringLiteral,

    /// Integer literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -7
    /// ```
    IntLiteral,

    /// Decimal literal
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// -0.5
    /// ```
    DecimalLiteral,

    /// Comparison operator: `=`, `!=`, `<`, `<=`, `>`, `>=`
    CompOp,

    /// Attribute marker
    At,

    /// Path prefix of `//entities`
    DoubleSlash,

    /// Left parenthesis
    LParen,

    /// Right parenthesis
    RParen,

    /// Logical AND keyword (`and`, any case)
    And,

    /// Logical OR keyword (`or`, any case)
    Or,

    /// Left bracket opening the entity predicate
    LBracket,

    /// Right bracket
    RBracket,

    /// Input the lexer could not recognize
    Invalid,

    /// End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Name => "name",
            TokenKind::CompositeName => "qualified name",
            TokenKind::StringLiteral => "string literal",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::DecimalLiteral => "decimal literal",
            TokenKind::CompOp => "comparison operator",
            TokenKind::At => "'@'",
            TokenKind::DoubleSlash => "'//'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Invalid => "invalid input",
            TokenKind::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// A lexical token: its kind, the raw source text and where it started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input at {}", self.position),
            _ => write!(f, "'{}' at {}", self.text, self.position),
        }
    }
}
