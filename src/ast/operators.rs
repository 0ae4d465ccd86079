use std::fmt;

use serde::Serialize;

/// Comparison operators allowed between a property and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompOp {
    /// Equal (`=`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
}

impl CompOp {
    pub fn from_symbol(symbol: &str) -> Option<CompOp> {
        match symbol {
            "=" => Some(CompOp::Equal),
            "!=" => Some(CompOp::NotEqual),
            "<" => Some(CompOp::LessThan),
            "<=" => Some(CompOp::LessEqual),
            ">" => Some(CompOp::GreaterThan),
            ">=" => Some(CompOp::GreaterEqual),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CompOp::Equal => "=",
            CompOp::NotEqual => "!=",
            CompOp::LessThan => "<",
            CompOp::LessEqual => "<=",
            CompOp::GreaterThan => ">",
            CompOp::GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for CompOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Boolean combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BoolOp {
    /// Logical AND (`and`)
    And,
    /// Logical OR (`or`)
    Or,
}

impl BoolOp {
    pub fn keyword(&self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
