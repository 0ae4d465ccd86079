use rust_decimal::Decimal;
use serde::Serialize;

use crate::ast::{BoolOp, CompOp, Location};

/// Name of the entity-type discriminator property.
pub const TYPE_PROPERTY: &str = "xsi:type";

/// Literal on the right-hand side of a property comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Literal {
    /// String literal, stored without quotes and with doubled quotes
    /// collapsed
    ///
    /// # Example
    /// ```text
    /// 'O''Brien'    // String("O'Brien")
    /// ```
    String(String),

    /// Integer literal
    Integer(i64),

    /// Decimal literal
    ///
    /// # Example
    /// ```text
    /// 2.50
    /// ```
    Decimal(Decimal),
}

/// Node of a parsed search predicate.
///
/// Every node carries the storage location of the properties below it.
/// Combinators whose operands live in different stores are built as the
/// `Federation*` variants, so consumers can match on "cannot be pushed down
/// as a unit" directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AstNode {
    /// Leaf comparison of a property against a literal
    ///
    /// # Examples
    /// ```text
    /// uid = 'jdoe'
    /// @xsi:type = 'Group'
    /// age >= 18
    /// ```
    Property {
        name: String,
        operator: CompOp,
        value: Literal,
        location: Location,
    },

    /// `and` / `or` of two subtrees stored in the same place
    Logical {
        left: Box<AstNode>,
        op: BoolOp,
        right: Box<AstNode>,
        location: Location,
    },

    /// `and` / `or` of two subtrees stored in different places
    FederationLogical {
        left: Box<AstNode>,
        op: BoolOp,
        right: Box<AstNode>,
    },

    /// Explicit grouping around a homogeneous subtree
    ///
    /// # Example
    /// ```text
    /// (cn = 'a*' or sn = 'b*')
    /// ```
    Parenthesis {
        child: Box<AstNode>,
        location: Location,
    },

    /// Explicit grouping around a federated subtree
    FederationParenthesis { child: Box<AstNode> },
}

/// Borrowed view of a `Property` leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyRef<'a> {
    pub name: &'a str,
    pub operator: CompOp,
    pub value: &'a Literal,
    pub location: Location,
}

impl AstNode {
    /// Builds a combinator, choosing the federation variant when the operands
    /// disagree on location.
    pub fn logical(left: AstNode, op: BoolOp, right: AstNode) -> AstNode {
        match Location::combine(left.location(), right.location()) {
            Some(location) => AstNode::Logical {
                left: Box::new(left),
                op,
                right: Box::new(right),
                location,
            },
            None => AstNode::FederationLogical {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
        }
    }

    /// Wraps `child` in a grouping node that inherits its classification.
    pub fn parenthesis(child: AstNode) -> AstNode {
        match child.location() {
            Some(location) => AstNode::Parenthesis {
                child: Box::new(child),
                location,
            },
            None => AstNode::FederationParenthesis {
                child: Box::new(child),
            },
        }
    }

    /// The shared location of this subtree, `None` when it is federated.
    pub fn location(&self) -> Option<Location> {
        match self {
            AstNode::Property { location, .. }
            | AstNode::Logical { location, .. }
            | AstNode::Parenthesis { location, .. } => Some(*location),
            AstNode::FederationLogical { .. } | AstNode::FederationParenthesis { .. } => None,
        }
    }

    pub fn is_federated(&self) -> bool {
        self.location().is_none()
    }

    /// Property leaves in left-to-right order.
    pub fn property_nodes(&self) -> Vec<PropertyRef<'_>> {
        let mut out = Vec::new();
        self.collect_properties(&mut out);
        out
    }

    fn collect_properties<'a>(&'a self, out: &mut Vec<PropertyRef<'a>>) {
        match self {
            AstNode::Property {
                name,
                operator,
                value,
                location,
            } => out.push(PropertyRef {
                name,
                operator: *operator,
                value,
                location: *location,
            }),
            AstNode::Logical { left, right, .. } | AstNode::FederationLogical { left, right, .. } => {
                left.collect_properties(out);
                right.collect_properties(out);
            }
            AstNode::Parenthesis { child, .. } | AstNode::FederationParenthesis { child } => {
                child.collect_properties(out)
            }
        }
    }
}
