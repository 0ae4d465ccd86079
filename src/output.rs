//! Text rendering of parsed search expressions.
//!
//! Two renderings are provided:
//!
//! - **Canonical text** via [`std::fmt::Display`] on [`AstNode`] and
//!   [`Filter`]. Parsing the canonical text again yields the same tree with
//!   the same location tags.
//! - **Tree dump** via [`to_tree_string()`], one node per line with its
//!   location, for diagnostics.
//!
//! # Examples
//!
//! ```
//! use wim_xpath::parser::parse;
//! use wim_xpath::output::to_tree_string;
//!
//! let filter = parse("//entities[@xsi:type='Group' and (cn='a*' OR cn=\"b*\")]", None).unwrap();
//! assert_eq!(
//!     filter.to_string(),
//!     "//entities[@xsi:type='Group' and (cn = 'a*' or cn = 'b*')]"
//! );
//!
//! let tree = to_tree_string(filter.predicate.as_ref().unwrap());
//! assert_eq!(
//!     tree,
//!     "Parenthesis [unclassified]\n  Logical or [unclassified]\n    Property cn = 'a*' [unclassified]\n    Property cn = 'b*' [unclassified]\n"
//! );
//! ```

use std::fmt;

use crate::ast::{AstNode, EntityTypeSet, Filter, Literal, TYPE_PROPERTY};

/// Single-quotes `value`, doubling embedded quotes.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => f.write_str(&quote(s)),
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Decimal(d) => write!(f, "{}", d),
        }
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstNode::Property {
                name,
                operator,
                value,
                ..
            } => write!(f, "{} {} {}", name, operator, value),
            AstNode::Logical { left, op, right, .. } | AstNode::FederationLogical { left, op, right } => {
                write!(f, "{} {} {}", left, op, right)
            }
            AstNode::Parenthesis { child, .. } | AstNode::FederationParenthesis { child } => {
                write!(f, "({})", child)
            }
        }
    }
}

/// `@xsi:type='A' or @xsi:type='B'`
pub fn type_list(entity_types: &EntityTypeSet) -> String {
    entity_types
        .iter()
        .map(|t| format!("@{}={}", TYPE_PROPERTY, quote(t)))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// The entity-type part of a filter as it appears in front of `and`.
pub(crate) fn type_prefix(entity_types: &EntityTypeSet) -> String {
    if entity_types.len() > 1 {
        format!("({})", type_list(entity_types))
    } else {
        type_list(entity_types)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.predicate, self.entity_types.is_empty()) {
            (Some(predicate), true) => write!(f, "{}", predicate),
            (Some(predicate), false) => {
                write!(f, "//entities[{} and {}]", type_prefix(&self.entity_types), predicate)
            }
            (None, false) => write!(f, "//entities[{}]", type_list(&self.entity_types)),
            (None, true) => Ok(()),
        }
    }
}

struct TreePrinter {
    out: String,
}

impl TreePrinter {
    fn new() -> Self {
        TreePrinter { out: String::new() }
    }

    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn print_node(&mut self, node: &AstNode, indent: usize) {
        match node {
            AstNode::Property { location, .. } => {
                self.line(indent, &format!("Property {} [{}]", node, location));
            }
            AstNode::Logical {
                left,
                op,
                right,
                location,
            } => {
                self.line(indent, &format!("Logical {} [{}]", op, location));
                self.print_node(left, indent + 1);
                self.print_node(right, indent + 1);
            }
            AstNode::FederationLogical { left, op, right } => {
                self.line(indent, &format!("FederationLogical {} [mixed]", op));
                self.print_node(left, indent + 1);
                self.print_node(right, indent + 1);
            }
            AstNode::Parenthesis { child, location } => {
                self.line(indent, &format!("Parenthesis [{}]", location));
                self.print_node(child, indent + 1);
            }
            AstNode::FederationParenthesis { child } => {
                self.line(indent, "FederationParenthesis [mixed]");
                self.print_node(child, indent + 1);
            }
        }
    }
}

/// Indented dump of `node`, one line per node.
pub fn to_tree_string(node: &AstNode) -> String {
    let mut printer = TreePrinter::new();
    printer.print_node(node, 0);
    printer.out
}

#[test]
fn test_quote_escapes() {
    assert_eq!(quote("O'Brien"), "'O''Brien'");
    assert_eq!(quote(""), "''");
}

#[test]
fn test_type_prefix() {
    let one = EntityTypeSet::from(vec!["Group".to_string()]);
    assert_eq!(type_prefix(&one), "@xsi:type='Group'");

    let two = EntityTypeSet::from(vec!["Group".to_string(), "PersonAccount".to_string()]);
    assert_eq!(
        type_prefix(&two),
        "(@xsi:type='Group' or @xsi:type='PersonAccount')"
    );
}

#[test]
fn test_type_property_printed_as_stored() {
    let node = AstNode::Property {
        name: TYPE_PROPERTY.to_string(),
        operator: crate::ast::CompOp::Equal,
        value: Literal::String("Group".to_string()),
        location: crate::ast::Location::Repository,
    };
    assert_eq!(node.to_string(), "xsi:type = 'Group'");
}
