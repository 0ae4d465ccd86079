//! Splitting a parsed filter between the repository and the look-aside store.
//!
//! A homogeneous predicate is sent to its store as one expression. A
//! federated predicate is split at every federation node: each side is
//! planned on its own and the two result sets are merged (union for `or`,
//! intersection for `and`, see [`crate::evaluator::merge`]).
//!
//! ```
//! use wim_xpath::{parse, planner::{plan, SearchPlan}};
//! use wim_xpath::oracle::PropertyMapping;
//! use wim_xpath::ast::BoolOp;
//!
//! let mapping = PropertyMapping::new()
//!     .with_repository("PersonAccount", "uid")
//!     .with_lookaside("PersonAccount", "nickname");
//!
//! let filter = parse(
//!     "//entities[@xsi:type='PersonAccount' and uid='jdoe' or nickname='JD']",
//!     Some(&mapping),
//! ).unwrap();
//!
//! let SearchPlan::Merge { op, left, right } = plan(&filter) else { panic!() };
//! assert_eq!(op, BoolOp::Or);
//! assert_eq!(*left, SearchPlan::Repository(
//!     "//entities[@xsi:type='PersonAccount' and (uid = 'jdoe')]".to_string()
//! ));
//! assert_eq!(*right, SearchPlan::LookAside(
//!     "//entities[@xsi:type='PersonAccount' and (nickname = 'JD')]".to_string()
//! ));
//! ```

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::{
    ast::{AstNode, BoolOp, EntityTypeSet, Filter, Location},
    output::{type_list, type_prefix},
};

/// How to execute a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SearchPlan {
    /// No property predicate: every entity of the requested types
    All,

    /// Push the expression down to the repository
    Repository(String),

    /// Evaluate the expression against the look-aside store
    LookAside(String),

    /// Parsed without an oracle, the store is not known
    Unclassified(String),

    /// Run both sides and merge the results
    Merge {
        op: BoolOp,
        left: Box<SearchPlan>,
        right: Box<SearchPlan>,
    },
}

impl SearchPlan {
    /// The single-store expressions of this plan, left to right.
    pub fn pushdowns(&self) -> Vec<(Location, &str)> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<(Location, &'a str)>) {
        match self {
            SearchPlan::All => {}
            SearchPlan::Repository(expr) => out.push((Location::Repository, expr)),
            SearchPlan::LookAside(expr) => out.push((Location::LookAside, expr)),
            SearchPlan::Unclassified(expr) => out.push((Location::Unclassified, expr)),
            SearchPlan::Merge { left, right, .. } => {
                left.collect(out);
                right.collect(out);
            }
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        match self {
            SearchPlan::All => writeln!(f, "{}all", pad),
            SearchPlan::Repository(expr) => writeln!(f, "{}repository: {}", pad, expr),
            SearchPlan::LookAside(expr) => writeln!(f, "{}look-aside: {}", pad, expr),
            SearchPlan::Unclassified(expr) => writeln!(f, "{}unclassified: {}", pad, expr),
            SearchPlan::Merge { op, left, right } => {
                let how = match op {
                    BoolOp::And => "intersect",
                    BoolOp::Or => "union",
                };
                writeln!(f, "{}{}", pad, how)?;
                left.write_indented(f, indent + 1)?;
                right.write_indented(f, indent + 1)
            }
        }
    }
}

impl fmt::Display for SearchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Plans the execution of `filter`.
pub fn plan(filter: &Filter) -> SearchPlan {
    let plan = match &filter.predicate {
        None => SearchPlan::All,
        Some(predicate) => plan_node(&filter.entity_types, predicate),
    };
    debug!(federated = filter.is_federated(), pushdowns = plan.pushdowns().len(), "planned search");
    plan
}

fn plan_node(entity_types: &EntityTypeSet, node: &AstNode) -> SearchPlan {
    match node {
        AstNode::FederationParenthesis { child } => plan_node(entity_types, child),
        AstNode::FederationLogical { left, op, right } => SearchPlan::Merge {
            op: *op,
            left: Box::new(plan_node(entity_types, left)),
            right: Box::new(plan_node(entity_types, right)),
        },
        AstNode::Property { location, .. }
        | AstNode::Logical { location, .. }
        | AstNode::Parenthesis { location, .. } => {
            let expr = search_expression(entity_types, node);
            match location {
                Location::Repository => SearchPlan::Repository(expr),
                Location::LookAside => SearchPlan::LookAside(expr),
                Location::Unclassified => SearchPlan::Unclassified(expr),
            }
        }
    }
}

/// `//entities[<types> and (<condition>)]`, or the bare condition when no
/// entity types were named.
pub fn search_expression(entity_types: &EntityTypeSet, node: &AstNode) -> String {
    let condition = match node {
        AstNode::Parenthesis { child, .. } => child.to_string(),
        _ => node.to_string(),
    };

    if entity_types.is_empty() {
        condition
    } else {
        format!("//entities[{} and ({})]", type_prefix(entity_types), condition)
    }
}

/// `//entities[<types>]` for searches without a property predicate.
pub fn type_only_expression(entity_types: &EntityTypeSet) -> String {
    format!("//entities[{}]", type_list(entity_types))
}
