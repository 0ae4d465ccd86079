//! In-memory evaluation of predicates against entity data.
//!
//! Subtrees that cannot be pushed down to the repository (look-aside and
//! federated ones) are evaluated here against entities represented as JSON
//! objects, and the partial results of a split search are merged.
//!
//! # Matching rules
//!
//! - String comparisons ignore case.
//! - `*` in a string literal compared with `=` or `!=` is a wildcard.
//! - Numeric literals compare numerically (high-precision decimals).
//! - A missing property never matches.
//! - A multi-valued (array) property matches when any value matches.

use std::{cmp::Ordering, collections::HashSet, str::FromStr};

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use tracing::trace;

use crate::ast::{AstNode, BoolOp, CompOp, Literal};

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Entities must be JSON objects
    #[error("entity is a JSON {0}, expected an object")]
    NotAnObject(&'static str),

    /// A wildcard literal did not compile to a pattern
    #[error("invalid wildcard pattern '{pattern}': {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Returns a human-readable type name for a JSON value
fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Evaluates `node` against one entity.
///
/// # Examples
///
/// ```
/// use wim_xpath::{parse, evaluator::matches};
/// use serde_json::json;
///
/// let filter = parse("cn='J*' and age >= 18", None).unwrap();
/// let predicate = filter.predicate.unwrap();
///
/// assert!(matches(&predicate, &json!({"cn": "jane", "age": 30})).unwrap());
/// assert!(!matches(&predicate, &json!({"cn": "jane", "age": 12})).unwrap());
/// assert!(!matches(&predicate, &json!({"cn": "jane"})).unwrap());
/// ```
pub fn matches(node: &AstNode, entity: &Value) -> Result<bool, EvalError> {
    let Value::Object(properties) = entity else {
        return Err(EvalError::NotAnObject(type_name(entity)));
    };

    match node {
        AstNode::Property {
            name,
            operator,
            value,
            ..
        } => match properties.get(name) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Array(values)) => {
                for v in values {
                    if compare(v, *operator, value)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Some(v) => compare(v, *operator, value),
        },
        AstNode::Logical { left, op, right, .. } | AstNode::FederationLogical { left, op, right } => {
            let left = matches(left, entity)?;
            match op {
                BoolOp::And => Ok(left && matches(right, entity)?),
                BoolOp::Or => Ok(left || matches(right, entity)?),
            }
        }
        AstNode::Parenthesis { child, .. } | AstNode::FederationParenthesis { child } => {
            matches(child, entity)
        }
    }
}

/// Entities of `entities` that satisfy `node`, in order.
pub fn filter_entities(node: &AstNode, entities: &[Value]) -> Result<Vec<Value>, EvalError> {
    let mut out = Vec::new();
    for entity in entities {
        if matches(node, entity)? {
            out.push(entity.clone());
        }
    }
    trace!(total = entities.len(), matched = out.len(), "filtered entities");
    Ok(out)
}

fn compare(actual: &Value, op: CompOp, expected: &Literal) -> Result<bool, EvalError> {
    match expected {
        Literal::String(s) => match actual {
            Value::String(a) => compare_strings(a, op, s),
            Value::Number(_) => Ok(match (to_decimal(actual), Decimal::from_str(s).ok()) {
                (Some(a), Some(b)) => ordering_holds(a.cmp(&b), op),
                _ => false,
            }),
            Value::Bool(b) => compare_strings(&b.to_string(), op, s),
            _ => Ok(false),
        },
        Literal::Integer(n) => Ok(to_decimal(actual)
            .is_some_and(|a| ordering_holds(a.cmp(&Decimal::from(*n)), op))),
        Literal::Decimal(d) => Ok(to_decimal(actual).is_some_and(|a| ordering_holds(a.cmp(d), op))),
    }
}

fn compare_strings(actual: &str, op: CompOp, expected: &str) -> Result<bool, EvalError> {
    if expected.contains('*') && matches!(op, CompOp::Equal | CompOp::NotEqual) {
        let pattern = wildcard(expected)?;
        let found = pattern.is_match(actual);
        return Ok(if op == CompOp::Equal { found } else { !found });
    }

    let ordering = actual.to_lowercase().cmp(&expected.to_lowercase());
    Ok(ordering_holds(ordering, op))
}

/// Case-insensitive anchored regex for a `*` wildcard literal.
fn wildcard(literal: &str) -> Result<Regex, EvalError> {
    let body: Vec<String> = literal.split('*').map(regex::escape).collect();
    let pattern = format!("(?i)^{}$", body.join(".*"));
    Regex::new(&pattern).map_err(|source| EvalError::BadPattern {
        pattern: literal.to_string(),
        source,
    })
}

fn to_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                Decimal::from_str(&n.to_string()).ok()
            }
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn ordering_holds(ordering: Ordering, op: CompOp) -> bool {
    match op {
        CompOp::Equal => ordering == Ordering::Equal,
        CompOp::NotEqual => ordering != Ordering::Equal,
        CompOp::LessThan => ordering == Ordering::Less,
        CompOp::LessEqual => ordering != Ordering::Greater,
        CompOp::GreaterThan => ordering == Ordering::Greater,
        CompOp::GreaterEqual => ordering != Ordering::Less,
    }
}

/// Lower-cased unique name of an entity, read from `identifier.uniqueName`
/// or a top-level `uniqueName`.
pub fn unique_name(entity: &Value) -> Option<String> {
    entity
        .get("identifier")
        .and_then(|id| id.get("uniqueName"))
        .or_else(|| entity.get("uniqueName"))
        .and_then(Value::as_str)
        .map(str::to_lowercase)
}

/// Combines the results of the two sides of a split search.
///
/// `or` keeps every entity of `left` and adds the entities of `right` not
/// already present. `and` keeps the entities present on both sides; entities
/// without a unique name cannot be matched up and are dropped.
///
/// # Examples
///
/// ```
/// use wim_xpath::{ast::BoolOp, evaluator::merge};
/// use serde_json::json;
///
/// let left = vec![json!({"uniqueName": "uid=a"}), json!({"uniqueName": "uid=b"})];
/// let right = vec![json!({"uniqueName": "UID=B"}), json!({"uniqueName": "uid=c"})];
///
/// assert_eq!(merge(BoolOp::Or, left.clone(), right.clone()).len(), 3);
/// assert_eq!(merge(BoolOp::And, left, right), vec![json!({"uniqueName": "UID=B"})]);
/// ```
pub fn merge(op: BoolOp, left: Vec<Value>, right: Vec<Value>) -> Vec<Value> {
    match op {
        BoolOp::Or => {
            let seen: HashSet<String> = left.iter().filter_map(unique_name).collect();
            let mut out = left;
            out.extend(
                right
                    .into_iter()
                    .filter(|e| unique_name(e).is_some_and(|name| !seen.contains(&name))),
            );
            out
        }
        BoolOp::And => {
            let left: Vec<Value> = left.into_iter().filter(|e| unique_name(e).is_some()).collect();
            let right: Vec<Value> = right.into_iter().filter(|e| unique_name(e).is_some()).collect();

            // Walk the smaller side.
            let (keep, other) = if left.len() < right.len() {
                (left, right)
            } else {
                (right, left)
            };
            let names: HashSet<String> = other.iter().filter_map(unique_name).collect();
            keep.into_iter()
                .filter(|e| unique_name(e).is_some_and(|name| names.contains(&name)))
                .collect()
        }
    }
}

#[test]
fn test_wildcard_anchored() {
    let pattern = wildcard("a*z").unwrap();
    assert!(pattern.is_match("abcz"));
    assert!(pattern.is_match("AZ"));
    assert!(!pattern.is_match("xabcz"));
}

#[test]
fn test_wildcard_escapes_regex_syntax() {
    let pattern = wildcard("a.b*").unwrap();
    assert!(pattern.is_match("a.bc"));
    assert!(!pattern.is_match("axbc"));
}

#[test]
fn test_numeric_string_property() {
    use serde_json::json;

    assert!(compare(&json!("42"), CompOp::GreaterThan, &Literal::Integer(7)).unwrap());
    assert!(!compare(&json!("n/a"), CompOp::GreaterThan, &Literal::Integer(7)).unwrap());
}

#[test]
fn test_not_an_object() {
    use serde_json::json;

    let node = AstNode::Property {
        name: "cn".to_string(),
        operator: CompOp::Equal,
        value: Literal::String("x".to_string()),
        location: crate::ast::Location::Unclassified,
    };
    let err = matches(&node, &json!([1, 2])).unwrap_err();
    assert!(matches!(err, EvalError::NotAnObject("array")));
}
