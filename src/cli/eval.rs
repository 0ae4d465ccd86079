//! Filter JSON entities with a search expression

use serde_json::Value;

use super::CliError;
use crate::{evaluator::filter_entities, parser::parse};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// The search expression
    pub expression: String,
    /// JSON array of entities
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
}

/// Execute an eval operation and return the matching entities as JSON
pub fn execute_eval(options: &EvalOptions) -> Result<String, CliError> {
    let filter = parse(&options.expression, None)?;

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let Value::Array(entities) = serde_json::from_str::<Value>(json_str)? else {
        return Err(CliError::NotAnArray);
    };

    let matched = match &filter.predicate {
        Some(predicate) => filter_entities(predicate, &entities)?,
        None => entities,
    };

    let output = Value::Array(matched);
    let json = if options.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    Ok(json)
}
