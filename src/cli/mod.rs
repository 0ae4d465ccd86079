//! CLI support for wim-xpath
//!
//! Provides programmatic access to the `wimxp` commands so they can be
//! embedded in other tools.

mod eval;
mod parse;
mod plan;

pub use eval::{EvalOptions, execute_eval};
pub use parse::{OutputFormat, ParseOptions, execute_parse};
pub use plan::{PlanOptions, execute_plan};

use std::io;

use thiserror::Error;

use crate::oracle::{MappingError, PropertyMapping};

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Search expression error
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    /// Property mapping could not be loaded
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Evaluation error
    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    /// JSON parsing error
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No input provided
    #[error("No input provided. Use --input or pipe a JSON array of entities to stdin.")]
    NoInput,

    /// Entity input is not a JSON array
    #[error("Expected a JSON array of entities")]
    NotAnArray,
}

fn load_mapping(path: Option<&str>) -> Result<Option<PropertyMapping>, CliError> {
    path.map(PropertyMapping::from_path).transpose().map_err(CliError::from)
}
