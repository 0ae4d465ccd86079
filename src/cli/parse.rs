//! Parse a search expression and print the tagged tree

use super::{CliError, load_mapping};
use crate::{
    output::to_tree_string,
    oracle::MetadataOracle,
    parser::Parser,
};

/// How the parsed expression is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Canonical expression text
    #[default]
    Text,
    /// Indented node dump with locations
    Tree,
    /// The filter serialized as JSON
    Json,
}

/// Options for the parse command
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// The search expression
    pub expression: String,
    /// Path of the property mapping used for classification
    pub mapping: Option<String>,
    /// Entity types assumed when the expression names none
    pub entity_types: Vec<String>,
    /// Output format
    pub format: OutputFormat,
}

/// Execute a parse operation and return the rendered result
pub fn execute_parse(options: &ParseOptions) -> Result<String, CliError> {
    let mapping = load_mapping(options.mapping.as_deref())?;
    let oracle = mapping.as_ref().map(|m| m as &dyn MetadataOracle);

    let filter = Parser::new(oracle)
        .with_default_entity_types(&options.entity_types)
        .parse(&options.expression)?;

    let rendered = match options.format {
        OutputFormat::Text => filter.to_string(),
        OutputFormat::Tree => {
            let mut out = String::new();
            if !filter.entity_types.is_empty() {
                out.push_str(&format!("entity types: {}\n", filter.entity_types.as_slice().join(", ")));
            }
            match &filter.predicate {
                Some(predicate) => out.push_str(&to_tree_string(predicate)),
                None => out.push_str("(no predicate)\n"),
            }
            out.trim_end().to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(&filter)?,
    };
    Ok(rendered)
}
