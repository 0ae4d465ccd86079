//! Show how a search would be split between the stores

use super::{CliError, load_mapping};
use crate::{
    oracle::MetadataOracle,
    parser::Parser,
    planner::{SearchPlan, plan, type_only_expression},
};

/// Options for the plan command
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// The search expression
    pub expression: String,
    /// Path of the property mapping used for classification
    pub mapping: Option<String>,
    /// Entity types assumed when the expression names none
    pub entity_types: Vec<String>,
    /// Print the plan as JSON
    pub json: bool,
}

/// Execute a plan operation and return the rendered plan
pub fn execute_plan(options: &PlanOptions) -> Result<String, CliError> {
    let mapping = load_mapping(options.mapping.as_deref())?;
    let oracle = mapping.as_ref().map(|m| m as &dyn MetadataOracle);

    let filter = Parser::new(oracle)
        .with_default_entity_types(&options.entity_types)
        .parse(&options.expression)?;
    let search = plan(&filter);

    if options.json {
        return Ok(serde_json::to_string_pretty(&search)?);
    }

    let rendered = match &search {
        SearchPlan::All if !filter.entity_types.is_empty() => {
            format!("repository: {}", type_only_expression(&filter.entity_types))
        }
        _ => search.to_string().trim_end().to_string(),
    };
    Ok(rendered)
}
