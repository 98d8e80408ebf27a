pub mod json;
pub mod plain;

use crate::entity::ResultEntity;
use crate::error::QueryError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// Render query results. Traversal order is not stable, so results are sorted
/// by qualified name first.
pub fn format_results(results: &[ResultEntity], format: OutputFormat) -> Result<String, QueryError> {
    let mut sorted = results.to_vec();
    sorted.sort_by(|a, b| a.full_name.cmp(&b.full_name).then_with(|| a.name.cmp(&b.name)));
    match format {
        OutputFormat::Plain => Ok(plain::format_output(&sorted)),
        OutputFormat::Json => json::format_output(&sorted),
    }
}
