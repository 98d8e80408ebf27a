use crate::entity::ResultEntity;
use crate::error::QueryError;
use serde::Serialize;

#[derive(Serialize)]
struct JsonOutput<'a> {
    count: usize,
    results: &'a [ResultEntity],
}

/// Format results as JSON
pub fn format_output(results: &[ResultEntity]) -> Result<String, QueryError> {
    let output = JsonOutput {
        count: results.len(),
        results,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lists_results_with_count() {
        let results = vec![ResultEntity::new("Repo", "App.Repo<T>")];
        let json = format_output(&results).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["results"][0]["name"], "Repo");
        assert_eq!(value["results"][0]["full_name"], "App.Repo<T>");
    }
}
