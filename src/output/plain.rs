use crate::entity::ResultEntity;

/// One qualified name per line
pub fn format_output(results: &[ResultEntity]) -> String {
    let mut output = String::new();
    for result in results {
        output.push_str(&result.full_name);
        output.push('\n');
    }
    output
}
