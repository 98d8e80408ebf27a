use crate::error::QueryError;
use crate::languages::{self, Language};
use tree_sitter::{Parser, Tree};

/// Parse source code into a Tree-sitter AST
pub fn parse(source: &str, language: Language) -> Result<Tree, QueryError> {
    let mut parser = Parser::new();
    parser
        .set_language(&languages::ts_language(language))
        .map_err(|e| QueryError::ParseError(format!("Failed to set language: {}", e)))?;

    parser
        .parse(source, None)
        .ok_or_else(|| QueryError::ParseError("Failed to parse source code".to_string()))
}

/// Source text covered by `node`.
pub fn text<'s>(node: tree_sitter::Node, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}
