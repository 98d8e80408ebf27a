use super::{close_interfaces, DeclarationProvider};
use crate::error::QueryError;
use crate::model::DeclarationNode;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Loads a declaration tree serialized as JSON.
pub struct JsonProvider {
    path: PathBuf,
}

impl JsonProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonProvider { path: path.into() }
    }
}

/// Deserialize a tree and close its interface sets.
pub fn parse_tree(json: &str) -> Result<DeclarationNode, QueryError> {
    let mut root: DeclarationNode = serde_json::from_str(json)?;
    close_interfaces(&mut root);
    Ok(root)
}

impl DeclarationProvider for JsonProvider {
    fn load(&self) -> Result<DeclarationNode, QueryError> {
        let text = fs::read_to_string(&self.path).map_err(|e| QueryError::ReadError {
            path: self.path.display().to_string(),
            source: e,
        })?;
        let root = parse_tree(&text)?;
        debug!(path = %self.path.display(), "loaded declaration tree");
        Ok(root)
    }
}
