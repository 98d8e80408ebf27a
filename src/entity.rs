use crate::model::DeclarationNode;
use serde::{Deserialize, Serialize};

/// A matched declaration, detached from the tree it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResultEntity {
    pub name: String,
    /// Dotted path of every enclosing declaration plus this one.
    pub full_name: String,
}

impl ResultEntity {
    pub fn new(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        ResultEntity {
            name: name.into(),
            full_name: full_name.into(),
        }
    }
}

pub(crate) fn project(node: &DeclarationNode, full_name: &str) -> ResultEntity {
    ResultEntity::new(node.name.clone(), full_name)
}
