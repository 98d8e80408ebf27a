//! Declarative queries over declaration trees.
//!
//! A query is assembled with the fluent builder in [`query`], frozen into a
//! [`QuerySpec`] and run against any [`DeclarationProvider`]: an in-memory tree,
//! a serialized JSON tree, or Rust and TypeScript sources lowered on the fly.

pub mod condition;
mod entity;
mod error;
mod languages;
pub mod model;
mod output;
mod parser;
pub mod provider;
pub mod query;
mod traverse;
pub mod type_name;
mod walk;

pub use entity::ResultEntity;
pub use error::QueryError;
pub use languages::Language;
pub use model::{Accessibility, DeclarationNode, Level, NodeKind, TypeParameterConstraints};
pub use output::{format_results, OutputFormat};
pub use provider::{DeclarationProvider, JsonProvider, SourceOptions, SourceProvider};
pub use query::{KindSet, Query, QueryBuilder, QuerySpec};
pub use traverse::TraversalOptions;
pub use type_name::{canonical_name, TypeIdentity, TypeRef};

/// Options for running a query against a path
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub source: SourceOptions,
    pub traversal: TraversalOptions,
    pub format: OutputFormat,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        ProcessOptions {
            source: SourceOptions::default(),
            traversal: TraversalOptions::default(),
            format: OutputFormat::Plain,
        }
    }
}

/// Load the declarations at `path`, run `spec` and format the matches
pub fn process_path(
    path: &str,
    spec: &QuerySpec,
    options: ProcessOptions,
) -> Result<String, QueryError> {
    let provider = provider::for_path(path, options.source)?;
    let results = spec.execute_with(provider.as_ref(), &options.traversal)?;
    tracing::debug!(path, matches = results.len(), "query finished");
    format_results(&results, options.format)
}
