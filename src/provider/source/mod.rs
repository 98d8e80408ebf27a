//! Lowers Rust and TypeScript sources into a declaration tree.
//!
//! Files map onto namespaces by path: `src/shapes/circle.rs` lands in
//! `shapes.circle`, while `lib`, `main`, `mod` and `index` files stand for their
//! directory. Inline `mod` and `namespace` blocks nest below that.

mod rust;
mod typescript;

use super::{close_interfaces, merge_child, DeclarationProvider};
use crate::error::QueryError;
use crate::languages::{self, Language};
use crate::model::DeclarationNode;
use crate::parser;
use crate::type_name::TypeRef;
use crate::walk;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Options for walking source trees
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Directory recursion depth below the root (unlimited when `None`).
    pub depth: Option<usize>,
    /// Only lower files with these extensions (all supported ones when empty).
    pub extensions: Vec<String>,
}

pub struct SourceProvider {
    path: PathBuf,
    options: SourceOptions,
}

impl SourceProvider {
    pub fn new(path: impl Into<PathBuf>, options: SourceOptions) -> Self {
        SourceProvider {
            path: path.into(),
            options,
        }
    }
}

impl DeclarationProvider for SourceProvider {
    fn load(&self) -> Result<DeclarationNode, QueryError> {
        let path = self.path.as_path();
        if !path.exists() {
            return Err(QueryError::PathNotFound(path.display().to_string()));
        }

        let mut root = DeclarationNode::global();
        if path.is_file() {
            let segments = namespace_segments(Path::new(path.file_name().unwrap_or_default()));
            let decls = lower_file(path)?;
            insert_at(&mut root, &segments, decls);
        } else if path.is_dir() {
            let files = walk::walk_directory(path, self.options.depth, &self.options.extensions)?;
            debug!(root = %path.display(), files = files.len(), "lowering source tree");
            let lowered: Vec<(PathBuf, Result<Vec<DeclarationNode>, QueryError>)> = files
                .into_par_iter()
                .map(|file| {
                    let decls = lower_file(&file);
                    (file, decls)
                })
                .collect();
            for (file, decls) in lowered {
                match decls {
                    Ok(decls) => {
                        let relative = file.strip_prefix(path).unwrap_or(&file);
                        insert_at(&mut root, &namespace_segments(relative), decls);
                    }
                    Err(e) => warn!(file = %file.display(), error = %e, "skipping file"),
                }
            }
        } else {
            return Err(QueryError::InvalidPath(path.display().to_string()));
        }

        close_interfaces(&mut root);
        Ok(root)
    }
}

fn lower_file(path: &Path) -> Result<Vec<DeclarationNode>, QueryError> {
    let source = fs::read_to_string(path).map_err(|e| QueryError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let language = languages::detect_language(path)?;
    let tree = parser::parse(&source, language)?;
    if tree.root_node().has_error() {
        debug!(file = %path.display(), "source has syntax errors, lowering what parsed");
    }
    let decls = match language {
        Language::Rust => rust::lower(tree.root_node(), &source),
        Language::TypeScript | Language::Tsx => typescript::lower(tree.root_node(), &source),
    };
    trace!(file = %path.display(), declarations = decls.len(), "lowered");
    Ok(decls)
}

/// Namespace path of a file relative to the walked root.
fn namespace_segments(relative: &Path) -> Vec<String> {
    let mut segments: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(|dir| dir.components())
        .filter_map(|c| c.as_os_str().to_str())
        .map(str::to_string)
        .collect();
    if segments.first().is_some_and(|s| s == "src") {
        segments.remove(0);
    }
    if let Some(stem) = relative.file_stem().and_then(|s| s.to_str()) {
        if !matches!(stem, "lib" | "main" | "mod" | "index") {
            segments.push(stem.to_string());
        }
    }
    segments
}

fn insert_at(root: &mut DeclarationNode, segments: &[String], decls: Vec<DeclarationNode>) {
    let Some((last, outer)) = segments.split_last() else {
        for decl in decls {
            merge_child(root, decl);
        }
        return;
    };
    let mut node = DeclarationNode::namespace(last.clone()).with_children(decls);
    for segment in outer.iter().rev() {
        node = DeclarationNode::namespace(segment.clone()).with_child(node);
    }
    merge_child(root, node);
}

/// Parse a type as written in source, dropping what the canonical namer
/// cannot express.
pub(crate) fn type_ref(text: &str) -> Option<TypeRef> {
    match TypeRef::parse(text) {
        Ok(ty) => Some(ty),
        Err(_) => {
            trace!(text, "unrepresentable type reference");
            None
        }
    }
}
