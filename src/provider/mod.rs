//! Sources of declaration trees.

pub mod json;
pub mod source;

pub use json::JsonProvider;
pub use source::{SourceOptions, SourceProvider};

use crate::error::QueryError;
use crate::model::{DeclarationNode, NodeKind};
use crate::type_name::{canonical_name, TypeRef};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Anything that can produce the root of a declaration tree.
pub trait DeclarationProvider {
    fn load(&self) -> Result<DeclarationNode, QueryError>;
}

/// An already-built tree is its own provider.
impl DeclarationProvider for DeclarationNode {
    fn load(&self) -> Result<DeclarationNode, QueryError> {
        Ok(self.clone())
    }
}

/// Pick a provider for `path`: serialized trees for `*.json`, source lowering otherwise.
pub fn for_path(
    path: impl AsRef<Path>,
    options: SourceOptions,
) -> Result<Box<dyn DeclarationProvider>, QueryError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(QueryError::PathNotFound(path.display().to_string()));
    }
    let is_json = path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json");
    if is_json {
        Ok(Box::new(JsonProvider::new(path)))
    } else {
        Ok(Box::new(SourceProvider::new(path, options)))
    }
}

/// Extend every interface set with the interfaces its members themselves
/// extend, and with those of base classes, as far as the tree declares them.
pub(crate) fn close_interfaces(root: &mut DeclarationNode) {
    let mut index = InheritanceIndex::default();
    index.collect(root, "");
    if index.declared.is_empty() {
        return;
    }
    index.apply(root, "");
}

/// What a declared type passes on to the types deriving from it.
struct Inherited {
    namespace: String,
    interfaces: Vec<TypeRef>,
    base: Option<TypeRef>,
}

#[derive(Default)]
struct InheritanceIndex {
    /// Keyed by the canonical open name, `Ns.Name`.
    declared: HashMap<String, Inherited>,
    /// Bare name to every qualified key declaring it.
    by_name: HashMap<String, Vec<String>>,
}

impl InheritanceIndex {
    fn collect(&mut self, node: &DeclarationNode, namespace: &str) {
        let inherits = matches!(
            node.kind,
            NodeKind::Interface | NodeKind::Class | NodeKind::Struct
        ) && (!node.interfaces.is_empty() || node.base.is_some());
        if inherits {
            let key = canonical_name(&TypeRef::new(namespace, node.name.clone()));
            let keys = self.by_name.entry(node.name.clone()).or_default();
            if !keys.contains(&key) {
                keys.push(key.clone());
            }
            let entry = self.declared.entry(key).or_insert_with(|| Inherited {
                namespace: namespace.to_string(),
                interfaces: Vec::new(),
                base: None,
            });
            entry.interfaces.extend(node.interfaces.iter().cloned());
            if entry.base.is_none() {
                entry.base = node.base.clone();
            }
        }
        let child_namespace = scope_of(node, namespace);
        for child in &node.children {
            self.collect(child, &child_namespace);
        }
    }

    /// Exact name first, then relative to `namespace`, then an unambiguous bare name.
    fn resolve(&self, ty: &TypeRef, namespace: &str) -> Option<&Inherited> {
        // Generic types are declared by their open name.
        let open = TypeRef::new(ty.namespace.clone(), ty.name.clone());
        let exact = canonical_name(&open);
        if let Some(found) = self.declared.get(&exact) {
            return Some(found);
        }
        if !namespace.is_empty() {
            if let Some(found) = self.declared.get(&format!("{namespace}.{exact}")) {
                return Some(found);
            }
        }
        match self.by_name.get(&ty.name).map(Vec::as_slice) {
            Some([only]) => self.declared.get(only),
            _ => None,
        }
    }

    fn apply(&self, node: &mut DeclarationNode, namespace: &str) {
        if !node.interfaces.is_empty() || node.base.is_some() {
            let mut seen: HashSet<String> = node.interfaces.iter().map(canonical_name).collect();
            let mut visited_bases = HashSet::new();
            let mut pending: Vec<(TypeRef, String)> = node
                .interfaces
                .iter()
                .map(|i| (i.clone(), namespace.to_string()))
                .collect();
            if let Some(base) = &node.base {
                pending.push((base.clone(), namespace.to_string()));
            }
            while let Some((ty, context)) = pending.pop() {
                let Some(inherited) = self.resolve(&ty, &context) else {
                    continue;
                };
                for parent in &inherited.interfaces {
                    if seen.insert(canonical_name(parent)) {
                        node.interfaces.push(parent.clone());
                        pending.push((parent.clone(), inherited.namespace.clone()));
                    }
                }
                if let Some(base) = &inherited.base {
                    if visited_bases.insert(canonical_name(base)) {
                        pending.push((base.clone(), inherited.namespace.clone()));
                    }
                }
            }
        }
        let child_namespace = scope_of(node, namespace);
        for child in &mut node.children {
            self.apply(child, &child_namespace);
        }
    }
}

fn scope_of(node: &DeclarationNode, namespace: &str) -> String {
    if node.kind != NodeKind::Namespace || node.name.is_empty() {
        namespace.to_string()
    } else if namespace.is_empty() {
        node.name.clone()
    } else {
        format!("{namespace}.{}", node.name)
    }
}

/// Add `child` under `parent`, folding namespaces of the same name together.
pub(crate) fn merge_child(parent: &mut DeclarationNode, child: DeclarationNode) {
    if child.kind == NodeKind::Namespace {
        let existing = parent
            .children
            .iter_mut()
            .find(|c| c.kind == NodeKind::Namespace && c.name == child.name);
        if let Some(existing) = existing {
            for grandchild in child.children {
                merge_child(existing, grandchild);
            }
            return;
        }
    }
    parent.children.push(child);
}
