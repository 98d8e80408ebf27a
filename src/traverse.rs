//! Walks a declaration tree and collects everything a [`QuerySpec`] accepts.

use crate::entity::{self, ResultEntity};
use crate::model::{DeclarationNode, NodeKind};
use crate::query::QuerySpec;
use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct TraversalOptions {
    /// Visit siblings on the rayon pool. Result order is unspecified either way.
    pub parallel: bool,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        TraversalOptions { parallel: true }
    }
}

/// Where a node sits: its containing namespace and the qualified name of
/// its parent. Both are empty at the root.
struct Scope {
    namespace: String,
    path: String,
}

struct Walker<'q> {
    spec: &'q QuerySpec,
    parallel: bool,
    results: Mutex<Vec<ResultEntity>>,
}

pub(crate) fn traverse(
    spec: &QuerySpec,
    root: &DeclarationNode,
    options: &TraversalOptions,
) -> Vec<ResultEntity> {
    let walker = Walker {
        spec,
        parallel: options.parallel,
        results: Mutex::new(Vec::new()),
    };
    if spec.kinds().max_level().is_some() {
        let scope = Scope {
            namespace: String::new(),
            path: String::new(),
        };
        walker.descend(root, &scope);
    }
    let results = walker.results.into_inner();
    debug!(matches = results.len(), parallel = options.parallel, "traversal finished");
    results
}

impl Walker<'_> {
    fn visit(&self, node: &DeclarationNode, parent: &Scope) {
        if node.is_special() {
            trace!(name = %node.name, "skipping special declaration");
            return;
        }
        if !self.spec.is_visitable(node) {
            trace!(name = %node.name, kind = ?node.kind, "pruned");
            return;
        }

        let full_name = qualify(&parent.path, &node.display_name());
        if self.spec.includes(node, &parent.namespace) {
            self.results.lock().push(entity::project(node, &full_name));
        }

        let namespace = if node.kind == NodeKind::Namespace {
            full_name.clone()
        } else {
            parent.namespace.clone()
        };
        let scope = Scope {
            namespace,
            path: full_name,
        };
        self.descend(node, &scope);
    }

    fn descend(&self, node: &DeclarationNode, scope: &Scope) {
        let kind = node.kind;
        if self.parallel {
            node.children
                .par_iter()
                .filter(|child| may_contain(kind, child.kind))
                .for_each(|child| self.visit(child, scope));
        } else {
            node.children
                .iter()
                .filter(|child| may_contain(kind, child.kind))
                .for_each(|child| self.visit(child, scope));
        }
    }
}

/// Which child kinds the traversal follows below a parent of kind `parent`.
fn may_contain(parent: NodeKind, child: NodeKind) -> bool {
    match parent {
        NodeKind::Namespace => {
            child == NodeKind::Namespace || child.is_named_type() || child.is_member()
        }
        NodeKind::Class | NodeKind::Struct | NodeKind::Enum | NodeKind::Interface => {
            child.is_named_type() || child.is_member() || child == NodeKind::TypeParameter
        }
        NodeKind::Method => matches!(child, NodeKind::Parameter | NodeKind::TypeParameter),
        NodeKind::Property | NodeKind::Field | NodeKind::Parameter | NodeKind::TypeParameter => {
            false
        }
    }
}

fn qualify(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Accessibility;
    use crate::query::Query;

    fn sequential() -> TraversalOptions {
        TraversalOptions { parallel: false }
    }

    fn names(results: Vec<ResultEntity>) -> Vec<String> {
        let mut names: Vec<String> = results.into_iter().map(|r| r.full_name).collect();
        names.sort();
        names
    }

    fn tree() -> DeclarationNode {
        DeclarationNode::global().with_children([
            DeclarationNode::new(NodeKind::Class, "Top"),
            DeclarationNode::namespace("<Module>"),
            DeclarationNode::namespace("App").with_children([
                DeclarationNode::new(NodeKind::Class, "Repo")
                    .with_visibility(Accessibility::Public)
                    .with_child(DeclarationNode::type_parameter("T", Default::default()))
                    .with_child(
                        DeclarationNode::new(NodeKind::Method, "Save")
                            .with_child(DeclarationNode::new(NodeKind::Parameter, "item")),
                    )
                    .with_child(DeclarationNode::new(NodeKind::Class, "Inner")),
                DeclarationNode::new(NodeKind::Class, "Hidden").synthetic(),
                DeclarationNode::namespace("Models")
                    .with_child(DeclarationNode::new(NodeKind::Struct, "Point")),
            ]),
        ])
    }

    #[test]
    fn qualified_names_include_type_parameters() {
        let spec = Query::all().build();
        let found = names(spec.run_with(&tree(), &sequential()));
        assert_eq!(
            found,
            vec![
                "App",
                "App.Models",
                "App.Models.Point",
                "App.Repo<T>",
                "App.Repo<T>.Inner",
                "App.Repo<T>.Save",
                "App.Repo<T>.Save.item",
                "App.Repo<T>.T",
                "Top",
            ]
        );
    }

    #[test]
    fn root_and_special_nodes_are_never_reported() {
        let spec = Query::of_kinds([NodeKind::Namespace]).build();
        let found = names(spec.run_with(&tree(), &sequential()));
        assert_eq!(found, vec!["App", "App.Models"]);

        let classes = names(Query::classes().build().run_with(&tree(), &sequential()));
        assert!(!classes.iter().any(|n| n.contains("Hidden")));
    }

    #[test]
    fn depth_follows_deepest_enabled_kind() {
        let spec = Query::classes().with_name().equal_to("Save").build();
        assert!(spec.run_with(&tree(), &sequential()).is_empty());
        let spec = Query::methods().build();
        assert_eq!(names(spec.run_with(&tree(), &sequential())), vec!["App.Repo<T>.Save"]);
    }

    #[test]
    fn namespace_condition_sees_the_full_path() {
        let spec = Query::types().with_namespace().equal_to("App.Models").build();
        assert_eq!(names(spec.run(&tree())), vec!["App.Models.Point"]);

        let spec = Query::types().with_namespace().equal_to("").build();
        assert_eq!(names(spec.run(&tree())), vec!["Top"]);
    }

    #[test]
    fn nested_types_keep_the_enclosing_namespace() {
        let spec = Query::classes().with_namespace().equal_to("App").build();
        assert_eq!(
            names(spec.run(&tree())),
            vec!["App.Repo<T>", "App.Repo<T>.Inner"]
        );
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let spec = Query::all().build();
        let parallel = names(spec.run_with(&tree(), &TraversalOptions { parallel: true }));
        let serial = names(spec.run_with(&tree(), &sequential()));
        assert_eq!(parallel, serial);
    }

    #[test]
    fn containment_rules() {
        assert!(may_contain(NodeKind::Namespace, NodeKind::Method));
        assert!(!may_contain(NodeKind::Namespace, NodeKind::Parameter));
        assert!(may_contain(NodeKind::Class, NodeKind::TypeParameter));
        assert!(!may_contain(NodeKind::Class, NodeKind::Namespace));
        assert!(may_contain(NodeKind::Method, NodeKind::TypeParameter));
        assert!(!may_contain(NodeKind::Method, NodeKind::Method));
        assert!(!may_contain(NodeKind::Field, NodeKind::Parameter));
    }
}
