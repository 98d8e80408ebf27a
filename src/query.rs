//! The fluent facade that assembles an immutable [`QuerySpec`].

use crate::condition::{
    GenericParameterCondition, Predicate, StringCondition, TypeSetCondition, VisibilityCondition,
};
use crate::entity::ResultEntity;
use crate::error::QueryError;
use crate::model::{Accessibility, DeclarationNode, Level, NodeKind, TypeParameterConstraints};
use crate::provider::DeclarationProvider;
use crate::traverse::{self, TraversalOptions};
use crate::type_name::TypeRef;
use std::collections::HashMap;
use std::sync::Arc;

/// The set of declaration kinds a query reports. Its deepest kind also
/// decides how far down the tree the traversal goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSet(u16);

impl KindSet {
    pub fn all() -> Self {
        NodeKind::ALL.into_iter().collect()
    }

    pub fn empty() -> Self {
        KindSet(0)
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn insert(&mut self, kind: NodeKind) {
        self.0 |= kind.bit();
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeKind> + '_ {
        NodeKind::ALL.into_iter().filter(|k| self.contains(*k))
    }

    /// Deepest level a walk must reach to find every enabled kind; `None`
    /// when nothing is enabled. Type parameters also sit under methods.
    pub fn max_level(&self) -> Option<Level> {
        self.iter()
            .map(|kind| match kind {
                NodeKind::TypeParameter => Level::Member,
                other => other.level(),
            })
            .max()
    }
}

impl FromIterator<NodeKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = NodeKind>>(iter: I) -> Self {
        let mut set = KindSet::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

/// Entry points, one per common target kind.
pub struct Query;

impl Query {
    pub fn all() -> QueryBuilder {
        QueryBuilder::new()
    }

    pub fn of_kinds(kinds: impl IntoIterator<Item = NodeKind>) -> QueryBuilder {
        QueryBuilder::new().kinds(kinds)
    }

    pub fn namespaces() -> QueryBuilder {
        Query::of_kinds([NodeKind::Namespace])
    }

    pub fn classes() -> QueryBuilder {
        Query::of_kinds([NodeKind::Class])
    }

    pub fn types() -> QueryBuilder {
        Query::of_kinds([
            NodeKind::Class,
            NodeKind::Struct,
            NodeKind::Enum,
            NodeKind::Interface,
        ])
    }

    pub fn methods() -> QueryBuilder {
        Query::of_kinds([NodeKind::Method])
    }

    pub fn members() -> QueryBuilder {
        Query::of_kinds([NodeKind::Method, NodeKind::Property, NodeKind::Field])
    }

    pub fn parameters() -> QueryBuilder {
        Query::of_kinds([NodeKind::Parameter])
    }
}

#[derive(Clone)]
pub struct QueryBuilder {
    name: Option<Predicate<str>>,
    visibility: Option<Predicate<Accessibility>>,
    generic_parameter: Option<Predicate<TypeParameterConstraints>>,
    namespace: Option<Predicate<str>>,
    interfaces: Option<Predicate<[TypeRef]>>,
    annotations: Option<Predicate<[TypeRef]>>,
    kinds: KindSet,
    visit_filters: HashMap<NodeKind, Predicate<DeclarationNode>>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        QueryBuilder::new()
    }
}

impl QueryBuilder {
    /// Every kind enabled, no filters.
    pub fn new() -> Self {
        QueryBuilder {
            name: None,
            visibility: None,
            generic_parameter: None,
            namespace: None,
            interfaces: None,
            annotations: None,
            kinds: KindSet::all(),
            visit_filters: HashMap::new(),
        }
    }

    pub fn with_name(self) -> StringCondition<Self> {
        StringCondition::new(move |p| QueryBuilder {
            name: Some(p),
            ..self
        })
    }

    /// Matched against the full dotted path of the enclosing namespace.
    pub fn with_namespace(self) -> StringCondition<Self> {
        StringCondition::new(move |p| QueryBuilder {
            namespace: Some(p),
            ..self
        })
    }

    pub fn with_visibility(self) -> VisibilityCondition<Self> {
        VisibilityCondition::new(move |p| QueryBuilder {
            visibility: Some(p),
            ..self
        })
    }

    /// Every type parameter of the declaration must match; declarations
    /// without type parameters never do.
    pub fn with_generic_parameter(self) -> GenericParameterCondition<Self> {
        GenericParameterCondition::new(move |p| QueryBuilder {
            generic_parameter: Some(p),
            ..self
        })
    }

    pub fn with_interface(self) -> TypeSetCondition<Self> {
        TypeSetCondition::new(move |p| QueryBuilder {
            interfaces: Some(p),
            ..self
        })
    }

    /// Only annotated declarations can match, whatever the type condition.
    pub fn with_annotation(self) -> TypeSetCondition<Self> {
        TypeSetCondition::new(move |p| QueryBuilder {
            annotations: Some(p),
            ..self
        })
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = NodeKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    /// Prune every `kind` subtree the filter rejects.
    pub fn visit_if(
        mut self,
        kind: NodeKind,
        filter: impl Fn(&DeclarationNode) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.visit_filters.insert(kind, Arc::new(filter));
        self
    }

    pub fn build(self) -> QuerySpec {
        QuerySpec {
            name: self.name,
            visibility: self.visibility,
            generic_parameter: self.generic_parameter,
            namespace: self.namespace,
            interfaces: self.interfaces,
            annotations: self.annotations,
            max_level: self.kinds.max_level(),
            kinds: self.kinds,
            visit_filters: self.visit_filters,
        }
    }
}

static NO_CONSTRAINTS: TypeParameterConstraints = TypeParameterConstraints {
    reference_type: false,
    value_type: false,
    parameterless_constructor: false,
    constraint_types: Vec::new(),
};

/// An immutable, ready-to-run query.
#[derive(Clone)]
pub struct QuerySpec {
    name: Option<Predicate<str>>,
    visibility: Option<Predicate<Accessibility>>,
    generic_parameter: Option<Predicate<TypeParameterConstraints>>,
    namespace: Option<Predicate<str>>,
    interfaces: Option<Predicate<[TypeRef]>>,
    annotations: Option<Predicate<[TypeRef]>>,
    kinds: KindSet,
    max_level: Option<Level>,
    visit_filters: HashMap<NodeKind, Predicate<DeclarationNode>>,
}

impl QuerySpec {
    pub fn kinds(&self) -> KindSet {
        self.kinds
    }

    /// Run against an in-memory tree.
    pub fn run(&self, root: &DeclarationNode) -> Vec<ResultEntity> {
        self.run_with(root, &TraversalOptions::default())
    }

    pub fn run_with(&self, root: &DeclarationNode, options: &TraversalOptions) -> Vec<ResultEntity> {
        traverse::traverse(self, root, options)
    }

    /// Load a tree from `provider`, run, and drop the tree before returning.
    pub fn execute(&self, provider: &dyn DeclarationProvider) -> Result<Vec<ResultEntity>, QueryError> {
        self.execute_with(provider, &TraversalOptions::default())
    }

    pub fn execute_with(
        &self,
        provider: &dyn DeclarationProvider,
        options: &TraversalOptions,
    ) -> Result<Vec<ResultEntity>, QueryError> {
        let root = provider.load()?;
        let results = self.run_with(&root, options);
        drop(root);
        Ok(results)
    }

    /// Whether the traversal may enter `node` at all.
    pub(crate) fn is_visitable(&self, node: &DeclarationNode) -> bool {
        if let Some(filter) = self.visit_filters.get(&node.kind) {
            if !filter(node) {
                return false;
            }
        }
        self.max_level.is_some_and(|max| node.kind.level() <= max)
    }

    /// Whether a visited `node` belongs in the results.
    pub(crate) fn includes(&self, node: &DeclarationNode, namespace: &str) -> bool {
        self.kinds.contains(node.kind)
            && self.name.as_ref().map_or(true, |p| p(node.name.as_str()))
            && self.visibility.as_ref().map_or(true, |p| p(&node.visibility))
            && self.generic_parameter_matches(node)
            && self.namespace.as_ref().map_or(true, |p| p(namespace))
            && self.interfaces.as_ref().map_or(true, |p| p(node.interfaces.as_slice()))
            && self
                .annotations
                .as_ref()
                .map_or(true, |p| !node.annotations.is_empty() && p(node.annotations.as_slice()))
    }

    fn generic_parameter_matches(&self, node: &DeclarationNode) -> bool {
        let Some(predicate) = &self.generic_parameter else {
            return true;
        };
        let mut parameters = node.type_parameters().peekable();
        if parameters.peek().is_none() {
            return false;
        }
        parameters.all(|tp| predicate(tp.constraints.as_ref().unwrap_or(&NO_CONSTRAINTS)))
    }
}
