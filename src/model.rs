//! The declaration tree handed to the traversal engine by a provider.

use crate::error::QueryError;
use crate::type_name::TypeRef;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Namespace,
    Class,
    Struct,
    Enum,
    Interface,
    Method,
    Property,
    Field,
    Parameter,
    #[serde(alias = "typeparameter", rename = "type_parameter")]
    TypeParameter,
}

/// Traversal depth of a kind. Ordered from the root downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Namespace,
    NamedType,
    Member,
    Parameter,
}

impl NodeKind {
    pub const ALL: [NodeKind; 10] = [
        NodeKind::Namespace,
        NodeKind::Class,
        NodeKind::Struct,
        NodeKind::Enum,
        NodeKind::Interface,
        NodeKind::Method,
        NodeKind::Property,
        NodeKind::Field,
        NodeKind::Parameter,
        NodeKind::TypeParameter,
    ];

    pub fn level(self) -> Level {
        match self {
            NodeKind::Namespace => Level::Namespace,
            NodeKind::Class | NodeKind::Struct | NodeKind::Enum | NodeKind::Interface => {
                Level::NamedType
            }
            // Reachable as soon as the declaring type is. Method type
            // parameters are deeper; `KindSet::max_level` accounts for them.
            NodeKind::TypeParameter => Level::NamedType,
            NodeKind::Method | NodeKind::Property | NodeKind::Field => Level::Member,
            NodeKind::Parameter => Level::Parameter,
        }
    }

    pub fn is_named_type(self) -> bool {
        matches!(
            self,
            NodeKind::Class | NodeKind::Struct | NodeKind::Enum | NodeKind::Interface
        )
    }

    pub fn is_member(self) -> bool {
        matches!(self, NodeKind::Method | NodeKind::Property | NodeKind::Field)
    }

    pub(crate) fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl FromStr for NodeKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "namespace" => Ok(NodeKind::Namespace),
            "class" => Ok(NodeKind::Class),
            "struct" => Ok(NodeKind::Struct),
            "enum" => Ok(NodeKind::Enum),
            "interface" => Ok(NodeKind::Interface),
            "method" => Ok(NodeKind::Method),
            "property" => Ok(NodeKind::Property),
            "field" => Ok(NodeKind::Field),
            "parameter" => Ok(NodeKind::Parameter),
            "typeparameter" => Ok(NodeKind::TypeParameter),
            _ => Err(QueryError::invalid("kind", s)),
        }
    }
}

/// Visibility as the declaration tree records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    #[default]
    NotApplicable,
    Private,
    ProtectedAndInternal,
    Protected,
    Internal,
    ProtectedOrInternal,
    Public,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeParameterConstraints {
    pub reference_type: bool,
    pub value_type: bool,
    pub parameterless_constructor: bool,
    pub constraint_types: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarationNode {
    pub kind: NodeKind,
    pub name: String,
    #[serde(default)]
    pub visibility: Accessibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<TypeRef>,
    /// Every interface the declaration implements, directly or transitively.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,
    /// Base class, whose interfaces are inherited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<TypeParameterConstraints>,
    /// Compiler-only declaration, never reported.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DeclarationNode>,
}

impl DeclarationNode {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        DeclarationNode {
            kind,
            name: name.into(),
            visibility: Accessibility::NotApplicable,
            annotations: Vec::new(),
            interfaces: Vec::new(),
            base: None,
            constraints: None,
            synthetic: false,
            children: Vec::new(),
        }
    }

    /// The unnamed root every provider returns.
    pub fn global() -> Self {
        DeclarationNode::new(NodeKind::Namespace, "")
    }

    pub fn namespace(name: impl Into<String>) -> Self {
        DeclarationNode::new(NodeKind::Namespace, name)
    }

    pub fn type_parameter(name: impl Into<String>, constraints: TypeParameterConstraints) -> Self {
        let mut node = DeclarationNode::new(NodeKind::TypeParameter, name);
        node.constraints = Some(constraints);
        node
    }

    pub fn with_visibility(mut self, visibility: Accessibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_annotation(mut self, annotation: TypeRef) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_interface(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_child(mut self, child: DeclarationNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DeclarationNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    /// Synthetic, or named like `<Module>` / `<global namespace>`.
    pub fn is_special(&self) -> bool {
        self.synthetic || (self.name.len() > 1 && self.name.starts_with('<') && self.name.ends_with('>'))
    }

    pub fn type_parameters(&self) -> impl Iterator<Item = &DeclarationNode> {
        self.children
            .iter()
            .filter(|c| c.kind == NodeKind::TypeParameter)
    }

    /// Name as it appears in a qualified name: `Repo<T, U>` for generics.
    pub fn display_name(&self) -> String {
        let params: Vec<&str> = self.type_parameters().map(|p| p.name.as_str()).collect();
        if params.is_empty() {
            self.name.clone()
        } else {
            format!("{}<{}>", self.name, params.join(", "))
        }
    }
}
