//! Rust items as declarations.
//!
//! Structs, enums and traits become named types; `impl` blocks hand their
//! methods (and, for trait impls, the trait) to the type they implement, as
//! long as that type is declared in the same module. Attributes become
//! annotations and derived traits count as implemented interfaces.

use super::type_ref;
use crate::model::{Accessibility, DeclarationNode, NodeKind, TypeParameterConstraints};
use crate::parser::text;
use crate::type_name::TypeRef;
use tracing::trace;
use tree_sitter::Node;

pub(super) fn lower(root: Node, source: &str) -> Vec<DeclarationNode> {
    lower_items(root, source)
}

fn lower_items(list: Node, source: &str) -> Vec<DeclarationNode> {
    let mut decls = Vec::new();
    let mut impls = Vec::new();

    let mut cursor = list.walk();
    for child in list.named_children(&mut cursor) {
        match child.kind() {
            "mod_item" => {
                // `mod name;` is lowered from its own file.
                let Some(body) = child.child_by_field_name("body") else {
                    continue;
                };
                if let Some(name) = name_of(child, source) {
                    decls.push(
                        DeclarationNode::namespace(name).with_children(lower_items(body, source)),
                    );
                }
            }
            "struct_item" => decls.extend(lower_struct(child, source)),
            "enum_item" => decls.extend(lower_enum(child, source)),
            "trait_item" => decls.extend(lower_trait(child, source)),
            "function_item" => {
                decls.extend(lower_function(child, source, visibility(child, source)))
            }
            "const_item" | "static_item" => {
                decls.extend(lower_field(child, source, visibility(child, source)))
            }
            "impl_item" => impls.push(child),
            _ => {}
        }
    }

    for block in impls {
        attach_impl(&mut decls, block, source);
    }
    decls
}

fn name_of(node: Node, source: &str) -> Option<String> {
    node.child_by_field_name("name")
        .map(|n| text(n, source).to_string())
}

/// Name, visibility, attributes and type parameters shared by every item.
fn declared(kind: NodeKind, node: Node, source: &str) -> Option<DeclarationNode> {
    let name = name_of(node, source)?;
    let mut decl = DeclarationNode::new(kind, name).with_visibility(visibility(node, source));
    for attribute in attributes(node) {
        annotate(&mut decl, attribute, source);
    }
    decl.children.extend(type_parameters(node, source));
    Some(decl)
}

fn visibility(node: Node, source: &str) -> Accessibility {
    let mut cursor = node.walk();
    let modifier = node
        .children(&mut cursor)
        .find(|c| c.kind() == "visibility_modifier");
    match modifier.map(|m| text(m, source).replace(char::is_whitespace, "")) {
        None => Accessibility::Private,
        Some(vis) if vis == "pub" => Accessibility::Public,
        Some(vis) if vis == "pub(self)" => Accessibility::Private,
        Some(_) => Accessibility::Internal,
    }
}

/// `attribute_item` siblings directly above `node`, doc comments allowed in between.
fn attributes(node: Node) -> Vec<Node> {
    let mut found = Vec::new();
    let mut current = node.prev_named_sibling();
    while let Some(prev) = current {
        match prev.kind() {
            "attribute_item" => found.push(prev),
            "line_comment" | "block_comment" => {}
            _ => break,
        }
        current = prev.prev_named_sibling();
    }
    found.reverse();
    found
}

/// Record the attribute path as an annotation; derived traits also become interfaces.
fn annotate(decl: &mut DeclarationNode, attribute_item: Node, source: &str) {
    let Some(attribute) = attribute_item.named_child(0) else {
        return;
    };
    let Some(path) = attribute.named_child(0) else {
        return;
    };
    let Some(annotation) = type_ref(text(path, source)) else {
        return;
    };
    let is_derive = annotation.name == "derive" && annotation.namespace.is_empty();
    decl.annotations.push(annotation);

    if is_derive {
        if let Some(arguments) = attribute.child_by_field_name("arguments") {
            let list = text(arguments, source)
                .trim_start_matches('(')
                .trim_end_matches(')');
            for derived in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                if let Some(interface) = type_ref(derived) {
                    push_interface(decl, interface);
                }
            }
        }
    }
}

fn push_interface(decl: &mut DeclarationNode, interface: TypeRef) {
    if !decl.interfaces.contains(&interface) {
        decl.interfaces.push(interface);
    }
}

fn lower_struct(node: Node, source: &str) -> Option<DeclarationNode> {
    let mut decl = declared(NodeKind::Struct, node, source)?;
    if let Some(body) = node.child_by_field_name("body") {
        if body.kind() == "field_declaration_list" {
            let mut cursor = body.walk();
            for field in body.named_children(&mut cursor) {
                if field.kind() == "field_declaration" {
                    decl.children
                        .extend(lower_field(field, source, visibility(field, source)));
                }
            }
        }
    }
    Some(decl)
}

fn lower_enum(node: Node, source: &str) -> Option<DeclarationNode> {
    let mut decl = declared(NodeKind::Enum, node, source)?;
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for variant in body.named_children(&mut cursor) {
            if variant.kind() == "enum_variant" {
                decl.children
                    .extend(lower_field(variant, source, Accessibility::Public));
            }
        }
    }
    Some(decl)
}

fn lower_trait(node: Node, source: &str) -> Option<DeclarationNode> {
    let mut decl = declared(NodeKind::Interface, node, source)?;
    if let Some(bounds) = node.child_by_field_name("bounds") {
        for bound in bound_types(bounds, source) {
            push_interface(&mut decl, bound);
        }
    }
    if let Some(body) = node.child_by_field_name("body") {
        decl.children.extend(lower_members(body, source, Some(Accessibility::Public)));
    }
    Some(decl)
}

/// Functions and constants of a trait or impl body. `forced` overrides the
/// written visibility.
fn lower_members(body: Node, source: &str, forced: Option<Accessibility>) -> Vec<DeclarationNode> {
    let mut members = Vec::new();
    let mut cursor = body.walk();
    for item in body.named_children(&mut cursor) {
        let vis = forced.unwrap_or_else(|| visibility(item, source));
        match item.kind() {
            "function_item" | "function_signature_item" => {
                members.extend(lower_function(item, source, vis))
            }
            "const_item" => members.extend(lower_field(item, source, vis)),
            _ => {}
        }
    }
    members
}

fn lower_field(node: Node, source: &str, vis: Accessibility) -> Option<DeclarationNode> {
    let mut field = declared(NodeKind::Field, node, source)?;
    field.visibility = vis;
    Some(field)
}

fn lower_function(node: Node, source: &str, vis: Accessibility) -> Option<DeclarationNode> {
    let mut method = declared(NodeKind::Method, node, source)?;
    method.visibility = vis;
    if let Some(parameters) = node.child_by_field_name("parameters") {
        let mut cursor = parameters.walk();
        for parameter in parameters.named_children(&mut cursor) {
            if parameter.kind() != "parameter" {
                continue;
            }
            if let Some(pattern) = parameter.child_by_field_name("pattern") {
                method.children.push(DeclarationNode::new(
                    NodeKind::Parameter,
                    text(pattern, source).trim_start_matches("mut "),
                ));
            }
        }
    }
    Some(method)
}

/// `impl X` adds methods to `X`; `impl T for X` also makes `X` implement `T`.
fn attach_impl(decls: &mut [DeclarationNode], block: Node, source: &str) {
    let Some(self_type) = block
        .child_by_field_name("type")
        .and_then(|t| base_type_name(t, source))
    else {
        return;
    };
    let Some(target) = decls
        .iter_mut()
        .rev()
        .find(|d| d.kind.is_named_type() && d.name == self_type)
    else {
        trace!(self_type = %self_type, "impl for a type declared elsewhere");
        return;
    };

    let implemented = block
        .child_by_field_name("trait")
        .and_then(|t| type_ref(text(t, source)));
    // Trait methods are as visible as the trait itself.
    let forced = implemented.as_ref().map(|_| Accessibility::Public);
    if let Some(body) = block.child_by_field_name("body") {
        target.children.extend(lower_members(body, source, forced));
    }
    if let Some(interface) = implemented {
        push_interface(target, interface);
    }
}

fn base_type_name(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "type_identifier" => Some(text(node, source).to_string()),
        "generic_type" => node
            .child_by_field_name("type")
            .and_then(|t| base_type_name(t, source)),
        "scoped_type_identifier" => node
            .child_by_field_name("name")
            .map(|n| text(n, source).to_string()),
        _ => None,
    }
}

/// Named type parameters with their inline and `where` bounds. Lifetimes and
/// const generics are skipped.
fn type_parameters(node: Node, source: &str) -> Vec<DeclarationNode> {
    let mut params: Vec<(String, Vec<TypeRef>)> = Vec::new();
    if let Some(list) = node.child_by_field_name("type_parameters") {
        let mut cursor = list.walk();
        for param in list.named_children(&mut cursor) {
            if let Some(entry) = type_parameter(param, source) {
                params.push(entry);
            }
        }
    }
    if params.is_empty() {
        return Vec::new();
    }

    let mut cursor = node.walk();
    let clauses: Vec<Node> = node
        .children(&mut cursor)
        .filter(|c| c.kind() == "where_clause")
        .collect();
    for clause in clauses {
        let mut cursor = clause.walk();
        for predicate in clause.named_children(&mut cursor) {
            let (Some(left), Some(bounds)) = (
                predicate.child_by_field_name("left"),
                predicate.child_by_field_name("bounds"),
            ) else {
                continue;
            };
            let left = text(left, source);
            if let Some((_, bound_list)) = params.iter_mut().find(|(name, _)| name == left) {
                bound_list.extend(bound_types(bounds, source));
            }
        }
    }

    params
        .into_iter()
        .map(|(name, bounds)| DeclarationNode::type_parameter(name, constraints(bounds)))
        .collect()
}

fn type_parameter(param: Node, source: &str) -> Option<(String, Vec<TypeRef>)> {
    match param.kind() {
        "type_identifier" => Some((text(param, source).to_string(), Vec::new())),
        "constrained_type_parameter" => {
            let name = param.child_by_field_name("left")?;
            let bounds = param
                .child_by_field_name("bounds")
                .map(|b| bound_types(b, source))
                .unwrap_or_default();
            Some((text(name, source).to_string(), bounds))
        }
        "optional_type_parameter" => type_parameter(param.child_by_field_name("name")?, source),
        "type_parameter" => {
            let name = param.child_by_field_name("name")?;
            let bounds = param
                .child_by_field_name("bounds")
                .map(|b| bound_types(b, source))
                .unwrap_or_default();
            Some((text(name, source).to_string(), bounds))
        }
        _ => None,
    }
}

fn bound_types(bounds: Node, source: &str) -> Vec<TypeRef> {
    let mut types = Vec::new();
    let mut cursor = bounds.walk();
    for bound in bounds.named_children(&mut cursor) {
        let bound = match bound.kind() {
            "lifetime" | "removed_trait_bound" => continue,
            "higher_ranked_trait_bound" => match bound.child_by_field_name("type") {
                Some(inner) => inner,
                None => continue,
            },
            _ => bound,
        };
        types.extend(type_ref(text(bound, source)));
    }
    types
}

fn constraints(bounds: Vec<TypeRef>) -> TypeParameterConstraints {
    let has = |name: &str| bounds.iter().any(|b| b.name == name && b.arity() == 0);
    let value_type = has("Copy");
    let parameterless_constructor = has("Default");
    TypeParameterConstraints {
        reference_type: false,
        value_type,
        parameterless_constructor,
        constraint_types: bounds,
    }
}
