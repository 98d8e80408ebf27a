//! TypeScript declarations.

use super::type_ref;
use crate::model::{Accessibility, DeclarationNode, NodeKind, TypeParameterConstraints};
use crate::parser::text;
use crate::type_name::TypeRef;
use tree_sitter::Node;

pub(super) fn lower(root: Node, source: &str) -> Vec<DeclarationNode> {
    lower_statements(root, source)
}

fn lower_statements(block: Node, source: &str) -> Vec<DeclarationNode> {
    let mut decls = Vec::new();
    let mut cursor = block.walk();
    for statement in block.named_children(&mut cursor) {
        lower_statement(statement, source, false, Vec::new(), &mut decls);
    }
    decls
}

/// `exported` and `decorators` come from an enclosing `export` statement.
fn lower_statement(
    node: Node,
    source: &str,
    exported: bool,
    decorators: Vec<TypeRef>,
    out: &mut Vec<DeclarationNode>,
) {
    let visibility = if exported {
        Accessibility::Public
    } else {
        Accessibility::Internal
    };
    match node.kind() {
        "export_statement" => {
            let decorators = decorators_of(node, source);
            if let Some(declaration) = node.child_by_field_name("declaration") {
                lower_statement(declaration, source, true, decorators, out);
            }
        }
        "ambient_declaration" => {
            let mut cursor = node.walk();
            for inner in node.named_children(&mut cursor) {
                lower_statement(inner, source, exported, Vec::new(), out);
            }
        }
        "expression_statement" => {
            if let Some(inner) = node.named_child(0) {
                if matches!(inner.kind(), "internal_module" | "module") {
                    lower_statement(inner, source, exported, Vec::new(), out);
                }
            }
        }
        "internal_module" | "module" => out.extend(lower_namespace(node, source)),
        "class_declaration" | "abstract_class_declaration" => {
            out.extend(lower_class(node, source, visibility, decorators))
        }
        "interface_declaration" => out.extend(lower_interface(node, source, visibility)),
        "enum_declaration" => out.extend(lower_enum(node, source, visibility)),
        "function_declaration" | "generator_function_declaration" | "function_signature" => {
            out.extend(lower_method(node, source, visibility))
        }
        _ => {}
    }
}

/// `namespace A.B { }` nests `B` inside `A`.
fn lower_namespace(node: Node, source: &str) -> Option<DeclarationNode> {
    let name = text(node.child_by_field_name("name")?, source)
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    let children = node
        .child_by_field_name("body")
        .map(|body| lower_statements(body, source))
        .unwrap_or_default();

    let mut segments = name.rsplit('.').map(str::trim);
    let innermost = segments.next()?;
    let mut namespace = DeclarationNode::namespace(innermost).with_children(children);
    for segment in segments {
        namespace = DeclarationNode::namespace(segment).with_child(namespace);
    }
    Some(namespace)
}

fn decorator_ref(decorator: Node, source: &str) -> Option<TypeRef> {
    let expression = decorator.named_child(0)?;
    let target = match expression.kind() {
        "call_expression" => expression.child_by_field_name("function")?,
        _ => expression,
    };
    type_ref(text(target, source))
}

fn decorators_of(node: Node, source: &str) -> Vec<TypeRef> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|c| c.kind() == "decorator")
        .filter_map(|d| decorator_ref(d, source))
        .collect()
}

fn lower_class(
    node: Node,
    source: &str,
    visibility: Accessibility,
    mut decorators: Vec<TypeRef>,
) -> Option<DeclarationNode> {
    let name = text(node.child_by_field_name("name")?, source);
    decorators.extend(decorators_of(node, source));
    let mut class = DeclarationNode::new(NodeKind::Class, name).with_visibility(visibility);
    class.annotations = decorators;
    class.children.extend(type_parameters(node, source));

    let mut cursor = node.walk();
    let heritage = node
        .children(&mut cursor)
        .find(|c| c.kind() == "class_heritage");
    if let Some(heritage) = heritage {
        let mut cursor = heritage.walk();
        for clause in heritage.named_children(&mut cursor) {
            match clause.kind() {
                "implements_clause" => class.interfaces.extend(type_list(clause, source)),
                "extends_clause" => {
                    class.base = clause
                        .child_by_field_name("value")
                        .and_then(|base| type_ref(text(base, source)));
                }
                _ => {}
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut pending: Vec<TypeRef> = Vec::new();
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if member.kind() == "decorator" {
                pending.extend(decorator_ref(member, source));
                continue;
            }
            let annotations = std::mem::take(&mut pending);
            if let Some(lowered) = lower_class_member(member, source, annotations) {
                let duplicate_accessor = lowered.kind == NodeKind::Property
                    && class
                        .children
                        .iter()
                        .any(|c| c.kind == NodeKind::Property && c.name == lowered.name);
                if !duplicate_accessor {
                    class.children.push(lowered);
                }
            }
        }
    }
    Some(class)
}

fn lower_class_member(
    member: Node,
    source: &str,
    mut annotations: Vec<TypeRef>,
) -> Option<DeclarationNode> {
    let kind = match member.kind() {
        "method_definition" | "method_signature" | "abstract_method_signature" => {
            if is_accessor(member) {
                NodeKind::Property
            } else {
                NodeKind::Method
            }
        }
        "public_field_definition" => NodeKind::Field,
        _ => return None,
    };
    let name_node = member.child_by_field_name("name")?;
    annotations.extend(decorators_of(member, source));

    let visibility = if name_node.kind() == "private_property_identifier" {
        Accessibility::Private
    } else {
        member_visibility(member, source)
    };
    let mut decl = DeclarationNode::new(kind, text(name_node, source)).with_visibility(visibility);
    decl.annotations = annotations;
    if kind == NodeKind::Method {
        decl.children.extend(type_parameters(member, source));
        decl.children.extend(parameters(member, source));
    }
    Some(decl)
}

fn is_accessor(member: Node) -> bool {
    let mut cursor = member.walk();
    let found = member
        .children(&mut cursor)
        .any(|c| matches!(c.kind(), "get" | "set"));
    found
}

fn member_visibility(member: Node, source: &str) -> Accessibility {
    let mut cursor = member.walk();
    let modifier = member
        .children(&mut cursor)
        .find(|c| c.kind() == "accessibility_modifier");
    match modifier.map(|m| text(m, source)) {
        Some("private") => Accessibility::Private,
        Some("protected") => Accessibility::Protected,
        _ => Accessibility::Public,
    }
}

fn lower_interface(node: Node, source: &str, visibility: Accessibility) -> Option<DeclarationNode> {
    let name = text(node.child_by_field_name("name")?, source);
    let mut interface = DeclarationNode::new(NodeKind::Interface, name).with_visibility(visibility);
    interface.children.extend(type_parameters(node, source));

    let mut cursor = node.walk();
    let extends = node
        .children(&mut cursor)
        .find(|c| c.kind() == "extends_type_clause");
    if let Some(extends) = extends {
        interface.interfaces.extend(type_list(extends, source));
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            let kind = match member.kind() {
                "method_signature" => NodeKind::Method,
                "property_signature" => NodeKind::Property,
                _ => continue,
            };
            let Some(name) = member.child_by_field_name("name") else {
                continue;
            };
            let mut decl = DeclarationNode::new(kind, text(name, source))
                .with_visibility(Accessibility::Public);
            if kind == NodeKind::Method {
                decl.children.extend(type_parameters(member, source));
                decl.children.extend(parameters(member, source));
            }
            interface.children.push(decl);
        }
    }
    Some(interface)
}

fn lower_enum(node: Node, source: &str, visibility: Accessibility) -> Option<DeclarationNode> {
    let name = text(node.child_by_field_name("name")?, source);
    let mut decl = DeclarationNode::new(NodeKind::Enum, name).with_visibility(visibility);
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            let name_node = match member.kind() {
                "enum_assignment" => member.child_by_field_name("name"),
                "property_identifier" | "string" => Some(member),
                _ => None,
            };
            if let Some(name_node) = name_node {
                let name = text(name_node, source).trim_matches(|c| c == '"' || c == '\'');
                decl.children.push(
                    DeclarationNode::new(NodeKind::Field, name)
                        .with_visibility(Accessibility::Public),
                );
            }
        }
    }
    Some(decl)
}

fn lower_method(node: Node, source: &str, visibility: Accessibility) -> Option<DeclarationNode> {
    let name = text(node.child_by_field_name("name")?, source);
    let mut method = DeclarationNode::new(NodeKind::Method, name).with_visibility(visibility);
    method.children.extend(type_parameters(node, source));
    method.children.extend(parameters(node, source));
    Some(method)
}

fn parameters(node: Node, source: &str) -> Vec<DeclarationNode> {
    let Some(list) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|p| matches!(p.kind(), "required_parameter" | "optional_parameter"))
        .filter_map(|p| p.child_by_field_name("pattern"))
        .filter(|pattern| pattern.kind() != "this")
        .map(|pattern| {
            DeclarationNode::new(
                NodeKind::Parameter,
                text(pattern, source).trim_start_matches("..."),
            )
        })
        .collect()
}

/// Types named by an `implements` or interface `extends` clause.
fn type_list(clause: Node, source: &str) -> Vec<TypeRef> {
    let mut cursor = clause.walk();
    clause
        .named_children(&mut cursor)
        .filter_map(|ty| type_ref(text(ty, source)))
        .collect()
}

fn type_parameters(node: Node, source: &str) -> Vec<DeclarationNode> {
    let Some(list) = node.child_by_field_name("type_parameters") else {
        return Vec::new();
    };
    let mut params = Vec::new();
    let mut cursor = list.walk();
    for param in list.named_children(&mut cursor) {
        if param.kind() != "type_parameter" {
            continue;
        }
        let Some(name) = param.child_by_field_name("name") else {
            continue;
        };
        let mut constraints = TypeParameterConstraints::default();
        if let Some(constraint) = param
            .child_by_field_name("constraint")
            .and_then(|c| c.named_child(0))
        {
            constrain(constraint, source, &mut constraints);
        }
        params.push(DeclarationNode::type_parameter(text(name, source), constraints));
    }
    params
}

fn constrain(ty: Node, source: &str, constraints: &mut TypeParameterConstraints) {
    match ty.kind() {
        "predefined_type" => match text(ty, source) {
            "object" => constraints.reference_type = true,
            "number" | "string" | "boolean" | "bigint" | "symbol" => constraints.value_type = true,
            _ => {}
        },
        "constructor_type" => constraints.parameterless_constructor = true,
        "union_type" | "intersection_type" | "parenthesized_type" => {
            let mut cursor = ty.walk();
            for part in ty.named_children(&mut cursor) {
                constrain(part, source, constraints);
            }
        }
        _ => constraints.constraint_types.extend(type_ref(text(ty, source))),
    }
}
