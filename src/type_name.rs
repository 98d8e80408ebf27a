//! Canonical identities for type references.
//!
//! A queried type and a declared type are only ever compared through
//! [`canonical_name`], so both sides normalize the same way.

use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A reference to a (possibly generic) type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeRef {
    /// Dotted namespace path, empty for the global namespace.
    pub namespace: String,
    /// Type name, qualifying names (`Outer.Inner`) preserved as written.
    pub name: String,
    pub args: Vec<TypeRef>,
}

/// Types that can name themselves as a [`TypeRef`].
///
/// Implemented by marker types so a query can say `of_type::<Disposable>()`.
pub trait TypeIdentity {
    fn type_ref() -> TypeRef;
}

impl TypeRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeRef {
            namespace: namespace.into(),
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = TypeRef>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Parse `Ns.Name<Arg, ...>`; `::` separators and tuple syntax are accepted.
    pub fn parse(text: &str) -> Result<TypeRef, QueryError> {
        let mut parser = TypeParser {
            chars: text.chars().collect(),
            pos: 0,
            source: text,
        };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != parser.chars.len() {
            return Err(parser.error());
        }
        Ok(ty)
    }
}

/// `Namespace.Name<Arg1, Arg2>`, without the argument clause at arity zero.
pub fn canonical_name(ty: &TypeRef) -> String {
    let mut out = String::new();
    write_canonical(ty, &mut out);
    out
}

fn write_canonical(ty: &TypeRef, out: &mut String) {
    if !ty.namespace.is_empty() {
        out.push_str(&ty.namespace);
        out.push('.');
    }
    out.push_str(&ty.name);
    if !ty.args.is_empty() {
        out.push('<');
        for (i, arg) in ty.args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            write_canonical(arg, out);
        }
        out.push('>');
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&canonical_name(self))
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        canonical_name(self) == canonical_name(other)
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        canonical_name(self).hash(state);
    }
}

impl TryFrom<String> for TypeRef {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypeRef::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        canonical_name(&value)
    }
}

struct TypeParser<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl TypeParser<'_> {
    fn error(&self) -> QueryError {
        QueryError::invalid("type", self.source)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef, QueryError> {
        self.skip_ws();
        if self.peek() == Some('(') {
            self.pos += 1;
            let args = self.parse_list(')')?;
            return Ok(TypeRef::new("", "Tuple").with_args(args));
        }

        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '<' | '>' | ',' | '(' | ')') {
                break;
            }
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        let path = normalize_path(&raw);
        if path.is_empty() {
            return Err(self.error());
        }

        let args = if self.peek() == Some('<') {
            self.pos += 1;
            self.parse_list('>')?
        } else {
            Vec::new()
        };

        let (namespace, name) = match path.rfind('.') {
            Some(idx) => (path[..idx].to_string(), path[idx + 1..].to_string()),
            None => (String::new(), path),
        };
        if name.is_empty() {
            return Err(self.error());
        }
        Ok(TypeRef { namespace, name, args })
    }

    fn parse_list(&mut self, close: char) -> Result<Vec<TypeRef>, QueryError> {
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(close) {
            self.pos += 1;
            return Ok(items);
        }
        loop {
            items.push(self.parse_type()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == close => {
                    self.pos += 1;
                    return Ok(items);
                }
                _ => return Err(self.error()),
            }
        }
    }
}

fn normalize_path(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .replace("::", ".")
        .split('.')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_without_arguments() {
        let ty = TypeRef::new("System", "IDisposable");
        assert_eq!(canonical_name(&ty), "System.IDisposable");
    }

    #[test]
    fn canonical_name_global_namespace() {
        assert_eq!(canonical_name(&TypeRef::new("", "Widget")), "Widget");
    }

    #[test]
    fn canonical_name_with_nested_arguments() {
        let ty = TypeRef::new("System.Collections.Generic", "IDictionary").with_args([
            TypeRef::new("System", "String"),
            TypeRef::new("System.Collections.Generic", "List")
                .with_args([TypeRef::new("System", "Int32")]),
        ]);
        assert_eq!(
            canonical_name(&ty),
            "System.Collections.Generic.IDictionary<System.String, System.Collections.Generic.List<System.Int32>>"
        );
    }

    #[test]
    fn parse_normalizes_whitespace_and_rust_paths() {
        let ty = TypeRef::parse("std::collections::HashMap< String ,Vec<u8> >").unwrap();
        assert_eq!(ty.namespace, "std.collections");
        assert_eq!(ty.name, "HashMap");
        assert_eq!(ty.arity(), 2);
        assert_eq!(ty.to_string(), "std.collections.HashMap<String, Vec<u8>>");
    }

    #[test]
    fn parse_trims_whitespace_around_separators() {
        let plain = TypeRef::parse("System.String").unwrap();
        assert_eq!(TypeRef::parse("System. String").unwrap(), plain);
        assert_eq!(TypeRef::parse("System .String").unwrap(), plain);
        assert_eq!(TypeRef::parse("System. String").unwrap().name, "String");

        let display = TypeRef::parse("std:: fmt ::Display").unwrap();
        assert_eq!(display.namespace, "std.fmt");
        assert_eq!(display.to_string(), "std.fmt.Display");
        assert!(TypeRef::parse("Ns. ").is_err());
    }

    #[test]
    fn parse_tuple_is_an_ordinary_generic() {
        let ty = TypeRef::parse("(i32, String)").unwrap();
        assert_eq!(ty.to_string(), "Tuple<i32, String>");
        assert_eq!(ty, TypeRef::new("", "Tuple").with_args([
            TypeRef::new("", "i32"),
            TypeRef::new("", "String"),
        ]));
    }

    #[test]
    fn equality_ignores_how_the_path_was_split() {
        let split = TypeRef::new("Outer", "Inner");
        let verbatim = TypeRef::new("", "Outer.Inner");
        assert_eq!(split, verbatim);
    }

    #[test]
    fn different_arguments_are_different_types() {
        let a = TypeRef::parse("Pair<i32, i32>").unwrap();
        let b = TypeRef::parse("Pair<i32, String>").unwrap();
        let c = TypeRef::parse("Pair<i32, i32, i32>").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn parse_rejects_unbalanced_input() {
        assert!(TypeRef::parse("Vec<u8").is_err());
        assert!(TypeRef::parse("Vec<u8>>").is_err());
        assert!(TypeRef::parse("").is_err());
        assert!(TypeRef::parse("Ns.").is_err());
    }

    #[test]
    fn serde_uses_the_canonical_string() {
        let ty = TypeRef::parse("Shop.IRepository<Shop.Order>").unwrap();
        let json = serde_json::to_string(&ty).unwrap();
        assert_eq!(json, "\"Shop.IRepository<Shop.Order>\"");
        let back: TypeRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ty);
    }
}
