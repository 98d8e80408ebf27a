use super::{accept_all, accept_none, Predicate, Setter};
use crate::error::QueryError;
use crate::type_name::{canonical_name, TypeIdentity, TypeRef};
use std::collections::HashSet;
use std::sync::Arc;

/// Builds a predicate over a set of declared types (annotations, interfaces,
/// constraint types).
pub struct TypeSetCondition<B> {
    set: Setter<[TypeRef], B>,
}

impl<B> TypeSetCondition<B> {
    pub fn new(set: impl FnOnce(Predicate<[TypeRef]>) -> B + 'static) -> Self {
        TypeSetCondition { set: Box::new(set) }
    }

    pub fn any_type(self) -> B {
        (self.set)(accept_all())
    }

    /// The declared set contains `T`.
    pub fn of_type<T: TypeIdentity>(self) -> B {
        self.of_type_ref(T::type_ref())
    }

    pub fn of_type_ref(self, ty: TypeRef) -> B {
        let wanted = canonical_name(&ty);
        (self.set)(Arc::new(move |declared: &[TypeRef]| {
            declared.iter().any(|d| canonical_name(d) == wanted)
        }))
    }

    pub fn of_type_name(self, name: &str) -> Result<B, QueryError> {
        Ok(self.of_type_ref(TypeRef::parse(name)?))
    }

    pub fn of_types(self) -> TypeListCondition<B> {
        TypeListCondition { set: self.set }
    }
}

/// `one_of` / `all_of` over several types.
pub struct TypeListCondition<B> {
    set: Setter<[TypeRef], B>,
}

impl<B> TypeListCondition<B> {
    /// The declared set shares at least one type with `types`.
    pub fn one_of(self, types: impl IntoIterator<Item = TypeRef>) -> B {
        self.build(types, false)
    }

    /// The declared set contains every type in `types`.
    pub fn all_of(self, types: impl IntoIterator<Item = TypeRef>) -> B {
        self.build(types, true)
    }

    fn build(self, types: impl IntoIterator<Item = TypeRef>, all: bool) -> B {
        let wanted: Vec<String> = types.into_iter().map(|t| canonical_name(&t)).collect();
        if wanted.is_empty() {
            return (self.set)(accept_none());
        }
        (self.set)(Arc::new(move |declared: &[TypeRef]| {
            let declared: HashSet<String> = declared.iter().map(canonical_name).collect();
            if all {
                wanted.iter().all(|w| declared.contains(w))
            } else {
                wanted.iter().any(|w| declared.contains(w))
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Disposable;

    impl TypeIdentity for Disposable {
        fn type_ref() -> TypeRef {
            TypeRef::new("System", "IDisposable")
        }
    }

    fn condition() -> TypeSetCondition<Predicate<[TypeRef]>> {
        TypeSetCondition::new(|p| p)
    }

    fn types(names: &[&str]) -> Vec<TypeRef> {
        names.iter().map(|n| TypeRef::parse(n).unwrap()).collect()
    }

    #[test]
    fn any_type_accepts_empty_sets() {
        let p = condition().any_type();
        assert!(p(&[]));
        assert!(p(&types(&["A"])));
    }

    #[test]
    fn of_type() {
        let p = condition().of_type::<Disposable>();
        assert!(p(&types(&["System.IDisposable"])));
        assert!(p(&types(&["System.ICloneable", "System.IDisposable"])));
        assert!(!p(&types(&["IDisposable"])));
        assert!(!p(&[]));
    }

    #[test]
    fn of_type_with_generic_arguments() {
        let p = condition().of_type_name("System.Collections.Generic.IEnumerable<System.String>").unwrap();
        assert!(p(&types(&["System.Collections.Generic.IEnumerable< System.String >"])));
        assert!(!p(&types(&["System.Collections.Generic.IEnumerable<System.Int32>"])));
        assert!(!p(&types(&["System.Collections.Generic.IEnumerable"])));
    }

    #[test]
    fn of_type_with_tuples() {
        let p = condition().of_type_name("(i32, String)").unwrap();
        assert!(p(&types(&["Tuple<i32, String>"])));
        assert!(!p(&types(&["(i32, i32)"])));
        assert!(!p(&types(&["(i32, String, i32)"])));
    }

    #[test]
    fn of_type_name_rejects_malformed_names() {
        assert!(condition().of_type_name("List<").is_err());
    }

    #[test]
    fn one_of() {
        let p = condition().of_types().one_of(types(&["A", "B"]));
        assert!(p(&types(&["B", "C"])));
        assert!(!p(&types(&["C"])));
        assert!(!p(&[]));
    }

    #[test]
    fn all_of_accepts_strict_supersets() {
        let p = condition().of_types().all_of(types(&["X", "Y"]));
        assert!(p(&types(&["X", "Y"])));
        assert!(p(&types(&["W", "Y", "X", "Z"])));
        assert!(!p(&types(&["X"])));
    }

    #[test]
    fn empty_lists_reject_everything() {
        let p = condition().of_types().one_of(Vec::new());
        assert!(!p(&types(&["A"])));
        assert!(!p(&[]));
        let p = condition().of_types().all_of(Vec::new());
        assert!(!p(&types(&["A"])));
        assert!(!p(&[]));
    }
}
