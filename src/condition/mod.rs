//! Composable predicate builders.
//!
//! Every builder is generic over the chain type `B` it hands back once a
//! terminal method (`equal_to`, `one_of`, ...) is called. The builder only
//! knows a single-argument callback that stores the finished predicate and
//! returns `B`; it never sees the facade itself. Passing `|p| p` as the
//! callback yields the bare predicate.

pub mod generic;
pub mod string;
pub mod type_set;
pub mod visibility;

use crate::error::QueryError;
use std::sync::Arc;

pub use generic::{ConstraintCondition, GenericConstraint, GenericParameterCondition};
pub use string::StringCondition;
pub use type_set::{TypeListCondition, TypeSetCondition};
pub use visibility::{MemberVisibility, VisibilityCondition};

/// A pure, total test over one aspect of a declaration.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Stores a finished predicate and returns the chain.
pub(crate) type Setter<T, B> = Box<dyn FnOnce(Predicate<T>) -> B>;

pub fn accept_all<T: ?Sized>() -> Predicate<T> {
    Arc::new(|_: &T| true)
}

/// What an explicitly empty selection turns into.
pub fn accept_none<T: ?Sized>() -> Predicate<T> {
    Arc::new(|_: &T| false)
}

/// A caller-supplied value that must be validated before it can be used in a
/// filter. Raw names and ordinals are checked here, at build time.
pub trait FilterValue<T> {
    fn into_filter_value(self) -> Result<T, QueryError>;
}

pub(crate) fn collect_values<T, I>(values: I) -> Result<Vec<T>, QueryError>
where
    I: IntoIterator,
    I::Item: FilterValue<T>,
{
    values
        .into_iter()
        .map(<I::Item as FilterValue<T>>::into_filter_value)
        .collect()
}
