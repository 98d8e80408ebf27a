use super::{accept_none, collect_values, FilterValue, Predicate, Setter};
use crate::error::QueryError;
use crate::model::Accessibility;
use std::str::FromStr;
use std::sync::Arc;

/// Member visibility as callers spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberVisibility {
    Private,
    PrivateProtected,
    Protected,
    Internal,
    ProtectedInternal,
    Public,
}

impl MemberVisibility {
    pub const ALL: [MemberVisibility; 6] = [
        MemberVisibility::Private,
        MemberVisibility::PrivateProtected,
        MemberVisibility::Protected,
        MemberVisibility::Internal,
        MemberVisibility::ProtectedInternal,
        MemberVisibility::Public,
    ];

    /// The tree's native representation.
    pub fn accessibility(self) -> Accessibility {
        match self {
            MemberVisibility::Private => Accessibility::Private,
            MemberVisibility::PrivateProtected => Accessibility::ProtectedAndInternal,
            MemberVisibility::Protected => Accessibility::Protected,
            MemberVisibility::Internal => Accessibility::Internal,
            MemberVisibility::ProtectedInternal => Accessibility::ProtectedOrInternal,
            MemberVisibility::Public => Accessibility::Public,
        }
    }
}

impl FromStr for MemberVisibility {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "private" => Ok(MemberVisibility::Private),
            "privateprotected" => Ok(MemberVisibility::PrivateProtected),
            "protected" => Ok(MemberVisibility::Protected),
            "internal" => Ok(MemberVisibility::Internal),
            "protectedinternal" => Ok(MemberVisibility::ProtectedInternal),
            "public" => Ok(MemberVisibility::Public),
            _ => Err(QueryError::invalid("visibility", s)),
        }
    }
}

impl FilterValue<MemberVisibility> for MemberVisibility {
    fn into_filter_value(self) -> Result<MemberVisibility, QueryError> {
        Ok(self)
    }
}

impl FilterValue<MemberVisibility> for &str {
    fn into_filter_value(self) -> Result<MemberVisibility, QueryError> {
        self.parse()
    }
}

impl FilterValue<MemberVisibility> for i32 {
    fn into_filter_value(self) -> Result<MemberVisibility, QueryError> {
        usize::try_from(self)
            .ok()
            .and_then(|i| MemberVisibility::ALL.get(i).copied())
            .ok_or_else(|| QueryError::invalid("visibility", self))
    }
}

/// Builds a predicate over a declaration's native visibility.
pub struct VisibilityCondition<B> {
    set: Setter<Accessibility, B>,
}

impl<B> VisibilityCondition<B> {
    pub fn new(set: impl FnOnce(Predicate<Accessibility>) -> B + 'static) -> Self {
        VisibilityCondition { set: Box::new(set) }
    }

    pub fn equal_to(self, value: impl FilterValue<MemberVisibility>) -> Result<B, QueryError> {
        let expected = value.into_filter_value()?.accessibility();
        Ok((self.set)(Arc::new(move |a: &Accessibility| *a == expected)))
    }

    pub fn one_of<I>(self, values: I) -> Result<B, QueryError>
    where
        I: IntoIterator,
        I::Item: FilterValue<MemberVisibility>,
    {
        let expected: Vec<Accessibility> = collect_values(values)?
            .into_iter()
            .map(MemberVisibility::accessibility)
            .collect();
        if expected.is_empty() {
            return Ok((self.set)(accept_none()));
        }
        Ok((self.set)(Arc::new(move |a: &Accessibility| expected.contains(a))))
    }
}
