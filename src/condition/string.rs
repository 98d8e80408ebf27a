use super::{accept_none, Predicate, Setter};
use crate::error::QueryError;
use regex::RegexBuilder;
use std::sync::Arc;

/// Builds a predicate over a string aspect (name, namespace path).
///
/// A missing value (`None`) or an empty `one_of` list matches nothing.
pub struct StringCondition<B> {
    set: Setter<str, B>,
}

impl<B> StringCondition<B> {
    pub fn new(set: impl FnOnce(Predicate<str>) -> B + 'static) -> Self {
        StringCondition { set: Box::new(set) }
    }

    pub fn equal_to<'a>(self, value: impl Into<Option<&'a str>>) -> B {
        match value.into() {
            Some(value) => {
                let value = value.to_string();
                (self.set)(Arc::new(move |s: &str| s == value))
            }
            None => (self.set)(accept_none()),
        }
    }

    /// Ordinal substring containment.
    pub fn like<'a>(self, value: impl Into<Option<&'a str>>) -> B {
        self.contains(value.into(), false)
    }

    /// Substring containment after lowercasing both sides.
    pub fn like_ignore_case<'a>(self, value: impl Into<Option<&'a str>>) -> B {
        self.contains(value.into(), true)
    }

    pub fn one_of<I, S>(self, values: I) -> B
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return (self.set)(accept_none());
        }
        (self.set)(Arc::new(move |s: &str| values.iter().any(|v| v == s)))
    }

    /// Unanchored regular-expression search.
    pub fn matches(self, pattern: &str, ignore_case: bool) -> Result<B, QueryError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|e| QueryError::invalid("pattern", format!("{pattern} ({e})")))?;
        Ok((self.set)(Arc::new(move |s: &str| regex.is_match(s))))
    }

    fn contains(self, value: Option<&str>, ignore_case: bool) -> B {
        let Some(value) = value else {
            return (self.set)(accept_none());
        };
        if ignore_case {
            let needle = value.to_lowercase();
            (self.set)(Arc::new(move |s: &str| s.to_lowercase().contains(&needle)))
        } else {
            let needle = value.to_string();
            (self.set)(Arc::new(move |s: &str| s.contains(&needle)))
        }
    }
}
