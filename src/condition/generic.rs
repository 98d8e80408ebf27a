use super::type_set::{TypeListCondition, TypeSetCondition};
use super::{accept_none, collect_values, FilterValue, Predicate, Setter};
use crate::error::QueryError;
use crate::model::TypeParameterConstraints;
use crate::type_name::{TypeIdentity, TypeRef};
use std::str::FromStr;
use std::sync::Arc;

/// Constraint kinds a type parameter can carry besides constraint types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericConstraint {
    ReferenceType,
    ValueType,
    ParameterlessConstructor,
}

impl GenericConstraint {
    pub const ALL: [GenericConstraint; 3] = [
        GenericConstraint::ReferenceType,
        GenericConstraint::ValueType,
        GenericConstraint::ParameterlessConstructor,
    ];

    pub fn is_satisfied_by(self, constraints: &TypeParameterConstraints) -> bool {
        match self {
            GenericConstraint::ReferenceType => constraints.reference_type,
            GenericConstraint::ValueType => constraints.value_type,
            GenericConstraint::ParameterlessConstructor => constraints.parameterless_constructor,
        }
    }
}

impl FromStr for GenericConstraint {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "reference_type" | "reference" | "class" => Ok(GenericConstraint::ReferenceType),
            "value_type" | "value" | "struct" => Ok(GenericConstraint::ValueType),
            "parameterless_constructor" | "new" | "default" => {
                Ok(GenericConstraint::ParameterlessConstructor)
            }
            _ => Err(QueryError::invalid("generic constraint", s)),
        }
    }
}

impl FilterValue<GenericConstraint> for GenericConstraint {
    fn into_filter_value(self) -> Result<GenericConstraint, QueryError> {
        Ok(self)
    }
}

impl FilterValue<GenericConstraint> for &str {
    fn into_filter_value(self) -> Result<GenericConstraint, QueryError> {
        self.parse()
    }
}

impl FilterValue<GenericConstraint> for i32 {
    fn into_filter_value(self) -> Result<GenericConstraint, QueryError> {
        usize::try_from(self)
            .ok()
            .and_then(|i| GenericConstraint::ALL.get(i).copied())
            .ok_or_else(|| QueryError::invalid("generic constraint", self))
    }
}

/// Builds a predicate over one type parameter: an optional constraint-kind
/// test AND a test over its constraint types.
pub struct GenericParameterCondition<B> {
    set: Setter<TypeParameterConstraints, B>,
}

impl<B: 'static> GenericParameterCondition<B> {
    pub fn new(set: impl FnOnce(Predicate<TypeParameterConstraints>) -> B + 'static) -> Self {
        GenericParameterCondition { set: Box::new(set) }
    }

    pub fn with_constraint(self) -> ConstraintCondition<B> {
        ConstraintCondition { set: self.set }
    }

    pub fn any_type(self) -> B {
        constraint_types(self.set, None).any_type()
    }

    pub fn of_type<T: TypeIdentity>(self) -> B {
        constraint_types(self.set, None).of_type::<T>()
    }

    pub fn of_type_ref(self, ty: TypeRef) -> B {
        constraint_types(self.set, None).of_type_ref(ty)
    }

    pub fn of_type_name(self, name: &str) -> Result<B, QueryError> {
        constraint_types(self.set, None).of_type_name(name)
    }

    pub fn of_types(self) -> TypeListCondition<B> {
        constraint_types(self.set, None).of_types()
    }
}

/// Constraint-kind part; every terminal continues with the constraint types.
pub struct ConstraintCondition<B> {
    set: Setter<TypeParameterConstraints, B>,
}

impl<B: 'static> ConstraintCondition<B> {
    pub fn equal_to(
        self,
        value: impl FilterValue<GenericConstraint>,
    ) -> Result<TypeSetCondition<B>, QueryError> {
        let constraint = value.into_filter_value()?;
        Ok(constraint_types(
            self.set,
            Some(Arc::new(move |c: &TypeParameterConstraints| {
                constraint.is_satisfied_by(c)
            })),
        ))
    }

    pub fn one_of<I>(self, values: I) -> Result<TypeSetCondition<B>, QueryError>
    where
        I: IntoIterator,
        I::Item: FilterValue<GenericConstraint>,
    {
        self.list(collect_values(values)?, false)
    }

    pub fn all_of<I>(self, values: I) -> Result<TypeSetCondition<B>, QueryError>
    where
        I: IntoIterator,
        I::Item: FilterValue<GenericConstraint>,
    {
        self.list(collect_values(values)?, true)
    }

    fn list(
        self,
        wanted: Vec<GenericConstraint>,
        all: bool,
    ) -> Result<TypeSetCondition<B>, QueryError> {
        let check: Predicate<TypeParameterConstraints> = if wanted.is_empty() {
            accept_none()
        } else if all {
            Arc::new(move |c: &TypeParameterConstraints| {
                wanted.iter().all(|w| w.is_satisfied_by(c))
            })
        } else {
            Arc::new(move |c: &TypeParameterConstraints| {
                wanted.iter().any(|w| w.is_satisfied_by(c))
            })
        };
        Ok(constraint_types(self.set, Some(check)))
    }
}

fn constraint_types<B: 'static>(
    set: Setter<TypeParameterConstraints, B>,
    constraint: Option<Predicate<TypeParameterConstraints>>,
) -> TypeSetCondition<B> {
    TypeSetCondition::new(move |types: Predicate<[TypeRef]>| {
        set(Arc::new(move |c: &TypeParameterConstraints| {
            constraint.as_ref().map_or(true, |check| check(c)) && types(&c.constraint_types)
        }))
    })
}
