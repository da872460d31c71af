//! Predicates over [`Quote`] documents and the per-field builder that turns a
//! [`FieldFilter`] into zero or more of them.
//!
//! A document that lacks the target field never satisfies an equality, range
//! or tag-set predicate.

use crate::errors::{QuoteError, Result};
use crate::model::{Field, FieldRef, Quote};
use crate::query::{Bounds, FieldFilter, Scalar, SearchOptions, TagMatch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every document.
    Everything,
    Equals { field: Field, value: Scalar },
    Exists(Field),
    Not(Box<Predicate>),
    AtLeast { field: Field, bound: i64 },
    AtMost { field: Field, bound: i64 },
    ContainsAll { field: Field, values: Vec<String> },
    ContainsAny { field: Field, values: Vec<String> },
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn matches(&self, doc: &Quote) -> bool {
        match self {
            Predicate::Everything => true,
            Predicate::Equals { field, value } => match (doc.field(*field), value) {
                (Some(FieldRef::Str(s)), Scalar::Text(v)) => s == v,
                (Some(FieldRef::Int(i)), Scalar::Int(v)) => i == *v,
                _ => false,
            },
            Predicate::Exists(field) => doc.field(*field).is_some(),
            Predicate::Not(inner) => !inner.matches(doc),
            Predicate::AtLeast { field, bound } => {
                matches!(doc.field(*field), Some(FieldRef::Int(i)) if i >= *bound)
            }
            Predicate::AtMost { field, bound } => {
                matches!(doc.field(*field), Some(FieldRef::Int(i)) if i <= *bound)
            }
            Predicate::ContainsAll { field, values } => match doc.field(*field) {
                Some(FieldRef::List(tags)) => values.iter().all(|v| tags.contains(v)),
                _ => false,
            },
            Predicate::ContainsAny { field, values } => match doc.field(*field) {
                Some(FieldRef::List(tags)) => values.iter().any(|v| tags.contains(v)),
                _ => false,
            },
            Predicate::And(parts) => parts.iter().all(|p| p.matches(doc)),
        }
    }
}

pub fn equals(field: Field, value: Scalar) -> Predicate {
    Predicate::Equals { field, value }
}

pub fn exists(field: Field) -> Predicate {
    Predicate::Exists(field)
}

pub fn absent(field: Field) -> Predicate {
    Predicate::Not(Box::new(exists(field)))
}

pub fn presence(field: Field, present: bool) -> Predicate {
    if present {
        exists(field)
    } else {
        absent(field)
    }
}

/// One predicate per provided bound. Under `zero_bound_as_unset` a bound of
/// zero is dropped, so `(0, 0)` produces nothing.
pub fn range(field: Field, bounds: &Bounds, opts: &SearchOptions) -> Vec<Predicate> {
    let provided = |b: Option<i64>| b.filter(|v| !(opts.zero_bound_as_unset && *v == 0));
    let mut out = Vec::with_capacity(2);
    if let Some(bound) = provided(bounds.min) {
        out.push(Predicate::AtLeast { field, bound });
    }
    if let Some(bound) = provided(bounds.max) {
        out.push(Predicate::AtMost { field, bound });
    }
    out
}

pub fn contains_all(field: Field, values: Vec<String>) -> Predicate {
    Predicate::ContainsAll { field, values }
}

pub fn contains_any(field: Field, values: Vec<String>) -> Predicate {
    Predicate::ContainsAny { field, values }
}

/// Folds predicates with AND, starting from [`Predicate::Everything`].
pub fn conjunction(preds: Vec<Predicate>) -> Predicate {
    preds
        .into_iter()
        .fold(Predicate::Everything, |acc, p| match (acc, p) {
            (Predicate::Everything, p) => p,
            (acc, Predicate::Everything) => acc,
            (Predicate::And(mut parts), p) => {
                parts.push(p);
                Predicate::And(parts)
            }
            (acc, p) => Predicate::And(vec![acc, p]),
        })
}

/// Translates the filter supplied for `field` into predicates.
///
/// Only the shapes that make sense for the field are accepted; anything else
/// is a caller bug and reported as [`QuoteError::MalformedFilter`].
pub fn field_predicates(
    field: Field,
    filter: &FieldFilter,
    opts: &SearchOptions,
) -> Result<Vec<Predicate>> {
    let malformed = |reason: String| QuoteError::MalformedFilter {
        field: field.as_str(),
        reason,
    };
    match (field, filter) {
        (_, FieldFilter::Unset) => Ok(vec![]),
        (Field::Author | Field::Title | Field::LikeCount, FieldFilter::Presence(flag)) => {
            Ok(vec![presence(field, *flag)])
        }
        (Field::Author | Field::Title, FieldFilter::Equals(value)) => match value {
            Scalar::Text(_) => Ok(vec![equals(field, value.clone())]),
            Scalar::Int(i) => Err(malformed(format!("expected a string, got integer {i}"))),
        },
        (Field::LikeCount, FieldFilter::Range(bounds)) => Ok(range(field, bounds, opts)),
        (Field::Tags, FieldFilter::SetMatch { mode, values }) => Ok(vec![match mode {
            TagMatch::All => contains_all(field, values.clone()),
            TagMatch::Any => contains_any(field, values.clone()),
        }]),
        (_, other) => Err(malformed(format!(
            "{} filters are not supported on this field",
            other.kind()
        ))),
    }
}
