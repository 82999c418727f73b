//! Search requests and metadata filters

use crate::error::{Result, VectorDbError};
use crate::metadata::{Metadata, MetadataValue};
use crate::vector::Vector;
use std::collections::BTreeMap;

/// A condition a single metadata field must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value exactly.
    Equals(MetadataValue),
    /// Field equals any one of the values.
    AnyOf(Vec<MetadataValue>),
}

impl Condition {
    fn accepts(&self, value: &MetadataValue) -> bool {
        match self {
            Condition::Equals(expected) => value == expected,
            Condition::AnyOf(allowed) => allowed.iter().any(|a| a == value),
        }
    }
}

/// A conjunction of per-field conditions over record metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: BTreeMap<String, Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`. Replaces any earlier condition on `field`.
    pub fn equals(mut self, field: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.conditions
            .insert(field.into(), Condition::Equals(value.into()));
        self
    }

    /// Require `field` to equal one of `values`.
    pub fn any_of<V: Into<MetadataValue>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.conditions
            .insert(field.into(), Condition::AnyOf(values));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// True when every condition's field is present and accepted.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.conditions.iter().all(|(field, condition)| {
            metadata
                .get(field)
                .is_some_and(|value| condition.accepts(value))
        })
    }
}

/// An exact k-nearest-neighbor request.
#[derive(Debug, Clone)]
pub struct Query {
    vector: Vector,
    k: usize,
    filter: Option<Filter>,
}

impl Query {
    /// Build a query for a store of the given dimension.
    pub fn new(vector: impl Into<Vector>, k: usize, dimension: usize) -> Result<Self> {
        let vector = vector.into();
        if k == 0 {
            return Err(VectorDbError::InvalidQuery {
                reason: "k must be positive".to_string(),
            });
        }
        if vector.dimension() != dimension {
            return Err(VectorDbError::InvalidQuery {
                reason: format!(
                    "query has dimension {}, store expects {}",
                    vector.dimension(),
                    dimension
                ),
            });
        }
        Ok(Self {
            vector,
            k,
            filter: None,
        })
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Whether a record with this metadata is a candidate for the query.
    pub fn admits(&self, metadata: &Metadata) -> bool {
        self.filter.as_ref().map_or(true, |f| f.matches(metadata))
    }
}
