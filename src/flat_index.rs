//! Brute-force flat index: exact k-NN search in O(n·d)

use std::collections::HashMap;

use tracing::trace;

use crate::distance::DistanceMetric;
use crate::error::{Result, VectorDbError};
use crate::index::Index;
use crate::vector::{check_finite, l2_norm, Vector};

#[derive(Debug, Clone)]
struct Entry {
    vector: Vector,
    sequence: u64,
}

/// A flat (brute-force) index that scores every stored vector on each query.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    entries: HashMap<String, Entry>,
    dimension: usize,
    metric: DistanceMetric,
    next_sequence: u64,
}

impl FlatIndex {
    /// Create a new empty flat index for vectors of `dimension` components.
    pub fn new(dimension: usize, metric: DistanceMetric) -> Self {
        Self {
            entries: HashMap::new(),
            dimension,
            metric,
            next_sequence: 0,
        }
    }

    /// Insertion sequence assigned to `id`, if present.
    pub fn sequence_of(&self, id: &str) -> Option<u64> {
        self.entries.get(id).map(|e| e.sequence)
    }

    /// Iterate over `(id, vector)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vector)> {
        let mut ordered: Vec<(&String, &Entry)> = self.entries.iter().collect();
        ordered.sort_by_key(|(_, e)| e.sequence);
        ordered
            .into_iter()
            .map(|(id, e)| (id.as_str(), &e.vector))
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        if actual != self.dimension {
            return Err(VectorDbError::DimensionMismatch {
                expected: self.dimension,
                actual,
            });
        }
        Ok(())
    }

    fn check_scorable(&self, v: &[f32], what: &str) -> Result<()> {
        if !self.metric.accepts_zero_vectors() && l2_norm(v) == 0.0 {
            return Err(VectorDbError::DegenerateVector {
                reason: format!("zero {} cannot be scored with {} metric", what, self.metric),
            });
        }
        Ok(())
    }
}

impl Index for FlatIndex {
    fn check_insert(&self, id: &str, vector: &Vector) -> Result<()> {
        self.check_dimension(vector.dimension())?;
        if self.entries.contains_key(id) {
            return Err(VectorDbError::DuplicateId { id: id.to_string() });
        }
        check_finite(vector.as_slice(), "vector")?;
        self.check_scorable(vector.as_slice(), "vector")
    }

    fn add(&mut self, id: String, vector: Vector) -> Result<()> {
        self.check_insert(&id, &vector)?;
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.insert(id, Entry { vector, sequence });
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<Vector> {
        self.entries
            .remove(id)
            .map(|e| e.vector)
            .ok_or_else(|| VectorDbError::KeyNotFound { id: id.to_string() })
    }

    fn get(&self, id: &str) -> Result<&Vector> {
        self.entries
            .get(id)
            .map(|e| &e.vector)
            .ok_or_else(|| VectorDbError::KeyNotFound { id: id.to_string() })
    }

    fn search_where(
        &self,
        query: &[f32],
        k: usize,
        candidate: &dyn Fn(&str) -> bool,
    ) -> Result<Vec<(&str, f32)>> {
        if k == 0 {
            return Err(VectorDbError::InvalidK { k });
        }
        self.check_dimension(query.len())?;
        if let Some(bad) = query.iter().find(|x| !x.is_finite()) {
            return Err(VectorDbError::InvalidQuery {
                reason: format!("query has non-finite component {}", bad),
            });
        }
        self.check_scorable(query, "query")?;

        let mut scored: Vec<(&str, u64, f32)> = self
            .entries
            .iter()
            .filter(|(id, _)| candidate(id.as_str()))
            .map(|(id, entry)| {
                let score = self.metric.score(query, entry.vector.as_slice())?;
                Ok((id.as_str(), entry.sequence, score))
            })
            .collect::<Result<Vec<_>>>()?;

        trace!(candidates = scored.len(), k, "scored flat index");

        scored.sort_by(|a, b| self.metric.compare(a.2, b.2).then(a.1.cmp(&b.1)));
        scored.truncate(k);
        Ok(scored
            .into_iter()
            .map(|(id, _, score)| (id, score))
            .collect())
    }

    fn ids(&self) -> Vec<&str> {
        self.iter().map(|(id, _)| id).collect()
    }

    fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn metric(&self) -> DistanceMetric {
        self.metric
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
