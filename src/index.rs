//! Index trait for pluggable search backends

use crate::distance::DistanceMetric;
use crate::error::Result;
use crate::vector::Vector;

/// A search index over string-keyed vectors of a fixed dimension.
///
/// Implementations own the vectors and rank them against a query. Ranking
/// is best-first under [`DistanceMetric::compare`], with equal scores ordered
/// by insertion. The `VectorStore` keeps metadata alongside and decides which
/// ids are candidates for a given search.
pub trait Index {
    /// Check that `vector` could be added under `id` without mutating anything.
    fn check_insert(&self, id: &str, vector: &Vector) -> Result<()>;

    /// Add a vector. Fails on a wrong dimension or an id already present.
    fn add(&mut self, id: String, vector: Vector) -> Result<()>;

    /// Remove the vector stored under `id`, returning it.
    fn remove(&mut self, id: &str) -> Result<Vector>;

    /// Retrieve a vector by id.
    fn get(&self, id: &str) -> Result<&Vector>;

    /// Search the `k` best matches for `query` among ids accepted by `candidate`.
    /// Returns `(id, score)` pairs, best first.
    fn search_where(
        &self,
        query: &[f32],
        k: usize,
        candidate: &dyn Fn(&str) -> bool,
    ) -> Result<Vec<(&str, f32)>>;

    /// Search the `k` best matches for `query` among all stored vectors.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(&str, f32)>> {
        self.search_where(query, k, &|_: &str| true)
    }

    /// All ids, in insertion order.
    fn ids(&self) -> Vec<&str>;

    /// Whether `id` is stored.
    fn contains(&self, id: &str) -> bool;

    /// The fixed vector dimension.
    fn dimension(&self) -> usize;

    /// The metric used by this index.
    fn metric(&self) -> DistanceMetric;

    /// The number of vectors in this index.
    fn len(&self) -> usize;

    /// Whether the index is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
