//! In-memory vector storage

use crate::config::StoreConfig;
use crate::distance::DistanceMetric;
use crate::error::{Result, VectorDbError};
use crate::flat_index::FlatIndex;
use crate::hash::content_hash;
use crate::index::Index;
use crate::metadata::Metadata;
use crate::query::{Filter, Query};
use crate::vector::Vector;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A search result containing the id, its score, and its metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub score: f32,
    pub metadata: Metadata,
}

/// A full stored record, as returned by `get` and `delete`
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub vector: Vector,
    pub metadata: Metadata,
}

/// In-memory vector storage with a pluggable search index.
///
/// The index and the metadata table always hold exactly the same ids.
#[derive(Debug, Clone)]
pub struct VectorStore<I: Index = FlatIndex> {
    index: I,
    /// Metadata keyed by id
    metadata: HashMap<String, Metadata>,
    config: StoreConfig,
}

impl VectorStore<FlatIndex> {
    /// Create a new vector store with a brute-force flat index.
    pub fn new(dimension: usize, metric: DistanceMetric) -> Result<Self> {
        Self::with_config(StoreConfig::new(dimension, metric))
    }

    /// Create a new vector store from a full configuration.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(VectorStore {
            index: FlatIndex::new(config.dimension, config.metric),
            metadata: HashMap::new(),
            config,
        })
    }
}

impl<I: Index> VectorStore<I> {
    /// Create a new vector store around an empty index.
    pub fn with_index(index: I, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        if index.dimension() != config.dimension || index.metric() != config.metric {
            return Err(VectorDbError::InvalidConfig {
                reason: format!(
                    "index is {}-d {}, config asks for {}-d {}",
                    index.dimension(),
                    index.metric(),
                    config.dimension,
                    config.metric
                ),
            });
        }
        if !index.is_empty() {
            return Err(VectorDbError::InvalidConfig {
                reason: "index must be empty".to_string(),
            });
        }
        Ok(Self {
            index,
            metadata: HashMap::new(),
            config,
        })
    }

    /// Add a vector with metadata.
    ///
    /// Nothing is modified if the vector is rejected.
    pub fn add(
        &mut self,
        id: impl Into<String>,
        vector: impl Into<Vector>,
        metadata: Metadata,
    ) -> Result<()> {
        let id = id.into();
        self.index.add(id.clone(), vector.into())?;
        debug!(id = %id, fields = metadata.len(), "added vector");
        self.metadata.insert(id, metadata);
        Ok(())
    }

    /// Add a vector with empty metadata
    pub fn insert(&mut self, id: impl Into<String>, vector: impl Into<Vector>) -> Result<()> {
        self.add(id, vector, Metadata::new())
    }

    /// Add many vectors at once. Either every element is added or none is.
    ///
    /// `metadatas` of `None` gives every record empty metadata.
    pub fn add_batch<S, V>(
        &mut self,
        ids: Vec<S>,
        vectors: Vec<V>,
        metadatas: Option<Vec<Metadata>>,
    ) -> Result<()>
    where
        S: Into<String>,
        V: Into<Vector>,
    {
        let metadata_count = metadatas.as_ref().map_or(ids.len(), Vec::len);
        if ids.len() != vectors.len() || ids.len() != metadata_count {
            return Err(VectorDbError::BatchLengthMismatch {
                ids: ids.len(),
                vectors: vectors.len(),
                metadatas: metadata_count,
            });
        }

        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let vectors: Vec<Vector> = vectors.into_iter().map(Into::into).collect();
        let metadatas = metadatas.unwrap_or_else(|| vec![Metadata::new(); ids.len()]);

        let mut seen = HashSet::with_capacity(ids.len());
        for (id, vector) in ids.iter().zip(&vectors) {
            self.index.check_insert(id, vector)?;
            if !seen.insert(id.as_str()) {
                return Err(VectorDbError::DuplicateId { id: id.clone() });
            }
        }

        let count = ids.len();
        for ((id, vector), metadata) in ids.into_iter().zip(vectors).zip(metadatas) {
            self.index.add(id.clone(), vector)?;
            self.metadata.insert(id, metadata);
        }
        debug!(count, "added batch");
        Ok(())
    }

    /// Delete a record by id, returning it
    pub fn delete(&mut self, id: &str) -> Result<Record> {
        match (self.index.contains(id), self.metadata.contains_key(id)) {
            (true, true) => {}
            (false, false) => {
                return Err(VectorDbError::KeyNotFound { id: id.to_string() });
            }
            _ => {
                return Err(VectorDbError::Internal(format!(
                    "index and metadata disagree about {}",
                    id
                )));
            }
        }

        let vector = self.index.remove(id)?;
        let metadata = self.metadata.remove(id).unwrap_or_default();
        debug!(id = %id, "deleted vector");
        Ok(Record {
            id: id.to_string(),
            vector,
            metadata,
        })
    }

    /// Get a copy of the record stored under `id`
    pub fn get(&self, id: &str) -> Result<Record> {
        let vector = self.index.get(id)?.clone();
        Ok(Record {
            id: id.to_string(),
            vector,
            metadata: self.metadata_of(id)?.clone(),
        })
    }

    /// Metadata stored under `id`
    pub fn metadata_of(&self, id: &str) -> Result<&Metadata> {
        self.metadata
            .get(id)
            .ok_or_else(|| VectorDbError::KeyNotFound { id: id.to_string() })
    }

    /// Search for the k best matches of `query_vector`.
    ///
    /// With a filter, only records whose metadata matches it are ranked, so up
    /// to `k` matching records come back even when better non-matching ones exist.
    pub fn search(
        &self,
        query_vector: &[f32],
        k: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<SearchResult>> {
        if query_vector.len() != self.dimension() {
            return Err(VectorDbError::DimensionMismatch {
                expected: self.dimension(),
                actual: query_vector.len(),
            });
        }
        let mut query = Query::new(query_vector, k, self.dimension())?;
        if let Some(filter) = filter {
            query = query.with_filter(filter.clone());
        }
        self.search_query(&query)
    }

    /// Run a prebuilt query.
    pub fn search_query(&self, query: &Query) -> Result<Vec<SearchResult>> {
        let hits = match query.filter() {
            Some(filter) if !filter.is_empty() => self.index.search_where(
                query.vector().as_slice(),
                query.k(),
                &|id: &str| self.admits(id, query),
            )?,
            _ => self.index.search(query.vector().as_slice(), query.k())?,
        };
        debug!(k = query.k(), hits = hits.len(), "search");
        Ok(self.to_results(hits))
    }

    /// The k nearest records to an already stored record, excluding itself.
    pub fn neighbors(
        &self,
        id: &str,
        k: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<SearchResult>> {
        let mut query = Query::new(self.index.get(id)?.clone(), k, self.dimension())?;
        if let Some(filter) = filter {
            query = query.with_filter(filter.clone());
        }
        let hits = self.index.search_where(
            query.vector().as_slice(),
            query.k(),
            &|candidate: &str| candidate != id && self.admits(candidate, &query),
        )?;
        Ok(self.to_results(hits))
    }

    /// Ids of stored vectors with the same content hash as `vector`.
    pub fn duplicates_of(&self, vector: &[f32]) -> Vec<&str> {
        let target = content_hash(vector);
        self.records()
            .filter(|(_, v, _)| content_hash(v.as_slice()) == target)
            .map(|(id, _, _)| id)
            .collect()
    }

    fn admits(&self, id: &str, query: &Query) -> bool {
        self.metadata
            .get(id)
            .is_some_and(|metadata| query.admits(metadata))
    }

    fn to_results(&self, hits: Vec<(&str, f32)>) -> Vec<SearchResult> {
        hits.into_iter()
            .map(|(id, score)| SearchResult {
                id: id.to_string(),
                score,
                metadata: self.metadata.get(id).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Iterate over `(id, vector, metadata)` in insertion order
    pub fn records(&self) -> impl Iterator<Item = (&str, &Vector, &Metadata)> + '_ {
        self.index.ids().into_iter().filter_map(move |id| {
            let vector = self.index.get(id).ok()?;
            let metadata = self.metadata.get(id)?;
            Some((id, vector, metadata))
        })
    }

    /// Get the number of vectors in the store
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// List all ids in insertion order
    pub fn ids(&self) -> Vec<&str> {
        self.index.ids()
    }

    /// Get the distance metric used by this store
    pub fn metric(&self) -> DistanceMetric {
        self.config.metric
    }

    /// Get the fixed vector dimension
    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get a reference to the underlying index.
    pub fn index(&self) -> &I {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_store() -> VectorStore {
        let mut store = VectorStore::new(3, DistanceMetric::Cosine).unwrap();
        store
            .add(
                "doc1",
                vec![1.0, 0.0, 0.0],
                Metadata::new().with("lang", "en").with("year", 2020),
            )
            .unwrap();
        store
            .add(
                "doc2",
                vec![0.9, 0.1, 0.0],
                Metadata::new().with("lang", "fr").with("year", 2021),
            )
            .unwrap();
        store
            .add(
                "doc3",
                vec![0.0, 1.0, 0.0],
                Metadata::new().with("lang", "en").with("year", 2021),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_zero_dimension_store() {
        assert!(matches!(
            VectorStore::new(0, DistanceMetric::Cosine),
            Err(VectorDbError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = VectorStore::new(3, DistanceMetric::Euclidean).unwrap();
        store.insert("v1", vec![1.0, 2.0, 3.0]).unwrap();

        assert_eq!(store.len(), 1);
        let record = store.get("v1").unwrap();
        assert_eq!(record.vector.as_slice(), &[1.0, 2.0, 3.0]);
        assert!(record.metadata.is_empty());
    }

    #[test]
    fn test_dimension_consistency() {
        let mut store = VectorStore::new(3, DistanceMetric::Euclidean).unwrap();
        let result = store.insert("v2", vec![1.0, 2.0]);
        assert!(matches!(result, Err(VectorDbError::DimensionMismatch { .. })));
        assert!(store.is_empty());
        assert!(store.metadata_of("v2").is_err());
    }

    #[test]
    fn test_duplicate_keeps_original_metadata() {
        let mut store = sample_store();
        let result = store.add("doc1", vec![0.0, 0.0, 1.0], Metadata::new().with("lang", "de"));
        assert!(matches!(result, Err(VectorDbError::DuplicateId { .. })));
        let record = store.get("doc1").unwrap();
        assert_eq!(record.vector.as_slice(), &[1.0, 0.0, 0.0]);
        assert_eq!(record.metadata.get("lang"), Some(&"en".into()));
    }

    #[test]
    fn test_delete() {
        let mut store = sample_store();
        let removed = store.delete("doc2").unwrap();
        assert_eq!(removed.id, "doc2");
        assert_eq!(removed.metadata.get("lang"), Some(&"fr".into()));
        assert_eq!(store.len(), 2);
        assert!(store.metadata_of("doc2").is_err());
        assert!(matches!(
            store.delete("doc2"),
            Err(VectorDbError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_search() {
        let store = sample_store();
        let results = store.search(&[1.0, 0.0, 0.0], 2, None).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "doc1");
        assert_relative_eq!(results[0].score, 1.0, epsilon = 1e-6);
        assert_eq!(results[0].metadata.get("year"), Some(&2020.into()));
        assert_eq!(results[1].id, "doc2");
    }

    #[test]
    fn test_search_validation() {
        let store = sample_store();
        assert!(matches!(
            store.search(&[1.0, 0.0], 1, None),
            Err(VectorDbError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(matches!(
            store.search(&[1.0, 0.0, 0.0], 0, None),
            Err(VectorDbError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_search_empty_store() {
        let store = VectorStore::new(3, DistanceMetric::Euclidean).unwrap();
        let results = store.search(&[1.0, 2.0, 3.0], 5, None).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_filter_is_applied_before_ranking() {
        let store = sample_store();
        let filter = Filter::new().equals("lang", "en");
        let results = store.search(&[1.0, 0.0, 0.0], 2, Some(&filter)).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        // doc2 is closer than doc3 but filtered out; doc3 still fills the second slot
        assert_eq!(ids, vec!["doc1", "doc3"]);
    }

    #[test]
    fn test_filter_never_pads() {
        let store = sample_store();
        let filter = Filter::new().equals("lang", "fr");
        let results = store.search(&[1.0, 0.0, 0.0], 3, Some(&filter)).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "doc2");

        let none = Filter::new().equals("lang", "jp");
        assert!(store.search(&[1.0, 0.0, 0.0], 3, Some(&none)).unwrap().is_empty());
    }

    #[test]
    fn test_add_batch() {
        let mut store = VectorStore::new(2, DistanceMetric::Euclidean).unwrap();
        store
            .add_batch(
                vec!["a", "b"],
                vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                Some(vec![Metadata::new().with("n", 1), Metadata::new()]),
            )
            .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.ids(), vec!["a", "b"]);
        assert_eq!(store.metadata_of("a").unwrap().get("n"), Some(&1.into()));

        store
            .add_batch(vec!["c"], vec![vec![2.0, 2.0]], None)
            .unwrap();
        assert!(store.metadata_of("c").unwrap().is_empty());
    }

    #[test]
    fn test_add_batch_is_all_or_nothing() {
        let mut store = VectorStore::new(2, DistanceMetric::Euclidean).unwrap();
        store.insert("existing", vec![0.0, 0.0]).unwrap();

        let bad_dimension = store.add_batch(
            vec!["a", "b", "c"],
            vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0], vec![0.0, 1.0]],
            None,
        );
        assert!(matches!(bad_dimension, Err(VectorDbError::DimensionMismatch { .. })));

        let clashes_with_store = store.add_batch(
            vec!["a", "existing"],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            None,
        );
        assert!(matches!(clashes_with_store, Err(VectorDbError::DuplicateId { .. })));

        let repeats_within_batch = store.add_batch(
            vec!["a", "a"],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            None,
        );
        assert!(matches!(repeats_within_batch, Err(VectorDbError::DuplicateId { .. })));

        assert_eq!(store.len(), 1);
        assert_eq!(store.ids(), vec!["existing"]);
    }

    #[test]
    fn test_add_batch_length_mismatch() {
        let mut store = VectorStore::new(2, DistanceMetric::Euclidean).unwrap();
        let result = store.add_batch(vec!["a", "b"], vec![vec![1.0, 0.0]], None);
        assert!(matches!(
            result,
            Err(VectorDbError::BatchLengthMismatch {
                ids: 2,
                vectors: 1,
                ..
            })
        ));
        let result = store.add_batch(
            vec!["a"],
            vec![vec![1.0, 0.0]],
            Some(vec![Metadata::new(), Metadata::new()]),
        );
        assert!(matches!(result, Err(VectorDbError::BatchLengthMismatch { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_neighbors_excludes_self() {
        let store = sample_store();
        let results = store.neighbors("doc1", 5, None).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["doc2", "doc3"]);

        let filter = Filter::new().equals("year", 2021).equals("lang", "en");
        let results = store.neighbors("doc1", 5, Some(&filter)).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "doc3");

        assert!(matches!(
            store.neighbors("missing", 1, None),
            Err(VectorDbError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicates_of() {
        let mut store = VectorStore::new(2, DistanceMetric::Euclidean).unwrap();
        store.insert("a", vec![0.25, 0.5]).unwrap();
        store.insert("b", vec![1.0, 1.0]).unwrap();
        store.insert("c", vec![0.25, 0.5]).unwrap();
        assert_eq!(store.duplicates_of(&[0.25, 0.5]), vec!["a", "c"]);
        assert!(store.duplicates_of(&[3.0, 3.0]).is_empty());
    }

    #[test]
    fn test_search_query_uses_query_filter() {
        let store = sample_store();
        let query = Query::new(vec![1.0, 0.0, 0.0], 3, 3)
            .unwrap()
            .with_filter(Filter::new().equals("year", 2021));
        let results = store.search_query(&query).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["doc2", "doc3"]);

        let unfiltered = Query::new(vec![1.0, 0.0, 0.0], 3, 3)
            .unwrap()
            .with_filter(Filter::new());
        assert_eq!(store.search_query(&unfiltered).unwrap().len(), 3);
    }

    #[test]
    fn test_self_match_at_extreme_magnitudes() {
        let mut store = VectorStore::new(2, DistanceMetric::Cosine).unwrap();
        store.insert("big", vec![1e20, 0.0]).unwrap();
        store.insert("tiny", vec![0.0, 1e-30]).unwrap();

        let results = store.search(&[1e20, 0.0], 1, None).unwrap();
        assert_eq!(results[0].id, "big");
        assert_relative_eq!(results[0].score, 1.0, epsilon = 1e-6);

        let results = store.search(&[0.0, 1e-30], 1, None).unwrap();
        assert_eq!(results[0].id, "tiny");
        assert_relative_eq!(results[0].score, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_non_finite_vectors_never_stored() {
        let mut store = VectorStore::new(2, DistanceMetric::Cosine).unwrap();
        store.insert("exact", vec![1.0, 0.0]).unwrap();
        assert!(matches!(
            store.insert("nan", vec![f32::NAN, 0.0]),
            Err(VectorDbError::DegenerateVector { .. })
        ));
        assert!(matches!(
            store.add_batch(vec!["ok", "inf"], vec![vec![0.0, 1.0], vec![f32::INFINITY, 0.0]], None),
            Err(VectorDbError::DegenerateVector { .. })
        ));
        assert_eq!(store.ids(), vec!["exact"]);

        let results = store.search(&[1.0, 0.0], 1, None).unwrap();
        assert_eq!(results[0].id, "exact");
        assert!(matches!(
            store.search(&[f32::NAN, 0.0], 1, None),
            Err(VectorDbError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_duplicates_of_large_magnitudes() {
        let mut store = VectorStore::new(1, DistanceMetric::Euclidean).unwrap();
        store.insert("a", vec![1e13]).unwrap();
        store.insert("b", vec![5e15]).unwrap();
        assert_eq!(store.duplicates_of(&[1e13]), vec!["a"]);
        assert_eq!(store.duplicates_of(&[5e15]), vec!["b"]);
        assert!(store.duplicates_of(&[1e14]).is_empty());
    }

    #[test]
    fn test_with_index_checks_shape() {
        let index = FlatIndex::new(4, DistanceMetric::Euclidean);
        let config = StoreConfig::new(3, DistanceMetric::Euclidean);
        assert!(matches!(
            VectorStore::with_index(index, config),
            Err(VectorDbError::InvalidConfig { .. })
        ));
    }
}
