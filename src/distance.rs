//! Similarity and distance metrics

use crate::error::{Result, VectorDbError};
use crate::vector::{check_finite, l2_norm};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Metrics used to score a stored vector against a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine similarity, in [-1, 1]
    #[default]
    Cosine,
    /// Euclidean (L2) distance, >= 0
    Euclidean,
}

/// Which direction of a score is the better match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOrder {
    HigherIsBetter,
    LowerIsBetter,
}

impl DistanceMetric {
    /// Score `candidate` against `query` using this metric.
    pub fn score(&self, query: &[f32], candidate: &[f32]) -> Result<f32> {
        match self {
            DistanceMetric::Cosine => cosine_similarity(query, candidate),
            DistanceMetric::Euclidean => euclidean_distance(query, candidate),
        }
    }

    /// Cosine scores are similarities, Euclidean scores are distances.
    pub fn order(&self) -> ScoreOrder {
        match self {
            DistanceMetric::Cosine => ScoreOrder::HigherIsBetter,
            DistanceMetric::Euclidean => ScoreOrder::LowerIsBetter,
        }
    }

    /// Order two scores best-first.
    pub fn compare(&self, a: f32, b: f32) -> Ordering {
        match self.order() {
            ScoreOrder::HigherIsBetter => b.total_cmp(&a),
            ScoreOrder::LowerIsBetter => a.total_cmp(&b),
        }
    }

    /// Whether a zero vector can be scored at all under this metric.
    pub fn accepts_zero_vectors(&self) -> bool {
        !matches!(self, DistanceMetric::Cosine)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = VectorDbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            other => Err(VectorDbError::InvalidConfig {
                reason: format!("unknown metric: {}", other),
            }),
        }
    }
}

fn check_dimensions(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(VectorDbError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}

/// Compute cosine similarity between two vectors.
///
/// Undefined (and an error) when either vector has zero norm or a
/// non-finite component.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dimensions(a, b)?;
    check_finite(a, "vector")?;
    check_finite(b, "vector")?;

    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(VectorDbError::DegenerateVector {
            reason: "cosine similarity is undefined for a zero vector".to_string(),
        });
    }

    let similarity = dot(a, b) / norm_a / norm_b;

    // Clamp to [-1, 1] to handle floating point errors
    Ok(similarity.clamp(-1.0, 1.0) as f32)
}

/// Compute Euclidean (L2) distance between two vectors
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dimensions(a, b)?;
    check_finite(a, "vector")?;
    check_finite(b, "vector")?;
    Ok(a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (f64::from(x) - f64::from(y)).powi(2))
        .sum::<f64>()
        .sqrt() as f32)
}

/// Compute dot product of two vectors. Lengths are not checked.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    dot(a, b) as f32
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum()
}
