//! Vector type and normalization

use crate::error::{Result, VectorDbError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A vector in n-dimensional space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    /// Create a new vector from a Vec<f32>
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Get the dimension of the vector
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Get the underlying data as a slice
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consume the vector and return its components
    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    /// Compute the L2 norm (magnitude) of the vector
    pub fn norm(&self) -> f32 {
        l2_norm(&self.data) as f32
    }

    /// True if every component is zero, i.e. the norm is zero
    pub fn is_zero(&self) -> bool {
        l2_norm(&self.data) == 0.0
    }

    /// Normalize the vector to unit length
    pub fn normalize(&mut self) -> Result<()> {
        let norm = checked_norm(&self.data)?;
        for x in &mut self.data {
            *x = (*x as f64 / norm) as f32;
        }
        Ok(())
    }

    /// Create a normalized copy of the vector
    pub fn normalized(&self) -> Result<Vector> {
        let mut v = self.clone();
        v.normalize()?;
        Ok(v)
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Vector::new(data)
    }
}

impl From<&[f32]> for Vector {
    fn from(data: &[f32]) -> Self {
        Vector::new(data.to_vec())
    }
}

impl AsRef<[f32]> for Vector {
    fn as_ref(&self) -> &[f32] {
        &self.data
    }
}

/// Parse a vector from a comma-separated string such as `"1.0, 2.0, 3.0"`.
impl FromStr for Vector {
    type Err = VectorDbError;

    fn from_str(s: &str) -> Result<Self> {
        let data = s
            .split(',')
            .map(|x| {
                x.trim()
                    .parse::<f32>()
                    .map_err(|_| VectorDbError::InvalidQuery {
                        reason: format!("invalid float: {:?}", x.trim()),
                    })
            })
            .collect::<Result<Vec<f32>>>()?;
        Ok(Vector::new(data))
    }
}

/// L2 norm accumulated in `f64`, so finite `f32` inputs neither overflow
/// nor underflow. Only an all-zero vector has norm 0.
pub(crate) fn l2_norm(v: &[f32]) -> f64 {
    v.iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt()
}

/// Reject vectors containing NaN or an infinity.
pub(crate) fn check_finite(v: &[f32], what: &str) -> Result<()> {
    match v.iter().position(|x| !x.is_finite()) {
        None => Ok(()),
        Some(i) => Err(VectorDbError::DegenerateVector {
            reason: format!("{} has non-finite component {} at index {}", what, v[i], i),
        }),
    }
}

fn checked_norm(v: &[f32]) -> Result<f64> {
    check_finite(v, "vector")?;
    let norm = l2_norm(v);
    if norm == 0.0 {
        return Err(VectorDbError::DegenerateVector {
            reason: "cannot normalize zero vector".to_string(),
        });
    }
    Ok(norm)
}

/// Return a unit-length copy of `v`.
///
/// Fails with [`VectorDbError::DegenerateVector`] when `v` has zero norm or
/// a non-finite component, since no direction can be recovered from it.
pub fn normalize(v: &[f32]) -> Result<Vec<f32>> {
    let norm = checked_norm(v)?;
    Ok(v.iter().map(|&x| (f64::from(x) / norm) as f32).collect())
}

/// Normalize every vector of a batch, stopping at the first degenerate one.
pub fn batch_normalize<V: AsRef<[f32]>>(vectors: &[V]) -> Result<Vec<Vec<f32>>> {
    vectors.iter().map(|v| normalize(v.as_ref())).collect()
}
