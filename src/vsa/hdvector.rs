//! Core HD vector type and the FFT-free operations on it.
//!
//! An [`HdVector`] is a dense real vector of dimension D (default 1000),
//! unit-norm under the Euclidean norm. Vectors are immutable once built;
//! every operation returns a new vector.

use std::fmt;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VsaError};

/// Norms below this are treated as zero (nothing to normalise).
const ZERO_NORM: f64 = 1e-12;

/// A single holographic vector.
#[derive(Clone, Serialize, Deserialize)]
pub struct HdVector {
    data: Array1<f64>,
}

impl HdVector {
    /// Create a zero vector. Not unit-norm; only useful as an accumulator seed.
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: Array1::zeros(dim),
        }
    }

    /// Wrap raw values without normalising them.
    pub fn from_vec(data: Vec<f64>) -> Self {
        Self {
            data: Array1::from_vec(data),
        }
    }

    /// Wrap raw values and L2-normalise them.
    pub fn normalized(data: Vec<f64>) -> Self {
        Self::from_array(Array1::from_vec(data))
    }

    pub(crate) fn from_array(data: Array1<f64>) -> Self {
        let norm = data.dot(&data).sqrt();
        if norm < ZERO_NORM {
            return Self { data };
        }
        Self { data: data / norm }
    }

    /// Vector dimension D.
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    /// Iterate over the coordinates.
    pub fn iter(&self) -> impl Iterator<Item = &f64> + '_ {
        self.data.iter()
    }

    /// Copy the coordinates out.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.to_vec()
    }

    /// Coordinate at position i.
    pub fn get(&self, i: usize) -> Option<f64> {
        self.data.get(i).copied()
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.data.dot(&self.data).sqrt()
    }

    /// Dot product with another vector of the same dimension.
    pub fn dot(&self, other: &HdVector) -> Result<f64> {
        VsaError::check_dim(self.dim(), other.dim())?;
        Ok(self.data.dot(&other.data))
    }

    /// Cosine similarity in [-1, 1]. Zero vectors have similarity 0.
    ///
    /// `dot / sqrt(|a|² · |b|²)` rather than `dot / (|a| · |b|)` so that
    /// `a.similarity(&a)` is exactly 1.
    pub fn similarity(&self, other: &HdVector) -> Result<f64> {
        let ab = self.dot(other)?;
        let aa = self.data.dot(&self.data);
        let bb = other.data.dot(&other.data);
        let scale = (aa * bb).sqrt();
        if scale < ZERO_NORM {
            return Ok(0.0);
        }
        Ok((ab / scale).clamp(-1.0, 1.0))
    }

    /// Cyclic rotation of the coordinates by `n` places (`np.roll` semantics).
    ///
    /// `permute(0)` is the identity and `permute(-n)` undoes `permute(n)`.
    /// Rotation only changes spectral phase, so unitary vectors stay unitary.
    pub fn permute(&self, n: isize) -> HdVector {
        let dim = self.dim();
        if dim == 0 {
            return self.clone();
        }
        let shift = n.rem_euclid(dim as isize) as usize;
        let data = Array1::from_shape_fn(dim, |i| self.data[(i + dim - shift) % dim]);
        HdVector { data }
    }

    /// Whether the norm is 1 within `tol`.
    pub fn is_unit(&self, tol: f64) -> bool {
        (self.norm() - 1.0).abs() <= tol
    }

    pub(crate) fn array(&self) -> &Array1<f64> {
        &self.data
    }
}

impl fmt::Debug for HdVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HdVector(dim={}, norm={:.4})", self.dim(), self.norm())
    }
}

impl PartialEq for HdVector {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

/// Superposition: elementwise sum followed by renormalisation.
///
/// The bundle stays similar to each constituent, but that similarity falls
/// roughly as 1/√k as more vectors are added.
pub fn bundle(vectors: &[&HdVector]) -> Result<HdVector> {
    let first = vectors.first().ok_or(VsaError::EmptyBundle)?;
    let dim = first.dim();
    let mut acc = Array1::<f64>::zeros(dim);
    for v in vectors {
        VsaError::check_dim(dim, v.dim())?;
        acc += &v.data;
    }
    Ok(HdVector::from_array(acc))
}
