//! Frequency-domain algebra: generation, binding, unbinding and powers.
//!
//! Binding is circular convolution computed through the FFT:
//! `bind(a, b) = ifft(fft(a) ⊙ fft(b))`. A vector is *unitary* when every
//! bin of its spectrum has magnitude 1; binding with a unitary vector is an
//! isometry and its inverse (phase negation) undoes it exactly.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::error::{Result, VsaError};
use crate::vsa::hdvector::{self, HdVector};

/// Spectrum bins with magnitude at or below this are forced to 1 + 0i.
const UNITARY_EPS: f64 = 1e-12;

/// Vector algebra for one fixed dimension.
///
/// Holds the cached forward and inverse FFT plans. Cheap to clone.
#[derive(Clone)]
pub struct Algebra {
    dim: usize,
    fft: Arc<dyn Fft<f64>>,
    ifft: Arc<dyn Fft<f64>>,
}

impl Algebra {
    /// Build the algebra for dimension `dim`.
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(VsaError::InvalidConfig(
                "vector dimension must be positive".into(),
            ));
        }
        let mut planner = FftPlanner::new();
        Ok(Self {
            dim,
            fft: planner.plan_fft_forward(dim),
            ifft: planner.plan_fft_inverse(dim),
        })
    }

    /// Dimension D shared by every vector this algebra produces.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Draw a fresh random unitary vector.
    ///
    /// D standard-normal samples, L2-normalised, then projected to unitary
    /// form so that repeated self-binding never changes the norm.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> HdVector {
        let samples: Vec<f64> = (0..self.dim).map(|_| rng.sample(StandardNormal)).collect();
        let v = HdVector::normalized(samples);
        let spectrum = self.unitary_spectrum(self.forward(&v));
        self.inverse_transform(spectrum)
    }

    /// Deterministic generation from a seed.
    pub fn generate_seeded(&self, seed: u64) -> HdVector {
        let mut rng = StdRng::seed_from_u64(seed);
        self.generate(&mut rng)
    }

    /// Project a vector onto the unitary manifold, keeping each bin's phase.
    pub fn make_unitary(&self, v: &HdVector) -> Result<HdVector> {
        self.check(v)?;
        let spectrum = self.unitary_spectrum(self.forward(v));
        Ok(self.inverse_transform(spectrum))
    }

    /// Whether every spectrum bin of `v` has magnitude 1 within `tol`.
    pub fn is_unitary(&self, v: &HdVector, tol: f64) -> Result<bool> {
        self.check(v)?;
        Ok(self
            .forward(v)
            .iter()
            .all(|c| (c.norm() - 1.0).abs() <= tol))
    }

    /// Circular convolution. Commutative and associative.
    pub fn bind(&self, a: &HdVector, b: &HdVector) -> Result<HdVector> {
        self.check(a)?;
        self.check(b)?;
        let fa = self.forward(a);
        let fb = self.forward(b);
        let product: Vec<Complex64> = fa.iter().zip(fb.iter()).map(|(x, y)| x * y).collect();
        Ok(self.inverse_transform(product))
    }

    /// Bind a sequence of vectors left to right.
    pub fn bind_all(&self, vectors: &[&HdVector]) -> Result<HdVector> {
        let (first, rest) = vectors.split_first().ok_or(VsaError::EmptyBundle)?;
        self.check(first)?;
        let mut spectrum = self.forward(first);
        for v in rest {
            self.check(v)?;
            for (acc, x) in spectrum.iter_mut().zip(self.forward(v)) {
                *acc *= x;
            }
        }
        Ok(self.inverse_transform(spectrum))
    }

    /// Approximate inverse under binding: the involution
    /// `[a0, a(D-1), ..., a1]`, whose spectrum is the conjugate of `a`'s.
    /// Exact for unitary vectors.
    pub fn inverse(&self, a: &HdVector) -> Result<HdVector> {
        self.check(a)?;
        let dim = self.dim;
        let data: Vec<f64> = (0..dim)
            .map(|i| a.array()[(dim - i) % dim])
            .collect();
        Ok(HdVector::from_vec(data))
    }

    /// Circular correlation: `bind(a, inverse(b))`.
    ///
    /// `unbind(bind(a, b), b) == a` when `b` is unitary.
    pub fn unbind(&self, a: &HdVector, b: &HdVector) -> Result<HdVector> {
        let b_inv = self.inverse(b)?;
        self.bind(a, &b_inv)
    }

    /// Self-binding exponentiation: every spectrum bin raised to the n-th power.
    ///
    /// `power(a, 1) == a`, `power(a, 0)` is the convolution identity and a
    /// negative exponent yields the inverse of the positive power. Meant for
    /// unitary vectors; powers of a unitary vector are unitary.
    pub fn power(&self, a: &HdVector, n: i32) -> Result<HdVector> {
        self.check(a)?;
        let spectrum: Vec<Complex64> = self
            .forward(a)
            .into_iter()
            .map(|c| {
                let (r, theta) = c.to_polar();
                Complex64::from_polar(r.powi(n), theta * n as f64)
            })
            .collect();
        Ok(self.inverse_transform(spectrum))
    }

    /// Cyclic permutation; see [`HdVector::permute`].
    pub fn permute(&self, a: &HdVector, n: isize) -> Result<HdVector> {
        self.check(a)?;
        Ok(a.permute(n))
    }

    /// Normalised superposition of vectors of this algebra's dimension.
    pub fn bundle(&self, vectors: &[&HdVector]) -> Result<HdVector> {
        for v in vectors {
            self.check(v)?;
        }
        hdvector::bundle(vectors)
    }

    /// Cosine similarity.
    pub fn similarity(&self, a: &HdVector, b: &HdVector) -> Result<f64> {
        self.check(a)?;
        a.similarity(b)
    }

    fn check(&self, v: &HdVector) -> Result<()> {
        VsaError::check_dim(self.dim, v.dim())
    }

    fn forward(&self, v: &HdVector) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = v.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        self.fft.process(&mut buffer);
        buffer
    }

    fn inverse_transform(&self, mut spectrum: Vec<Complex64>) -> HdVector {
        self.ifft.process(&mut spectrum);
        let scale = 1.0 / self.dim as f64;
        HdVector::from_vec(spectrum.iter().map(|c| c.re * scale).collect())
    }

    fn unitary_spectrum(&self, spectrum: Vec<Complex64>) -> Vec<Complex64> {
        spectrum
            .into_iter()
            .map(|c| {
                let r = c.norm();
                if r <= UNITARY_EPS {
                    Complex64::new(1.0, 0.0)
                } else {
                    c / r
                }
            })
            .collect()
    }
}

impl fmt::Debug for Algebra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Algebra").field("dim", &self.dim).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: usize = 512;

    fn algebra() -> Algebra {
        Algebra::new(D).unwrap()
    }

    #[test]
    fn test_zero_dim_rejected() {
        assert!(matches!(Algebra::new(0), Err(VsaError::InvalidConfig(_))));
    }

    #[test]
    fn test_generate_is_unit_and_unitary() {
        let alg = algebra();
        let v = alg.generate_seeded(7);
        assert_eq!(v.dim(), D);
        assert!(v.is_unit(1e-9), "norm = {}", v.norm());
        assert!(alg.is_unitary(&v, 1e-9).unwrap());
    }

    #[test]
    fn test_generate_seeded_reproducible() {
        let alg = algebra();
        assert_eq!(alg.generate_seeded(11), alg.generate_seeded(11));
        assert_ne!(alg.generate_seeded(11), alg.generate_seeded(12));
    }

    #[test]
    fn test_random_vectors_near_orthogonal() {
        let alg = algebra();
        let a = alg.generate_seeded(1);
        let b = alg.generate_seeded(2);
        let sim = a.similarity(&b).unwrap();
        assert!(sim.abs() < 0.2, "sim = {}", sim);
    }

    #[test]
    fn test_bind_unbind_inverse() {
        let alg = algebra();
        let a = alg.generate_seeded(3);
        let b = alg.generate_seeded(4);
        let bound = alg.bind(&a, &b).unwrap();
        let recovered = alg.unbind(&bound, &b).unwrap();
        let sim = recovered.similarity(&a).unwrap();
        assert!(sim > 0.999, "sim = {}", sim);
    }

    #[test]
    fn test_bind_commutative() {
        let alg = algebra();
        let a = alg.generate_seeded(5);
        let b = alg.generate_seeded(6);
        let ab = alg.bind(&a, &b).unwrap();
        let ba = alg.bind(&b, &a).unwrap();
        assert!(ab.similarity(&ba).unwrap() > 0.999_999);
    }

    #[test]
    fn test_bind_dissimilar_to_inputs() {
        let alg = algebra();
        let a = alg.generate_seeded(8);
        let b = alg.generate_seeded(9);
        let ab = alg.bind(&a, &b).unwrap();
        assert!(ab.similarity(&a).unwrap().abs() < 0.2);
        assert!(ab.is_unit(1e-9));
    }

    #[test]
    fn test_bind_all_matches_pairwise() {
        let alg = algebra();
        let a = alg.generate_seeded(20);
        let b = alg.generate_seeded(21);
        let c = alg.generate_seeded(22);
        let pairwise = alg.bind(&alg.bind(&a, &b).unwrap(), &c).unwrap();
        let chained = alg.bind_all(&[&a, &b, &c]).unwrap();
        assert!(pairwise.similarity(&chained).unwrap() > 0.999_999);
    }

    #[test]
    fn test_power_one_is_identity() {
        let alg = algebra();
        let a = alg.generate_seeded(10);
        let p = alg.power(&a, 1).unwrap();
        assert!(p.similarity(&a).unwrap() > 0.999_999);
    }

    #[test]
    fn test_power_preserves_norm() {
        let alg = algebra();
        let a = alg.generate_seeded(13);
        for n in [2, 5, 17, 60] {
            let p = alg.power(&a, n).unwrap();
            assert!(p.is_unit(1e-6), "n = {}, norm = {}", n, p.norm());
        }
    }

    #[test]
    fn test_negative_power_is_inverse() {
        let alg = algebra();
        let a = alg.generate_seeded(14);
        let p3 = alg.power(&a, 3).unwrap();
        let n3 = alg.power(&a, -3).unwrap();
        let inv = alg.inverse(&p3).unwrap();
        assert!(n3.similarity(&inv).unwrap() > 0.999_99);
    }

    #[test]
    fn test_power_positions_distinct() {
        let alg = algebra();
        let shift = alg.generate_seeded(15);
        let p2 = alg.power(&shift, 2).unwrap();
        let p3 = alg.power(&shift, 3).unwrap();
        assert!(p2.similarity(&p3).unwrap().abs() < 0.2);
    }

    #[test]
    fn test_make_unitary_idempotent() {
        let alg = algebra();
        let a = alg.generate_seeded(16);
        let again = alg.make_unitary(&a).unwrap();
        assert!(again.similarity(&a).unwrap() > 0.999_999);
    }

    #[test]
    fn test_dimension_mismatch() {
        let alg = algebra();
        let other = Algebra::new(64).unwrap();
        let a = alg.generate_seeded(1);
        let b = other.generate_seeded(1);
        assert!(matches!(
            alg.bind(&a, &b),
            Err(VsaError::DimensionMismatch { .. })
        ));
        assert!(alg.bundle(&[&a, &b]).is_err());
    }
}
