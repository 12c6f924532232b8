//! Vector-symbolic algebra over real holographic vectors.
//!
//! - **Bind (⊛)**: circular convolution, structured association
//! - **Unbind**: circular correlation, recovers one side of a binding
//! - **Bundle (+)**: normalised sum, superposition of a set
//! - **Permute / power**: positional information for sequences
//! - **Similarity**: cosine similarity for clean-up and scoring

pub mod algebra;
pub mod hdvector;

pub use algebra::Algebra;
pub use hdvector::{bundle, HdVector};
