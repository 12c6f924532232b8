//! # mapscript
//!
//! Hyperdimensional (vector-symbolic) encoding of parsed scripts: a hierarchy
//! of actions, semantic roles and role fillers is folded into fixed-width real
//! vectors for associative, noise-tolerant retrieval, and reconstructed from
//! those vectors by repeated unbinding and nearest-neighbour clean-up.
//!
//! ## Components
//!
//! 1. **Vector algebra**: generation, unitary binding, permutation, bundling, similarity
//! 2. **Item memory**: named, append-only associative stores with nearest-neighbour search
//! 3. **Encoder**: letters → words → synsets → roles → steps → script
//! 4. **Decoder**: the inverse walk, terminated by an end-sentinel vector
//! 5. **Scorer**: Jaccard-style fidelity between a reference and a decoded script
//!
//! ## Layout
//!
//! ```text
//! script ── Σ power(shift_step, i+2) ⊛ step_i  +  power(shift_step, n+2) ⊛ end
//! step   ── action ⊛ action_v  +  role_list ⊛ roles_v
//! roles  ── Σ power(shift_role, j+2) ⊛ role_j  +  power(shift_role, m+2) ⊛ end
//! role   ── role_label ⊛ label_v  +  filler ⊛ (Σ synset_k)
//! synset ── Σ word
//! word   ── ⊛ permute(letter_c, c)
//! ```

pub mod codec;
pub mod error;
pub mod memory;
pub mod scoring;
pub mod script;
pub mod vsa;

pub use error::{Result, VsaError};

/// Crate-wide constants and the session configuration.
pub mod config {
    use serde::{Deserialize, Serialize};

    use crate::error::{Result, VsaError};

    /// Default vector dimension D.
    pub const DEFAULT_DIM: usize = 1000;

    /// Default cap on every variable-length decode loop.
    pub const DEFAULT_MAX_ITERATIONS: usize = 100;

    /// Minimum similarity for a synset to count as a member of a filler bundle.
    pub const DEFAULT_FILLER_THRESHOLD: f64 = 0.3;

    /// Minimum similarity for a word to count as a member of a synset.
    pub const DEFAULT_WORD_THRESHOLD: f64 = 0.3;

    /// Slack added to the end-sentinel similarity before it is compared with
    /// the best clean-up match.
    pub const DEFAULT_END_MARGIN: f64 = 0.0;

    /// Sequence slot i is keyed by `power(shift, i + POSITION_OFFSET)`.
    /// Powers 0 (identity) and 1 (the marker itself) are never used.
    pub const POSITION_OFFSET: usize = 2;

    /// Memories with at least this many entries are searched in parallel.
    pub const PARALLEL_SEARCH_MIN: usize = 512;

    /// Configuration of one encode/decode session.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct CodecConfig {
        /// Vector dimension; identical for every memory of the session.
        pub dim: usize,

        /// Seed for the session random source (`None` draws from entropy).
        pub seed: Option<u64>,

        /// Iteration cap for step and role decode loops.
        pub max_iterations: usize,

        /// Threshold for multi-filler recovery.
        pub filler_threshold: f64,

        /// Threshold for recovering the words of a synset.
        pub word_threshold: f64,

        /// End-of-sequence slack.
        pub end_margin: f64,

        /// Parallel search cut-over.
        pub parallel_search_min: usize,
    }

    impl Default for CodecConfig {
        fn default() -> Self {
            Self {
                dim: DEFAULT_DIM,
                seed: None,
                max_iterations: DEFAULT_MAX_ITERATIONS,
                filler_threshold: DEFAULT_FILLER_THRESHOLD,
                word_threshold: DEFAULT_WORD_THRESHOLD,
                end_margin: DEFAULT_END_MARGIN,
                parallel_search_min: PARALLEL_SEARCH_MIN,
            }
        }
    }

    impl CodecConfig {
        /// Reject values no session can run with.
        pub fn validate(&self) -> Result<()> {
            if self.dim == 0 {
                return Err(VsaError::InvalidConfig("dim must be positive".into()));
            }
            if self.max_iterations == 0 {
                return Err(VsaError::InvalidConfig(
                    "max_iterations must be positive".into(),
                ));
            }
            for (name, value) in [
                ("filler_threshold", self.filler_threshold),
                ("word_threshold", self.word_threshold),
            ] {
                if !(-1.0..=1.0).contains(&value) {
                    return Err(VsaError::InvalidConfig(format!(
                        "{} must lie in [-1, 1], got {}",
                        name, value
                    )));
                }
            }
            if !self.end_margin.is_finite() {
                return Err(VsaError::InvalidConfig("end_margin must be finite".into()));
            }
            Ok(())
        }

        /// Names of the fields whose values differ from `other`.
        pub fn differences(&self, other: &CodecConfig) -> Vec<&'static str> {
            let mut fields = Vec::new();
            if self.dim != other.dim {
                fields.push("dim");
            }
            if self.seed != other.seed {
                fields.push("seed");
            }
            if self.max_iterations != other.max_iterations {
                fields.push("max_iterations");
            }
            if self.filler_threshold != other.filler_threshold {
                fields.push("filler_threshold");
            }
            if self.word_threshold != other.word_threshold {
                fields.push("word_threshold");
            }
            if self.end_margin != other.end_margin {
                fields.push("end_margin");
            }
            if self.parallel_search_min != other.parallel_search_min {
                fields.push("parallel_search_min");
            }
            fields
        }

        /// Parse a JSON configuration; missing fields take their defaults.
        pub fn from_json(text: &str) -> Result<Self> {
            let config: CodecConfig = serde_json::from_str(text)?;
            config.validate()?;
            Ok(config)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_default_is_valid() {
            let cfg = CodecConfig::default();
            assert_eq!(cfg.dim, 1000);
            assert!(cfg.validate().is_ok());
        }

        #[test]
        fn test_rejects_bad_values() {
            let cfg = CodecConfig {
                max_iterations: 0,
                ..Default::default()
            };
            assert!(cfg.validate().is_err());

            let cfg = CodecConfig {
                filler_threshold: 1.5,
                ..Default::default()
            };
            assert!(cfg.validate().is_err());
        }

        #[test]
        fn test_from_json_partial() {
            let cfg = CodecConfig::from_json(r#"{"dim": 2048, "seed": 7}"#).unwrap();
            assert_eq!(cfg.dim, 2048);
            assert_eq!(cfg.seed, Some(7));
            assert_eq!(cfg.max_iterations, DEFAULT_MAX_ITERATIONS);
        }

        #[test]
        fn test_differences() {
            let stored = CodecConfig {
                seed: Some(3),
                ..Default::default()
            };
            assert!(stored.differences(&stored).is_empty());

            let requested = CodecConfig {
                dim: 2048,
                max_iterations: 5,
                ..stored.clone()
            };
            assert_eq!(requested.differences(&stored), vec!["dim", "max_iterations"]);
        }
    }
}
