//! Fidelity scoring of decoded scripts.

pub mod similarity;
pub mod stats;

pub use similarity::{
    bundle_similarity, role_similarity, script_similarity, step_similarity, synset_similarity,
    FidelityReport, ScoreOptions,
};
pub use stats::{DecodingStats, DecodingVariant, StatsRow, SweepConfig};
