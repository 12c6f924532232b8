//! Decoding statistics over random scripts.
//!
//! For every (steps, roles, bundle size) cell, fresh random scripts are
//! encoded into a fresh bank, decoded with and without noise, and scored
//! under each [`DecodingVariant`]. Cells are independent and run on the
//! rayon pool.

use std::fmt::Write as _;
use std::ops::RangeInclusive;

use rayon::prelude::*;
use serde::Serialize;

use crate::codec::{Decoder, Encoder};
use crate::config::CodecConfig;
use crate::error::Result;
use crate::memory::MemoryBank;
use crate::script::model::significance_name;
use crate::script::{RandomScriptBuilder, RandomScriptConfig};
use crate::scoring::similarity::{script_similarity, ScoreOptions};

/// One way of decoding and scoring a script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodingVariant {
    pub decode_noise: bool,
    pub options: ScoreOptions,
}

impl DecodingVariant {
    /// Clean and noisy decoding, each scored by role count, by bundle
    /// overlap, and by bundle plus word overlap.
    pub const ALL: [DecodingVariant; 6] = [
        DecodingVariant::new(false, false, false),
        DecodingVariant::new(false, true, false),
        DecodingVariant::new(false, true, true),
        DecodingVariant::new(true, false, false),
        DecodingVariant::new(true, true, false),
        DecodingVariant::new(true, true, true),
    ];

    pub const fn new(decode_noise: bool, check_role: bool, check_synset: bool) -> Self {
        Self {
            decode_noise,
            options: ScoreOptions {
                check_role,
                check_synset,
            },
        }
    }

    /// Column name, e.g. `bundle_words_noise`.
    pub fn name(&self) -> String {
        let mut parts = vec![if self.options.check_role { "bundle" } else { "role" }];
        if self.options.check_synset {
            parts.push("words");
        }
        if self.decode_noise {
            parts.push("noise");
        }
        parts.join("_")
    }
}

/// Grid and repetition count of a sweep. Ranges are inclusive.
#[derive(Clone, Debug)]
pub struct SweepConfig {
    pub steps: RangeInclusive<usize>,
    pub roles: RangeInclusive<usize>,
    pub bundle: RangeInclusive<usize>,
    pub iterations: usize,
    pub seed: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            steps: 3..=3,
            roles: 2..=2,
            bundle: 1..=3,
            iterations: 10,
            seed: 0,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct VariantScore {
    pub variant: String,
    pub score: f64,
}

/// Averages for one grid cell.
#[derive(Clone, Debug, Serialize)]
pub struct StatsRow {
    pub steps: usize,
    pub roles: usize,
    pub bundle_size: usize,
    pub scores: Vec<VariantScore>,
}

impl StatsRow {
    pub fn score(&self, variant: &DecodingVariant) -> Option<f64> {
        let name = variant.name();
        self.scores
            .iter()
            .find(|s| s.variant == name)
            .map(|s| s.score)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DecodingStats {
    pub rows: Vec<StatsRow>,
}

impl DecodingStats {
    /// Run the sweep. `codec.seed` is ignored; every run is seeded from
    /// `sweep.seed` so results are reproducible.
    pub fn sweep(codec: &CodecConfig, sweep: &SweepConfig) -> Result<Self> {
        codec.validate()?;
        let mut cells = Vec::new();
        for steps in sweep.steps.clone() {
            for roles in sweep.roles.clone() {
                for bundle in sweep.bundle.clone() {
                    cells.push((steps, roles, bundle));
                }
            }
        }
        tracing::info!(
            cells = cells.len(),
            iterations = sweep.iterations,
            dim = codec.dim,
            "starting decoding sweep"
        );

        let rows = cells
            .par_iter()
            .enumerate()
            .map(|(index, &(steps, roles, bundle))| {
                let base = sweep
                    .seed
                    .wrapping_add((index * sweep.iterations.max(1)) as u64);
                Self::cell(codec, steps, roles, bundle, sweep.iterations, base)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows })
    }

    fn cell(
        codec: &CodecConfig,
        steps: usize,
        roles: usize,
        bundle: usize,
        iterations: usize,
        base_seed: u64,
    ) -> Result<StatsRow> {
        let mut totals = [0.0; DecodingVariant::ALL.len()];
        for it in 0..iterations {
            let seed = base_seed.wrapping_add(it as u64);
            let mut bank = MemoryBank::new(&CodecConfig {
                seed: Some(seed),
                ..codec.clone()
            })?;
            let mut builder = RandomScriptBuilder::new(
                seed,
                RandomScriptConfig {
                    steps: (steps, steps),
                    roles: (roles, roles),
                    fillers: (bundle, bundle),
                    ..Default::default()
                },
            );
            let script = builder.build("Random");
            Encoder::new(&mut bank).encode_script(&script)?;

            let name = significance_name(&script.name, 0);
            let decoder = Decoder::new(&bank);
            let clean = decoder.decode_script(&name, false)?.to_significance();
            let noisy = decoder.decode_script(&name, true)?.to_significance();

            let reference = &script.significances[0];
            for (total, variant) in totals.iter_mut().zip(DecodingVariant::ALL.iter()) {
                let decoded = if variant.decode_noise { &noisy } else { &clean };
                *total += script_similarity(reference, decoded, variant.options);
            }
        }

        let n = iterations.max(1) as f64;
        let scores = DecodingVariant::ALL
            .iter()
            .zip(totals)
            .map(|(variant, total)| VariantScore {
                variant: variant.name(),
                score: total / n,
            })
            .collect();
        tracing::debug!(steps, roles, bundle, "sweep cell done");
        Ok(StatsRow {
            steps,
            roles,
            bundle_size: bundle,
            scores,
        })
    }

    /// Plain-text table, one row per cell.
    pub fn to_table(&self) -> String {
        let mut out = String::from("steps  roles  bundle");
        for variant in DecodingVariant::ALL {
            let _ = write!(out, "  {:>18}", variant.name());
        }
        out.push('\n');
        for row in &self.rows {
            let _ = write!(out, "{:>5}  {:>5}  {:>6}", row.steps, row.roles, row.bundle_size);
            for score in &row.scores {
                let _ = write!(out, "  {:>18.4}", score.score);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_names() {
        let names: Vec<String> = DecodingVariant::ALL.iter().map(|v| v.name()).collect();
        assert_eq!(
            names,
            vec![
                "role",
                "bundle",
                "bundle_words",
                "role_noise",
                "bundle_noise",
                "bundle_words_noise"
            ]
        );
    }

    #[test]
    fn test_small_sweep() {
        let codec = CodecConfig {
            dim: 1000,
            ..Default::default()
        };
        let sweep = SweepConfig {
            steps: 2..=3,
            roles: 1..=1,
            bundle: 1..=2,
            iterations: 2,
            seed: 5,
        };
        let stats = DecodingStats::sweep(&codec, &sweep).unwrap();
        assert_eq!(stats.rows.len(), 4);
        for row in &stats.rows {
            assert_eq!(row.scores.len(), 6);
            let clean = row.score(&DecodingVariant::ALL[0]).unwrap();
            assert!(clean > 0.9, "clean score {} for {:?}", clean, row);
            for s in &row.scores {
                assert!((0.0..=1.0).contains(&s.score));
            }
        }
        assert!(stats.to_table().lines().count() == 5);
    }
}
