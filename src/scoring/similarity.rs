//! Set-overlap similarity between a reference and a decoded structure.
//!
//! All scores lie in `[0, 1]`, and a structure scored against itself gets 1.0
//! at every level. Synsets match by key; the word sets only weigh a match
//! when [`ScoreOptions::check_synset`] is on.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::script::{Role, RoleLabel, Significance, Step, Synset};

/// Which levels weigh matches by their inner similarity instead of
/// counting them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreOptions {
    /// Weight matched roles by their filler-bundle similarity.
    pub check_role: bool,

    /// Weight matched synsets by the overlap of their word sets.
    pub check_synset: bool,
}

impl ScoreOptions {
    /// Both levels weighted.
    pub fn strict() -> Self {
        Self {
            check_role: true,
            check_synset: true,
        }
    }
}

/// Intersection-over-union of the word sets.
pub fn synset_similarity(reference: &Synset, decoded: &Synset) -> f64 {
    reference.word_jaccard(decoded)
}

/// IoU of two filler sets, matching synsets by key.
pub fn bundle_similarity(reference: &[Synset], decoded: &[Synset], options: ScoreOptions) -> f64 {
    let mut intersection = 0.0;
    let mut count = 0.0;
    for r in reference {
        if let Some(d) = decoded.iter().find(|d| d.key() == r.key()) {
            intersection += synset_similarity(r, d);
            count += 1.0;
        }
    }
    let union = (reference.len() + decoded.len()) as f64 - count;
    if union == 0.0 {
        return 1.0;
    }
    if options.check_synset {
        intersection / union
    } else {
        count / union
    }
}

/// Bundle similarity when the labels agree, 0 otherwise.
pub fn role_similarity(reference: &Role, decoded: &Role, options: ScoreOptions) -> f64 {
    if reference.label != decoded.label {
        return 0.0;
    }
    bundle_similarity(&reference.fillers, &decoded.fillers, options)
}

/// 0 when the actions differ; otherwise the IoU of the role sets, each
/// reference role matched to its most similar decoded role.
pub fn step_similarity(reference: &Step, decoded: &Step, options: ScoreOptions) -> f64 {
    if reference.action.key() != decoded.action.key() {
        return 0.0;
    }
    match (reference.roles.is_empty(), decoded.roles.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }

    let mut intersection = 0.0;
    let mut count = 0.0;
    for r in &reference.roles {
        let best = decoded
            .roles
            .iter()
            .map(|d| role_similarity(r, d, options))
            .fold(0.0, f64::max);
        if best > 0.0 {
            intersection += best;
            count += 1.0;
        }
    }
    let union = (reference.roles.len() + decoded.roles.len()) as f64 - count;
    if options.check_role {
        intersection / union
    } else {
        count / union
    }
}

/// Mean step similarity over `max(len_ref, len_dec)` positions; missing
/// or extra steps score 0.
pub fn script_similarity(
    reference: &Significance,
    decoded: &Significance,
    options: ScoreOptions,
) -> f64 {
    let n = reference.steps.len().max(decoded.steps.len());
    if n == 0 {
        return 1.0;
    }
    let total: f64 = reference
        .steps
        .iter()
        .zip(&decoded.steps)
        .map(|(r, d)| step_similarity(r, d, options))
        .sum();
    total / n as f64
}

/// Fidelity of a decoded significance, split per level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FidelityReport {
    /// [`script_similarity`] with both levels weighted.
    pub overall: f64,

    /// Share of step positions whose action keys agree.
    pub action_match: f64,

    /// Mean IoU of the role-label sets per step position.
    pub role_match: f64,

    /// Mean key IoU of the filler sets over roles present on either side.
    pub filler_match: f64,
}

impl FidelityReport {
    pub fn compute(reference: &Significance, decoded: &Significance) -> Self {
        let n = reference.steps.len().max(decoded.steps.len());
        if n == 0 {
            return Self {
                overall: 1.0,
                action_match: 1.0,
                role_match: 1.0,
                filler_match: 1.0,
            };
        }

        let aligned = || reference.steps.iter().zip(&decoded.steps);
        let actions = aligned()
            .filter(|(r, d)| r.action.key() == d.action.key())
            .count();
        let roles: f64 = aligned().map(|(r, d)| label_jaccard(r, d)).sum();

        let mut filler_total = 0.0;
        let mut filler_slots = 0usize;
        for (r, d) in aligned() {
            for role in &r.roles {
                filler_slots += 1;
                if let Some(other) = d.roles.iter().find(|o| o.label == role.label) {
                    filler_total += key_jaccard(&role.fillers, &other.fillers);
                }
            }
            filler_slots += d
                .roles
                .iter()
                .filter(|o| !r.roles.iter().any(|role| role.label == o.label))
                .count();
        }
        filler_slots += reference
            .steps
            .iter()
            .skip(decoded.steps.len())
            .chain(decoded.steps.iter().skip(reference.steps.len()))
            .map(|s| s.roles.len())
            .sum::<usize>();

        Self {
            overall: script_similarity(reference, decoded, ScoreOptions::strict()),
            action_match: actions as f64 / n as f64,
            role_match: roles / n as f64,
            filler_match: if filler_slots == 0 {
                1.0
            } else {
                filler_total / filler_slots as f64
            },
        }
    }
}

fn label_jaccard(reference: &Step, decoded: &Step) -> f64 {
    let a: HashSet<RoleLabel> = reference.roles.iter().map(|r| r.label).collect();
    let b: HashSet<RoleLabel> = decoded.roles.iter().map(|r| r.label).collect();
    jaccard(&a, &b)
}

fn key_jaccard(reference: &[Synset], decoded: &[Synset]) -> f64 {
    let a: HashSet<String> = reference.iter().map(Synset::key).collect();
    let b: HashSet<String> = decoded.iter().map(Synset::key).collect();
    jaccard(&a, &b)
}

fn jaccard<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
