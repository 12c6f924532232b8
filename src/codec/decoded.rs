//! Decoded structure: the script hierarchy rebuilt from vectors.
//!
//! Every node keeps the vector it was decoded from and the clean-up
//! similarity that selected it, so callers can judge fidelity per node.

use serde::Serialize;

use crate::script::{Role, RoleLabel, Significance, Step, Synset};
use crate::vsa::HdVector;

/// How a variable-length decode loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Completion {
    /// The end sentinel won at iteration `at`.
    Ended { at: usize },
    /// The iteration cap was reached first; the sequence may be truncated.
    CapReached,
}

impl Completion {
    pub fn is_complete(self) -> bool {
        matches!(self, Completion::Ended { .. })
    }
}

/// A word recovered from a synset.
#[derive(Clone, Debug, Serialize)]
pub struct DecodedWord {
    pub text: String,
    #[serde(skip_serializing)]
    pub vector: HdVector,
    pub similarity: f64,
}

/// A synset recovered by clean-up in the Synsets memory.
#[derive(Clone, Debug, Serialize)]
pub struct DecodedSynset {
    pub key: String,
    pub lemma: String,
    pub sense: usize,
    #[serde(skip_serializing)]
    pub vector: HdVector,
    pub similarity: f64,
    pub words: Vec<DecodedWord>,
}

impl DecodedSynset {
    pub fn to_synset(&self) -> Synset {
        Synset {
            lemma: self.lemma.clone(),
            sense: self.sense,
            words: self.words.iter().map(|w| w.text.clone()).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DecodedRole {
    pub label: RoleLabel,
    pub label_similarity: f64,
    #[serde(skip_serializing)]
    pub vector: HdVector,
    pub similarity: f64,
    pub fillers: Vec<DecodedSynset>,
}

impl DecodedRole {
    pub fn to_role(&self) -> Role {
        Role::new(
            self.label,
            self.fillers.iter().map(DecodedSynset::to_synset).collect(),
        )
    }

    fn confidence(&self) -> f64 {
        self.fillers
            .iter()
            .map(|f| f.similarity)
            .fold(self.similarity.min(self.label_similarity), f64::min)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DecodedStep {
    pub name: String,
    #[serde(skip_serializing)]
    pub vector: HdVector,
    pub similarity: f64,
    pub action: DecodedSynset,
    pub roles: Vec<DecodedRole>,
    pub completion: Completion,
}

impl DecodedStep {
    pub fn to_step(&self) -> Step {
        Step::new(
            self.action.to_synset(),
            self.roles.iter().map(DecodedRole::to_role).collect(),
        )
    }

    fn confidence(&self) -> f64 {
        self.roles
            .iter()
            .map(DecodedRole::confidence)
            .fold(self.similarity.min(self.action.similarity), f64::min)
    }
}

/// A decoded significance.
#[derive(Clone, Debug, Serialize)]
pub struct DecodedScript {
    pub name: String,
    #[serde(skip_serializing)]
    pub vector: HdVector,
    pub steps: Vec<DecodedStep>,
    pub completion: Completion,

    /// Lowest clean-up similarity among steps, actions, roles, labels and
    /// fillers. Word matches are auxiliary and not counted. 1.0 when
    /// nothing was decoded.
    pub confidence: f64,
}

impl DecodedScript {
    pub(crate) fn new(
        name: String,
        vector: HdVector,
        steps: Vec<DecodedStep>,
        completion: Completion,
    ) -> Self {
        let confidence = steps
            .iter()
            .map(DecodedStep::confidence)
            .fold(1.0, f64::min);
        Self {
            name,
            vector,
            steps,
            completion,
            confidence,
        }
    }

    /// Back to the input model, for scoring against a reference.
    pub fn to_significance(&self) -> Significance {
        Significance::new(self.steps.iter().map(DecodedStep::to_step).collect())
    }

    /// Whether every loop, step and role alike, met its end sentinel.
    pub fn is_complete(&self) -> bool {
        self.completion.is_complete() && self.steps.iter().all(|s| s.completion.is_complete())
    }
}
