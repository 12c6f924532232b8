//! Seeded random scripts over a restaurant-domain vocabulary.
//!
//! Used to measure decoding fidelity: build a script of known shape, encode
//! it, decode it and score the reconstruction against the generated script.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::script::model::{Role, Script, Step, Synset};
use crate::script::roles::RoleLabel;

/// Lemmas used as step actions.
pub const ACTIONS: [&str; 33] = [
    "have", "book", "find", "see", "bottle", "cook", "spoil", "show", "get", "include",
    "complain", "consume", "look", "think", "start", "come", "serve", "choose", "order",
    "manage", "decide", "judge", "bake", "advise", "be", "mean", "make", "overlook", "hear",
    "price", "worry", "run", "open",
];

/// Lemmas used as role fillers.
pub const OBJECTS: [&str; 82] = [
    "delight", "way", "include", "mean", "vegetable", "chef", "french", "week", "little",
    "freezer", "time", "kitchen", "favourable", "list", "bake", "good", "prepare", "wardle",
    "comment", "premise", "speciality", "wine", "fresh", "bread", "bill", "coffee", "taste",
    "over", "underdone", "extensive", "steak", "class", "quality", "reasonably", "people",
    "choice", "rather", "acceptable", "wife", "often", "salad", "enough", "menu", "lamb",
    "best", "early", "main", "excellent", "table", "trout", "cook", "restaurant",
    "satisfactory", "get", "nice", "always", "long", "be", "service", "traditional", "one",
    "perfect", "look", "advise", "difficulty", "business", "number", "usual", "however",
    "welcome", "family", "portion", "pound", "column", "newly", "large", "helping", "mill",
    "course", "dean", "small", "second",
];

/// Shape of the scripts a [`RandomScriptBuilder`] produces.
/// Every range is inclusive.
#[derive(Clone, Debug)]
pub struct RandomScriptConfig {
    /// Number of steps.
    pub steps: (usize, usize),

    /// Number of roles per step (capped at the number of role labels).
    pub roles: (usize, usize),

    /// Number of filler synsets per role.
    pub fillers: (usize, usize),

    /// Sense indices are drawn from `0..max_senses`.
    pub max_senses: usize,

    /// Up to this many extra word forms are added to each synset.
    pub max_extra_words: usize,
}

impl Default for RandomScriptConfig {
    fn default() -> Self {
        Self {
            steps: (3, 3),
            roles: (2, 2),
            fillers: (1, 3),
            max_senses: 3,
            max_extra_words: 0,
        }
    }
}

/// Builds random scripts from a seeded generator.
///
/// Each lemma gets one synset per builder, so a lemma that shows up twice
/// always maps to the same sense and word forms.
pub struct RandomScriptBuilder {
    rng: StdRng,
    config: RandomScriptConfig,
    actions: Vec<String>,
    objects: Vec<String>,
    lexicon: HashMap<String, Synset>,
    built: usize,
}

impl RandomScriptBuilder {
    pub fn new(seed: u64, config: RandomScriptConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
            actions: ACTIONS.iter().map(|s| s.to_string()).collect(),
            objects: OBJECTS.iter().map(|s| s.to_string()).collect(),
            lexicon: HashMap::new(),
            built: 0,
        }
    }

    /// Replace the default vocabularies.
    pub fn with_vocabulary(mut self, actions: &[&str], objects: &[&str]) -> Self {
        self.actions = actions.iter().map(|s| s.to_string()).collect();
        self.objects = objects.iter().map(|s| s.to_string()).collect();
        self.lexicon.clear();
        self
    }

    /// Number of distinct synsets handed out so far.
    pub fn lexicon_len(&self) -> usize {
        self.lexicon.len()
    }

    /// Build one script named `"{prefix}-{n}"`, n counting up per builder.
    pub fn build(&mut self, prefix: &str) -> Script {
        let name = format!("{}-{}", prefix, self.built);
        self.built += 1;

        let n_steps = self.draw(self.config.steps);
        let steps = (0..n_steps).map(|_| self.step()).collect();
        Script::single(&name, steps)
    }

    fn step(&mut self) -> Step {
        let action_lemma = self
            .actions
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| "do".to_string());
        let action = self.synset(&action_lemma);

        let n_roles = self.draw(self.config.roles).min(RoleLabel::COUNT);
        let labels: Vec<RoleLabel> = RoleLabel::ALL
            .choose_multiple(&mut self.rng, n_roles)
            .copied()
            .collect();

        let roles = labels
            .into_iter()
            .filter_map(|label| {
                let fillers = self.fillers();
                if fillers.is_empty() {
                    None
                } else {
                    Some(Role::new(label, fillers))
                }
            })
            .collect();
        Step::new(action, roles)
    }

    fn fillers(&mut self) -> Vec<Synset> {
        let n = self.draw(self.config.fillers).max(1);
        let lemmas: Vec<String> = self
            .objects
            .choose_multiple(&mut self.rng, n)
            .cloned()
            .collect();

        let mut fillers: Vec<Synset> = Vec::with_capacity(lemmas.len());
        for lemma in lemmas {
            let synset = self.synset(&lemma);
            if !fillers.iter().any(|f| f.key() == synset.key()) {
                fillers.push(synset);
            }
        }
        fillers
    }

    fn synset(&mut self, lemma: &str) -> Synset {
        if let Some(existing) = self.lexicon.get(lemma) {
            return existing.clone();
        }
        let sense = self.rng.gen_range(0..self.config.max_senses.max(1));
        let n_extra = self.rng.gen_range(0..=self.config.max_extra_words);
        let mut words = vec![lemma.to_string()];
        let extras: Vec<String> = self
            .objects
            .iter()
            .filter(|w| w.as_str() != lemma)
            .cloned()
            .collect::<Vec<_>>()
            .choose_multiple(&mut self.rng, n_extra)
            .cloned()
            .collect();
        words.extend(extras);

        let synset = Synset {
            lemma: lemma.to_string(),
            sense,
            words,
        };
        self.lexicon.insert(lemma.to_string(), synset.clone());
        synset
    }

    fn draw(&mut self, (lo, hi): (usize, usize)) -> usize {
        self.rng.gen_range(lo.min(hi)..=lo.max(hi))
    }
}
