//! The script hierarchy consumed by the encoder and produced (in decoded
//! form) by the decoder.
//!
//! Script → significances → steps → action + roles → filler synsets → words.
//! These are plain read-only records; the codec never mutates them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VsaError};
use crate::script::roles::RoleLabel;

/// A word sense: a lemma, its sense index and its constituent word forms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synset {
    pub lemma: String,

    #[serde(default)]
    pub sense: usize,

    /// Word forms of the sense. Empty means "just the lemma".
    #[serde(default)]
    pub words: Vec<String>,
}

impl Synset {
    pub fn new(lemma: &str, sense: usize, words: &[&str]) -> Self {
        Self {
            lemma: lemma.to_string(),
            sense,
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// A sense whose only word form is the lemma itself.
    pub fn single(lemma: &str, sense: usize) -> Self {
        Self::new(lemma, sense, &[lemma])
    }

    /// Memory key, `"{lemma}:{sense}"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.lemma, self.sense)
    }

    /// Split a memory key back into lemma and sense index.
    pub fn parse_key(key: &str) -> Option<(String, usize)> {
        let (lemma, sense) = key.rsplit_once(':')?;
        let sense = sense.parse().ok()?;
        Some((lemma.to_string(), sense))
    }

    /// Word forms, falling back to the lemma when none are listed.
    pub fn word_forms(&self) -> Vec<&str> {
        if self.words.is_empty() {
            vec![self.lemma.as_str()]
        } else {
            self.words.iter().map(String::as_str).collect()
        }
    }

    /// Intersection-over-union of the two word sets.
    pub fn word_jaccard(&self, other: &Synset) -> f64 {
        let a: HashSet<&str> = self.word_forms().into_iter().collect();
        let b: HashSet<&str> = other.word_forms().into_iter().collect();
        let union = a.union(&b).count();
        if union == 0 {
            return 0.0;
        }
        a.intersection(&b).count() as f64 / union as f64
    }
}

/// A role filled by one synset, or several when the filler is a
/// coreference cluster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub label: RoleLabel,
    pub fillers: Vec<Synset>,
}

impl Role {
    pub fn new(label: RoleLabel, fillers: Vec<Synset>) -> Self {
        Self { label, fillers }
    }

    /// Synset-bundle memory key: filler keys joined with `|`.
    pub fn bundle_key(&self) -> String {
        self.fillers
            .iter()
            .map(Synset::key)
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// One script step: an action sense and its roles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub action: Synset,

    #[serde(default)]
    pub roles: Vec<Role>,
}

impl Step {
    pub fn new(action: Synset, roles: Vec<Role>) -> Self {
        Self { action, roles }
    }
}

/// One variant of a script: an ordered sequence of steps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Significance {
    pub steps: Vec<Step>,
}

impl Significance {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }
}

/// A named script with one or more significances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub name: String,
    pub significances: Vec<Significance>,
}

impl Script {
    pub fn new(name: &str, significances: Vec<Significance>) -> Self {
        Self {
            name: name.to_string(),
            significances,
        }
    }

    /// A script with a single significance.
    pub fn single(name: &str, steps: Vec<Step>) -> Self {
        Self::new(name, vec![Significance::new(steps)])
    }

    /// Parse a script from JSON and validate it.
    pub fn from_json(text: &str) -> Result<Self> {
        let script: Script = serde_json::from_str(text)?;
        script.validate()?;
        Ok(script)
    }

    /// Check the structural constraints the codec relies on.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(VsaError::InvalidScript("script name is empty".into()));
        }
        for (si, significance) in self.significances.iter().enumerate() {
            for (ti, step) in significance.steps.iter().enumerate() {
                if step.action.lemma.is_empty() {
                    return Err(VsaError::InvalidScript(format!(
                        "significance {} step {}: empty action lemma",
                        si, ti
                    )));
                }
                if step.roles.len() > RoleLabel::COUNT {
                    return Err(VsaError::InvalidScript(format!(
                        "significance {} step {}: {} roles exceed the {} role labels",
                        si,
                        ti,
                        step.roles.len(),
                        RoleLabel::COUNT
                    )));
                }
                let mut labels = HashSet::new();
                for role in &step.roles {
                    if !labels.insert(role.label) {
                        return Err(VsaError::InvalidScript(format!(
                            "significance {} step {}: role {} appears twice",
                            si, ti, role.label
                        )));
                    }
                    if role.fillers.is_empty() {
                        return Err(VsaError::InvalidScript(format!(
                            "significance {} step {}: role {} has no fillers",
                            si, ti, role.label
                        )));
                    }
                    if role.fillers.iter().any(|f| f.lemma.is_empty()) {
                        return Err(VsaError::InvalidScript(format!(
                            "significance {} step {}: role {} has an empty filler lemma",
                            si, ti, role.label
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Scripts-memory key of one significance.
pub fn significance_name(script: &str, index: usize) -> String {
    format!("{}:{}", script, index)
}

/// Steps / role-lists memory key of one step.
pub fn step_name(significance: &str, index: usize) -> String {
    format!("{}:{}", significance, index)
}

/// Roles memory key of one role.
pub fn role_name(step: &str, label: RoleLabel) -> String {
    format!("{} {}", step, label.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synset_key_roundtrip() {
        let s = Synset::new("eat_out", 2, &["eat_out", "dine_out"]);
        assert_eq!(s.key(), "eat_out:2");
        assert_eq!(Synset::parse_key(&s.key()), Some(("eat_out".to_string(), 2)));
        assert_eq!(Synset::parse_key("nokey"), None);
    }

    #[test]
    fn test_word_forms_fallback() {
        let s = Synset {
            lemma: "menu".into(),
            sense: 0,
            words: vec![],
        };
        assert_eq!(s.word_forms(), vec!["menu"]);
    }

    #[test]
    fn test_word_jaccard() {
        let a = Synset::new("cook", 0, &["cook", "chef"]);
        let b = Synset::new("chef", 0, &["chef"]);
        assert!((a.word_jaccard(&b) - 0.5).abs() < 1e-12);
        assert_eq!(a.word_jaccard(&a), 1.0);
    }

    #[test]
    fn test_names() {
        let sig = significance_name("Restaurant", 0);
        let step = step_name(&sig, 3);
        assert_eq!(step, "Restaurant:0:3");
        assert_eq!(role_name(&step, RoleLabel::ArgmLoc), "Restaurant:0:3 ARGM-LOC");
    }

    #[test]
    fn test_bundle_key() {
        let role = Role::new(
            RoleLabel::Arg0,
            vec![Synset::single("wife", 0), Synset::single("people", 1)],
        );
        assert_eq!(role.bundle_key(), "wife:0|people:1");
    }

    #[test]
    fn test_from_json_and_validate() {
        let json = r#"{
            "name": "Dinner",
            "significances": [{
                "steps": [{
                    "action": {"lemma": "order", "sense": 1},
                    "roles": [{"label": "ARG1", "fillers": [{"lemma": "wine"}]}]
                }]
            }]
        }"#;
        let script = Script::from_json(json).unwrap();
        assert_eq!(script.significances[0].steps[0].roles[0].label, RoleLabel::Arg1);
        assert_eq!(script.significances[0].steps[0].action.sense, 1);
    }

    #[test]
    fn test_validate_rejects_empty_role() {
        let script = Script::single(
            "Bad",
            vec![Step::new(
                Synset::single("eat", 0),
                vec![Role::new(RoleLabel::Arg0, vec![])],
            )],
        );
        assert!(matches!(script.validate(), Err(VsaError::InvalidScript(_))));
    }

    #[test]
    fn test_validate_rejects_repeated_label() {
        let script = Script::single(
            "Evening",
            vec![Step::new(
                Synset::single("eat", 0),
                vec![
                    Role::new(RoleLabel::ArgmTmp, vec![Synset::single("morning", 0)]),
                    Role::new(RoleLabel::ArgmTmp, vec![Synset::single("evening", 0)]),
                ],
            )],
        );
        match script.validate() {
            Err(VsaError::InvalidScript(message)) => assert!(message.contains("ARGM-TMP")),
            other => panic!("expected InvalidScript, got {:?}", other),
        }
    }
}
