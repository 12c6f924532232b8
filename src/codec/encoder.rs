//! Hierarchical encoder: letters → words → synsets → roles → steps → script.
//!
//! Every composite is written to its category memory under a deterministic
//! name before it is returned. A name that already exists short-circuits the
//! whole subtree, so encoding the same script twice yields the same vectors.

use crate::error::{Result, VsaError};
use crate::memory::{Marker, MemoryBank, MemoryCategory};
use crate::script::model::{role_name, significance_name, step_name};
use crate::script::{Role, Script, Significance, Step, Synset};
use crate::vsa::HdVector;

/// Writes a script hierarchy into a [`MemoryBank`].
pub struct Encoder<'a> {
    bank: &'a mut MemoryBank,
}

impl<'a> Encoder<'a> {
    pub fn new(bank: &'a mut MemoryBank) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &MemoryBank {
        &*self.bank
    }

    /// Encode every significance of `script`; returns one vector per
    /// significance, stored in the Scripts memory as `"{script}:{i}"`.
    pub fn encode_script(&mut self, script: &Script) -> Result<Vec<HdVector>> {
        script.validate()?;
        tracing::info!(
            script = %script.name,
            significances = script.significances.len(),
            "encoding script"
        );
        script
            .significances
            .iter()
            .enumerate()
            .map(|(i, significance)| {
                let name = significance_name(&script.name, i);
                self.encode_significance(&name, significance)
            })
            .collect()
    }

    /// Script vector of one significance:
    /// `Σ power(shift_step, i+2) ⊛ step_i + power(shift_step, n+2) ⊛ end`.
    pub fn encode_significance(
        &mut self,
        name: &str,
        significance: &Significance,
    ) -> Result<HdVector> {
        self.cached(MemoryCategory::Scripts, name, |enc| {
            let mut terms = Vec::with_capacity(significance.steps.len() + 1);
            for (i, step) in significance.steps.iter().enumerate() {
                let step_v = enc.encode_step(&step_name(name, i), step)?;
                let position = enc.bank.position(Marker::ShiftStep, i)?;
                terms.push(enc.bank.algebra().bind(&step_v, &position)?);
            }
            terms.push(enc.end_term(Marker::ShiftStep, significance.steps.len())?);
            tracing::debug!(name, steps = significance.steps.len(), "encoded significance");
            enc.superpose(&terms)
        })
    }

    /// `action ⊛ action_v + role_list ⊛ roles_v`; the role list is stored
    /// separately in the Role-lists memory under the same name.
    pub fn encode_step(&mut self, name: &str, step: &Step) -> Result<HdVector> {
        self.cached(MemoryCategory::Steps, name, |enc| {
            let action_v = enc.encode_synset(&step.action)?;
            let roles_v = enc.encode_role_list(name, &step.roles)?;

            let algebra = enc.bank.algebra();
            let action = algebra.bind(enc.bank.marker(Marker::Action)?, &action_v)?;
            let roles = algebra.bind(enc.bank.marker(Marker::RoleList)?, &roles_v)?;
            algebra.bundle(&[&action, &roles])
        })
    }

    /// `Σ power(shift_role, j+2) ⊛ role_j + power(shift_role, m+2) ⊛ end`.
    pub fn encode_role_list(&mut self, step: &str, roles: &[Role]) -> Result<HdVector> {
        self.cached(MemoryCategory::RoleLists, step, |enc| {
            let mut terms = Vec::with_capacity(roles.len() + 1);
            for (j, role) in roles.iter().enumerate() {
                let role_v = enc.encode_role(step, role)?;
                let position = enc.bank.position(Marker::ShiftRole, j)?;
                terms.push(enc.bank.algebra().bind(&role_v, &position)?);
            }
            terms.push(enc.end_term(Marker::ShiftRole, roles.len())?);
            enc.superpose(&terms)
        })
    }

    /// `role_label ⊛ label_v + filler ⊛ bundle(fillers)`.
    pub fn encode_role(&mut self, step: &str, role: &Role) -> Result<HdVector> {
        let name = role_name(step, role.label);
        self.cached(MemoryCategory::Roles, &name, |enc| {
            let fillers_v = enc.encode_filler_bundle(role)?;
            let label_v = enc
                .bank
                .memory(MemoryCategory::RoleLabels)
                .get(role.label.as_str())?;

            let algebra = enc.bank.algebra();
            let label = algebra.bind(enc.bank.marker(Marker::RoleLabel)?, label_v)?;
            let filler = algebra.bind(enc.bank.marker(Marker::Filler)?, &fillers_v)?;
            algebra.bundle(&[&label, &filler])
        })
    }

    /// Superposition of the role's filler synsets, keyed by their joined keys.
    pub fn encode_filler_bundle(&mut self, role: &Role) -> Result<HdVector> {
        if role.fillers.is_empty() {
            return Err(VsaError::InvalidScript(format!(
                "role {} has no fillers",
                role.label
            )));
        }
        self.cached(MemoryCategory::SynsetBundles, &role.bundle_key(), |enc| {
            let synsets = role
                .fillers
                .iter()
                .map(|s| enc.encode_synset(s))
                .collect::<Result<Vec<_>>>()?;
            enc.superpose(&synsets)
        })
    }

    /// `sense_key(sense) ⊛ bundle(words)`, keyed `"{lemma}:{sense}"`.
    ///
    /// Senses of one lemma share their words, so the sense key is what keeps
    /// them apart.
    pub fn encode_synset(&mut self, synset: &Synset) -> Result<HdVector> {
        self.cached(MemoryCategory::Synsets, &synset.key(), |enc| {
            let words = synset
                .word_forms()
                .into_iter()
                .map(|w| enc.encode_word(w))
                .collect::<Result<Vec<_>>>()?;
            let bundle = enc.superpose(&words)?;
            let sense = enc.bank.sense_key(synset.sense)?;
            enc.bank.algebra().bind(&sense, &bundle)
        })
    }

    /// Sequential binding of position-permuted letter vectors.
    /// Characters outside the pre-built alphabet are minted on first use.
    pub fn encode_word(&mut self, word: &str) -> Result<HdVector> {
        if word.is_empty() {
            return Err(VsaError::InvalidScript("empty word form".into()));
        }
        self.cached(MemoryCategory::Words, word, |enc| {
            let mut letters = Vec::with_capacity(word.len());
            for (position, c) in word.chars().enumerate() {
                let letter = enc
                    .bank
                    .get_or_create(MemoryCategory::Alphabet, &c.to_string())?;
                letters.push(letter.permute(position as isize));
            }
            let refs: Vec<&HdVector> = letters.iter().collect();
            enc.bank.algebra().bind_all(&refs)
        })
    }

    /// How closely the stored word vector matches its re-spelled letters.
    ///
    /// 1.0 for any word this encoder produced. Fails with `NotFound` for a
    /// word never encoded or a character missing from the alphabet.
    pub fn spell_similarity(&self, word: &str) -> Result<f64> {
        let stored = self.bank.memory(MemoryCategory::Words).get(word)?;
        let alphabet = self.bank.memory(MemoryCategory::Alphabet);
        let letters = word
            .chars()
            .enumerate()
            .map(|(position, c)| Ok(alphabet.get(&c.to_string())?.permute(position as isize)))
            .collect::<Result<Vec<_>>>()?;
        let refs: Vec<&HdVector> = letters.iter().collect();
        let spelled = self.bank.algebra().bind_all(&refs)?;
        stored.similarity(&spelled)
    }

    fn end_term(&self, shift: Marker, length: usize) -> Result<HdVector> {
        let position = self.bank.position(shift, length)?;
        self.bank
            .algebra()
            .bind(self.bank.marker(Marker::End)?, &position)
    }

    fn superpose(&self, vectors: &[HdVector]) -> Result<HdVector> {
        let refs: Vec<&HdVector> = vectors.iter().collect();
        self.bank.algebra().bundle(&refs)
    }

    /// Return the stored entry, or build it with `make` and store it.
    fn cached<F>(&mut self, category: MemoryCategory, name: &str, make: F) -> Result<HdVector>
    where
        F: FnOnce(&mut Self) -> Result<HdVector>,
    {
        if let Ok(existing) = self.bank.memory(category).get(name) {
            return Ok(existing.clone());
        }
        let vector = make(self)?;
        self.bank
            .memory_mut(category)
            .get_or_insert_with(name, || Ok(vector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::script::RoleLabel;

    fn bank() -> MemoryBank {
        MemoryBank::new(&CodecConfig {
            dim: 1000,
            seed: Some(7),
            ..Default::default()
        })
        .unwrap()
    }

    fn dinner() -> Script {
        Script::single(
            "Dinner",
            vec![
                Step::new(
                    Synset::single("order", 0),
                    vec![
                        Role::new(RoleLabel::Arg0, vec![Synset::single("wife", 0)]),
                        Role::new(
                            RoleLabel::Arg1,
                            vec![Synset::single("wine", 1), Synset::single("steak", 0)],
                        ),
                    ],
                ),
                Step::new(
                    Synset::single("pay", 0),
                    vec![Role::new(RoleLabel::Arg1, vec![Synset::single("bill", 0)])],
                ),
            ],
        )
    }

    #[test]
    fn test_names_written_per_level() {
        let mut bank = bank();
        Encoder::new(&mut bank).encode_script(&dinner()).unwrap();

        assert!(bank.memory(MemoryCategory::Scripts).contains("Dinner:0"));
        assert!(bank.memory(MemoryCategory::Steps).contains("Dinner:0:1"));
        assert!(bank.memory(MemoryCategory::RoleLists).contains("Dinner:0:0"));
        assert!(bank.memory(MemoryCategory::Roles).contains("Dinner:0:0 ARG1"));
        assert!(bank
            .memory(MemoryCategory::SynsetBundles)
            .contains("wine:1|steak:0"));
        assert!(bank.memory(MemoryCategory::Synsets).contains("order:0"));
        assert!(bank.memory(MemoryCategory::Words).contains("steak"));
    }

    #[test]
    fn test_reencoding_is_idempotent() {
        let mut bank = bank();
        let first = Encoder::new(&mut bank).encode_script(&dinner()).unwrap();
        let sizes = bank.sizes();
        let second = Encoder::new(&mut bank).encode_script(&dinner()).unwrap();
        assert_eq!(first, second);
        assert_eq!(bank.sizes(), sizes);
    }

    #[test]
    fn test_words_near_orthogonal() {
        let mut bank = bank();
        let mut enc = Encoder::new(&mut bank);
        let a = enc.encode_word("cook").unwrap();
        let b = enc.encode_word("cooks").unwrap();
        let c = enc.encode_word("kooc").unwrap();
        assert!(a.similarity(&b).unwrap().abs() < 0.2);
        assert!(a.similarity(&c).unwrap().abs() < 0.2);
        assert!(a.is_unit(1e-9));
    }

    #[test]
    fn test_synset_close_to_its_words() {
        let mut bank = bank();
        let mut enc = Encoder::new(&mut bank);
        let synset = Synset::new("eat_out", 0, &["eat_out", "dine_out"]);
        let v = enc.encode_synset(&synset).unwrap();
        let word = enc.encode_word("dine_out").unwrap();
        let other = enc.encode_word("menu").unwrap();

        let key = enc.bank().sense_key(0).unwrap();
        let words = enc.bank().algebra().unbind(&v, &key).unwrap();
        assert!(words.similarity(&word).unwrap() > 0.6);
        assert!(words.similarity(&other).unwrap().abs() < 0.2);
    }

    #[test]
    fn test_senses_of_one_lemma_differ() {
        let mut bank = bank();
        let mut enc = Encoder::new(&mut bank);
        let first = enc.encode_synset(&Synset::single("order", 0)).unwrap();
        let second = enc.encode_synset(&Synset::single("order", 1)).unwrap();
        assert!(first.similarity(&second).unwrap().abs() < 0.2);
        assert_eq!(enc.bank().memory(MemoryCategory::Words).len(), 1);
    }

    #[test]
    fn test_unknown_character_minted() {
        let mut bank = bank();
        let before = bank.memory(MemoryCategory::Alphabet).len();
        Encoder::new(&mut bank).encode_word("café").unwrap();
        assert_eq!(bank.memory(MemoryCategory::Alphabet).len(), before + 1);
    }

    #[test]
    fn test_spell_similarity() {
        let mut bank = bank();
        let mut enc = Encoder::new(&mut bank);
        enc.encode_word("menu").unwrap();
        assert!((enc.spell_similarity("menu").unwrap() - 1.0).abs() < 1e-9);
        assert!(matches!(
            enc.spell_similarity("bread"),
            Err(VsaError::NotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_script_rejected() {
        let mut bank = bank();
        let bad = Script::single(
            "Bad",
            vec![Step::new(
                Synset::single("eat", 0),
                vec![Role::new(RoleLabel::Arg0, vec![])],
            )],
        );
        assert!(Encoder::new(&mut bank).encode_script(&bad).is_err());
        assert!(bank.memory(MemoryCategory::Scripts).is_empty());
    }
}
