//! Hierarchical decoder: the inverse walk of the encoder.
//!
//! Each level unbinds a slot key, cleans the noisy result up against the
//! category memory and recurses. Variable-length levels stop when the end
//! sentinel is at least as close as the best clean-up match, or when the
//! iteration cap is hit.

use crate::codec::decoded::{
    Completion, DecodedRole, DecodedScript, DecodedStep, DecodedSynset, DecodedWord,
};
use crate::error::{Result, VsaError};
use crate::memory::{Marker, Match, MemoryBank, MemoryCategory};
use crate::script::model::significance_name;
use crate::script::{RoleLabel, Synset};
use crate::vsa::HdVector;

/// One sequence slot after clean-up.
enum Slot {
    End,
    Item { matched: Match, candidate: HdVector },
}

/// Reads a populated [`MemoryBank`] back into script structure.
///
/// With `decode_noise` the walk continues from the noisy unbound vectors
/// instead of the stored entries the clean-up picked, which exposes how
/// much interference each level adds.
pub struct Decoder<'a> {
    bank: &'a MemoryBank,
}

impl<'a> Decoder<'a> {
    pub fn new(bank: &'a MemoryBank) -> Self {
        Self { bank }
    }

    /// Decode the Scripts-memory entry `name` (e.g. `"Restaurant:0"`).
    ///
    /// Never fails on interference: a loop that misses its end sentinel is
    /// reported as [`Completion::CapReached`] and the partial result returned.
    pub fn decode_script(&self, name: &str, decode_noise: bool) -> Result<DecodedScript> {
        let script_v = self.bank.memory(MemoryCategory::Scripts).get(name)?.clone();
        let cap = self.bank.config().max_iterations;

        let mut steps = Vec::new();
        let mut completion = Completion::CapReached;
        for i in 0..cap {
            match self.slot(&script_v, Marker::ShiftStep, i, MemoryCategory::Steps)? {
                Slot::End => {
                    completion = Completion::Ended { at: i };
                    break;
                }
                Slot::Item { matched, candidate } => {
                    let source =
                        self.choose(&candidate, MemoryCategory::Steps, &matched, decode_noise)?;
                    let step =
                        self.decode_step(&matched.name, &source, matched.similarity, decode_noise)?;
                    steps.push(step);
                }
            }
        }

        if completion == Completion::CapReached {
            tracing::warn!(script = name, cap, "step decoding hit the iteration cap");
        }
        tracing::debug!(script = name, steps = steps.len(), "decoded script");
        Ok(DecodedScript::new(name.to_string(), script_v, steps, completion))
    }

    /// Decode every significance `"{script}:{i}"` present in the bank.
    pub fn decode_all(&self, script: &str, decode_noise: bool) -> Result<Vec<DecodedScript>> {
        let scripts = self.bank.memory(MemoryCategory::Scripts);
        let mut decoded = Vec::new();
        for i in 0.. {
            let name = significance_name(script, i);
            if !scripts.contains(&name) {
                break;
            }
            decoded.push(self.decode_script(&name, decode_noise)?);
        }
        if decoded.is_empty() {
            return Err(VsaError::NotFound {
                memory: scripts.name().to_string(),
                name: script.to_string(),
            });
        }
        Ok(decoded)
    }

    /// Like [`Decoder::decode_script`], but a loop that reaches its cap is
    /// an `IterationCapExceeded` error.
    pub fn decode_strict(&self, name: &str, decode_noise: bool) -> Result<DecodedScript> {
        let decoded = self.decode_script(name, decode_noise)?;
        let cap = self.bank.config().max_iterations;
        if decoded.completion == Completion::CapReached {
            return Err(VsaError::IterationCapExceeded {
                level: "step".into(),
                cap,
            });
        }
        if decoded
            .steps
            .iter()
            .any(|s| s.completion == Completion::CapReached)
        {
            return Err(VsaError::IterationCapExceeded {
                level: "role".into(),
                cap: role_cap(cap),
            });
        }
        Ok(decoded)
    }

    /// Unbind the action and role-list slots of a step vector.
    pub fn decode_step(
        &self,
        name: &str,
        step_v: &HdVector,
        similarity: f64,
        decode_noise: bool,
    ) -> Result<DecodedStep> {
        let algebra = self.bank.algebra();

        let action_noisy = algebra.unbind(step_v, self.bank.marker(Marker::Action)?)?;
        let action_match = self.bank.memory(MemoryCategory::Synsets).best(&action_noisy)?;
        let action = self.decode_synset(&action_match.name, action_match.similarity)?;

        let roles_noisy = algebra.unbind(step_v, self.bank.marker(Marker::RoleList)?)?;
        let roles_v = if decode_noise {
            roles_noisy
        } else {
            let matched = self.bank.memory(MemoryCategory::RoleLists).best(&roles_noisy)?;
            self.stored(MemoryCategory::RoleLists, &matched)?
        };
        let (roles, completion) = self.decode_role_list(&roles_v, decode_noise)?;
        if completion == Completion::CapReached {
            tracing::warn!(step = name, "role decoding hit the iteration cap");
        }

        Ok(DecodedStep {
            name: name.to_string(),
            vector: step_v.clone(),
            similarity,
            action,
            roles,
            completion,
        })
    }

    /// Walk a role list until the end sentinel wins. At most
    /// `min(max_iterations, RoleLabel::COUNT + 1)` slots are tried.
    pub fn decode_role_list(
        &self,
        roles_v: &HdVector,
        decode_noise: bool,
    ) -> Result<(Vec<DecodedRole>, Completion)> {
        let cap = role_cap(self.bank.config().max_iterations);
        let mut roles = Vec::new();
        for j in 0..cap {
            match self.slot(roles_v, Marker::ShiftRole, j, MemoryCategory::Roles)? {
                Slot::End => return Ok((roles, Completion::Ended { at: j })),
                Slot::Item { matched, candidate } => {
                    let source =
                        self.choose(&candidate, MemoryCategory::Roles, &matched, decode_noise)?;
                    roles.push(self.decode_role(&source, matched.similarity, decode_noise)?);
                }
            }
        }
        Ok((roles, Completion::CapReached))
    }

    /// Recover the label and the filler synsets of one role vector.
    ///
    /// Fillers are every synset within `filler_threshold` of the filler
    /// bundle; the single best synset is kept when none clears it.
    pub fn decode_role(
        &self,
        role_v: &HdVector,
        similarity: f64,
        decode_noise: bool,
    ) -> Result<DecodedRole> {
        let algebra = self.bank.algebra();
        let config = self.bank.config();

        let label_noisy = algebra.unbind(role_v, self.bank.marker(Marker::RoleLabel)?)?;
        let label_match = self.bank.memory(MemoryCategory::RoleLabels).best(&label_noisy)?;
        let label: RoleLabel = label_match.name.parse()?;

        let filler_noisy = algebra.unbind(role_v, self.bank.marker(Marker::Filler)?)?;
        let bundle_v = if decode_noise {
            filler_noisy
        } else {
            let matched = self
                .bank
                .memory(MemoryCategory::SynsetBundles)
                .best(&filler_noisy)?;
            self.stored(MemoryCategory::SynsetBundles, &matched)?
        };

        let synsets = self.bank.memory(MemoryCategory::Synsets);
        let mut matches = synsets.search(&bundle_v, None, Some(config.filler_threshold))?;
        if matches.is_empty() {
            matches.push(synsets.best(&bundle_v)?);
        }
        let fillers = matches
            .iter()
            .map(|m| self.decode_synset(&m.name, m.similarity))
            .collect::<Result<Vec<_>>>()?;

        Ok(DecodedRole {
            label,
            label_similarity: label_match.similarity,
            vector: role_v.clone(),
            similarity,
            fillers,
        })
    }

    /// Look up a synset, strip its sense key and recover its words by
    /// threshold search.
    pub fn decode_synset(&self, key: &str, similarity: f64) -> Result<DecodedSynset> {
        let vector = self.bank.memory(MemoryCategory::Synsets).get(key)?.clone();
        let (lemma, sense) =
            Synset::parse_key(key).unwrap_or_else(|| (key.to_string(), 0));
        let words_v = self
            .bank
            .algebra()
            .unbind(&vector, &self.bank.sense_key(sense)?)?;

        let words_memory = self.bank.memory(MemoryCategory::Words);
        let threshold = self.bank.config().word_threshold;
        let mut matches = words_memory.search(&words_v, None, Some(threshold))?;
        if matches.is_empty() {
            matches.push(words_memory.best(&words_v)?);
        }
        let words = matches
            .into_iter()
            .map(|m| {
                Ok(DecodedWord {
                    vector: words_memory.get(&m.name)?.clone(),
                    text: m.name,
                    similarity: m.similarity,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DecodedSynset {
            key: key.to_string(),
            lemma,
            sense,
            vector,
            similarity,
            words,
        })
    }

    /// Unbind sequence slot `index` and decide between the end sentinel and
    /// the best entry of `category`.
    fn slot(
        &self,
        sequence: &HdVector,
        shift: Marker,
        index: usize,
        category: MemoryCategory,
    ) -> Result<Slot> {
        let position = self.bank.position(shift, index)?;
        let candidate = self.bank.algebra().unbind(sequence, &position)?;

        let matched = match self.bank.memory(category).best(&candidate) {
            Ok(m) => m,
            Err(VsaError::EmptyMemory { .. }) => return Ok(Slot::End),
            Err(e) => return Err(e),
        };
        let end_similarity = candidate.similarity(self.bank.marker(Marker::End)?)?;
        if end_similarity + self.bank.config().end_margin >= matched.similarity {
            tracing::trace!(
                index,
                end = end_similarity,
                best = matched.similarity,
                "end sentinel reached"
            );
            return Ok(Slot::End);
        }
        Ok(Slot::Item { matched, candidate })
    }

    fn choose(
        &self,
        candidate: &HdVector,
        category: MemoryCategory,
        matched: &Match,
        decode_noise: bool,
    ) -> Result<HdVector> {
        if decode_noise {
            Ok(candidate.clone())
        } else {
            self.stored(category, matched)
        }
    }

    fn stored(&self, category: MemoryCategory, matched: &Match) -> Result<HdVector> {
        Ok(self.bank.memory(category).get(&matched.name)?.clone())
    }
}

/// Role loops never need more slots than there are labels, plus the end.
fn role_cap(max_iterations: usize) -> usize {
    max_iterations.min(RoleLabel::COUNT + 1)
}
