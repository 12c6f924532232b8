//! Memory bank: the partitioned set of item memories one session works on.
//!
//! Each semantic category gets its own memory so that clean-up searches
//! never match across categories:
//! 1. Alphabet letters (pre-minted: ASCII letters, punctuation, digits)
//! 2. Words, synsets and synset bundles
//! 3. Role labels (pre-minted, one per [`RoleLabel`]), full roles, role lists
//! 4. Steps and scripts
//! 5. Markers (shift, slot, sense and end-sentinel vectors, pre-minted)

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::CodecConfig;
use crate::error::Result;
use crate::memory::item_memory::ItemMemory;
use crate::script::RoleLabel;
use crate::vsa::{Algebra, HdVector};

/// Characters with a pre-built alphabet vector.
pub const ALPHABET: &str = concat!(
    "abcdefghijklmnopqrstuvwxyz",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~",
    "0123456789",
);

/// The logical memories of a bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryCategory {
    Alphabet,
    Words,
    Synsets,
    SynsetBundles,
    RoleLabels,
    Roles,
    RoleLists,
    Steps,
    Scripts,
    Markers,
}

impl MemoryCategory {
    pub const ALL: [MemoryCategory; 10] = [
        MemoryCategory::Alphabet,
        MemoryCategory::Words,
        MemoryCategory::Synsets,
        MemoryCategory::SynsetBundles,
        MemoryCategory::RoleLabels,
        MemoryCategory::Roles,
        MemoryCategory::RoleLists,
        MemoryCategory::Steps,
        MemoryCategory::Scripts,
        MemoryCategory::Markers,
    ];

    /// Human-readable memory name.
    pub fn label(self) -> &'static str {
        match self {
            MemoryCategory::Alphabet => "Alphabet",
            MemoryCategory::Words => "Words",
            MemoryCategory::Synsets => "Synsets",
            MemoryCategory::SynsetBundles => "Synset bundles",
            MemoryCategory::RoleLabels => "Role labels",
            MemoryCategory::Roles => "Roles",
            MemoryCategory::RoleLists => "Role lists",
            MemoryCategory::Steps => "Steps",
            MemoryCategory::Scripts => "Scripts",
            MemoryCategory::Markers => "Markers",
        }
    }
}

/// Reserved utility vectors used as slot keys and sequence markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Base of the step-position powers.
    ShiftStep,
    /// Base of the role-position powers.
    ShiftRole,
    /// Slot key of a step's action.
    Action,
    /// Slot key of a role's label.
    RoleLabel,
    /// Slot key of a step's role list.
    RoleList,
    /// Slot key of a role's filler bundle.
    Filler,
    /// End-of-sequence sentinel.
    End,
    /// Base of the sense-index powers that key a synset's word bundle.
    Sense,
}

impl Marker {
    pub const ALL: [Marker; 8] = [
        Marker::ShiftStep,
        Marker::ShiftRole,
        Marker::Action,
        Marker::RoleLabel,
        Marker::RoleList,
        Marker::Filler,
        Marker::End,
        Marker::Sense,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Marker::ShiftStep => "shift_step",
            Marker::ShiftRole => "shift_role",
            Marker::Action => "action",
            Marker::RoleLabel => "role_label",
            Marker::RoleList => "role_list",
            Marker::Filler => "filler",
            Marker::End => "end",
            Marker::Sense => "sense",
        }
    }
}

/// The serialisable part of a bank.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct Memories {
    alphabet: ItemMemory,
    words: ItemMemory,
    synsets: ItemMemory,
    synset_bundles: ItemMemory,
    role_labels: ItemMemory,
    roles: ItemMemory,
    role_lists: ItemMemory,
    steps: ItemMemory,
    scripts: ItemMemory,
    markers: ItemMemory,
}

impl Memories {
    fn empty(config: &CodecConfig) -> Self {
        let make = |category: MemoryCategory| {
            ItemMemory::new(category.label(), config.dim)
                .with_parallel_min(config.parallel_search_min)
        };
        Self {
            alphabet: make(MemoryCategory::Alphabet),
            words: make(MemoryCategory::Words),
            synsets: make(MemoryCategory::Synsets),
            synset_bundles: make(MemoryCategory::SynsetBundles),
            role_labels: make(MemoryCategory::RoleLabels),
            roles: make(MemoryCategory::Roles),
            role_lists: make(MemoryCategory::RoleLists),
            steps: make(MemoryCategory::Steps),
            scripts: make(MemoryCategory::Scripts),
            markers: make(MemoryCategory::Markers),
        }
    }

    fn total_len(&self) -> usize {
        MemoryCategory::ALL
            .iter()
            .map(|&c| self.get(c).len())
            .sum()
    }

    fn get(&self, category: MemoryCategory) -> &ItemMemory {
        match category {
            MemoryCategory::Alphabet => &self.alphabet,
            MemoryCategory::Words => &self.words,
            MemoryCategory::Synsets => &self.synsets,
            MemoryCategory::SynsetBundles => &self.synset_bundles,
            MemoryCategory::RoleLabels => &self.role_labels,
            MemoryCategory::Roles => &self.roles,
            MemoryCategory::RoleLists => &self.role_lists,
            MemoryCategory::Steps => &self.steps,
            MemoryCategory::Scripts => &self.scripts,
            MemoryCategory::Markers => &self.markers,
        }
    }

    fn get_mut(&mut self, category: MemoryCategory) -> &mut ItemMemory {
        match category {
            MemoryCategory::Alphabet => &mut self.alphabet,
            MemoryCategory::Words => &mut self.words,
            MemoryCategory::Synsets => &mut self.synsets,
            MemoryCategory::SynsetBundles => &mut self.synset_bundles,
            MemoryCategory::RoleLabels => &mut self.role_labels,
            MemoryCategory::Roles => &mut self.roles,
            MemoryCategory::RoleLists => &mut self.role_lists,
            MemoryCategory::Steps => &mut self.steps,
            MemoryCategory::Scripts => &mut self.scripts,
            MemoryCategory::Markers => &mut self.markers,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    config: CodecConfig,
    memories: Memories,
}

/// All item memories of one encode/decode session, plus the algebra and
/// random source used to mint new vectors.
pub struct MemoryBank {
    config: CodecConfig,
    algebra: Algebra,
    rng: StdRng,
    memories: Memories,
}

impl MemoryBank {
    /// Create a bank with the alphabet, role labels and markers pre-minted.
    pub fn new(config: &CodecConfig) -> Result<Self> {
        config.validate()?;
        let algebra = Algebra::new(config.dim)?;
        let mut rng = session_rng(config.seed, 0);
        let mut memories = Memories::empty(config);

        let letters: Vec<String> = ALPHABET.chars().map(String::from).collect();
        memories
            .alphabet
            .append_batch(&letters, &algebra, &mut rng)?;

        let labels: Vec<&str> = RoleLabel::ALL.iter().map(|r| r.as_str()).collect();
        memories
            .role_labels
            .append_batch(&labels, &algebra, &mut rng)?;

        let markers: Vec<&str> = Marker::ALL.iter().map(|m| m.name()).collect();
        memories
            .markers
            .append_batch(&markers, &algebra, &mut rng)?;

        tracing::debug!(
            dim = config.dim,
            letters = memories.alphabet.len(),
            labels = memories.role_labels.len(),
            "memory bank initialised"
        );

        Ok(Self {
            config: config.clone(),
            algebra,
            rng,
            memories,
        })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn algebra(&self) -> &Algebra {
        &self.algebra
    }

    pub fn dim(&self) -> usize {
        self.config.dim
    }

    /// One logical memory.
    pub fn memory(&self, category: MemoryCategory) -> &ItemMemory {
        self.memories.get(category)
    }

    pub fn memory_mut(&mut self, category: MemoryCategory) -> &mut ItemMemory {
        self.memories.get_mut(category)
    }

    /// A reserved marker vector.
    pub fn marker(&self, marker: Marker) -> Result<&HdVector> {
        self.memories.markers.get(marker.name())
    }

    /// Position key `power(shift, i + POSITION_OFFSET)` for a sequence slot.
    pub fn position(&self, shift: Marker, index: usize) -> Result<HdVector> {
        let base = self.marker(shift)?;
        let exponent = (index + crate::config::POSITION_OFFSET) as i32;
        self.algebra.power(base, exponent)
    }

    /// Key of sense index `sense`: `power(sense_marker, sense + POSITION_OFFSET)`.
    pub fn sense_key(&self, sense: usize) -> Result<HdVector> {
        self.position(Marker::Sense, sense)
    }

    /// Auto-vivify an entry in `category` from the session random source.
    pub fn get_or_create(&mut self, category: MemoryCategory, name: &str) -> Result<HdVector> {
        let memory = self.memories.get_mut(category);
        memory.get_or_create(name, &self.algebra, &mut self.rng)
    }

    /// Entry counts per memory, in category order.
    pub fn sizes(&self) -> Vec<(MemoryCategory, usize)> {
        MemoryCategory::ALL
            .iter()
            .map(|&c| (c, self.memories.get(c).len()))
            .collect()
    }

    /// Serialise the configuration and every memory with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let snapshot = SnapshotRef {
            config: &self.config,
            memories: &self.memories,
        };
        Ok(bincode::serialize(&snapshot)?)
    }

    /// Restore a bank from [`MemoryBank::to_bytes`] output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: Snapshot = bincode::deserialize(bytes)?;
        snapshot.config.validate()?;
        let algebra = Algebra::new(snapshot.config.dim)?;
        let rng = session_rng(snapshot.config.seed, snapshot.memories.total_len());
        Ok(Self {
            config: snapshot.config,
            algebra,
            rng,
            memories: snapshot.memories,
        })
    }

    /// Write the bank to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Read a bank written by [`MemoryBank::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    config: &'a CodecConfig,
    memories: &'a Memories,
}

/// Random source for minting. A restored bank continues from a different
/// stream so it never re-mints vectors it already holds.
fn session_rng(seed: Option<u64>, minted: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(minted as u64)),
        None => StdRng::from_entropy(),
    }
}
