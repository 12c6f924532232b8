//! Item memory: a named, append-only, content-addressable vector store.
//!
//! Given a query vector, find the most similar stored entries. The scan is
//! linear in the number of entries; memories are bounded by vocabulary size,
//! so there is no index. Large memories are scanned in parallel with rayon.

use std::cmp::Ordering;
use std::collections::HashMap;

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PARALLEL_SEARCH_MIN;
use crate::error::{Result, VsaError};
use crate::vsa::{Algebra, HdVector};

/// Result of a memory search.
#[derive(Clone, Debug, PartialEq)]
pub struct Match {
    /// Insertion index of the entry.
    pub index: usize,

    /// Name of the matching entry.
    pub name: String,

    /// Cosine similarity between the query and the entry.
    pub similarity: f64,
}

/// Named store of vectors sharing one dimension.
///
/// Keys are unique. [`ItemMemory::set`] rejects an existing key; nothing
/// ever overwrites or removes an entry, so a vector returned once is
/// returned unchanged for the lifetime of the memory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemMemory {
    name: String,
    dim: usize,
    names: Vec<String>,
    vectors: Vec<HdVector>,
    index: HashMap<String, usize>,
    parallel_min: usize,
}

impl ItemMemory {
    /// Create an empty memory for vectors of dimension `dim`.
    pub fn new(name: &str, dim: usize) -> Self {
        Self {
            name: name.to_string(),
            dim,
            names: Vec::new(),
            vectors: Vec::new(),
            index: HashMap::new(),
            parallel_min: PARALLEL_SEARCH_MIN,
        }
    }

    /// Entry count from which searches are split across threads.
    pub fn with_parallel_min(mut self, parallel_min: usize) -> Self {
        self.parallel_min = parallel_min.max(1);
        self
    }

    /// Name of this memory (e.g. "Words").
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entry names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name of the entry at an insertion index.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Iterate over `(name, vector)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HdVector)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.vectors.iter())
    }

    /// Insert a new entry. Fails with `DuplicateKey` if the name exists.
    pub fn set(&mut self, name: &str, vector: HdVector) -> Result<()> {
        VsaError::check_dim(self.dim, vector.dim())?;
        if self.index.contains_key(name) {
            return Err(VsaError::DuplicateKey {
                memory: self.name.clone(),
                name: name.to_string(),
            });
        }
        self.index.insert(name.to_string(), self.vectors.len());
        self.names.push(name.to_string());
        self.vectors.push(vector);
        Ok(())
    }

    /// Exact lookup. Fails with `NotFound` if absent; never mints a vector.
    pub fn get(&self, name: &str) -> Result<&HdVector> {
        self.index
            .get(name)
            .map(|&i| &self.vectors[i])
            .ok_or_else(|| VsaError::NotFound {
                memory: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Return the stored vector, or compute it with `make` and store it.
    ///
    /// An existing entry is returned unchanged and `make` is not called.
    pub fn get_or_insert_with<F>(&mut self, name: &str, make: F) -> Result<HdVector>
    where
        F: FnOnce() -> Result<HdVector>,
    {
        if let Some(&i) = self.index.get(name) {
            return Ok(self.vectors[i].clone());
        }
        let vector = make()?;
        self.set(name, vector.clone())?;
        Ok(vector)
    }

    /// Auto-vivify: return the stored vector, or mint a fresh random one.
    ///
    /// This is the only operation that creates vectors on first use.
    pub fn get_or_create<R: Rng + ?Sized>(
        &mut self,
        name: &str,
        algebra: &Algebra,
        rng: &mut R,
    ) -> Result<HdVector> {
        VsaError::check_dim(self.dim, algebra.dim())?;
        if let Some(&i) = self.index.get(name) {
            return Ok(self.vectors[i].clone());
        }
        tracing::debug!(memory = %self.name, name, "minting new vector");
        let vector = algebra.generate(rng);
        self.set(name, vector.clone())?;
        Ok(vector)
    }

    /// Mint fresh random vectors for every name (existing names are kept).
    pub fn append_batch<R, S>(&mut self, names: &[S], algebra: &Algebra, rng: &mut R) -> Result<()>
    where
        R: Rng + ?Sized,
        S: AsRef<str>,
    {
        for name in names {
            self.get_or_create(name.as_ref(), algebra, rng)?;
        }
        Ok(())
    }

    /// Similarity of the query to every entry, in insertion order.
    pub fn similarities(&self, query: &HdVector) -> Result<Vec<f64>> {
        VsaError::check_dim(self.dim, query.dim())?;
        if self.vectors.len() >= self.parallel_min {
            self.vectors
                .par_iter()
                .map(|v| v.similarity(query))
                .collect()
        } else {
            self.vectors.iter().map(|v| v.similarity(query)).collect()
        }
    }

    /// Search for the entries most similar to `query`.
    ///
    /// Results are sorted by similarity, descending; ties keep insertion
    /// order. `threshold` drops entries below the cutoff and `top_k`
    /// truncates the list (`None` keeps everything above the threshold).
    pub fn search(
        &self,
        query: &HdVector,
        top_k: Option<usize>,
        threshold: Option<f64>,
    ) -> Result<Vec<Match>> {
        if self.is_empty() {
            return Err(VsaError::EmptyMemory {
                memory: self.name.clone(),
            });
        }
        let mut scored: Vec<Match> = self
            .similarities(query)?
            .into_iter()
            .enumerate()
            .filter(|(_, sim)| threshold.map_or(true, |t| *sim >= t))
            .map(|(i, similarity)| Match {
                index: i,
                name: self.names[i].clone(),
                similarity,
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });

        if let Some(k) = top_k {
            scored.truncate(k);
        }
        Ok(scored)
    }

    /// Nearest neighbour (clean-up). Fails only when the memory is empty.
    pub fn best(&self, query: &HdVector) -> Result<Match> {
        let sims = self.similarities(query)?;
        let (index, similarity) = sims
            .into_iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, s)| match best {
                Some((_, bs)) if bs >= s => best,
                _ => Some((i, s)),
            })
            .ok_or_else(|| VsaError::EmptyMemory {
                memory: self.name.clone(),
            })?;
        Ok(Match {
            index,
            name: self.names[index].clone(),
            similarity,
        })
    }
}
