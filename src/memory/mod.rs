//! Item memories.
//!
//! Content-addressable stores of named vectors:
//! - **Append-only** entries keyed by structured, deterministic names
//! - **Nearest-neighbour clean-up** to strip superposition noise
//! - **Threshold search** to recover every member of a bundle
//! - **One memory per category** so unrelated entries never compete

pub mod bank;
pub mod item_memory;

pub use bank::{MemoryBank, MemoryCategory, Marker};
pub use item_memory::{ItemMemory, Match};
