//! Script ⇄ vector codec.
//!
//! [`Encoder`] folds a script into the memory bank bottom-up; [`Decoder`]
//! walks it back top-down from a name.

pub mod decoded;
pub mod decoder;
pub mod encoder;

pub use decoded::{Completion, DecodedRole, DecodedScript, DecodedStep, DecodedSynset, DecodedWord};
pub use decoder::Decoder;
pub use encoder::Encoder;
