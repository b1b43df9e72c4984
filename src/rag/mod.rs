//! Retrieval-augmented answering.
//!
//! `Assistant` ties the vector index, the embedding backend and the
//! generation backend together; `prompt` owns the persona template and
//! message assembly.

pub mod assistant;
pub mod prompt;

pub use assistant::Assistant;
