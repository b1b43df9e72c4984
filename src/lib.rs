//! Retrieval-augmented question answering over Russian legal texts.
//!
//! The pipeline: `scrape` builds an on-disk corpus from a URL list,
//! `ingest` splits it into overlapping chunks and rebuilds the vector
//! `index`, and `rag` answers questions by stuffing the top-k retrieved
//! chunks into a fixed legal-assistant prompt sent to an `llm` backend.
//! Front-ends are an interactive `cli` loop and a Telegram `bot` with
//! per-user `history` files.

pub mod bot;
pub mod cli;
pub mod config;
pub mod errors;
pub mod history;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod scrape;
