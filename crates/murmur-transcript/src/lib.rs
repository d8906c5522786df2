//! File-backed persistence for the conversation transcript.
//!
//! The whole transcript is rewritten on every save: serialised to a sibling
//! temporary file, then renamed over the target so a crash never leaves a
//! half-written transcript behind.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::TranscriptFile;

#[cfg(test)]
mod tests;
