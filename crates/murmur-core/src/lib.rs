//! Core types and trait definitions for murmur.
//!
//! No HTTP or filesystem dependencies. The hub client, the transcript store
//! and both binaries depend on it.

pub mod completion;
pub mod context;
pub mod error;
pub mod hub;
pub mod intent;
pub mod range;
pub mod turn;

pub use error::{Error, Result};
