//! Error types for `murmur-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid timestamp {value:?}: {source}")]
  InvalidTimestamp {
    value:  String,
    #[source]
    source: chrono::ParseError,
  },

  #[error("range ends before it starts: {start} > {end}")]
  InvertedRange { start: String, end: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
