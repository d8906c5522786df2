//! Error type for `murmur-assistant`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid configuration: {0}")]
  Config(String),

  #[error("malformed utterance event: {0}")]
  MalformedEvent(String),

  #[error("hub error: {0}")]
  Hub(#[from] murmur_hub::Error),

  #[error("transcript error: {0}")]
  Transcript(#[from] murmur_transcript::Error),

  #[error("completion request failed: {0}")]
  Completion(#[from] reqwest::Error),

  #[error("completion API returned {status}: {body}")]
  CompletionStatus {
    status: reqwest::StatusCode,
    body:   String,
  },

  #[error("completion API returned no message")]
  EmptyCompletion,

  #[error("password hashing failed: {0}")]
  PasswordHash(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
