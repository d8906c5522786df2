//! Error type for `murmur-hub`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} {path} → {status}")]
  Status {
    method: &'static str,
    path:   String,
    status: reqwest::StatusCode,
  },

  #[error("websocket error: {0}")]
  WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("hub rejected the access token: {0}")]
  AuthRejected(String),

  #[error("hub rejected subscription {id}: {reason}")]
  SubscriptionRejected { id: u64, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
