//! Client for the home-automation hub's event bus.
//!
//! - [`message`]: the JSON messages exchanged over the WebSocket API.
//! - [`session`]: the auth/subscribe handshake as a sans-io state machine.
//! - [`ws`]: an async listener that drives the handshake over a socket.
//! - [`rest`]: the REST endpoints (events, states, history, services) and the
//!   [`murmur_core::hub::Hub`] implementation built on them.

pub mod error;
pub mod message;
pub mod rest;
pub mod session;
pub mod ws;

pub use error::{Error, Result};
pub use rest::HubClient;

/// Where the hub lives and how to authenticate against it.
#[derive(Debug, Clone)]
pub struct HubConfig {
  /// Base URL, e.g. `http://localhost:8123`. A trailing slash is ignored.
  pub base_url:     String,
  /// Long-lived access token sent as a bearer token and in the WebSocket
  /// `auth` message.
  pub access_token: String,
}

impl HubConfig {
  pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
    Self { base_url: base_url.into(), access_token: access_token.into() }
  }

  /// `http(s)://host` → `ws(s)://host/api/websocket`.
  pub fn websocket_url(&self) -> String {
    let base = self.base_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
      format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
      format!("ws://{rest}")
    } else {
      base.to_string()
    };
    format!("{base}/api/websocket")
  }
}
