//! Messages of the hub's WebSocket API.
//!
//! Every frame is a JSON object discriminated by its `type` field. Only the
//! handful of types the subscription handshake needs are modelled; anything
//! else decodes to [`ServerMessage::Unknown`] and is ignored upstream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

// ─── Server → client ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
  /// First frame after connecting.
  AuthRequired {
    #[serde(default)]
    ha_version: Option<String>,
  },
  AuthOk {
    #[serde(default)]
    ha_version: Option<String>,
  },
  AuthInvalid {
    #[serde(default)]
    message: Option<String>,
  },
  /// Reply to a numbered command such as `subscribe_events`.
  Result {
    id:      u64,
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    error:   Option<ResultError>,
  },
  /// An event delivered on subscription `id`.
  Event { id: u64, event: Event },
  Pong { id: u64 },
  #[serde(other)]
  Unknown,
}

fn default_success() -> bool { true }

impl ServerMessage {
  /// Decode one text frame.
  pub fn decode(frame: &str) -> Result<Self> { Ok(serde_json::from_str(frame)?) }
}

/// The `error` object of a failed `result`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultError {
  #[serde(default)]
  pub code:    String,
  #[serde(default)]
  pub message: String,
}

/// A bus event as pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
  pub event_type: String,
  #[serde(default)]
  pub data:       Value,
  /// Correlation object (`{id, parent_id, user_id}`) attached by the hub.
  #[serde(default)]
  pub context:    Option<Value>,
  #[serde(default)]
  pub origin:     Option<String>,
  #[serde(default)]
  pub time_fired: Option<String>,
}

impl Event {
  /// `data.text`, if present and a string.
  pub fn text(&self) -> Option<&str> { self.data.get("text").and_then(Value::as_str) }
}

// ─── Client → server ─────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
  Auth { access_token: String },
  SubscribeEvents { id: u64, event_type: String },
}

impl ClientMessage {
  /// Encode as one text frame.
  pub fn encode(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }
}

// Keeps the access token out of logs.
impl std::fmt::Debug for ClientMessage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Auth { .. } => f.debug_struct("Auth").field("access_token", &"<redacted>").finish(),
      Self::SubscribeEvents { id, event_type } => f
        .debug_struct("SubscribeEvents")
        .field("id", id)
        .field("event_type", event_type)
        .finish(),
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn decodes_handshake_frames() {
    assert_eq!(
      ServerMessage::decode(r#"{"type":"auth_required","ha_version":"2025.7.1"}"#).unwrap(),
      ServerMessage::AuthRequired { ha_version: Some("2025.7.1".into()) }
    );
    assert_eq!(
      ServerMessage::decode(r#"{"type":"auth_invalid","message":"Invalid password"}"#).unwrap(),
      ServerMessage::AuthInvalid { message: Some("Invalid password".into()) }
    );
    assert_eq!(
      ServerMessage::decode(r#"{"id":1,"type":"result","success":true,"result":null}"#).unwrap(),
      ServerMessage::Result { id: 1, success: true, error: None }
    );
  }

  #[test]
  fn decodes_event_with_context() {
    let frame = json!({
      "id": 1,
      "type": "event",
      "event": {
        "event_type": "conversation_response",
        "data": { "text": "Turning on the fan." },
        "origin": "REMOTE",
        "time_fired": "2025-07-08T12:00:00.000000+00:00",
        "context": { "id": "01J2", "parent_id": null, "user_id": "abc" }
      }
    })
    .to_string();

    let ServerMessage::Event { id, event } = ServerMessage::decode(&frame).unwrap() else {
      panic!("expected event");
    };
    assert_eq!(id, 1);
    assert_eq!(event.event_type, "conversation_response");
    assert_eq!(event.text(), Some("Turning on the fan."));
    assert_eq!(event.context.unwrap()["id"], "01J2");
  }

  #[test]
  fn unknown_type_is_not_an_error() {
    assert_eq!(
      ServerMessage::decode(r#"{"type":"something_new","x":1}"#).unwrap(),
      ServerMessage::Unknown
    );
  }

  #[test]
  fn garbage_is_an_error() {
    assert!(ServerMessage::decode("not json").is_err());
  }

  #[test]
  fn encodes_client_frames() {
    let auth = ClientMessage::Auth { access_token: "secret".into() }.encode().unwrap();
    assert_eq!(
      serde_json::from_str::<Value>(&auth).unwrap(),
      json!({ "type": "auth", "access_token": "secret" })
    );

    let sub = ClientMessage::SubscribeEvents { id: 1, event_type: "conversation_response".into() }
      .encode()
      .unwrap();
    assert_eq!(
      serde_json::from_str::<Value>(&sub).unwrap(),
      json!({ "id": 1, "type": "subscribe_events", "event_type": "conversation_response" })
    );
  }

  #[test]
  fn debug_redacts_token() {
    let dbg = format!("{:?}", ClientMessage::Auth { access_token: "secret".into() });
    assert!(!dbg.contains("secret"), "{dbg}");
  }
}
