//! The `Hub` trait: everything the assistant needs from the home-automation
//! hub.
//!
//! Implemented over REST by `murmur-hub`. Tests substitute an in-memory fake.

use std::future::Future;

use serde_json::Value;

use crate::{context::HistoryPoint, intent::DeviceAction, range::TimeRange};

/// Event type carrying user text towards the assistant.
pub const UTTERANCE_EVENT: &str = "conversation_utterance";

/// Event type carrying replies back to the chat window.
pub const RESPONSE_EVENT: &str = "conversation_response";

/// Abstraction over the hub's state, history, service and event endpoints.
///
/// All methods return `Send` futures so implementations can be shared across
/// tokio tasks.
pub trait Hub: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Current state of `entity_id`. Returns `None` if the hub does not know
  /// the entity.
  fn get_state<'a>(
    &'a self,
    entity_id: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// State changes of `entity_id` within `range`, oldest first.
  fn history<'a>(
    &'a self,
    entity_id: &'a str,
    range: &'a TimeRange,
  ) -> impl Future<Output = Result<Vec<HistoryPoint>, Self::Error>> + Send + 'a;

  /// Invoke the service call described by `action`.
  fn call_service<'a>(
    &'a self,
    action: &'a DeviceAction,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Fire a custom event on the hub's bus.
  fn fire_event<'a>(
    &'a self,
    event_type: &'a str,
    data: Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
