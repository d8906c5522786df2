//! The auth → subscribe → ack → event handshake, without any I/O.
//!
//! [`Subscriber`] is fed decoded server messages one at a time and answers
//! with a [`Step`]: a frame to send, a notification, an event to deliver, or
//! nothing. The socket loop in [`crate::ws`] is a thin driver around it.

use crate::{
  Error, Result,
  message::{ClientMessage, Event, ServerMessage},
};

/// The command id used for the session's single subscription.
pub const SUBSCRIPTION_ID: u64 = 1;

/// Where the handshake currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
  /// Connected; waiting for `auth_required`.
  Connected,
  /// `auth` sent; waiting for `auth_ok`.
  Authenticating,
  /// `subscribe_events` sent; waiting for the matching `result`.
  Subscribing,
  /// Acknowledged; events are being delivered.
  Subscribed,
  /// The hub rejected the token or the subscription.
  Failed,
}

/// What the driver should do after a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
  Send(ClientMessage),
  /// The subscription was acknowledged.
  Subscribed,
  Deliver(Event),
  Ignore,
}

/// Handshake and filter for one event subscription.
pub struct Subscriber {
  access_token: String,
  event_type:   String,
  id:           u64,
  state:        State,
}

impl Subscriber {
  pub fn new(access_token: impl Into<String>, event_type: impl Into<String>) -> Self {
    Self {
      access_token: access_token.into(),
      event_type:   event_type.into(),
      id:           SUBSCRIPTION_ID,
      state:        State::Connected,
    }
  }

  pub fn state(&self) -> State { self.state }

  /// Advance on one server message.
  ///
  /// Errors are terminal: the hub rejected the token or the subscription.
  pub fn handle(&mut self, message: ServerMessage) -> Result<Step> {
    match (self.state, message) {
      (State::Connected, ServerMessage::AuthRequired { .. }) => {
        self.state = State::Authenticating;
        Ok(Step::Send(ClientMessage::Auth { access_token: self.access_token.clone() }))
      }
      (State::Authenticating, ServerMessage::AuthOk { .. }) => {
        self.state = State::Subscribing;
        Ok(Step::Send(ClientMessage::SubscribeEvents {
          id:         self.id,
          event_type: self.event_type.clone(),
        }))
      }
      (_, ServerMessage::AuthInvalid { message }) => {
        self.state = State::Failed;
        Err(Error::AuthRejected(message.unwrap_or_default()))
      }
      (State::Subscribing, ServerMessage::Result { id, success, error }) if id == self.id => {
        if success {
          self.state = State::Subscribed;
          Ok(Step::Subscribed)
        } else {
          self.state = State::Failed;
          let reason = error.map(|e| format!("{}: {}", e.code, e.message)).unwrap_or_default();
          Err(Error::SubscriptionRejected { id, reason })
        }
      }
      (State::Subscribing | State::Subscribed, ServerMessage::Event { id, event })
        if id == self.id && event.event_type == self.event_type =>
      {
        Ok(Step::Deliver(event))
      }
      _ => Ok(Step::Ignore),
    }
  }
}
