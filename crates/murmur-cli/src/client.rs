//! Hub plumbing for the chat window: one sender, one listener.
//!
//! Neither touches the UI directly. Everything they learn is pushed onto an
//! [`Incoming`] channel that the render loop drains every frame.

use murmur_core::hub::{RESPONSE_EVENT, UTTERANCE_EVENT};
use murmur_hub::{HubClient, HubConfig};
use serde_json::json;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

/// Something the hub side has to say to the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
  /// `data.text` of a response event.
  Reply(String),
  /// An utterance could not be posted.
  SendFailed(String),
  /// The listener stopped; `Some` carries the error.
  ListenerClosed(Option<String>),
}

/// Posts utterances without blocking the caller.
#[derive(Clone)]
pub struct Sender {
  hub: HubClient,
  tx:  UnboundedSender<Incoming>,
}

impl Sender {
  pub fn new(hub: HubClient, tx: UnboundedSender<Incoming>) -> Self { Self { hub, tx } }

  /// Fire one utterance on its own task. Failures come back as
  /// [`Incoming::SendFailed`].
  pub fn send(&self, text: String) {
    let this = self.clone();
    tokio::spawn(async move {
      info!(%text, "posting {UTTERANCE_EVENT}");
      if let Err(e) = this.hub.post_event(UTTERANCE_EVENT, &json!({ "text": text })).await {
        error!(error = %e, "failed to post utterance");
        let _ = this.tx.send(Incoming::SendFailed(e.to_string()));
      }
    });
  }
}

/// Subscribe to response events for the lifetime of the connection.
pub fn spawn_listener(config: HubConfig, tx: UnboundedSender<Incoming>) {
  tokio::spawn(async move {
    let replies = tx.clone();
    let result = murmur_hub::ws::listen(&config, RESPONSE_EVENT, move |event| {
      if let Some(text) = event.text() {
        let _ = replies.send(Incoming::Reply(text.to_string()));
      }
    })
    .await;

    let reason = match result {
      Ok(()) => None,
      Err(e) => {
        error!(error = %e, "listener stopped");
        Some(e.to_string())
      }
    };
    let _ = tx.send(Incoming::ListenerClosed(reason));
  });
}
