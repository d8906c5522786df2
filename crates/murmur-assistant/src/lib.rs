//! Hub-side conversation assistant.
//!
//! Subscribes to utterance events on the hub's bus, answers each one through
//! a chat-completion model, performs the device actions the reply asks for,
//! and publishes the reply as a response event. Also exposes a small operator
//! HTTP API (see [`api`]).

pub mod api;
pub mod config;
pub mod error;
pub mod handler;
pub mod openai;

pub use config::AssistantConfig;
pub use error::{Error, Result};
pub use handler::{Assistant, Outcome, PromptSettings, Utterance};

use std::sync::Arc;

use murmur_core::{
  completion::Completion,
  hub::{Hub, UTTERANCE_EVENT},
  intent::IntentClassifier,
};
use murmur_hub::HubConfig;
use tracing::{info, warn};

/// Listen for utterances until the hub connection ends.
///
/// Each valid event is answered on its own task so the socket keeps being
/// read while a reply is in flight. Malformed events are logged and dropped.
pub async fn run_event_loop<H, C, I>(
  assistant: Arc<Assistant<H, C, I>>,
  hub: &HubConfig,
) -> Result<()>
where
  H: Hub + 'static,
  C: Completion + 'static,
  I: IntentClassifier + 'static,
{
  murmur_hub::ws::listen(hub, UTTERANCE_EVENT, |event| {
    match Utterance::from_event(&event) {
      Ok(utterance) => {
        info!(text = %utterance.text, "received {UTTERANCE_EVENT}");
        let assistant = Arc::clone(&assistant);
        tokio::spawn(async move {
          assistant.respond(utterance).await;
        });
      }
      Err(e) => warn!(error = %e, data = %event.data, "dropping {UTTERANCE_EVENT}"),
    }
  })
  .await?;
  Ok(())
}
