//! The utterance handler: receive, then respond.
//!
//! [`Utterance::from_event`] validates an inbound bus event.
//! [`Assistant::respond`] builds the prompt, calls the model, fires device
//! actions, emits the response event and persists the transcript. Every
//! failure inside `respond` degrades to a log line or an inline error reply;
//! it always emits exactly one response event.

use murmur_core::{
  completion::Completion,
  context::{ContextSnapshot, HistorySummary, system_prompt},
  hub::{Hub, RESPONSE_EVENT},
  intent::{DeviceAction, IntentClassifier},
  range::extract_range,
  turn::{Transcript, Turn},
};
use murmur_hub::message::Event;
use murmur_transcript::TranscriptFile;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::{Error, Result};

// ─── Utterance ───────────────────────────────────────────────────────────────

/// A validated request: the user's text and the hub context to answer on.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
  pub text:    String,
  pub context: Value,
}

impl Utterance {
  /// Require a string `data.text` and a context object carrying an `id`.
  ///
  /// The context is taken from `data.metadata.context` when the sender
  /// supplied one, otherwise from the context the hub attached to the event.
  pub fn from_event(event: &Event) -> Result<Self> {
    let text = event
      .text()
      .ok_or_else(|| Error::MalformedEvent("missing string field `text`".into()))?;
    let context = event
      .data
      .pointer("/metadata/context")
      .filter(|c| !c.is_null())
      .or(event.context.as_ref().filter(|c| !c.is_null()))
      .ok_or_else(|| Error::MalformedEvent("missing event context".into()))?;
    if context.get("id").is_none_or(Value::is_null) {
      return Err(Error::MalformedEvent("event context has no `id`".into()));
    }
    Ok(Self { text: text.to_string(), context: context.clone() })
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// What one call to [`Assistant::respond`] did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
  pub reply:             String,
  /// Actions that were requested, whether or not the hub accepted them.
  pub actions:           Vec<DeviceAction>,
  pub history_queried:   bool,
  pub completion_failed: bool,
}

// ─── Assistant ───────────────────────────────────────────────────────────────

/// Prompt inputs that do not change between utterances.
#[derive(Debug, Clone)]
pub struct PromptSettings {
  pub preamble:         String,
  pub context_entities: Vec<String>,
  pub history_entity:   String,
}

/// The hub-side conversation handler.
///
/// The transcript sits behind an async mutex held from the moment the
/// system turn is appended until the file is written, so concurrent
/// utterances are answered one at a time and never interleave. Readers see
/// `published`, a copy refreshed after each completed exchange, and never
/// wait on a model call.
pub struct Assistant<H, C, I> {
  hub:        H,
  completion: C,
  classifier: I,
  store:      TranscriptFile,
  settings:   PromptSettings,
  transcript: Mutex<Transcript>,
  published:  RwLock<Vec<Turn>>,
}

impl<H, C, I> Assistant<H, C, I>
where
  H: Hub,
  C: Completion,
  I: IntentClassifier,
{
  pub fn new(
    hub: H,
    completion: C,
    classifier: I,
    store: TranscriptFile,
    settings: PromptSettings,
    transcript: Transcript,
  ) -> Self {
    let published = RwLock::new(transcript.turns().to_vec());
    Self {
      hub,
      completion,
      classifier,
      store,
      settings,
      transcript: Mutex::new(transcript),
      published,
    }
  }

  /// The transcript as of the last completed exchange.
  pub async fn turns(&self) -> Vec<Turn> { self.published.read().await.clone() }

  /// Answer one utterance end to end.
  pub async fn respond(&self, utterance: Utterance) -> Outcome {
    let Utterance { text, context } = utterance;

    let history = self.requested_history(&text).await;
    let snapshot = self.snapshot().await;
    let system = system_prompt(&self.settings.preamble, &snapshot, history.as_ref());

    let mut transcript = self.transcript.lock().await;
    transcript.push(Turn::system(system));
    transcript.push(Turn::user(text.as_str()));
    info!(text = %text, "user request");

    let (reply, completion_failed) = match self.completion.complete(transcript.turns()).await {
      Ok(reply) => (reply, false),
      Err(e) => {
        error!(error = %e, "completion failed");
        (format!("Error contacting the language model: {e}"), true)
      }
    };

    let actions = self.classifier.classify(&reply);
    for action in &actions {
      self.perform(action).await;
    }

    info!(reply = %reply, context = %context, "firing {RESPONSE_EVENT}");
    if let Err(e) = self
      .hub
      .fire_event(RESPONSE_EVENT, json!({ "text": &reply, "context": context }))
      .await
    {
      error!(error = %e, "failed to fire {RESPONSE_EVENT}");
    }

    transcript.push(Turn::assistant(reply.as_str()));
    *self.published.write().await = transcript.turns().to_vec();
    match self.store.save(&transcript).await {
      Ok(()) => info!(turns = transcript.len(), "transcript saved"),
      Err(e) => error!(error = %e, "failed to save transcript"),
    }

    Outcome { reply, actions, history_queried: history.is_some(), completion_failed }
  }

  /// Query history when the text names a range. `None` when it does not.
  async fn requested_history(&self, text: &str) -> Option<HistorySummary> {
    let range = match extract_range(text) {
      Ok(Some(range)) => range,
      Ok(None) => return None,
      Err(e) => {
        warn!(error = %e, "ignoring unusable time range");
        return None;
      }
    };

    let entity_id = &self.settings.history_entity;
    info!(
      entity_id,
      start = range.start_literal(),
      end = range.end_literal(),
      "fetching history"
    );
    let points = match self.hub.history(entity_id, &range).await {
      Ok(points) => points,
      Err(e) => {
        error!(error = %e, "history query failed");
        Vec::new()
      }
    };
    Some(HistorySummary { entity_id: entity_id.clone(), points })
  }

  async fn snapshot(&self) -> ContextSnapshot {
    let mut snapshot = ContextSnapshot::new();
    for entity_id in &self.settings.context_entities {
      let state = match self.hub.get_state(entity_id).await {
        Ok(state) => state,
        Err(e) => {
          warn!(entity_id, error = %e, "state unavailable");
          None
        }
      };
      snapshot.insert(entity_id.as_str(), state);
    }
    snapshot
  }

  async fn perform(&self, action: &DeviceAction) {
    match self.hub.call_service(action).await {
      Ok(()) => info!(
        entity_id = action.entity_id(),
        domain = action.domain(),
        service = action.service(),
        "device action performed"
      ),
      Err(e) => warn!(entity_id = action.entity_id(), error = %e, "device action failed"),
    }
  }
}
