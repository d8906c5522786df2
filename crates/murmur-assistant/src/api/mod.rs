//! Operator HTTP API.
//!
//! | Method | Path | Auth | Notes |
//! |--------|------|------|-------|
//! | `GET`  | `/health` | none | `{"status":"ok"}` |
//! | `GET`  | `/api/transcript` | Basic | current turns |
//! | `POST` | `/api/utterances` | Basic | body `{"text": ...}`; answers like a bus utterance |
//!
//! `/api/transcript` reflects completed exchanges only; turns of a request
//! still waiting on the model appear once its reply is recorded.

pub mod auth;
pub mod error;

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::{FromRef, State},
  routing::{get, post},
};
use murmur_core::{completion::Completion, hub::Hub, intent::IntentClassifier, turn::Turn};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub use auth::{AuthConfig, Authenticated};
pub use error::ApiError;

use crate::handler::{Assistant, Outcome, Utterance};

// ─── State ────────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<H, C, I> {
  pub assistant: Arc<Assistant<H, C, I>>,
  pub auth:      Arc<AuthConfig>,
}

impl<H, C, I> Clone for ApiState<H, C, I> {
  fn clone(&self) -> Self {
    Self { assistant: self.assistant.clone(), auth: self.auth.clone() }
  }
}

impl<H, C, I> FromRef<ApiState<H, C, I>> for Arc<AuthConfig> {
  fn from_ref(state: &ApiState<H, C, I>) -> Self { state.auth.clone() }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the operator router.
pub fn router<H, C, I>(state: ApiState<H, C, I>) -> Router
where
  H: Hub + 'static,
  C: Completion + 'static,
  I: IntentClassifier + 'static,
{
  Router::new()
    .route("/health", get(health))
    .route("/api/transcript", get(transcript::<H, C, I>))
    .route("/api/utterances", post(utterance::<H, C, I>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

/// `GET /api/transcript`
async fn transcript<H, C, I>(
  _auth: Authenticated,
  State(state): State<ApiState<H, C, I>>,
) -> Json<Vec<Turn>>
where
  H: Hub,
  C: Completion,
  I: IntentClassifier,
{
  Json(state.assistant.turns().await)
}

#[derive(Debug, Deserialize)]
pub struct UtteranceBody {
  pub text: String,
}

/// `POST /api/utterances` — body: `{"text":"..."}`
async fn utterance<H, C, I>(
  _auth: Authenticated,
  State(state): State<ApiState<H, C, I>>,
  Json(body): Json<UtteranceBody>,
) -> Result<Json<Outcome>, ApiError>
where
  H: Hub,
  C: Completion,
  I: IntentClassifier,
{
  let text = body.text.trim();
  if text.is_empty() {
    return Err(ApiError::BadRequest("text must not be empty".into()));
  }

  let context = json!({ "id": Uuid::new_v4().simple().to_string(), "parent_id": null, "user_id": null });
  let outcome = state.assistant.respond(Utterance { text: text.to_string(), context }).await;
  Ok(Json(outcome))
}
