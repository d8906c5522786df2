//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use murmur_core::{completion::Completion, turn::Turn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result, config::AssistantConfig};

const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

/// Model and sampling parameters sent with every request.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
  pub base_url:    String,
  pub api_key:     String,
  pub model:       String,
  pub max_tokens:  u32,
  pub temperature: f32,
}

impl From<&AssistantConfig> for CompletionSettings {
  fn from(cfg: &AssistantConfig) -> Self {
    Self {
      base_url:    cfg.openai_base_url.clone(),
      api_key:     cfg.openai_api_key.clone(),
      model:       cfg.openai_model.clone(),
      max_tokens:  cfg.max_tokens,
      temperature: cfg.temperature,
    }
  }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:       &'a str,
  messages:    &'a [Turn],
  max_tokens:  u32,
  temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  #[serde(default)]
  content: Option<String>,
}

/// `POST {base_url}/chat/completions` with a bearer key.
#[derive(Clone)]
pub struct OpenAiClient {
  client:   Client,
  settings: CompletionSettings,
}

impl OpenAiClient {
  pub fn new(settings: CompletionSettings) -> Result<Self> {
    let client = Client::builder().timeout(COMPLETION_TIMEOUT).build()?;
    Ok(Self { client, settings })
  }

  fn url(&self) -> String {
    format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
  }
}

impl Completion for OpenAiClient {
  type Error = Error;

  async fn complete(&self, turns: &[Turn]) -> Result<String> {
    let body = ChatRequest {
      model:       &self.settings.model,
      messages:    turns,
      max_tokens:  self.settings.max_tokens,
      temperature: self.settings.temperature,
    };
    debug!(model = %self.settings.model, turns = turns.len(), "requesting completion");

    let resp = self
      .client
      .post(self.url())
      .bearer_auth(&self.settings.api_key)
      .json(&body)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default().chars().take(240).collect();
      return Err(Error::CompletionStatus { status, body });
    }

    let parsed: ChatResponse = resp.json().await?;
    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .ok_or(Error::EmptyCompletion)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};
  use serde_json::{Value, json};
  use tokio::net::TcpListener;

  use super::*;

  async fn fake_api(reply: Value, status: u16) -> (OpenAiClient, Arc<Mutex<Vec<(String, Value)>>>) {
    let seen: Arc<Mutex<Vec<(String, Value)>>> = Arc::default();
    let app = Router::new()
      .route(
        "/v1/chat/completions",
        post(
          move |State(seen): State<Arc<Mutex<Vec<(String, Value)>>>>,
                headers: HeaderMap,
                Json(body): Json<Value>| async move {
            let auth = headers["authorization"].to_str().unwrap().to_string();
            seen.lock().unwrap().push((auth, body));
            (axum::http::StatusCode::from_u16(status).unwrap(), Json(reply))
          },
        ),
      )
      .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let client = OpenAiClient::new(CompletionSettings {
      base_url:    format!("http://{addr}/v1/"),
      api_key:     "sk-test".into(),
      model:       "gpt-test".into(),
      max_tokens:  1000,
      temperature: 0.7,
    })
    .unwrap();
    (client, seen)
  }

  #[tokio::test]
  async fn sends_full_transcript_and_returns_first_choice() {
    let (client, seen) = fake_api(
      json!({ "choices": [{ "index": 0, "message": { "role": "assistant", "content": "Hello!" } }] }),
      200,
    )
    .await;

    let turns = [Turn::system("ctx"), Turn::user("hi")];
    assert_eq!(client.complete(&turns).await.unwrap(), "Hello!");

    let seen = seen.lock().unwrap();
    let (auth, body) = &seen[0];
    assert_eq!(auth, "Bearer sk-test");
    assert_eq!(body["model"], "gpt-test");
    assert_eq!(body["max_tokens"], 1000);
    assert_eq!(
      body["messages"],
      json!([{ "role": "system", "content": "ctx" }, { "role": "user", "content": "hi" }])
    );
  }

  #[tokio::test]
  async fn error_status_is_reported() {
    let (client, _) = fake_api(json!({ "error": { "message": "bad key" } }), 401).await;
    let err = client.complete(&[Turn::user("hi")]).await.unwrap_err();
    assert!(
      matches!(&err, Error::CompletionStatus { status, body } if status.as_u16() == 401 && body.contains("bad key")),
      "{err}"
    );
  }

  #[tokio::test]
  async fn empty_choices_is_an_error() {
    let (client, _) = fake_api(json!({ "choices": [] }), 200).await;
    assert!(matches!(client.complete(&[Turn::user("hi")]).await, Err(Error::EmptyCompletion)));
  }
}
