//! Async HTTP client for the hub's REST API.

use std::time::Duration;

use murmur_core::{context::HistoryPoint, hub::Hub, intent::DeviceAction, range::TimeRange};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{Error, HubConfig, Result};

/// Firing an event is fire-and-forget; keep the sender snappy.
const EVENT_TIMEOUT: Duration = Duration::from_secs(5);
/// History, state and service calls.
const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Async HTTP client for the hub's REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HubClient {
  client: Client,
  config: HubConfig,
}

#[derive(Debug, Deserialize)]
struct RawState {
  state: String,
}

#[derive(Debug, Deserialize)]
struct RawHistoryEntry {
  last_changed: String,
  state:        String,
}

impl HubClient {
  pub fn new(config: HubConfig) -> Result<Self> {
    let client = Client::builder().timeout(QUERY_TIMEOUT).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    req.bearer_auth(&self.config.access_token)
  }

  // ── Events ────────────────────────────────────────────────────────────────

  /// `POST /api/events/<event_type>`
  pub async fn post_event(&self, event_type: &str, data: &Value) -> Result<()> {
    let path = format!("/events/{event_type}");
    let resp = self
      .auth(self.client.post(self.url(&path)))
      .timeout(EVENT_TIMEOUT)
      .json(data)
      .send()
      .await?;
    check(resp.status(), "POST", path)
  }

  // ── States ────────────────────────────────────────────────────────────────

  /// `GET /api/states/<entity_id>`; `None` on 404.
  pub async fn state(&self, entity_id: &str) -> Result<Option<String>> {
    let path = format!("/states/{entity_id}");
    let resp = self.auth(self.client.get(self.url(&path))).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    check(resp.status(), "GET", path)?;
    let raw: RawState = resp.json().await?;
    Ok(Some(raw.state))
  }

  // ── History ───────────────────────────────────────────────────────────────

  /// `GET /api/history/period/<start>?end_time=<end>&filter_entity_id=<id>`
  ///
  /// The hub answers with one array per entity; only the first is used.
  pub async fn entity_history(
    &self,
    entity_id: &str,
    range: &TimeRange,
  ) -> Result<Vec<HistoryPoint>> {
    let path = format!("/history/period/{}", range.start_literal());
    let resp = self
      .auth(self.client.get(self.url(&path)))
      .query(&[("end_time", range.end_literal()), ("filter_entity_id", entity_id)])
      .send()
      .await?;
    check(resp.status(), "GET", path)?;

    let series: Vec<Vec<RawHistoryEntry>> = resp.json().await?;
    let points: Vec<_> = series
      .into_iter()
      .next()
      .unwrap_or_default()
      .into_iter()
      .map(|e| HistoryPoint { time: e.last_changed, value: e.state })
      .collect();
    debug!(entity_id, count = points.len(), "history fetched");
    Ok(points)
  }

  // ── Services ──────────────────────────────────────────────────────────────

  /// `POST /api/services/<domain>/<service>`
  pub async fn call(&self, domain: &str, service: &str, data: &Value) -> Result<()> {
    let path = format!("/services/{domain}/{service}");
    let resp = self.auth(self.client.post(self.url(&path))).json(data).send().await?;
    check(resp.status(), "POST", path)
  }
}

fn check(status: StatusCode, method: &'static str, path: String) -> Result<()> {
  if status.is_success() { Ok(()) } else { Err(Error::Status { method, path, status }) }
}

impl Hub for HubClient {
  type Error = Error;

  async fn get_state(&self, entity_id: &str) -> Result<Option<String>> {
    self.state(entity_id).await
  }

  async fn history(&self, entity_id: &str, range: &TimeRange) -> Result<Vec<HistoryPoint>> {
    self.entity_history(entity_id, range).await
  }

  async fn call_service(&self, action: &DeviceAction) -> Result<()> {
    self.call(action.domain(), action.service(), &action.service_data()).await
  }

  async fn fire_event(&self, event_type: &str, data: Value) -> Result<()> {
    self.post_event(event_type, &data).await
  }
}
