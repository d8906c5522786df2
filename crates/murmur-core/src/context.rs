//! Prompt context: device states and optional history, rendered as text.
//!
//! Nothing here is persisted. A [`ContextSnapshot`] is rebuilt from the hub on
//! every utterance and flattened into the system turn.

use serde::{Deserialize, Serialize};

/// Rendered in place of a state the hub could not report.
pub const UNKNOWN_STATE: &str = "unknown";

/// Shown under the history heading when a range was requested but nothing
/// came back.
pub const NO_HISTORY: &str = "No history data found for that range.";

/// Default instructions prepended to every system turn.
pub const DEFAULT_PREAMBLE: &str = "You are a multi-tool home assist, browser \
  assist, and helpful acolyte. Provide clear, brief, helpful, and direct \
  answers. Use the following context to answer:";

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The last known state of one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityState {
  pub entity_id: String,
  pub state:     String,
}

/// Device states in the configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextSnapshot {
  entries: Vec<EntityState>,
}

impl ContextSnapshot {
  pub fn new() -> Self { Self::default() }

  /// Record `entity_id`'s state, or [`UNKNOWN_STATE`] when `None`.
  pub fn insert(&mut self, entity_id: impl Into<String>, state: Option<String>) {
    self.entries.push(EntityState {
      entity_id: entity_id.into(),
      state:     state.unwrap_or_else(|| UNKNOWN_STATE.to_string()),
    });
  }

  /// One `<entity>: <state>` line per device.
  pub fn render(&self) -> String {
    self
      .entries
      .iter()
      .map(|e| format!("{}: {}", e.entity_id, e.state))
      .collect::<Vec<_>>()
      .join("\n")
  }
}

// ─── History ─────────────────────────────────────────────────────────────────

/// One state change from a history query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPoint {
  pub time:  String,
  pub value: String,
}

/// The result of a history query, ready to be rendered into the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySummary {
  pub entity_id: String,
  pub points:    Vec<HistoryPoint>,
}

impl HistorySummary {
  /// Heading plus one `<time>: <value>` line per point, or [`NO_HISTORY`].
  pub fn render(&self) -> String {
    let body = if self.points.is_empty() {
      NO_HISTORY.to_string()
    } else {
      self
        .points
        .iter()
        .map(|p| format!("{}: {}", p.time, p.value))
        .collect::<Vec<_>>()
        .join("\n")
    };
    format!("History for {} (requested):\n{body}", self.entity_id)
  }
}

// ─── System prompt ───────────────────────────────────────────────────────────

/// Build the content of the system turn for one utterance.
pub fn system_prompt(
  preamble: &str,
  snapshot: &ContextSnapshot,
  history: Option<&HistorySummary>,
) -> String {
  let mut context = snapshot.render();
  if let Some(history) = history {
    context.push_str("\n\n");
    context.push_str(&history.render());
  }
  format!("{preamble}\n{context}")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn snapshot() -> ContextSnapshot {
    let mut s = ContextSnapshot::new();
    s.insert("sensor.temperature", Some("21.5".into()));
    s.insert("switch.fan", None);
    s
  }

  #[test]
  fn snapshot_renders_in_insertion_order() {
    assert_eq!(snapshot().render(), "sensor.temperature: 21.5\nswitch.fan: unknown");
  }

  #[test]
  fn empty_history_renders_placeholder() {
    let h = HistorySummary { entity_id: "sensor.humidity".into(), points: vec![] };
    assert_eq!(h.render(), format!("History for sensor.humidity (requested):\n{NO_HISTORY}"));
  }

  #[test]
  fn system_prompt_appends_history_after_states() {
    let h = HistorySummary {
      entity_id: "sensor.humidity".into(),
      points:    vec![
        HistoryPoint { time: "2025-07-08T01:00:00Z".into(), value: "40".into() },
        HistoryPoint { time: "2025-07-08T02:00:00Z".into(), value: "42".into() },
      ],
    };
    let prompt = system_prompt("Be brief:", &snapshot(), Some(&h));
    assert_eq!(
      prompt,
      "Be brief:\n\
       sensor.temperature: 21.5\n\
       switch.fan: unknown\n\
       \n\
       History for sensor.humidity (requested):\n\
       2025-07-08T01:00:00Z: 40\n\
       2025-07-08T02:00:00Z: 42"
    );
  }

  #[test]
  fn system_prompt_without_history() {
    let prompt = system_prompt(DEFAULT_PREAMBLE, &snapshot(), None);
    assert!(prompt.starts_with(DEFAULT_PREAMBLE));
    assert!(prompt.ends_with("switch.fan: unknown"));
    assert!(!prompt.contains("History"));
  }
}
