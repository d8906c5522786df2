//! Mapping model replies to device actions.
//!
//! The handler never inspects reply text itself; it asks an
//! [`IntentClassifier`] for a list of [`DeviceAction`]s and executes them.
//! [`PhraseClassifier`] is the shipped implementation: case-insensitive
//! literal phrase rules.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

// ─── Actions ─────────────────────────────────────────────────────────────────

/// A single service call against the hub.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DeviceAction {
  /// `switch.turn_on`
  TurnOn { entity_id: String },
  /// `switch.turn_off`
  TurnOff { entity_id: String },
  /// `input_text.set_value` with an empty value.
  ClearText { entity_id: String },
}

impl DeviceAction {
  pub fn entity_id(&self) -> &str {
    match self {
      Self::TurnOn { entity_id }
      | Self::TurnOff { entity_id }
      | Self::ClearText { entity_id } => entity_id,
    }
  }

  /// Service domain, e.g. `switch`.
  pub fn domain(&self) -> &'static str {
    match self {
      Self::TurnOn { .. } | Self::TurnOff { .. } => "switch",
      Self::ClearText { .. } => "input_text",
    }
  }

  /// Service name within [`domain`](Self::domain).
  pub fn service(&self) -> &'static str {
    match self {
      Self::TurnOn { .. } => "turn_on",
      Self::TurnOff { .. } => "turn_off",
      Self::ClearText { .. } => "set_value",
    }
  }

  /// JSON body for the service call.
  pub fn service_data(&self) -> Value {
    match self {
      Self::TurnOn { entity_id } | Self::TurnOff { entity_id } => {
        json!({ "entity_id": entity_id })
      }
      Self::ClearText { entity_id } => json!({ "entity_id": entity_id, "value": "" }),
    }
  }
}

// ─── Classifier ──────────────────────────────────────────────────────────────

/// Decide which device actions a reply asks for.
pub trait IntentClassifier: Send + Sync {
  fn classify(&self, text: &str) -> Vec<DeviceAction>;
}

/// One device controlled by phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhraseRule {
  /// An on/off pair. When both phrases appear, only the on-action fires.
  Toggle {
    entity_id:  String,
    on_phrase:  String,
    off_phrase: String,
  },
  /// Clear a text input when any of `phrases` appears.
  Clear {
    entity_id: String,
    phrases:   Vec<String>,
  },
}

impl PhraseRule {
  fn matches(&self, lowered: &str) -> Option<DeviceAction> {
    match self {
      Self::Toggle { entity_id, on_phrase, off_phrase } => {
        if lowered.contains(&on_phrase.to_lowercase()) {
          Some(DeviceAction::TurnOn { entity_id: entity_id.clone() })
        } else if lowered.contains(&off_phrase.to_lowercase()) {
          Some(DeviceAction::TurnOff { entity_id: entity_id.clone() })
        } else {
          None
        }
      }
      Self::Clear { entity_id, phrases } => phrases
        .iter()
        .any(|p| lowered.contains(&p.to_lowercase()))
        .then(|| DeviceAction::ClearText { entity_id: entity_id.clone() }),
    }
  }
}

/// Entity ids for the three built-in rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionTargets {
  pub fan:       String,
  pub light:     String,
  pub rfid_list: String,
}

impl Default for ActionTargets {
  fn default() -> Self {
    Self {
      fan:       "switch.smarthome_node_dc_motor_fan".to_string(),
      light:     "switch.smarthome_node_smart_home_light".to_string(),
      rfid_list: "input_text.input_text_rfid_tag_list".to_string(),
    }
  }
}

/// Case-insensitive substring matching over a fixed rule list.
///
/// Rules are evaluated independently and in order; each yields at most one
/// action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseClassifier {
  rules: Vec<PhraseRule>,
}

impl PhraseClassifier {
  pub fn new(rules: Vec<PhraseRule>) -> Self { Self { rules } }

  /// Fan and light toggles plus the RFID list reset.
  pub fn with_targets(targets: &ActionTargets) -> Self {
    Self::new(vec![
      PhraseRule::Toggle {
        entity_id:  targets.fan.clone(),
        on_phrase:  "turning on the fan".into(),
        off_phrase: "turning off the fan".into(),
      },
      PhraseRule::Toggle {
        entity_id:  targets.light.clone(),
        on_phrase:  "turning on the light".into(),
        off_phrase: "turning off the light".into(),
      },
      PhraseRule::Clear {
        entity_id: targets.rfid_list.clone(),
        phrases:   vec!["clear rfid list".into(), "reset rfid list".into()],
      },
    ])
  }
}

impl Default for PhraseClassifier {
  fn default() -> Self { Self::with_targets(&ActionTargets::default()) }
}

impl IntentClassifier for PhraseClassifier {
  fn classify(&self, text: &str) -> Vec<DeviceAction> {
    let lowered = text.to_lowercase();
    self.rules.iter().filter_map(|r| r.matches(&lowered)).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fan() -> String { ActionTargets::default().fan }
  fn light() -> String { ActionTargets::default().light }

  #[test]
  fn fan_on_fires_once_and_never_off() {
    let actions = PhraseClassifier::default().classify("Sure, turning on the fan now.");
    assert_eq!(actions, vec![DeviceAction::TurnOn { entity_id: fan() }]);
  }

  #[test]
  fn matching_ignores_case() {
    let actions = PhraseClassifier::default().classify("TURNING OFF THE LIGHT.");
    assert_eq!(actions, vec![DeviceAction::TurnOff { entity_id: light() }]);
  }

  #[test]
  fn different_devices_are_independent() {
    let actions = PhraseClassifier::default()
      .classify("Turning on the fan and turning off the light for you.");
    assert_eq!(
      actions,
      vec![
        DeviceAction::TurnOn { entity_id: fan() },
        DeviceAction::TurnOff { entity_id: light() },
      ]
    );
  }

  #[test]
  fn on_wins_over_off_for_the_same_device() {
    let actions = PhraseClassifier::default()
      .classify("Turning off the fan... actually, turning on the fan.");
    assert_eq!(actions, vec![DeviceAction::TurnOn { entity_id: fan() }]);
  }

  #[test]
  fn repeated_phrase_fires_once() {
    let actions = PhraseClassifier::default()
      .classify("turning on the light, yes, turning on the light");
    assert_eq!(actions.len(), 1);
  }

  #[test]
  fn either_rfid_phrase_clears_list() {
    for text in ["I'll clear RFID list.", "Okay, reset rfid list done"] {
      let actions = PhraseClassifier::default().classify(text);
      assert_eq!(
        actions,
        vec![DeviceAction::ClearText { entity_id: ActionTargets::default().rfid_list }],
        "{text}"
      );
    }
  }

  #[test]
  fn unrelated_text_is_a_no_op() {
    assert!(PhraseClassifier::default().classify("The fan is currently on.").is_empty());
  }

  #[test]
  fn service_call_shape() {
    let clear = DeviceAction::ClearText { entity_id: "input_text.tags".into() };
    assert_eq!((clear.domain(), clear.service()), ("input_text", "set_value"));
    assert_eq!(clear.service_data(), json!({ "entity_id": "input_text.tags", "value": "" }));

    let on = DeviceAction::TurnOn { entity_id: "switch.x".into() };
    assert_eq!((on.domain(), on.service()), ("switch", "turn_on"));
    assert_eq!(on.service_data(), json!({ "entity_id": "switch.x" }));
  }
}
