//! Runtime configuration, deserialised from the layered `config` sources.

use std::{fmt, path::PathBuf};

use murmur_core::{context::DEFAULT_PREAMBLE, intent::ActionTargets};
use serde::{Deserialize, Deserializer, de};

use crate::{Error, Result};

/// Everything the assistant daemon needs to run.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
  #[serde(default = "default_hub_url")]
  pub hub_url:          String,
  #[serde(default)]
  pub hub_token:        String,
  #[serde(default)]
  pub openai_api_key:   String,
  #[serde(default = "default_model")]
  pub openai_model:     String,
  #[serde(default = "default_openai_base_url")]
  pub openai_base_url:  String,
  #[serde(default = "default_max_tokens")]
  pub max_tokens:       u32,
  #[serde(default = "default_temperature")]
  pub temperature:      f32,
  /// Devices whose state goes into every prompt, in this order.
  #[serde(default, deserialize_with = "list_or_csv")]
  pub context_entities: Vec<String>,
  /// Device queried when the utterance names a time range.
  #[serde(default = "default_history_entity")]
  pub history_entity:   String,
  #[serde(default = "default_transcript_path")]
  pub transcript_path:  PathBuf,
  /// Transcript window; unbounded when absent.
  #[serde(default)]
  pub max_turns:        Option<usize>,
  #[serde(default = "default_preamble")]
  pub system_preamble:  String,
  #[serde(default)]
  pub actions:          ActionTargets,
  #[serde(default)]
  pub api:              ApiSettings,
}

/// The operator HTTP API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
  pub host:          String,
  pub port:          u16,
  pub username:      String,
  /// Argon2 PHC string. Authenticated routes refuse everyone when unset.
  pub password_hash: Option<String>,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self {
      host:          "127.0.0.1".to_string(),
      port:          5280,
      username:      "murmur".to_string(),
      password_hash: None,
    }
  }
}

impl AssistantConfig {
  /// Reject configurations that cannot possibly work.
  pub fn validate(&self) -> Result<()> {
    if self.hub_token.trim().is_empty() {
      return Err(Error::Config("hub_token is required".into()));
    }
    if self.openai_api_key.trim().is_empty() {
      return Err(Error::Config("openai_api_key is required".into()));
    }
    if self.max_turns == Some(0) {
      return Err(Error::Config("max_turns must be at least 1".into()));
    }
    if !(0.0..=2.0).contains(&self.temperature) {
      return Err(Error::Config(format!("temperature {} is outside 0.0..=2.0", self.temperature)));
    }
    Ok(())
  }
}

fn default_hub_url() -> String { "http://localhost:8123".to_string() }
fn default_model() -> String { "gpt-4o-mini".to_string() }
fn default_openai_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_max_tokens() -> u32 { 1000 }
fn default_temperature() -> f32 { 0.7 }
fn default_history_entity() -> String { "sensor.smarthome_node_keystudio_humidity".to_string() }
fn default_transcript_path() -> PathBuf { PathBuf::from("openai_history.json") }
fn default_preamble() -> String { DEFAULT_PREAMBLE.to_string() }

/// Accept either a sequence or a comma-separated string, so the same key
/// works from TOML (`["a", "b"]`) and from `key=value` files (`a,b`).
fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
  D: Deserializer<'de>,
{
  struct ListOrCsv;

  impl<'de> de::Visitor<'de> for ListOrCsv {
    type Value = Vec<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
      f.write_str("a list of strings or a comma-separated string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
      Ok(v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect())
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
      let mut out = Vec::new();
      while let Some(item) = seq.next_element::<String>()? {
        out.push(item);
      }
      Ok(out)
    }
  }

  deserializer.deserialize_any(ListOrCsv)
}

#[cfg(test)]
mod tests {
  use config::{Config, File, FileFormat};

  use super::*;

  fn load(source: &str, format: FileFormat) -> AssistantConfig {
    Config::builder()
      .add_source(File::from_str(source, format))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn toml_with_defaults() {
    let cfg = load(
      r#"
        hub_token        = "abc"
        openai_api_key   = "sk-test"
        context_entities = ["sensor.temperature", "switch.fan"]

        [api]
        port = 9000
      "#,
      FileFormat::Toml,
    );
    assert_eq!(cfg.hub_url, "http://localhost:8123");
    assert_eq!(cfg.context_entities, ["sensor.temperature", "switch.fan"]);
    assert_eq!(cfg.max_tokens, 1000);
    assert_eq!(cfg.max_turns, None);
    assert_eq!(cfg.api.port, 9000);
    assert_eq!(cfg.api.host, "127.0.0.1");
    assert_eq!(cfg.actions, ActionTargets::default());
    cfg.validate().unwrap();
  }

  #[test]
  fn key_value_file_with_csv_entities() {
    let cfg = load(
      "hub_url=http://hub.lan:8123\n\
       hub_token=abc\n\
       openai_api_key=sk-test\n\
       context_entities=sensor.temperature, switch.fan ,\n",
      FileFormat::Ini,
    );
    assert_eq!(cfg.hub_url, "http://hub.lan:8123");
    assert_eq!(cfg.context_entities, ["sensor.temperature", "switch.fan"]);
  }

  #[test]
  fn missing_token_fails_validation() {
    let cfg = load(r#"openai_api_key = "sk-test""#, FileFormat::Toml);
    assert!(matches!(cfg.validate(), Err(Error::Config(m)) if m.contains("hub_token")));
  }

  #[test]
  fn zero_window_fails_validation() {
    let cfg = load(
      r#"
        hub_token      = "abc"
        openai_api_key = "sk-test"
        max_turns      = 0
      "#,
      FileFormat::Toml,
    );
    assert!(cfg.validate().is_err());
  }
}
