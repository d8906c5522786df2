//! murmur-assistant daemon.
//!
//! Layers configuration from `murmur.toml`, a `.env` key/value file and
//! `MURMUR_*` environment variables (later sources win), subscribes to
//! utterance events on the hub and serves the operator API.
//!
//! # Password hash generation
//!
//! ```
//! cargo run -p murmur-assistant -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use config::{Environment, File, FileFormat};
use murmur_assistant::{
  Assistant, AssistantConfig, PromptSettings,
  api::{self, ApiState, AuthConfig, auth::hash_password},
  openai::{CompletionSettings, OpenAiClient},
  run_event_loop,
};
use murmur_core::{intent::PhraseClassifier, turn::Transcript};
use murmur_hub::{HubClient, HubConfig};
use murmur_transcript::TranscriptFile;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Murmur conversation assistant")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "murmur.toml")]
  config: PathBuf,

  /// Optional `KEY=value` file layered over the TOML file.
  #[arg(long, default_value = ".env")]
  env_file: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    println!("{}", hash_password(&password)?);
    return Ok(());
  }

  let cfg: AssistantConfig = config::Config::builder()
    .add_source(File::from(cli.config).required(false))
    .add_source(File::new(&cli.env_file.to_string_lossy(), FileFormat::Ini).required(false))
    .add_source(Environment::with_prefix("MURMUR").prefix_separator("_").separator("__"))
    .build()
    .context("failed to read configuration")?
    .try_deserialize()
    .context("failed to deserialise configuration")?;
  cfg.validate()?;

  let hub_config = HubConfig::new(cfg.hub_url.clone(), cfg.hub_token.clone());
  let hub = HubClient::new(hub_config.clone())?;
  let completion = OpenAiClient::new(CompletionSettings::from(&cfg))?;

  let store = TranscriptFile::new(expand_tilde(&cfg.transcript_path), cfg.max_turns);
  let transcript = match store.load().await {
    Ok(t) => {
      tracing::info!(turns = t.len(), path = ?store.path(), "transcript loaded");
      t
    }
    Err(e) => {
      tracing::error!(error = %e, "starting with an empty transcript");
      Transcript::from_turns(Vec::new(), cfg.max_turns)
    }
  };

  let assistant = Arc::new(Assistant::new(
    hub,
    completion,
    PhraseClassifier::with_targets(&cfg.actions),
    store,
    PromptSettings {
      preamble:         cfg.system_preamble.clone(),
      context_entities: cfg.context_entities.clone(),
      history_entity:   cfg.history_entity.clone(),
    },
    transcript,
  ));

  let state = ApiState {
    assistant: Arc::clone(&assistant),
    auth:      Arc::new(AuthConfig {
      username:      cfg.api.username.clone(),
      password_hash: cfg.api.password_hash.clone(),
    }),
  };
  if cfg.api.password_hash.is_none() {
    tracing::warn!("api.password_hash is unset; authenticated routes will refuse every request");
  }

  let address = format!("{}:{}", cfg.api.host, cfg.api.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Operator API listening on http://{address}");

  let router = api::router(state);
  tokio::select! {
    res = run_event_loop(assistant, &hub_config) => {
      res.context("hub connection failed")?;
      tracing::info!("hub closed the connection");
    }
    res = async { axum::serve(listener, router).await } => res.context("server error")?,
    _ = tokio::signal::ctrl_c() => tracing::info!("interrupted"),
  }

  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
