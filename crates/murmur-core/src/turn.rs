//! Conversation turns and the transcript that orders them.
//!
//! A transcript is append-only during a session. The only removal is window
//! eviction: when a turn limit is configured, the oldest turns are dropped
//! first so the transcript never exceeds the limit.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Role ────────────────────────────────────────────────────────────────────

/// Who authored a turn, as understood by chat-completion APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
  Assistant,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::System => "system",
      Self::User => "user",
      Self::Assistant => "assistant",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Turn ────────────────────────────────────────────────────────────────────

/// One role-tagged message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
  pub role:    Role,
  pub content: String,
}

impl Turn {
  pub fn new(role: Role, content: impl Into<String>) -> Self {
    Self { role, content: content.into() }
  }

  pub fn system(content: impl Into<String>) -> Self {
    Self::new(Role::System, content)
  }

  pub fn user(content: impl Into<String>) -> Self { Self::new(Role::User, content) }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self::new(Role::Assistant, content)
  }
}

// ─── Transcript ──────────────────────────────────────────────────────────────

/// The ordered list of turns sent to the language model.
///
/// `max_turns` is a window, not a hard error: pushing past it evicts from the
/// front. `None` means unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
  turns:     Vec<Turn>,
  max_turns: Option<usize>,
}

impl Transcript {
  /// An empty, unbounded transcript.
  pub fn new() -> Self { Self::default() }

  /// Wrap previously persisted turns. The window is applied immediately, so a
  /// file written under a larger limit is trimmed on load.
  pub fn from_turns(turns: Vec<Turn>, max_turns: Option<usize>) -> Self {
    let mut transcript = Self { turns, max_turns };
    transcript.evict();
    transcript
  }

  pub fn max_turns(&self) -> Option<usize> { self.max_turns }

  /// Append a turn, evicting the oldest turns if the window overflows.
  pub fn push(&mut self, turn: Turn) {
    self.turns.push(turn);
    self.evict();
  }

  pub fn turns(&self) -> &[Turn] { &self.turns }

  pub fn last(&self) -> Option<&Turn> { self.turns.last() }

  pub fn len(&self) -> usize { self.turns.len() }

  pub fn is_empty(&self) -> bool { self.turns.is_empty() }

  fn evict(&mut self) {
    if let Some(max) = self.max_turns
      && self.turns.len() > max
    {
      let excess = self.turns.len() - max;
      self.turns.drain(..excess);
    }
  }
}
