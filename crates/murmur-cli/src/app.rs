//! Chat state and key dispatch.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::{UnboundedReceiver, error::TryRecvError};

use crate::client::Incoming;

/// Lines moved per PageUp/PageDown.
const PAGE: usize = 10;

// ─── Messages ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
  You,
  Assistant,
  /// Rendered in red, without a prefix.
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
  pub speaker: Speaker,
  pub text:    String,
  pub at:      DateTime<Local>,
}

impl Message {
  fn new(speaker: Speaker, text: impl Into<String>) -> Self {
    Self { speaker, text: text.into(), at: Local::now() }
  }
}

/// What the event loop should do after a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  None,
  /// Post this text as an utterance.
  Submit(String),
  Quit,
}

// ─── App ─────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Everything shown in the message pane, oldest first.
  pub messages:     Vec<Message>,

  /// The line being typed.
  pub input:        String,

  /// Lines scrolled up from the bottom of the message pane. Zero follows the
  /// newest message.
  pub scroll:       usize,

  /// Largest useful `scroll`, as measured by the last rendered frame.
  pub scroll_limit: usize,

  /// Whether the response listener is still running.
  pub listening:    bool,

  /// Shown in the status bar.
  pub hub_url:      String,

  incoming:         UnboundedReceiver<Incoming>,
}

impl App {
  pub fn new(hub_url: impl Into<String>, incoming: UnboundedReceiver<Incoming>) -> Self {
    Self {
      messages: Vec::new(),
      input: String::new(),
      scroll: 0,
      scroll_limit: 0,
      listening: true,
      hub_url: hub_url.into(),
      incoming,
    }
  }

  // ── Channel ─────────────────────────────────────────────────────────────

  /// Move everything waiting on the channel into the message pane.
  pub fn drain(&mut self) {
    loop {
      match self.incoming.try_recv() {
        Ok(msg) => self.apply(msg),
        Err(TryRecvError::Empty) => break,
        Err(TryRecvError::Disconnected) => {
          self.listening = false;
          break;
        }
      }
    }
  }

  fn apply(&mut self, msg: Incoming) {
    match msg {
      Incoming::Reply(text) => self.push(Speaker::Assistant, text),
      Incoming::SendFailed(e) => self.push(Speaker::Error, format!("Failed to send message: {e}")),
      Incoming::ListenerClosed(reason) => {
        self.listening = false;
        let text = match reason {
          Some(e) => format!("Listener stopped: {e}"),
          None => "Listener stopped: hub closed the connection".to_string(),
        };
        self.push(Speaker::Error, text);
      }
    }
  }

  /// Record how far the message pane can scroll and pull `scroll` back
  /// inside it.
  pub fn set_scroll_limit(&mut self, limit: usize) {
    self.scroll_limit = limit;
    self.scroll = self.scroll.min(limit);
  }

  fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
    self.messages.push(Message::new(speaker, text));
    self.scroll = 0;
  }

  // ── Key handling ────────────────────────────────────────────────────────

  /// Process a key event.
  pub fn handle_key(&mut self, key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Action::Quit;
    }

    match key.code {
      KeyCode::Esc => return Action::Quit,
      KeyCode::Enter => return self.submit(),
      KeyCode::Backspace => {
        self.input.pop();
      }
      KeyCode::PageUp => self.scroll = self.scroll.saturating_add(PAGE).min(self.scroll_limit),
      KeyCode::PageDown => self.scroll = self.scroll.saturating_sub(PAGE),
      KeyCode::Char(c) => self.input.push(c),
      _ => {}
    }
    Action::None
  }

  /// Whitespace-only input is discarded without sending.
  fn submit(&mut self) -> Action {
    let text = std::mem::take(&mut self.input);
    let text = text.trim();
    if text.is_empty() {
      return Action::None;
    }
    self.push(Speaker::You, text);
    Action::Submit(text.to_string())
  }
}
