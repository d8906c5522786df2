//! The `Completion` trait: a chat-completion language model.

use std::future::Future;

use crate::turn::Turn;

/// Produce the next assistant message for a transcript.
pub trait Completion: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Send every turn, in order, and return the reply text.
  fn complete<'a>(
    &'a self,
    turns: &'a [Turn],
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
