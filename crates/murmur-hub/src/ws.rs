//! Async WebSocket listener for one event type.
//!
//! Connects once, runs the [`Subscriber`] handshake and hands every matching
//! event to a callback. There is no reconnect: the function returns when the
//! hub closes the socket and fails on transport errors, leaving the decision
//! to the caller.

use futures::{SinkExt as _, StreamExt as _};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::{
  HubConfig, Result,
  message::{Event, ServerMessage},
  session::{Step, Subscriber},
};

/// Subscribe to `event_type` and call `on_event` for each delivery.
///
/// Returns `Ok(())` when the connection closes normally.
pub async fn listen<F>(config: &HubConfig, event_type: &str, mut on_event: F) -> Result<()>
where
  F: FnMut(Event) + Send,
{
  let url = config.websocket_url();
  info!(%url, event_type, "connecting to hub websocket");

  let (stream, _) = connect_async(url.as_str()).await?;
  let (mut write, mut read) = stream.split();
  let mut subscriber = Subscriber::new(config.access_token.clone(), event_type);

  while let Some(frame) = read.next().await {
    let text = match frame? {
      Message::Text(text) => text,
      Message::Close(reason) => {
        info!(?reason, "hub closed the websocket");
        return Ok(());
      }
      _ => continue,
    };

    let message = match ServerMessage::decode(text.as_str()) {
      Ok(m) => m,
      Err(e) => {
        debug!(error = %e, "ignoring undecodable frame");
        continue;
      }
    };

    match subscriber.handle(message)? {
      Step::Send(reply) => {
        debug!(?reply, "sending");
        write.send(Message::Text(reply.encode()?.into())).await?;
      }
      Step::Subscribed => info!(event_type, "subscription acknowledged"),
      Step::Deliver(event) => on_event(event),
      Step::Ignore => {}
    }
  }

  warn!("websocket stream ended without a close frame");
  Ok(())
}

#[cfg(test)]
mod tests {
  use futures::{SinkExt, StreamExt};
  use serde_json::{Value, json};
  use tokio::net::TcpListener;
  use tokio_tungstenite::accept_async;

  use super::*;
  use crate::Error;

  /// Accept one connection and play the hub's side of the handshake, then
  /// push `events` and close.
  async fn fake_hub(events: Vec<Value>, accept_token: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
      let (tcp, _) = listener.accept().await.unwrap();
      let mut ws = accept_async(tcp).await.unwrap();

      let send = |v: Value| Message::Text(v.to_string().into());
      let recv_json = |m: Message| -> Value { serde_json::from_str(m.to_text().unwrap()).unwrap() };

      ws.send(send(json!({ "type": "auth_required", "ha_version": "2025.7.1" })))
        .await
        .unwrap();

      let auth = recv_json(ws.next().await.unwrap().unwrap());
      assert_eq!(auth["type"], "auth");
      if auth["access_token"] != accept_token {
        ws.send(send(json!({ "type": "auth_invalid", "message": "Invalid access token" })))
          .await
          .unwrap();
        return;
      }
      ws.send(send(json!({ "type": "auth_ok" }))).await.unwrap();

      let sub = recv_json(ws.next().await.unwrap().unwrap());
      assert_eq!(sub, json!({ "id": 1, "type": "subscribe_events", "event_type": "conversation_response" }));
      ws.send(send(json!({ "id": 1, "type": "result", "success": true, "result": null })))
        .await
        .unwrap();

      for event in events {
        ws.send(send(event)).await.unwrap();
      }
      ws.close(None).await.unwrap();
    });

    format!("http://{addr}")
  }

  fn event(id: u64, event_type: &str, text: &str) -> Value {
    json!({
      "id": id,
      "type": "event",
      "event": { "event_type": event_type, "data": { "text": text }, "context": { "id": "c1" } }
    })
  }

  #[tokio::test]
  async fn delivers_only_matching_events() {
    let base = fake_hub(
      vec![
        event(1, "conversation_response", "hello"),
        event(1, "state_changed", "nope"),
        event(9, "conversation_response", "nope"),
        json!({ "type": "pong", "id": 4 }),
        event(1, "conversation_response", "again"),
      ],
      "token",
    )
    .await;

    let mut received = Vec::new();
    listen(&HubConfig::new(base, "token"), "conversation_response", |ev| {
      received.push(ev.text().unwrap_or_default().to_string());
    })
    .await
    .unwrap();

    assert_eq!(received, ["hello", "again"]);
  }

  #[tokio::test]
  async fn bad_token_ends_with_auth_error() {
    let base = fake_hub(vec![], "right").await;
    let mut calls = 0;
    let err = listen(&HubConfig::new(base, "wrong"), "conversation_response", |_| calls += 1)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::AuthRejected(_)), "{err}");
    assert_eq!(calls, 0);
  }

  #[tokio::test]
  async fn unreachable_hub_is_an_error() {
    // Bind then drop to get a port nobody listens on.
    let port = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap().port();
    let result = listen(
      &HubConfig::new(format!("http://127.0.0.1:{port}"), "t"),
      "conversation_response",
      |_| {},
    )
    .await;
    assert!(matches!(result, Err(Error::WebSocket(_))));
  }
}
