//! Per-socket session loop for read-only topic subscriptions.
//!
//! Clients never publish on a topic; the only inbound messages understood are
//! WS-level pings and the app-level `{"type":"ping"}` heartbeat.

use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::mpsc;

use super::WebSocketManager;

pub struct WsServerOptions {
    pub ws_ping_sec: u64,
}

impl Default for WsServerOptions {
    fn default() -> Self {
        Self { ws_ping_sec: 30 }
    }
}

/// Drives one subscriber socket until either side closes.
pub async fn serve_topic(
    socket: WebSocket,
    manager: WebSocketManager,
    topic: String,
    user_id: i64,
    opts: WsServerOptions,
) {
    let mut rx = manager.subscribe(&topic).await;
    tracing::info!(topic = %topic, user_id, "WS subscriber connected");

    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(64);

    let writer = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if sink.send(frame).await.is_err() {
                break;
            }
        }
    });

    let forward = {
        let out_tx = out_tx.clone();
        tokio::spawn(async move {
            while let Ok(msg) = rx.recv().await {
                if out_tx.send(Message::Text(msg.into())).await.is_err() {
                    break;
                }
            }
        })
    };

    let pinger = {
        let out_tx = out_tx.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(opts.ws_ping_sec)).await;
                if out_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        })
    };

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) if is_app_ping(text.as_str()) => {
                let pong = json!({
                    "type": "pong",
                    "topic": topic,
                    "ts": Utc::now().to_rfc3339(),
                });
                let _ = out_tx.send(Message::Text(pong.to_string().into())).await;
            }
            Message::Text(text) => {
                tracing::warn!(topic = %topic, raw = %text.as_str(), "Ignoring inbound WS message");
            }
            Message::Ping(payload) => {
                let _ = out_tx.send(Message::Pong(payload)).await;
            }
            Message::Close(_) => break,
            Message::Pong(_) | Message::Binary(_) => {}
        }
    }

    forward.abort();
    pinger.abort();
    drop(out_tx);
    let _ = writer.await;

    tracing::info!(topic = %topic, user_id, "WS subscriber disconnected");
}

fn is_app_ping(raw: &str) -> bool {
    matches!(
        serde_json::from_str::<Value>(raw),
        Ok(Value::Object(map)) if map.get("type").and_then(Value::as_str) == Some("ping")
    )
}
