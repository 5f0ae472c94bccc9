use std::time::Duration;

use api::auth::generate_jwt;
use axum::Router;
use futures_util::StreamExt;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::client::IntoClientRequest,
    tungstenite::protocol::Message,
};
use url::Url;

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Spawns the app on a random local port.
pub async fn spawn_server(app: Router) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    addr
}

/// Connects to `/ws/{path}?token=...` as `user_id`.
pub async fn connect_ws(
    addr: &std::net::SocketAddr,
    path: &str,
    user_id: i64,
) -> Result<WsClient, tokio_tungstenite::tungstenite::Error> {
    let (token, _) = generate_jwt(user_id, false, 60).unwrap();
    let url = Url::parse(&format!("ws://{addr}/ws/{path}?token={token}")).unwrap();
    let req = url.to_string().into_client_request().unwrap();
    let (stream, _) = connect_async(req).await?;
    // Let the server finish subscribing before events are published.
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(stream)
}

/// Next event envelope, skipping control frames. Fails after two seconds.
pub async fn next_event(ws: &mut WsClient) -> Value {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    let v: Value = serde_json::from_str(text.as_str()).unwrap();
                    if v["type"] == "event" {
                        return v;
                    }
                }
                Some(Ok(_)) => continue,
                other => panic!("socket closed while waiting for event: {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}
