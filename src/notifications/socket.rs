//! Live notification channel over WebSocket.
//!
//! A background task owns the connection. It publishes its
//! [`ConnectionState`] on a `watch` channel and forwards decoded
//! [`NotificationEvent`]s on an `mpsc` channel. When the connection drops it
//! waits a fixed delay and reconnects, up to `max_reconnects` attempts in a
//! row; a successful open resets the count. There is no backoff.

use std::fmt;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use reqwest::Url;
use tokio::sync::{mpsc, watch};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_tungstenite::tungstenite::Message;

use super::NotificationEvent;
use crate::errors::SocketError;

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct SocketConfig {
    pub url: String,
    pub reconnect_delay: Duration,
    /// Reconnects allowed since the last successful open; `None` retries
    /// forever.
    pub max_reconnects: Option<u32>,
}

/// Derive the notification socket URL from the REST base URL:
/// `http` becomes `ws`, `https` becomes `wss`, `ws_path` is appended to any
/// base path, and the token travels as the `token` query parameter.
pub fn notification_ws_url(
    api_base: &str,
    ws_path: &str,
    token: Option<&str>,
) -> Result<String, SocketError> {
    let mut url =
        Url::parse(api_base.trim()).map_err(|_| SocketError::InvalidUrl(api_base.to_string()))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return Err(SocketError::InvalidUrl(api_base.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|_| SocketError::InvalidUrl(api_base.to_string()))?;

    let base_path = url.path().trim_end_matches('/').to_string();
    let ws_path = if ws_path.starts_with('/') {
        ws_path.to_string()
    } else {
        format!("/{}", ws_path)
    };
    url.set_path(&format!("{}{}", base_path, ws_path));
    url.set_query(None);
    if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
        url.query_pairs_mut().append_pair("token", token);
    }
    Ok(url.to_string())
}

/// Handle to the background connection task.
pub struct NotificationSocket {
    state: watch::Receiver<ConnectionState>,
    events: mpsc::Receiver<NotificationEvent>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl NotificationSocket {
    /// Start connecting in the background. Must be called inside a tokio
    /// runtime.
    pub fn spawn(config: SocketConfig) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run(config, state_tx, events_tx, shutdown_rx));
        Self {
            state: state_rx,
            events: events_rx,
            shutdown: shutdown_tx,
            task,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn state_watcher(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Next pushed event; `None` once the task has stopped for good.
    pub async fn next_event(&mut self) -> Option<NotificationEvent> {
        self.events.recv().await
    }

    /// Stop the task and wait for it to finish.
    pub async fn close(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(url: &str) -> Result<WsStream, SocketError> {
    let (stream, _) = connect_async(url).await?;
    Ok(stream)
}

enum Disconnect {
    Dropped,
    Shutdown,
}

async fn run(
    config: SocketConfig,
    state: watch::Sender<ConnectionState>,
    events: mpsc::Sender<NotificationEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut failures: u32 = 0;
    loop {
        state.send_replace(ConnectionState::Connecting);
        tracing::debug!(url = %config.url, "connecting to notification socket");

        let connected = tokio::select! {
            result = connect(&config.url) => result,
            _ = shutdown.changed() => break,
        };

        match connected {
            Ok(stream) => {
                failures = 0;
                state.send_replace(ConnectionState::Open);
                tracing::info!("notification socket open");
                match read_frames(stream, &events, &mut shutdown).await {
                    Disconnect::Shutdown => break,
                    Disconnect::Dropped => {
                        tracing::info!("notification socket closed by server");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "notification socket connect failed");
            }
        }

        state.send_replace(ConnectionState::Closed);
        if events.is_closed() {
            break;
        }
        if config.max_reconnects.is_some_and(|max| failures >= max) {
            tracing::warn!(attempts = failures, "giving up on notification socket");
            break;
        }
        failures += 1;

        tokio::select! {
            _ = tokio::time::sleep(config.reconnect_delay) => {}
            _ = shutdown.changed() => break,
        }
    }
    state.send_replace(ConnectionState::Closed);
}

async fn read_frames<S>(
    mut stream: S,
    events: &mpsc::Sender<NotificationEvent>,
    shutdown: &mut watch::Receiver<bool>,
) -> Disconnect
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let frame = tokio::select! {
            frame = stream.next() => frame,
            _ = shutdown.changed() => return Disconnect::Shutdown,
        };
        match frame {
            Some(Ok(Message::Text(text))) => match NotificationEvent::parse(text.as_str()) {
                Ok(event) => {
                    if events.send(event).await.is_err() {
                        return Disconnect::Shutdown;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring malformed notification frame");
                }
            },
            Some(Ok(Message::Close(_))) | None => return Disconnect::Dropped,
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                tracing::warn!(error = %e, "notification socket error");
                return Disconnect::Dropped;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Notification;
    use axum::{
        Router,
        extract::ws::{Message as WsMessage, WebSocketUpgrade},
        response::IntoResponse,
        routing::get,
    };
    use tokio::net::TcpListener;

    #[test]
    fn test_ws_url_from_api_base() {
        assert_eq!(
            notification_ws_url("http://localhost:5000", "/ws/notifications", None).unwrap(),
            "ws://localhost:5000/ws/notifications"
        );
        assert_eq!(
            notification_ws_url("https://erp.fabrika.com/", "ws/notifications", Some("a b")).unwrap(),
            "wss://erp.fabrika.com/ws/notifications?token=a+b"
        );
        assert_eq!(
            notification_ws_url("https://erp.fabrika.com/tekstil", "/ws", Some("t")).unwrap(),
            "wss://erp.fabrika.com/tekstil/ws?token=t"
        );
        assert!(matches!(
            notification_ws_url("ftp://x", "/ws", None),
            Err(SocketError::InvalidUrl(_))
        ));
        assert!(notification_ws_url("not a url", "/ws", None).is_err());
    }

    async fn push_frames(ws: WebSocketUpgrade) -> impl IntoResponse {
        ws.on_upgrade(|mut socket| async move {
            let frames = [
                r#"{"type":"NotificationCreated","data":{"notification":{"id":1,"title":"Yeni sipariş"}}}"#,
                "not json",
                r#"{"id":2,"title":"Bakım zamanı","isRead":false}"#,
                r#"{"type":"AllRead"}"#,
            ];
            for frame in frames {
                if socket.send(WsMessage::Text(frame.into())).await.is_err() {
                    return;
                }
            }
            let _ = socket.send(WsMessage::Close(None)).await;
        })
    }

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("ws://{}/ws/notifications", addr)
    }

    fn created_id(event: NotificationEvent) -> i64 {
        match event {
            NotificationEvent::NotificationCreated {
                notification: Notification { id, .. },
            } => id,
            other => panic!("Expected NotificationCreated, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_receives_events_and_skips_malformed_frames() {
        let url = serve(Router::new().route("/ws/notifications", get(push_frames))).await;
        let mut socket = NotificationSocket::spawn(SocketConfig {
            url,
            reconnect_delay: Duration::from_secs(60),
            max_reconnects: Some(0),
        });

        assert_eq!(created_id(socket.next_event().await.unwrap()), 1);
        assert_eq!(created_id(socket.next_event().await.unwrap()), 2);
        assert_eq!(socket.next_event().await.unwrap(), NotificationEvent::AllRead);

        // Server closed and no reconnects are allowed: the stream ends.
        assert!(socket.next_event().await.is_none());
        assert_eq!(socket.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_reconnects_after_drop() {
        let url = serve(Router::new().route("/ws/notifications", get(push_frames))).await;
        let mut socket = NotificationSocket::spawn(SocketConfig {
            url,
            reconnect_delay: Duration::from_millis(20),
            max_reconnects: Some(1),
        });

        // Two created events per connection; the fourth needs a reconnect.
        let mut created = 0;
        while created < 4 {
            let event = tokio::time::timeout(Duration::from_secs(5), socket.next_event())
                .await
                .unwrap()
                .unwrap();
            if matches!(event, NotificationEvent::NotificationCreated { .. }) {
                created += 1;
            }
        }
        tokio::time::timeout(Duration::from_secs(5), socket.close())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_ends_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut socket = NotificationSocket::spawn(SocketConfig {
            url: format!("ws://{}/ws/notifications", addr),
            reconnect_delay: Duration::from_millis(10),
            max_reconnects: Some(2),
        });
        assert!(socket.next_event().await.is_none());
        assert_eq!(socket.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_connect_failure_is_socket_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = connect(&format!("ws://{}/ws/notifications", addr))
            .await
            .unwrap_err();
        assert!(matches!(err, SocketError::Connect(_)));
        assert!(err.to_string().starts_with("WebSocket connect failed"));
    }

    #[tokio::test]
    async fn test_close_stops_task() {
        let url = serve(Router::new().route(
            "/ws/notifications",
            get(|ws: WebSocketUpgrade| async move {
                ws.on_upgrade(|socket| async move {
                    // Hold the connection open until the client leaves.
                    let mut socket = socket;
                    while let Some(Ok(_)) = socket.recv().await {}
                })
            }),
        ))
        .await;
        let socket = NotificationSocket::spawn(SocketConfig {
            url,
            reconnect_delay: Duration::from_secs(60),
            max_reconnects: None,
        });
        let mut states = socket.state_watcher();
        states
            .wait_for(|s| *s == ConnectionState::Open)
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), socket.close())
            .await
            .unwrap();
    }
}
