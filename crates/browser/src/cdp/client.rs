//! CDP Client - browser-level connection used to open tabs
//!
//! Design decisions:
//! 1. Single WebSocket per browser connection
//! 2. Request/response matching via ID; events are only traced
//! 3. Every request is bounded by a timeout
//! 4. Fail fast - no retries, no queuing. Let the caller decide.

use dashmap::DashMap;
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::protocol::*;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

#[derive(Error, Debug)]
pub enum CDPError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CDP protocol error: {code} - {message}")]
    Protocol { code: i32, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Connection closed")]
    Closed,
}

/// Result type for CDP operations
pub type Result<T> = std::result::Result<T, CDPError>;

/// CDP Client - manages single WebSocket connection to browser
pub struct CDPClient {
    /// Monotonic request ID counter
    next_id: AtomicU64,

    /// Requests waiting for their response
    pending: Arc<DashMap<RequestId, oneshot::Sender<CDPResponse>>>,

    /// WebSocket write half (wrapped for concurrent sending)
    ws_sink: RwLock<WsSink>,

    /// Stops the receiver task
    shutdown: Mutex<Option<oneshot::Sender<()>>>,

    request_timeout: Duration,
}

impl CDPClient {
    /// Connect to Chrome DevTools Protocol endpoint
    pub async fn connect(ws_url: &str, request_timeout: Duration) -> Result<Arc<Self>> {
        let (ws_stream, _) = connect_async(ws_url).await?;
        let (sink, mut stream) = ws_stream.split();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let client = Arc::new(Self {
            next_id: AtomicU64::new(1),
            pending: Arc::new(DashMap::new()),
            ws_sink: RwLock::new(sink),
            shutdown: Mutex::new(Some(shutdown_tx)),
            request_timeout,
        });

        let pending = client.pending.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    msg = stream.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                if let Err(e) = route_message(&pending, &text) {
                                    tracing::error!("Failed to handle message: {}", e);
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                tracing::info!("WebSocket closed");
                                break;
                            }
                            Some(Err(e)) => {
                                tracing::error!("WebSocket error: {}", e);
                                break;
                            }
                            _ => {}
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("Shutdown signal received");
                        break;
                    }
                }
            }

            // Dropping the senders wakes every waiter with Closed
            pending.clear();
        });

        Ok(client)
    }

    /// Send CDP request and wait for response
    pub async fn send_request(
        &self,
        method: impl Into<String>,
        params: Option<Value>,
    ) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = CDPRequest {
            id,
            method: method.into(),
            params,
        };

        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);

        let json = serde_json::to_string(&request)?;
        let sent = self.ws_sink.write().await.send(Message::Text(json)).await;
        if let Err(e) = sent {
            self.pending.remove(&id);
            return Err(CDPError::WebSocket(e));
        }

        let response = match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(CDPError::Closed),
            Err(_) => {
                self.pending.remove(&id);
                return Err(CDPError::Timeout);
            }
        };

        if let Some(error) = response.error {
            return Err(CDPError::Protocol {
                code: error.code,
                message: error.message,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Open `url` in a new tab, optionally without focusing it
    pub async fn create_target(&self, url: &str, background: bool) -> Result<TargetId> {
        let params = CreateTargetParams {
            url: url.to_string(),
            background,
        };
        let result = self
            .send_request("Target.createTarget", Some(serde_json::to_value(params)?))
            .await?;
        let created: CreateTargetResult = serde_json::from_value(result)?;
        Ok(created.target_id)
    }

    /// Close connection gracefully
    pub async fn close(&self) -> Result<()> {
        let shutdown = self.shutdown.lock().ok().and_then(|mut s| s.take());
        if let Some(tx) = shutdown {
            let _ = tx.send(());
        }
        self.ws_sink.write().await.close().await?;
        Ok(())
    }
}

/// Deliver a response to its waiter; events are not consumed here
fn route_message(
    pending: &DashMap<RequestId, oneshot::Sender<CDPResponse>>,
    text: &str,
) -> Result<()> {
    match serde_json::from_str::<CDPMessage>(text)? {
        CDPMessage::Response(response) => {
            if let Some((_, tx)) = pending.remove(&response.id) {
                let _ = tx.send(response); // Receiver may have timed out
            } else {
                tracing::warn!("Received response for unknown request: {}", response.id);
            }
        }
        CDPMessage::Event(event) => {
            tracing::trace!("Ignoring CDP event {}", event.method);
        }
    }
    Ok(())
}
