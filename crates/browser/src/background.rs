//! Background side - turns `openLinks` messages into unfocused tabs
//!
//! Runs with browser-level privileges: it owns the CDP connection and is the
//! only component allowed to create tabs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cdp::{CDPClient, TargetId};
use crate::dispatch::{DispatchError, InProcessChannel, LinkChannel};
use crate::messages::{ExtensionMessage, OpenLinksRequest};

/// Connection settings for the DevTools endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CdpConfig {
    pub cdp_url: String,
    pub request_timeout_ms: u64,
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            cdp_url: "ws://localhost:9222".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Creates one non-focused tab
#[async_trait]
pub trait TabOpener: Send + Sync {
    async fn open_background_tab(&self, url: &str) -> Result<TargetId, DispatchError>;
}

/// [`TabOpener`] backed by `Target.createTarget` on a live browser
pub struct CdpTabOpener {
    client: Arc<CDPClient>,
}

impl CdpTabOpener {
    pub fn new(client: Arc<CDPClient>) -> Self {
        Self { client }
    }

    pub async fn connect(config: &CdpConfig) -> Result<Self, DispatchError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = CDPClient::connect(&config.cdp_url, timeout).await?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &Arc<CDPClient> {
        &self.client
    }
}

#[async_trait]
impl TabOpener for CdpTabOpener {
    async fn open_background_tab(&self, url: &str) -> Result<TargetId, DispatchError> {
        Ok(self.client.create_target(url, true).await?)
    }
}

/// Outcome of handling one message
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OpenSummary {
    pub opened: Vec<TargetId>,
    pub failed: Vec<String>,
}

pub struct BackgroundHandler<T> {
    opener: T,
}

impl<T: TabOpener> BackgroundHandler<T> {
    pub fn new(opener: T) -> Self {
        Self { opener }
    }

    /// Handle one message. Tabs are opened independently: a failure is
    /// logged and the remaining URLs are still attempted.
    pub async fn handle_message(&self, message: &ExtensionMessage) -> OpenSummary {
        let mut summary = OpenSummary::default();

        let ExtensionMessage::OpenLinks(request) = message else {
            tracing::debug!("Ignoring unhandled message: {:?}", message);
            return summary;
        };

        for url in &request.urls {
            if let Err(e) = url::Url::parse(url) {
                tracing::warn!("Skipping malformed URL {}: {}", url, e);
                summary.failed.push(url.clone());
                continue;
            }

            match self.opener.open_background_tab(url).await {
                Ok(target_id) => {
                    tracing::debug!("Opened {} in background tab {}", url, target_id);
                    summary.opened.push(target_id);
                }
                Err(e) => {
                    tracing::error!("Failed to open background tab for {}: {}", url, e);
                    summary.failed.push(url.clone());
                }
            }
        }

        summary
    }

    /// Handle a raw JSON message; malformed input is logged and dropped
    pub async fn handle_json(&self, raw: &str) -> OpenSummary {
        match serde_json::from_str::<ExtensionMessage>(raw) {
            Ok(message) => self.handle_message(&message).await,
            Err(e) => {
                tracing::warn!("Dropping malformed message: {}", e);
                OpenSummary::default()
            }
        }
    }
}

#[async_trait]
impl<T: TabOpener> LinkChannel for BackgroundHandler<T> {
    async fn send(&self, request: OpenLinksRequest) -> Result<(), DispatchError> {
        self.handle_message(&ExtensionMessage::OpenLinks(request))
            .await;
        Ok(())
    }
}

/// Run `handler` on its own task, fed through the returned channel.
///
/// The task ends once every [`InProcessChannel`] clone is dropped.
pub fn spawn_background_worker<T>(
    handler: BackgroundHandler<T>,
    capacity: usize,
) -> (InProcessChannel, JoinHandle<()>)
where
    T: TabOpener + 'static,
{
    let (tx, mut rx) = mpsc::channel::<OpenLinksRequest>(capacity);

    let task = tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            let summary = handler
                .handle_message(&ExtensionMessage::OpenLinks(request))
                .await;
            tracing::info!(
                "Background worker opened {} tabs ({} failed)",
                summary.opened.len(),
                summary.failed.len()
            );
        }
        tracing::debug!("Background worker stopped");
    });

    (InProcessChannel::new(tx), task)
}
