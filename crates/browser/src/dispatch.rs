//! Link dispatch - hand a URL list to the privileged side, or open it here
//!
//! The privileged channel is preferred because it can open tabs without
//! stealing focus. When it is missing or fails, every URL is opened through
//! the direct path instead, one attempt per URL, each failure isolated.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::cdp::CDPError;
use crate::messages::OpenLinksRequest;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Link channel closed")]
    ChannelClosed,

    #[error("Link channel rejected request: {0}")]
    Rejected(String),

    #[error("Failed to open {url}: {reason}")]
    OpenFailed { url: String, reason: String },

    #[error("CDP error: {0}")]
    Cdp(#[from] CDPError),
}

/// Privileged message channel to the tab-opening side
#[async_trait]
pub trait LinkChannel: Send + Sync {
    async fn send(&self, request: OpenLinksRequest) -> Result<(), DispatchError>;
}

/// Same-context opener used when the channel is unavailable
pub trait DirectOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<(), DispatchError>;
}

impl<F> DirectOpener for F
where
    F: Fn(&str) -> Result<(), DispatchError> + Send + Sync,
{
    fn open(&self, url: &str) -> Result<(), DispatchError> {
        self(url)
    }
}

/// Which path delivered the links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchRoute {
    Channel,
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub route: DispatchRoute,
    /// URLs handed off (channel) or opened (direct)
    pub opened: usize,
    pub failed: usize,
}

/// Send `urls` over `channel`, falling back to `direct` on any failure.
///
/// Never fails: the report says what happened.
pub async fn dispatch_open_links(
    channel: Option<&dyn LinkChannel>,
    direct: &dyn DirectOpener,
    urls: Vec<String>,
) -> DispatchReport {
    tracing::info!("Opening {} links: {:?}", urls.len(), urls);

    let Some(channel) = channel else {
        tracing::warn!("Link channel not available, opening links directly");
        return open_links_directly(direct, &urls);
    };

    let count = urls.len();
    match channel.send(OpenLinksRequest::new(urls.clone())).await {
        Ok(()) => DispatchReport {
            route: DispatchRoute::Channel,
            opened: count,
            failed: 0,
        },
        Err(e) => {
            tracing::error!("Failed to send links over channel: {}", e);
            open_links_directly(direct, &urls)
        }
    }
}

/// Open each URL on its own; one failure never stops the rest
pub fn open_links_directly(direct: &dyn DirectOpener, urls: &[String]) -> DispatchReport {
    let mut report = DispatchReport {
        route: DispatchRoute::Direct,
        opened: 0,
        failed: 0,
    };

    for url in urls {
        match direct.open(url) {
            Ok(()) => report.opened += 1,
            Err(e) => {
                tracing::error!("Failed to open URL {}: {}", url, e);
                report.failed += 1;
            }
        }
    }

    report
}

/// In-process channel feeding a background worker
#[derive(Clone)]
pub struct InProcessChannel {
    tx: mpsc::Sender<OpenLinksRequest>,
}

impl InProcessChannel {
    pub fn new(tx: mpsc::Sender<OpenLinksRequest>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl LinkChannel for InProcessChannel {
    async fn send(&self, request: OpenLinksRequest) -> Result<(), DispatchError> {
        self.tx
            .send(request)
            .await
            .map_err(|_| DispatchError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FailingChannel;

    #[async_trait]
    impl LinkChannel for FailingChannel {
        async fn send(&self, _request: OpenLinksRequest) -> Result<(), DispatchError> {
            Err(DispatchError::Rejected("no receiver".into()))
        }
    }

    #[derive(Default)]
    struct RecordingOpener {
        attempts: Mutex<Vec<String>>,
    }

    impl DirectOpener for RecordingOpener {
        fn open(&self, url: &str) -> Result<(), DispatchError> {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(url.to_string());
            if attempts.len() == 1 {
                return Err(DispatchError::OpenFailed {
                    url: url.to_string(),
                    reason: "popup blocked".into(),
                });
            }
            Ok(())
        }
    }

    fn urls() -> Vec<String> {
        vec![
            "https://ex.com/1".into(),
            "https://ex.com/2".into(),
            "https://ex.com/3".into(),
        ]
    }

    #[tokio::test]
    async fn test_failed_channel_falls_back_to_every_url() {
        let opener = RecordingOpener::default();
        let channel_ref: &dyn LinkChannel = &FailingChannel;
        let report = dispatch_open_links(Some(channel_ref), &opener, urls()).await;

        assert_eq!(*opener.attempts.lock().unwrap(), urls());
        assert_eq!(
            report,
            DispatchReport {
                route: DispatchRoute::Direct,
                opened: 2,
                failed: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_missing_channel_opens_directly() {
        let opener = RecordingOpener::default();
        let report = dispatch_open_links(None, &opener, urls()).await;

        assert_eq!(report.route, DispatchRoute::Direct);
        assert_eq!(opener.attempts.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_channel_delivery() {
        let (tx, mut rx) = mpsc::channel(4);
        let channel = InProcessChannel::new(tx);
        let opener = |_: &str| -> Result<(), DispatchError> { panic!("direct path used") };

        let channel_ref: &dyn LinkChannel = &channel;
        let report = dispatch_open_links(Some(channel_ref), &opener, urls()).await;

        assert_eq!(report.route, DispatchRoute::Channel);
        assert_eq!(rx.recv().await.unwrap().urls, urls());
    }

    #[tokio::test]
    async fn test_closed_channel_falls_back() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let channel = InProcessChannel::new(tx);
        let opener = RecordingOpener::default();

        let channel_ref: &dyn LinkChannel = &channel;
        let report = dispatch_open_links(Some(channel_ref), &opener, urls()).await;
        assert_eq!(report.route, DispatchRoute::Direct);
        assert_eq!(opener.attempts.lock().unwrap().len(), 3);
    }
}
