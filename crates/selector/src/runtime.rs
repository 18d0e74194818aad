//! Async drivers
//!
//! [`run_selector`] feeds page events into a controller and fires its grace
//! timer. [`spawn_dispatcher`] drains the controller's outbox so the event
//! loop never waits on tab opening.

use std::sync::Arc;

use browser::{dispatch_open_links, DirectOpener, LinkChannel, OpenLinksRequest};
use dom::PageDocument;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::controller::SelectionController;
use crate::input::PageEvent;

/// Drive `controller` until the event stream closes or the page unloads.
///
/// A released selection still in its grace window when the stream closes is
/// dispatched at its deadline; only an unload drops it. The controller is
/// detached on exit and handed back.
pub async fn run_selector<P: PageDocument>(
    mut controller: SelectionController<P>,
    mut events: mpsc::Receiver<PageEvent>,
) -> SelectionController<P> {
    loop {
        let deadline = controller.next_deadline();

        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    tracing::debug!("Page event stream closed");
                    if let Some(deadline) = controller.next_deadline() {
                        sleep_until(deadline).await;
                        controller.fire_due(deadline);
                    }
                    break;
                };
                let unload = matches!(event, PageEvent::Unload);
                controller.handle(event, Instant::now());
                if unload {
                    break;
                }
            }
            _ = wait_for(deadline) => {
                controller.fire_due(Instant::now());
            }
        }
    }

    controller.detach();
    controller
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Deliver every outbox request through `channel`, or `direct` as fallback.
///
/// Requests are handled one at a time in arrival order. The task ends once
/// the controller owning the sender is dropped.
pub fn spawn_dispatcher(
    mut outbox: mpsc::UnboundedReceiver<OpenLinksRequest>,
    channel: Option<Arc<dyn LinkChannel>>,
    direct: Arc<dyn DirectOpener>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(request) = outbox.recv().await {
            let report =
                dispatch_open_links(channel.as_deref(), direct.as_ref(), request.urls).await;
            tracing::debug!(
                "Dispatch via {:?}: {} opened, {} failed",
                report.route,
                report.opened,
                report.failed
            );
        }
        tracing::debug!("Link dispatcher stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;
    use crate::input::Modifiers;
    use async_trait::async_trait;
    use browser::{DispatchError, OpenLinksRequest};
    use dom::{Document, DomRect};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc::error::TryRecvError;

    fn alt() -> Modifiers {
        Modifiers {
            alt: true,
            ..Default::default()
        }
    }

    fn page() -> Document {
        let mut doc = Document::new("https://ex.com/").unwrap();
        doc.add_link("/a", DomRect::new(10.0, 10.0, 20.0, 20.0)).unwrap();
        doc.add_link("/b", DomRect::new(40.0, 10.0, 20.0, 20.0)).unwrap();
        doc
    }

    fn start() -> (
        mpsc::Sender<PageEvent>,
        mpsc::UnboundedReceiver<OpenLinksRequest>,
        JoinHandle<SelectionController<Document>>,
    ) {
        let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
        let mut controller = SelectionController::new(page(), SelectorConfig::default(), outbox_tx);
        controller.attach(false);

        let (events_tx, events_rx) = mpsc::channel(16);
        let task = tokio::spawn(run_selector(controller, events_rx));
        (events_tx, outbox_rx, task)
    }

    async fn drag(events: &mpsc::Sender<PageEvent>) {
        events.send(PageEvent::down(0.0, 0.0, alt())).await.unwrap();
        events.send(PageEvent::moved(100.0, 50.0)).await.unwrap();
        events.send(PageEvent::up(100.0, 50.0)).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_fires_after_grace_delay() {
        let (events, mut outbox, task) = start();
        let started = Instant::now();

        drag(&events).await;
        let request = outbox.recv().await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(500));
        assert_eq!(
            request.urls,
            vec!["https://ex.com/a".to_string(), "https://ex.com/b".to_string()]
        );

        drop(events);
        let controller = task.await.unwrap();
        assert!(!controller.is_attached());
        assert!(controller.highlighted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_escape_in_grace_window_cancels() {
        let (events, mut outbox, task) = start();

        drag(&events).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        events.send(PageEvent::key("Escape")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(outbox.try_recv(), Err(TryRecvError::Empty));

        events.send(PageEvent::Unload).await.unwrap();
        let controller = task.await.unwrap();
        assert!(controller.page().overlay().is_none());
        assert!(controller.highlighted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unload_during_grace_window_drops_commit() {
        let (events, mut outbox, task) = start();

        drag(&events).await;
        events.send(PageEvent::Unload).await.unwrap();
        let controller = task.await.unwrap();

        assert!(!controller.has_pending());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(outbox.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_close_during_grace_window_still_dispatches() {
        let (events, mut outbox, task) = start();
        let started = Instant::now();

        drag(&events).await;
        drop(events);
        let controller = task.await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(500));
        assert!(!controller.has_pending());
        assert!(!controller.is_attached());
        assert!(controller.highlighted().is_empty());
        assert_eq!(outbox.try_recv().unwrap().urls.len(), 2);
    }

    struct BrokenChannel;

    #[async_trait]
    impl LinkChannel for BrokenChannel {
        async fn send(&self, _request: OpenLinksRequest) -> Result<(), DispatchError> {
            Err(DispatchError::ChannelClosed)
        }
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, Arc<dyn DirectOpener>) {
        let opened = Arc::new(Mutex::new(Vec::new()));
        let sink = opened.clone();
        let direct: Arc<dyn DirectOpener> =
            Arc::new(move |url: &str| -> Result<(), DispatchError> {
                sink.lock().unwrap().push(url.to_string());
                Ok(())
            });
        (opened, direct)
    }

    #[tokio::test]
    async fn test_dispatcher_falls_back_to_direct() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (opened, direct) = recorder();
        let channel: Arc<dyn LinkChannel> = Arc::new(BrokenChannel);
        let task = spawn_dispatcher(rx, Some(channel), direct);

        tx.send(OpenLinksRequest::new(vec!["https://ex.com/1".into()]))
            .unwrap();
        tx.send(OpenLinksRequest::new(vec![
            "https://ex.com/2".into(),
            "https://ex.com/3".into(),
        ]))
        .unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(
            *opened.lock().unwrap(),
            vec!["https://ex.com/1", "https://ex.com/2", "https://ex.com/3"]
        );
    }

    #[tokio::test]
    async fn test_dispatcher_prefers_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (link_tx, mut link_rx) = mpsc::channel(4);
        let (opened, direct) = recorder();
        let channel: Arc<dyn LinkChannel> = Arc::new(browser::InProcessChannel::new(link_tx));
        let task = spawn_dispatcher(rx, Some(channel), direct);

        tx.send(OpenLinksRequest::new(vec!["https://ex.com/1".into()]))
            .unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(link_rx.recv().await.unwrap().urls, vec!["https://ex.com/1"]);
        assert!(opened.lock().unwrap().is_empty());
    }
}
