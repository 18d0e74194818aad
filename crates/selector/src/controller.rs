//! Selection state machine
//!
//! ```text
//!            down + modifier                 up (1..=cap links)
//!   Idle ─────────────────────► Dragging ─────────────────────► Idle + pending commit
//!    ▲                            │  ▲                                 │
//!    │   up (0 or > cap links)    │  │ move: re-query, replace         │ grace delay
//!    ├────────────────────────────┤  └─ highlights                     ▼
//!    │   Escape / hidden / unload │                           dispatch + clear
//!    └────────────────────────────┘
//! ```
//!
//! The controller owns all mutable selection state for one page: gesture,
//! highlight set, overlay handle and the pending commit. It never blocks.
//! The grace timer is driven from outside through [`next_deadline`] and
//! [`fire_due`], and URL lists leave through an unbounded channel.
//!
//! [`next_deadline`]: SelectionController::next_deadline
//! [`fire_due`]: SelectionController::fire_due

use browser::OpenLinksRequest;
use dom::{NodeId, PageDocument, Point, SelectionRect};
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::SelectorConfig;
use crate::events::{CancelReason, EventBus, SelectionEvent};
use crate::geometry::{query_links_in_rect, LinkCandidate};
use crate::highlight::HighlightManager;
use crate::input::{Modifiers, PageEvent};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging { start: Point, gesture_id: Uuid },
}

/// Released selection waiting out the grace delay
#[derive(Debug)]
struct PendingCommit {
    gesture_id: Uuid,
    deadline: Instant,
    urls: Vec<String>,
}

pub struct SelectionController<P> {
    page: P,
    config: SelectorConfig,
    highlights: HighlightManager,
    gesture: GestureState,
    overlay: Option<NodeId>,
    pending: Option<PendingCommit>,
    attached: bool,
    outbox: mpsc::UnboundedSender<OpenLinksRequest>,
    events: EventBus,
}

impl<P: PageDocument> SelectionController<P> {
    pub fn new(
        page: P,
        config: SelectorConfig,
        outbox: mpsc::UnboundedSender<OpenLinksRequest>,
    ) -> Self {
        Self {
            page,
            highlights: HighlightManager::new(config.highlight.clone()),
            config,
            gesture: GestureState::Idle,
            overlay: None,
            pending: None,
            attached: false,
            outbox,
            events: EventBus::new(),
        }
    }

    /// Start listening. `channel_available` only affects the banner.
    pub fn attach(&mut self, channel_available: bool) {
        if self.attached {
            return;
        }
        self.attached = true;

        tracing::info!(
            "Link range selector loaded. Hold {} and click-drag to select a range.",
            self.config.modifier.label()
        );
        if channel_available {
            tracing::info!("Link channel detected - background tabs supported");
        } else {
            tracing::warn!("Link channel not available - links will open directly");
        }
    }

    /// Page teardown: drop every trace of the selector from the page
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.cancel(CancelReason::Unload);
        if let Some(overlay) = self.overlay.take() {
            self.page.remove_overlay(overlay);
        }
        self.attached = false;
        tracing::info!("Link range selector detached");
    }

    /// Feed one page event.
    ///
    /// Returns `true` when the event belongs to a gesture and the host
    /// should suppress its default action.
    pub fn handle(&mut self, event: PageEvent, now: Instant) -> bool {
        if !self.attached {
            return false;
        }

        match event {
            PageEvent::PointerDown { point, modifiers } => self.pointer_down(point, modifiers),
            PageEvent::PointerMove { point } => self.pointer_move(point),
            PageEvent::PointerUp { point } => self.pointer_up(point, now),
            PageEvent::KeyDown { key } => {
                if key == "Escape" && (self.is_dragging() || self.pending.is_some()) {
                    self.cancel(CancelReason::Escape);
                }
                false
            }
            PageEvent::VisibilityChange { hidden } => {
                if hidden {
                    self.cancel(CancelReason::Hidden);
                }
                false
            }
            PageEvent::Unload => {
                self.detach();
                false
            }
        }
    }

    /// When the pending commit wants to fire
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Fire the pending commit if its deadline has passed
    pub fn fire_due(&mut self, now: Instant) -> bool {
        let due = matches!(&self.pending, Some(pending) if pending.deadline <= now);
        if due {
            self.flush_pending();
        }
        due
    }

    pub fn state(&self) -> GestureState {
        self.gesture
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, GestureState::Dragging { .. })
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Currently highlighted elements, ascending id order
    pub fn highlighted(&self) -> Vec<NodeId> {
        self.highlights.highlighted()
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SelectionEvent> {
        self.events.subscribe()
    }

    fn pointer_down(&mut self, point: Point, modifiers: Modifiers) -> bool {
        if self.is_dragging() {
            tracing::debug!("Ignoring pointer-down during an active gesture");
            return false;
        }
        if !self.config.modifier.is_held(&modifiers) {
            return false;
        }

        // The previous release is still in its grace window: honor it now
        if self.pending.is_some() {
            self.flush_pending();
        }

        let gesture_id = Uuid::now_v7();
        self.gesture = GestureState::Dragging {
            start: point,
            gesture_id,
        };

        if let Some(overlay) = self.ensure_overlay() {
            self.page
                .show_overlay(overlay, SelectionRect::from_points(point, point));
        }
        self.page.set_cursor(Some(self.config.cursor.as_str()));

        tracing::debug!(gesture = %gesture_id, "Selection started at ({}, {})", point.x, point.y);
        self.events.publish(SelectionEvent::GestureStarted {
            gesture_id: gesture_id.to_string(),
        });
        true
    }

    fn pointer_move(&mut self, point: Point) -> bool {
        let GestureState::Dragging { start, .. } = self.gesture else {
            return false;
        };

        if let Some(overlay) = self.overlay {
            self.page
                .show_overlay(overlay, SelectionRect::from_points(start, point));
        }

        let candidates = query_links_in_rect(&self.page, start, point);
        self.highlights
            .replace(&mut self.page, &element_ids(&candidates));

        self.events.publish(SelectionEvent::Highlighted {
            count: candidates.len(),
        });
        true
    }

    fn pointer_up(&mut self, point: Point, now: Instant) -> bool {
        let GestureState::Dragging { start, gesture_id } = self.gesture else {
            return false;
        };

        self.gesture = GestureState::Idle;
        self.page.set_cursor(None);
        if let Some(overlay) = self.overlay {
            self.page.hide_overlay(overlay);
        }

        // Release coordinates may differ from the last move
        let candidates = query_links_in_rect(&self.page, start, point);

        if candidates.is_empty() {
            self.highlights.clear(&mut self.page);
            tracing::info!(gesture = %gesture_id, "No links found in the selected range");
            self.events.publish(SelectionEvent::Empty);
            return true;
        }

        let cap = self.config.max_links;
        if candidates.len() > cap {
            self.highlights.clear(&mut self.page);
            let message = format!(
                "Found {} links. For safety, only ranges with {} or fewer links will be processed.",
                candidates.len(),
                cap
            );
            tracing::warn!(gesture = %gesture_id, "{}", message);
            self.page.alert(&message);
            self.events.publish(SelectionEvent::CapExceeded {
                found: candidates.len(),
                cap,
            });
            return true;
        }

        // Show exactly what is about to open during the grace window
        self.highlights
            .replace(&mut self.page, &element_ids(&candidates));

        let urls: Vec<String> = candidates
            .iter()
            .map(|c| c.url.as_str().to_owned())
            .collect();
        tracing::debug!(
            gesture = %gesture_id,
            "Scheduling {} links in {:?}",
            urls.len(),
            self.config.dispatch_delay()
        );
        self.pending = Some(PendingCommit {
            gesture_id,
            deadline: now + self.config.dispatch_delay(),
            urls,
        });
        true
    }

    /// Idempotent: safe to call with nothing in progress
    fn cancel(&mut self, reason: CancelReason) {
        let was_dragging = self.is_dragging();
        let had_pending = self.pending.take().is_some();
        let had_highlights = !self.highlights.is_empty();

        self.gesture = GestureState::Idle;
        if was_dragging {
            self.page.set_cursor(None);
        }
        if let Some(overlay) = self.overlay {
            self.page.hide_overlay(overlay);
        }
        self.highlights.clear(&mut self.page);

        if was_dragging || had_pending || had_highlights {
            tracing::debug!("Selection cancelled: {:?}", reason);
            self.events.publish(SelectionEvent::Cancelled { reason });
        }
    }

    fn flush_pending(&mut self) {
        let Some(commit) = self.pending.take() else {
            return;
        };

        tracing::info!(
            gesture = %commit.gesture_id,
            "Opening {} links: {:?}",
            commit.urls.len(),
            commit.urls
        );
        if self
            .outbox
            .send(OpenLinksRequest::new(commit.urls.clone()))
            .is_err()
        {
            tracing::error!("Link dispatcher is gone, {} links dropped", commit.urls.len());
        }

        self.highlights.clear(&mut self.page);
        self.events
            .publish(SelectionEvent::Committed { urls: commit.urls });
    }

    /// Reuse the overlay, creating it on first use. A failed creation is
    /// retried on the next gesture.
    fn ensure_overlay(&mut self) -> Option<NodeId> {
        if self.overlay.is_none() {
            match self.page.create_overlay(&self.config.overlay) {
                Ok(overlay) => self.overlay = Some(overlay),
                Err(e) => tracing::warn!("Selection overlay unavailable: {}", e),
            }
        }
        self.overlay
    }
}

fn element_ids(candidates: &[LinkCandidate]) -> Vec<NodeId> {
    candidates.iter().map(|c| c.element).collect()
}
