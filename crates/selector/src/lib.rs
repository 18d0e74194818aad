//! Link range selection
//!
//! Hold a modifier, drag a rectangle across the page, and every hyperlink
//! under it opens in a background tab after a short grace period.
//!
//! ```text
//! PageEvent ──► SelectionController ──► geometry query ──► HighlightManager
//!                      │ release (1..=cap links)
//!                      ▼ after grace delay
//!               outbox ──► dispatcher ──► LinkChannel / DirectOpener
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod geometry;
pub mod highlight;
pub mod input;
pub mod runtime;

pub use config::{HighlightStyle, Modifier, SelectorConfig};
pub use controller::{GestureState, SelectionController};
pub use error::{Result, SelectorError};
pub use events::{CancelReason, EventBus, SelectionEvent};
pub use geometry::{query_links_in_rect, resolve_href, LinkCandidate};
pub use highlight::HighlightManager;
pub use input::{Modifiers, PageEvent};
pub use runtime::{run_selector, spawn_dispatcher};
