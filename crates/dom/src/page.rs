//! Page capability interface
//!
//! The selection engine never touches a rendering engine directly. It reads
//! geometry and `href` values and writes a handful of inline style channels
//! through this trait, so the same logic runs against a live page binding or
//! the in-memory [`Document`](crate::document::Document).

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;
use crate::types::{DomRect, NodeId, SelectionRect, StyleChannel};

/// Presentation of the selection overlay element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub border: String,
    pub background_color: String,
    pub z_index: i32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            border: "2px dashed #007bff".to_string(),
            background_color: "rgba(0, 123, 255, 0.1)".to_string(),
            z_index: 999_999,
        }
    }
}

/// What the selection engine needs from a live page.
///
/// Element references are non-owning [`NodeId`]s; the page owns the nodes.
pub trait PageDocument {
    /// Every hyperlink element (`a[href]`, `area[href]`) in document order
    fn query_candidates(&self) -> Vec<NodeId>;

    /// Current viewport-relative border box, `None` if not rendered
    fn bounding_box(&self, node: NodeId) -> Option<DomRect>;

    /// Raw `href` attribute value
    fn href(&self, node: NodeId) -> Option<&str>;

    /// Location relative hrefs resolve against
    fn base_url(&self) -> &Url;

    /// Inline value of one style channel, `None` when unset
    fn style(&self, node: NodeId, channel: StyleChannel) -> Option<String>;

    /// Write one inline style channel; `None` unsets it
    fn set_style(&mut self, node: NodeId, channel: StyleChannel, value: Option<&str>);

    /// Append a hidden overlay element to the body
    fn create_overlay(&mut self, style: &OverlayStyle) -> Result<NodeId>;

    /// Position the overlay over `rect` and make it visible
    fn show_overlay(&mut self, overlay: NodeId, rect: SelectionRect);

    fn hide_overlay(&mut self, overlay: NodeId);

    /// Remove the overlay element from the document
    fn remove_overlay(&mut self, overlay: NodeId);

    /// Body cursor; `None` restores the page default
    fn set_cursor(&mut self, cursor: Option<&str>);

    /// Blocking user-visible notice
    fn alert(&mut self, message: &str);
}
