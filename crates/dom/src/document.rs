//! In-memory page document
//!
//! Arena-backed implementation of [`PageDocument`]. Used as the page model
//! when a document is loaded from CDP data, and as the test double for the
//! selection engine.

use url::Url;

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::page::{OverlayStyle, PageDocument};
use crate::types::{DomNode, DomRect, NodeId, NodeType, SelectionRect, StyleChannel};

/// `id` attribute of the selection overlay element
pub const OVERLAY_ELEMENT_ID: &str = "link-range-selector-box";

#[derive(Debug)]
pub struct Document {
    arena: DomArena,
    base_url: Url,
    body_id: NodeId,
    alerts: Vec<String>,
}

impl Document {
    /// Empty `#document > HTML > BODY` page at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let mut arena = DomArena::new();
        let root = arena.add_node(DomNode::new(0, 0, NodeType::Document, "#document".into()));
        arena.set_root(root)?;
        let html = arena.append_child(root, DomNode::element("html"))?;
        let body_id = arena.append_child(html, DomNode::element("body"))?;

        Ok(Self {
            arena,
            base_url,
            body_id,
            alerts: Vec::new(),
        })
    }

    /// Wrap an already-built tree; it must contain a `BODY` element
    pub fn from_arena(arena: DomArena, base_url: Url) -> Result<Self> {
        let body_id = arena.find_by_tag("BODY").ok_or(DomError::MissingBody)?;
        Ok(Self {
            arena,
            base_url,
            body_id,
            alerts: Vec::new(),
        })
    }

    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    pub fn body(&self) -> NodeId {
        self.body_id
    }

    /// Append `node` under `parent`
    pub fn append(&mut self, parent: NodeId, node: DomNode) -> Result<NodeId> {
        self.arena.append_child(parent, node)
    }

    /// Append an `<a href>` with a rendered box to the body
    pub fn add_link(&mut self, href: &str, rect: DomRect) -> Result<NodeId> {
        let link = DomNode::element("a").with_attr("href", href).with_box(rect);
        self.arena.append_child(self.body_id, link)
    }

    /// Move an element (layout changed between queries)
    pub fn set_bounding_box(&mut self, node: NodeId, rect: Option<DomRect>) -> Result<()> {
        self.arena.get_mut(node)?.bounding_box = rect;
        Ok(())
    }

    pub fn cursor(&self) -> Option<&str> {
        self.arena.get(self.body_id).ok()?.style("cursor")
    }

    /// Notices raised through [`PageDocument::alert`], oldest first
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// The overlay element, if it is currently attached to the document
    pub fn overlay(&self) -> Option<&DomNode> {
        let id = self.arena.find_by_id(OVERLAY_ELEMENT_ID)?;
        self.arena.get(id).ok()
    }

    fn set_inline(&mut self, node: NodeId, property: &str, value: Option<&str>) {
        match self.arena.get_mut(node) {
            Ok(node) => match value {
                Some(value) if !value.is_empty() => {
                    node.inline_style
                        .insert(property.to_string(), value.to_string());
                }
                _ => {
                    node.inline_style.remove(property);
                }
            },
            Err(e) => tracing::warn!("Cannot set {} on missing node: {}", property, e),
        }
    }
}

impl PageDocument for Document {
    fn query_candidates(&self) -> Vec<NodeId> {
        self.arena.find_in_order(DomNode::is_hyperlink)
    }

    fn bounding_box(&self, node: NodeId) -> Option<DomRect> {
        self.arena.get(node).ok()?.bounding_box
    }

    fn href(&self, node: NodeId) -> Option<&str> {
        self.arena.get(node).ok()?.attr("href")
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn style(&self, node: NodeId, channel: StyleChannel) -> Option<String> {
        self.arena
            .get(node)
            .ok()?
            .style(channel.property())
            .map(String::from)
    }

    fn set_style(&mut self, node: NodeId, channel: StyleChannel, value: Option<&str>) {
        self.set_inline(node, channel.property(), value);
    }

    fn create_overlay(&mut self, style: &OverlayStyle) -> Result<NodeId> {
        let mut overlay = DomNode::element("div").with_attr("id", OVERLAY_ELEMENT_ID);
        for (property, value) in [
            ("position", "fixed".to_string()),
            ("border", style.border.clone()),
            ("background-color", style.background_color.clone()),
            ("pointer-events", "none".to_string()),
            ("z-index", style.z_index.to_string()),
            ("display", "none".to_string()),
        ] {
            overlay.inline_style.insert(property.to_string(), value);
        }

        self.arena.append_child(self.body_id, overlay)
    }

    fn show_overlay(&mut self, overlay: NodeId, rect: SelectionRect) {
        for (property, value) in [
            ("left", rect.left),
            ("top", rect.top),
            ("width", rect.width()),
            ("height", rect.height()),
        ] {
            self.set_inline(overlay, property, Some(&format!("{}px", value)));
        }
        self.set_inline(overlay, "display", Some("block"));
        if let Ok(node) = self.arena.get_mut(overlay) {
            node.bounding_box = Some(rect.to_dom_rect());
        }
    }

    fn hide_overlay(&mut self, overlay: NodeId) {
        self.set_inline(overlay, "display", Some("none"));
    }

    fn remove_overlay(&mut self, overlay: NodeId) {
        if let Err(e) = self.arena.detach(overlay) {
            tracing::warn!("Overlay removal failed: {}", e);
        }
    }

    fn set_cursor(&mut self, cursor: Option<&str>) {
        let body = self.body_id;
        self.set_inline(body, "cursor", cursor);
    }

    fn alert(&mut self, message: &str) {
        tracing::warn!("Page alert: {}", message);
        self.alerts.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_exclude_non_links() {
        let mut doc = Document::new("https://ex.com/x/y").unwrap();
        let a = doc.add_link("/a", DomRect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let body = doc.body();
        doc.append(body, DomNode::element("a")).unwrap();
        doc.append(body, DomNode::element("span").with_attr("href", "/x"))
            .unwrap();
        let area = doc
            .append(body, DomNode::element("area").with_attr("href", "/b"))
            .unwrap();

        assert_eq!(doc.query_candidates(), vec![a, area]);
        assert_eq!(doc.href(a), Some("/a"));
    }

    #[test]
    fn test_style_set_and_unset() {
        let mut doc = Document::new("https://ex.com/").unwrap();
        let a = doc.add_link("/a", DomRect::zero()).unwrap();

        assert_eq!(doc.style(a, StyleChannel::Outline), None);
        doc.set_style(a, StyleChannel::Outline, Some("1px solid red"));
        assert_eq!(
            doc.style(a, StyleChannel::Outline).as_deref(),
            Some("1px solid red")
        );
        doc.set_style(a, StyleChannel::Outline, None);
        assert_eq!(doc.style(a, StyleChannel::Outline), None);
    }

    #[test]
    fn test_overlay_lifecycle() {
        let mut doc = Document::new("https://ex.com/").unwrap();
        let overlay = doc.create_overlay(&OverlayStyle::default()).unwrap();
        assert_eq!(doc.overlay().unwrap().style("display"), Some("none"));
        // Overlay is never a link candidate
        assert!(doc.query_candidates().is_empty());

        let rect = SelectionRect::from_points((30.0, 40.0).into(), (10.0, 10.0).into());
        doc.show_overlay(overlay, rect);
        let node = doc.overlay().unwrap();
        assert_eq!(node.style("display"), Some("block"));
        assert_eq!(node.style("left"), Some("10px"));
        assert_eq!(node.style("height"), Some("30px"));

        doc.hide_overlay(overlay);
        assert_eq!(doc.overlay().unwrap().style("display"), Some("none"));

        doc.remove_overlay(overlay);
        assert!(doc.overlay().is_none());
    }

    #[test]
    fn test_cursor_and_alerts() {
        let mut doc = Document::new("https://ex.com/").unwrap();
        doc.set_cursor(Some("crosshair"));
        assert_eq!(doc.cursor(), Some("crosshair"));
        doc.set_cursor(None);
        assert_eq!(doc.cursor(), None);

        doc.alert("hello");
        assert_eq!(doc.alerts().to_vec(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_from_arena_requires_body() {
        let mut arena = DomArena::new();
        let root = arena.add_node(DomNode::new(0, 0, NodeType::Document, "#document".into()));
        arena.set_root(root).unwrap();
        let url = Url::parse("https://ex.com/").unwrap();

        assert!(matches!(
            Document::from_arena(arena, url),
            Err(DomError::MissingBody)
        ));
    }

    #[test]
    fn test_create_overlay_reports_missing_body() {
        let mut doc = Document::new("https://ex.com/").unwrap();
        doc.arena.clear();

        assert!(matches!(
            doc.create_overlay(&OverlayStyle::default()),
            Err(DomError::NodeNotFound(_))
        ));
    }
}
