//! Core type definitions for the page model
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Geometry is viewport-relative, never document-relative
//! 3. Use SmallVec for small arrays (avoid heap allocation)

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Node identifier (index into arena)
/// u32 allows 4 billion nodes, enough for any webpage
pub type NodeId = u32;

/// Tags whose elements count as hyperlinks when they carry an `href`
pub const HYPERLINK_TAGS: &[&str] = &["A", "AREA"];

/// Node type as numbered by the DOM standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CdataSection = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Element),
            2 => Some(NodeType::Attribute),
            3 => Some(NodeType::Text),
            4 => Some(NodeType::CdataSection),
            5 => Some(NodeType::EntityReference),
            6 => Some(NodeType::Entity),
            7 => Some(NodeType::ProcessingInstruction),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            10 => Some(NodeType::DocumentType),
            11 => Some(NodeType::DocumentFragment),
            12 => Some(NodeType::Notation),
            _ => None,
        }
    }
}

/// Viewport coordinate captured from a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Rectangle with coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DomRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if rectangle intersects with another
    pub fn intersects(&self, other: &DomRect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// Axis-aligned selection rectangle spanned by two corner points.
///
/// Always derived, never stored: `left <= right` and `top <= bottom` hold
/// by construction whatever order the corners arrive in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl SelectionRect {
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Strict overlap: boxes that only share an edge do not count.
    pub fn overlaps(&self, rect: &DomRect) -> bool {
        self.to_dom_rect().intersects(rect)
    }

    pub fn to_dom_rect(&self) -> DomRect {
        DomRect::new(self.left, self.top, self.width(), self.height())
    }
}

/// Inline style properties touched by link highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleChannel {
    Outline,
    OutlineOffset,
    BackgroundColor,
    Transition,
}

impl StyleChannel {
    pub const ALL: [StyleChannel; 4] = [
        StyleChannel::Outline,
        StyleChannel::OutlineOffset,
        StyleChannel::BackgroundColor,
        StyleChannel::Transition,
    ];

    /// CSS property name
    pub fn property(&self) -> &'static str {
        match self {
            StyleChannel::Outline => "outline",
            StyleChannel::OutlineOffset => "outline-offset",
            StyleChannel::BackgroundColor => "background-color",
            StyleChannel::Transition => "transition",
        }
    }
}

/// The main DOM tree node structure
///
/// Design philosophy:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers
/// - Layout box only for rendered elements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub backend_node_id: u32,
    pub node_type: NodeType,

    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    pub node_name: String,
    pub node_value: String,
    pub attributes: HashMap<String, String>,

    /// Inline style declarations, keyed by CSS property name
    pub inline_style: HashMap<String, String>,

    /// Viewport-relative border box (only for rendered elements)
    pub bounding_box: Option<DomRect>,
}

impl DomNode {
    /// Create a new node with required fields
    pub fn new(node_id: NodeId, backend_node_id: u32, node_type: NodeType, node_name: String) -> Self {
        Self {
            node_id,
            backend_node_id,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name,
            node_value: String::new(),
            attributes: HashMap::new(),
            inline_style: HashMap::new(),
            bounding_box: None,
        }
    }

    /// Convenience constructor for element nodes
    pub fn element(tag: &str) -> Self {
        Self::new(0, 0, NodeType::Element, tag.to_uppercase())
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_box(mut self, rect: DomRect) -> Self {
        self.bounding_box = Some(rect);
        self
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// `a[href]` or `area[href]`
    pub fn is_hyperlink(&self) -> bool {
        self.tag_name()
            .map(|tag| HYPERLINK_TAGS.iter().any(|t| tag.eq_ignore_ascii_case(t)))
            .unwrap_or(false)
            && self.attributes.contains_key("href")
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.inline_style.get(property).map(|s| s.as_str())
    }
}
