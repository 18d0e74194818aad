//! DOM Service - builds a [`Document`] from CDP data
//!
//! This handles:
//! - Parsing CDP `DOM.getDocument` responses into the arena
//! - Inline `style` attribute parsing
//! - Merging viewport layout boxes keyed by backend node id

use serde_json::Value;
use std::collections::HashMap;
use url::Url;

use crate::arena::DomArena;
use crate::document::Document;
use crate::error::{DomError, Result};
use crate::types::*;

/// Configuration for DOM service
#[derive(Debug, Clone)]
pub struct DomServiceConfig {
    /// Descend into `contentDocument` of same-process iframes
    pub include_iframes: bool,
    pub max_iframe_depth: usize,
}

impl Default for DomServiceConfig {
    fn default() -> Self {
        Self {
            include_iframes: false,
            max_iframe_depth: 5,
        }
    }
}

/// Main DOM service
pub struct DomService {
    config: DomServiceConfig,
    arena: DomArena,
}

impl DomService {
    /// Create new DOM service with default config
    pub fn new() -> Self {
        Self::with_config(DomServiceConfig::default())
    }

    /// Create DOM service with custom config
    pub fn with_config(config: DomServiceConfig) -> Self {
        Self {
            config,
            arena: DomArena::new(),
        }
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// Parse CDP DOM tree response and build arena
    ///
    /// Input format matches CDP's DOM.getDocument response:
    /// ```json
    /// {
    ///   "root": {
    ///     "nodeId": 1,
    ///     "backendNodeId": 1,
    ///     "nodeType": 9,
    ///     "nodeName": "#document",
    ///     "children": [...]
    ///   }
    /// }
    /// ```
    pub fn parse_cdp_dom_tree(&mut self, cdp_response: &Value) -> Result<NodeId> {
        let root = cdp_response
            .get("root")
            .ok_or_else(|| DomError::CdpError("Missing 'root' in CDP response".to_string()))?;

        self.arena.clear();
        let root_id = self.parse_node(root, None, 0)?;
        self.arena.set_root(root_id)?;

        Ok(root_id)
    }

    fn parse_node(
        &mut self,
        cdp_node: &Value,
        parent_id: Option<NodeId>,
        iframe_depth: usize,
    ) -> Result<NodeId> {
        let backend_node_id = cdp_node["backendNodeId"]
            .as_u64()
            .ok_or_else(|| DomError::CdpError("Missing backendNodeId".to_string()))?;
        let backend_node_id = u32::try_from(backend_node_id).map_err(|_| {
            DomError::CdpError(format!("backendNodeId out of range: {}", backend_node_id))
        })?;

        let node_type_raw = cdp_node["nodeType"]
            .as_u64()
            .ok_or_else(|| DomError::CdpError("Missing nodeType".to_string()))?;
        let node_type_val = u8::try_from(node_type_raw)
            .map_err(|_| DomError::CdpError(format!("nodeType out of range: {}", node_type_raw)))?;

        let node_type =
            NodeType::from_u8(node_type_val).ok_or_else(|| DomError::InvalidNodeType {
                expected: "valid NodeType".to_string(),
                actual: format!("{}", node_type_val),
            })?;

        let node_name = cdp_node["nodeName"].as_str().unwrap_or("").to_string();

        // CDP sends attributes as a flat [name, value, name, value, ...] list
        let mut attributes = HashMap::new();
        if let Some(attrs) = cdp_node["attributes"].as_array() {
            for pair in attrs.chunks_exact(2) {
                if let (Some(key), Some(value)) = (pair[0].as_str(), pair[1].as_str()) {
                    attributes.insert(key.to_string(), value.to_string());
                }
            }
        }

        let mut node = DomNode::new(0, backend_node_id, node_type, node_name);
        node.node_value = cdp_node["nodeValue"].as_str().unwrap_or("").to_string();
        // The style map is the only copy: a stale attribute would shadow edits
        if let Some(style) = attributes.remove("style") {
            node.inline_style = parse_inline_style(&style);
        }
        node.attributes = attributes;
        node.parent_id = parent_id;

        let current_node_id = self.arena.add_node(node);

        let mut child_ids = smallvec::SmallVec::<[NodeId; 4]>::new();
        if let Some(children) = cdp_node["children"].as_array() {
            for child in children {
                child_ids.push(self.parse_node(child, Some(current_node_id), iframe_depth)?);
            }
        }

        if let Some(content_doc) = cdp_node.get("contentDocument") {
            if self.config.include_iframes && iframe_depth < self.config.max_iframe_depth {
                child_ids.push(self.parse_node(
                    content_doc,
                    Some(current_node_id),
                    iframe_depth + 1,
                )?);
            } else {
                tracing::debug!(
                    "Skipping iframe document under backend node {}",
                    backend_node_id
                );
            }
        }

        self.arena.get_mut(current_node_id)?.children_ids = child_ids;

        Ok(current_node_id)
    }

    /// Attach viewport boxes to parsed nodes
    ///
    /// ```json
    /// { "layout": [ { "backendNodeId": 12, "bounds": [x, y, width, height] } ] }
    /// ```
    ///
    /// Entries for unknown backend ids are skipped.
    pub fn merge_layout(&mut self, layout: &Value) -> Result<usize> {
        let entries = layout["layout"]
            .as_array()
            .ok_or_else(|| DomError::CdpError("Missing 'layout' array".to_string()))?;

        let mut merged = 0;
        for entry in entries {
            let Some(backend_id) = entry["backendNodeId"]
                .as_u64()
                .and_then(|id| u32::try_from(id).ok())
            else {
                continue;
            };
            let Some(node_id) = self.arena.get_node_id_by_backend(backend_id) else {
                tracing::debug!("Layout entry for unknown backend node {}", backend_id);
                continue;
            };
            let bounds: Vec<f64> = entry["bounds"]
                .as_array()
                .map(|b| b.iter().filter_map(Value::as_f64).collect())
                .unwrap_or_default();
            if let [x, y, width, height] = bounds.as_slice() {
                self.arena.get_mut(node_id)?.bounding_box =
                    Some(DomRect::new(*x, *y, *width, *height));
                merged += 1;
            }
        }

        Ok(merged)
    }

    /// Finish loading: hand the arena over as a page document
    pub fn into_document(self, base_url: &str) -> Result<Document> {
        Document::from_arena(self.arena, Url::parse(base_url)?)
    }
}

impl Default for DomService {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a `style` attribute into property → value pairs.
///
/// Property names are lowercased; empty declarations are dropped.
pub fn parse_inline_style(style: &str) -> HashMap<String, String> {
    style
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim();
            if property.is_empty() || value.is_empty() {
                None
            } else {
                Some((property, value.to_string()))
            }
        })
        .collect()
}
