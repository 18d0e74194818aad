//! CDP Protocol Types
//!
//! These are the fundamental types for CDP communication.
//! Keep them minimal - add domain-specific types only when needed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request ID - monotonically increasing
pub type RequestId = u64;

/// Target ID from Chrome
pub type TargetId = String;

/// CDP Request sent to browser
#[derive(Debug, Clone, Serialize)]
pub struct CDPRequest {
    pub id: RequestId,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// CDP Response from browser
#[derive(Debug, Clone, Deserialize)]
pub struct CDPResponse {
    pub id: RequestId,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<ProtocolError>,
}

/// Error object carried in a CDP response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtocolError {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// CDP Event from browser (no request ID)
#[derive(Debug, Clone, Deserialize)]
pub struct CDPEvent {
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Unified CDP Message (response or event)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CDPMessage {
    Response(CDPResponse),
    Event(CDPEvent),
}

/// Params of Target.createTarget
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTargetParams {
    pub url: String,
    /// Open without focusing the new tab
    pub background: bool,
}

/// Result of Target.createTarget
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTargetResult {
    #[serde(rename = "targetId")]
    pub target_id: TargetId,
}
