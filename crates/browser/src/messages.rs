//! Messages exchanged between the page side and the privileged side
//!
//! Wire format is a JSON object tagged by `action`:
//!
//! ```json
//! { "action": "openLinks", "urls": ["https://ex.com/a", "https://ex.com/b"] }
//! ```

use serde::{Deserialize, Serialize};

/// Request to open every URL in its own background tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenLinksRequest {
    pub urls: Vec<String>,
}

impl OpenLinksRequest {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ExtensionMessage {
    OpenLinks(OpenLinksRequest),

    /// Any action this side does not handle
    #[serde(other)]
    Unknown,
}

impl From<OpenLinksRequest> for ExtensionMessage {
    fn from(request: OpenLinksRequest) -> Self {
        ExtensionMessage::OpenLinks(request)
    }
}
