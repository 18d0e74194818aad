//! CDP (Chrome DevTools Protocol) Client Implementation
//!
//! Only the browser-level target API is used: the privileged side opens
//! background tabs with `Target.createTarget`.

pub mod client;
pub mod protocol;

pub use client::{CDPClient, CDPError};
pub use protocol::{CDPEvent, CDPRequest, CDPResponse, TargetId};
