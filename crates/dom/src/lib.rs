//! Page model for link range selection
//!
//! A small arena-backed DOM with just enough of the real thing for the
//! selector: element geometry, `href` attributes and inline styles.
//!
//! ```text
//! CDP JSON → DomService → DomArena → Document ──impl──► PageDocument
//!                              ↓
//!                        NodeId (u32)
//! ```

pub mod arena;
pub mod document;
pub mod error;
pub mod page;
pub mod service;
pub mod types;

pub use arena::DomArena;
pub use document::{Document, OVERLAY_ELEMENT_ID};
pub use error::{DomError, Result};
pub use page::{OverlayStyle, PageDocument};
pub use service::{DomService, DomServiceConfig};
pub use types::*;
