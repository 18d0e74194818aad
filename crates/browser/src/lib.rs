//! Privileged link opening
//!
//! The page side never opens tabs itself. It sends an `openLinks` message;
//! this crate receives it and creates one background tab per URL over the
//! Chrome DevTools Protocol. When no channel is available the page side
//! falls back to opening each URL directly.
//!
//! ```text
//! page ──OpenLinksRequest──► LinkChannel ──► BackgroundHandler ──► TabOpener (CDP)
//!   └── on failure ──► DirectOpener, one URL at a time
//! ```

pub mod background;
pub mod cdp;
pub mod dispatch;
pub mod messages;

pub use background::{
    spawn_background_worker, BackgroundHandler, CdpConfig, CdpTabOpener, OpenSummary, TabOpener,
};
pub use cdp::CDPClient;
pub use dispatch::{
    dispatch_open_links, open_links_directly, DirectOpener, DispatchError, DispatchReport,
    DispatchRoute, InProcessChannel, LinkChannel,
};
pub use messages::{ExtensionMessage, OpenLinksRequest};
