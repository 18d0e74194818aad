//! Open a few URLs as background tabs in a running Chrome
//!
//! Start Chrome with `--remote-debugging-port=9222`, then pass the browser
//! websocket URL and the links to open:
//!
//! ```text
//! cargo run --example open_background_tabs -- ws://localhost:9222/devtools/browser/<id> https://example.com
//! ```

use browser::{BackgroundHandler, CdpConfig, CdpTabOpener, ExtensionMessage, OpenLinksRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let config = CdpConfig {
        cdp_url: args.next().unwrap_or_else(|| CdpConfig::default().cdp_url),
        ..Default::default()
    };
    let urls: Vec<String> = args.collect();

    println!("Connecting to Chrome at: {}", config.cdp_url);
    let opener = CdpTabOpener::connect(&config).await?;
    let client = opener.client().clone();
    println!("Connected!");

    let handler = BackgroundHandler::new(opener);
    let summary = handler
        .handle_message(&ExtensionMessage::OpenLinks(OpenLinksRequest::new(urls)))
        .await;

    println!("Opened targets: {:?}", summary.opened);
    if !summary.failed.is_empty() {
        println!("Failed: {:?}", summary.failed);
    }

    // Clean shutdown
    client.close().await?;
    println!("Disconnected");

    Ok(())
}
