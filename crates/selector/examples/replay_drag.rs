//! Replay a recorded drag gesture against a captured page
//!
//! The page comes in as `DOM.getDocument` output plus per-node layout boxes.
//! No browser is needed: links "open" by printing their URL.
//!
//! ```text
//! cargo run -p selector --example replay_drag
//! ```

use std::sync::Arc;
use std::time::Duration;

use browser::{DirectOpener, DispatchError};
use dom::DomService;
use selector::{
    run_selector, spawn_dispatcher, Modifiers, PageEvent, SelectionController, SelectorConfig,
};
use serde_json::json;
use tokio::sync::mpsc;

fn captured_page() -> (serde_json::Value, serde_json::Value) {
    let link = |id: u32, href: &str| {
        json!({
            "nodeId": id,
            "backendNodeId": id,
            "nodeType": 1,
            "nodeName": "A",
            "attributes": ["href", href]
        })
    };

    let tree = json!({
        "root": {
            "nodeId": 1,
            "backendNodeId": 1,
            "nodeType": 9,
            "nodeName": "#document",
            "children": [{
                "nodeId": 2,
                "backendNodeId": 2,
                "nodeType": 1,
                "nodeName": "HTML",
                "children": [{
                    "nodeId": 3,
                    "backendNodeId": 3,
                    "nodeType": 1,
                    "nodeName": "BODY",
                    "children": [
                        link(10, "/docs/intro"),
                        link(11, "/docs/install"),
                        link(12, "#top"),
                        link(13, "https://crates.io/crates/tokio"),
                        link(14, "/far/away")
                    ]
                }]
            }]
        }
    });

    let layout = json!({
        "layout": [
            { "backendNodeId": 10, "bounds": [20, 40, 120, 18] },
            { "backendNodeId": 11, "bounds": [20, 70, 120, 18] },
            { "backendNodeId": 12, "bounds": [20, 100, 60, 18] },
            { "backendNodeId": 13, "bounds": [20, 130, 200, 18] },
            { "backendNodeId": 14, "bounds": [20, 900, 80, 18] }
        ]
    });

    (tree, layout)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let (tree, layout) = captured_page();
    let mut service = DomService::new();
    service.parse_cdp_dom_tree(&tree)?;
    let merged = service.merge_layout(&layout)?;
    println!("Loaded page with {} laid-out nodes", merged);
    let page = service.into_document("https://example.org/docs/")?;

    let config = SelectorConfig::from_json(r#"{"dispatch_delay_ms": 200}"#)?;
    let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
    let mut controller = SelectionController::new(page, config, outbox_tx);
    controller.attach(false);

    let direct: Arc<dyn DirectOpener> = Arc::new(|url: &str| -> Result<(), DispatchError> {
        println!("open {}", url);
        Ok(())
    });
    let dispatcher = spawn_dispatcher(outbox_rx, None, direct);

    let (events_tx, events_rx) = mpsc::channel(16);
    let selector = tokio::spawn(run_selector(controller, events_rx));

    let alt = Modifiers {
        alt: true,
        ..Default::default()
    };
    let gesture = [
        PageEvent::down(10.0, 30.0, alt),
        PageEvent::moved(80.0, 80.0),
        PageEvent::moved(150.0, 140.0),
        PageEvent::up(160.0, 150.0),
    ];
    for event in gesture {
        events_tx.send(event).await?;
        tokio::time::sleep(Duration::from_millis(16)).await;
    }

    // Let the grace delay run out
    tokio::time::sleep(Duration::from_millis(400)).await;
    events_tx.send(PageEvent::Unload).await?;

    let controller = selector.await?;
    println!("Selector detached: {}", !controller.is_attached());
    drop(controller);
    dispatcher.await?;

    Ok(())
}
