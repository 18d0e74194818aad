//! Input events consumed by the selector

use dom::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys held during a pointer event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

/// Page events, in viewport coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageEvent {
    PointerDown { point: Point, modifiers: Modifiers },
    PointerMove { point: Point },
    PointerUp { point: Point },
    KeyDown { key: String },
    VisibilityChange { hidden: bool },
    Unload,
}

impl PageEvent {
    pub fn down(x: f64, y: f64, modifiers: Modifiers) -> Self {
        PageEvent::PointerDown {
            point: Point::new(x, y),
            modifiers,
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        PageEvent::PointerMove {
            point: Point::new(x, y),
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        PageEvent::PointerUp {
            point: Point::new(x, y),
        }
    }

    pub fn key(key: &str) -> Self {
        PageEvent::KeyDown {
            key: key.to_string(),
        }
    }
}
