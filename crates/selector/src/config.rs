//! Selector configuration
//!
//! Every field has a default, so a partial JSON document (or `{}`) is a
//! valid configuration.

use dom::{OverlayStyle, StyleChannel};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, SelectorError};
use crate::input::Modifiers;

/// Key that must be held when the pointer goes down to start a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Alt,
    Ctrl,
    Shift,
    Meta,
}

impl Modifier {
    pub fn is_held(&self, modifiers: &Modifiers) -> bool {
        match self {
            Modifier::Alt => modifiers.alt,
            Modifier::Ctrl => modifiers.ctrl,
            Modifier::Shift => modifiers.shift,
            Modifier::Meta => modifiers.meta,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Modifier::Alt => "Alt",
            Modifier::Ctrl => "Ctrl",
            Modifier::Shift => "Shift",
            Modifier::Meta => "Meta",
        }
    }
}

/// Values written to the four highlight channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
    pub outline: String,
    pub outline_offset: String,
    pub background_color: String,
    pub transition: String,
}

impl HighlightStyle {
    pub fn value(&self, channel: StyleChannel) -> &str {
        match channel {
            StyleChannel::Outline => &self.outline,
            StyleChannel::OutlineOffset => &self.outline_offset,
            StyleChannel::BackgroundColor => &self.background_color,
            StyleChannel::Transition => &self.transition,
        }
    }
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            outline: "2px solid #ff4444".to_string(),
            outline_offset: "2px".to_string(),
            background_color: "rgba(255, 68, 68, 0.2)".to_string(),
            transition: "all 0.2s ease".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub modifier: Modifier,

    /// Largest selection opened without refusal
    pub max_links: usize,

    /// Grace period between release and dispatch
    pub dispatch_delay_ms: u64,

    /// Body cursor while dragging
    pub cursor: String,

    pub highlight: HighlightStyle,
    pub overlay: OverlayStyle,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            modifier: Modifier::Alt,
            max_links: 10,
            dispatch_delay_ms: 500,
            cursor: "crosshair".to_string(),
            highlight: HighlightStyle::default(),
            overlay: OverlayStyle::default(),
        }
    }
}

impl SelectorConfig {
    /// Parse and validate a JSON config
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: SelectorConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_links == 0 {
            return Err(SelectorError::InvalidConfig(
                "max_links must be at least 1".to_string(),
            ));
        }
        if self.cursor.trim().is_empty() {
            return Err(SelectorError::InvalidConfig(
                "cursor must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn dispatch_delay(&self) -> Duration {
        Duration::from_millis(self.dispatch_delay_ms)
    }
}
