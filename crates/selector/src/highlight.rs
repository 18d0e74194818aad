//! Highlight bookkeeping
//!
//! Highlighting writes four inline style channels on elements the page owns.
//! Each tracked element keeps a snapshot of its prior values so `clear`
//! can put the page back exactly as it was, including "unset".

use ahash::AHashMap;
use dom::{NodeId, PageDocument, StyleChannel};

use crate::config::HighlightStyle;

/// Pre-highlight values, indexed like [`StyleChannel::ALL`]
#[derive(Debug, Clone)]
struct SavedStyle([Option<String>; 4]);

impl SavedStyle {
    fn capture<P: PageDocument + ?Sized>(page: &P, element: NodeId) -> Self {
        Self(StyleChannel::ALL.map(|channel| page.style(element, channel)))
    }

    fn restore<P: PageDocument + ?Sized>(&self, page: &mut P, element: NodeId) {
        for (channel, value) in StyleChannel::ALL.iter().zip(&self.0) {
            page.set_style(element, *channel, value.as_deref());
        }
    }
}

#[derive(Debug)]
pub struct HighlightManager {
    style: HighlightStyle,
    tracked: AHashMap<NodeId, SavedStyle>,
}

impl HighlightManager {
    pub fn new(style: HighlightStyle) -> Self {
        Self {
            style,
            tracked: AHashMap::new(),
        }
    }

    /// Highlight exactly `elements`. The previous set is fully restored
    /// first, so elements shared by both sets are re-snapshotted from
    /// their original style.
    pub fn replace<P: PageDocument + ?Sized>(&mut self, page: &mut P, elements: &[NodeId]) {
        self.clear(page);
        self.apply(page, elements);
    }

    /// Highlight `elements`, skipping any already tracked
    pub fn apply<P: PageDocument + ?Sized>(&mut self, page: &mut P, elements: &[NodeId]) {
        for &element in elements {
            if self.tracked.contains_key(&element) {
                continue;
            }
            let saved = SavedStyle::capture(page, element);
            for channel in StyleChannel::ALL {
                page.set_style(element, channel, Some(self.style.value(channel)));
            }
            self.tracked.insert(element, saved);
        }
    }

    /// Restore every tracked element and forget it
    pub fn clear<P: PageDocument + ?Sized>(&mut self, page: &mut P) {
        for (element, saved) in self.tracked.drain() {
            saved.restore(page, element);
        }
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Tracked elements in ascending id order
    pub fn highlighted(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.tracked.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
