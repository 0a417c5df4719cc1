// Linkbook Quick Navigation
// Maps the first pinned links to digit shortcuts (Ctrl+1 .. Ctrl+N in the UI).

use serde::Serialize;

use crate::types::link::Link;
use crate::types::tree::PinnedProjection;

/// Digit shortcuts start at 1; 0 is never bound.
pub const FIRST_DIGIT: usize = 1;

/// One bound shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickNavEntry {
    pub digit: usize,
    pub name: String,
    pub url: String,
}

/// Digit bindings derived from a pinned projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuickNav {
    entries: Vec<QuickNavEntry>,
}

impl QuickNav {
    /// Binds the first `limit` children of the pinned root, in pinned order.
    pub fn from_pinned(pinned: &PinnedProjection, limit: usize) -> Self {
        let entries = pinned
            .root_links()
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, link): (usize, &Link)| QuickNavEntry {
                digit: i + FIRST_DIGIT,
                name: link.name.clone(),
                url: link.open_url(),
            })
            .collect();
        Self { entries }
    }

    /// URL bound to `digit`, if any.
    pub fn resolve(&self, digit: usize) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.digit == digit)
            .map(|e| e.url.as_str())
    }

    pub fn entries(&self) -> &[QuickNavEntry] {
        &self.entries
    }
}
