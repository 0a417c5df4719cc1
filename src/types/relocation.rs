use serde::{Deserialize, Serialize};

use super::link::EntityKind;

/// Which side of the hovered entity the dragged entity lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

/// Listing a gesture happens in. Selects the ordering key being rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Listing {
    #[default]
    All,
    Pinned,
}

/// Reference to an entity taking part in a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: i64,
    pub kind: EntityKind,
}

impl EntityRef {
    pub fn link(id: i64) -> Self {
        Self { id, kind: EntityKind::Link }
    }

    pub fn group(id: i64) -> Self {
        Self { id, kind: EntityKind::Group }
    }
}

/// Everything needed to apply a committed drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationDescriptor {
    pub selected: EntityRef,
    pub target: EntityRef,
    pub direction: Direction,
    #[serde(default)]
    pub listing: Listing,
}
