//! Drag-and-drop relocation gesture tracking.
//!
//! A gesture moves `Idle → Selecting → Dragging` and always ends back in
//! `Idle`, either committed (yielding a [`RelocationDescriptor`] for the
//! engine to apply) or cancelled. The session keeps nothing from a finished
//! gesture.

use serde::Serialize;

use crate::types::link::{EntityKind, Link, ROOT_GROUP_ID};
use crate::types::relocation::{Direction, EntityRef, Listing, RelocationDescriptor};
use crate::types::tree::LinkbookTree;

/// A hovered drop candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverTarget {
    pub target: EntityRef,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationState {
    Idle,
    /// An entity was picked up but the pointer has not moved over anything yet.
    Selecting { selected: EntityRef, listing: Listing },
    /// The entity is being dragged. Activation of the entity is suppressed.
    Dragging {
        selected: EntityRef,
        listing: Listing,
        hover: Option<HoverTarget>,
    },
}

/// Why a gesture ended without a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CancelReason {
    /// Explicit cancel from the driver.
    Requested,
    /// Release with nothing picked up.
    NoSelection,
    /// Release before the entity was ever dragged.
    NotDragging,
    /// Release outside every drop candidate.
    NoTarget,
    /// Release over the dragged entity itself.
    DroppedOnSelf,
    /// A group was released over a link that lives inside a group.
    GroupIntoGroup,
    /// A group was released over the root outside the pinned listing.
    GroupOntoRoot,
    /// The hovered entity is not in the current tree.
    UnknownTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum RelocationOutcome {
    Committed(RelocationDescriptor),
    Cancelled(CancelReason),
}

#[derive(Debug)]
pub struct RelocationSession {
    state: RelocationState,
}

impl Default for RelocationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RelocationSession {
    pub fn new() -> Self {
        Self {
            state: RelocationState::Idle,
        }
    }

    pub fn state(&self) -> RelocationState {
        self.state
    }

    /// Picks up an entity. Any unfinished gesture is discarded.
    pub fn begin_relocation(&mut self, id: i64, kind: EntityKind, listing: Listing) {
        if self.state != RelocationState::Idle {
            tracing::debug!("discarding unfinished relocation gesture");
        }
        self.state = RelocationState::Selecting {
            selected: EntityRef { id, kind },
            listing,
        };
    }

    /// Records the entity under the pointer. Returns false when no gesture is active.
    pub fn hover_target(&mut self, id: i64, kind: EntityKind, direction: Direction) -> bool {
        let hover = Some(HoverTarget {
            target: EntityRef { id, kind },
            direction,
        });
        match self.state {
            RelocationState::Idle => false,
            RelocationState::Selecting { selected, listing }
            | RelocationState::Dragging {
                selected, listing, ..
            } => {
                self.state = RelocationState::Dragging {
                    selected,
                    listing,
                    hover,
                };
                true
            }
        }
    }

    /// Drops the hover marker when the pointer leaves a candidate.
    pub fn clear_hover(&mut self) {
        if let RelocationState::Dragging { hover, .. } = &mut self.state {
            *hover = None;
        }
    }

    /// True while a picked-up entity is being dragged.
    pub fn is_relocatable(&self) -> bool {
        matches!(self.state, RelocationState::Dragging { .. })
    }

    /// URL to open when a link is activated, or `None` while a drag suppresses activation.
    pub fn activation_url(&self, link: &Link) -> Option<String> {
        (!self.is_relocatable()).then(|| link.open_url())
    }

    /// Ends the gesture on pointer release, validated against the current tree.
    pub fn commit_relocation(&mut self, tree: &LinkbookTree) -> RelocationOutcome {
        let state = std::mem::replace(&mut self.state, RelocationState::Idle);
        let outcome = match state {
            RelocationState::Idle => RelocationOutcome::Cancelled(CancelReason::NoSelection),
            RelocationState::Selecting { .. } => {
                RelocationOutcome::Cancelled(CancelReason::NotDragging)
            }
            RelocationState::Dragging { hover: None, .. } => {
                RelocationOutcome::Cancelled(CancelReason::NoTarget)
            }
            RelocationState::Dragging {
                selected,
                listing,
                hover: Some(hover),
            } => match validate_drop(selected, hover.target, listing, tree) {
                Ok(()) => RelocationOutcome::Committed(RelocationDescriptor {
                    selected,
                    target: hover.target,
                    direction: hover.direction,
                    listing,
                }),
                Err(reason) => RelocationOutcome::Cancelled(reason),
            },
        };

        if let RelocationOutcome::Cancelled(reason) = outcome {
            tracing::debug!(?reason, "relocation cancelled");
        }
        outcome
    }

    /// Abandons the gesture. No store mutation follows.
    pub fn cancel_relocation(&mut self) -> RelocationOutcome {
        self.state = RelocationState::Idle;
        RelocationOutcome::Cancelled(CancelReason::Requested)
    }
}

fn validate_drop(
    selected: EntityRef,
    target: EntityRef,
    listing: Listing,
    tree: &LinkbookTree,
) -> Result<(), CancelReason> {
    if selected == target {
        return Err(CancelReason::DroppedOnSelf);
    }

    match target.kind {
        EntityKind::Link => {
            let link = tree.find_link(target.id).ok_or(CancelReason::UnknownTarget)?;
            if selected.kind == EntityKind::Group && !link.is_root_level() {
                return Err(CancelReason::GroupIntoGroup);
            }
        }
        // Group 0 is the root drop target in both listings, pinned links or not.
        EntityKind::Group if target.id == ROOT_GROUP_ID => {
            if selected.kind == EntityKind::Group && listing == Listing::All {
                return Err(CancelReason::GroupOntoRoot);
            }
        }
        EntityKind::Group => {
            if tree.find_group(target.id).is_none() {
                return Err(CancelReason::UnknownTarget);
            }
        }
    }
    Ok(())
}
