//! Applying committed relocations to the store.
//!
//! A relocation places the selected entity next to its target inside one
//! sibling scope: the children of a group, the top level (root links and
//! groups share one ordering space), the pinned links or the pinned groups.
//! The target's neighbours feed the position allocator; when the gap between
//! them is exhausted every sibling in the scope is renumbered and written back
//! before the selected entity.

use crate::managers::linkbook_manager::{log_store_error, LinkbookManager};
use crate::managers::position_allocator::{next_position, place_at};
use crate::managers::relocation::{RelocationOutcome, RelocationSession};
use crate::store::RecordStore;
use crate::types::errors::{LinkbookError, LinkbookResult};
use crate::types::link::{EntityKind, Group, GroupId, Link, ROOT_GROUP_ID};
use crate::types::relocation::{Direction, EntityRef, Listing, RelocationDescriptor};

/// One member of a sibling scope.
#[derive(Debug, Clone)]
enum Sibling {
    Link(Link),
    Group(Group),
}

impl Sibling {
    fn entity(&self) -> EntityRef {
        match self {
            Sibling::Link(link) => EntityRef::link(link.id),
            Sibling::Group(group) => EntityRef::group(group.id),
        }
    }

    fn position(&self, listing: Listing) -> i64 {
        match (self, listing) {
            (Sibling::Link(link), Listing::All) => link.all_position,
            (Sibling::Link(link), Listing::Pinned) => link.pinned_position,
            (Sibling::Group(group), Listing::All) => group.all_position,
            (Sibling::Group(group), Listing::Pinned) => group.pinned_position,
        }
    }

    fn set_position(&mut self, listing: Listing, position: i64) {
        match (self, listing) {
            (Sibling::Link(link), Listing::All) => link.all_position = position,
            (Sibling::Link(link), Listing::Pinned) => link.pinned_position = position,
            (Sibling::Group(group), Listing::All) => group.all_position = position,
            (Sibling::Group(group), Listing::Pinned) => group.pinned_position = position,
        }
    }

    /// Same ordering the tree compiler uses: groups before links on ties.
    fn sort_key(&self, listing: Listing) -> (i64, bool, i64) {
        let entity = self.entity();
        (self.position(listing), entity.kind == EntityKind::Link, entity.id)
    }
}

/// Where in a scope the selected entity lands.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Head,
    Beside(EntityRef, Direction),
}

impl<S: RecordStore> LinkbookManager<S> {
    /// Applies a committed relocation and notifies observers.
    ///
    /// Every record involved is re-read, so a descriptor built against a
    /// stale tree is validated against the current store.
    pub async fn relocate(&self, descriptor: RelocationDescriptor) -> LinkbookResult<()> {
        let RelocationDescriptor {
            selected,
            target,
            direction,
            listing,
        } = descriptor;
        if selected == target {
            return Err(LinkbookError::invalid_relocation(
                selected.kind,
                selected.id,
                "dropped onto itself",
            ));
        }

        match selected.kind {
            EntityKind::Link => self.relocate_link(selected.id, target, direction, listing).await?,
            EntityKind::Group => {
                self.relocate_group(selected.id, target, direction, listing)
                    .await?
            }
        }

        tracing::info!(
            kind = selected.kind.as_str(),
            id = selected.id,
            target_kind = target.kind.as_str(),
            target = target.id,
            ?direction,
            ?listing,
            "relocated"
        );
        self.notify_changed().await;
        Ok(())
    }

    /// Validates the session's gesture against the current tree and applies it.
    ///
    /// The session is back in `Idle` when this returns, whatever the outcome.
    pub async fn commit_relocation(
        &self,
        session: &mut RelocationSession,
    ) -> LinkbookResult<RelocationOutcome> {
        let tree = match self.compile_linkbook_data().await {
            Ok(tree) => tree,
            Err(e) => {
                session.cancel_relocation();
                return Err(e);
            }
        };
        let outcome = session.commit_relocation(&tree);
        if let RelocationOutcome::Committed(descriptor) = outcome {
            self.relocate(descriptor).await?;
        }
        Ok(outcome)
    }

    async fn relocate_link(
        &self,
        id: i64,
        target: EntityRef,
        direction: Direction,
        listing: Listing,
    ) -> LinkbookResult<()> {
        let mut link = self.require_link(id).await?;

        match (target.kind, listing) {
            (EntityKind::Group, _) if target.id == ROOT_GROUP_ID => {
                link.parent = ROOT_GROUP_ID;
                link.all_position = next_position(self.current_maxima().await?.all_position);
            }
            (EntityKind::Group, _) => {
                let group = self.require_group(target.id).await?;
                link.parent = group.id;
                link.all_position = self.next_child_position(&group).await?;
            }
            (EntityKind::Link, Listing::All) => {
                let anchor = self.require_link(target.id).await?;
                let parent = self.resolve_parent(anchor.parent).await?;
                let siblings = self.scope_of_parent(parent, id).await?;
                let slot = Slot::Beside(target, direction);
                link.all_position = self.place(siblings, slot, Listing::All).await?;
                link.parent = parent;
            }
            (EntityKind::Link, Listing::Pinned) => {
                let anchor = self.require_link(target.id).await?;
                if !link.is_pinned || !anchor.is_pinned {
                    return Err(LinkbookError::invalid_relocation(
                        EntityKind::Link,
                        id,
                        "pinned reordering needs both links pinned",
                    ));
                }
                let siblings = self
                    .store()
                    .get_links()
                    .await.map_err(log_store_error)?
                    .into_iter()
                    .filter(|l| l.is_pinned && l.id != id)
                    .map(Sibling::Link)
                    .collect();
                let slot = Slot::Beside(target, direction);
                link.pinned_position = self.place(siblings, slot, Listing::Pinned).await?;
            }
        }

        self.store().put_link(&link).await.map_err(log_store_error)?;
        // Written after the link. A lagging group_position is caught up by
        // next_child_position on the next append.
        if link.parent != ROOT_GROUP_ID {
            if let Err(e) = self.raise_group_position(link.parent, link.all_position).await {
                tracing::warn!(group = link.parent, error = %e, "group position not raised");
            }
        }
        Ok(())
    }

    async fn relocate_group(
        &self,
        id: GroupId,
        target: EntityRef,
        direction: Direction,
        listing: Listing,
    ) -> LinkbookResult<()> {
        let mut group = self.require_group(id).await?;

        let slot = match target.kind {
            EntityKind::Link => {
                let anchor = self.require_link(target.id).await?;
                if !anchor.is_root_level() {
                    return Err(LinkbookError::invalid_relocation(
                        EntityKind::Group,
                        id,
                        "groups cannot be dropped inside another group",
                    ));
                }
                match listing {
                    Listing::All => Slot::Beside(target, direction),
                    Listing::Pinned => Slot::Head,
                }
            }
            EntityKind::Group if target.id == ROOT_GROUP_ID => {
                if listing == Listing::All {
                    return Err(LinkbookError::invalid_relocation(
                        EntityKind::Group,
                        id,
                        "the pinned root only exists in the pinned listing",
                    ));
                }
                Slot::Head
            }
            EntityKind::Group => {
                let anchor = self.require_group(target.id).await?;
                if listing == Listing::Pinned && !anchor.is_pinned {
                    return Err(LinkbookError::invalid_relocation(
                        EntityKind::Group,
                        id,
                        "target group is not pinned",
                    ));
                }
                Slot::Beside(target, direction)
            }
        };

        match listing {
            Listing::All => {
                let siblings = self.scope_of_parent(ROOT_GROUP_ID, 0).await?;
                let siblings = siblings
                    .into_iter()
                    .filter(|s| s.entity() != EntityRef::group(id))
                    .collect();
                group.all_position = self.place(siblings, slot, Listing::All).await?;
            }
            Listing::Pinned => {
                if !group.is_pinned {
                    return Err(LinkbookError::invalid_relocation(
                        EntityKind::Group,
                        id,
                        "only pinned groups reorder in the pinned listing",
                    ));
                }
                let siblings = self
                    .store()
                    .get_groups()
                    .await.map_err(log_store_error)?
                    .into_iter()
                    .filter(|g| g.is_pinned && g.id != id)
                    .map(Sibling::Group)
                    .collect();
                group.pinned_position = self.place(siblings, slot, Listing::Pinned).await?;
            }
        }

        self.store()
            .put_group(&group)
            .await
            .map_err(log_store_error)?;
        Ok(())
    }

    /// A parent pointing at a missing group is treated as the root, matching
    /// where the compiled tree shows such links.
    async fn resolve_parent(&self, parent: GroupId) -> LinkbookResult<GroupId> {
        if parent == ROOT_GROUP_ID {
            return Ok(parent);
        }
        let exists = self
            .store()
            .get_group(parent)
            .await
            .map_err(log_store_error)?
            .is_some();
        Ok(if exists { parent } else { ROOT_GROUP_ID })
    }

    /// Siblings under `parent` in the "all" listing, excluding link `skip`.
    async fn scope_of_parent(&self, parent: GroupId, skip: i64) -> LinkbookResult<Vec<Sibling>> {
        if parent != ROOT_GROUP_ID {
            return Ok(self
                .store()
                .get_links_by_parent(parent)
                .await.map_err(log_store_error)?
                .into_iter()
                .filter(|l| l.id != skip)
                .map(Sibling::Link)
                .collect());
        }

        let groups = self.store().get_groups().await.map_err(log_store_error)?;
        let mut siblings: Vec<Sibling> = self
            .store()
            .get_links()
            .await.map_err(log_store_error)?
            .into_iter()
            .filter(|l| {
                l.id != skip
                    && (l.parent == ROOT_GROUP_ID || !groups.iter().any(|g| g.id == l.parent))
            })
            .map(Sibling::Link)
            .collect();
        siblings.extend(groups.into_iter().map(Sibling::Group));
        Ok(siblings)
    }

    /// Allocates a position for `slot`, writing back renumbered siblings.
    async fn place(
        &self,
        mut siblings: Vec<Sibling>,
        slot: Slot,
        listing: Listing,
    ) -> LinkbookResult<i64> {
        siblings.sort_by_key(|s| s.sort_key(listing));

        let index = match slot {
            Slot::Head => 0,
            Slot::Beside(anchor, direction) => {
                let found = siblings
                    .iter()
                    .position(|s| s.entity() == anchor)
                    .ok_or_else(|| LinkbookError::not_found(anchor.kind, anchor.id))?;
                match direction {
                    Direction::Above => found,
                    Direction::Below => found + 1,
                }
            }
        };

        let positions: Vec<i64> = siblings.iter().map(|s| s.position(listing)).collect();
        let placement = place_at(&positions, index);

        if let Some(renumbered) = placement.renumbered {
            for (sibling, position) in siblings.iter_mut().zip(renumbered) {
                if sibling.position(listing) == position {
                    continue;
                }
                sibling.set_position(listing, position);
                self.persist(sibling).await?;
            }
        }
        Ok(placement.position)
    }

    async fn persist(&self, sibling: &Sibling) -> LinkbookResult<()> {
        let written = match sibling {
            Sibling::Link(link) => self.store().put_link(link).await,
            Sibling::Group(group) => self.store().put_group(group).await,
        };
        written.map(|_| ()).map_err(log_store_error)
    }

    /// Keeps a group's `group_position` at or above its highest child.
    async fn raise_group_position(&self, group_id: GroupId, position: i64) -> LinkbookResult<()> {
        let mut group = self.require_group(group_id).await?;
        let highest = self
            .store()
            .get_links_by_parent(group_id)
            .await.map_err(log_store_error)?
            .iter()
            .map(|l| l.all_position)
            .fold(position, i64::max);
        if highest > group.group_position {
            group.group_position = highest;
            self.store()
                .put_group(&group)
                .await
                .map_err(log_store_error)?;
        }
        Ok(())
    }
}
