//! Group deletion with confirmation.
//!
//! Deleting an empty group happens immediately. A group that still holds links
//! yields a [`PendingGroupDeletion`] instead; nothing is written until the
//! caller hands it back to [`LinkbookManager::confirm_group_deletion`].
//! Dropping the pending value declines the deletion.

use serde::{Deserialize, Serialize};

use crate::managers::linkbook_manager::{log_store_error, LinkbookManager};
use crate::store::RecordStore;
use crate::types::errors::LinkbookResult;
use crate::types::link::{Group, GroupId, LinkId};

/// A group deletion awaiting the user's yes/no.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingGroupDeletion {
    pub group_id: GroupId,
    pub group_name: String,
    /// Number of links that will be deleted with the group, as of the request.
    pub child_count: usize,
}

/// Result of [`LinkbookManager::delete_group`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupDeletion {
    Deleted(Group),
    ConfirmationRequired(PendingGroupDeletion),
}

/// What a confirmed cascade removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeDeleted {
    pub group: Group,
    pub removed_links: Vec<LinkId>,
}

impl<S: RecordStore> LinkbookManager<S> {
    /// Deletes a group, or asks for confirmation when it still has links.
    pub async fn delete_group(&self, id: GroupId) -> LinkbookResult<GroupDeletion> {
        let group = self.require_group(id).await?;
        let children = self
            .store()
            .get_links_by_parent(id)
            .await
            .map_err(log_store_error)?;

        if !children.is_empty() {
            tracing::info!(group = id, children = children.len(), "group deletion needs confirmation");
            return Ok(GroupDeletion::ConfirmationRequired(PendingGroupDeletion {
                group_id: id,
                group_name: group.name,
                child_count: children.len(),
            }));
        }

        self.store()
            .delete_group(id)
            .await
            .map_err(log_store_error)?;
        tracing::info!(group = id, "deleted empty group");
        self.notify_changed().await;
        Ok(GroupDeletion::Deleted(group))
    }

    /// Deletes a group and every link inside it, then notifies once.
    ///
    /// Children are re-read so links added since the request are removed too.
    /// Links go first: a failure part-way leaves the group and its remaining
    /// links in place.
    pub async fn confirm_group_deletion(
        &self,
        pending: PendingGroupDeletion,
    ) -> LinkbookResult<CascadeDeleted> {
        let group = self.require_group(pending.group_id).await?;
        let children = self
            .store()
            .get_links_by_parent(group.id)
            .await
            .map_err(log_store_error)?;

        let mut removed_links = Vec::with_capacity(children.len());
        for child in children {
            self.store()
                .delete_link(child.id)
                .await
                .map_err(log_store_error)?;
            removed_links.push(child.id);
        }
        self.store()
            .delete_group(group.id)
            .await
            .map_err(log_store_error)?;

        tracing::info!(group = group.id, links = removed_links.len(), "deleted group with its links");
        self.notify_changed().await;
        Ok(CascadeDeleted {
            group,
            removed_links,
        })
    }
}
