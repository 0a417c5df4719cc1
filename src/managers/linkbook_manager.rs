//! Linkbook Manager.
//!
//! The engine the UI layer calls into: link and group CRUD, pinning,
//! relocation commits and cascading group deletion, all against an injected
//! [`RecordStore`]. Every successful mutation recompiles the tree and hands it
//! to the registered observers.
//!
//! Mutations always re-read the records they touch instead of trusting a
//! previously compiled tree, so back-to-back calls observe a consistent store.

use std::sync::{Arc, RwLock};

use crate::managers::position_allocator::next_position;
use crate::managers::tree_compiler::{self, DEFAULT_PINNED_ROOT_NAME};
use crate::store::RecordStore;
use crate::types::errors::{LinkbookError, LinkbookResult};
use crate::types::link::{Group, GroupId, Link, LinkId, ROOT_GROUP_ID};
use crate::types::tree::{LinkbookTree, PositionMaxima};

/// Observer invoked with the freshly compiled tree after each mutation.
pub type ChangeCallback = Arc<dyn Fn(&LinkbookTree) + Send + Sync>;

/// Linkbook engine bound to one record store.
pub struct LinkbookManager<S: RecordStore> {
    store: S,
    pinned_root_name: RwLock<String>,
    observers: RwLock<Vec<ChangeCallback>>,
}

impl<S: RecordStore> LinkbookManager<S> {
    /// Creates a new `LinkbookManager` over the provided store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            pinned_root_name: RwLock::new(DEFAULT_PINNED_ROOT_NAME.to_string()),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Overrides the name of the synthetic pinned root.
    pub fn with_pinned_root_name(self, name: impl Into<String>) -> Self {
        self.set_pinned_root_name(name);
        self
    }

    /// Renames the synthetic pinned root for every later compile.
    pub fn set_pinned_root_name(&self, name: impl Into<String>) {
        *self
            .pinned_root_name
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = name.into();
    }

    pub fn pinned_root_name(&self) -> String {
        self.pinned_root_name
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers a change observer.
    pub fn bind_linkbook_data_changed<F>(&self, callback: F)
    where
        F: Fn(&LinkbookTree) + Send + Sync + 'static,
    {
        self.observers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::new(callback));
    }

    /// Compiles the current store contents. Never mutates the store.
    pub async fn compile_linkbook_data(&self) -> LinkbookResult<LinkbookTree> {
        let links = self.store.get_links().await.map_err(log_store_error)?;
        let groups = self.store.get_groups().await.map_err(log_store_error)?;
        Ok(tree_compiler::compile(links, groups, &self.pinned_root_name()))
    }

    /// Recompiles and notifies observers.
    ///
    /// The mutation that triggered this has already been written, so a failed
    /// recompile is logged rather than reported as a failed mutation.
    pub(crate) async fn notify_changed(&self) {
        let tree = match self.compile_linkbook_data().await {
            Ok(tree) => tree,
            Err(e) => {
                tracing::error!(error = %e, "recompile after mutation failed, observers not notified");
                return;
            }
        };
        let observers: Vec<ChangeCallback> = self
            .observers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for observer in observers {
            observer(&tree);
        }
    }

    pub(crate) async fn current_maxima(&self) -> LinkbookResult<PositionMaxima> {
        let links = self.store.get_links().await.map_err(log_store_error)?;
        let groups = self.store.get_groups().await.map_err(log_store_error)?;
        Ok(tree_compiler::scan_maxima(&links, &groups))
    }

    pub(crate) async fn require_link(&self, id: LinkId) -> LinkbookResult<Link> {
        self.store.get_link(id).await.map_err(log_store_error)?.ok_or_else(|| {
            tracing::warn!(link = id, "link not found, it may have been deleted");
            LinkbookError::LinkNotFound(id)
        })
    }

    pub(crate) async fn require_group(&self, id: GroupId) -> LinkbookResult<Group> {
        self.store.get_group(id).await.map_err(log_store_error)?.ok_or_else(|| {
            tracing::warn!(group = id, "group not found, it may have been deleted");
            LinkbookError::GroupNotFound(id)
        })
    }

    /// Next append position inside a group, never below an existing child.
    pub(crate) async fn next_child_position(&self, group: &Group) -> LinkbookResult<i64> {
        let children = self.store.get_links_by_parent(group.id).await.map_err(log_store_error)?;
        let highest = children
            .iter()
            .map(|l| l.all_position)
            .fold(group.group_position, i64::max);
        Ok(next_position(highest))
    }

    // === Links ===

    /// Creates a link at the end of its parent's listing.
    ///
    /// A negative parent is treated as ungrouped.
    pub async fn create_link(
        &self,
        name: &str,
        link: &str,
        parent: GroupId,
        is_pinned: bool,
    ) -> LinkbookResult<Link> {
        let name = name.trim();
        let link = link.trim();
        if name.is_empty() {
            return Err(LinkbookError::Validation(
                "Try again by specifying a name for your link shortcut!".to_string(),
            ));
        }
        if link.is_empty() {
            return Err(LinkbookError::Validation(
                "Try again by specifying a link for your link shortcut!".to_string(),
            ));
        }
        let parent = parent.max(ROOT_GROUP_ID);

        let maxima = self.current_maxima().await?;
        let parent_group = if parent == ROOT_GROUP_ID {
            None
        } else {
            Some(self.require_group(parent).await?)
        };
        let all_position = match &parent_group {
            None => next_position(maxima.all_position),
            Some(group) => self.next_child_position(group).await?,
        };

        let mut record = Link {
            id: 0,
            name: name.to_string(),
            link: link.to_string(),
            parent,
            is_pinned,
            all_position,
            pinned_position: if is_pinned {
                next_position(maxima.pinned_position)
            } else {
                0
            },
        };
        record.id = self.store.put_link(&record).await.map_err(log_store_error)?;
        // The link is committed at this point. A group_position left behind
        // by a failed write is caught up by next_child_position on the next append.
        if let Some(mut group) = parent_group {
            group.group_position = all_position;
            if let Err(e) = self.store.put_group(&group).await {
                log_store_error(e);
            }
        }
        tracing::info!(link = record.id, parent, all_position, "created link");

        self.notify_changed().await;
        Ok(record)
    }

    /// Replaces a link's name and target.
    ///
    /// Empty strings are rejected. A value that is only whitespace keeps the
    /// current value.
    pub async fn edit_link_name_and_link(
        &self,
        id: LinkId,
        new_name: &str,
        new_link: &str,
    ) -> LinkbookResult<Link> {
        if new_name.is_empty() || new_link.is_empty() {
            return Err(LinkbookError::Validation(
                "A link needs both a name and a target.".to_string(),
            ));
        }
        let mut record = self.require_link(id).await?;
        if !new_name.trim().is_empty() {
            record.name = new_name.trim().to_string();
        }
        if !new_link.trim().is_empty() {
            record.link = new_link.trim().to_string();
        }

        self.store.put_link(&record).await.map_err(log_store_error)?;
        tracing::info!(link = id, "edited link");
        self.notify_changed().await;
        Ok(record)
    }

    /// Pins or unpins a link. Pinning appends it to the pinned listing.
    pub async fn edit_link_pin(&self, id: LinkId, is_pinned: bool) -> LinkbookResult<Link> {
        let mut record = self.require_link(id).await?;
        if record.is_pinned == is_pinned {
            return Ok(record);
        }

        record.pinned_position = if is_pinned {
            next_position(self.current_maxima().await?.pinned_position)
        } else {
            0
        };
        record.is_pinned = is_pinned;

        self.store.put_link(&record).await.map_err(log_store_error)?;
        tracing::info!(link = id, is_pinned, "changed link pin");
        self.notify_changed().await;
        Ok(record)
    }

    pub async fn delete_link(&self, id: LinkId) -> LinkbookResult<LinkId> {
        self.require_link(id).await?;
        self.store.delete_link(id).await.map_err(log_store_error)?;
        tracing::info!(link = id, "deleted link");
        self.notify_changed().await;
        Ok(id)
    }

    // === Groups ===

    /// Creates an unnamed placeholder group at the end of the top level.
    ///
    /// Placeholders abandoned by earlier calls are purged first.
    pub async fn create_group(&self, is_pinned: bool) -> LinkbookResult<Group> {
        self.remove_placeholders().await?;

        let maxima = self.current_maxima().await?;
        let mut group = Group {
            id: 0,
            name: String::new(),
            is_pinned,
            all_position: next_position(maxima.all_position),
            pinned_position: if is_pinned {
                next_position(maxima.pinned_position)
            } else {
                0
            },
            group_position: 0,
        };
        group.id = self.store.put_group(&group).await.map_err(log_store_error)?;
        tracing::info!(group = group.id, all_position = group.all_position, "created group");

        self.notify_changed().await;
        Ok(group)
    }

    pub async fn edit_group_name(&self, id: GroupId, new_name: &str) -> LinkbookResult<Group> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(LinkbookError::Validation(
                "Try again by specifying a name for your group!".to_string(),
            ));
        }
        let mut group = self.require_group(id).await?;
        group.name = new_name.to_string();

        self.store.put_group(&group).await.map_err(log_store_error)?;
        tracing::info!(group = id, "renamed group");
        self.notify_changed().await;
        Ok(group)
    }

    /// Pins or unpins a group. Its links keep their own pin flags.
    pub async fn edit_group_pin(&self, id: GroupId, is_pinned: bool) -> LinkbookResult<Group> {
        let mut group = self.require_group(id).await?;
        if group.is_pinned == is_pinned {
            return Ok(group);
        }

        group.pinned_position = if is_pinned {
            next_position(self.current_maxima().await?.pinned_position)
        } else {
            0
        };
        group.is_pinned = is_pinned;

        self.store.put_group(&group).await.map_err(log_store_error)?;
        tracing::info!(group = id, is_pinned, "changed group pin");
        self.notify_changed().await;
        Ok(group)
    }

    /// Deletes every unnamed group that has no links. Returns the removed ids.
    pub async fn purge_unnamed_groups(&self) -> LinkbookResult<Vec<GroupId>> {
        let removed = self.remove_placeholders().await?;
        if !removed.is_empty() {
            self.notify_changed().await;
        }
        Ok(removed)
    }

    async fn remove_placeholders(&self) -> LinkbookResult<Vec<GroupId>> {
        let mut removed = Vec::new();
        for group in self.store.get_groups().await.map_err(log_store_error)? {
            if !group.is_placeholder() {
                continue;
            }
            let children = self
                .store
                .get_links_by_parent(group.id)
                .await
                .map_err(log_store_error)?;
            if !children.is_empty() {
                tracing::warn!(group = group.id, "unnamed group still has links, keeping it");
                continue;
            }
            self.store.delete_group(group.id).await.map_err(log_store_error)?;
            removed.push(group.id);
        }
        if !removed.is_empty() {
            tracing::info!(count = removed.len(), "purged unnamed groups");
        }
        Ok(removed)
    }

    /// Destinations for saving a link: "ungrouped" first, then every named
    /// group in display order.
    pub async fn group_choices(&self, ungrouped_label: &str) -> LinkbookResult<Vec<(GroupId, String)>> {
        let mut groups: Vec<Group> = self
            .store
            .get_groups()
            .await.map_err(log_store_error)?
            .into_iter()
            .filter(|g| !g.is_placeholder())
            .collect();
        groups.sort_by_key(|g| (g.all_position, g.id));

        let mut choices = vec![(ROOT_GROUP_ID, ungrouped_label.to_string())];
        choices.extend(groups.into_iter().map(|g| (g.id, g.name)));
        Ok(choices)
    }
}

/// Logs a failed store read or write before it is returned.
pub(crate) fn log_store_error(err: LinkbookError) -> LinkbookError {
    tracing::error!(error = %err, "store call failed");
    err
}
