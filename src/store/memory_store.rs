//! In-memory record store.
//!
//! Mirrors the SQLite store's semantics with ordered maps. Writes can be made
//! to fail on demand so callers can exercise their store-failure paths.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{RecordStore, GROUPS_COLLECTION, LINKS_COLLECTION};
use crate::types::errors::{LinkbookError, LinkbookResult};
use crate::types::link::{Group, GroupId, Link, LinkId};

#[derive(Default)]
struct Collections {
    links: BTreeMap<LinkId, Link>,
    groups: BTreeMap<GroupId, Group>,
    next_link_id: LinkId,
    next_group_id: GroupId,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
    fail_writes: AtomicBool,
    fail_link_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every put and delete fails with a store error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// While set, puts and deletes on the link collection fail. Groups stay writable.
    pub fn set_fail_link_writes(&self, fail: bool) {
        self.fail_link_writes.store(fail, Ordering::SeqCst);
    }

    /// While set, every get fails with a store error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_readable(&self, collection: &'static str) -> LinkbookResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(LinkbookError::store(collection, "read rejected"));
        }
        Ok(())
    }

    fn lock(&self, collection: &'static str) -> LinkbookResult<MutexGuard<'_, Collections>> {
        self.inner
            .lock()
            .map_err(|_| LinkbookError::store(collection, "collection lock poisoned"))
    }

    fn check_writable(&self, collection: &'static str) -> LinkbookResult<()> {
        let links_blocked =
            collection == LINKS_COLLECTION && self.fail_link_writes.load(Ordering::SeqCst);
        if links_blocked || self.fail_writes.load(Ordering::SeqCst) {
            return Err(LinkbookError::store(collection, "write rejected"));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_links(&self) -> LinkbookResult<Vec<Link>> {
        self.check_readable(LINKS_COLLECTION)?;
        Ok(self.lock(LINKS_COLLECTION)?.links.values().cloned().collect())
    }

    async fn get_link(&self, id: LinkId) -> LinkbookResult<Option<Link>> {
        self.check_readable(LINKS_COLLECTION)?;
        Ok(self.lock(LINKS_COLLECTION)?.links.get(&id).cloned())
    }

    async fn put_link(&self, link: &Link) -> LinkbookResult<LinkId> {
        self.check_writable(LINKS_COLLECTION)?;
        let mut inner = self.lock(LINKS_COLLECTION)?;
        let mut record = link.clone();
        if record.id == 0 {
            inner.next_link_id += 1;
            record.id = inner.next_link_id;
        } else if record.id > inner.next_link_id {
            inner.next_link_id = record.id;
        }
        let id = record.id;
        inner.links.insert(id, record);
        Ok(id)
    }

    async fn delete_link(&self, id: LinkId) -> LinkbookResult<()> {
        self.check_writable(LINKS_COLLECTION)?;
        self.lock(LINKS_COLLECTION)?.links.remove(&id);
        Ok(())
    }

    async fn get_links_by_parent(&self, parent: GroupId) -> LinkbookResult<Vec<Link>> {
        self.check_readable(LINKS_COLLECTION)?;
        let inner = self.lock(LINKS_COLLECTION)?;
        let mut children: Vec<Link> = inner
            .links
            .values()
            .filter(|l| l.parent == parent)
            .cloned()
            .collect();
        children.sort_by_key(|l| (l.all_position, l.id));
        Ok(children)
    }

    async fn get_groups(&self) -> LinkbookResult<Vec<Group>> {
        self.check_readable(GROUPS_COLLECTION)?;
        Ok(self.lock(GROUPS_COLLECTION)?.groups.values().cloned().collect())
    }

    async fn get_group(&self, id: GroupId) -> LinkbookResult<Option<Group>> {
        self.check_readable(GROUPS_COLLECTION)?;
        Ok(self.lock(GROUPS_COLLECTION)?.groups.get(&id).cloned())
    }

    async fn put_group(&self, group: &Group) -> LinkbookResult<GroupId> {
        self.check_writable(GROUPS_COLLECTION)?;
        let mut inner = self.lock(GROUPS_COLLECTION)?;
        let mut record = group.clone();
        if record.id == 0 {
            inner.next_group_id += 1;
            record.id = inner.next_group_id;
        } else if record.id > inner.next_group_id {
            inner.next_group_id = record.id;
        }
        let id = record.id;
        inner.groups.insert(id, record);
        Ok(id)
    }

    async fn delete_group(&self, id: GroupId) -> LinkbookResult<()> {
        self.check_writable(GROUPS_COLLECTION)?;
        self.lock(GROUPS_COLLECTION)?.groups.remove(&id);
        Ok(())
    }
}
