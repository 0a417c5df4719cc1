//! Record store adapter.
//!
//! The engine treats storage as two keyed collections with auto-assigned
//! integer ids. Implementations decide how records reach disk.

use async_trait::async_trait;

use crate::types::errors::LinkbookResult;
use crate::types::link::{Group, GroupId, Link, LinkId};

pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;

/// Collection names, used in store error messages and logs.
pub const LINKS_COLLECTION: &str = "linkbookLinks";
pub const GROUPS_COLLECTION: &str = "linkbookGroups";

/// Async keyed store holding the link and group collections.
///
/// `put_*` inserts when the record id is 0 and returns the assigned id;
/// otherwise it writes the record under its existing id. Deleting an id that
/// does not exist is not an error.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_links(&self) -> LinkbookResult<Vec<Link>>;
    async fn get_link(&self, id: LinkId) -> LinkbookResult<Option<Link>>;
    async fn put_link(&self, link: &Link) -> LinkbookResult<LinkId>;
    async fn delete_link(&self, id: LinkId) -> LinkbookResult<()>;
    /// Indexed lookup of a group's direct link children.
    async fn get_links_by_parent(&self, parent: GroupId) -> LinkbookResult<Vec<Link>>;

    async fn get_groups(&self) -> LinkbookResult<Vec<Group>>;
    async fn get_group(&self, id: GroupId) -> LinkbookResult<Option<Group>>;
    async fn put_group(&self, group: &Group) -> LinkbookResult<GroupId>;
    async fn delete_group(&self, id: GroupId) -> LinkbookResult<()>;
}
