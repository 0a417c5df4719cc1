//! SQLite-backed record store.
//!
//! The connection sits behind a tokio mutex so the async engine can share it;
//! every call holds the lock only for the duration of one statement batch.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use super::{RecordStore, GROUPS_COLLECTION, LINKS_COLLECTION};
use crate::database::Database;
use crate::types::errors::{LinkbookError, LinkbookResult};
use crate::types::link::{Group, GroupId, Link, LinkId};

const LINK_COLUMNS: &str = "id, name, link, parent, is_pinned, all_position, pinned_position";
const GROUP_COLUMNS: &str =
    "id, name, is_pinned, all_position, pinned_position, group_position";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self {
            conn: Mutex::new(db.into_connection()),
        }
    }

    /// Convenience for tests: a fresh, migrated in-memory store.
    pub fn open_in_memory() -> LinkbookResult<Self> {
        let db = Database::open_in_memory().map_err(|e| LinkbookError::store("database", e))?;
        Ok(Self::new(db))
    }

    fn row_to_link(row: &rusqlite::Row) -> rusqlite::Result<Link> {
        Ok(Link {
            id: row.get(0)?,
            name: row.get(1)?,
            link: row.get(2)?,
            parent: row.get(3)?,
            is_pinned: row.get(4)?,
            all_position: row.get(5)?,
            pinned_position: row.get(6)?,
        })
    }

    fn row_to_group(row: &rusqlite::Row) -> rusqlite::Result<Group> {
        Ok(Group {
            id: row.get(0)?,
            name: row.get(1)?,
            is_pinned: row.get(2)?,
            all_position: row.get(3)?,
            pinned_position: row.get(4)?,
            group_position: row.get(5)?,
        })
    }

    fn link_err(e: rusqlite::Error) -> LinkbookError {
        LinkbookError::store(LINKS_COLLECTION, e)
    }

    fn group_err(e: rusqlite::Error) -> LinkbookError {
        LinkbookError::store(GROUPS_COLLECTION, e)
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get_links(&self) -> LinkbookResult<Vec<Link>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!("SELECT {LINK_COLUMNS} FROM linkbook_links ORDER BY id"))
            .map_err(Self::link_err)?;
        let rows = stmt.query_map([], Self::row_to_link).map_err(Self::link_err)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(Self::link_err)?);
        }
        Ok(results)
    }

    async fn get_link(&self, id: LinkId) -> LinkbookResult<Option<Link>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("SELECT {LINK_COLUMNS} FROM linkbook_links WHERE id = ?1"),
            params![id],
            Self::row_to_link,
        )
        .optional()
        .map_err(Self::link_err)
    }

    async fn put_link(&self, link: &Link) -> LinkbookResult<LinkId> {
        let conn = self.conn.lock().await;
        if link.id == 0 {
            conn.execute(
                "INSERT INTO linkbook_links (name, link, parent, is_pinned, all_position, pinned_position) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    link.name,
                    link.link,
                    link.parent,
                    link.is_pinned,
                    link.all_position,
                    link.pinned_position
                ],
            )
            .map_err(Self::link_err)?;
            return Ok(conn.last_insert_rowid());
        }

        conn.execute(
            "INSERT OR REPLACE INTO linkbook_links (id, name, link, parent, is_pinned, all_position, pinned_position) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                link.id,
                link.name,
                link.link,
                link.parent,
                link.is_pinned,
                link.all_position,
                link.pinned_position
            ],
        )
        .map_err(Self::link_err)?;
        Ok(link.id)
    }

    async fn delete_link(&self, id: LinkId) -> LinkbookResult<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM linkbook_links WHERE id = ?1", params![id])
            .map_err(Self::link_err)?;
        Ok(())
    }

    async fn get_links_by_parent(&self, parent: GroupId) -> LinkbookResult<Vec<Link>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {LINK_COLUMNS} FROM linkbook_links WHERE parent = ?1 ORDER BY all_position, id"
            ))
            .map_err(Self::link_err)?;
        let rows = stmt
            .query_map(params![parent], Self::row_to_link)
            .map_err(Self::link_err)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(Self::link_err)?);
        }
        Ok(results)
    }

    async fn get_groups(&self) -> LinkbookResult<Vec<Group>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!("SELECT {GROUP_COLUMNS} FROM linkbook_groups ORDER BY id"))
            .map_err(Self::group_err)?;
        let rows = stmt.query_map([], Self::row_to_group).map_err(Self::group_err)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(Self::group_err)?);
        }
        Ok(results)
    }

    async fn get_group(&self, id: GroupId) -> LinkbookResult<Option<Group>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("SELECT {GROUP_COLUMNS} FROM linkbook_groups WHERE id = ?1"),
            params![id],
            Self::row_to_group,
        )
        .optional()
        .map_err(Self::group_err)
    }

    async fn put_group(&self, group: &Group) -> LinkbookResult<GroupId> {
        let conn = self.conn.lock().await;
        if group.id == 0 {
            conn.execute(
                "INSERT INTO linkbook_groups (name, is_pinned, all_position, pinned_position, group_position) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    group.name,
                    group.is_pinned,
                    group.all_position,
                    group.pinned_position,
                    group.group_position
                ],
            )
            .map_err(Self::group_err)?;
            return Ok(conn.last_insert_rowid());
        }

        conn.execute(
            "INSERT OR REPLACE INTO linkbook_groups (id, name, is_pinned, all_position, pinned_position, group_position) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                group.id,
                group.name,
                group.is_pinned,
                group.all_position,
                group.pinned_position,
                group.group_position
            ],
        )
        .map_err(Self::group_err)?;
        Ok(group.id)
    }

    async fn delete_group(&self, id: GroupId) -> LinkbookResult<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM linkbook_groups WHERE id = ?1", params![id])
            .map_err(Self::group_err)?;
        Ok(())
    }
}
