use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a link record.
pub type LinkId = i64;

/// Store-assigned identifier for a group record.
pub type GroupId = i64;

/// Reserved group id meaning "no group". Never stored.
pub const ROOT_GROUP_ID: GroupId = 0;

/// Discriminant for the two kinds of linkbook entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Link,
    Group,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Link => "link",
            EntityKind::Group => "group",
        }
    }
}

/// A saved shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: LinkId,
    pub name: String,
    pub link: String,
    pub parent: GroupId,
    pub is_pinned: bool,
    pub all_position: i64,
    pub pinned_position: i64,
}

impl Link {
    /// Returns true when the link lives at the top level.
    pub fn is_root_level(&self) -> bool {
        self.parent == ROOT_GROUP_ID
    }

    /// URL to navigate to when the link is activated.
    ///
    /// Targets saved without a scheme are opened over https.
    pub fn open_url(&self) -> String {
        if self.link.starts_with("http") {
            self.link.clone()
        } else {
            format!("https://{}", self.link)
        }
    }
}

/// A named container of links. Groups only ever live at the top level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub is_pinned: bool,
    pub all_position: i64,
    pub pinned_position: i64,
    /// Highest `all_position` handed out to a link inside this group.
    pub group_position: i64,
}

impl Group {
    /// An unnamed group is a placeholder that was never finished.
    pub fn is_placeholder(&self) -> bool {
        self.name.trim().is_empty()
    }
}
