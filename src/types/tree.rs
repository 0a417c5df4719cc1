use serde::{Deserialize, Serialize};

use super::link::{EntityKind, Group, GroupId, Link, ROOT_GROUP_ID};

/// A group together with its ordered link children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNode {
    #[serde(flatten)]
    pub group: Group,
    pub children: Vec<Link>,
}

/// One entry of a compiled listing. Serialized with an explicit `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Link(Link),
    Group(GroupNode),
}

impl TreeNode {
    pub fn kind(&self) -> EntityKind {
        match self {
            TreeNode::Link(_) => EntityKind::Link,
            TreeNode::Group(_) => EntityKind::Group,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            TreeNode::Link(link) => link.id,
            TreeNode::Group(node) => node.group.id,
        }
    }

    pub fn all_position(&self) -> i64 {
        match self {
            TreeNode::Link(link) => link.all_position,
            TreeNode::Group(node) => node.group.all_position,
        }
    }
}

/// The synthetic pinned root plus every pinned group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedProjection {
    /// Pseudo-group with id 0 holding every pinned link. `None` when empty.
    pub root: Option<GroupNode>,
    /// Pinned groups, each carrying only its pinned children.
    pub groups: Vec<GroupNode>,
}

impl PinnedProjection {
    pub fn is_empty(&self) -> bool {
        self.root.is_none() && self.groups.is_empty()
    }

    /// Links of the synthetic root, in display order.
    pub fn root_links(&self) -> &[Link] {
        self.root.as_ref().map(|r| r.children.as_slice()).unwrap_or(&[])
    }
}

/// Running maxima observed while compiling, used for the next allocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionMaxima {
    pub all_position: i64,
    pub pinned_position: i64,
}

/// Output of a compilation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkbookTree {
    pub all: Vec<TreeNode>,
    pub pinned: PinnedProjection,
    pub maxima: PositionMaxima,
}

impl LinkbookTree {
    pub fn find_link(&self, id: i64) -> Option<&Link> {
        self.all.iter().find_map(|node| match node {
            TreeNode::Link(link) if link.id == id => Some(link),
            TreeNode::Link(_) => None,
            TreeNode::Group(group) => group.children.iter().find(|l| l.id == id),
        })
    }

    pub fn find_group(&self, id: GroupId) -> Option<&GroupNode> {
        if id == ROOT_GROUP_ID {
            return self.pinned.root.as_ref();
        }
        self.all.iter().find_map(|node| match node {
            TreeNode::Group(group) if group.group.id == id => Some(group),
            _ => None,
        })
    }

    /// Total number of links anywhere in the "all" listing.
    pub fn link_count(&self) -> usize {
        self.all
            .iter()
            .map(|node| match node {
                TreeNode::Link(_) => 1,
                TreeNode::Group(group) => group.children.len(),
            })
            .sum()
    }
}
