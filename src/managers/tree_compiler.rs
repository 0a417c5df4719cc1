//! Tree compilation.
//!
//! Turns the flat link and group collections into the nested "all" listing
//! and derives the pinned projection from it. Compilation is pure: the same
//! records always produce the same tree.

use std::collections::{HashMap, HashSet};

use crate::types::link::{EntityKind, Group, GroupId, Link, ROOT_GROUP_ID};
use crate::types::tree::{GroupNode, LinkbookTree, PinnedProjection, PositionMaxima, TreeNode};

/// Name used for the synthetic pinned root when none is configured.
pub const DEFAULT_PINNED_ROOT_NAME: &str = "Links";

/// Builds the full tree from every stored link and group.
///
/// Links whose parent group no longer exists surface at the top level so
/// they stay reachable.
pub fn compile(links: Vec<Link>, groups: Vec<Group>, pinned_root_name: &str) -> LinkbookTree {
    let maxima = scan_maxima(&links, &groups);
    let group_ids: HashSet<GroupId> = groups.iter().map(|g| g.id).collect();

    let mut partitions: HashMap<GroupId, Vec<Link>> = HashMap::new();
    for link in links {
        let key = if link.parent == ROOT_GROUP_ID || group_ids.contains(&link.parent) {
            link.parent
        } else {
            tracing::warn!(link = link.id, parent = link.parent, "link references missing group");
            ROOT_GROUP_ID
        };
        partitions.entry(key).or_default().push(link);
    }
    for group in &groups {
        partitions.entry(group.id).or_default();
    }

    let mut groups_by_id: HashMap<GroupId, Group> =
        groups.into_iter().map(|g| (g.id, g)).collect();
    let mut all = Vec::with_capacity(partitions.len());
    for (group_id, mut children) in partitions {
        sort_by_all_position(&mut children);
        if group_id == ROOT_GROUP_ID {
            all.extend(children.into_iter().map(TreeNode::Link));
        } else if let Some(group) = groups_by_id.remove(&group_id) {
            all.push(TreeNode::Group(GroupNode { group, children }));
        }
    }
    all.sort_by_key(|node| (node.all_position(), node.kind() == EntityKind::Link, node.id()));

    let pinned = project_pinned(&all, pinned_root_name);
    tracing::debug!(
        top_level = all.len(),
        max_all = maxima.all_position,
        max_pinned = maxima.pinned_position,
        "compiled linkbook tree"
    );

    LinkbookTree { all, pinned, maxima }
}

/// Derives the pinned listing from a compiled "all" listing.
///
/// Every pinned link, wherever it lives, becomes a child of the synthetic
/// root. Pinned groups follow, each carrying only its pinned children.
pub fn project_pinned(all: &[TreeNode], pinned_root_name: &str) -> PinnedProjection {
    let mut root_children = Vec::new();
    let mut groups = Vec::new();

    for node in all {
        match node {
            TreeNode::Link(link) => {
                if link.is_pinned {
                    root_children.push(link.clone());
                }
            }
            TreeNode::Group(node) => {
                let pinned_children: Vec<Link> =
                    node.children.iter().filter(|l| l.is_pinned).cloned().collect();
                root_children.extend(pinned_children.iter().cloned());
                if node.group.is_pinned {
                    groups.push(GroupNode {
                        group: node.group.clone(),
                        children: pinned_children,
                    });
                }
            }
        }
    }

    root_children.sort_by_key(|l| (l.pinned_position, l.id));
    groups.sort_by_key(|g| (g.group.pinned_position, g.group.id));

    let root = (!root_children.is_empty()).then(|| GroupNode {
        group: pinned_root(pinned_root_name),
        children: root_children,
    });

    PinnedProjection { root, groups }
}

/// Highest `all_position` and `pinned_position` across both collections.
pub fn scan_maxima(links: &[Link], groups: &[Group]) -> PositionMaxima {
    let mut maxima = PositionMaxima::default();
    for link in links {
        maxima.all_position = maxima.all_position.max(link.all_position);
        maxima.pinned_position = maxima.pinned_position.max(link.pinned_position);
    }
    for group in groups {
        maxima.all_position = maxima.all_position.max(group.all_position);
        maxima.pinned_position = maxima.pinned_position.max(group.pinned_position);
    }
    maxima
}

fn pinned_root(name: &str) -> Group {
    Group {
        id: ROOT_GROUP_ID,
        name: name.to_string(),
        is_pinned: true,
        all_position: 0,
        pinned_position: 0,
        group_position: 0,
    }
}

fn sort_by_all_position(links: &mut [Link]) {
    links.sort_by_key(|l| (l.all_position, l.id));
}
