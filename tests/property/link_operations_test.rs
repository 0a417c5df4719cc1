//! Property-based tests for sequences of engine operations.
//!
//! After any mix of creates, pin toggles, relocations and group deletions the
//! store must keep its invariants: every link's parent exists (or is root),
//! and no two siblings share a position in any listing.

use std::collections::{HashMap, HashSet};

use linkbook::managers::cascade_delete::GroupDeletion;
use linkbook::managers::linkbook_manager::LinkbookManager;
use linkbook::store::{MemoryStore, RecordStore};
use linkbook::types::relocation::{Direction, EntityRef, Listing, RelocationDescriptor};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    CreateLink { parent: usize, pinned: bool },
    CreateGroup { pinned: bool },
    ToggleLinkPin { link: usize },
    ToggleGroupPin { group: usize },
    MoveLink { link: usize, target: usize, onto_group: bool, below: bool, pinned: bool },
    MoveGroup { group: usize, target: usize, onto_link: bool, below: bool, pinned: bool },
    DeleteGroup { group: usize },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..8, any::<bool>()).prop_map(|(parent, pinned)| Op::CreateLink { parent, pinned }),
        1 => any::<bool>().prop_map(|pinned| Op::CreateGroup { pinned }),
        1 => (0usize..16).prop_map(|link| Op::ToggleLinkPin { link }),
        1 => (0usize..8).prop_map(|group| Op::ToggleGroupPin { group }),
        3 => (0usize..16, 0usize..16, any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(link, target, onto_group, below, pinned)| Op::MoveLink { link, target, onto_group, below, pinned }
        ),
        2 => (0usize..8, 0usize..16, any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(group, target, onto_link, below, pinned)| Op::MoveGroup { group, target, onto_link, below, pinned }
        ),
        1 => (0usize..8).prop_map(|group| Op::DeleteGroup { group }),
    ]
}

fn direction(below: bool) -> Direction {
    if below { Direction::Below } else { Direction::Above }
}

fn listing(pinned: bool) -> Listing {
    if pinned { Listing::Pinned } else { Listing::All }
}

fn pick<T: Copy>(items: &[T], index: usize) -> Option<T> {
    (!items.is_empty()).then(|| items[index % items.len()])
}

fn assert_unique(scope: &str, positions: Vec<i64>) {
    let unique: HashSet<i64> = positions.iter().copied().collect();
    assert_eq!(unique.len(), positions.len(), "duplicate positions in {}: {:?}", scope, positions);
}

async fn check_invariants(mgr: &LinkbookManager<MemoryStore>) {
    let links = mgr.store().get_links().await.unwrap();
    let groups = mgr.store().get_groups().await.unwrap();
    let group_ids: HashSet<i64> = groups.iter().map(|g| g.id).collect();

    for link in &links {
        assert!(link.parent == 0 || group_ids.contains(&link.parent), "dangling parent: {:?}", link);
        if !link.is_pinned {
            assert_eq!(link.pinned_position, 0);
        }
    }
    for group in &groups {
        let highest = links.iter().filter(|l| l.parent == group.id).map(|l| l.all_position).max();
        if let Some(highest) = highest {
            assert!(group.group_position >= highest, "group position behind children: {:?}", group);
        }
    }

    let mut scopes: HashMap<i64, Vec<i64>> = HashMap::new();
    for link in &links {
        scopes.entry(link.parent).or_default().push(link.all_position);
    }
    scopes.entry(0).or_default().extend(groups.iter().map(|g| g.all_position));
    for (parent, positions) in scopes {
        assert_unique(&format!("parent {}", parent), positions);
    }

    assert_unique(
        "pinned links",
        links.iter().filter(|l| l.is_pinned).map(|l| l.pinned_position).collect(),
    );
    assert_unique(
        "pinned groups",
        groups.iter().filter(|g| g.is_pinned).map(|g| g.pinned_position).collect(),
    );
}

async fn apply(mgr: &LinkbookManager<MemoryStore>, op: &Op) {
    let links = mgr.store().get_links().await.unwrap();
    let groups = mgr.store().get_groups().await.unwrap();
    let link_ids: Vec<i64> = links.iter().map(|l| l.id).collect();
    let group_ids: Vec<i64> = groups.iter().map(|g| g.id).collect();

    match *op {
        Op::CreateLink { parent, pinned } => {
            let parent = pick(&group_ids, parent).filter(|_| parent % 2 == 0).unwrap_or(0);
            let siblings: Vec<i64> = links
                .iter()
                .filter(|l| l.parent == parent)
                .map(|l| l.all_position)
                .chain(groups.iter().filter(|_| parent == 0).map(|g| g.all_position))
                .collect();
            let created = mgr.create_link("Site", "site.test", parent, pinned).await.unwrap();
            assert!(siblings.iter().all(|p| created.all_position > *p));
        }
        Op::CreateGroup { pinned } => {
            let group = mgr.create_group(pinned).await.unwrap();
            mgr.edit_group_name(group.id, "Group").await.unwrap();
        }
        Op::ToggleLinkPin { link } => {
            if let Some(id) = pick(&link_ids, link) {
                let current = links.iter().any(|l| l.id == id && l.is_pinned);
                mgr.edit_link_pin(id, !current).await.unwrap();
            }
        }
        Op::ToggleGroupPin { group } => {
            if let Some(id) = pick(&group_ids, group) {
                let current = groups.iter().any(|g| g.id == id && g.is_pinned);
                mgr.edit_group_pin(id, !current).await.unwrap();
            }
        }
        Op::MoveLink { link, target, onto_group, below, pinned } => {
            let Some(selected) = pick(&link_ids, link) else { return };
            let target = if onto_group {
                pick(&group_ids, target).map(EntityRef::group).unwrap_or(EntityRef::group(0))
            } else {
                match pick(&link_ids, target) {
                    Some(id) => EntityRef::link(id),
                    None => return,
                }
            };
            let _ = mgr
                .relocate(RelocationDescriptor {
                    selected: EntityRef::link(selected),
                    target,
                    direction: direction(below),
                    listing: listing(pinned),
                })
                .await;
        }
        Op::MoveGroup { group, target, onto_link, below, pinned } => {
            let Some(selected) = pick(&group_ids, group) else { return };
            let target = if onto_link {
                match pick(&link_ids, target) {
                    Some(id) => EntityRef::link(id),
                    None => return,
                }
            } else {
                pick(&group_ids, target).map(EntityRef::group).unwrap_or(EntityRef::group(0))
            };
            let _ = mgr
                .relocate(RelocationDescriptor {
                    selected: EntityRef::group(selected),
                    target,
                    direction: direction(below),
                    listing: listing(pinned),
                })
                .await;
        }
        Op::DeleteGroup { group } => {
            if let Some(id) = pick(&group_ids, group) {
                if let GroupDeletion::ConfirmationRequired(pending) = mgr.delete_group(id).await.unwrap() {
                    mgr.confirm_group_deletion(pending).await.unwrap();
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn operation_sequences_keep_invariants(ops in proptest::collection::vec(arb_op(), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("Failed to build runtime");
        runtime.block_on(async {
            let mgr = LinkbookManager::new(MemoryStore::new());
            for op in &ops {
                apply(&mgr, op).await;
                check_invariants(&mgr).await;
            }
        });
    }
}
