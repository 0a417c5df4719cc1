//! Unit tests for the LinkbookManager public API.
//!
//! These tests drive link and group CRUD, pin toggles and change
//! notifications against an in-memory record store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use linkbook::managers::linkbook_manager::LinkbookManager;
use linkbook::store::{MemoryStore, RecordStore};
use linkbook::types::errors::ErrorKind;
use linkbook::types::tree::{LinkbookTree, TreeNode};

/// Helper: a manager over a fresh store plus a notification counter.
fn setup() -> (LinkbookManager<MemoryStore>, Arc<AtomicUsize>) {
    let manager = LinkbookManager::new(MemoryStore::new());
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = notifications.clone();
    manager.bind_linkbook_data_changed(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (manager, notifications)
}

#[tokio::test]
async fn test_work_group_with_two_links_in_creation_order() {
    let (mgr, _) = setup();
    let work = mgr.create_group(false).await.unwrap();
    mgr.edit_group_name(work.id, "Work").await.unwrap();
    let mail = mgr.create_link("Mail", "mail.test", work.id, false).await.unwrap();
    let chat = mgr.create_link("Chat", "chat.test", work.id, false).await.unwrap();

    assert_eq!(work.id, 1);
    assert_eq!(chat.all_position, mail.all_position + 1000);

    let tree = mgr.compile_linkbook_data().await.unwrap();
    assert_eq!(tree.all.len(), 1);
    match &tree.all[0] {
        TreeNode::Group(node) => {
            assert_eq!(node.group.name, "Work");
            let names: Vec<&str> = node.children.iter().map(|l| l.name.as_str()).collect();
            assert_eq!(names, vec!["Mail", "Chat"]);
            assert_eq!(node.group.group_position, chat.all_position);
        }
        other => panic!("expected the Work group, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pinning_chat_only_surfaces_chat() {
    let (mgr, _) = setup();
    let work = mgr.create_group(false).await.unwrap();
    mgr.edit_group_name(work.id, "Work").await.unwrap();
    mgr.create_link("Mail", "mail.test", work.id, false).await.unwrap();
    let chat = mgr.create_link("Chat", "chat.test", work.id, false).await.unwrap();

    let chat = mgr.edit_link_pin(chat.id, true).await.unwrap();
    assert!(chat.pinned_position > 0);

    let tree = mgr.compile_linkbook_data().await.unwrap();
    let root_links = tree.pinned.root_links();
    assert_eq!(root_links.len(), 1);
    assert_eq!(root_links[0].name, "Chat");
    assert!(tree.pinned.groups.is_empty());
}

#[tokio::test]
async fn test_create_link_positions_exceed_every_sibling() {
    let (mgr, _) = setup();
    let first = mgr.create_link("A", "a.test", 0, false).await.unwrap();
    let group = mgr.create_group(false).await.unwrap();
    mgr.edit_group_name(group.id, "G").await.unwrap();
    let second = mgr.create_link("B", "b.test", 0, false).await.unwrap();

    assert!(group.all_position > first.all_position);
    assert!(second.all_position > group.all_position);
}

#[tokio::test]
async fn test_create_link_trims_and_validates() {
    let (mgr, notifications) = setup();
    let link = mgr.create_link("  Mail ", " mail.test ", 0, false).await.unwrap();
    assert_eq!(link.name, "Mail");
    assert_eq!(link.link, "mail.test");

    let err = mgr.create_link("   ", "x.test", 0, false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = mgr.create_link("Name", "", 0, false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert_eq!(mgr.store().get_links().await.unwrap().len(), 1);
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_create_link_in_missing_group_is_not_found() {
    let (mgr, _) = setup();
    let err = mgr.create_link("Mail", "mail.test", 42, false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(mgr.store().get_links().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_pinned_link_gets_pinned_position() {
    let (mgr, _) = setup();
    let a = mgr.create_link("A", "a.test", 0, true).await.unwrap();
    let b = mgr.create_link("B", "b.test", 0, true).await.unwrap();
    let c = mgr.create_link("C", "c.test", 0, false).await.unwrap();
    assert_eq!(a.pinned_position, 1000);
    assert_eq!(b.pinned_position, 2000);
    assert_eq!(c.pinned_position, 0);
}

#[tokio::test]
async fn test_edit_link_name_and_link() {
    let (mgr, _) = setup();
    let link = mgr.create_link("Mail", "mail.test", 0, false).await.unwrap();

    let edited = mgr
        .edit_link_name_and_link(link.id, " Inbox ", "inbox.test")
        .await
        .unwrap();
    assert_eq!(edited.name, "Inbox");
    assert_eq!(edited.link, "inbox.test");
    assert_eq!(edited.all_position, link.all_position);

    // Whitespace-only keeps the old value.
    let kept = mgr.edit_link_name_and_link(link.id, "  ", "new.test").await.unwrap();
    assert_eq!(kept.name, "Inbox");
    assert_eq!(kept.link, "new.test");

    let err = mgr.edit_link_name_and_link(link.id, "", "x.test").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_edit_missing_link_is_not_found_without_notification() {
    let (mgr, notifications) = setup();
    let err = mgr.edit_link_name_and_link(9, "A", "a.test").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = mgr.edit_link_pin(9, true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = mgr.delete_link(9).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(notifications.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unpin_resets_pinned_position() {
    let (mgr, _) = setup();
    let link = mgr.create_link("Mail", "mail.test", 0, true).await.unwrap();
    let unpinned = mgr.edit_link_pin(link.id, false).await.unwrap();
    assert!(!unpinned.is_pinned);
    assert_eq!(unpinned.pinned_position, 0);

    let tree = mgr.compile_linkbook_data().await.unwrap();
    assert!(tree.pinned.root.is_none());
}

#[tokio::test]
async fn test_repinning_appends_after_existing_pins() {
    let (mgr, _) = setup();
    let a = mgr.create_link("A", "a.test", 0, true).await.unwrap();
    let b = mgr.create_link("B", "b.test", 0, true).await.unwrap();
    mgr.edit_link_pin(a.id, false).await.unwrap();
    let a = mgr.edit_link_pin(a.id, true).await.unwrap();
    assert!(a.pinned_position > b.pinned_position);
}

#[tokio::test]
async fn test_delete_link() {
    let (mgr, notifications) = setup();
    let link = mgr.create_link("Mail", "mail.test", 0, false).await.unwrap();
    assert_eq!(mgr.delete_link(link.id).await.unwrap(), link.id);
    assert!(mgr.store().get_link(link.id).await.unwrap().is_none());
    assert_eq!(notifications.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_create_group_purges_abandoned_placeholders() {
    let (mgr, _) = setup();
    let abandoned = mgr.create_group(false).await.unwrap();
    assert!(abandoned.name.is_empty());

    let fresh = mgr.create_group(true).await.unwrap();
    assert!(mgr.store().get_group(abandoned.id).await.unwrap().is_none());
    assert!(fresh.is_pinned);
    assert!(fresh.pinned_position > 0);
}

#[tokio::test]
async fn test_edit_group_name_rejects_blank() {
    let (mgr, _) = setup();
    let group = mgr.create_group(false).await.unwrap();
    let err = mgr.edit_group_name(group.id, "   ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let renamed = mgr.edit_group_name(group.id, " Work ").await.unwrap();
    assert_eq!(renamed.name, "Work");
}

#[tokio::test]
async fn test_group_pin_is_independent_of_children() {
    let (mgr, _) = setup();
    let group = mgr.create_group(false).await.unwrap();
    mgr.edit_group_name(group.id, "Work").await.unwrap();
    let link = mgr.create_link("Mail", "mail.test", group.id, false).await.unwrap();

    mgr.edit_group_pin(group.id, true).await.unwrap();
    let tree = mgr.compile_linkbook_data().await.unwrap();
    assert_eq!(tree.pinned.groups.len(), 1);
    assert!(tree.pinned.groups[0].children.is_empty());
    assert!(!mgr.store().get_link(link.id).await.unwrap().unwrap().is_pinned);

    let unpinned = mgr.edit_group_pin(group.id, false).await.unwrap();
    assert_eq!(unpinned.pinned_position, 0);
}

#[tokio::test]
async fn test_purge_unnamed_groups_keeps_named_and_nonempty() {
    let store = MemoryStore::new();
    let mut placeholder = linkbook::types::link::Group {
        id: 0,
        name: String::new(),
        is_pinned: false,
        all_position: 1000,
        pinned_position: 0,
        group_position: 0,
    };
    let empty_id = store.put_group(&placeholder).await.unwrap();
    placeholder.all_position = 2000;
    let holding_id = store.put_group(&placeholder).await.unwrap();
    store
        .put_link(&linkbook::types::link::Link {
            id: 0,
            name: "Mail".to_string(),
            link: "mail.test".to_string(),
            parent: holding_id,
            is_pinned: false,
            all_position: 1000,
            pinned_position: 0,
        })
        .await
        .unwrap();

    let mgr = LinkbookManager::new(store);
    let removed = mgr.purge_unnamed_groups().await.unwrap();
    assert_eq!(removed, vec![empty_id]);
    assert!(mgr.store().get_group(holding_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_group_choices_lead_with_ungrouped() {
    let (mgr, _) = setup();
    let b = mgr.create_group(false).await.unwrap();
    mgr.edit_group_name(b.id, "Work").await.unwrap();
    let a = mgr.create_group(false).await.unwrap();
    mgr.edit_group_name(a.id, "Home").await.unwrap();
    mgr.create_group(false).await.unwrap();

    let choices = mgr.group_choices("All Links").await.unwrap();
    assert_eq!(
        choices,
        vec![
            (0, "All Links".to_string()),
            (b.id, "Work".to_string()),
            (a.id, "Home".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_observer_receives_fresh_tree() {
    let mgr = LinkbookManager::new(MemoryStore::new());
    let seen: Arc<Mutex<Vec<LinkbookTree>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    mgr.bind_linkbook_data_changed(move |tree| sink.lock().unwrap().push(tree.clone()));

    mgr.create_link("Mail", "mail.test", 0, false).await.unwrap();
    mgr.create_link("Chat", "chat.test", 0, false).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].link_count(), 1);
    assert_eq!(seen[1].link_count(), 2);
}

#[tokio::test]
async fn test_store_failure_aborts_without_notification() {
    let (mgr, notifications) = setup();
    let link = mgr.create_link("Mail", "mail.test", 0, false).await.unwrap();

    mgr.store().set_fail_writes(true);
    let err = mgr.edit_link_pin(link.id, true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreFailure);
    let err = mgr.create_group(false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreFailure);
    mgr.store().set_fail_writes(false);

    assert_eq!(notifications.load(Ordering::SeqCst), 1);
    assert!(!mgr.store().get_link(link.id).await.unwrap().unwrap().is_pinned);
}

#[tokio::test]
async fn test_compile_does_not_purge_placeholders() {
    let (mgr, _) = setup();
    let placeholder = mgr.create_group(false).await.unwrap();
    let tree = mgr.compile_linkbook_data().await.unwrap();
    assert!(tree.find_group(placeholder.id).is_some());
    assert!(mgr.store().get_group(placeholder.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_failed_link_write_leaves_group_untouched() {
    let (mgr, notifications) = setup();
    let work = mgr.create_group(false).await.unwrap();
    let work = mgr.edit_group_name(work.id, "Work").await.unwrap();
    let before = notifications.load(Ordering::SeqCst);

    mgr.store().set_fail_link_writes(true);
    let err = mgr
        .create_link("Mail", "mail.test", work.id, false)
        .await
        .unwrap_err();
    mgr.store().set_fail_link_writes(false);

    assert_eq!(err.kind(), ErrorKind::StoreFailure);
    let stored = mgr.store().get_group(work.id).await.unwrap().unwrap();
    assert_eq!(stored, work);
    assert_eq!(stored.group_position, 0);
    assert!(mgr.store().get_links().await.unwrap().is_empty());
    assert_eq!(notifications.load(Ordering::SeqCst), before);
}

#[tokio::test]
async fn test_store_read_failure_surfaces_as_store_failure() {
    let (mgr, notifications) = setup();
    let link = mgr.create_link("Mail", "mail.test", 0, false).await.unwrap();

    mgr.store().set_fail_reads(true);
    let err = mgr.compile_linkbook_data().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreFailure);
    let err = mgr.edit_link_name_and_link(link.id, "Inbox", "inbox.test").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreFailure);
    mgr.store().set_fail_reads(false);

    assert_eq!(notifications.load(Ordering::SeqCst), 1);
    assert_eq!(mgr.store().get_link(link.id).await.unwrap().unwrap().name, "Mail");
}
