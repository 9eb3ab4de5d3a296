// Tests for change detection and the status cache
use crate::status::{detect_changes, InstanceStatus, StatusCache};

use super::test_helpers::{instance, snapshot};

#[test]
fn test_identical_snapshots_are_unchanged() {
    let old = snapshot(&[
        instance("a1", "web", "running"),
        instance("b2", "db", "poweroff"),
    ]);
    let new = snapshot(&[
        instance("b2", "db", "poweroff"),
        instance("a1", "web", "running"),
    ]);

    let changes = detect_changes(&old, &new);
    assert!(!changes.is_changed());
}

#[test]
fn test_added_instance_is_a_change() {
    let old = snapshot(&[instance("a", "web", "running")]);
    let new = snapshot(&[
        instance("a", "web", "running"),
        instance("b", "db", "poweroff"),
    ]);

    let changes = detect_changes(&old, &new);
    assert!(changes.is_changed());
    assert!(changes.count_changed);
    assert_eq!(changes.added, vec!["b".to_string()]);
    assert!(changes.removed.is_empty());

    let cache = StatusCache::new();
    cache.apply(old);
    cache.apply(new);
    let mut ids = cache.list();
    ids.sort();
    assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_single_field_difference_is_a_change() {
    let old = snapshot(&[instance("a", "web", "running"), instance("b", "db", "running")]);

    let mut renamed = instance("b", "db", "running");
    renamed.name = "database".to_string();
    let new = snapshot(&[instance("a", "web", "running"), renamed]);
    let changes = detect_changes(&old, &new);
    assert!(changes.is_changed());
    assert!(!changes.count_changed);
    assert_eq!(changes.modified, vec!["b".to_string()]);

    let mut moved = instance("b", "db", "running");
    moved.cwd = "/srv/elsewhere".to_string();
    assert!(detect_changes(&old, &snapshot(&[instance("a", "web", "running"), moved])).is_changed());

    let mut reprovided = instance("b", "db", "running");
    reprovided.provider = "libvirt".to_string();
    assert!(
        detect_changes(&old, &snapshot(&[instance("a", "web", "running"), reprovided]))
            .is_changed()
    );

    let stopped = instance("b", "db", "poweroff");
    assert!(detect_changes(&old, &snapshot(&[instance("a", "web", "running"), stopped])).is_changed());
}

#[test]
fn test_removed_instance_is_a_change() {
    let old = snapshot(&[instance("a", "web", "running"), instance("b", "db", "running")]);
    let new = snapshot(&[instance("a", "web", "running")]);

    let changes = detect_changes(&old, &new);
    assert!(changes.is_changed());
    assert_eq!(changes.removed, vec!["b".to_string()]);
}

#[test]
fn test_swap_with_same_count_is_a_change() {
    // One id disappears while another appears: the count alone would miss it
    let old = snapshot(&[instance("a", "web", "running"), instance("b", "db", "running")]);
    let new = snapshot(&[instance("a", "web", "running"), instance("c", "cache", "running")]);

    let changes = detect_changes(&old, &new);
    assert!(!changes.count_changed);
    assert!(changes.is_changed());
    assert_eq!(changes.added, vec!["c".to_string()]);
    assert_eq!(changes.removed, vec!["b".to_string()]);
}

#[test]
fn test_missing_id_returns_placeholder() {
    let cache = StatusCache::new();
    cache.apply(snapshot(&[instance("a", "web", "running")]));

    let status = cache.get_status("missing");
    assert_eq!(status, InstanceStatus::placeholder("missing"));
    assert_eq!(status.id, "missing");
    assert!(status.name.is_empty());
    assert!(status.provider.is_empty());
    assert!(status.state.is_empty());
    assert!(status.cwd.is_empty());
}

#[test]
fn test_apply_replaces_cache_wholesale() {
    let cache = StatusCache::new();
    assert!(cache.is_empty());

    cache.apply(snapshot(&[instance("a", "web", "running"), instance("b", "db", "running")]));
    assert_eq!(cache.len(), 2);

    let changes = cache.apply(snapshot(&[instance("c", "cache", "saved")]));
    assert!(changes.is_changed());
    assert_eq!(cache.list(), vec!["c".to_string()]);
    assert_eq!(cache.get_status("a"), InstanceStatus::placeholder("a"));
    assert_eq!(cache.get_status("c").state, "saved");
}

#[test]
fn test_snapshot_handle_is_not_affected_by_later_updates() {
    let cache = StatusCache::new();
    cache.apply(snapshot(&[instance("a", "web", "running")]));
    let before = cache.snapshot();

    cache.apply(snapshot(&[instance("a", "web", "poweroff")]));

    assert_eq!(before.get("a").map(|s| s.state.as_str()), Some("running"));
    assert_eq!(cache.get_status("a").state, "poweroff");
}

#[test]
fn test_duplicate_ids_keep_last_record() {
    let snap = snapshot(&[instance("a", "web", "running"), instance("a", "web", "saved")]);
    assert_eq!(snap.len(), 1);
    assert_eq!(snap.get("a").map(|s| s.state.as_str()), Some("saved"));
}
