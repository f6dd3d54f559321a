use budtree_core::BudgetStorage;
use budtree_domain::BudgetNode;
use budtree_storage_json::JsonBudgetStorage;
use chrono::{Duration, TimeZone, Utc};
use std::fs;
use tempfile::tempdir;

fn sample() -> BudgetNode {
    BudgetNode::root("General budget").with_children(vec![
        BudgetNode::new("1.1", "Rent", 900.0),
        BudgetNode::new("1.2", "Food", 250.0),
    ])
}

#[test]
fn load_without_saved_tree_is_none() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBudgetStorage::new(dir.path()).expect("create storage");

    assert!(storage.load().expect("load").is_none());
    assert!(storage.history().expect("history").is_empty());
    assert!(storage.favorites().expect("favorites").is_empty());
}

#[test]
fn save_writes_current_and_prepends_history() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBudgetStorage::new(dir.path()).expect("create storage");
    let first_at = Utc.with_ymd_and_hms(2025, 4, 2, 9, 0, 0).unwrap();

    storage.save(&sample(), first_at).expect("save first");
    let renamed = BudgetNode {
        name: "Household".into(),
        ..sample()
    };
    storage
        .save(&renamed, first_at + Duration::minutes(5))
        .expect("save second");

    let loaded = storage.load().expect("load").expect("current tree");
    assert_eq!(loaded, renamed);

    let history = storage.history().expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].budget.name, "Household");
    assert_eq!(history[1].key(), "2025-04-02T09:00:00.000Z");
    assert!(storage.current_path().exists());
    assert!(!dir.path().join("current.json.tmp").exists());
}

#[test]
fn retention_caps_history_length() {
    let dir = tempdir().expect("tempdir");
    let storage =
        JsonBudgetStorage::with_retention(dir.path(), Some(2)).expect("create storage");
    let start = Utc.with_ymd_and_hms(2025, 4, 2, 9, 0, 0).unwrap();
    for step in 0..4 {
        storage
            .save(&sample(), start + Duration::seconds(step))
            .expect("save");
    }
    let history = storage.history().expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].date, start + Duration::seconds(3));
}

#[test]
fn restore_replaces_current_without_history() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBudgetStorage::new(dir.path()).expect("create storage");

    storage.restore(&sample()).expect("restore");

    assert_eq!(storage.load().expect("load"), Some(sample()));
    assert!(storage.history().expect("history").is_empty());
}

#[test]
fn favorites_toggle_and_clear() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBudgetStorage::new(dir.path()).expect("create storage");

    assert!(storage.toggle_favorite("k1").expect("toggle"));
    assert!(storage.toggle_favorite("k2").expect("toggle"));
    assert_eq!(storage.favorites().expect("favorites"), vec!["k2", "k1"]);
    assert!(!storage.toggle_favorite("k2").expect("toggle"));

    storage.clear_favorites().expect("clear favorites");
    assert!(storage.favorites().expect("favorites").is_empty());
}

#[test]
fn clear_history_keeps_current_and_clear_drops_both() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBudgetStorage::new(dir.path()).expect("create storage");
    storage.save(&sample(), Utc::now()).expect("save");

    storage.clear_history().expect("clear history");
    assert!(storage.history().expect("history").is_empty());
    assert!(storage.load().expect("load").is_some());
    // Clearing twice is harmless.
    storage.clear_history().expect("clear history again");

    storage.save(&sample(), Utc::now()).expect("save again");
    storage.clear().expect("clear");
    assert!(storage.load().expect("load").is_none());
    assert!(storage.history().expect("history").is_empty());
    assert!(!storage.current_path().exists());
    assert!(!storage.history_path().exists());
}

#[test]
fn corrupt_current_tree_is_an_error_but_corrupt_history_reads_empty() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBudgetStorage::new(dir.path()).expect("create storage");
    fs::write(storage.current_path(), "{ not json").expect("write");
    fs::write(storage.history_path(), "[oops").expect("write");

    assert!(storage.load().is_err());
    assert!(storage.history().expect("history").is_empty());
}

#[test]
fn loads_snapshots_with_loose_amounts() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBudgetStorage::new(dir.path()).expect("create storage");
    fs::write(
        storage.current_path(),
        r#"{"id":"1","name":"Legacy","amount":0,"children":[
            {"id":"1.1","name":"A","amount":"120.5","children":[]},
            {"id":"1.2","name":"B","amount":null,"children":null}
        ]}"#,
    )
    .expect("write");

    let loaded = storage.load().expect("load").expect("tree");
    assert_eq!(loaded.children[0].amount, 120.5);
    assert_eq!(loaded.children[1].amount, 0.0);
    assert!(loaded.children[1].is_leaf());
}
