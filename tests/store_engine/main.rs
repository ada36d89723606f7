//! Integration tests for the store engine and registry.

mod scoreboard;

use std::sync::{Arc, Mutex};

use league_store::persist::{InMemoryBackend, KeyValueBackend};
use league_store::{ManualClock, Registry, StoreError, StoreOptions};
use scoreboard::Scoreboard;
use serde_json::json;

fn registry() -> (Registry, InMemoryBackend) {
    let backend = InMemoryBackend::new();
    (Registry::new(backend.clone(), ManualClock::new(42)), backend)
}

#[test]
fn listeners_run_in_order_and_failures_are_isolated() {
    let (registry, _) = registry();
    let board = registry.create_store("board", Scoreboard::default(), StoreOptions::new());
    let calls = Arc::new(Mutex::new(Vec::new()));

    for tag in ["first", "broken", "third"] {
        let calls = Arc::clone(&calls);
        board.subscribe(move |state: &Scoreboard| {
            calls.lock().unwrap().push(format!("{tag}:{}", state.home));
            if tag == "broken" {
                return Err("listener blew up".into());
            }
            Ok(())
        });
    }

    board.update_with(|s| s.goal("home")).unwrap();
    assert_eq!(
        *calls.lock().unwrap(),
        vec!["first:1", "broken:1", "third:1"]
    );
}

#[test]
fn every_mutation_notifies_even_without_change() {
    let (registry, _) = registry();
    let board = registry.create_store("board", Scoreboard::default(), StoreOptions::new());
    let count = Arc::new(Mutex::new(0));
    let seen = Arc::clone(&count);
    let sub = board.subscribe(move |_: &Scoreboard| {
        *seen.lock().unwrap() += 1;
        Ok(())
    });

    board.set(json!({})).unwrap();
    board.replace(Scoreboard::default());
    board.update_with(|_| ());
    assert_eq!(*count.lock().unwrap(), 3);

    assert!(sub.unsubscribe());
    assert!(!sub.unsubscribe());
    board.update_with(|_| ());
    assert_eq!(*count.lock().unwrap(), 3);
    assert_eq!(board.listener_count(), 0);
}

#[test]
fn failed_mutator_keeps_partial_changes_and_still_persists() {
    let (registry, backend) = registry();
    let board = registry.create_store(
        "board",
        Scoreboard::default(),
        StoreOptions::persisted("store:board").paths(["home", "history"]),
    );

    let result = board.update(|s| {
        s.goal("home")?;
        s.goal("sideline")
    });

    assert_eq!(result, None);
    assert_eq!(board.get().home, 1);
    let raw: serde_json::Value =
        serde_json::from_str(&backend.get("store:board").unwrap().unwrap()).unwrap();
    assert_eq!(raw["data"], json!({ "home": 1, "history": ["home"] }));
}

#[test]
fn set_merges_top_level_keys_and_rejects_bad_partials() {
    let (registry, _) = registry();
    let board = registry.create_store(
        "board",
        Scoreboard {
            label: "derby".into(),
            ..Default::default()
        },
        StoreOptions::new(),
    );

    board.set(json!({ "home": 2 })).unwrap();
    assert_eq!(board.get().home, 2);
    assert_eq!(board.get().label, "derby");

    assert!(matches!(
        board.set(json!([1, 2])),
        Err(StoreError::NotAnObject { kind: "array", .. })
    ));
    assert!(matches!(
        board.set(json!({ "home": "two" })),
        Err(StoreError::Serde { .. })
    ));
    assert_eq!(board.get().home, 2);
}

#[test]
fn registry_is_last_writer_wins_and_typed() {
    let (registry, _) = registry();
    let first = registry.create_store("board", Scoreboard::default(), StoreOptions::new());
    first.update_with(|s| s.home = 9);
    let second = registry.create_store("board", Scoreboard::default(), StoreOptions::new());

    assert_eq!(registry.len(), 1);
    let looked_up = registry.get_store::<Scoreboard>("board").unwrap();
    assert_eq!(looked_up.get().home, 0);
    looked_up.update_with(|s| s.away = 1);
    assert_eq!(second.get().away, 1);
    assert_eq!(first.get().away, 0);

    assert!(registry.get_store::<String>("board").is_none());
    assert!(registry.get_store::<Scoreboard>("missing").is_none());
    assert_eq!(
        registry.snapshot_json("board").unwrap()["away"],
        json!(1)
    );
}

#[test]
fn persistence_needs_both_key_and_paths() {
    let (registry, backend) = registry();
    let keyed = registry.create_store(
        "keyed",
        Scoreboard::default(),
        StoreOptions::persisted("store:keyed"),
    );
    keyed.update_with(|s| s.home = 1);
    assert!(backend.get("store:keyed").unwrap().is_none());
    assert!(!keyed.persist_now().unwrap());
}
