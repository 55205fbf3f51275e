use std::sync::Arc;
use std::time::Duration;

use param_observer::{ParameterError, ParameterObserver, ParameterObserverBuilder, Slot};
use param_store::{Builder, ParameterGroup, ParameterStore, ParameterType};

const GROUP: &str = "User parameter:BaseApp/Preferences/Test";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn observer(group: &Arc<ParameterGroup>) -> Arc<ParameterObserver> {
    ParameterObserverBuilder::new(group.clone())
        .with_parameter("Flag", Slot::bool(true))
        .with_parameter("Count", Slot::int(9))
        .build()
        .unwrap()
}

#[test]
fn test_set_writes_store_and_keeps_default() {
    init_tracing();
    let store = ParameterStore::new();
    let group = store.group_by_path(GROUP);
    let obs = observer(&group);

    assert_eq!(obs.get_boolean("Flag"), Ok(true));
    obs.set_boolean("Flag", false).unwrap();

    assert_eq!(obs.get_boolean("Flag"), Ok(false));
    assert!(!group.get_bool("Flag", true));
    assert_eq!(obs.get_default_boolean("Flag"), Ok(true));
}

#[test]
fn test_stored_value_wins_at_init() {
    let store = ParameterStore::new();
    let group = store.group_by_path(GROUP);
    group.set_int("Count", 3);

    let obs = observer(&group);
    assert_eq!(obs.get_int("Count"), Ok(3));
    assert_eq!(obs.get_default_int("Count"), Ok(9));
}

#[test]
fn test_initialization_does_not_seed_store() {
    let store = ParameterStore::new();
    let group = store.group_by_path(GROUP);
    let _obs = observer(&group);
    assert!(group.entries().is_empty());
}

#[test]
fn test_external_change_updates_cache() {
    init_tracing();
    let store = ParameterStore::new();
    let obs = observer(&store.group_by_path(GROUP));

    // A second handle on the same group, as another component would hold
    store.group_by_path(GROUP).set_int("Count", 42);
    assert_eq!(obs.get_int("Count"), Ok(42));

    store.group_by_path(GROUP).remove_int("Count");
    assert_eq!(obs.get_int("Count"), Ok(9));
}

#[test]
fn test_unknown_key() {
    let group = ParameterGroup::root();
    let obs = observer(&group);
    assert_eq!(
        obs.get_boolean("Missing"),
        Err(ParameterError::NotRegistered {
            key: "Missing".to_string()
        })
    );
    assert!(matches!(
        obs.set_int("Missing", 1),
        Err(ParameterError::NotRegistered { .. })
    ));
    assert!(obs.get_default_float("Missing").is_err());
}

#[test]
fn test_wrong_typed_access() {
    let group = ParameterGroup::root();
    let obs = observer(&group);

    for result in [
        obs.get_int("Flag").map(|_| ()),
        obs.get_float("Flag").map(|_| ()),
        obs.get_string("Flag").map(|_| ()),
        obs.get_unsigned("Flag").map(|_| ()),
    ] {
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            ParameterError::TypeMismatch {
                registered: ParameterType::Bool,
                ..
            }
        ));
        assert_eq!(err.key(), "Flag");
    }

    assert!(obs.set_string("Flag", "yes").is_err());
    assert!(!group.contains(ParameterType::String, "Flag"));
    assert!(obs.get_default_int("Flag").is_err());
}

#[test]
fn test_unrelated_notifications_are_ignored() {
    init_tracing();
    let store = ParameterStore::new();
    let group = store.group_by_path(GROUP);
    let obs = observer(&group);
    obs.set_int("Count", 5).unwrap();

    // Other keys of the same group
    group.set_int("Other", 1);
    group.notify(None);
    group.notify(Some(""));
    assert_eq!(obs.get_int("Count"), Ok(5));

    // Same key in a sibling group
    store
        .group_by_path("User parameter:BaseApp/Preferences/Other")
        .set_int("Count", 7);
    assert_eq!(obs.get_int("Count"), Ok(5));
}

#[test]
fn test_fresh_observer_sees_previous_writes() {
    let store = ParameterStore::new();
    let first = observer(&store.group_by_path(GROUP));
    first.set_boolean("Flag", false).unwrap();
    first.set_int("Count", 12).unwrap();

    let second = observer(&store.group_by_path(GROUP));
    assert_eq!(second.get_boolean("Flag"), Ok(false));
    assert_eq!(second.get_int("Count"), Ok(12));

    // Writes through one observer reach the other
    second.set_int("Count", 13).unwrap();
    assert_eq!(first.get_int("Count"), Ok(13));
}

#[test]
fn test_loaded_file_updates_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user.yaml");
    std::fs::write(
        &path,
        "groups:\n  BaseApp:\n    groups:\n      Preferences:\n        groups:\n          Test:\n            bool:\n              Flag: false\n            int:\n              Count: 21\n",
    )
    .unwrap();

    let store = ParameterStore::new();
    let obs = observer(&store.group_by_path(GROUP));
    assert_eq!(store.user().load_file(&path).unwrap(), 2);

    assert_eq!(obs.get_boolean("Flag"), Ok(false));
    assert_eq!(obs.get_int("Count"), Ok(21));
}

#[test]
fn test_dropped_observer_detaches() {
    let group = ParameterGroup::root();
    let obs = observer(&group);
    assert_eq!(group.observer_count(), 1);

    drop(obs);
    assert_eq!(group.observer_count(), 0);
    group.set_int("Count", 1);
    assert_eq!(group.get_int("Count", 0), 1);
}

#[test]
fn test_subscriber_sees_observer_writes() {
    let group = ParameterGroup::root();
    let rx = group.subscribe();
    let obs = observer(&group);

    obs.set_int("Count", 4).unwrap();
    let change = rx.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(change.key.as_deref(), Some("Count"));

    // Unchanged value, no event
    obs.set_int("Count", 4).unwrap();
    assert!(matches!(rx.try_recv(), Err(flume::TryRecvError::Empty)));
}

#[test]
fn test_concurrent_writers() {
    let store = Arc::new(ParameterStore::new());
    let obs = observer(&store.group_by_path(GROUP));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let obs = obs.clone();
            let store = store.clone();
            std::thread::spawn(move || {
                for n in 0..100 {
                    if i % 2 == 0 {
                        obs.set_int("Count", n).unwrap();
                    } else {
                        store.group_by_path(GROUP).set_int("Count", n);
                    }
                    obs.get_int("Count").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stored = store.group_by_path(GROUP).get_int("Count", -1);
    assert_eq!(stored, 99);
    assert_eq!(obs.get_int("Count"), Ok(stored));
}

#[test]
fn test_setter_racing_external_writer_stays_consistent() {
    for _ in 0..500 {
        let group = ParameterGroup::root();
        let obs = observer(&group);

        let setter = {
            let obs = obs.clone();
            std::thread::spawn(move || {
                for v in 1..50 {
                    obs.set_int("Count", v).unwrap();
                }
            })
        };
        let writer = {
            let group = group.clone();
            std::thread::spawn(move || {
                for v in 1..50 {
                    group.set_int("Count", -v);
                }
            })
        };
        setter.join().unwrap();
        writer.join().unwrap();

        assert_eq!(obs.get_int("Count"), Ok(group.get_int("Count", 9)));
    }
}
