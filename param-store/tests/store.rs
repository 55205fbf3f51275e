use std::sync::Arc;

use param_store::{
    Builder, Error, ParameterGroup, ParameterGroupObserver, ParameterManager, ParameterStore,
    ParameterStoreBuilder, ParameterType, ParameterValue,
};
use parking_lot::Mutex;

const VIEW: &str = "User parameter:BaseApp/Preferences/View";

#[derive(Default)]
struct KeyRecorder {
    keys: Mutex<Vec<String>>,
}

impl ParameterGroupObserver for KeyRecorder {
    fn on_change(&self, _group: &ParameterGroup, key: Option<&str>) {
        if let Some(key) = key {
            self.keys.lock().push(key.to_string());
        }
    }
}

#[test]
fn test_builder_loads_user_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user.yaml");
    std::fs::write(
        &path,
        "groups:\n  BaseApp:\n    groups:\n      Preferences:\n        groups:\n          View:\n            int:\n              MarkerSize: 11\n",
    )
    .unwrap();

    let store = ParameterStoreBuilder::default()
        .with_user_config(&path)
        .build()
        .unwrap();
    assert_eq!(store.group_by_path(VIEW).get_int("MarkerSize", 9), 11);
}

#[test]
fn test_builder_explicit_override_wins_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user.yaml");
    std::fs::write(&path, "int:\n  Count: 1\n").unwrap();

    let store = ParameterStoreBuilder::default()
        .with_user_config(&path)
        .with_override("", "Count", 2i64)
        .build()
        .unwrap();
    assert_eq!(store.user().root().get_int("Count", 0), 2);
}

#[test]
fn test_builder_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ParameterStoreBuilder::default()
        .with_system_config(dir.path().join("missing.yaml"))
        .build();
    assert!(matches!(result, Err(Error::Io { .. })));
}

#[test]
fn test_builder_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user.yaml");
    std::fs::write(&path, "bool: [not, a, mapping]\n").unwrap();

    let result = ParameterStoreBuilder::default()
        .with_user_config(&path)
        .build();
    assert!(matches!(result, Err(Error::Yaml(_))));
}

#[test]
fn test_save_and_reload_tree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("user.yaml");

    let manager = ParameterManager::new("User parameter");
    let view = manager.group_by_path("BaseApp/Preferences/View");
    view.set_bool("UseNewSelection", false);
    view.set_int("MarkerSize", 7);
    view.set_unsigned("DefaultShapeColor", 0xCCCC_CCFF);
    view.set_float("Zoom", 0.25);
    view.set_string("Theme", "dark: high contrast");
    manager
        .group_by_path("BaseApp/Preferences/Document")
        .set_int("MaxUndoSize", 20);
    manager.save_file(&path).unwrap();

    let reloaded = ParameterManager::new("User parameter");
    assert_eq!(reloaded.load_file(&path).unwrap(), 6);
    let view = reloaded.group_by_path("BaseApp/Preferences/View");
    assert!(!view.get_bool("UseNewSelection", true));
    assert_eq!(view.get_int("MarkerSize", 0), 7);
    assert_eq!(view.get_unsigned("DefaultShapeColor", 0), 0xCCCC_CCFF);
    assert_eq!(view.get_float("Zoom", 0.0), 0.25);
    assert_eq!(view.get_string("Theme", ""), "dark: high contrast");
    assert_eq!(
        reloaded
            .group_by_path("BaseApp/Preferences/Document")
            .get_int("MaxUndoSize", 0),
        20
    );
    assert_eq!(
        reloaded.to_yaml_string().unwrap(),
        manager.to_yaml_string().unwrap()
    );
}

#[test]
fn test_loading_notifies_attached_observers() {
    let store = ParameterStore::new();
    let view = store.group_by_path(VIEW);
    let recorder = Arc::new(KeyRecorder::default());
    view.attach(&recorder);

    store
        .user()
        .load_yaml_str(
            "groups:\n  BaseApp:\n    groups:\n      Preferences:\n        groups:\n          View:\n            bool:\n              RandomColor: true\n            int:\n              MarkerSize: 5\n",
        )
        .unwrap();

    let keys = recorder.keys.lock().clone();
    assert_eq!(keys, vec!["RandomColor".to_string(), "MarkerSize".to_string()]);
}

#[test]
fn test_groups_are_isolated() {
    let store = ParameterStore::new();
    let view = store.group_by_path(VIEW);
    let other = store.group_by_path("User parameter:BaseApp/Preferences/Document");
    let recorder = Arc::new(KeyRecorder::default());
    view.attach(&recorder);

    other.set_int("MarkerSize", 3);
    assert!(recorder.keys.lock().is_empty());
    assert_eq!(view.get(ParameterType::Int, "MarkerSize"), None);

    view.set("MarkerSize", ParameterValue::Int(3));
    assert_eq!(recorder.keys.lock().len(), 1);
}
