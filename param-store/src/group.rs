//! Parameter groups.
//!
//! A `ParameterGroup` is one node of a parameter tree. It holds typed
//! entries (each type has its own key namespace), child groups, and the
//! observers that want to hear about changes to its entries.
//!
//! Change notifications are delivered synchronously on the mutating thread,
//! after the group's own locks have been released, so an observer may read
//! the group from inside its callback.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::types::{ParameterScalar, ParameterType, ParameterValue};

/// Receives change notifications from a [`ParameterGroup`].
///
/// `key` is the name of the entry that changed, or `None` for a notification
/// that does not concern a single entry.
pub trait ParameterGroupObserver: Send + Sync {
    fn on_change(&self, group: &ParameterGroup, key: Option<&str>);
}

/// A change event delivered to [`ParameterGroup::subscribe`] receivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterChange {
    /// Path of the group inside its manager (`BaseApp/Preferences/View`).
    pub group: String,
    pub key: Option<String>,
}

type Entries = BTreeMap<ParameterType, BTreeMap<String, ParameterValue>>;

pub struct ParameterGroup {
    name: String,
    path: String,
    entries: RwLock<Entries>,
    groups: RwLock<BTreeMap<String, Arc<ParameterGroup>>>,
    observers: Mutex<Vec<Weak<dyn ParameterGroupObserver>>>,
    subscribers: Mutex<Vec<flume::Sender<ParameterChange>>>,
}

impl std::fmt::Debug for ParameterGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterGroup")
            .field("path", &self.path)
            .field("entries", &*self.entries.read())
            .field("groups", &self.group_names())
            .finish()
    }
}

impl ParameterGroup {
    /// Create the unnamed root group of a tree.
    pub fn root() -> Arc<Self> {
        Arc::new(Self::with_path(String::new(), String::new()))
    }

    fn with_path(name: String, path: String) -> Self {
        Self {
            name,
            path,
            entries: RwLock::new(BTreeMap::new()),
            groups: RwLock::new(BTreeMap::new()),
            observers: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of this group inside its manager; empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    // ── Typed entries ────────────────────────────────────────────────────────

    /// Get the stored value of type `ty` under `key`.
    pub fn get(&self, ty: ParameterType, key: &str) -> Option<ParameterValue> {
        self.entries.read().get(&ty)?.get(key).cloned()
    }

    /// Get the stored scalar under `key`, or `default` when absent.
    ///
    /// Never writes to the group.
    pub fn value_or<T: ParameterScalar>(&self, key: &str, default: T) -> T {
        self.get(T::TYPE, key)
            .and_then(|v| T::from_value(&v))
            .unwrap_or(default)
    }

    /// Store `value` under `key` in the namespace of its type.
    ///
    /// Observers are notified only when the stored value actually changed.
    pub fn set(&self, key: &str, value: ParameterValue) {
        let changed = {
            let mut entries = self.entries.write();
            let typed = entries.entry(value.parameter_type()).or_default();
            match typed.get(key) {
                Some(old) if *old == value => false,
                _ => {
                    trace!("[STORE] {}/{} = {}", self.path, key, value);
                    typed.insert(key.to_string(), value);
                    true
                }
            }
        };
        if changed {
            self.notify(Some(key));
        }
    }

    /// Remove the entry of type `ty` under `key`. Returns the removed value.
    pub fn remove(&self, ty: ParameterType, key: &str) -> Option<ParameterValue> {
        let removed = self.entries.write().get_mut(&ty)?.remove(key);
        if removed.is_some() {
            self.notify(Some(key));
        }
        removed
    }

    pub fn contains(&self, ty: ParameterType, key: &str) -> bool {
        self.entries
            .read()
            .get(&ty)
            .is_some_and(|typed| typed.contains_key(key))
    }

    /// Keys stored with type `ty`, sorted.
    pub fn keys(&self, ty: ParameterType) -> Vec<String> {
        self.entries
            .read()
            .get(&ty)
            .map(|typed| typed.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// All entries, ordered by type then key.
    pub fn entries(&self) -> Vec<(String, ParameterValue)> {
        self.entries
            .read()
            .values()
            .flat_map(|typed| typed.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect()
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.value_or(key, default)
    }

    pub fn set_bool(&self, key: &str, value: bool) {
        self.set(key, ParameterValue::Bool(value));
    }

    pub fn remove_bool(&self, key: &str) -> Option<bool> {
        self.remove(ParameterType::Bool, key)
            .and_then(|v| bool::from_value(&v))
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.value_or(key, default)
    }

    pub fn set_int(&self, key: &str, value: i64) {
        self.set(key, ParameterValue::Int(value));
    }

    pub fn remove_int(&self, key: &str) -> Option<i64> {
        self.remove(ParameterType::Int, key)
            .and_then(|v| i64::from_value(&v))
    }

    pub fn get_unsigned(&self, key: &str, default: u64) -> u64 {
        self.value_or(key, default)
    }

    pub fn set_unsigned(&self, key: &str, value: u64) {
        self.set(key, ParameterValue::Unsigned(value));
    }

    pub fn remove_unsigned(&self, key: &str) -> Option<u64> {
        self.remove(ParameterType::Unsigned, key)
            .and_then(|v| u64::from_value(&v))
    }

    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        self.value_or(key, default)
    }

    pub fn set_float(&self, key: &str, value: f64) {
        self.set(key, ParameterValue::Float(value));
    }

    pub fn remove_float(&self, key: &str) -> Option<f64> {
        self.remove(ParameterType::Float, key)
            .and_then(|v| f64::from_value(&v))
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get(ParameterType::String, key)
            .and_then(|v| String::from_value(&v))
            .unwrap_or_else(|| default.to_string())
    }

    pub fn set_string(&self, key: &str, value: &str) {
        self.set(key, ParameterValue::String(value.to_string()));
    }

    pub fn remove_string(&self, key: &str) -> Option<String> {
        self.remove(ParameterType::String, key)
            .and_then(|v| String::from_value(&v))
    }

    // ── Child groups ─────────────────────────────────────────────────────────

    /// Get the child group `name`, creating it if needed.
    pub fn group(&self, name: &str) -> Arc<ParameterGroup> {
        if let Some(group) = self.groups.read().get(name) {
            return group.clone();
        }
        self.groups
            .write()
            .entry(name.to_string())
            .or_insert_with(|| {
                let path = if self.path.is_empty() {
                    name.to_string()
                } else {
                    format!("{}/{}", self.path, name)
                };
                debug!("[STORE] Created group {}", path);
                Arc::new(ParameterGroup::with_path(name.to_string(), path))
            })
            .clone()
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.groups.read().contains_key(name)
    }

    pub fn group_names(&self) -> Vec<String> {
        self.groups.read().keys().cloned().collect()
    }

    /// Clear and remove the child group `name`. Returns whether it existed.
    pub fn remove_group(&self, name: &str) -> bool {
        let removed = self.groups.write().remove(name);
        match removed {
            Some(group) => {
                group.clear();
                true
            }
            None => false,
        }
    }

    /// Remove every entry and child group, notifying each removed key.
    pub fn clear(&self) {
        let children = std::mem::take(&mut *self.groups.write());
        for child in children.values() {
            child.clear();
        }
        let entries = std::mem::take(&mut *self.entries.write());
        for key in entries.values().flat_map(|typed| typed.keys()) {
            self.notify(Some(key));
        }
    }

    // ── Observation ──────────────────────────────────────────────────────────

    /// Attach an observer. The group only keeps a weak reference, so dropping
    /// the observer detaches it.
    pub fn attach<O>(&self, observer: &Arc<O>)
    where
        O: ParameterGroupObserver + 'static,
    {
        let mut observers = self.observers.lock();
        let ptr = Arc::as_ptr(observer);
        if observers.iter().any(|w| std::ptr::addr_eq(w.as_ptr(), ptr)) {
            return;
        }
        let weak = Arc::downgrade(observer);
        observers.push(weak as Weak<dyn ParameterGroupObserver>);
        debug!("[STORE] Observer attached to group {}", self.path);
    }

    /// Detach an observer. Returns whether it was attached.
    pub fn detach<O>(&self, observer: &Arc<O>) -> bool
    where
        O: ParameterGroupObserver + 'static,
    {
        let mut observers = self.observers.lock();
        let ptr = Arc::as_ptr(observer);
        let before = observers.len();
        observers.retain(|w| !std::ptr::addr_eq(w.as_ptr(), ptr));
        before != observers.len()
    }

    /// Number of live attached observers.
    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Subscribe to change events of this group.
    pub fn subscribe(&self) -> flume::Receiver<ParameterChange> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Notify every observer and subscriber that `key` changed.
    pub fn notify(&self, key: Option<&str>) {
        let observers: Vec<Arc<dyn ParameterGroupObserver>> = {
            let mut observers = self.observers.lock();
            observers.retain(|w| w.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in observers {
            observer.on_change(self, key);
        }

        let change = ParameterChange {
            group: self.path.clone(),
            key: key.map(str::to_string),
        };
        self.subscribers
            .lock()
            .retain(|tx| tx.send(change.clone()).is_ok());
    }
}
