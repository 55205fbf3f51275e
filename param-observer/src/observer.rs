//! Cached, change-notified view over one parameter group.
//!
//! A `ParameterObserver` owns a registry of typed [`Slot`]s and is attached
//! to exactly one [`ParameterGroup`]. Getters read the cache; setters write
//! the group, then the cache. When the group changes underneath (another
//! writer, a loaded file) the notification re-fetches the single affected
//! slot.
//!
//! # Example
//!
//! ```
//! use param_observer::{ParameterObserverBuilder, Slot};
//! use param_store::{Builder, ParameterGroup};
//!
//! let group = ParameterGroup::root();
//! let observer = ParameterObserverBuilder::new(group.clone())
//!     .with_parameter("Flag", Slot::bool(true))
//!     .build()
//!     .unwrap();
//!
//! observer.set_boolean("Flag", false).unwrap();
//! assert!(!group.get_bool("Flag", true));
//! assert_eq!(observer.get_default_boolean("Flag"), Ok(true));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use param_store::{
    Builder, ParameterGroup, ParameterGroupObserver, ParameterScalar, ParameterType,
    ParameterValue,
};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::{ParameterError, Result};
use crate::slot::Slot;

#[derive(Debug, Default)]
struct Registry {
    slots: HashMap<String, Slot>,
    /// Registration order; drives the initial load.
    order: Vec<String>,
}

impl Registry {
    fn slot(&self, key: &str) -> Result<&Slot> {
        self.slots
            .get(key)
            .ok_or_else(|| ParameterError::NotRegistered {
                key: key.to_string(),
            })
    }

    fn slot_mut(&mut self, key: &str) -> Result<&mut Slot> {
        self.slots
            .get_mut(key)
            .ok_or_else(|| ParameterError::NotRegistered {
                key: key.to_string(),
            })
    }
}

#[derive(Debug)]
pub struct ParameterObserver {
    group: Arc<ParameterGroup>,
    registry: RwLock<Registry>,
}

pub struct ParameterObserverBuilder {
    group: Arc<ParameterGroup>,
    parameters: Vec<(String, Slot)>,
}

impl ParameterObserverBuilder {
    pub fn new(group: Arc<ParameterGroup>) -> Self {
        Self {
            group,
            parameters: Vec::new(),
        }
    }

    /// Register a parameter. Keys must be unique.
    pub fn with_parameter<K: Into<String>>(mut self, key: K, slot: Slot) -> Self {
        self.parameters.push((key.into(), slot));
        self
    }
}

impl Builder for ParameterObserverBuilder {
    type Output = Arc<ParameterObserver>;
    type Error = ParameterError;

    /// Attach to the group, register every parameter, then load the current
    /// values from the group.
    fn build(self) -> Result<Arc<ParameterObserver>> {
        let observer = Arc::new(ParameterObserver {
            group: self.group,
            registry: RwLock::new(Registry::default()),
        });
        observer.group.attach(&observer);

        for (key, slot) in self.parameters {
            observer.add_parameter(key, slot)?;
        }
        observer.init_parameters();

        debug!(
            "[PARAMS] Observer created for group {:?} with {} parameters",
            observer.group.path(),
            observer.len()
        );
        Ok(observer)
    }
}

impl ParameterObserver {
    pub fn group(&self) -> &Arc<ParameterGroup> {
        &self.group
    }

    fn add_parameter(&self, key: String, slot: Slot) -> Result<()> {
        let mut registry = self.registry.write();
        if registry.slots.contains_key(&key) {
            return Err(ParameterError::AlreadyRegistered { key });
        }
        registry.order.push(key.clone());
        registry.slots.insert(key, slot);
        Ok(())
    }

    /// Fetch every registered parameter from the group, in registration
    /// order. Stored values override compiled defaults.
    pub fn init_parameters(&self) {
        let mut registry = self.registry.write();
        let Registry { slots, order } = &mut *registry;
        for key in order.iter() {
            if let Some(slot) = slots.get_mut(key) {
                slot.fetch(&self.group, key);
            }
        }
    }

    // ── Registry inspection ──────────────────────────────────────────────────

    /// Registered keys, in registration order.
    pub fn keys(&self) -> Vec<String> {
        self.registry.read().order.clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.registry.read().slots.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.registry.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn parameter_type(&self, key: &str) -> Result<ParameterType> {
        Ok(self.registry.read().slot(key)?.parameter_type())
    }

    /// Cached value of `key`, whatever its type.
    pub fn get(&self, key: &str) -> Result<ParameterValue> {
        Ok(self.registry.read().slot(key)?.value().clone())
    }

    // ── Generic access ───────────────────────────────────────────────────────

    /// Write `value` to the group, then to the cache.
    pub fn set_value<T: ParameterScalar>(&self, key: &str, value: T) -> Result<()> {
        self.set_parameter(key, value.into_value())
    }

    /// Cached value of `key` as `T`.
    pub fn get_value<T: ParameterScalar>(&self, key: &str) -> Result<T> {
        self.registry.read().slot(key)?.get(key)
    }

    /// Compiled-in default of `key` as `T`.
    pub fn get_default<T: ParameterScalar>(&self, key: &str) -> Result<T> {
        self.registry.read().slot(key)?.get_default(key)
    }

    /// Write the compiled-in default of `key` back to the group and cache.
    pub fn reset_to_default(&self, key: &str) -> Result<()> {
        let default = self.registry.read().slot(key)?.default_value().clone();
        self.set_parameter(key, default)
    }

    fn set_parameter(&self, key: &str, value: ParameterValue) -> Result<()> {
        // The group notifies synchronously and the handler takes the registry
        // lock, so it must not be held across the group write.
        let slot = self.registry.read().slot(key)?.clone();
        slot.set_parameter(&self.group, key, &value)?;
        // A concurrent writer may already have replaced `value` in the group.
        self.registry.write().slot_mut(key)?.fetch(&self.group, key);
        Ok(())
    }

    // ── Typed access ─────────────────────────────────────────────────────────

    pub fn set_boolean(&self, key: &str, value: bool) -> Result<()> {
        self.set_value(key, value)
    }

    pub fn get_boolean(&self, key: &str) -> Result<bool> {
        self.get_value(key)
    }

    pub fn get_default_boolean(&self, key: &str) -> Result<bool> {
        self.get_default(key)
    }

    pub fn set_int(&self, key: &str, value: i64) -> Result<()> {
        self.set_value(key, value)
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get_value(key)
    }

    pub fn get_default_int(&self, key: &str) -> Result<i64> {
        self.get_default(key)
    }

    pub fn set_unsigned(&self, key: &str, value: u64) -> Result<()> {
        self.set_value(key, value)
    }

    pub fn get_unsigned(&self, key: &str) -> Result<u64> {
        self.get_value(key)
    }

    pub fn get_default_unsigned(&self, key: &str) -> Result<u64> {
        self.get_default(key)
    }

    pub fn set_float(&self, key: &str, value: f64) -> Result<()> {
        self.set_value(key, value)
    }

    pub fn get_float(&self, key: &str) -> Result<f64> {
        self.get_value(key)
    }

    pub fn get_default_float(&self, key: &str) -> Result<f64> {
        self.get_default(key)
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value.to_string())
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get_value(key)
    }

    pub fn get_default_string(&self, key: &str) -> Result<String> {
        self.get_default(key)
    }
}

impl ParameterGroupObserver for ParameterObserver {
    fn on_change(&self, group: &ParameterGroup, key: Option<&str>) {
        let Some(key) = key.filter(|k| !k.is_empty()) else {
            return;
        };
        let mut registry = self.registry.write();
        match registry.slots.get_mut(key) {
            Some(slot) => {
                slot.fetch(group, key);
                trace!("[PARAMS] {}/{} -> {}", group.path(), key, slot.value());
            }
            None => trace!("[PARAMS] Ignoring change of unregistered key {}", key),
        }
    }
}
