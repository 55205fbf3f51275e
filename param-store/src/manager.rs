//! Parameter managers and the process-wide parameter store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::Builder;
use crate::error::{Error, Result};
use crate::group::ParameterGroup;
use crate::types::ParameterValue;
use crate::yaml;

pub const USER_PARAMETER: &str = "User parameter";
pub const SYSTEM_PARAMETER: &str = "System parameter";

/// Environment variable naming the YAML file loaded into the user tree.
pub const USER_CONFIG_ENV: &str = "PARAM_STORE_USER_CONFIG";
/// Environment variable naming the YAML file loaded into the system tree.
pub const SYSTEM_CONFIG_ENV: &str = "PARAM_STORE_SYSTEM_CONFIG";
/// Environment variable with `;`-separated `path/Key=type:value` overrides.
pub const OVERRIDE_ENV: &str = "PARAM_STORE_OVERRIDE";

/// The named root of one parameter tree.
#[derive(Debug)]
pub struct ParameterManager {
    name: String,
    root: Arc<ParameterGroup>,
}

impl ParameterManager {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: ParameterGroup::root(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Arc<ParameterGroup> {
        &self.root
    }

    /// Walk a `/`-separated group path from the root, creating groups as
    /// needed. Empty segments are ignored.
    pub fn group_by_path(&self, path: &str) -> Arc<ParameterGroup> {
        path.split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |group, segment| group.group(segment))
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        yaml::to_yaml_string(&self.root)
    }

    /// Merge a YAML document into this tree. Returns the number of entries.
    pub fn load_yaml_str(&self, yaml: &str) -> Result<usize> {
        yaml::load_yaml_str(yaml, &self.root)
    }

    pub fn load_file(&self, path: &Path) -> Result<usize> {
        let count = yaml::load_parameter_file(path, &self.root)?;
        info!(
            "[STORE] {}: loaded {} parameters from {:?}",
            self.name, count, path
        );
        Ok(count)
    }

    pub fn save_file(&self, path: &Path) -> Result<()> {
        yaml::save_parameter_file(path, &self.root)
    }
}

/// The set of parameter managers of one process.
#[derive(Debug)]
pub struct ParameterStore {
    managers: RwLock<BTreeMap<String, Arc<ParameterManager>>>,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterStore {
    /// Create a store holding empty user and system trees.
    pub fn new() -> Self {
        let managers = [USER_PARAMETER, SYSTEM_PARAMETER]
            .into_iter()
            .map(|name| (name.to_string(), Arc::new(ParameterManager::new(name))))
            .collect();
        Self {
            managers: RwLock::new(managers),
        }
    }

    /// Get the global store (lazy initialized from the environment).
    ///
    /// A configuration that fails to load is logged and replaced by an
    /// empty store.
    pub fn global() -> &'static ParameterStore {
        static STORE: OnceLock<ParameterStore> = OnceLock::new();
        STORE.get_or_init(|| {
            ParameterStoreBuilder::default()
                .build()
                .unwrap_or_else(|e| {
                    warn!("[STORE] Failed to load parameter configuration: {}", e);
                    ParameterStore::new()
                })
        })
    }

    /// Get the manager `name`, creating it if needed.
    pub fn manager(&self, name: &str) -> Arc<ParameterManager> {
        if let Some(manager) = self.managers.read().get(name) {
            return manager.clone();
        }
        self.managers
            .write()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(ParameterManager::new(name)))
            .clone()
    }

    pub fn manager_names(&self) -> Vec<String> {
        self.managers.read().keys().cloned().collect()
    }

    pub fn user(&self) -> Arc<ParameterManager> {
        self.manager(USER_PARAMETER)
    }

    pub fn system(&self) -> Arc<ParameterManager> {
        self.manager(SYSTEM_PARAMETER)
    }

    /// Resolve `"User parameter:BaseApp/Preferences/View"`.
    ///
    /// The `"<manager>:"` prefix selects the manager; without it the user
    /// tree is used.
    pub fn group_by_path(&self, path: &str) -> Arc<ParameterGroup> {
        match path.split_once(':') {
            Some((manager, rest)) => self.manager(manager.trim()).group_by_path(rest),
            None => self.user().group_by_path(path),
        }
    }

    fn apply_override(&self, text: &str) -> Result<()> {
        let (path, key, value) = yaml::parse_override(text)?;
        debug!("[STORE] Override: {}/{} = {}", path, key, value);
        self.group_by_path(&path).set(&key, value);
        Ok(())
    }
}

pub struct ParameterStoreBuilder {
    user_config: Option<PathBuf>,
    system_config: Option<PathBuf>,
    overrides: Vec<(String, String, ParameterValue)>,
}

impl Default for ParameterStoreBuilder {
    fn default() -> Self {
        Self {
            user_config: None,
            system_config: None,
            overrides: Vec::new(),
        }
    }
}

impl ParameterStoreBuilder {
    /// Load the user tree from a YAML file
    pub fn with_user_config<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.user_config = Some(path.into());
        self
    }

    /// Load the system tree from a YAML file
    pub fn with_system_config<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.system_config = Some(path.into());
        self
    }

    /// Set a value after the configuration files are loaded.
    ///
    /// # Example
    /// ```
    /// use param_store::{Builder, ParameterStoreBuilder};
    ///
    /// let store = ParameterStoreBuilder::default()
    ///     .with_override("User parameter:BaseApp/Preferences/View", "MarkerSize", 5i64)
    ///     .build()
    ///     .unwrap();
    /// let view = store.group_by_path("User parameter:BaseApp/Preferences/View");
    /// assert_eq!(view.get_int("MarkerSize", 9), 5);
    /// ```
    pub fn with_override<P, K, V>(mut self, path: P, key: K, value: V) -> Self
    where
        P: Into<String>,
        K: Into<String>,
        V: Into<ParameterValue>,
    {
        self.overrides.push((path.into(), key.into(), value.into()));
        self
    }

    fn config_path(explicit: Option<PathBuf>, env: &str) -> Option<PathBuf> {
        explicit.or_else(|| std::env::var_os(env).map(PathBuf::from))
    }
}

impl Builder for ParameterStoreBuilder {
    type Output = ParameterStore;
    type Error = Error;

    fn build(self) -> Result<ParameterStore> {
        // Priority order:
        // 1. File passed via with_user_config() / with_system_config()
        // 2. PARAM_STORE_USER_CONFIG / PARAM_STORE_SYSTEM_CONFIG
        // 3. Empty tree
        let store = ParameterStore::new();

        if let Some(path) = Self::config_path(self.system_config, SYSTEM_CONFIG_ENV) {
            store.system().load_file(&path)?;
        }
        if let Some(path) = Self::config_path(self.user_config, USER_CONFIG_ENV) {
            store.user().load_file(&path)?;
        }

        // Environment overrides first, explicit ones win
        if let Ok(overrides) = std::env::var(OVERRIDE_ENV) {
            debug!(
                "[STORE] Applying overrides from {}: {}",
                OVERRIDE_ENV, overrides
            );
            for pair in overrides.split(';').map(str::trim) {
                if !pair.is_empty() {
                    store.apply_override(pair)?;
                }
            }
        }
        for (path, key, value) in self.overrides {
            store.group_by_path(&path).set(&key, value);
        }

        Ok(store)
    }
}
