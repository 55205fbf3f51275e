//! YAML parameter document loading and saving.
//!
//! A document mirrors one parameter tree. Each group lists its entries in
//! one section per type, followed by its child groups:
//!
//! ```yaml
//! groups:
//!   BaseApp:
//!     groups:
//!       Preferences:
//!         groups:
//!           View:
//!             bool:
//!               UseNewSelection: false
//!             int:
//!               MarkerSize: 7
//!             unsigned:
//!               DefaultShapeColor: 3435973887
//! ```
//!
//! Every section is optional when loading; empty sections are omitted when
//! saving.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::group::ParameterGroup;
use crate::types::{ParameterType, ParameterValue};

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct GroupDocument {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    bool: BTreeMap<String, bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    int: BTreeMap<String, i64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    unsigned: BTreeMap<String, u64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    float: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    string: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    groups: BTreeMap<String, GroupDocument>,
}

impl GroupDocument {
    fn capture(group: &ParameterGroup) -> Self {
        let mut doc = GroupDocument::default();
        for (key, value) in group.entries() {
            match value {
                ParameterValue::Bool(v) => {
                    doc.bool.insert(key, v);
                }
                ParameterValue::Int(v) => {
                    doc.int.insert(key, v);
                }
                ParameterValue::Unsigned(v) => {
                    doc.unsigned.insert(key, v);
                }
                ParameterValue::Float(v) => {
                    doc.float.insert(key, v);
                }
                ParameterValue::String(v) => {
                    doc.string.insert(key, v);
                }
            }
        }
        for name in group.group_names() {
            doc.groups
                .insert(name.clone(), Self::capture(&group.group(&name)));
        }
        doc
    }

    /// Merge into `group` through its setters so observers see every key.
    fn apply(self, group: &ParameterGroup) -> usize {
        let mut count = 0;
        for (key, v) in self.bool {
            group.set_bool(&key, v);
            count += 1;
        }
        for (key, v) in self.int {
            group.set_int(&key, v);
            count += 1;
        }
        for (key, v) in self.unsigned {
            group.set_unsigned(&key, v);
            count += 1;
        }
        for (key, v) in self.float {
            group.set_float(&key, v);
            count += 1;
        }
        for (key, v) in self.string {
            group.set_string(&key, &v);
            count += 1;
        }
        for (name, child) in self.groups {
            count += child.apply(&group.group(&name));
        }
        count
    }
}

/// Serialize `group` and its subtree to a YAML string.
pub fn to_yaml_string(group: &ParameterGroup) -> Result<String> {
    Ok(serde_yaml::to_string(&GroupDocument::capture(group))?)
}

/// Parse a YAML document and merge it into `group`.
///
/// Returns the number of entries applied.
pub fn load_yaml_str(yaml: &str, group: &ParameterGroup) -> Result<usize> {
    if yaml.trim().is_empty() {
        return Ok(0);
    }
    let doc: GroupDocument = serde_yaml::from_str(yaml)?;
    Ok(doc.apply(group))
}

/// Load a YAML parameter file and merge it into `group`.
pub fn load_parameter_file(path: &Path, group: &ParameterGroup) -> Result<usize> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let count = load_yaml_str(&content, group)?;
    debug!("[STORE] Loaded {} parameters from {:?}", count, path);
    Ok(count)
}

/// Save `group` and its subtree to a YAML parameter file.
pub fn save_parameter_file(path: &Path, group: &ParameterGroup) -> Result<()> {
    let yaml = to_yaml_string(group)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    std::fs::write(path, yaml).map_err(|e| Error::io(path, e))?;
    debug!("[STORE] Saved parameters to {:?}", path);
    Ok(())
}

/// Parse a single override of the form `Group/Path/Key=type:value`.
///
/// Returns the group path, key and value.
pub(crate) fn parse_override(text: &str) -> Result<(String, String, ParameterValue)> {
    let invalid = || Error::InvalidOverride(text.to_string());

    let (target, typed) = text.split_once('=').ok_or_else(invalid)?;
    let (ty, value) = typed.split_once(':').ok_or_else(invalid)?;
    let ty: ParameterType = ty.trim().parse().map_err(|_| invalid())?;
    let value = ParameterValue::parse(ty, value).ok_or_else(invalid)?;

    let target = target.trim();
    let (path, key) = match target.rsplit_once('/') {
        Some((path, key)) => (path.to_string(), key.to_string()),
        None => (String::new(), target.to_string()),
    };
    if key.is_empty() {
        return Err(invalid());
    }
    Ok((path, key, value))
}
