//! Typed parameter slots.
//!
//! A `Slot` caches one parameter's value next to its compiled-in default.
//! Its type is fixed by the default it was built from; every later value
//! must have the same type.

use param_store::{ParameterGroup, ParameterScalar, ParameterType, ParameterValue};

use crate::error::{ParameterError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    value: ParameterValue,
    default: ParameterValue,
}

impl Slot {
    /// Create a slot whose cached value starts at `default`.
    pub fn new<T: ParameterScalar>(default: T) -> Self {
        Self::from_value(default.into_value())
    }

    pub fn from_value(default: ParameterValue) -> Self {
        Self {
            value: default.clone(),
            default,
        }
    }

    pub fn bool(default: bool) -> Self {
        Self::new(default)
    }

    pub fn int(default: i64) -> Self {
        Self::new(default)
    }

    pub fn unsigned(default: u64) -> Self {
        Self::new(default)
    }

    pub fn float(default: f64) -> Self {
        Self::new(default)
    }

    pub fn string(default: impl Into<String>) -> Self {
        Self::new(default.into())
    }

    pub fn parameter_type(&self) -> ParameterType {
        self.default.parameter_type()
    }

    pub fn value(&self) -> &ParameterValue {
        &self.value
    }

    pub fn default_value(&self) -> &ParameterValue {
        &self.default
    }

    /// Re-read `key` from `group` into the cache.
    ///
    /// Falls back to the default when the group holds no value of this
    /// slot's type. Never writes to the group.
    pub fn fetch(&mut self, group: &ParameterGroup, key: &str) {
        self.value = match &self.default {
            ParameterValue::Bool(d) => ParameterValue::Bool(group.get_bool(key, *d)),
            ParameterValue::Int(d) => ParameterValue::Int(group.get_int(key, *d)),
            ParameterValue::Unsigned(d) => ParameterValue::Unsigned(group.get_unsigned(key, *d)),
            ParameterValue::Float(d) => ParameterValue::Float(group.get_float(key, *d)),
            ParameterValue::String(d) => ParameterValue::String(group.get_string(key, d)),
        };
    }

    /// Write `value` to `group` under `key`. The cache is left untouched.
    pub fn set_parameter(
        &self,
        group: &ParameterGroup,
        key: &str,
        value: &ParameterValue,
    ) -> Result<()> {
        self.check(key, value.parameter_type())?;
        match value {
            ParameterValue::Bool(v) => group.set_bool(key, *v),
            ParameterValue::Int(v) => group.set_int(key, *v),
            ParameterValue::Unsigned(v) => group.set_unsigned(key, *v),
            ParameterValue::Float(v) => group.set_float(key, *v),
            ParameterValue::String(v) => group.set_string(key, v),
        }
        Ok(())
    }

    /// Overwrite the cached value only.
    pub fn set_value(&mut self, key: &str, value: ParameterValue) -> Result<()> {
        self.check(key, value.parameter_type())?;
        self.value = value;
        Ok(())
    }

    /// Read the cached value as `T`.
    pub fn get<T: ParameterScalar>(&self, key: &str) -> Result<T> {
        T::from_value(&self.value).ok_or_else(|| self.mismatch(key, T::TYPE))
    }

    /// Read the default as `T`.
    pub fn get_default<T: ParameterScalar>(&self, key: &str) -> Result<T> {
        T::from_value(&self.default).ok_or_else(|| self.mismatch(key, T::TYPE))
    }

    pub(crate) fn check(&self, key: &str, requested: ParameterType) -> Result<()> {
        if requested == self.parameter_type() {
            Ok(())
        } else {
            Err(self.mismatch(key, requested))
        }
    }

    fn mismatch(&self, key: &str, requested: ParameterType) -> ParameterError {
        ParameterError::TypeMismatch {
            key: key.to_string(),
            requested,
            registered: self.parameter_type(),
        }
    }
}
