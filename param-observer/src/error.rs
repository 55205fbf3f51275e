//! Error types for parameter observers

use param_store::ParameterType;

pub type Result<T> = std::result::Result<T, ParameterError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    #[error("parameter '{key}' is not registered")]
    NotRegistered { key: String },

    #[error("wrong cast of parameter '{key}': requested {requested}, registered as {registered}")]
    TypeMismatch {
        key: String,
        requested: ParameterType,
        registered: ParameterType,
    },

    #[error("parameter '{key}' is already registered")]
    AlreadyRegistered { key: String },
}

impl ParameterError {
    pub fn key(&self) -> &str {
        match self {
            Self::NotRegistered { key }
            | Self::TypeMismatch { key, .. }
            | Self::AlreadyRegistered { key } => key,
        }
    }
}
