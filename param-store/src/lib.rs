//! Hierarchical typed settings store.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ParameterStore                                              │
//! │  ├── "User parameter"   : ParameterManager                   │
//! │  │   └── root: ParameterGroup                                │
//! │  │       └── BaseApp/Preferences/View : ParameterGroup       │
//! │  │           ├── entries (bool/int/unsigned/float/string)    │
//! │  │           ├── observers: Weak<dyn ParameterGroupObserver> │
//! │  │           └── subscribers: flume::Sender<ParameterChange> │
//! │  └── "System parameter" : ParameterManager                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Groups are addressed as `"<manager>:<group path>"`, e.g.
//! `"User parameter:BaseApp/Preferences/View"`. Trees can be loaded from and
//! saved to YAML documents (see [`yaml`]).

pub mod error;
pub mod group;
pub mod manager;
pub mod types;
pub mod yaml;

pub use error::{Error, Result};
pub use group::{ParameterChange, ParameterGroup, ParameterGroupObserver};
pub use manager::{
    OVERRIDE_ENV, ParameterManager, ParameterStore, ParameterStoreBuilder, SYSTEM_CONFIG_ENV,
    SYSTEM_PARAMETER, USER_CONFIG_ENV, USER_PARAMETER,
};
pub use types::{ParameterScalar, ParameterType, ParameterValue};

pub trait Builder {
    type Output;
    type Error;
    fn build(self) -> std::result::Result<Self::Output, Self::Error>;
}
