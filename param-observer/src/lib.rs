//! Typed, cached access to parameter groups.
//!
//! A [`ParameterObserver`] registers a fixed set of keys on one
//! [`ParameterGroup`](param_store::ParameterGroup), each with a typed default.
//! Reads are served from the cache; writes go to the group and the cache;
//! changes made to the group by anyone else are picked up through the
//! group's change notification.
//!
//! [`ViewParams`] is the concrete consumer for the view preferences.

pub mod color;
pub mod error;
pub mod observer;
pub mod slot;
pub mod view;

pub use color::Color;
pub use error::{ParameterError, Result};
pub use observer::{ParameterObserver, ParameterObserverBuilder};
pub use param_store::Builder;
pub use slot::Slot;
pub use view::{VIEW_PARAMS_PATH, ViewParameter, ViewParams};
