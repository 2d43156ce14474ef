//! Shell Preferences Common Library
//!
//! Toolkit-free model of the preferences window:
//! - Settings schema and store adapter (memory and keyfile backends)
//! - Bindings and scoped subscriptions
//! - Page registry and sidebar synchronization
//! - Appearance (color scheme) control
//! - The window orchestrator that composes them
//!
//! This crate has NO GTK4 dependencies; the application crate supplies
//! toolkit implementations of the control traits.

pub mod appearance;
pub mod config;
pub mod controls;
pub mod error;
pub mod events;
pub mod paths;
pub mod registry;
pub mod schema;
pub mod sidebar;
pub mod store;
pub mod subscription;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ResourceLoadError, SchemaError, SettingsError, StoreError};
pub use schema::{Schema, SettingValue};
pub use store::Settings;
pub use subscription::{Subscription, Subscriptions};
