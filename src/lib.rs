//! Shell Preferences - GTK4/Libadwaita application
//!
//! This library provides:
//! - Settings backend selection (GSettings, keyfile, memory)
//! - The GSettings backend
//! - Embedded page resources
//! - GTK implementations of the preferences model's controls

pub mod backend;
pub mod gsettings;
pub mod resources;
pub mod ui;
