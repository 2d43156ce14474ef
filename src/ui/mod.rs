//! UI Module - GTK4/Libadwaita preferences window

pub mod app;
pub mod bridge;
pub mod window;
