//! Control Seams
//!
//! Toolkit-free views of the widgets binders touch. The GTK crate
//! implements these over `GtkBuilder` objects; tests use in-memory fakes.

use crate::error::ResourceLoadError;
use crate::subscription::Subscription;
use std::fmt;
use std::rc::Rc;

/// Identifier of the element every page resource must expose
pub const ROOT_ID: &str = "root";

/// A control with a boolean `active` state (switch rows)
pub trait Toggle {
    fn is_active(&self) -> bool;
    fn set_active(&self, active: bool);

    /// Called with the new state whenever `active` changes
    fn connect_toggled(&self, callback: Rc<dyn Fn(bool)>) -> Subscription;
}

/// A control with a selected index (combo rows)
pub trait Selector {
    fn selected(&self) -> u32;
    fn set_selected(&self, index: u32);

    /// Called with the new index whenever the selection changes
    fn connect_selected(&self, callback: Rc<dyn Fn(u32)>) -> Subscription;
}

/// Resolves named controls inside a loaded page definition
pub trait ControlLookup {
    fn toggle(&self, id: &str) -> Option<Rc<dyn Toggle>>;
    fn selector(&self, id: &str) -> Option<Rc<dyn Selector>>;
}

/// The object graph of a loaded page resource
pub trait PageDefinition: ControlLookup {
    /// Opaque UI subtree handed to the page container
    type Widget;

    /// The element named [`ROOT_ID`], if present
    fn root(&self) -> Option<Self::Widget>;
}

/// Loads page definitions from resource paths
pub trait ResourceLoader {
    type Definition: PageDefinition;

    fn load(&self, path: &str) -> Result<Self::Definition, ResourceLoadError>;
}

/// Stable identifiers of the controls binders look up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    LaunchRow,
    NotifRow,
    NetworkRow,
    ColorCombo,
}

impl ControlId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlId::LaunchRow => "launch_row",
            ControlId::NotifRow => "notif_row",
            ControlId::NetworkRow => "network_row",
            ControlId::ColorCombo => "color_combo",
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
