//! Appearance Controller
//!
//! Maps the `color-scheme` setting to a style mode and keeps the appearance
//! selector, the stored value and the shared style register consistent.

use crate::controls::Selector;
use crate::error::SettingsError;
use crate::schema::COLOR_SCHEME;
use crate::store::Settings;
use crate::subscription::{Listeners, Subscription};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Value of the `color-scheme` setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    System,
    Light,
    Dark,
}

impl ColorScheme {
    /// Selector order
    pub const ALL: [ColorScheme; 3] = [ColorScheme::System, ColorScheme::Light, ColorScheme::Dark];

    /// Parse a stored value; anything unrecognized is `System`
    pub fn from_setting(value: &str) -> Self {
        match value {
            "light" => ColorScheme::Light,
            "dark" => ColorScheme::Dark,
            _ => ColorScheme::System,
        }
    }

    /// Scheme at a selector index; out of range is `System`
    pub fn from_index(index: u32) -> Self {
        Self::ALL
            .get(index as usize)
            .copied()
            .unwrap_or_default()
    }

    pub fn index(self) -> u32 {
        match self {
            ColorScheme::System => 0,
            ColorScheme::Light => 1,
            ColorScheme::Dark => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorScheme::System => "system",
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }

    pub fn style_mode(self) -> StyleMode {
        match self {
            ColorScheme::System => StyleMode::Default,
            ColorScheme::Light => StyleMode::ForceLight,
            ColorScheme::Dark => StyleMode::ForceDark,
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-wide style mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleMode {
    /// Follow the desktop preference
    #[default]
    Default,
    ForceLight,
    ForceDark,
}

struct StyleInner {
    mode: Cell<StyleMode>,
    listeners: Listeners<dyn Fn(StyleMode)>,
}

/// Shared style register, last writer wins.
///
/// Every consumer gets a clone; the toolkit layer subscribes and forwards
/// changes to its style manager.
#[derive(Clone)]
pub struct SharedStyle {
    inner: Rc<StyleInner>,
}

impl SharedStyle {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(StyleInner {
                mode: Cell::new(StyleMode::Default),
                listeners: Listeners::new(),
            }),
        }
    }

    pub fn mode(&self) -> StyleMode {
        self.inner.mode.get()
    }

    /// Store a mode; listeners hear about actual changes only
    pub fn set_mode(&self, mode: StyleMode) {
        if self.inner.mode.replace(mode) == mode {
            return;
        }
        for listener in self.inner.listeners.snapshot() {
            listener(mode);
        }
    }

    pub fn subscribe(&self, listener: impl Fn(StyleMode) + 'static) -> Subscription {
        self.inner.listeners.add(Rc::new(listener))
    }
}

impl Default for SharedStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStyle")
            .field("mode", &self.mode())
            .finish()
    }
}

pub struct AppearanceController {
    settings: Settings,
    style: SharedStyle,
}

impl AppearanceController {
    pub fn new(settings: Settings, style: SharedStyle) -> Self {
        Self { settings, style }
    }

    /// Stored scheme, with unreadable or unknown values read as `System`
    pub fn current_scheme(&self) -> ColorScheme {
        match self.settings.get_string(COLOR_SCHEME) {
            Ok(value) => ColorScheme::from_setting(&value),
            Err(e) => {
                warn!("Cannot read color scheme: {}", e);
                ColorScheme::System
            }
        }
    }

    /// Push the stored scheme to the shared style register
    pub fn apply_style(&self) -> StyleMode {
        let scheme = self.current_scheme();
        let mode = scheme.style_mode();
        self.style.set_mode(mode);
        debug!("Applied color scheme '{}' as {:?}", scheme, mode);
        mode
    }

    /// Point the selector at the stored scheme without writing anything back
    pub fn sync_selector(&self, selector: &dyn Selector) {
        let index = self.current_scheme().index();
        if selector.selected() != index {
            selector.set_selected(index);
        }
    }

    /// Load direction: selector and style both follow the stored value
    pub fn load_selector(&self, selector: &dyn Selector) -> StyleMode {
        self.sync_selector(selector);
        self.apply_style()
    }

    /// Store direction: persist the scheme at `index`, then restyle from
    /// the stored value.
    ///
    /// An index that already maps to the stored scheme writes nothing, so a
    /// selector moved by [`sync_selector`](Self::sync_selector) never
    /// replaces a value written elsewhere.
    pub fn store_from_selector(&self, index: u32) -> Result<StyleMode, SettingsError> {
        let scheme = ColorScheme::from_index(index);
        if scheme != self.current_scheme() {
            self.settings.set_string(COLOR_SCHEME, scheme.as_str())?;
        }
        Ok(self.apply_style())
    }
}
