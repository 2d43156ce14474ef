//! GTK implementations of the preferences model's control and container
//! traits.

use crate::resources::PageResources;
use adw::prelude::*;
use gtk::glib;
use shellprefs_common::appearance::StyleMode;
use shellprefs_common::controls::{
    ControlLookup, PageDefinition, ResourceLoader, Selector, Toggle, ROOT_ID,
};
use shellprefs_common::error::ResourceLoadError;
use shellprefs_common::sidebar::{ContentReveal, NavigationList, PageEntry, PageNavigation};
use shellprefs_common::Subscription;
use std::rc::Rc;
use tracing::debug;

/// Disconnect `handler` from `object` when the subscription is released
fn signal_subscription<T: ObjectType>(object: &T, handler: glib::SignalHandlerId) -> Subscription {
    let object = object.downgrade();
    Subscription::new(move || {
        if let Some(object) = object.upgrade() {
            object.disconnect(handler);
        }
    })
}

fn has_property(object: &glib::Object, name: &str, value_type: glib::Type) -> bool {
    object
        .find_property(name)
        .is_some_and(|pspec| pspec.value_type() == value_type)
}

/// Any object with a boolean `active` property (AdwSwitchRow, GtkSwitch)
pub struct PropertyToggle {
    object: glib::Object,
}

impl Toggle for PropertyToggle {
    fn is_active(&self) -> bool {
        self.object.property::<bool>("active")
    }

    fn set_active(&self, active: bool) {
        self.object.set_property("active", active);
    }

    fn connect_toggled(&self, callback: Rc<dyn Fn(bool)>) -> Subscription {
        let handler = self
            .object
            .connect_notify_local(Some("active"), move |object, _| {
                callback(object.property::<bool>("active"));
            });
        signal_subscription(&self.object, handler)
    }
}

/// Any object with a `selected` index property (AdwComboRow, GtkDropDown)
pub struct PropertySelector {
    object: glib::Object,
}

impl Selector for PropertySelector {
    fn selected(&self) -> u32 {
        self.object.property::<u32>("selected")
    }

    fn set_selected(&self, index: u32) {
        self.object.set_property("selected", index);
    }

    fn connect_selected(&self, callback: Rc<dyn Fn(u32)>) -> Subscription {
        let handler = self
            .object
            .connect_notify_local(Some("selected"), move |object, _| {
                callback(object.property::<u32>("selected"));
            });
        signal_subscription(&self.object, handler)
    }
}

/// A page loaded into its own `GtkBuilder`
pub struct BuilderDefinition {
    builder: gtk::Builder,
}

impl BuilderDefinition {
    fn object_with(&self, id: &str, property: &str, value_type: glib::Type) -> Option<glib::Object> {
        let object = self.builder.object::<glib::Object>(id)?;
        if has_property(&object, property, value_type) {
            Some(object)
        } else {
            debug!("'{}' has no {} property '{}'", id, value_type, property);
            None
        }
    }
}

impl ControlLookup for BuilderDefinition {
    fn toggle(&self, id: &str) -> Option<Rc<dyn Toggle>> {
        let object = self.object_with(id, "active", bool::static_type())?;
        Some(Rc::new(PropertyToggle { object }))
    }

    fn selector(&self, id: &str) -> Option<Rc<dyn Selector>> {
        let object = self.object_with(id, "selected", u32::static_type())?;
        Some(Rc::new(PropertySelector { object }))
    }
}

impl PageDefinition for BuilderDefinition {
    type Widget = gtk::Widget;

    fn root(&self) -> Option<gtk::Widget> {
        self.builder.object::<gtk::Widget>(ROOT_ID)
    }
}

/// Builds pages from [`PageResources`]
pub struct BuilderLoader {
    resources: PageResources,
}

impl BuilderLoader {
    pub fn new(resources: PageResources) -> Self {
        Self { resources }
    }
}

impl ResourceLoader for BuilderLoader {
    type Definition = BuilderDefinition;

    fn load(&self, path: &str) -> Result<BuilderDefinition, ResourceLoadError> {
        let source = self.resources.source(path)?;
        let builder = gtk::Builder::new();
        builder
            .add_from_string(&source)
            .map_err(|e| ResourceLoadError::Malformed {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(BuilderDefinition { builder })
    }
}

/// `AdwViewStack` as the page container
pub struct StackPages {
    stack: adw::ViewStack,
}

impl StackPages {
    pub fn new(stack: adw::ViewStack) -> Self {
        Self { stack }
    }
}

impl shellprefs_common::registry::TitledPages<gtk::Widget> for StackPages {
    fn add_titled(&self, child: &gtk::Widget, name: &str, title: &str) {
        self.stack.add_titled(child, Some(name), title);
    }
}

impl PageNavigation for StackPages {
    fn pages(&self) -> Option<Vec<PageEntry>> {
        let model = self.stack.pages();
        let entries = (0..model.n_items())
            .filter_map(|i| model.item(i).and_downcast::<adw::ViewStackPage>())
            .filter_map(|page| {
                Some(PageEntry {
                    name: page.name()?.to_string(),
                    title: page.title().map(|t| t.to_string()).unwrap_or_default(),
                })
            })
            .collect();
        Some(entries)
    }

    fn show_page(&self, name: &str) -> bool {
        if self.stack.child_by_name(name).is_none() {
            return false;
        }
        self.stack.set_visible_child_name(name);
        true
    }

    fn visible_page(&self) -> Option<String> {
        self.stack.visible_child_name().map(|name| name.to_string())
    }
}

/// `GtkListBox` sidebar; each row carries its page name as widget name
pub struct SidebarList {
    list: gtk::ListBox,
}

impl SidebarList {
    pub fn new(list: gtk::ListBox) -> Self {
        Self { list }
    }

    fn row(&self, index: usize) -> Option<gtk::ListBoxRow> {
        self.list.row_at_index(i32::try_from(index).ok()?)
    }
}

impl NavigationList for SidebarList {
    fn clear(&self) {
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
    }

    fn append_row(&self, name: &str, title: &str) {
        let label = gtk::Label::builder()
            .label(title)
            .xalign(0.0)
            .margin_top(12)
            .margin_bottom(12)
            .margin_start(6)
            .margin_end(6)
            .build();

        let row = gtk::ListBoxRow::builder().child(&label).build();
        row.set_widget_name(name);
        self.list.append(&row);
    }

    fn row_count(&self) -> usize {
        let mut count = 0;
        let mut child = self.list.first_child();
        while let Some(widget) = child {
            count += 1;
            child = widget.next_sibling();
        }
        count
    }

    fn row_name(&self, index: usize) -> Option<String> {
        self.row(index).map(|row| row.widget_name().to_string())
    }

    fn select_row(&self, index: usize) -> bool {
        match self.row(index) {
            Some(row) => {
                self.list.select_row(Some(&row));
                true
            }
            None => false,
        }
    }

    fn connect_row_selected(&self, callback: Rc<dyn Fn(Option<String>)>) -> Subscription {
        let handler = self.list.connect_row_selected(move |_, row| {
            callback(row.map(|row| row.widget_name().to_string()));
        });
        signal_subscription(&self.list, handler)
    }
}

/// Shows the content pane when the split view is collapsed
pub struct SplitReveal {
    split_view: adw::NavigationSplitView,
}

impl SplitReveal {
    pub fn new(split_view: adw::NavigationSplitView) -> Self {
        Self { split_view }
    }
}

impl ContentReveal for SplitReveal {
    fn reveal_content(&self) {
        self.split_view.set_show_content(true);
    }
}

/// Forward a style mode to the process-wide style manager
pub fn apply_style_mode(mode: StyleMode) {
    let scheme = match mode {
        StyleMode::Default => adw::ColorScheme::Default,
        StyleMode::ForceLight => adw::ColorScheme::ForceLight,
        StyleMode::ForceDark => adw::ColorScheme::ForceDark,
    };
    adw::StyleManager::default().set_color_scheme(scheme);
}
