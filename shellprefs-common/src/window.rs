//! Window Orchestrator
//!
//! Composes the settings store, page registry, sidebar and appearance
//! controller in a fixed order:
//!
//! 1. attach the settings store
//! 2. register pages (general, appearance, keyboard, network, about)
//! 3. rebuild the sidebar
//! 4. wire row selection to page visibility
//! 5. select the first row
//! 6. apply the stored color scheme
//! 7. follow `color-scheme` changes made anywhere
//!
//! All bindings and subscriptions are owned by the window and released on
//! [`PreferencesWindow::teardown`] or drop.

use crate::appearance::{AppearanceController, SharedStyle};
use crate::controls::{ControlId, ControlLookup, ResourceLoader};
use crate::error::SchemaError;
use crate::events::{Dispatcher, Event, EventKind};
use crate::paths;
use crate::registry::{Attach, Binder, LoaderWidget, Page, PageRegistry, PageSpec};
use crate::schema::{COLOR_SCHEME, ENABLE_NETWORKING, LAUNCH_AT_LOGIN, SHOW_NOTIFICATIONS};
use crate::sidebar::{ContentReveal, NavigationList, PageNavigation, SidebarRow, SidebarSynchronizer};
use crate::store::{BindFlags, Settings};
use crate::subscription::Subscriptions;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Which controls a page's binder wires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinderKind {
    /// `launch_row`, `notif_row`
    General,
    /// `color_combo`
    Appearance,
    /// `network_row`
    Network,
}

/// A page in the window's page table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    pub resource: String,
    pub name: String,
    pub title: String,
    pub binder: Option<BinderKind>,
}

impl PageDescriptor {
    pub fn new(name: &str, title: &str, binder: Option<BinderKind>) -> Self {
        Self {
            resource: paths::page_resource(name),
            name: name.to_string(),
            title: title.to_string(),
            binder,
        }
    }
}

/// The standard page table, in navigation order
pub fn standard_pages() -> Vec<PageDescriptor> {
    vec![
        PageDescriptor::new("general", "General", Some(BinderKind::General)),
        PageDescriptor::new("appearance", "Appearance", Some(BinderKind::Appearance)),
        PageDescriptor::new("keyboard", "Keyboard", None),
        PageDescriptor::new("network", "Network", Some(BinderKind::Network)),
        PageDescriptor::new("about", "About", None),
    ]
}

/// Toolkit pieces the window is composed from
pub struct WindowParts<L: ResourceLoader> {
    pub settings: Settings,
    pub loader: L,
    pub attach: Attach<LoaderWidget<L>>,
    pub navigation: Rc<dyn PageNavigation>,
    pub sidebar: Rc<dyn NavigationList>,
    pub reveal: Option<Rc<dyn ContentReveal>>,
    pub style: SharedStyle,
}

pub struct PreferencesWindow<L: ResourceLoader> {
    settings: Settings,
    registry: PageRegistry<L>,
    sidebar: Rc<SidebarSynchronizer>,
    appearance: Rc<AppearanceController>,
    dispatcher: Dispatcher,
    handles: Subscriptions,
}

impl<L: ResourceLoader> PreferencesWindow<L> {
    /// Build with the standard page table
    pub fn build(parts: WindowParts<L>) -> Result<Self, SchemaError> {
        Self::build_with_pages(parts, standard_pages())
    }

    /// Build with a custom page table.
    ///
    /// Pages that fail to load are skipped. Only a schema mismatch (a
    /// binder or subscription naming an undeclared key) fails the build.
    pub fn build_with_pages(
        parts: WindowParts<L>,
        pages: Vec<PageDescriptor>,
    ) -> Result<Self, SchemaError> {
        let WindowParts {
            settings,
            loader,
            attach,
            navigation,
            sidebar: list,
            reveal,
            style,
        } = parts;

        // 1. Settings store
        debug!("Preferences window using {} settings", settings.backend_name());
        let dispatcher = Dispatcher::new();
        let mut handles = Subscriptions::new();
        let appearance = Rc::new(AppearanceController::new(settings.clone(), style));

        // 2. Pages
        let mut registry = PageRegistry::new(loader, attach);
        for descriptor in pages {
            let mut spec = PageSpec::new(descriptor.resource, descriptor.name, descriptor.title);
            if let Some(kind) = descriptor.binder {
                spec = spec.with_binder(binder_for(kind, &settings, &appearance, &dispatcher));
            }
            registry.register(spec, &mut handles)?;
        }
        info!("Registered {} preference pages", registry.len());

        // 3. Sidebar
        let sidebar = Rc::new(SidebarSynchronizer::new(list.clone(), navigation, reveal));
        sidebar.rebuild();

        // 4. Row selection
        let weak = dispatcher.downgrade();
        handles.push(list.connect_row_selected(Rc::new(move |name| {
            weak.post(Event::RowSelected(name));
        })));
        handles.push(dispatcher.subscribe(EventKind::RowSelected, {
            let sidebar = Rc::downgrade(&sidebar);
            move |event| {
                if let (Event::RowSelected(name), Some(sidebar)) = (event, sidebar.upgrade()) {
                    sidebar.handle_selection(name.as_deref());
                }
            }
        }));

        // 5. Initial page
        match sidebar.select_index(0) {
            Some(name) => debug!("Initial page '{}'", name),
            None => warn!("No pages to show"),
        }

        // 6. Appearance
        appearance.apply_style();

        // 7. External color-scheme changes
        let weak = dispatcher.downgrade();
        handles.push(settings.on_change(COLOR_SCHEME, move |key| {
            weak.post(Event::SettingChanged(key.to_string()));
        })?);
        handles.push(dispatcher.subscribe(EventKind::SettingChanged, {
            let appearance = Rc::downgrade(&appearance);
            move |event| {
                if !is_color_scheme_change(event) {
                    return;
                }
                if let Some(appearance) = appearance.upgrade() {
                    appearance.apply_style();
                }
            }
        }));

        Ok(Self {
            settings,
            registry,
            sidebar,
            appearance,
            dispatcher,
            handles,
        })
    }

    /// Release every binding and subscription
    pub fn teardown(&mut self) {
        if !self.handles.is_empty() {
            debug!("Releasing {} window subscriptions", self.handles.len());
            self.handles.release_all();
        }
    }

    /// Registered pages in navigation order
    pub fn pages(&self) -> &[Page] {
        self.registry.pages()
    }

    pub fn sidebar_rows(&self) -> Vec<SidebarRow> {
        self.sidebar.rows()
    }

    /// Rebuild the sidebar from the container's current pages
    pub fn rebuild_sidebar(&self) -> usize {
        self.sidebar.rebuild()
    }

    pub fn visible_page(&self) -> Option<String> {
        self.sidebar.visible_page()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn appearance(&self) -> &AppearanceController {
        &self.appearance
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Live subscriptions held by the window
    pub fn subscription_count(&self) -> usize {
        self.handles.len()
    }
}

impl<L: ResourceLoader> Drop for PreferencesWindow<L> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn is_color_scheme_change(event: &Event) -> bool {
    matches!(event, Event::SettingChanged(key) if key == COLOR_SCHEME)
}

fn binder_for(
    kind: BinderKind,
    settings: &Settings,
    appearance: &Rc<AppearanceController>,
    dispatcher: &Dispatcher,
) -> Binder {
    let settings = settings.clone();
    match kind {
        BinderKind::General => Box::new(
            move |controls: &dyn ControlLookup, handles: &mut Subscriptions| -> Result<(), SchemaError> {
                bind_toggle(&settings, controls, ControlId::LaunchRow, LAUNCH_AT_LOGIN, handles)?;
                bind_toggle(&settings, controls, ControlId::NotifRow, SHOW_NOTIFICATIONS, handles)
            },
        ),
        BinderKind::Network => Box::new(
            move |controls: &dyn ControlLookup, handles: &mut Subscriptions| -> Result<(), SchemaError> {
                bind_toggle(&settings, controls, ControlId::NetworkRow, ENABLE_NETWORKING, handles)
            },
        ),
        BinderKind::Appearance => {
            let appearance = appearance.clone();
            let dispatcher = dispatcher.clone();
            Box::new(
                move |controls: &dyn ControlLookup, handles: &mut Subscriptions| -> Result<(), SchemaError> {
                    // Undeclared key is fatal even when the page lacks the combo
                    settings.schema().lookup(COLOR_SCHEME)?;
                    bind_appearance(&appearance, &dispatcher, controls, handles);
                    Ok(())
                },
            )
        }
    }
}

fn bind_toggle(
    settings: &Settings,
    controls: &dyn ControlLookup,
    id: ControlId,
    key: &str,
    handles: &mut Subscriptions,
) -> Result<(), SchemaError> {
    match controls.toggle(id.as_str()) {
        Some(toggle) => handles.push(settings.bind(key, toggle, BindFlags::DEFAULT)?),
        None => debug!("Page has no '{}' control", id),
    }
    Ok(())
}

fn bind_appearance(
    appearance: &Rc<AppearanceController>,
    dispatcher: &Dispatcher,
    controls: &dyn ControlLookup,
    handles: &mut Subscriptions,
) {
    let Some(selector) = controls.selector(ControlId::ColorCombo.as_str()) else {
        debug!("Page has no '{}' control", ControlId::ColorCombo);
        return;
    };

    appearance.load_selector(selector.as_ref());

    // UI -> settings
    let weak = dispatcher.downgrade();
    handles.push(selector.connect_selected(Rc::new(move |_| {
        weak.post(Event::ControlChanged(ControlId::ColorCombo));
    })));
    handles.push(dispatcher.subscribe(EventKind::ControlChanged, {
        let appearance = appearance.clone();
        let selector = selector.clone();
        move |event| {
            if *event != Event::ControlChanged(ControlId::ColorCombo) {
                return;
            }
            if let Err(e) = appearance.store_from_selector(selector.selected()) {
                warn!("Failed to store color scheme: {}", e);
            }
        }
    }));

    // settings -> UI
    handles.push(dispatcher.subscribe(EventKind::SettingChanged, {
        let appearance = appearance.clone();
        move |event| {
            if is_color_scheme_change(event) {
                appearance.sync_selector(selector.as_ref());
            }
        }
    }));
}
