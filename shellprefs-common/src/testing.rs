//! In-memory controls and containers for unit tests.

use crate::controls::{ControlLookup, PageDefinition, ResourceLoader, Selector, Toggle};
use crate::error::ResourceLoadError;
use crate::registry::{PlainChildren, TitledPages};
use crate::sidebar::{ContentReveal, NavigationList, PageEntry, PageNavigation};
use crate::subscription::{Listeners, Subscription};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Switch row: notifies only when the state actually changes
pub struct FakeToggle {
    active: Cell<bool>,
    listeners: Listeners<dyn Fn(bool)>,
}

impl FakeToggle {
    pub fn new(active: bool) -> Self {
        Self {
            active: Cell::new(active),
            listeners: Listeners::new(),
        }
    }

    /// Simulate the user flipping the switch
    pub fn user_toggle(&self, active: bool) {
        self.set_active(active);
    }
}

impl Toggle for FakeToggle {
    fn is_active(&self) -> bool {
        self.active.get()
    }

    fn set_active(&self, active: bool) {
        if self.active.replace(active) != active {
            for listener in self.listeners.snapshot() {
                listener(active);
            }
        }
    }

    fn connect_toggled(&self, callback: Rc<dyn Fn(bool)>) -> Subscription {
        self.listeners.add(callback)
    }
}

/// Combo row
pub struct FakeSelector {
    selected: Cell<u32>,
    listeners: Listeners<dyn Fn(u32)>,
}

impl FakeSelector {
    pub fn new(selected: u32) -> Self {
        Self {
            selected: Cell::new(selected),
            listeners: Listeners::new(),
        }
    }

    /// Simulate the user picking an entry
    pub fn user_select(&self, index: u32) {
        self.set_selected(index);
    }
}

impl Selector for FakeSelector {
    fn selected(&self) -> u32 {
        self.selected.get()
    }

    fn set_selected(&self, index: u32) {
        if self.selected.replace(index) != index {
            for listener in self.listeners.snapshot() {
                listener(index);
            }
        }
    }

    fn connect_selected(&self, callback: Rc<dyn Fn(u32)>) -> Subscription {
        self.listeners.add(callback)
    }
}

/// Loaded page: widgets are plain strings
#[derive(Clone, Default)]
pub struct FakeDefinition {
    pub root: Option<String>,
    pub toggles: HashMap<String, Rc<FakeToggle>>,
    pub selectors: HashMap<String, Rc<FakeSelector>>,
}

impl FakeDefinition {
    /// Page with the controls the real resource of that name exposes
    pub fn standard(name: &str) -> Self {
        let mut definition = Self {
            root: Some(name.to_string()),
            ..Self::default()
        };
        match name {
            "general" => {
                definition.add_toggle("launch_row");
                definition.add_toggle("notif_row");
            }
            "network" => {
                definition.add_toggle("network_row");
            }
            "appearance" => {
                definition
                    .selectors
                    .insert("color_combo".to_string(), Rc::new(FakeSelector::new(0)));
            }
            _ => {}
        }
        definition
    }

    fn add_toggle(&mut self, id: &str) {
        self.toggles
            .insert(id.to_string(), Rc::new(FakeToggle::new(false)));
    }

    pub fn toggle_control(&self, id: &str) -> Rc<FakeToggle> {
        self.toggles[id].clone()
    }

    pub fn selector_control(&self, id: &str) -> Rc<FakeSelector> {
        self.selectors[id].clone()
    }
}

impl ControlLookup for FakeDefinition {
    fn toggle(&self, id: &str) -> Option<Rc<dyn Toggle>> {
        self.toggles
            .get(id)
            .map(|toggle| toggle.clone() as Rc<dyn Toggle>)
    }

    fn selector(&self, id: &str) -> Option<Rc<dyn Selector>> {
        self.selectors
            .get(id)
            .map(|selector| selector.clone() as Rc<dyn Selector>)
    }
}

impl PageDefinition for FakeDefinition {
    type Widget = String;

    fn root(&self) -> Option<String> {
        self.root.clone()
    }
}

enum FakeResource {
    Page(FakeDefinition),
    Malformed,
}

/// Resource table keyed by path; unknown paths are "not found"
#[derive(Default)]
pub struct FakeLoader {
    resources: HashMap<String, FakeResource>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, path: &str, name: &str) -> Self {
        self.with_definition(path, FakeDefinition::standard(name))
    }

    pub fn with_definition(mut self, path: &str, definition: FakeDefinition) -> Self {
        self.resources
            .insert(path.to_string(), FakeResource::Page(definition));
        self
    }

    pub fn with_malformed(mut self, path: &str) -> Self {
        self.resources
            .insert(path.to_string(), FakeResource::Malformed);
        self
    }

    pub fn with_rootless(self, path: &str) -> Self {
        self.with_definition(path, FakeDefinition::default())
    }
}

impl ResourceLoader for FakeLoader {
    type Definition = FakeDefinition;

    fn load(&self, path: &str) -> Result<FakeDefinition, ResourceLoadError> {
        match self.resources.get(path) {
            Some(FakeResource::Page(definition)) => Ok(definition.clone()),
            Some(FakeResource::Malformed) => Err(ResourceLoadError::Malformed {
                path: path.to_string(),
                reason: "unexpected end of document".to_string(),
            }),
            None => Err(ResourceLoadError::NotFound(path.to_string())),
        }
    }
}

/// View stack: titled, enumerable pages
#[derive(Default)]
pub struct FakeStack {
    pages: RefCell<Vec<PageEntry>>,
    visible: RefCell<Option<String>>,
    pub enumerable: Cell<bool>,
}

impl FakeStack {
    pub fn new() -> Self {
        let stack = Self::default();
        stack.enumerable.set(true);
        stack
    }

    /// A container without page enumeration
    pub fn opaque() -> Self {
        Self::default()
    }

    pub fn page_names(&self) -> Vec<String> {
        self.pages.borrow().iter().map(|p| p.name.clone()).collect()
    }
}

impl TitledPages<String> for FakeStack {
    fn add_titled(&self, _child: &String, name: &str, title: &str) {
        let mut pages = self.pages.borrow_mut();
        pages.push(PageEntry {
            name: name.to_string(),
            title: title.to_string(),
        });
        let mut visible = self.visible.borrow_mut();
        if visible.is_none() {
            *visible = Some(name.to_string());
        }
    }
}

impl PageNavigation for FakeStack {
    fn pages(&self) -> Option<Vec<PageEntry>> {
        self.enumerable
            .get()
            .then(|| self.pages.borrow().clone())
    }

    fn show_page(&self, name: &str) -> bool {
        if self.pages.borrow().iter().any(|p| p.name == name) {
            *self.visible.borrow_mut() = Some(name.to_string());
            true
        } else {
            false
        }
    }

    fn visible_page(&self) -> Option<String> {
        self.visible.borrow().clone()
    }
}

/// Plain box: children named after the fact
#[derive(Default)]
pub struct FakeBox {
    children: RefCell<Vec<(String, Option<String>)>>,
}

impl FakeBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child_names(&self) -> Vec<Option<String>> {
        self.children
            .borrow()
            .iter()
            .map(|(_, name)| name.clone())
            .collect()
    }
}

impl PlainChildren<String> for FakeBox {
    fn append(&self, child: &String) {
        self.children.borrow_mut().push((child.clone(), None));
    }

    fn set_child_name(&self, child: &String, name: &str) -> bool {
        let mut children = self.children.borrow_mut();
        match children.iter_mut().find(|(widget, _)| widget == child) {
            Some(entry) => {
                entry.1 = Some(name.to_string());
                true
            }
            None => false,
        }
    }
}

/// List box with single selection
#[derive(Default)]
pub struct FakeList {
    rows: RefCell<Vec<PageEntry>>,
    selected: Cell<Option<usize>>,
    listeners: Listeners<dyn Fn(Option<String>)>,
    pub clears: Cell<usize>,
}

impl FakeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_names(&self) -> Vec<String> {
        self.rows.borrow().iter().map(|r| r.name.clone()).collect()
    }

    pub fn row_titles(&self) -> Vec<String> {
        self.rows.borrow().iter().map(|r| r.title.clone()).collect()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected.get()
    }

    fn emit(&self, name: Option<String>) {
        for listener in self.listeners.snapshot() {
            listener(name.clone());
        }
    }
}

impl NavigationList for FakeList {
    fn clear(&self) {
        self.rows.borrow_mut().clear();
        self.clears.set(self.clears.get() + 1);
        if self.selected.take().is_some() {
            self.emit(None);
        }
    }

    fn append_row(&self, name: &str, title: &str) {
        self.rows.borrow_mut().push(PageEntry {
            name: name.to_string(),
            title: title.to_string(),
        });
    }

    fn row_count(&self) -> usize {
        self.rows.borrow().len()
    }

    fn row_name(&self, index: usize) -> Option<String> {
        self.rows.borrow().get(index).map(|r| r.name.clone())
    }

    fn select_row(&self, index: usize) -> bool {
        let Some(name) = self.row_name(index) else {
            return false;
        };
        if self.selected.replace(Some(index)) != Some(index) {
            self.emit(Some(name));
        }
        true
    }

    fn connect_row_selected(&self, callback: Rc<dyn Fn(Option<String>)>) -> Subscription {
        self.listeners.add(callback)
    }
}

/// Split view that counts content reveals
#[derive(Default)]
pub struct FakeSplitView {
    pub reveals: Cell<usize>,
}

impl ContentReveal for FakeSplitView {
    fn reveal_content(&self) {
        self.reveals.set(self.reveals.get() + 1);
    }
}
