//! Sidebar Synchronizer
//!
//! Derives the navigation list from the page container. Rows are never
//! patched: every rebuild discards them and recreates one row per page, in
//! container order.

use crate::subscription::Subscription;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Name and title of a page as the container reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub name: String,
    pub title: String,
}

/// A navigation row, identified by its page's name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarRow {
    pub name: String,
    pub title: String,
}

/// Page visibility and enumeration side of the page container
pub trait PageNavigation {
    /// Pages in container order; `None` if the container cannot enumerate
    fn pages(&self) -> Option<Vec<PageEntry>>;

    /// Make the named page the visible one; `false` if no such page
    fn show_page(&self, name: &str) -> bool;

    fn visible_page(&self) -> Option<String>;
}

/// The sidebar list widget
pub trait NavigationList {
    /// Remove every row
    fn clear(&self);
    fn append_row(&self, name: &str, title: &str);
    fn row_count(&self) -> usize;
    fn row_name(&self, index: usize) -> Option<String>;

    /// Select the row at `index`; `false` if out of range
    fn select_row(&self, index: usize) -> bool;

    /// Called with the selected row's name, or `None` when cleared
    fn connect_row_selected(&self, callback: Rc<dyn Fn(Option<String>)>) -> Subscription;
}

/// Adaptive layouts that can hide the content pane
pub trait ContentReveal {
    fn reveal_content(&self);
}

pub struct SidebarSynchronizer {
    list: Rc<dyn NavigationList>,
    navigation: Rc<dyn PageNavigation>,
    reveal: Option<Rc<dyn ContentReveal>>,
    rows: RefCell<Vec<SidebarRow>>,
}

impl SidebarSynchronizer {
    pub fn new(
        list: Rc<dyn NavigationList>,
        navigation: Rc<dyn PageNavigation>,
        reveal: Option<Rc<dyn ContentReveal>>,
    ) -> Self {
        Self {
            list,
            navigation,
            reveal,
            rows: RefCell::new(Vec::new()),
        }
    }

    /// Tear down all rows and recreate them from the container's pages.
    ///
    /// Returns the number of rows.
    pub fn rebuild(&self) -> usize {
        self.list.clear();
        self.rows.borrow_mut().clear();

        let Some(pages) = self.navigation.pages() else {
            debug!("Page container cannot enumerate pages, sidebar left empty");
            return 0;
        };

        let rows: Vec<SidebarRow> = pages
            .into_iter()
            .map(|page| {
                self.list.append_row(&page.name, &page.title);
                SidebarRow {
                    name: page.name,
                    title: page.title,
                }
            })
            .collect();

        let count = rows.len();
        *self.rows.borrow_mut() = rows;
        debug!("Sidebar rebuilt with {} rows", count);
        count
    }

    /// Current rows in display order
    pub fn rows(&self) -> Vec<SidebarRow> {
        self.rows.borrow().clone()
    }

    /// Programmatically select a row and show its page.
    ///
    /// Returns the page name, or `None` if there is no such row.
    pub fn select_index(&self, index: usize) -> Option<String> {
        let name = self.list.row_name(index)?;
        self.list.select_row(index);
        self.handle_selection(Some(&name));
        Some(name)
    }

    /// React to a row selection; a cleared selection changes nothing
    pub fn handle_selection(&self, name: Option<&str>) {
        let Some(name) = name else {
            return;
        };

        if !self.navigation.show_page(name) {
            warn!("Sidebar row '{}' has no matching page", name);
            return;
        }

        if let Some(reveal) = &self.reveal {
            reveal.reveal_content();
        }
    }

    pub fn visible_page(&self) -> Option<String> {
        self.navigation.visible_page()
    }
}
