//! Page Registry
//!
//! Loads page definitions, attaches their root element to the page
//! container and runs the page's binder. A page whose resource cannot be
//! loaded is skipped; the remaining pages are unaffected.

use crate::controls::{ControlLookup, PageDefinition, ResourceLoader};
use crate::error::{ResourceLoadError, SchemaError};
use crate::subscription::Subscriptions;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Widget type produced by a loader's definitions
pub type LoaderWidget<L> = <<L as ResourceLoader>::Definition as PageDefinition>::Widget;

/// Wires a loaded page's controls; handles it creates go into the bag
pub type Binder =
    Box<dyn FnOnce(&dyn ControlLookup, &mut Subscriptions) -> Result<(), SchemaError>>;

/// Container that accepts named, titled pages
pub trait TitledPages<W> {
    fn add_titled(&self, child: &W, name: &str, title: &str);
}

/// Container that only accepts plain children
pub trait PlainChildren<W> {
    fn append(&self, child: &W);

    /// Best-effort naming of an appended child; `false` when unsupported
    fn set_child_name(&self, child: &W, name: &str) -> bool;
}

/// How pages are attached, decided once when the window is composed
pub enum Attach<W> {
    Titled(Rc<dyn TitledPages<W>>),
    /// Fallback for containers without titled pages
    Plain(Rc<dyn PlainChildren<W>>),
}

impl<W> Attach<W> {
    pub fn mode_name(&self) -> &'static str {
        match self {
            Attach::Titled(_) => "titled pages",
            Attach::Plain(_) => "plain children",
        }
    }
}

impl<W> Clone for Attach<W> {
    fn clone(&self) -> Self {
        match self {
            Attach::Titled(c) => Attach::Titled(c.clone()),
            Attach::Plain(c) => Attach::Plain(c.clone()),
        }
    }
}

impl<W> fmt::Debug for Attach<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mode_name())
    }
}

/// A registered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub name: String,
    pub title: String,
    pub resource: String,
}

/// What to register
pub struct PageSpec {
    pub resource: String,
    pub name: String,
    pub title: String,
    pub binder: Option<Binder>,
}

impl PageSpec {
    pub fn new(resource: impl Into<String>, name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            name: name.into(),
            title: title.into(),
            binder: None,
        }
    }

    pub fn with_binder(mut self, binder: Binder) -> Self {
        self.binder = Some(binder);
        self
    }
}

impl fmt::Debug for PageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageSpec")
            .field("resource", &self.resource)
            .field("name", &self.name)
            .field("title", &self.title)
            .field("binder", &self.binder.is_some())
            .finish()
    }
}

/// Ordered collection of registered pages
pub struct PageRegistry<L: ResourceLoader> {
    loader: L,
    attach: Attach<LoaderWidget<L>>,
    pages: Vec<Page>,
}

impl<L: ResourceLoader> PageRegistry<L> {
    pub fn new(loader: L, attach: Attach<LoaderWidget<L>>) -> Self {
        debug!("Page container attaches via {}", attach.mode_name());
        Self {
            loader,
            attach,
            pages: Vec::new(),
        }
    }

    /// Load, attach and bind one page.
    ///
    /// Returns `Ok(None)` when the page was skipped (resource missing or
    /// malformed, no root element, duplicate name). Only a binder touching
    /// an undeclared settings key is an error.
    pub fn register(
        &mut self,
        spec: PageSpec,
        handles: &mut Subscriptions,
    ) -> Result<Option<Page>, SchemaError> {
        if self.contains(&spec.name) {
            warn!("Skipping page '{}': name already registered", spec.name);
            return Ok(None);
        }

        let definition = match self.loader.load(&spec.resource) {
            Ok(definition) => definition,
            Err(e) => {
                warn!("Skipping page '{}': {}", spec.name, e);
                return Ok(None);
            }
        };

        let Some(root) = definition.root() else {
            warn!(
                "Skipping page '{}': {}",
                spec.name,
                ResourceLoadError::MissingRoot(spec.resource.clone())
            );
            return Ok(None);
        };

        match &self.attach {
            Attach::Titled(container) => container.add_titled(&root, &spec.name, &spec.title),
            Attach::Plain(container) => {
                container.append(&root);
                if !container.set_child_name(&root, &spec.name) {
                    debug!("Container could not name page '{}'", spec.name);
                }
            }
        }

        if let Some(binder) = spec.binder {
            binder(&definition, handles)?;
        }

        let page = Page {
            name: spec.name,
            title: spec.title,
            resource: spec.resource,
        };
        debug!("Registered page '{}' ({})", page.name, page.resource);
        self.pages.push(page.clone());

        Ok(Some(page))
    }

    /// Registered pages in registration order
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pages.iter().any(|page| page.name == name)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::ControlId;
    use crate::testing::{FakeBox, FakeLoader, FakeStack};
    use std::cell::Cell;

    fn titled_registry(loader: FakeLoader) -> (PageRegistry<FakeLoader>, Rc<FakeStack>) {
        let stack = Rc::new(FakeStack::new());
        let registry = PageRegistry::new(loader, Attach::Titled(stack.clone()));
        (registry, stack)
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let loader = FakeLoader::new()
            .with_page("/pages/a.ui", "a")
            .with_page("/pages/b.ui", "b")
            .with_page("/pages/c.ui", "c");
        let (mut registry, stack) = titled_registry(loader);
        let mut handles = Subscriptions::new();

        for name in ["c", "a", "b"] {
            let spec = PageSpec::new(format!("/pages/{}.ui", name), name, name.to_uppercase());
            assert!(registry.register(spec, &mut handles).unwrap().is_some());
        }

        let names: Vec<_> = registry.pages().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(stack.page_names(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_failed_pages_are_skipped_without_side_effects() {
        let loader = FakeLoader::new()
            .with_page("/pages/a.ui", "a")
            .with_malformed("/pages/bad.ui")
            .with_rootless("/pages/empty.ui")
            .with_page("/pages/d.ui", "d");
        let (mut registry, stack) = titled_registry(loader);
        let mut handles = Subscriptions::new();

        let results: Vec<_> = [
            PageSpec::new("/pages/a.ui", "a", "A"),
            PageSpec::new("/pages/missing.ui", "missing", "Missing"),
            PageSpec::new("/pages/bad.ui", "bad", "Bad"),
            PageSpec::new("/pages/empty.ui", "empty", "Empty"),
            PageSpec::new("/pages/d.ui", "d", "D"),
        ]
        .into_iter()
        .map(|spec| registry.register(spec, &mut handles).unwrap().is_some())
        .collect();

        assert_eq!(results, vec![true, false, false, false, true]);
        assert_eq!(stack.page_names(), vec!["a", "d"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_binder_runs_with_page_controls() {
        let loader = FakeLoader::new().with_page("/pages/general.ui", "general");
        let (mut registry, _stack) = titled_registry(loader);
        let mut handles = Subscriptions::new();
        let saw_launch_row = Rc::new(Cell::new(false));

        let spec = PageSpec::new("/pages/general.ui", "general", "General").with_binder(Box::new({
            let saw = saw_launch_row.clone();
            move |controls: &dyn ControlLookup, _: &mut Subscriptions| -> Result<(), SchemaError> {
                saw.set(controls.toggle(ControlId::LaunchRow.as_str()).is_some());
                Ok(())
            }
        }));
        registry.register(spec, &mut handles).unwrap();

        assert!(saw_launch_row.get());
    }

    #[test]
    fn test_binder_not_run_for_skipped_page() {
        let (mut registry, _stack) = titled_registry(FakeLoader::new());
        let mut handles = Subscriptions::new();
        let ran = Rc::new(Cell::new(false));

        let spec = PageSpec::new("/pages/gone.ui", "gone", "Gone").with_binder(Box::new({
            let ran = ran.clone();
            move |_: &dyn ControlLookup, _: &mut Subscriptions| -> Result<(), SchemaError> {
                ran.set(true);
                Ok(())
            }
        }));
        assert_eq!(registry.register(spec, &mut handles).unwrap(), None);
        assert!(!ran.get());
    }

    #[test]
    fn test_binder_schema_error_propagates() {
        let loader = FakeLoader::new().with_page("/pages/a.ui", "a");
        let (mut registry, _stack) = titled_registry(loader);
        let mut handles = Subscriptions::new();

        let spec = PageSpec::new("/pages/a.ui", "a", "A").with_binder(Box::new(
            |_: &dyn ControlLookup, _: &mut Subscriptions| -> Result<(), SchemaError> {
                Err(SchemaError::UnknownKey("wallpaper".into()))
            },
        ));
        assert!(registry.register(spec, &mut handles).is_err());
    }

    #[test]
    fn test_duplicate_name_is_skipped() {
        let loader = FakeLoader::new().with_page("/pages/a.ui", "a");
        let (mut registry, _stack) = titled_registry(loader);
        let mut handles = Subscriptions::new();

        assert!(registry
            .register(PageSpec::new("/pages/a.ui", "a", "A"), &mut handles)
            .unwrap()
            .is_some());
        assert!(registry
            .register(PageSpec::new("/pages/a.ui", "a", "A again"), &mut handles)
            .unwrap()
            .is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_plain_container_fallback_names_children() {
        let loader = FakeLoader::new()
            .with_page("/pages/a.ui", "a")
            .with_page("/pages/b.ui", "b");
        let container = Rc::new(FakeBox::new());
        let mut registry = PageRegistry::new(loader, Attach::Plain(container.clone()));
        let mut handles = Subscriptions::new();

        registry
            .register(PageSpec::new("/pages/a.ui", "a", "A"), &mut handles)
            .unwrap();
        registry
            .register(PageSpec::new("/pages/b.ui", "b", "B"), &mut handles)
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(container.child_names(), vec![Some("a".to_string()), Some("b".to_string())]);
    }
}
