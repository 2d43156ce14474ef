//! Preferences Application - GTK4 Application Setup
//!
//! Single-instance `AdwApplication`: activating a running instance presents
//! its existing window instead of opening another.

use crate::backend;
use crate::resources::PageResources;
use crate::ui::bridge::BuilderLoader;
use crate::ui::window::PrefsWindow;
use adw::prelude::*;
use adw::subclass::prelude::*;
use anyhow::Result;
use gtk::{gio, glib};
use shellprefs_common::config::{BackendKind, PrefsConfig};
use shellprefs_common::paths::APP_ID;
use std::cell::{Cell, RefCell};
use tracing::error;

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct PrefsApplication {
        pub config: RefCell<PrefsConfig>,
        pub backend: Cell<Option<BackendKind>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for PrefsApplication {
        const NAME: &'static str = "PrefsApplication";
        type Type = super::PrefsApplication;
        type ParentType = adw::Application;
    }

    impl ObjectImpl for PrefsApplication {}

    impl ApplicationImpl for PrefsApplication {
        fn activate(&self) {
            let app = self.obj();

            if let Some(window) = app.active_window() {
                window.present();
                return;
            }

            match app.create_window() {
                Ok(window) => window.present(),
                Err(e) => {
                    error!("Cannot open the preferences window: {:#}", e);
                    app.quit();
                }
            }
        }

        fn startup(&self) {
            self.parent_startup();

            let css_provider = gtk::CssProvider::new();
            css_provider.load_from_data(include_str!("styles.css"));

            match gtk::gdk::Display::default() {
                Some(display) => {
                    gtk::style_context_add_provider_for_display(
                        &display,
                        &css_provider,
                        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
                    );
                }
                None => {
                    tracing::warn!("No display available. CSS styling will not be applied.");
                }
            }

            let app = self.obj();
            app.setup_actions();
        }
    }

    impl GtkApplicationImpl for PrefsApplication {}
    impl AdwApplicationImpl for PrefsApplication {}
}

glib::wrapper! {
    pub struct PrefsApplication(ObjectSubclass<imp::PrefsApplication>)
        @extends adw::Application, gtk::Application, gio::Application,
        @implements gio::ActionGroup, gio::ActionMap;
}

impl PrefsApplication {
    pub fn new(config: PrefsConfig, backend: Option<BackendKind>) -> Self {
        let app: Self = glib::Object::builder()
            .property("application-id", APP_ID)
            .property("flags", gio::ApplicationFlags::FLAGS_NONE)
            .build();

        let imp = app.imp();
        *imp.config.borrow_mut() = config;
        imp.backend.set(backend);

        app
    }

    fn create_window(&self) -> Result<PrefsWindow> {
        let imp = self.imp();
        let config = imp.config.borrow();

        let store = backend::open_settings(&config, imp.backend.get())?;
        let loader = BuilderLoader::new(PageResources::new(config.pages_dir()));
        PrefsWindow::new(self, store, loader, &config.window)
    }

    fn setup_actions(&self) {
        let quit_action = gio::SimpleAction::new("quit", None);
        quit_action.connect_activate(glib::clone!(
            @weak self as app =>
            move |_, _| {
                app.quit();
            }
        ));
        self.add_action(&quit_action);

        self.set_accels_for_action("app.quit", &["<Ctrl>q"]);
        self.set_accels_for_action("window.close", &["<Ctrl>w"]);
    }

    pub fn run(&self) -> glib::ExitCode {
        ApplicationExtManual::run_with_args(self, &[] as &[&str])
    }
}
