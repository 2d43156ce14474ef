//! Preferences Window
//!
//! Sidebar + content split view. The toolkit-free
//! [`PreferencesWindow`](shellprefs_common::window::PreferencesWindow) core
//! owns every binding; this widget owns the core and drops it on close.

use crate::backend::OpenedStore;
use crate::ui::app::PrefsApplication;
use crate::ui::bridge::{self, BuilderLoader, SidebarList, SplitReveal, StackPages};
use adw::prelude::*;
use adw::subclass::prelude::*;
use anyhow::{Context, Result};
use gtk::{gio, glib};
use shellprefs_common::appearance::SharedStyle;
use shellprefs_common::config::WindowConfig;
use shellprefs_common::registry::Attach;
use shellprefs_common::store::KeyfileBackend;
use shellprefs_common::window::{PreferencesWindow, WindowParts};
use shellprefs_common::Subscription;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

mod imp {
    use super::*;

    #[derive(gtk::CompositeTemplate, Default)]
    #[template(string = r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <interface>
            <template class="PrefsWindow" parent="AdwApplicationWindow">
                <property name="title">Settings</property>
                <property name="width-request">360</property>
                <property name="height-request">294</property>
                <child>
                    <object class="AdwBreakpoint">
                        <condition>max-width: 600sp</condition>
                        <setter object="split_view" property="collapsed">True</setter>
                    </object>
                </child>
                <property name="content">
                    <object class="AdwNavigationSplitView" id="split_view">
                        <property name="sidebar">
                            <object class="AdwNavigationPage">
                                <property name="title">Settings</property>
                                <property name="child">
                                    <object class="AdwToolbarView">
                                        <child type="top">
                                            <object class="AdwHeaderBar"/>
                                        </child>
                                        <property name="content">
                                            <object class="GtkScrolledWindow">
                                                <property name="hscrollbar-policy">never</property>
                                                <property name="child">
                                                    <object class="GtkListBox" id="sidebar_list">
                                                        <style>
                                                            <class name="navigation-sidebar"/>
                                                        </style>
                                                    </object>
                                                </property>
                                            </object>
                                        </property>
                                    </object>
                                </property>
                            </object>
                        </property>
                        <property name="content">
                            <object class="AdwNavigationPage">
                                <property name="title">Preferences</property>
                                <property name="child">
                                    <object class="AdwToolbarView">
                                        <child type="top">
                                            <object class="AdwHeaderBar"/>
                                        </child>
                                        <property name="content">
                                            <object class="AdwViewStack" id="stack"/>
                                        </property>
                                    </object>
                                </property>
                            </object>
                        </property>
                    </object>
                </property>
            </template>
        </interface>
    "#)]
    pub struct PrefsWindow {
        #[template_child]
        pub split_view: TemplateChild<adw::NavigationSplitView>,

        #[template_child]
        pub sidebar_list: TemplateChild<gtk::ListBox>,

        #[template_child]
        pub stack: TemplateChild<adw::ViewStack>,

        pub core: RefCell<Option<PreferencesWindow<BuilderLoader>>>,
        pub style_link: RefCell<Option<Subscription>>,
        pub monitor: RefCell<Option<gio::FileMonitor>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for PrefsWindow {
        const NAME: &'static str = "PrefsWindow";
        type Type = super::PrefsWindow;
        type ParentType = adw::ApplicationWindow;

        fn class_init(klass: &mut Self::Class) {
            klass.bind_template();
        }

        fn instance_init(obj: &glib::subclass::InitializingObject<Self>) {
            obj.init_template();
        }
    }

    impl ObjectImpl for PrefsWindow {}
    impl WidgetImpl for PrefsWindow {}

    impl WindowImpl for PrefsWindow {
        fn close_request(&self) -> glib::Propagation {
            self.obj().teardown();
            self.parent_close_request()
        }
    }

    impl ApplicationWindowImpl for PrefsWindow {}
    impl AdwApplicationWindowImpl for PrefsWindow {}
}

glib::wrapper! {
    pub struct PrefsWindow(ObjectSubclass<imp::PrefsWindow>)
        @extends adw::ApplicationWindow, gtk::ApplicationWindow, gtk::Window, gtk::Widget,
        @implements gio::ActionGroup, gio::ActionMap, gtk::Accessible, gtk::Buildable,
                    gtk::ConstraintTarget, gtk::Native, gtk::Root, gtk::ShortcutManager;
}

impl PrefsWindow {
    /// Create the window and compose pages, sidebar and bindings.
    ///
    /// Fails only when the page bindings do not match the settings schema.
    pub fn new(
        app: &PrefsApplication,
        store: OpenedStore,
        loader: BuilderLoader,
        geometry: &WindowConfig,
    ) -> Result<Self> {
        let window: Self = glib::Object::builder()
            .property("application", app)
            .property("default-width", geometry.width)
            .property("default-height", geometry.height)
            .build();

        let imp = window.imp();

        let style = SharedStyle::new();
        *imp.style_link.borrow_mut() = Some(style.subscribe(bridge::apply_style_mode));

        let stack = Rc::new(StackPages::new(imp.stack.get()));
        let core = PreferencesWindow::build(WindowParts {
            settings: store.settings,
            loader,
            attach: Attach::Titled(stack.clone()),
            navigation: stack,
            sidebar: Rc::new(SidebarList::new(imp.sidebar_list.get())),
            reveal: Some(Rc::new(SplitReveal::new(imp.split_view.get()))),
            style: style.clone(),
        })
        .context("Preference pages do not match the settings schema")?;

        bridge::apply_style_mode(style.mode());
        *imp.core.borrow_mut() = Some(core);

        if let Some(keyfile) = store.keyfile {
            window.watch_keyfile(keyfile);
        }

        Ok(window)
    }

    /// Reload the keyfile when another process rewrites it
    fn watch_keyfile(&self, keyfile: Rc<KeyfileBackend>) {
        let file = gio::File::for_path(keyfile.path());
        let monitor = match file.monitor_file(gio::FileMonitorFlags::NONE, gio::Cancellable::NONE) {
            Ok(monitor) => monitor,
            Err(e) => {
                warn!("Cannot watch {:?}: {}", keyfile.path(), e);
                return;
            }
        };

        monitor.connect_changed(move |_, _, _, event| {
            if !matches!(
                event,
                gio::FileMonitorEvent::ChangesDoneHint
                    | gio::FileMonitorEvent::Created
                    | gio::FileMonitorEvent::Deleted
            ) {
                return;
            }
            match keyfile.reload() {
                Ok(changed) if !changed.is_empty() => debug!("Keyfile changed: {:?}", changed),
                Ok(_) => {}
                Err(e) => warn!("Failed to reload settings keyfile: {}", e),
            }
        });

        *self.imp().monitor.borrow_mut() = Some(monitor);
    }

    /// Release bindings, subscriptions and the keyfile monitor
    pub fn teardown(&self) {
        let imp = self.imp();

        if let Some(monitor) = imp.monitor.take() {
            monitor.cancel();
        }
        // Dropped outside the borrow: releasing handles may emit signals
        let core = imp.core.take();
        drop(core);
        imp.style_link.take();
    }
}
