use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use adw::prelude::*;
use engine::WebKitEngine;
use gtk::glib;
use storage::{Favorites, FileFavoritesStore};
use tabs::{CloseOutcome, CloseRequest, TabId};
use tracing::{debug, warn};
use ui::{Browser, Command, CommandEffect, ShellConfig, ShellEvents};

use crate::dialogs;

type WindowBrowser = Browser<WebKitEngine, FileFavoritesStore>;

/// Widgets that belong to one tab.
struct TabPage {
    view: webkit6::WebView,
    label: gtk::Label,
}

/// The browser window: header menu, tab notebook and the browser model.
///
/// Model borrows are always released before widgets are touched, since
/// notebook signals call straight back into the model.
pub struct Shell {
    browser: RefCell<WindowBrowser>,
    window: adw::ApplicationWindow,
    notebook: gtk::Notebook,
    pages: RefCell<HashMap<TabId, TabPage>>,
}

/// Delivers model notifications on a fresh main-loop iteration.
struct ShellHandle(Weak<Shell>);

impl ShellEvents for ShellHandle {
    fn title_available(&self, tab: TabId, title: &str) {
        let Some(current) = self.0.upgrade() else {
            return;
        };
        // A busy model is mid-update; the idle pass re-checks it.
        let accepted = current
            .browser
            .try_borrow()
            .map_or(true, |browser| browser.accepts_title(tab));
        if !accepted {
            debug!(tab = %tab, "title for unselected tab dropped");
            return;
        }

        let shell = self.0.clone();
        let title = title.to_string();
        glib::idle_add_local_once(move || {
            if let Some(shell) = shell.upgrade() {
                shell.apply_title(tab, &title);
            }
        });
    }

    fn add_to_favorites_requested(&self, url: &str) {
        let shell = self.0.clone();
        let url = url.to_string();
        glib::idle_add_local_once(move || {
            if let Some(shell) = shell.upgrade() {
                shell.prompt_add_favorite(&url);
            }
        });
    }
}

impl Shell {
    pub fn new(
        app: &adw::Application,
        config: ShellConfig,
        favorites: Favorites<FileFavoritesStore>,
    ) -> Rc<Self> {
        let notebook = gtk::Notebook::new();
        notebook.set_scrollable(true);
        notebook.set_hexpand(true);
        notebook.set_vexpand(true);

        let header = adw::HeaderBar::new();
        header.set_show_start_title_buttons(true);
        header.set_show_end_title_buttons(true);
        header.pack_start(&build_menu());

        let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
        root.append(&header);
        root.append(&notebook);

        let window = adw::ApplicationWindow::builder()
            .application(app)
            .title(config.window_title.as_str())
            .default_width(config.window_width)
            .default_height(config.window_height)
            .content(&root)
            .build();

        let engine = Rc::new(WebKitEngine::new());
        let shell = Rc::new_cyclic(|weak: &Weak<Shell>| {
            let events = Rc::new(ShellHandle(weak.clone()));
            Shell {
                browser: RefCell::new(Browser::new(engine, favorites, config, events)),
                window,
                notebook,
                pages: RefCell::new(HashMap::new()),
            }
        });

        install_actions(&shell);

        let shell_for_switch = Rc::clone(&shell);
        shell.notebook.connect_switch_page(move |_, page, _| {
            if let Some(id) = shell_for_switch.tab_for_widget(page) {
                shell_for_switch.browser.borrow_mut().select_tab(id);
            }
        });

        let shell_for_close = Rc::clone(&shell);
        shell.window.connect_close_request(move |_| {
            match shell_for_close.browser.borrow_mut().request_window_close() {
                CloseRequest::Allow => glib::Propagation::Proceed,
                CloseRequest::Veto => glib::Propagation::Stop,
            }
        });

        shell
    }

    pub fn present(&self) {
        self.window.present();
    }

    pub fn open_tab(self: &Rc<Self>, title_or_url: &str) {
        let opened = self.browser.borrow_mut().open_tab(title_or_url);
        match opened {
            Ok(id) => self.attach_tab(id),
            Err(err) => warn!(%err, requested = title_or_url, "cannot open tab"),
        }
    }

    fn run_command(self: &Rc<Self>, command: Command) {
        let effect = self.browser.borrow_mut().dispatch(command);
        match effect {
            Ok(CommandEffect::TabOpened(id)) => self.attach_tab(id),
            Ok(CommandEffect::ShowFavorites(favorites)) => {
                let shell = Rc::downgrade(self);
                dialogs::show_favorites(&self.window, &favorites, move |url| {
                    if let Some(shell) = shell.upgrade() {
                        shell.open_tab(&url);
                    }
                });
            }
            Ok(CommandEffect::PromptAddFavorite { default_url }) => {
                self.prompt_add_favorite(&default_url);
            }
            Err(err) => warn!(%err, ?command, "command failed"),
        }
    }

    fn prompt_add_favorite(self: &Rc<Self>, default_url: &str) {
        let shell = Rc::downgrade(self);
        dialogs::prompt_add_favorite(&self.window, default_url, move |url| {
            if let Some(shell) = shell.upgrade() {
                shell.browser.borrow_mut().add_favorite(&url);
            }
        });
    }

    /// Puts the model's tab `id` into the notebook and shows it.
    fn attach_tab(self: &Rc<Self>, id: TabId) {
        let attached = {
            let browser = self.browser.borrow();
            browser
                .tab(id)
                .map(|tab| (tab.session().view().clone(), tab.title().to_string()))
        };
        let Some((view, title)) = attached else {
            return;
        };

        let label = gtk::Label::new(Some(&title));
        let close = gtk::Button::from_icon_name("window-close-symbolic");
        close.set_has_frame(false);
        let tab_header = gtk::Box::new(gtk::Orientation::Horizontal, 4);
        tab_header.append(&label);
        tab_header.append(&close);

        let shell_for_close = Rc::clone(self);
        close.connect_clicked(move |_| shell_for_close.close_tab(id));

        self.pages.borrow_mut().insert(
            id,
            TabPage {
                view: view.clone(),
                label,
            },
        );

        let page = self.notebook.append_page(&view, Some(&tab_header));
        self.notebook.set_current_page(Some(page));
    }

    fn close_tab(&self, id: TabId) {
        let outcome = self.browser.borrow_mut().close_tab(id);

        let page = self.pages.borrow_mut().remove(&id);
        if let Some(page) = page {
            if let Some(num) = self.notebook.page_num(&page.view) {
                self.notebook.remove_page(Some(num));
            }
        }

        match outcome {
            Ok(CloseOutcome::WindowClosed) => self.window.close(),
            Ok(CloseOutcome::TabClosed { .. }) => {}
            Err(err) => warn!(%err, tab = %id, "cannot close tab"),
        }
    }

    fn apply_title(&self, id: TabId, title: &str) {
        let label = self.browser.borrow_mut().apply_title(id, title);
        if let Some(label) = label {
            if let Some(page) = self.pages.borrow().get(&id) {
                page.label.set_text(&label);
            }
        }
    }

    fn tab_for_widget(&self, widget: &gtk::Widget) -> Option<TabId> {
        self.pages
            .borrow()
            .iter()
            .find(|(_, page)| page.view.upcast_ref::<gtk::Widget>() == widget)
            .map(|(id, _)| *id)
    }
}

fn build_menu() -> gtk::MenuButton {
    let menu = gtk::gio::Menu::new();
    menu.append(Some("New Tab"), Some("win.new-tab"));
    menu.append(Some("Favorites"), Some("win.show-favorites"));
    menu.append(Some("Add to Favorites"), Some("win.add-favorite"));

    gtk::MenuButton::builder()
        .label("File")
        .menu_model(&menu)
        .build()
}

fn install_actions(shell: &Rc<Shell>) {
    let actions = [
        ("new-tab", Command::NewTab),
        ("show-favorites", Command::ShowFavorites),
        ("add-favorite", Command::AddToFavorites),
    ];

    for (name, command) in actions {
        let action = gtk::gio::SimpleAction::new(name, None);
        let shell_for_action = Rc::clone(shell);
        action.connect_activate(move |_, _| shell_for_action.run_command(command));
        shell.window.add_action(&action);
    }
}
