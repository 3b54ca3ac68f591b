use std::rc::Rc;

use engine::{EngineController, Navigation, PageSession};
use storage::{Favorites, FavoritesStore};
use tabs::{
    derive_tab_title, BasicTabManager, CloseOutcome, CloseRequest, TabEntry, TabError, TabId,
    TabManager, WindowState,
};
use tracing::debug;

use crate::bridge::TabBridge;
use crate::config::ShellConfig;
use crate::{Result, ShellEvents};

/// Menu actions.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Command {
    NewTab,
    ShowFavorites,
    AddToFavorites,
}

/// What the window layer must do after a command ran.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CommandEffect {
    /// A tab was opened and selected.
    TabOpened(TabId),
    /// Show this favorites snapshot in a modal list.
    ShowFavorites(Vec<String>),
    /// Prompt for a URL, pre-filled with `default_url`, then call
    /// [`Browser::add_favorite`] on confirmation.
    PromptAddFavorite { default_url: String },
}

/// Tabs, favorites and the glue between them.
pub struct Browser<E: EngineController, S: FavoritesStore> {
    engine: Rc<E>,
    tabs: BasicTabManager<PageSession<E>>,
    favorites: Favorites<S>,
    config: ShellConfig,
    events: Rc<dyn ShellEvents>,
}

impl<E: EngineController + 'static, S: FavoritesStore> Browser<E, S> {
    pub fn new(
        engine: Rc<E>,
        favorites: Favorites<S>,
        config: ShellConfig,
        events: Rc<dyn ShellEvents>,
    ) -> Self {
        Self {
            engine,
            tabs: BasicTabManager::new(),
            favorites,
            config,
            events,
        }
    }

    /// Opens and selects a tab for `title_or_url`.
    ///
    /// URLs are loaded and used as the initial label. Anything else loads the
    /// start page and becomes the (shortened) label.
    pub fn open_tab(&mut self, title_or_url: &str) -> Result<TabId> {
        if self.tabs.window_state() == WindowState::Closed {
            return Err(TabError::WindowClosed.into());
        }

        let session = PageSession::new(Rc::clone(&self.engine), self.config.start_page.clone());
        let label = match session.navigate(title_or_url) {
            Navigation::Url => title_or_url.to_string(),
            Navigation::StartPage => derive_tab_title(title_or_url),
        };

        let id = self.tabs.create_tab(label, session)?;
        if let Some(entry) = self.tabs.get(id) {
            let session = entry.session();

            let events = Rc::clone(&self.events);
            session.on_load_succeeded(move |title| events.title_available(id, title));

            let bridge = TabBridge::new(session.loader(), Rc::clone(&self.events));
            session.inject_bridge(Rc::new(bridge));
        }

        Ok(id)
    }

    pub fn select_tab(&mut self, id: TabId) -> bool {
        self.tabs.set_active(id)
    }

    /// Closes `id`. [`CloseOutcome::WindowClosed`] means the window must go too.
    pub fn close_tab(&mut self, id: TabId) -> Result<CloseOutcome> {
        Ok(self.tabs.close_tab(id)?)
    }

    /// Decides a user request to close the window.
    pub fn request_window_close(&mut self) -> CloseRequest {
        self.tabs.request_window_close()
    }

    /// Whether a title reported for `id` right now would be applied.
    ///
    /// The window layer checks this when the load event arrives, so a tab
    /// selected after its page loaded in the background keeps its label.
    pub fn accepts_title(&self, id: TabId) -> bool {
        self.tabs.active_tab() == Some(id)
            && self
                .tabs
                .get(id)
                .is_some_and(|entry| !entry.session().is_disposed())
    }

    /// Applies a title reported for `id`; returns the new label if it changed.
    ///
    /// Titles from tabs that are no longer selected, or whose session was
    /// already disposed, are dropped.
    pub fn apply_title(&mut self, id: TabId, title: &str) -> Option<String> {
        let live = self
            .tabs
            .get(id)
            .is_some_and(|entry| !entry.session().is_disposed());
        if !live {
            debug!(tab = %id, "dropping title for closed tab");
            return None;
        }

        self.tabs.update_title(id, title)
    }

    /// Location of the selected tab's page.
    pub fn current_location(&self) -> Option<String> {
        self.tabs.active_session()?.current_location()
    }

    pub fn add_favorite(&mut self, url: &str) -> &[String] {
        self.favorites.add(url)
    }

    pub fn favorites(&self) -> &[String] {
        self.favorites.entries()
    }

    pub fn dispatch(&mut self, command: Command) -> Result<CommandEffect> {
        debug!(?command, "menu command");
        match command {
            Command::NewTab => {
                let label = self.config.default_tab_label.clone();
                Ok(CommandEffect::TabOpened(self.open_tab(&label)?))
            }
            Command::ShowFavorites => Ok(CommandEffect::ShowFavorites(self.favorites().to_vec())),
            Command::AddToFavorites => Ok(CommandEffect::PromptAddFavorite {
                default_url: self.current_location().unwrap_or_default(),
            }),
        }
    }

    pub fn tab(&self, id: TabId) -> Option<&TabEntry<PageSession<E>>> {
        self.tabs.get(id)
    }

    pub fn active_tab(&self) -> Option<TabId> {
        self.tabs.active_tab()
    }

    pub fn window_state(&self) -> WindowState {
        self.tabs.window_state()
    }
}
