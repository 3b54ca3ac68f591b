use std::fmt;

use thiserror::Error;
use tracing::info;
use util::IdGenerator;

/// Longest label a tab strip entry may carry, in characters.
pub const MAX_TAB_TITLE_LENGTH: usize = 20;

const ELLIPSIS: &str = "...";

/// Shortens a page title to fit the tab strip.
///
/// Titles up to [`MAX_TAB_TITLE_LENGTH`] characters are kept as-is. Longer
/// titles are cut so that the result, ellipsis included, is exactly
/// [`MAX_TAB_TITLE_LENGTH`] characters long.
pub fn derive_tab_title(title: &str) -> String {
    if title.chars().count() <= MAX_TAB_TITLE_LENGTH {
        return title.to_string();
    }

    let mut short: String = title
        .chars()
        .take(MAX_TAB_TITLE_LENGTH - ELLIPSIS.len())
        .collect();
    short.push_str(ELLIPSIS);
    short
}

/// Stable identifier for a browser tab.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TabId(u64);

impl TabId {
    /// Creates a new `TabId` from a raw numeric value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TabError {
    #[error("the browser window is closed")]
    WindowClosed,

    #[error("tab {0} not found")]
    NotFound(TabId),
}

pub type Result<T> = std::result::Result<T, TabError>;

/// Anything a tab owns exclusively and must release when the tab goes away.
pub trait Disposable {
    fn dispose(&mut self);
}

/// Whether the application window is still up.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WindowState {
    Open,
    Closed,
}

/// Result of closing a single tab.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CloseOutcome {
    /// Other tabs remain and the window stays open.
    TabClosed { remaining: usize },
    /// That was the last tab; the window must close.
    WindowClosed,
}

/// Answer to a user request to close the whole window.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CloseRequest {
    Allow,
    Veto,
}

/// A tab record owned by the tab manager, together with its page session.
#[derive(Debug)]
pub struct TabEntry<S> {
    id: TabId,
    title: String,
    session: S,
}

impl<S> TabEntry<S> {
    /// The label shown in the tab strip.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn session(&self) -> &S {
        &self.session
    }
}

/// Interface for tab lifecycle and state management.
pub trait TabManager {
    type Session;

    /// Appends a tab with the given label and selects it.
    fn create_tab(&mut self, label: String, session: Self::Session) -> Result<TabId>;

    /// Marks the specified tab as active.
    fn set_active(&mut self, id: TabId) -> bool;

    /// Disposes the tab's session and removes it from the strip.
    fn close_tab(&mut self, id: TabId) -> Result<CloseOutcome>;

    /// Applies a page title reported by the tab's session.
    ///
    /// The label only changes while the reporting tab is the selected one.
    /// Returns the new label when it was applied.
    fn update_title(&mut self, id: TabId, title: &str) -> Option<String>;

    /// Decides whether the user may close the window right now.
    fn request_window_close(&mut self) -> CloseRequest;

    /// Returns the currently active tab, if any.
    fn active_tab(&self) -> Option<TabId>;

    /// Returns the ordered list of tabs.
    fn tabs(&self) -> &[TabEntry<Self::Session>];
}

/// In-memory tab collection bound to a single window.
#[derive(Debug)]
pub struct BasicTabManager<S> {
    tabs: Vec<TabEntry<S>>,
    active: Option<TabId>,
    window: WindowState,
    ids: IdGenerator,
}

impl<S> Default for BasicTabManager<S> {
    fn default() -> Self {
        Self {
            tabs: Vec::new(),
            active: None,
            window: WindowState::Open,
            ids: IdGenerator::default(),
        }
    }
}

impl<S: Disposable> BasicTabManager<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window_state(&self) -> WindowState {
        self.window
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn get(&self, id: TabId) -> Option<&TabEntry<S>> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    /// Session of the selected tab.
    pub fn active_session(&self) -> Option<&S> {
        let active = self.active?;
        self.get(active).map(TabEntry::session)
    }

    fn close_window(&mut self) {
        for mut tab in self.tabs.drain(..) {
            tab.session.dispose();
        }
        self.active = None;
        self.window = WindowState::Closed;
        info!("browser window closed");
    }
}

impl<S: Disposable> TabManager for BasicTabManager<S> {
    type Session = S;

    fn create_tab(&mut self, label: String, session: S) -> Result<TabId> {
        if self.window == WindowState::Closed {
            return Err(TabError::WindowClosed);
        }

        let id = TabId::new(self.ids.next());
        info!(tab = %id, label = %label, "opened tab");
        self.tabs.push(TabEntry {
            id,
            title: label,
            session,
        });
        self.active = Some(id);
        Ok(id)
    }

    fn set_active(&mut self, id: TabId) -> bool {
        if self.get(id).is_none() {
            return false;
        }

        self.active = Some(id);
        true
    }

    fn close_tab(&mut self, id: TabId) -> Result<CloseOutcome> {
        let idx = self
            .tabs
            .iter()
            .position(|tab| tab.id == id)
            .ok_or(TabError::NotFound(id))?;

        let mut entry = self.tabs.remove(idx);
        entry.session.dispose();
        info!(tab = %id, "closed tab");

        if self.tabs.is_empty() {
            self.close_window();
            return Ok(CloseOutcome::WindowClosed);
        }

        if self.active == Some(id) {
            // Select the neighbour that slid into the closed slot, or the new last tab.
            let next = idx.min(self.tabs.len() - 1);
            self.active = Some(self.tabs[next].id);
        }

        Ok(CloseOutcome::TabClosed {
            remaining: self.tabs.len(),
        })
    }

    fn update_title(&mut self, id: TabId, title: &str) -> Option<String> {
        if self.active != Some(id) {
            return None;
        }

        let tab = self.tabs.iter_mut().find(|tab| tab.id == id)?;
        tab.title = derive_tab_title(title);
        Some(tab.title.clone())
    }

    fn request_window_close(&mut self) -> CloseRequest {
        match self.window {
            WindowState::Closed => CloseRequest::Allow,
            WindowState::Open if self.tabs.len() > 1 => CloseRequest::Veto,
            WindowState::Open => {
                self.close_window();
                CloseRequest::Allow
            }
        }
    }

    fn active_tab(&self) -> Option<TabId> {
        self.active
    }

    fn tabs(&self) -> &[TabEntry<S>] {
        &self.tabs
    }
}
