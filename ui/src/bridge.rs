use std::rc::Rc;

use engine::{EngineController, ScriptBridge, SessionLoader};
use tracing::debug;

use crate::ShellEvents;

/// Bridge bound into one tab's page.
///
/// Navigation requests load into that tab's own session; the favorites prompt
/// is handed to the window layer.
pub struct TabBridge<E: EngineController> {
    loader: SessionLoader<E>,
    events: Rc<dyn ShellEvents>,
}

impl<E: EngineController> TabBridge<E> {
    pub fn new(loader: SessionLoader<E>, events: Rc<dyn ShellEvents>) -> Self {
        Self { loader, events }
    }
}

impl<E: EngineController> ScriptBridge for TabBridge<E> {
    fn load_page(&self, url: &str) {
        debug!(url, "page requested navigation");
        self.loader.load_url(url);
    }

    fn show_add_to_favorites_dialog(&self, url: &str) {
        self.events.add_to_favorites_requested(url);
    }
}
