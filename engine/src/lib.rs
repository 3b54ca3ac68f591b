pub mod bridge;
mod session;
mod webkit;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bridge::{search_url, BridgeRequest, ScriptBridge};
pub use session::{Navigation, PageSession, SessionLoader};
pub use webkit::WebKitEngine;

/// Schemes that make a navigation target a real URL rather than a tab label.
const URL_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Page used to release a view's content when its tab goes away.
const BLANK_PAGE: &str = "about:blank";

/// Returns true when `target` should be loaded as-is.
pub fn is_url(target: &str) -> bool {
    URL_SCHEMES.iter().any(|scheme| target.starts_with(scheme))
}

/// Load lifecycle of a view as reported by the engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Callback for load-state transitions. Receives the view that changed.
pub type LoadStateHandler<V> = Box<dyn Fn(&V, LoadState)>;

/// Callback for raw messages posted by in-page script.
pub type ScriptMessageHandler = Box<dyn Fn(&str)>;

/// Interface to the web engine implementation.
///
/// All calls and callbacks happen on the UI main loop.
pub trait EngineController {
    type View: Clone + 'static;

    /// Creates a new view instance for a tab.
    fn create_view(&self) -> Self::View;

    /// Loads a URI into the provided view.
    fn load_uri(&self, view: &Self::View, uri: &str);

    /// Stops any in-flight load.
    fn stop_loading(&self, view: &Self::View);

    /// Current location of the view, if it has one.
    fn location(&self, view: &Self::View) -> Option<String>;

    /// Title of the document currently shown.
    fn page_title(&self, view: &Self::View) -> Option<String>;

    /// Evaluates `script` in the page's global scope.
    fn run_script(&self, view: &Self::View, script: &str);

    /// Registers the load-state observer for a view.
    fn connect_load_state(&self, view: &Self::View, handler: LoadStateHandler<Self::View>);

    /// Registers the receiver for bridge messages posted by the page.
    fn connect_script_message(&self, view: &Self::View, handler: ScriptMessageHandler);
}
