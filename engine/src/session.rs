use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tabs::Disposable;
use tracing::{debug, warn};

use crate::bridge::{BridgeRequest, ScriptBridge, BRIDGE_SCRIPT};
use crate::{is_url, EngineController, LoadState, BLANK_PAGE};

/// What `navigate` ended up loading.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Navigation {
    /// The target was a URL and was loaded verbatim.
    Url,
    /// The target was a label; the bundled start page was loaded instead.
    StartPage,
}

type TitleListener = Rc<dyn Fn(&str)>;

/// State reachable from engine callbacks. Callbacks hold it weakly so a
/// dropped session stops reacting even if the engine keeps firing.
#[derive(Default)]
struct Shared {
    target: RefCell<Option<String>>,
    state: Cell<LoadState>,
    disposed: Cell<bool>,
    on_load_succeeded: RefCell<Option<TitleListener>>,
    bridge: RefCell<Option<Rc<dyn ScriptBridge>>>,
}

impl Shared {
    fn load<E: EngineController>(&self, engine: &E, view: &E::View, url: &str) {
        if self.disposed.get() {
            return;
        }
        *self.target.borrow_mut() = Some(url.to_string());
        engine.load_uri(view, url);
    }

    fn on_load_state<E: EngineController>(&self, engine: &E, view: &E::View, state: LoadState) {
        if self.disposed.get() {
            return;
        }

        self.state.set(state);
        debug!(?state, url = ?self.target.borrow(), "load state changed");
        if state != LoadState::Succeeded {
            return;
        }

        // Navigation replaced the page global scope, so the shim must be rebound.
        if self.bridge.borrow().is_some() {
            engine.run_script(view, BRIDGE_SCRIPT);
        }

        let title = engine.page_title(view).unwrap_or_default();
        let listener = self.on_load_succeeded.borrow().clone();
        if let Some(listener) = listener {
            listener(&title);
        }
    }

    fn on_script_message(&self, raw: &str) {
        if self.disposed.get() {
            return;
        }

        let bridge = self.bridge.borrow().clone();
        let Some(bridge) = bridge else {
            debug!("bridge message before any bridge was bound");
            return;
        };

        match BridgeRequest::parse(raw) {
            Ok(request) => {
                debug!(?request, "bridge request");
                request.dispatch(bridge.as_ref());
            }
            Err(err) => warn!(%err, raw, "malformed bridge message"),
        }
    }
}

/// One engine view and its load lifecycle.
///
/// The session is the only owner of its view. Disposing it stops the view
/// and silences every callback registered through it.
pub struct PageSession<E: EngineController> {
    engine: Rc<E>,
    view: E::View,
    start_page: String,
    shared: Rc<Shared>,
}

impl<E: EngineController + 'static> PageSession<E> {
    /// Creates a view on `engine`. Label targets are redirected to `start_page`.
    pub fn new(engine: Rc<E>, start_page: impl Into<String>) -> Self {
        let view = engine.create_view();
        let shared = Rc::new(Shared::default());

        let engine_for_load = Rc::clone(&engine);
        let shared_for_load = Rc::downgrade(&shared);
        engine.connect_load_state(
            &view,
            Box::new(move |view: &E::View, state: LoadState| {
                if let Some(shared) = shared_for_load.upgrade() {
                    shared.on_load_state(engine_for_load.as_ref(), view, state);
                }
            }),
        );

        let shared_for_messages = Rc::downgrade(&shared);
        engine.connect_script_message(
            &view,
            Box::new(move |raw: &str| {
                if let Some(shared) = shared_for_messages.upgrade() {
                    shared.on_script_message(raw);
                }
            }),
        );

        Self {
            engine,
            view,
            start_page: start_page.into(),
            shared,
        }
    }
}

impl<E: EngineController> PageSession<E> {
    /// Loads `target` if it is a URL, otherwise the start page.
    pub fn navigate(&self, target: &str) -> Navigation {
        if is_url(target) {
            self.load_url(target);
            Navigation::Url
        } else {
            self.load_url(&self.start_page);
            Navigation::StartPage
        }
    }

    /// Loads `url` verbatim, bypassing the label policy of [`navigate`](Self::navigate).
    pub fn load_url(&self, url: &str) {
        self.shared.load(self.engine.as_ref(), &self.view, url);
    }

    /// A handle that loads into this session without owning it.
    pub fn loader(&self) -> SessionLoader<E> {
        SessionLoader {
            engine: Rc::clone(&self.engine),
            view: self.view.clone(),
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Sets the observer for successful loads. It receives the document title.
    pub fn on_load_succeeded<F: Fn(&str) + 'static>(&self, listener: F) {
        *self.shared.on_load_succeeded.borrow_mut() = Some(Rc::new(listener));
    }

    /// Binds `bridge` into the page scope now (if a page is up) and after
    /// every later successful load.
    pub fn inject_bridge(&self, bridge: Rc<dyn ScriptBridge>) {
        *self.shared.bridge.borrow_mut() = Some(bridge);
        if self.shared.state.get() == LoadState::Succeeded {
            self.engine.run_script(&self.view, BRIDGE_SCRIPT);
        }
    }

    pub fn current_location(&self) -> Option<String> {
        self.engine.location(&self.view)
    }

    pub fn target(&self) -> Option<String> {
        self.shared.target.borrow().clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.shared.state.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.get()
    }

    pub fn view(&self) -> &E::View {
        &self.view
    }
}

/// Weak load handle for callbacks that outlive or sit inside a [`PageSession`].
///
/// Loads go through the same path as [`PageSession::load_url`], so they update
/// the load target and stop once the session is disposed or dropped.
pub struct SessionLoader<E: EngineController> {
    engine: Rc<E>,
    view: E::View,
    shared: Weak<Shared>,
}

impl<E: EngineController> SessionLoader<E> {
    pub fn load_url(&self, url: &str) {
        if let Some(shared) = self.shared.upgrade() {
            shared.load(self.engine.as_ref(), &self.view, url);
        }
    }
}

impl<E: EngineController> Disposable for PageSession<E> {
    fn dispose(&mut self) {
        if self.shared.disposed.replace(true) {
            return;
        }

        self.shared.on_load_succeeded.borrow_mut().take();
        self.shared.bridge.borrow_mut().take();
        self.shared.state.set(LoadState::Idle);
        self.engine.stop_loading(&self.view);
        self.engine.load_uri(&self.view, BLANK_PAGE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeEngine;

    const START_PAGE: &str = "file:///opt/flowy/index.html";

    #[derive(Default)]
    struct Recorder {
        loads: RefCell<Vec<String>>,
        prompts: RefCell<Vec<String>>,
    }

    impl ScriptBridge for Recorder {
        fn load_page(&self, url: &str) {
            self.loads.borrow_mut().push(url.to_string());
        }

        fn show_add_to_favorites_dialog(&self, url: &str) {
            self.prompts.borrow_mut().push(url.to_string());
        }
    }

    fn session() -> (Rc<FakeEngine>, PageSession<FakeEngine>) {
        let engine = Rc::new(FakeEngine::new());
        let session = PageSession::new(Rc::clone(&engine), START_PAGE);
        (engine, session)
    }

    fn titles(session: &PageSession<FakeEngine>) -> Rc<RefCell<Vec<String>>> {
        let titles = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&titles);
        session.on_load_succeeded(move |title| sink.borrow_mut().push(title.to_string()));
        titles
    }

    #[test]
    fn url_targets_load_verbatim() {
        let (_engine, session) = session();
        assert_eq!(session.navigate("https://example.com"), Navigation::Url);
        assert_eq!(session.view().loads(), ["https://example.com"]);
        assert_eq!(session.target().as_deref(), Some("https://example.com"));
    }

    #[test]
    fn label_targets_load_start_page() {
        let (_engine, session) = session();
        assert_eq!(session.navigate("New Tab"), Navigation::StartPage);
        assert_eq!(session.view().loads(), [START_PAGE]);
    }

    #[test]
    fn success_reports_title() {
        let (_engine, session) = session();
        let titles = titles(&session);
        session.navigate("https://example.com");
        session.view().finish_load("Example Domain");

        assert_eq!(session.load_state(), LoadState::Succeeded);
        assert_eq!(*titles.borrow(), ["Example Domain"]);
        assert_eq!(
            session.current_location().as_deref(),
            Some("https://example.com")
        );
    }

    #[test]
    fn failure_is_not_reported() {
        let (_engine, session) = session();
        let titles = titles(&session);
        session.navigate("https://unreachable.invalid");
        session.view().fail_load();

        assert_eq!(session.load_state(), LoadState::Failed);
        assert!(titles.borrow().is_empty());
    }

    #[test]
    fn bridge_is_rebound_after_every_load() {
        let (_engine, session) = session();
        session.navigate("https://example.com");
        session.view().finish_load("one");
        assert!(session.view().scripts().is_empty());

        // Binding after a finished load applies immediately.
        session.inject_bridge(Rc::new(Recorder::default()));
        assert_eq!(session.view().scripts(), [BRIDGE_SCRIPT]);

        session.load_url("https://example.org");
        session.view().finish_load("two");
        assert_eq!(session.view().scripts(), [BRIDGE_SCRIPT, BRIDGE_SCRIPT]);
    }

    #[test]
    fn bridge_messages_reach_bound_bridge() {
        let (_engine, session) = session();
        let recorder = Rc::new(Recorder::default());
        session.inject_bridge(recorder.clone());

        let view = session.view();
        view.post_message(r#"{"type":"search","text":"cats"}"#);
        view.post_message(r#"{"type":"showAddToFavoritesDialog","url":"https://a.example"}"#);
        view.post_message("not json");

        assert_eq!(
            *recorder.loads.borrow(),
            ["https://www.google.com/search?q=cats"]
        );
        assert_eq!(*recorder.prompts.borrow(), ["https://a.example"]);
    }

    #[test]
    fn messages_without_bridge_are_ignored() {
        let (_engine, session) = session();
        session
            .view()
            .post_message(r#"{"type":"loadPage","url":"https://a.example"}"#);
        assert!(session.view().loads().is_empty());
    }

    #[test]
    fn dispose_stops_view_and_silences_callbacks() {
        let (_engine, mut session) = session();
        let titles = titles(&session);
        let recorder = Rc::new(Recorder::default());
        session.inject_bridge(recorder.clone());
        session.navigate("https://example.com");

        session.dispose();
        assert!(session.is_disposed());
        assert_eq!(session.view().stop_count(), 1);
        assert_eq!(
            session.view().loads(),
            ["https://example.com", BLANK_PAGE]
        );

        session.view().finish_load("late");
        session.view().post_message(r#"{"type":"search","text":"late"}"#);
        assert!(titles.borrow().is_empty());
        assert!(recorder.loads.borrow().is_empty());

        session.dispose();
        assert_eq!(session.view().stop_count(), 1);
    }

    #[test]
    fn loader_updates_target_until_disposed() {
        let (_engine, mut session) = session();
        let loader = session.loader();
        session.navigate("New Tab");

        loader.load_url("https://example.org");
        assert_eq!(session.target().as_deref(), Some("https://example.org"));
        assert_eq!(session.view().last_load().as_deref(), Some("https://example.org"));

        session.dispose();
        loader.load_url("https://late.example");
        assert_eq!(session.view().last_load().as_deref(), Some(BLANK_PAGE));
        assert_eq!(session.target().as_deref(), Some("https://example.org"));
    }

    #[test]
    fn dropped_session_ignores_engine_callbacks() {
        let (engine, session) = session();
        let titles = titles(&session);
        drop(session);

        let view = engine.last_view().unwrap();
        view.finish_load("orphan");
        assert!(titles.borrow().is_empty());
    }
}
