//! In-memory engine for tests that cannot open a display.
//!
//! Views record every load and script, and tests drive load completion and
//! bridge messages by hand.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::{EngineController, LoadState, LoadStateHandler, ScriptMessageHandler};

type SharedLoadHandler = Rc<dyn Fn(&FakeView, LoadState)>;
type SharedMessageHandler = Rc<dyn Fn(&str)>;

#[derive(Default)]
struct FakeViewState {
    loads: RefCell<Vec<String>>,
    scripts: RefCell<Vec<String>>,
    stops: Cell<usize>,
    title: RefCell<Option<String>>,
    location: RefCell<Option<String>>,
    load_handler: RefCell<Option<SharedLoadHandler>>,
    message_handler: RefCell<Option<SharedMessageHandler>>,
}

/// Handle to a scripted view. Clones share state.
#[derive(Clone, Default)]
pub struct FakeView(Rc<FakeViewState>);

impl FakeView {
    pub fn loads(&self) -> Vec<String> {
        self.0.loads.borrow().clone()
    }

    pub fn last_load(&self) -> Option<String> {
        self.0.loads.borrow().last().cloned()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.0.scripts.borrow().clone()
    }

    pub fn stop_count(&self) -> usize {
        self.0.stops.get()
    }

    /// Completes the latest load with `title`.
    pub fn finish_load(&self, title: &str) {
        *self.0.location.borrow_mut() = self.last_load();
        *self.0.title.borrow_mut() = Some(title.to_string());
        self.emit(LoadState::Loading);
        self.emit(LoadState::Succeeded);
    }

    /// Fails the latest load.
    pub fn fail_load(&self) {
        self.emit(LoadState::Loading);
        self.emit(LoadState::Failed);
    }

    /// Delivers `raw` as if in-page script had posted it.
    pub fn post_message(&self, raw: &str) {
        let handler = self.0.message_handler.borrow().clone();
        if let Some(handler) = handler {
            handler(raw);
        }
    }

    fn emit(&self, state: LoadState) {
        let handler = self.0.load_handler.borrow().clone();
        if let Some(handler) = handler {
            handler(self, state);
        }
    }
}

/// Engine whose views are [`FakeView`]s.
#[derive(Default)]
pub struct FakeEngine {
    views: RefCell<Vec<FakeView>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every view created so far, oldest first.
    pub fn views(&self) -> Vec<FakeView> {
        self.views.borrow().clone()
    }

    pub fn last_view(&self) -> Option<FakeView> {
        self.views.borrow().last().cloned()
    }
}

impl EngineController for FakeEngine {
    type View = FakeView;

    fn create_view(&self) -> Self::View {
        let view = FakeView::default();
        self.views.borrow_mut().push(view.clone());
        view
    }

    fn load_uri(&self, view: &Self::View, uri: &str) {
        view.0.loads.borrow_mut().push(uri.to_string());
    }

    fn stop_loading(&self, view: &Self::View) {
        view.0.stops.set(view.0.stops.get() + 1);
    }

    fn location(&self, view: &Self::View) -> Option<String> {
        view.0.location.borrow().clone()
    }

    fn page_title(&self, view: &Self::View) -> Option<String> {
        view.0.title.borrow().clone()
    }

    fn run_script(&self, view: &Self::View, script: &str) {
        view.0.scripts.borrow_mut().push(script.to_string());
    }

    fn connect_load_state(&self, view: &Self::View, handler: LoadStateHandler<Self::View>) {
        *view.0.load_handler.borrow_mut() = Some(Rc::from(handler));
    }

    fn connect_script_message(&self, view: &Self::View, handler: ScriptMessageHandler) {
        *view.0.message_handler.borrow_mut() = Some(Rc::from(handler));
    }
}
