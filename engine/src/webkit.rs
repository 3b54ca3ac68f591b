use std::cell::Cell;
use std::rc::Rc;

use gtk::prelude::*;
use tracing::{debug, warn};
use webkit6::prelude::*;

use crate::bridge::HANDLER_NAME;
use crate::{EngineController, LoadState, LoadStateHandler, ScriptMessageHandler};

/// WebKitGTK-backed engine controller.
#[derive(Debug, Default)]
pub struct WebKitEngine;

impl WebKitEngine {
    pub fn new() -> Self {
        Self
    }

    fn settings() -> webkit6::Settings {
        webkit6::Settings::builder()
            .allow_file_access_from_file_urls(true)
            .enable_javascript(true)
            .build()
    }
}

impl EngineController for WebKitEngine {
    type View = webkit6::WebView;

    fn create_view(&self) -> Self::View {
        let settings = Self::settings();
        // One content manager per view so bridge messages are attributed to their tab.
        let manager = webkit6::UserContentManager::new();
        if !manager.register_script_message_handler(HANDLER_NAME, None) {
            warn!(handler = HANDLER_NAME, "failed to register script message handler");
        }

        let view = webkit6::WebView::builder()
            .settings(&settings)
            .user_content_manager(&manager)
            .build();
        view.set_hexpand(true);
        view.set_vexpand(true);
        view
    }

    fn load_uri(&self, view: &Self::View, uri: &str) {
        view.load_uri(uri);
    }

    fn stop_loading(&self, view: &Self::View) {
        view.stop_loading();
    }

    fn location(&self, view: &Self::View) -> Option<String> {
        view.uri().map(|uri| uri.to_string())
    }

    fn page_title(&self, view: &Self::View) -> Option<String> {
        view.title().map(|title| title.to_string())
    }

    fn run_script(&self, view: &Self::View, script: &str) {
        view.evaluate_javascript(
            script,
            None,
            None,
            None::<&gtk::gio::Cancellable>,
            |result| {
                if let Err(err) = result {
                    debug!(%err, "script evaluation failed");
                }
            },
        );
    }

    fn connect_load_state(&self, view: &Self::View, handler: LoadStateHandler<Self::View>) {
        let handler: Rc<dyn Fn(&webkit6::WebView, LoadState)> = Rc::from(handler);

        // WebKit reports `Finished` after `load-failed` too; remember the failure
        // so that finish is not mistaken for a success.
        let failed = Rc::new(Cell::new(false));

        let failed_for_failure = Rc::clone(&failed);
        let handler_for_failure = Rc::clone(&handler);
        view.connect_load_failed(move |view, _event, uri, error| {
            debug!(uri = %uri, %error, "load failed");
            failed_for_failure.set(true);
            handler_for_failure(view, LoadState::Failed);
            false
        });

        view.connect_load_changed(move |view, event| match event {
            webkit6::LoadEvent::Started => {
                failed.set(false);
                handler(view, LoadState::Loading);
            }
            webkit6::LoadEvent::Finished => {
                if !failed.get() {
                    handler(view, LoadState::Succeeded);
                }
            }
            _ => {}
        });
    }

    fn connect_script_message(&self, view: &Self::View, handler: ScriptMessageHandler) {
        let Some(manager) = view.user_content_manager() else {
            warn!("view has no user content manager; bridge disabled");
            return;
        };

        manager.connect_script_message_received(Some(HANDLER_NAME), move |_, value| {
            let raw = value.to_str();
            handler(raw.as_str());
        });
    }
}
