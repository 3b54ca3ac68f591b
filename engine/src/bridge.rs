//! Page-to-host bridge.
//!
//! In-page script talks to the host through a WebKit script message
//! handler. After every successful load the host evaluates [`BRIDGE_SCRIPT`],
//! which defines `window.flowy` with three callables. Each one posts a JSON
//! encoded [`BridgeRequest`].
//!
//! Any page may call the bridge; there is no origin check.

use serde::Deserialize;

/// Name of the script message handler the shim posts to.
pub const HANDLER_NAME: &str = "flowy";

/// Prefix of the search-engine query URL built by `search`.
pub const SEARCH_URL_PREFIX: &str = "https://www.google.com/search?q=";

/// Defines `window.flowy` in the page global scope.
pub const BRIDGE_SCRIPT: &str = r#"(function () {
  const post = (message) =>
    window.webkit.messageHandlers.flowy.postMessage(JSON.stringify(message));
  window.flowy = {
    loadPage: (url) => post({ type: "loadPage", url: String(url) }),
    search: (text) => post({ type: "search", text: String(text) }),
    showAddToFavoritesDialog: (url) =>
      post({ type: "showAddToFavoritesDialog", url: String(url) }),
  };
})();"#;

/// Builds the search query URL for `text`. The text is used verbatim.
pub fn search_url(text: &str) -> String {
    format!("{SEARCH_URL_PREFIX}{text}")
}

/// Host capabilities exposed to in-page script.
pub trait ScriptBridge {
    /// Loads `url` into the calling page.
    fn load_page(&self, url: &str);

    /// Runs a web search for `text` in the calling page.
    fn search(&self, text: &str) {
        self.load_page(&search_url(text));
    }

    /// Opens the add-to-favorites prompt pre-filled with `url`.
    fn show_add_to_favorites_dialog(&self, url: &str);
}

/// Message posted by the shim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BridgeRequest {
    LoadPage { url: String },
    Search { text: String },
    ShowAddToFavoritesDialog { url: String },
}

impl BridgeRequest {
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Forwards the request to the matching bridge method.
    pub fn dispatch(&self, bridge: &dyn ScriptBridge) {
        match self {
            Self::LoadPage { url } => bridge.load_page(url),
            Self::Search { text } => bridge.search(text),
            Self::ShowAddToFavoritesDialog { url } => bridge.show_add_to_favorites_dialog(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

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

    #[test]
    fn search_builds_google_query() {
        let recorder = Recorder::default();
        recorder.search("cats");
        assert_eq!(
            *recorder.loads.borrow(),
            ["https://www.google.com/search?q=cats"]
        );
    }

    #[test]
    fn search_text_is_not_encoded() {
        assert_eq!(search_url(""), "https://www.google.com/search?q=");
        assert_eq!(
            search_url("rust gtk&x"),
            "https://www.google.com/search?q=rust gtk&x"
        );
    }

    #[test]
    fn parses_each_request_kind() {
        assert_eq!(
            BridgeRequest::parse(r#"{"type":"loadPage","url":"https://example.com"}"#).unwrap(),
            BridgeRequest::LoadPage {
                url: "https://example.com".into()
            }
        );
        assert_eq!(
            BridgeRequest::parse(r#"{"type":"search","text":"cats"}"#).unwrap(),
            BridgeRequest::Search {
                text: "cats".into()
            }
        );
        assert_eq!(
            BridgeRequest::parse(r#"{"type":"showAddToFavoritesDialog","url":"x"}"#).unwrap(),
            BridgeRequest::ShowAddToFavoritesDialog { url: "x".into() }
        );
    }

    #[test]
    fn rejects_unknown_or_incomplete_messages() {
        assert!(BridgeRequest::parse("[object Object]").is_err());
        assert!(BridgeRequest::parse(r#"{"type":"close"}"#).is_err());
        assert!(BridgeRequest::parse(r#"{"type":"loadPage"}"#).is_err());
    }

    #[test]
    fn dispatch_routes_to_bridge() {
        let recorder = Recorder::default();
        BridgeRequest::Search {
            text: "owls".into(),
        }
        .dispatch(&recorder);
        BridgeRequest::LoadPage {
            url: "https://example.org".into(),
        }
        .dispatch(&recorder);
        BridgeRequest::ShowAddToFavoritesDialog {
            url: "https://example.net".into(),
        }
        .dispatch(&recorder);

        assert_eq!(
            *recorder.loads.borrow(),
            [
                "https://www.google.com/search?q=owls",
                "https://example.org"
            ]
        );
        assert_eq!(*recorder.prompts.borrow(), ["https://example.net"]);
    }

    #[test]
    fn shim_posts_to_registered_handler() {
        assert!(BRIDGE_SCRIPT.contains(&format!("messageHandlers.{HANDLER_NAME}.")));
        for name in ["loadPage", "search", "showAddToFavoritesDialog"] {
            assert!(BRIDGE_SCRIPT.contains(name));
        }
    }
}
