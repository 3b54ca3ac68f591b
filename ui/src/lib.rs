//! Command surface of the browser.
//!
//! [`Browser`] owns the tab collection and the favorites list and turns menu
//! commands and in-page bridge calls into tab and favorites operations. It
//! never touches widgets: operations return what the window layer has to
//! show, and asynchronous notifications go out through [`ShellEvents`].

mod bridge;
mod browser;
mod config;
mod error;

pub use bridge::TabBridge;
pub use browser::{Browser, Command, CommandEffect};
pub use config::{ShellConfig, DEFAULT_TAB_LABEL};
pub use error::ShellError;

use tabs::TabId;

pub type Result<T> = std::result::Result<T, ShellError>;

/// Notifications the window layer handles on the main loop.
pub trait ShellEvents {
    /// A tab's page finished loading with `title`.
    fn title_available(&self, tab: TabId, title: &str);

    /// In-page script asked for the add-to-favorites prompt.
    fn add_to_favorites_requested(&self, url: &str);
}
