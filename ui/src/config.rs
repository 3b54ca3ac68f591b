use std::path::PathBuf;

use storage::DEFAULT_FAVORITES_FILE;

/// Label given to tabs opened from the menu and at startup.
pub const DEFAULT_TAB_LABEL: &str = "New Tab";

/// Shell settings. There are no flags or config files; these are fixed at startup.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Favorites file, relative to the working directory unless absolute.
    pub favorites_path: PathBuf,
    /// Page loaded for tabs opened with a label instead of a URL.
    pub start_page: String,
    pub default_tab_label: String,
    pub window_title: String,
    pub window_width: i32,
    pub window_height: i32,
}

impl ShellConfig {
    pub fn new(start_page: impl Into<String>) -> Self {
        Self {
            favorites_path: PathBuf::from(DEFAULT_FAVORITES_FILE),
            start_page: start_page.into(),
            default_tab_label: DEFAULT_TAB_LABEL.to_string(),
            window_title: "Flowy Browser".to_string(),
            window_width: 800,
            window_height: 600,
        }
    }
}
