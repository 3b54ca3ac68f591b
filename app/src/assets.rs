use gtk::gio::prelude::*;
use std::path::{Path, PathBuf};

/// Files shipped in the crate's `assets` directory.
pub struct Assets {
    pub start_page_uri: String,
}

impl Assets {
    pub fn new() -> Self {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");

        Self {
            start_page_uri: file_uri(&dir.join("index.html")),
        }
    }
}

fn file_uri(path: &Path) -> String {
    gtk::gio::File::for_path(path).uri().to_string()
}
