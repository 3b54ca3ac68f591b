//! Favorites persistence.
//!
//! Favorites are an ordered list of URL strings kept in a flat text file,
//! one entry per line. The list is loaded once at startup and the whole
//! file is rewritten after every addition.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};

/// Default location of the favorites file, relative to the working directory.
pub const DEFAULT_FAVORITES_FILE: &str = "favorites.txt";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read favorites from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write favorites to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Interface for favorites persistence.
pub trait FavoritesStore {
    /// Loads the stored list. Failures degrade to an empty list.
    fn load(&self) -> Vec<String>;

    /// Replaces the stored list with `favorites`.
    fn save(&self, favorites: &[String]) -> Result<()>;
}

/// Line-delimited UTF-8 favorites file.
#[derive(Debug, Clone)]
pub struct FileFavoritesStore {
    path: PathBuf,
}

impl FileFavoritesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<String>> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(raw.lines().map(str::to_string).collect())
    }
}

impl Default for FileFavoritesStore {
    fn default() -> Self {
        Self::new(DEFAULT_FAVORITES_FILE)
    }
}

impl FavoritesStore for FileFavoritesStore {
    fn load(&self) -> Vec<String> {
        match self.read() {
            Ok(favorites) => {
                info!(path = %self.path.display(), count = favorites.len(), "loaded favorites");
                favorites
            }
            Err(err) => {
                warn!("{err}");
                Vec::new()
            }
        }
    }

    fn save(&self, favorites: &[String]) -> Result<()> {
        let mut contents = String::new();
        for favorite in favorites {
            contents.push_str(favorite);
            contents.push('\n');
        }

        fs::write(&self.path, contents).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-memory favorites list backed by a store.
#[derive(Debug)]
pub struct Favorites<S: FavoritesStore> {
    store: S,
    entries: Vec<String>,
}

impl<S: FavoritesStore> Favorites<S> {
    /// Loads the current list from `store`.
    pub fn open(store: S) -> Self {
        let entries = store.load();
        Self { store, entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Appends `url` and rewrites the store.
    ///
    /// No deduplication or URL validation happens here. A failed write is
    /// logged and the in-memory entry is kept.
    pub fn add(&mut self, url: impl Into<String>) -> &[String] {
        let url = url.into();
        info!(url = %url, "adding favorite");
        self.entries.push(url);

        if let Err(err) = self.store.save(&self.entries) {
            error!("{err}");
        }
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileFavoritesStore {
        FileFavoritesStore::new(dir.path().join(DEFAULT_FAVORITES_FILE))
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.load().is_empty());
        assert!(matches!(store.read(), Err(StorageError::Read { .. })));
    }

    #[test]
    fn non_utf8_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), [0xff, 0xfe, b'\n', 0xc3]).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn load_reads_one_entry_per_line() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            "https://example.com\nhttps://rust-lang.org\nhttps://example.com\n",
        )
        .unwrap();

        assert_eq!(
            store.load(),
            vec![
                "https://example.com",
                "https://rust-lang.org",
                "https://example.com",
            ]
        );
    }

    #[test]
    fn save_then_load_is_stable() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let original = "https://a.example\nnot a url\n\nhttps://b.example\n";
        fs::write(store.path(), original).unwrap();

        let loaded = store.load();
        store.save(&loaded).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), original);
        assert_eq!(store.load(), loaded);
    }

    #[test]
    fn missing_trailing_newline_is_restored_on_save() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "https://a.example\nhttps://b.example").unwrap();

        store.save(&store.load()).unwrap();
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "https://a.example\nhttps://b.example\n"
        );
    }

    #[test]
    fn add_appends_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "https://a.example\n").unwrap();

        let mut favorites = Favorites::open(store.clone());
        let before = favorites.entries().to_vec();
        let after = favorites.add("https://a.example").to_vec();

        let mut expected = before;
        expected.push("https://a.example".to_string());
        assert_eq!(after, expected);
        assert_eq!(store.load(), expected);
    }

    #[test]
    fn add_keeps_entry_when_save_fails() {
        let dir = TempDir::new().unwrap();
        let store = FileFavoritesStore::new(dir.path().join("missing").join("favorites.txt"));

        let mut favorites = Favorites::open(store.clone());
        favorites.add("https://example.com");

        assert_eq!(favorites.entries(), ["https://example.com"]);
        assert!(matches!(
            store.save(favorites.entries()),
            Err(StorageError::Write { .. })
        ));
    }
}
