//! Small key/value store persisted as JSON in the state directory.

use crate::model::Theme;
use snafu::{ResultExt, Snafu};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const STORAGE_FILE: &str = "local-storage.json";
pub const THEME_KEY: &str = "fort-flora-theme";

#[derive(Debug, Snafu)]
pub enum StorageError {
    #[snafu(display("failed to read {}", path.display()))]
    Read { path: PathBuf, source: std::io::Error },

    #[snafu(display("failed to write {}", path.display()))]
    Write { path: PathBuf, source: std::io::Error },

    #[snafu(display("{} is not a JSON object", path.display()))]
    Decode { path: PathBuf, source: serde_json::Error },
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err).context(ReadSnafu { path: &self.path }),
        };
        serde_json::from_str(&text).context(DecodeSnafu { path: &self.path })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // A corrupt file is replaced rather than blocking every later write.
        let mut entries = self.load().unwrap_or_else(|err| {
            warn!(error = %err, "discarding unreadable local storage");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).context(WriteSnafu { path: dir })?;
        }
        let text = serde_json::to_string_pretty(&entries).context(DecodeSnafu { path: &self.path })?;
        std::fs::write(&self.path, text).context(WriteSnafu { path: &self.path })
    }

    /// The saved theme; dark when nothing usable is stored.
    pub fn theme(&self) -> Theme {
        match self.get(THEME_KEY) {
            Ok(Some(value)) => Theme::parse(&value),
            Ok(None) => Theme::default(),
            Err(err) => {
                warn!(error = %err, "could not read saved theme");
                Theme::default()
            }
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.set(THEME_KEY, theme.as_str())
    }
}
