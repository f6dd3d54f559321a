use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use budtree_core::{
    storage::{push_history, toggle_in},
    BudgetStorage, CoreError,
};
use budtree_domain::{BudgetNode, HistoryEntry};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

const CURRENT_FILE: &str = "current.json";
const HISTORY_FILE: &str = "history.json";
const FAVORITES_FILE: &str = "favorites.json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed JSON persistence for the current tree, its history and favorites.
///
/// Each concern lives in its own file under `base_dir`; every write goes to a
/// sibling temp file first and is renamed into place.
#[derive(Debug, Clone)]
pub struct JsonBudgetStorage {
    base_dir: PathBuf,
    retention: Option<usize>,
}

impl JsonBudgetStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        Self::with_retention(base_dir, None)
    }

    /// Keeps at most `retention` history entries, newest first.
    pub fn with_retention(
        base_dir: impl Into<PathBuf>,
        retention: Option<usize>,
    ) -> Result<Self, CoreError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            retention: retention.map(|limit| limit.max(1)),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn current_path(&self) -> PathBuf {
        self.base_dir.join(CURRENT_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.base_dir.join(HISTORY_FILE)
    }

    pub fn favorites_path(&self) -> PathBuf {
        self.base_dir.join(FAVORITES_FILE)
    }

    /// Reads a list file; unreadable content is logged and treated as empty
    /// so the next write can recover the file.
    fn read_list<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>, CoreError> {
        match read_json::<Vec<T>>(path) {
            Ok(Some(items)) => Ok(items),
            Ok(None) => Ok(Vec::new()),
            Err(CoreError::Serde(reason)) => {
                tracing::warn!(path = %path.display(), %reason, "discarding unreadable list");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }
}

impl BudgetStorage for JsonBudgetStorage {
    fn save(&self, root: &BudgetNode, at: DateTime<Utc>) -> Result<HistoryEntry, CoreError> {
        write_json(&self.current_path(), root)?;
        let mut history: Vec<HistoryEntry> = self.read_list(&self.history_path())?;
        let entry = push_history(
            &mut history,
            HistoryEntry::new(at, root.clone()),
            self.retention,
        );
        write_json(&self.history_path(), &history)?;
        Ok(entry)
    }

    fn load(&self) -> Result<Option<BudgetNode>, CoreError> {
        read_json(&self.current_path())
    }

    fn restore(&self, root: &BudgetNode) -> Result<(), CoreError> {
        write_json(&self.current_path(), root)
    }

    fn history(&self) -> Result<Vec<HistoryEntry>, CoreError> {
        self.read_list(&self.history_path())
    }

    fn clear_history(&self) -> Result<(), CoreError> {
        remove_if_exists(&self.history_path())
    }

    fn favorites(&self) -> Result<Vec<String>, CoreError> {
        self.read_list(&self.favorites_path())
    }

    fn toggle_favorite(&self, key: &str) -> Result<bool, CoreError> {
        let mut favorites: Vec<String> = self.read_list(&self.favorites_path())?;
        let now_favorite = toggle_in(&mut favorites, key);
        write_json(&self.favorites_path(), &favorites)?;
        Ok(now_favorite)
    }

    fn clear_favorites(&self) -> Result<(), CoreError> {
        remove_if_exists(&self.favorites_path())
    }

    fn clear(&self) -> Result<(), CoreError> {
        remove_if_exists(&self.current_path())?;
        remove_if_exists(&self.history_path())
    }
}

/// Reads and parses `path`; a missing file is `Ok(None)`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CoreError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    serde_json::from_str(&data)
        .map(Some)
        .map_err(|err| CoreError::Serde(format!("{}: {}", path.display(), err)))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CoreError> {
    let data =
        serde_json::to_string_pretty(value).map_err(|err| CoreError::Serde(err.to_string()))?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<(), CoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
