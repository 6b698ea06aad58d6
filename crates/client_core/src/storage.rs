//! Key/value persistence backing the session.

use std::{
    collections::{BTreeMap, HashMap},
    fs, io,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::error::Result;

/// Batched writes are the primitive: every key in one call lands together or
/// not at all.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_items(&self, items: &[(&str, &str)]) -> Result<()>;
    fn remove_items(&self, keys: &[&str]) -> Result<()>;

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.set_items(&[(key, value)])
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.remove_items(&[key])
    }
}

impl<T: LocalStorage + ?Sized> LocalStorage for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_items(&self, items: &[(&str, &str)]) -> Result<()> {
        (**self).set_items(items)
    }

    fn remove_items(&self, keys: &[&str]) -> Result<()> {
        (**self).remove_items(keys)
    }
}

#[derive(Default)]
pub struct MemoryLocalStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_items<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> Result<T> {
        let mut guard = self
            .items
            .lock()
            .map_err(|_| io::Error::other("memory storage lock poisoned"))?;
        Ok(f(&mut guard))
    }
}

impl LocalStorage for MemoryLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.with_items(|items| items.get(key).cloned())
    }

    fn set_items(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.with_items(|items| {
            for (key, value) in entries {
                items.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn remove_items(&self, keys: &[&str]) -> Result<()> {
        self.with_items(|items| {
            for key in keys {
                items.remove(*key);
            }
        })
    }
}

/// A JSON object on disk, one string value per key.
pub struct FileLocalStorage {
    path: PathBuf,
}

impl FileLocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_items(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_items(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, serde_json::to_vec_pretty(items)?)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

impl LocalStorage for FileLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_items()?.remove(key))
    }

    fn set_items(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut items = self.read_items()?;
        for (key, value) in entries {
            items.insert(key.to_string(), value.to_string());
        }
        self.write_items(&items)
    }

    fn remove_items(&self, keys: &[&str]) -> Result<()> {
        let mut items = self.read_items()?;
        let before = items.len();
        for key in keys {
            items.remove(*key);
        }
        if items.len() != before {
            self.write_items(&items)?;
        }
        Ok(())
    }
}
