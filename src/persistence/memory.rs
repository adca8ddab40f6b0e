use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use super::KeyStore;
use crate::utils::error::{Error, Result};

#[derive(Debug, Clone)]
enum Entry {
    Value(Vec<u8>),
    List(VecDeque<String>),
}

/// In-process [`KeyStore`] holding everything in a mutex-guarded map.
///
/// State does not survive the process; use [`super::SledStore`] for
/// durability. Every trait method takes the lock once, so each operation
/// (including the two-key `list_move`) is atomic with respect to other
/// threads sharing the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> Result<MutexGuard<'_, BTreeMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| Error::StoreUnavailable("memory store mutex poisoned".to_string()))
    }
}

fn as_list<'a>(key: &str, entry: &'a mut Entry) -> Result<&'a mut VecDeque<String>> {
    match entry {
        Entry::List(list) => Ok(list),
        Entry::Value(_) => Err(Error::Corrupt {
            key: key.to_string(),
            reason: "expected a list, found a value".to_string(),
        }),
    }
}

impl KeyStore for MemoryStore {
    fn list_append(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.guard()?;
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(VecDeque::new()));
        as_list(key, entry)?.push_back(value.to_string());
        Ok(())
    }

    fn list_move(&self, src: &str, dst: &str) -> Result<Option<String>> {
        let mut entries = self.guard()?;
        let moved = match entries.get_mut(src) {
            Some(entry) => as_list(src, entry)?.pop_front(),
            None => None,
        };
        let Some(moved) = moved else {
            return Ok(None);
        };
        let entry = entries
            .entry(dst.to_string())
            .or_insert_with(|| Entry::List(VecDeque::new()));
        as_list(dst, entry)?.push_back(moved.clone());
        Ok(Some(moved))
    }

    fn list_remove(&self, key: &str, value: &str) -> Result<bool> {
        let mut entries = self.guard()?;
        let Some(entry) = entries.get_mut(key) else {
            return Ok(false);
        };
        let list = as_list(key, entry)?;
        match list.iter().position(|v| v == value) {
            Some(pos) => {
                list.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn list_range(&self, key: &str) -> Result<Vec<String>> {
        let mut entries = self.guard()?;
        match entries.get_mut(key) {
            Some(entry) => Ok(as_list(key, entry)?.iter().cloned().collect()),
            None => Ok(Vec::new()),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.guard()?
            .insert(key.to_string(), Entry::Value(value.to_vec()));
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.guard()?;
        match entries.get(key) {
            Some(Entry::Value(raw)) => Ok(Some(raw.clone())),
            Some(Entry::List(_)) => Err(Error::Corrupt {
                key: key.to_string(),
                reason: "expected a value, found a list".to_string(),
            }),
            None => Ok(None),
        }
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.guard()?.remove(key).is_some())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.guard()?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }
}
