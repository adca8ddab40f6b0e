use std::path::Path;

use sled::Db;
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionResult};

use super::KeyStore;
use crate::utils::error::{Error, Result};

/// Durable [`KeyStore`] backed by the `sled` embedded database.
///
/// Everything lives in the default tree. Lists are stored as JSON-encoded
/// `Vec<String>` values under their key, so operators can inspect queue
/// state with any sled tooling. Multi-key operations (the claim/harvest
/// move) run inside a sled transaction, which gives the atomicity the
/// queue protocol relies on.
#[derive(Clone)]
pub struct SledStore {
    db: Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn decode_list(key: &str, raw: &[u8]) -> Result<Vec<String>> {
        serde_json::from_slice(raw).map_err(|e| Error::Corrupt {
            key: key.to_string(),
            reason: format!("list did not decode: {e}"),
        })
    }

    fn read_list(&self, key: &str) -> Result<Vec<String>> {
        match self.db.get(key)? {
            Some(raw) => Self::decode_list(key, &raw),
            None => Ok(Vec::new()),
        }
    }
}

/// Flatten a transaction outcome into the crate result type.
fn unwrap_tx<T>(res: TransactionResult<T, Error>) -> Result<T> {
    res.map_err(|e| match e {
        TransactionError::Abort(e) => e,
        TransactionError::Storage(e) => Error::from(e),
    })
}

fn abort(e: Error) -> ConflictableTransactionError<Error> {
    ConflictableTransactionError::Abort(e)
}

impl KeyStore for SledStore {
    fn list_append(&self, key: &str, value: &str) -> Result<()> {
        // Read-modify-write on one key still needs a transaction: two
        // producers appending concurrently must not lose an element.
        let res = self.db.transaction(|tx| {
            let mut list: Vec<String> = match tx.get(key)? {
                Some(raw) => Self::decode_list(key, &raw).map_err(abort)?,
                None => Vec::new(),
            };
            list.push(value.to_string());
            let raw = serde_json::to_vec(&list).map_err(|e| abort(Error::from(e)))?;
            tx.insert(key, raw)?;
            Ok(())
        });
        unwrap_tx(res)
    }

    fn list_move(&self, src: &str, dst: &str) -> Result<Option<String>> {
        let res = self.db.transaction(|tx| {
            let mut src_list: Vec<String> = match tx.get(src)? {
                Some(raw) => Self::decode_list(src, &raw).map_err(abort)?,
                None => return Ok(None),
            };
            if src_list.is_empty() {
                return Ok(None);
            }
            let moved = src_list.remove(0);

            let mut dst_list: Vec<String> = match tx.get(dst)? {
                Some(raw) => Self::decode_list(dst, &raw).map_err(abort)?,
                None => Vec::new(),
            };
            dst_list.push(moved.clone());

            let src_raw = serde_json::to_vec(&src_list).map_err(|e| abort(Error::from(e)))?;
            let dst_raw = serde_json::to_vec(&dst_list).map_err(|e| abort(Error::from(e)))?;
            tx.insert(src, src_raw)?;
            tx.insert(dst, dst_raw)?;
            Ok(Some(moved))
        });
        unwrap_tx(res)
    }

    fn list_remove(&self, key: &str, value: &str) -> Result<bool> {
        let res = self.db.transaction(|tx| {
            let mut list: Vec<String> = match tx.get(key)? {
                Some(raw) => Self::decode_list(key, &raw).map_err(abort)?,
                None => return Ok(false),
            };
            let Some(pos) = list.iter().position(|v| v == value) else {
                return Ok(false);
            };
            list.remove(pos);
            let raw = serde_json::to_vec(&list).map_err(|e| abort(Error::from(e)))?;
            tx.insert(key, raw)?;
            Ok(true)
        });
        unwrap_tx(res)
    }

    fn list_range(&self, key: &str) -> Result<Vec<String>> {
        self.read_list(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db.insert(key, value)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.db.remove(key)?.is_some())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in self.db.scan_prefix(prefix) {
            let (key, _) = entry?;
            keys.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(keys)
    }
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore").field("db", &"sled::Db").finish()
    }
}
