//! The `persistence` module provides the storage backend for the queue.
//!
//! All coordination between producers, consumers, and the harvester happens
//! through the atomic primitives of a [`KeyStore`]: there is no in-process
//! locking anywhere above this layer. Any backend exposing list append, an
//! atomic move between two lists, remove-by-value, key-value get/put/delete,
//! and prefix enumeration can serve; the crate ships a durable
//! [`SledStore`] built on the `sled` embedded database and a
//! [`MemoryStore`] for tests and in-process embedding.

pub mod memory;
pub mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

use crate::utils::error::Result;

/// Minimal storage contract the queue protocol needs.
///
/// Lists are ordered; `list_append` pushes to the tail and [`list_move`]
/// pops from the head, so a list used with only these two operations is
/// FIFO. `list_move` is the one primitive that must be atomic across two
/// keys: it is what prevents two consumers from claiming the same message.
///
/// [`list_move`]: KeyStore::list_move
pub trait KeyStore: Send + Sync {
    /// Append `value` to the tail of the list at `key`, creating the list
    /// if it does not exist.
    fn list_append(&self, key: &str, value: &str) -> Result<()>;

    /// Atomically pop the head of the list at `src` and append it to the
    /// tail of the list at `dst`. Returns the moved value, or `None` when
    /// `src` is empty or absent. The popped list stays in place (empty)
    /// rather than being deleted.
    fn list_move(&self, src: &str, dst: &str) -> Result<Option<String>>;

    /// Remove the first occurrence of `value` from the list at `key`.
    /// Returns whether an element was removed.
    fn list_remove(&self, key: &str, value: &str) -> Result<bool>;

    /// All values in the list at `key`, head first. An absent list reads
    /// as empty.
    fn list_range(&self, key: &str) -> Result<Vec<String>>;

    /// Store a value blob at `key`, replacing any previous value.
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Fetch the value blob at `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete whatever is at `key` (value or list). Returns whether the
    /// key existed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// All keys starting with `prefix`, in lexicographic order.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Shared handles coordinate through the same underlying store, so an
/// `Arc<S>` is itself a store. This lets one process hand the same backend
/// to a producer, a consumer, and a harvester.
impl<S: KeyStore + ?Sized> KeyStore for std::sync::Arc<S> {
    fn list_append(&self, key: &str, value: &str) -> Result<()> {
        (**self).list_append(key, value)
    }

    fn list_move(&self, src: &str, dst: &str) -> Result<Option<String>> {
        (**self).list_move(src, dst)
    }

    fn list_remove(&self, key: &str, value: &str) -> Result<bool> {
        (**self).list_remove(key, value)
    }

    fn list_range(&self, key: &str) -> Result<Vec<String>> {
        (**self).list_range(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).scan_prefix(prefix)
    }
}
