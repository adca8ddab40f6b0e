use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use super::keys;
use super::message::{Message, Payload};
use crate::persistence::KeyStore;
use crate::utils::error::{Error, Result};

/// Which of a topic's two lists to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    Backlog,
    Nextlog,
}

impl QueueKind {
    fn key(self, ns: &str, topic: &str) -> String {
        match self {
            QueueKind::Backlog => keys::backlog_key(ns, topic),
            QueueKind::Nextlog => keys::nextlog_key(ns, topic),
        }
    }
}

impl FromStr for QueueKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "backlog" => Ok(QueueKind::Backlog),
            "nextlog" => Ok(QueueKind::Nextlog),
            other => Err(format!("unknown queue kind {other:?}, expected backlog or nextlog")),
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueKind::Backlog => write!(f, "backlog"),
            QueueKind::Nextlog => write!(f, "nextlog"),
        }
    }
}

/// The queue engine: the context object producers, consumers, and the
/// harvester all go through.
///
/// A `Queue` is not a running process. It holds a store handle and a key
/// namespace, and every method is a thin protocol step over the store's
/// atomic primitives; any number of `Queue` values over the same store
/// coordinate correctly with no further locking. Per message the valid
/// transitions are:
///
/// `Published -> Backlogged -> Leased -> Committed`
///
/// with `Leased -> Backlogged` via [`harvest`](Queue::harvest) (redelivery)
/// and nothing else.
#[derive(Debug)]
pub struct Queue<S: KeyStore> {
    store: S,
    namespace: String,
}

impl<S: KeyStore> Queue<S> {
    pub fn new(store: S, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn check_topic(topic: &str) -> Result<()> {
        if keys::is_valid_topic(topic) {
            Ok(())
        } else {
            Err(Error::InvalidTopic(topic.to_string()))
        }
    }

    /// Stores the payload and appends the new message id to the topic's
    /// backlog, implicitly creating the topic. Returns the id.
    ///
    /// The payload is written before the id becomes visible, so a claimed
    /// id always has a stored payload.
    pub fn publish(&self, topic: &str, payload: Payload) -> Result<String> {
        Self::check_topic(topic)?;
        let msg = Message::new(topic, payload);
        let ns = &self.namespace;
        self.store
            .put(&keys::message_key(ns, topic, &msg.id), &serde_json::to_vec(&msg)?)?;
        self.store.list_append(&keys::backlog_key(ns, topic), &msg.id)?;
        debug!(topic, id = %msg.id, "published message");
        Ok(msg.id)
    }

    /// Claims the oldest backlogged message: one atomic store-level move of
    /// its id from the backlog to the nextlog, then a payload read.
    ///
    /// Returns `None` when the backlog is empty; this is an expected
    /// condition, not an error, and the call never blocks. The caller now
    /// owns the message until it either commits it or abandons it (crashes,
    /// gives up), in which case only a [`harvest`](Queue::harvest) makes the
    /// message claimable again.
    pub fn claim(&self, topic: &str) -> Result<Option<Message>> {
        Self::check_topic(topic)?;
        let ns = &self.namespace;
        let backlog = keys::backlog_key(ns, topic);
        let nextlog = keys::nextlog_key(ns, topic);
        let Some(id) = self.store.list_move(&backlog, &nextlog)? else {
            return Ok(None);
        };
        let key = keys::message_key(ns, topic, &id);
        let raw = self.store.get(&key)?.ok_or_else(|| Error::Corrupt {
            key: key.clone(),
            reason: "leased id has no stored payload".to_string(),
        })?;
        let msg: Message = serde_json::from_slice(&raw).map_err(|e| Error::Corrupt {
            key,
            reason: format!("message did not decode: {e}"),
        })?;
        debug!(topic, id = %msg.id, "claimed message");
        Ok(Some(msg))
    }

    /// Acknowledges a claimed message: removes its id from the nextlog and
    /// deletes its payload.
    ///
    /// Idempotent. Committing an id that is not currently leased (already
    /// committed, never published, or still backlogged) is a no-op, which
    /// keeps caller retries safe and refuses the `Backlogged -> Committed`
    /// shortcut.
    pub fn commit(&self, topic: &str, id: &str) -> Result<()> {
        Self::check_topic(topic)?;
        let ns = &self.namespace;
        let removed = self.store.list_remove(&keys::nextlog_key(ns, topic), id)?;
        if removed {
            self.store.delete(&keys::message_key(ns, topic, id))?;
            debug!(topic, id, "committed message");
        } else {
            debug!(topic, id, "commit was a no-op, id not leased");
        }
        Ok(())
    }

    /// Returns every abandoned lease to the backlog and reports the
    /// recovered ids, oldest lease first.
    ///
    /// Each id moves through the same atomic primitive `claim` uses, so a
    /// concurrent consumer can never observe an id in both lists. An empty
    /// nextlog harvests to an empty list. There are no lease timestamps:
    /// a lease is abandoned exactly when the operator decides it is, by
    /// running the harvest.
    pub fn harvest(&self, topic: &str) -> Result<Vec<String>> {
        Self::check_topic(topic)?;
        let ns = &self.namespace;
        let backlog = keys::backlog_key(ns, topic);
        let nextlog = keys::nextlog_key(ns, topic);
        let mut recovered = Vec::new();
        while let Some(id) = self.store.list_move(&nextlog, &backlog)? {
            recovered.push(id);
        }
        if !recovered.is_empty() {
            info!(topic, count = recovered.len(), "harvested abandoned leases");
        }
        Ok(recovered)
    }

    /// Every topic with queue state in the namespace, sorted.
    pub fn list_topics(&self) -> Result<Vec<String>> {
        let prefix = keys::namespace_prefix(&self.namespace);
        let mut topics = BTreeSet::new();
        for key in self.store.scan_prefix(&prefix)? {
            if let Some(topic) = keys::topic_of_key(&self.namespace, &key) {
                topics.insert(topic.to_string());
            }
        }
        Ok(topics.into_iter().collect())
    }

    /// The message ids currently in one of the topic's lists, head first.
    pub fn list_queue(&self, topic: &str, kind: QueueKind) -> Result<Vec<String>> {
        Self::check_topic(topic)?;
        self.store.list_range(&kind.key(&self.namespace, topic))
    }

    /// Drops the topic entirely: both lists, every stored payload (including
    /// orphans left by interrupted commits). Returns how many message ids
    /// were dropped from the two lists.
    pub fn purge_queue(&self, topic: &str) -> Result<usize> {
        Self::check_topic(topic)?;
        let ns = &self.namespace;
        let backlog = keys::backlog_key(ns, topic);
        let nextlog = keys::nextlog_key(ns, topic);

        let mut count = 0;
        for list_key in [&backlog, &nextlog] {
            count += self.store.list_range(list_key)?.len();
        }
        for payload_key in self.store.scan_prefix(&keys::message_prefix(ns, topic))? {
            self.store.delete(&payload_key)?;
        }
        self.store.delete(&backlog)?;
        self.store.delete(&nextlog)?;
        info!(topic, count, "purged queue");
        Ok(count)
    }
}
