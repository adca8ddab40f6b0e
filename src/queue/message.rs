use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message payloads are flat string-to-string maps.
///
/// Keeping payloads flat (no nesting) makes the stored JSON unambiguous for
/// operators inspecting the store with generic tools.
pub type Payload = BTreeMap<String, String>;

/// A published message, as stored under `ns:topic:message:<id>`.
///
/// The id is a UUIDv7, so ids sort by publish time. `published_at` is the
/// Unix timestamp (in seconds) of the `publish` call. The payload lives in
/// the store from publish until a consumer commits the message, which
/// deletes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub topic: String,
    pub payload: Payload,
    pub published_at: i64,
}

impl Message {
    /// Builds a fresh message with a new time-sortable id and the current
    /// timestamp.
    pub fn new(topic: &str, payload: Payload) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            topic: topic.to_string(),
            payload,
            published_at: Utc::now().timestamp(),
        }
    }
}
