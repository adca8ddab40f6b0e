//! Store key layout.
//!
//! Every key the queue writes is namespaced and documented so operators can
//! inspect state with generic store tools:
//!
//! - `ns:topic:backlog` - JSON list of pending message ids, oldest first
//! - `ns:topic:nextlog` - JSON list of claimed-but-uncommitted ids
//! - `ns:topic:message:<id>` - JSON-encoded message payload

/// A topic is a plain ASCII-alphanumeric name; `-` and `_` are allowed so
/// topics like `ndvi-tiles` work. Anything else would collide with the
/// `:`-delimited key layout.
pub fn is_valid_topic(topic: &str) -> bool {
    !topic.is_empty()
        && topic
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn backlog_key(ns: &str, topic: &str) -> String {
    format!("{ns}:{topic}:backlog")
}

pub fn nextlog_key(ns: &str, topic: &str) -> String {
    format!("{ns}:{topic}:nextlog")
}

pub fn message_key(ns: &str, topic: &str, id: &str) -> String {
    format!("{ns}:{topic}:message:{id}")
}

/// Prefix under which all of a topic's payloads live.
pub fn message_prefix(ns: &str, topic: &str) -> String {
    format!("{ns}:{topic}:message:")
}

/// Prefix under which every key of the namespace lives.
pub fn namespace_prefix(ns: &str) -> String {
    format!("{ns}:")
}

/// Extracts the topic from a backlog or nextlog key in `ns`. Message keys
/// and foreign keys yield `None`; a topic is listed through its list keys,
/// which persist (empty) until the topic is purged.
pub fn topic_of_key<'a>(ns: &str, key: &'a str) -> Option<&'a str> {
    let rest = key.strip_prefix(ns)?.strip_prefix(':')?;
    let (topic, kind) = rest.split_once(':')?;
    match kind {
        "backlog" | "nextlog" => Some(topic),
        _ => None,
    }
}
