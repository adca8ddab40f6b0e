use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use tempfile::tempdir;

use super::engine::{Queue, QueueKind};
use super::keys;
use crate::persistence::{KeyStore, MemoryStore, SledStore};
use crate::utils::error::Error;

fn create_test_queue() -> Queue<MemoryStore> {
    Queue::new(MemoryStore::new(), "rfq")
}

fn payload(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_publish_appends_to_backlog_in_order() {
    let queue = create_test_queue();
    let id1 = queue.publish("jobs", payload(&[("n", "1")])).unwrap();
    let id2 = queue.publish("jobs", payload(&[("n", "2")])).unwrap();

    assert_ne!(id1, id2);
    assert_eq!(queue.list_queue("jobs", QueueKind::Backlog).unwrap(), vec![id1, id2]);
    assert_eq!(queue.list_queue("jobs", QueueKind::Nextlog).unwrap(), Vec::<String>::new());
    assert_eq!(queue.list_topics().unwrap(), vec!["jobs"]);
}

#[test]
fn test_publish_rejects_invalid_topic() {
    let queue = create_test_queue();
    let err = queue.publish("bad topic!", payload(&[])).unwrap_err();
    assert!(matches!(err, Error::InvalidTopic(_)));
    let err = queue.claim("a:b").unwrap_err();
    assert!(matches!(err, Error::InvalidTopic(_)));
}

#[test]
fn test_claim_moves_id_to_nextlog() {
    let queue = create_test_queue();
    let id = queue.publish("jobs", payload(&[("tile", "T32UNE")])).unwrap();

    let msg = queue.claim("jobs").unwrap().unwrap();
    assert_eq!(msg.id, id);
    assert_eq!(msg.topic, "jobs");
    assert_eq!(msg.payload.get("tile").map(String::as_str), Some("T32UNE"));

    // the id is in exactly one of the two lists
    assert_eq!(queue.list_queue("jobs", QueueKind::Backlog).unwrap(), Vec::<String>::new());
    assert_eq!(queue.list_queue("jobs", QueueKind::Nextlog).unwrap(), vec![id]);
}

#[test]
fn test_claim_on_empty_backlog_returns_none() {
    let queue = create_test_queue();
    assert!(queue.claim("jobs").unwrap().is_none());

    let id = queue.publish("jobs", payload(&[])).unwrap();
    queue.claim("jobs").unwrap().unwrap();
    queue.commit("jobs", &id).unwrap();
    assert!(queue.claim("jobs").unwrap().is_none());
}

#[test]
fn test_claims_preserve_fifo_order() {
    let queue = create_test_queue();
    let mut published = Vec::new();
    for n in 0..5 {
        published.push(queue.publish("jobs", payload(&[("n", &n.to_string())])).unwrap());
    }

    let mut claimed = Vec::new();
    while let Some(msg) = queue.claim("jobs").unwrap() {
        claimed.push(msg.id);
    }
    assert_eq!(claimed, published);
}

#[test]
fn test_commit_removes_lease_and_payload() {
    let store = Arc::new(MemoryStore::new());
    let queue = Queue::new(Arc::clone(&store), "rfq");
    let id = queue.publish("jobs", payload(&[("k", "v")])).unwrap();
    queue.claim("jobs").unwrap().unwrap();
    queue.commit("jobs", &id).unwrap();

    assert_eq!(queue.list_queue("jobs", QueueKind::Nextlog).unwrap(), Vec::<String>::new());
    assert_eq!(store.get(&keys::message_key("rfq", "jobs", &id)).unwrap(), None);
    // harvesting afterwards finds nothing to recover
    assert_eq!(queue.harvest("jobs").unwrap(), Vec::<String>::new());
}

#[test]
fn test_commit_is_idempotent() {
    let queue = create_test_queue();
    let id = queue.publish("jobs", payload(&[])).unwrap();
    queue.claim("jobs").unwrap().unwrap();

    queue.commit("jobs", &id).unwrap();
    queue.commit("jobs", &id).unwrap();
    queue.commit("jobs", "never-published").unwrap();

    assert_eq!(queue.list_queue("jobs", QueueKind::Nextlog).unwrap(), Vec::<String>::new());
}

#[test]
fn test_commit_on_backlogged_message_is_a_noop() {
    let queue = create_test_queue();
    let id = queue.publish("jobs", payload(&[("k", "v")])).unwrap();

    // not leased yet, so the commit must not touch it
    queue.commit("jobs", &id).unwrap();
    assert_eq!(queue.list_queue("jobs", QueueKind::Backlog).unwrap(), vec![id.clone()]);

    // and its payload must still be claimable
    let msg = queue.claim("jobs").unwrap().unwrap();
    assert_eq!(msg.id, id);
    assert_eq!(msg.payload.get("k").map(String::as_str), Some("v"));
}

#[test]
fn test_harvest_restores_abandoned_leases() {
    let queue = create_test_queue();
    let id1 = queue.publish("jobs", payload(&[("n", "1")])).unwrap();
    let id2 = queue.publish("jobs", payload(&[("n", "2")])).unwrap();
    queue.claim("jobs").unwrap().unwrap();
    queue.claim("jobs").unwrap().unwrap();

    // consumer crashed before committing either message
    let recovered = queue.harvest("jobs").unwrap();
    assert_eq!(recovered, vec![id1.clone(), id2.clone()]);
    assert_eq!(queue.list_queue("jobs", QueueKind::Backlog).unwrap(), vec![id1.clone(), id2]);
    assert_eq!(queue.list_queue("jobs", QueueKind::Nextlog).unwrap(), Vec::<String>::new());

    // recovered messages are claimable again, oldest lease first
    let msg = queue.claim("jobs").unwrap().unwrap();
    assert_eq!(msg.id, id1);
}

#[test]
fn test_harvest_on_empty_nextlog_is_a_noop() {
    let queue = create_test_queue();
    assert_eq!(queue.harvest("jobs").unwrap(), Vec::<String>::new());
    queue.publish("jobs", payload(&[])).unwrap();
    assert_eq!(queue.harvest("jobs").unwrap(), Vec::<String>::new());
}

#[test]
fn test_purge_queue_drops_everything() {
    let queue = create_test_queue();
    queue.publish("jobs", payload(&[("n", "1")])).unwrap();
    queue.publish("jobs", payload(&[("n", "2")])).unwrap();
    queue.publish("other", payload(&[])).unwrap();
    queue.claim("jobs").unwrap().unwrap();

    let count = queue.purge_queue("jobs").unwrap();
    assert_eq!(count, 2);
    assert_eq!(queue.list_topics().unwrap(), vec!["other"]);
    assert!(queue.claim("jobs").unwrap().is_none());
}

#[test]
fn test_topics_survive_draining_but_not_purge() {
    let queue = create_test_queue();
    let id = queue.publish("jobs", payload(&[])).unwrap();
    queue.claim("jobs").unwrap().unwrap();
    queue.commit("jobs", &id).unwrap();

    // fully drained topics stay listed; only purge removes them
    assert_eq!(queue.list_topics().unwrap(), vec!["jobs"]);
    queue.purge_queue("jobs").unwrap();
    assert_eq!(queue.list_topics().unwrap(), Vec::<String>::new());
}

#[test]
fn test_concurrent_claims_never_share_a_message() {
    let queue = Arc::new(create_test_queue());
    let mut published = Vec::new();
    for n in 0..40 {
        published.push(queue.publish("jobs", payload(&[("n", &n.to_string())])).unwrap());
    }

    let mut handles = Vec::new();
    for _ in 0..4 {
        let queue = Arc::clone(&queue);
        handles.push(thread::spawn(move || {
            let mut mine = Vec::new();
            while let Some(msg) = queue.claim("jobs").unwrap() {
                mine.push(msg.id);
            }
            mine
        }));
    }

    let mut claimed: Vec<String> = Vec::new();
    for handle in handles {
        claimed.extend(handle.join().unwrap());
    }
    claimed.sort();
    let mut expected = published.clone();
    expected.sort();
    assert_eq!(claimed, expected);
}

#[test]
fn test_queue_kind_parses_cli_names() {
    assert_eq!("backlog".parse::<QueueKind>().unwrap(), QueueKind::Backlog);
    assert_eq!("nextlog".parse::<QueueKind>().unwrap(), QueueKind::Nextlog);
    assert!("sidelog".parse::<QueueKind>().is_err());
}

#[test]
fn test_key_layout() {
    assert_eq!(keys::backlog_key("rfq", "ndvi"), "rfq:ndvi:backlog");
    assert_eq!(keys::nextlog_key("rfq", "ndvi"), "rfq:ndvi:nextlog");
    assert_eq!(keys::message_key("rfq", "ndvi", "eeba0c16"), "rfq:ndvi:message:eeba0c16");
    assert_eq!(keys::topic_of_key("rfq", "rfq:ndvi:backlog"), Some("ndvi"));
    assert_eq!(keys::topic_of_key("rfq", "rfq:ndvi:message:eeba0c16"), None);
    assert_eq!(keys::topic_of_key("rfq", "other:ndvi:backlog"), None);
    assert!(keys::is_valid_topic("ndvi-tiles_2"));
    assert!(!keys::is_valid_topic(""));
    assert!(!keys::is_valid_topic("a b"));
}

// The scenario from the operator docs, run against the durable store: a
// message is published, claimed, abandoned by a crashing consumer,
// harvested, reclaimed, and finally committed.
#[test]
fn test_lifecycle_with_crash_recovery_on_sled() {
    let dir = tempdir().unwrap();
    let store = SledStore::open(dir.path()).unwrap();
    let queue = Queue::new(store.clone(), "rfq");

    let id = queue.publish("ndvi", payload(&[("tile", "T32UNE")])).unwrap();
    assert_eq!(queue.list_queue("ndvi", QueueKind::Backlog).unwrap(), vec![id.clone()]);

    // first consumer claims the message, then crashes before committing
    let msg = queue.claim("ndvi").unwrap().unwrap();
    assert_eq!(msg.id, id);
    assert_eq!(queue.list_queue("ndvi", QueueKind::Nextlog).unwrap(), vec![id.clone()]);

    let recovered = queue.harvest("ndvi").unwrap();
    assert_eq!(recovered, vec![id.clone()]);

    // second consumer picks it up and finishes the job
    let msg = queue.claim("ndvi").unwrap().unwrap();
    assert_eq!(msg.payload.get("tile").map(String::as_str), Some("T32UNE"));
    queue.commit("ndvi", &msg.id).unwrap();

    assert_eq!(queue.list_queue("ndvi", QueueKind::Backlog).unwrap(), Vec::<String>::new());
    assert_eq!(queue.list_queue("ndvi", QueueKind::Nextlog).unwrap(), Vec::<String>::new());
    // payload is gone from the store
    assert_eq!(store.get(&keys::message_key("rfq", "ndvi", &id)).unwrap(), None);
}
