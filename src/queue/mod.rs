//! The `queue` module implements the reliable-queue protocol.
//!
//! Each topic keeps two lists in the store: a FIFO backlog of pending
//! message ids and a lease log (nextlog) of ids claimed by a consumer but
//! not yet committed. A claim atomically moves an id between the two, a
//! commit removes it and deletes its payload, and a harvest sweep returns
//! abandoned leases to the backlog for redelivery.

pub mod engine;
pub mod harvester;
pub mod keys;
pub mod message;

pub use engine::{Queue, QueueKind};
pub use harvester::Harvester;
pub use message::{Message, Payload};

#[cfg(test)]
mod tests;
