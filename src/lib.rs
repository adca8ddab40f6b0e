//! # rfq
//!
//! `rfq` is a minimalist reliable FIFO work queue built with Rust.
//! Messages are published to named topics and delivered at-least-once:
//! a consumer claims a message (atomically moving it from the topic's
//! backlog to its lease log), processes it, and commits it. Messages
//! abandoned by a crashed consumer stay in the lease log until a
//! harvest sweep returns them to the backlog for redelivery.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `queue`: The queue engine: publish, claim, commit, harvest, and introspection.
//! - `persistence`: The `KeyStore` abstraction and its sled-backed and in-memory implementations.
//! - `config`: Handles loading and managing configuration from file and environment.
//! - `utils`: Contains shared utilities, such as error handling and logging setup.

pub mod config;
pub mod persistence;
pub mod queue;
pub mod utils;

pub use persistence::{KeyStore, MemoryStore, SledStore};
pub use queue::{Harvester, Message, Queue, QueueKind};
pub use utils::error::{Error, Result};
