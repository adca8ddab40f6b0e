use std::thread;
use std::time::Duration;

use tracing::debug;

use super::engine::Queue;
use crate::persistence::KeyStore;
use crate::utils::error::Result;

/// Operator-side sweep runner.
///
/// The queue protocol has no lease timestamps, so abandoned messages come
/// back only when someone runs a harvest. A `Harvester` packages that
/// decision: either a single [`run_once`](Harvester::run_once) sweep, or
/// [`watch`](Harvester::watch), which sweeps a topic on a fixed interval
/// until the process is stopped or the store becomes unreachable.
#[derive(Debug)]
pub struct Harvester<S: KeyStore> {
    queue: Queue<S>,
    interval: Duration,
}

impl<S: KeyStore> Harvester<S> {
    pub fn new(queue: Queue<S>, interval: Duration) -> Self {
        Self { queue, interval }
    }

    /// One sweep of `topic`; returns the recovered message ids.
    pub fn run_once(&self, topic: &str) -> Result<Vec<String>> {
        self.queue.harvest(topic)
    }

    /// Sweeps `topic` every interval. Only a store error returns; an empty
    /// nextlog is a normal quiet pass.
    pub fn watch(&self, topic: &str) -> Result<()> {
        loop {
            let recovered = self.run_once(topic)?;
            debug!(topic, count = recovered.len(), "harvest pass finished");
            thread::sleep(self.interval);
        }
    }
}
