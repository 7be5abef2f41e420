//! Live update engine: ties the station registry to the subscriber loops.

mod broadcast;
mod clock;
mod hub;

use std::sync::Arc;
use std::time::Duration;

use sems_core::{Action, StationRegistry, StationSnapshot};

pub use crate::broadcast::{PushError, SnapshotSink, encode_snapshot};
pub use crate::clock::TickClock;
pub use crate::hub::{SubscriberId, Subscription, SubscriptionHub};

/// Default live update cadence.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Shared handle on the station registry, the subscriber hub and the tick
/// grid. Cloning is cheap; every clone sees the same stations.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<StationRegistry>,
    hub: SubscriptionHub,
    clock: TickClock,
}

impl Engine {
    pub fn new(tick_interval: Duration) -> Self {
        Engine {
            registry: Arc::new(StationRegistry::new()),
            hub: SubscriptionHub::new(),
            clock: TickClock::new(tick_interval),
        }
    }

    pub fn registry(&self) -> &StationRegistry {
        &self.registry
    }

    pub fn hub(&self) -> &SubscriptionHub {
        &self.hub
    }

    pub fn clock(&self) -> TickClock {
        self.clock
    }

    /// Current snapshot of a station, creating it if unknown.
    pub fn status(&self, station_id: &str) -> StationSnapshot {
        self.registry.snapshot(station_id)
    }

    /// Apply a start/stop command and return the resulting snapshot.
    pub fn command(
        &self,
        station_id: &str,
        action: &Action,
        limit_kw: Option<f64>,
    ) -> StationSnapshot {
        self.registry.apply(station_id, action, limit_kw)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(DEFAULT_TICK_INTERVAL)
    }
}
