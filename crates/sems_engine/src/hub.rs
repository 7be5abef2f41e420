use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

/// Identifier of one live connection.
pub type SubscriberId = Uuid;

/// Per-station set of live subscribers.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionHub {
    stations: Arc<Mutex<HashMap<String, HashSet<SubscriberId>>>>,
}

impl SubscriptionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `subscriber` to `station_id`. Subscribing twice is a no-op.
    pub fn subscribe(&self, station_id: &str, subscriber: SubscriberId) {
        let mut stations = self.stations.lock().unwrap_or_else(PoisonError::into_inner);
        stations
            .entry(station_id.to_string())
            .or_default()
            .insert(subscriber);
    }

    /// Remove `subscriber` from `station_id`. Removing a non-member is a no-op.
    pub fn unsubscribe(&self, station_id: &str, subscriber: SubscriberId) {
        let mut stations = self.stations.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(subscribers) = stations.get_mut(station_id) {
            subscribers.remove(&subscriber);
            if subscribers.is_empty() {
                stations.remove(station_id);
            }
        }
    }

    /// Register a new connection and return a guard that leaves the hub
    /// when dropped.
    pub fn join(&self, station_id: &str) -> Subscription {
        let id = Uuid::new_v4();
        self.subscribe(station_id, id);
        Subscription {
            hub: self.clone(),
            station_id: station_id.to_string(),
            id,
        }
    }

    pub fn subscriber_count(&self, station_id: &str) -> usize {
        self.stations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(station_id)
            .map_or(0, HashSet::len)
    }

    pub fn is_subscribed(&self, station_id: &str, subscriber: SubscriberId) -> bool {
        self.stations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(station_id)
            .is_some_and(|subscribers| subscribers.contains(&subscriber))
    }
}

/// Membership of one connection in the hub.
#[derive(Debug)]
pub struct Subscription {
    hub: SubscriptionHub,
    station_id: String,
    id: SubscriberId,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(&self.station_id, self.id);
    }
}
