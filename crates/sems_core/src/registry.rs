use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::{StationSnapshot, StationState};

/// Shared, individually locked record of one station.
#[derive(Debug, Clone, Default)]
pub struct StationHandle {
    state: Arc<Mutex<StationState>>,
}

impl StationHandle {
    /// Exclusive access to the station record.
    ///
    /// A poisoned lock still holds a consistent record: every mutation is a
    /// handful of field writes that cannot panic halfway.
    pub fn lock(&self) -> MutexGuard<'_, StationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn same_station(&self, other: &StationHandle) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

/// Station id to record mapping.
///
/// Records are created on first reference and never removed. The map lock
/// is only held to look up or insert a handle; all per-station work happens
/// under the handle's own lock so stations never contend with each other.
#[derive(Debug, Default)]
pub struct StationRegistry {
    stations: RwLock<HashMap<String, StationHandle>>,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the record for `station_id`, creating a default one if needed.
    pub fn get_or_create(&self, station_id: &str) -> StationHandle {
        {
            let stations = self.stations.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(handle) = stations.get(station_id) {
                return handle.clone();
            }
        }

        let mut stations = self
            .stations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        stations
            .entry(station_id.to_string())
            .or_insert_with(|| {
                tracing::info!("Registering station {}", station_id);
                StationHandle::default()
            })
            .clone()
    }

    /// Current snapshot of a station (create-on-read).
    pub fn snapshot(&self, station_id: &str) -> StationSnapshot {
        self.get_or_create(station_id).lock().snapshot(station_id)
    }

    pub fn len(&self) -> usize {
        self.stations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
