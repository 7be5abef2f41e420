use serde::{Deserialize, Serialize};

/// Lifecycle of a charging point.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChargeStatus {
    #[default]
    Idle,
    Charging,
    Stopped,
}

/// Command accepted by a station.
///
/// Anything that is not `start` or `stop` is kept as [`Action::Other`] and
/// applied as a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
    Other(String),
}

impl From<&str> for Action {
    fn from(value: &str) -> Self {
        match value {
            "start" => Action::Start,
            "stop" => Action::Stop,
            other => Action::Other(other.to_string()),
        }
    }
}

/// Mutable record of one station, owned by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct StationState {
    pub(crate) online: bool,
    pub(crate) status: ChargeStatus,
    pub(crate) power_kw: f64,
    pub(crate) energy_kwh: f64,
    pub(crate) limit_kw: Option<f64>,
    /// Index of the last interval the simulator has evaluated.
    pub(crate) last_tick: Option<u64>,
}

impl Default for StationState {
    fn default() -> Self {
        StationState {
            online: true,
            status: ChargeStatus::Idle,
            power_kw: 0.0,
            energy_kwh: 0.0,
            limit_kw: None,
            last_tick: None,
        }
    }
}

impl StationState {
    pub fn status(&self) -> ChargeStatus {
        self.status
    }

    pub fn power_kw(&self) -> f64 {
        self.power_kw
    }

    pub fn energy_kwh(&self) -> f64 {
        self.energy_kwh
    }

    pub fn limit_kw(&self) -> Option<f64> {
        self.limit_kw
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn snapshot(&self, station_id: &str) -> StationSnapshot {
        StationSnapshot {
            station_id: station_id.to_string(),
            status: self.status,
            power_kw: self.power_kw,
            energy_kwh: self.energy_kwh,
            online: self.online,
            limit_kw: self.limit_kw,
        }
    }
}

/// Point-in-time copy of a station, as returned to callers and pushed to
/// live subscribers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationSnapshot {
    pub station_id: String,
    pub status: ChargeStatus,
    #[serde(rename = "power_kW")]
    pub power_kw: f64,
    #[serde(rename = "energy_kWh")]
    pub energy_kwh: f64,
    pub online: bool,
    #[serde(rename = "limit_kW", default, skip_serializing_if = "Option::is_none")]
    pub limit_kw: Option<f64>,
}
