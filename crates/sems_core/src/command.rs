use crate::{Action, ChargeStatus, StationRegistry, StationSnapshot, StationState};

impl StationState {
    /// Apply a command to this record.
    ///
    /// `start` only overwrites the stored limit when a strictly positive one
    /// is given, so an earlier limit survives stop/start cycles. Unknown
    /// actions leave the record untouched.
    pub fn apply_command(&mut self, action: &Action, limit_kw: Option<f64>) {
        match action {
            Action::Start => {
                self.status = ChargeStatus::Charging;
                if let Some(limit) = limit_kw.filter(|limit| *limit > 0.0) {
                    self.limit_kw = Some(limit);
                }
            }
            Action::Stop => {
                self.status = ChargeStatus::Stopped;
                self.power_kw = 0.0;
            }
            Action::Other(_) => {}
        }
    }
}

impl StationRegistry {
    /// Apply a command to a station and return the resulting snapshot.
    pub fn apply(
        &self,
        station_id: &str,
        action: &Action,
        limit_kw: Option<f64>,
    ) -> StationSnapshot {
        match action {
            Action::Other(name) => {
                tracing::debug!("Ignoring action {:?} for station {}", name, station_id)
            }
            _ => tracing::info!(
                "Applying {:?} to station {} (limit {:?})",
                action,
                station_id,
                limit_kw
            ),
        }
        let handle = self.get_or_create(station_id);
        let mut state = handle.lock();
        state.apply_command(action, limit_kw);
        state.snapshot(station_id)
    }
}
