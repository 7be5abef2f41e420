use std::time::Duration;

use crate::{ChargeStatus, StationRegistry, StationSnapshot, StationState};

/// Charge rate used when no limit has been commanded, in kW.
pub const DEFAULT_CHARGE_RATE_KW: f64 = 7.0;

impl StationState {
    /// Advance the simulated telemetry by one interval.
    ///
    /// Power is held constant over the whole interval, so the energy
    /// increment is `power * seconds / 3600`. Stations that are not charging
    /// are left untouched.
    pub fn tick(&mut self, interval: Duration) {
        if self.status != ChargeStatus::Charging {
            return;
        }
        let power = self
            .limit_kw
            .filter(|limit| *limit > 0.0)
            .unwrap_or(DEFAULT_CHARGE_RATE_KW);
        self.power_kw = power;
        self.energy_kwh += power * interval.as_secs_f64() / 3600.0;
    }

    /// Tick for interval `tick_index`, unless that interval was already
    /// evaluated. Returns whether the simulator ran.
    pub fn tick_once(&mut self, tick_index: u64, interval: Duration) -> bool {
        if self.last_tick.is_some_and(|last| last >= tick_index) {
            return false;
        }
        self.last_tick = Some(tick_index);
        self.tick(interval);
        true
    }
}

impl StationRegistry {
    /// Run the simulator for `station_id` at `tick_index` and return the
    /// resulting snapshot, both under the station lock.
    pub fn advance(&self, station_id: &str, tick_index: u64, interval: Duration) -> StationSnapshot {
        let handle = self.get_or_create(station_id);
        let mut state = handle.lock();
        if state.tick_once(tick_index, interval) && state.status == ChargeStatus::Charging {
            tracing::trace!(
                "Station {} tick {}: {} kW, {:.6} kWh",
                station_id,
                tick_index,
                state.power_kw,
                state.energy_kwh
            );
        }
        state.snapshot(station_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Action;

    const SECOND: Duration = Duration::from_secs(1);

    fn charging(limit_kw: Option<f64>) -> StationState {
        let mut state = StationState::default();
        state.apply_command(&Action::Start, limit_kw);
        state
    }

    #[test]
    fn test_tick_uses_default_rate_without_limit() {
        let mut state = charging(None);
        state.tick(SECOND);

        assert_eq!(state.power_kw(), 7.0);
        assert_eq!(state.energy_kwh(), 7.0 / 3600.0);
    }

    #[test]
    fn test_tick_uses_commanded_limit() {
        let mut state = charging(Some(11.0));
        state.tick(SECOND);

        assert_eq!(state.power_kw(), 11.0);
        assert_eq!(state.energy_kwh(), 11.0 / 3600.0);
    }

    #[test]
    fn test_tick_scales_with_interval() {
        let mut state = charging(Some(36.0));
        state.tick(Duration::from_millis(500));
        assert!((state.energy_kwh() - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_tick_does_not_store_fallback_limit() {
        let mut state = charging(None);
        state.tick(SECOND);
        assert_eq!(state.limit_kw(), None);
    }

    #[test]
    fn test_tick_ignores_idle_and_stopped() {
        let mut idle = StationState::default();
        idle.tick(SECOND);
        assert_eq!(idle, StationState::default());

        let mut stopped = charging(Some(11.0));
        stopped.tick(SECOND);
        stopped.apply_command(&Action::Stop, None);
        let energy = stopped.energy_kwh();
        stopped.tick(SECOND);
        stopped.tick(SECOND);

        assert_eq!(stopped.power_kw(), 0.0);
        assert_eq!(stopped.energy_kwh(), energy);
    }

    #[test]
    fn test_sticky_limit_across_stop_start() {
        let mut state = charging(Some(11.0));
        state.tick(SECOND);
        state.apply_command(&Action::Stop, None);
        state.apply_command(&Action::Start, None);
        state.tick(SECOND);

        assert_eq!(state.power_kw(), 11.0);
        assert_eq!(state.energy_kwh(), 2.0 * (11.0 / 3600.0));
    }

    #[test]
    fn test_energy_is_monotonic_while_charging() {
        let mut state = charging(None);
        let mut last = state.energy_kwh();
        for i in 0..100 {
            if i == 40 {
                state.apply_command(&Action::Start, Some(50.0));
            }
            state.tick(SECOND);
            assert!(state.energy_kwh() >= last);
            last = state.energy_kwh();
        }
    }

    #[test]
    fn test_tick_once_per_index() {
        let mut state = charging(None);

        assert!(state.tick_once(1, SECOND));
        assert!(!state.tick_once(1, SECOND));
        assert!(!state.tick_once(0, SECOND));
        assert_eq!(state.energy_kwh(), 7.0 / 3600.0);

        assert!(state.tick_once(2, SECOND));
        assert_eq!(state.energy_kwh(), 2.0 * (7.0 / 3600.0));
    }

    #[test]
    fn test_advance_accrues_once_per_interval() {
        let registry = StationRegistry::new();
        registry.apply("CP001", &Action::Start, None);

        let snapshots: Vec<_> = (0..5)
            .map(|_| registry.advance("CP001", 1, SECOND))
            .collect();

        assert!(snapshots.iter().all(|s| s.energy_kwh == 7.0 / 3600.0));
        assert!(snapshots.iter().all(|s| s.power_kw == 7.0));
    }
}
