//! Per-subscriber live update loop.
//!
//! Each connection runs its own loop on the shared tick grid. The first loop
//! to reach a boundary advances the station's telemetry; the others read the
//! already advanced record, so the number of subscribers never changes how
//! much energy is accrued.

use std::future::Future;

use sems_core::StationSnapshot;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::Engine;

#[derive(Error, Debug)]
pub enum PushError {
    #[error("subscriber is disconnected")]
    Disconnected,
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination of live snapshots for one subscriber.
///
/// A failed push ends the subscriber's loop; there are no retries.
pub trait SnapshotSink: Send {
    fn push(
        &mut self,
        snapshot: StationSnapshot,
    ) -> impl Future<Output = Result<(), PushError>> + Send;
}

impl SnapshotSink for mpsc::Sender<StationSnapshot> {
    async fn push(&mut self, snapshot: StationSnapshot) -> Result<(), PushError> {
        self.send(snapshot)
            .await
            .map_err(|_| PushError::Disconnected)
    }
}

/// JSON text frame for a snapshot.
pub fn encode_snapshot(snapshot: &StationSnapshot) -> Result<String, PushError> {
    Ok(serde_json::to_string(snapshot)?)
}

impl Engine {
    /// Stream snapshots of `station_id` into `sink` until the sink fails or
    /// `closed` resolves.
    ///
    /// The subscriber is registered with the hub for the lifetime of the
    /// call. A snapshot of the current state is pushed right away, then one
    /// per tick.
    pub async fn run_subscriber<S, C>(&self, station_id: &str, mut sink: S, closed: C)
    where
        S: SnapshotSink,
        C: Future<Output = ()>,
    {
        let subscription = self.hub().join(station_id);
        let subscriber = subscription.id();
        info!(
            "Subscriber {} joined station {} ({} live)",
            subscriber,
            station_id,
            self.hub().subscriber_count(station_id)
        );
        tokio::pin!(closed);

        let clock = self.clock();
        let mut ticker = time::interval_at(clock.next_boundary(Instant::now()), clock.period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut pending = Some(self.status(station_id));
        loop {
            if let Some(snapshot) = pending.take() {
                if let Err(error) = sink.push(snapshot).await {
                    debug!("Push to subscriber {} failed: {}", subscriber, error);
                    break;
                }
            }

            tokio::select! {
                deadline = ticker.tick() => {
                    let index = clock.index_at(deadline);
                    pending = Some(self.registry().advance(station_id, index, clock.period()));
                }
                () = &mut closed => {
                    debug!("Subscriber {} closed the connection", subscriber);
                    break;
                }
            }
        }

        drop(subscription);
        info!(
            "Subscriber {} left station {} ({} live)",
            subscriber,
            station_id,
            self.hub().subscriber_count(station_id)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sems_core::{Action, ChargeStatus};
    use std::future;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;

    const SECOND: Duration = Duration::from_secs(1);
    const TICK_KWH: f64 = 7.0 / 3600.0;

    fn spawn_subscriber(
        engine: &Engine,
        station_id: &str,
    ) -> (mpsc::Receiver<StationSnapshot>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(16);
        let engine = engine.clone();
        let station_id = station_id.to_string();
        let task = tokio::spawn(async move {
            engine
                .run_subscriber(&station_id, tx, future::pending())
                .await
        });
        (rx, task)
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_snapshot_is_pushed_immediately() {
        let engine = Engine::new(SECOND);
        let (mut rx, _task) = spawn_subscriber(&engine, "CP001");

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.station_id, "CP001");
        assert_eq!(snapshot.status, ChargeStatus::Idle);
        assert_eq!(snapshot.energy_kwh, 0.0);
        assert_eq!(engine.hub().subscriber_count("CP001"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_charging_station_streams_telemetry() {
        let engine = Engine::new(SECOND);
        engine.command("CP001", &Action::Start, None);
        let (mut rx, _task) = spawn_subscriber(&engine, "CP001");

        let initial = rx.recv().await.unwrap();
        assert_eq!(initial.energy_kwh, 0.0);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.power_kw, 7.0);
        assert_eq!(first.energy_kwh, TICK_KWH);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.energy_kwh, TICK_KWH + TICK_KWH);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fan_out_accrues_once_per_interval() {
        let engine = Engine::new(SECOND);
        engine.command("CP001", &Action::Start, None);

        let mut receivers: Vec<_> = (0..4)
            .map(|_| spawn_subscriber(&engine, "CP001").0)
            .collect();
        for rx in receivers.iter_mut() {
            rx.recv().await.unwrap();
        }
        assert_eq!(engine.hub().subscriber_count("CP001"), 4);

        for rx in receivers.iter_mut() {
            let snapshot = rx.recv().await.unwrap();
            assert_eq!(snapshot.energy_kwh, TICK_KWH);
        }
        assert_eq!(engine.status("CP001").energy_kwh, TICK_KWH);

        for _ in 0..2 {
            for rx in receivers.iter_mut() {
                rx.recv().await.unwrap();
            }
        }
        let energy = engine.status("CP001").energy_kwh;
        assert!((energy - 3.0 * TICK_KWH).abs() < 1e-12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_takes_effect_on_next_push() {
        let engine = Engine::new(SECOND);
        engine.command("CP001", &Action::Start, Some(11.0));
        let (mut rx, _task) = spawn_subscriber(&engine, "CP001");

        rx.recv().await.unwrap();
        let charged = rx.recv().await.unwrap();
        assert_eq!(charged.power_kw, 11.0);

        let stopped = engine.command("CP001", &Action::Stop, None);
        assert_eq!(stopped.power_kw, 0.0);

        let next = rx.recv().await.unwrap();
        assert_eq!(next.status, ChargeStatus::Stopped);
        assert_eq!(next.power_kw, 0.0);
        assert_eq!(next.energy_kwh, charged.energy_kwh);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_leaves_other_subscribers_running() {
        let engine = Engine::new(SECOND);
        engine.command("CP001", &Action::Start, None);
        let (mut gone, gone_task) = spawn_subscriber(&engine, "CP001");
        let (mut stays, _task) = spawn_subscriber(&engine, "CP001");

        gone.recv().await.unwrap();
        stays.recv().await.unwrap();
        assert_eq!(engine.hub().subscriber_count("CP001"), 2);

        drop(gone);
        stays.recv().await.unwrap();
        gone_task.await.unwrap();
        assert_eq!(engine.hub().subscriber_count("CP001"), 1);

        let later = stays.recv().await.unwrap();
        assert!((later.energy_kwh - 2.0 * TICK_KWH).abs() < 1e-12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_signal_ends_loop() {
        let engine = Engine::new(SECOND);
        let (tx, mut rx) = mpsc::channel(16);
        let (close_tx, close_rx) = oneshot::channel::<()>();

        let task = {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine
                    .run_subscriber("CP001", tx, async move {
                        let _ = close_rx.await;
                    })
                    .await
            })
        };

        rx.recv().await.unwrap();
        close_tx.send(()).unwrap();
        task.await.unwrap();

        assert_eq!(engine.hub().subscriber_count("CP001"), 0);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_encode_snapshot() {
        let engine = Engine::new(SECOND);
        let json = encode_snapshot(&engine.status("CP-9")).unwrap();
        assert!(json.contains("\"station_id\":\"CP-9\""));
        assert!(json.contains("\"power_kW\":0.0"));
    }
}
