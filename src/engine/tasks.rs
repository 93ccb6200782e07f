// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Background jobs driving the engine.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::client::LightClient;
use crate::clock::Clock;
use crate::event::FeedEvent;

use super::Engine;

/// Handle to the engine's running jobs.
///
/// Dropping the handle leaves the jobs running until the token is cancelled;
/// call [`shutdown`](Self::shutdown) to stop them and wait for them to exit.
#[derive(Debug)]
pub struct EngineHandle {
    token: CancellationToken,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl EngineHandle {
    /// Returns the token that stops the jobs.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Returns the number of spawned jobs.
    #[must_use]
    pub fn job_count(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` once every job has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.tasks.iter().all(|(_, task)| task.is_finished())
    }

    /// Stops the jobs and waits for them to exit.
    ///
    /// Feed events already queued when shutdown starts are still applied.
    pub async fn shutdown(self) {
        self.token.cancel();
        for (job, task) in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(job, error = %e, "Engine job did not exit cleanly");
            }
        }
        tracing::debug!("Engine stopped");
    }
}

impl<C, K> Engine<C, K>
where
    C: LightClient + 'static,
    K: Clock + 'static,
{
    /// Starts the engine's jobs on the current tokio runtime.
    ///
    /// Spawns the feed consumer plus the adjustment and recovery jobs, and
    /// the liveness job when enabled in the configuration. All of them stop
    /// when `token` is cancelled.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(
        self: &Arc<Self>,
        feed: mpsc::Receiver<FeedEvent>,
        token: CancellationToken,
    ) -> EngineHandle {
        let period = self.config.tick_interval();
        let mut tasks = Vec::with_capacity(4);

        let engine = Arc::clone(self);
        tasks.push((
            "ingest",
            tokio::spawn(run_ingest(engine, feed, token.clone())),
        ));

        let engine = Arc::clone(self);
        tasks.push((
            "adjust",
            tokio::spawn(run_periodic("adjust", period, token.clone(), move || {
                engine.adjust_all();
            })),
        ));

        let engine = Arc::clone(self);
        tasks.push((
            "recover",
            tokio::spawn(run_periodic("recover", period, token.clone(), move || {
                engine.recover_all();
            })),
        ));

        if self.config.liveness_monitor {
            let engine = Arc::clone(self);
            tasks.push((
                "liveness",
                tokio::spawn(run_periodic("liveness", period, token.clone(), move || {
                    engine.check_liveness();
                })),
            ));
        }

        tracing::info!(jobs = tasks.len(), period = ?period, "Engine started");
        EngineHandle { token, tasks }
    }
}

/// Applies feed events until the feed closes or the token is cancelled.
async fn run_ingest<C: LightClient, K: Clock>(
    engine: Arc<Engine<C, K>>,
    mut feed: mpsc::Receiver<FeedEvent>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            event = feed.recv() => match event {
                Some(event) => {
                    engine.handle_feed_event(event);
                }
                None => {
                    tracing::debug!("Feed closed");
                    return;
                }
            },
        }
    }

    feed.close();
    let mut drained = 0_usize;
    while let Ok(event) = feed.try_recv() {
        engine.handle_feed_event(event);
        drained += 1;
    }
    tracing::debug!(drained, "Feed consumer stopped");
}

/// Runs `step` every `period` until the token is cancelled.
///
/// Ticks missed while a step runs long are skipped, so steps never overlap
/// or pile up.
async fn run_periodic<F>(job: &'static str, period: Duration, token: CancellationToken, mut step: F)
where
    F: FnMut() + Send + 'static,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            _ = interval.tick() => step(),
        }
    }
    tracing::debug!(job, "Periodic job stopped");
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use parking_lot::Mutex;

    use super::*;
    use crate::client::ColorCommand;
    use crate::clock::ManualClock;
    use crate::config::EngineConfig;
    use crate::device::DeviceAddress;
    use crate::error::ClientError;
    use crate::state::LightState;

    #[derive(Debug, Default)]
    struct CountingClient {
        commands: Mutex<usize>,
    }

    impl LightClient for CountingClient {
        fn current_state(&self, _address: &DeviceAddress) -> Option<LightState> {
            None
        }

        fn last_seen(&self, _address: &DeviceAddress) -> Option<DateTime<Utc>> {
            None
        }

        fn set_color(
            &self,
            _address: &DeviceAddress,
            _command: &ColorCommand,
        ) -> Result<(), ClientError> {
            *self.commands.lock() += 1;
            Ok(())
        }
    }

    fn engine(config: EngineConfig) -> Arc<Engine<Arc<CountingClient>, ManualClock>> {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap());
        Arc::new(Engine::with_clock(
            Arc::new(CountingClient::default()),
            clock,
            config,
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn spawns_liveness_only_when_enabled() {
        let (_tx, rx) = mpsc::channel(8);
        let handle = engine(EngineConfig::default()).spawn(rx, CancellationToken::new());
        assert_eq!(handle.job_count(), 3);
        handle.shutdown().await;

        let (_tx, rx) = mpsc::channel(8);
        let config = EngineConfig::default().with_liveness_monitor(true);
        let handle = engine(config).spawn(rx, CancellationToken::new());
        assert_eq!(handle.job_count(), 4);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn feed_events_reach_the_registry() {
        let engine = engine(EngineConfig::default());
        let (tx, rx) = mpsc::channel(8);
        let handle = engine.spawn(rx, CancellationToken::new());

        tx.send(FeedEvent::light("a", "Desk", LightState::new().with_brightness(16384).with_kelvin(5000)))
            .await
            .unwrap();
        tx.send(FeedEvent::Gateway {
            address: DeviceAddress::new("gw"),
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(engine.registry().len(), 1);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drains_queued_feed_events() {
        let engine = engine(EngineConfig::default());
        let (tx, rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let handle = engine.spawn(rx, token.clone());

        // Queue before the consumer gets a chance to run
        for a in ["a", "b", "c"] {
            tx.try_send(FeedEvent::light(a, a, LightState::new())).unwrap();
        }
        handle.shutdown().await;

        assert_eq!(engine.registry().len(), 3);
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn adjustment_job_runs_on_tick() {
        let engine = engine(EngineConfig::default());
        engine.observe(&DeviceAddress::new("a"), "Desk", LightState::new().with_brightness(1));

        let (_tx, rx) = mpsc::channel(8);
        let handle = engine.spawn(rx, CancellationToken::new());
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(*engine.client().commands.lock(), 1);
        assert!(!engine.registry().get(&DeviceAddress::new("a")).unwrap().is_controlled());

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn sub_millisecond_tick_still_adjusts() {
        for config in [
            EngineConfig::default().with_tick_interval(Duration::from_micros(500)),
            EngineConfig {
                tick_interval_ms: 0,
                ..EngineConfig::default()
            },
        ] {
            let engine = engine(config);
            engine.observe(&DeviceAddress::new("a"), "Desk", LightState::new().with_brightness(1));

            let (_tx, rx) = mpsc::channel(8);
            let handle = engine.spawn(rx, CancellationToken::new());
            tokio::time::sleep(Duration::from_millis(5)).await;

            assert_eq!(*engine.client().commands.lock(), 1);
            // A panicked job would already be finished
            assert!(handle.tasks.iter().all(|(_, task)| !task.is_finished()));
            handle.shutdown().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_token_stops_jobs() {
        let engine = engine(EngineConfig::default());
        let (_tx, rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let handle = engine.spawn(rx, token.clone());

        token.cancel();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.is_finished());
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn closed_feed_stops_only_the_consumer() {
        let engine = engine(EngineConfig::default());
        let (tx, rx) = mpsc::channel::<FeedEvent>(8);
        let handle = engine.spawn(rx, CancellationToken::new());

        drop(tx);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!handle.is_finished());
        handle.shutdown().await;
    }
}
