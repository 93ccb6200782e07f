// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The reconciliation engine.
//!
//! The [`Engine`] ties together the registry, the schedule, the device
//! client and the clock. Its operations are synchronous and can be called
//! directly; [`Engine::spawn`] runs them as background jobs.
//!
//! - [`observe`](Engine::observe) applies a reported snapshot and may
//!   release or regain control of the light.
//! - [`adjust_all`](Engine::adjust_all) pushes the scheduled target to every
//!   controlled light that is off schedule.
//! - [`recover_all`](Engine::recover_all) takes back lights whose release
//!   deadline passed and adjusts them immediately.
//! - [`check_liveness`](Engine::check_liveness) flags lights that have gone
//!   quiet.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use lumenward::client::{ColorCommand, LightClient};
//! use lumenward::clock::ManualClock;
//! use lumenward::config::EngineConfig;
//! use lumenward::device::DeviceAddress;
//! use lumenward::engine::Engine;
//! use lumenward::error::ClientError;
//! use lumenward::state::LightState;
//!
//! struct NullClient;
//!
//! impl LightClient for NullClient {
//!     fn current_state(&self, _: &DeviceAddress) -> Option<LightState> { None }
//!     fn last_seen(&self, _: &DeviceAddress) -> Option<chrono::DateTime<Utc>> { None }
//!     fn set_color(&self, _: &DeviceAddress, _: &ColorCommand) -> Result<(), ClientError> { Ok(()) }
//! }
//!
//! let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap());
//! let engine = Engine::with_clock(NullClient, clock, EngineConfig::default());
//!
//! let addr = DeviceAddress::new("d0:73:d5:00:00:01");
//! engine.observe(&addr, "Desk", LightState::new().with_brightness(8000).with_kelvin(5000));
//!
//! // 10:00 wants brightness 16384 at 5000K
//! assert_eq!(engine.adjust_all(), 1);
//! assert!(!engine.registry().get(&addr).unwrap().is_controlled());
//! ```

mod tasks;

pub use tasks::EngineHandle;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::client::{ColorCommand, LightClient};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::control::{ControlPolicy, ReleaseReason};
use crate::device::{Adjustment, DeviceAddress, DeviceRecord, Liveness, Observation};
use crate::event::{EngineEvent, EventBus, FeedEvent};
use crate::registry::DeviceRegistry;
use crate::schedule::{Target, target_for};
use crate::state::LightState;
use crate::status::DeviceStatus;

/// Control-ownership reconciliation engine.
#[derive(Debug)]
pub struct Engine<C, K = SystemClock> {
    registry: DeviceRegistry,
    client: C,
    clock: K,
    config: EngineConfig,
    policy: ControlPolicy,
    events: EventBus,
}

/// A command decided under a record lock, sent after the lock is released.
#[derive(Debug)]
struct PendingCommand {
    address: DeviceAddress,
    name: String,
    adjustment: Adjustment,
    until: Option<DateTime<Utc>>,
}

impl<C: LightClient> Engine<C, SystemClock> {
    /// Creates an engine driven by the system clock.
    #[must_use]
    pub fn new(client: C, config: EngineConfig) -> Self {
        Self::with_clock(client, SystemClock, config)
    }
}

impl<C: LightClient, K: Clock> Engine<C, K> {
    /// Creates an engine with an explicit clock.
    #[must_use]
    pub fn with_clock(client: C, clock: K, config: EngineConfig) -> Self {
        let policy = config.control_policy();
        Self {
            registry: DeviceRegistry::new(),
            client,
            clock,
            config,
            policy,
            events: EventBus::new(),
        }
    }

    /// Returns the device registry.
    #[must_use]
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Returns the device client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns the clock.
    #[must_use]
    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Subscribes to engine events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Routes one feed event.
    ///
    /// Returns the observation outcome for light events and `None` for
    /// everything else.
    pub fn handle_feed_event(&self, event: FeedEvent) -> Option<Observation> {
        match event {
            FeedEvent::Light {
                address,
                label,
                state,
            } => Some(self.observe(&address, &label, state)),
            FeedEvent::LightSensor { address, lux, .. } => {
                tracing::trace!(%address, lux, "Ignoring light sensor reading");
                None
            }
            other => {
                tracing::debug!(kind = other.kind(), event = ?other, "Ignoring feed event");
                None
            }
        }
    }

    /// Applies a snapshot reported by a light.
    pub fn observe(&self, address: &DeviceAddress, name: &str, state: LightState) -> Observation {
        let now = self.clock.now();
        let outcome = self
            .registry
            .observe(address, name, state, now, &self.policy);

        match &outcome {
            Observation::Created => {
                tracing::info!(%address, name, "New light");
                self.events.publish(EngineEvent::DeviceAdded {
                    address: address.clone(),
                    name: name.to_string(),
                });
            }
            Observation::Unchanged => {}
            Observation::Changed {
                changes,
                target_mismatch,
                control,
                ..
            } => {
                tracing::info!(%address, name, %changes, "State changed");
                self.events.publish(EngineEvent::StateChanged {
                    address: address.clone(),
                    changes: changes.clone(),
                });

                if outcome.released_control() {
                    let until = control.until().unwrap_or(now);
                    tracing::info!(
                        %address,
                        name,
                        %target_mismatch,
                        %until,
                        "Target mismatched, relinquishing control"
                    );
                    self.events.publish(EngineEvent::ControlReleased {
                        address: address.clone(),
                        reason: control.reason().unwrap_or(ReleaseReason::ExternalOverride),
                        until,
                    });
                } else if outcome.regained_control() {
                    tracing::info!(%address, name, "Target acquired, regaining control");
                    self.events.publish(EngineEvent::ControlRegained {
                        address: address.clone(),
                    });
                }
            }
        }

        outcome
    }

    /// Pushes the scheduled target to every controlled light that is off
    /// schedule.
    ///
    /// Returns the number of commands issued.
    pub fn adjust_all(&self) -> usize {
        let now = self.clock.now();
        let desired = target_for(self.clock.local_hour());

        let mut issued = 0;
        for handle in self.registry.handles() {
            let pending = self.plan(&mut handle.lock(), desired, now);
            if let Some(pending) = pending {
                self.send(pending);
                issued += 1;
            }
        }
        issued
    }

    /// Takes back lights whose release deadline has passed and adjusts them
    /// right away.
    ///
    /// Returns the number of lights regained.
    pub fn recover_all(&self) -> usize {
        let now = self.clock.now();
        let desired = target_for(self.clock.local_hour());

        let mut regained = 0;
        for handle in self.registry.handles() {
            let (address, pending) = {
                let mut record = handle.lock();
                let deadline = record.control_after();
                if !record.try_regain(now, &self.policy) {
                    continue;
                }
                tracing::info!(
                    address = %record.address(),
                    name = record.name(),
                    overdue = %deadline.map_or_else(chrono::TimeDelta::zero, |d| now - d),
                    "Regaining control of light"
                );
                (record.address().clone(), self.plan(&mut record, desired, now))
            };

            regained += 1;
            self.events
                .publish(EngineEvent::ControlRegained { address });
            if let Some(pending) = pending {
                self.send(pending);
            }
        }
        regained
    }

    /// Updates every light's online flag from when it was last seen.
    ///
    /// Returns the number of lights that went offline during this check.
    pub fn check_liveness(&self) -> usize {
        let now = self.clock.now();
        let offline_after = self.config.offline_after();

        let mut went_offline = 0;
        for handle in self.registry.handles() {
            let (address, name, edge) = {
                let mut record = handle.lock();
                let last_seen = self.last_seen(&record);
                let edge = record.update_liveness(last_seen, now, offline_after);
                (record.address().clone(), record.name().to_string(), edge)
            };

            match edge {
                Some(Liveness::WentOffline { since }) => {
                    tracing::info!(%address, %name, %since, "Light is now offline");
                    went_offline += 1;
                    self.events
                        .publish(EngineEvent::WentOffline { address, since });
                }
                Some(Liveness::CameOnline) => {
                    tracing::debug!(%address, %name, "Light is online again");
                    self.events.publish(EngineEvent::CameOnline { address });
                }
                None => {}
            }
        }
        went_offline
    }

    /// Returns a read-only status view of every light, ordered by address.
    #[must_use]
    pub fn status(&self) -> Vec<DeviceStatus> {
        let now = self.clock.now();
        self.registry
            .list()
            .iter()
            .map(|record| {
                let state = self
                    .client
                    .current_state(record.address())
                    .unwrap_or_else(|| record.last_state());
                DeviceStatus::new(
                    record,
                    state,
                    self.last_seen(record),
                    now,
                    self.config.offline_after(),
                )
            })
            .collect()
    }

    fn last_seen(&self, record: &DeviceRecord) -> DateTime<Utc> {
        self.client
            .last_seen(record.address())
            .unwrap_or_else(|| record.last_state_updated_at())
    }

    /// Decides the adjustment for one locked record.
    fn plan(
        &self,
        record: &mut DeviceRecord,
        desired: Target,
        now: DateTime<Utc>,
    ) -> Option<PendingCommand> {
        if !record.is_controlled() {
            return None;
        }
        let current = self
            .client
            .current_state(record.address())
            .unwrap_or_else(|| record.last_state());
        let adjustment = record.plan_adjustment(desired, &current, now, &self.policy)?;

        Some(PendingCommand {
            address: record.address().clone(),
            name: record.name().to_string(),
            adjustment,
            until: record.control_after(),
        })
    }

    /// Hands a decided command to the client and reports it.
    fn send(&self, pending: PendingCommand) {
        let PendingCommand {
            address,
            name,
            adjustment,
            until,
        } = pending;
        let command = ColorCommand::white(adjustment.desired, self.config.transition());

        tracing::info!(
            %address,
            %name,
            current_brightness = adjustment.current.brightness,
            target_brightness = adjustment.desired.brightness,
            current_kelvin = adjustment.current.kelvin,
            target_kelvin = adjustment.desired.kelvin,
            "Initiating color change"
        );

        if let Some(until) = until {
            self.events.publish(EngineEvent::ControlReleased {
                address: address.clone(),
                reason: ReleaseReason::Commanded,
                until,
            });
        }

        match self.client.set_color(&address, &command) {
            Ok(()) => {
                self.events
                    .publish(EngineEvent::CommandIssued { address, command });
            }
            Err(e) => {
                tracing::warn!(%address, %name, error = %e, "Color change failed");
            }
        }
    }
}
