// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device bookkeeping.

use chrono::{DateTime, TimeDelta, Utc};

use crate::control::{Control, ControlEvent, ControlPolicy};
use crate::schedule::Target;
use crate::state::{LightState, StateDiff, diff};

use super::DeviceAddress;

/// Everything the engine knows about one light.
///
/// A record is created on the first observation of an address and lives for
/// the rest of the process. The target is written only at creation (from the
/// first snapshot) and by [`plan_adjustment`](Self::plan_adjustment).
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    name: String,
    address: DeviceAddress,
    last_state: LightState,
    last_state_updated_at: DateTime<Utc>,
    last_change: Option<DateTime<Utc>>,
    target: Target,
    control: Control,
    online: bool,
}

/// Result of feeding one snapshot to the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// First sighting of this address; a record was created.
    Created,
    /// The snapshot matched the previous one.
    Unchanged,
    /// At least one field changed.
    Changed {
        /// Differences from the previous snapshot.
        changes: StateDiff,
        /// Differences between the target and the new snapshot.
        target_mismatch: StateDiff,
        /// Ownership before the observation.
        previous: Control,
        /// Ownership after the observation.
        control: Control,
    },
}

impl Observation {
    /// Returns `true` if the observation released control of the light.
    #[must_use]
    pub fn released_control(&self) -> bool {
        matches!(self, Self::Changed { previous, control, .. }
            if previous.is_controlled() && !control.is_controlled())
    }

    /// Returns `true` if the observation gave control back to the engine.
    #[must_use]
    pub fn regained_control(&self) -> bool {
        matches!(self, Self::Changed { previous, control, .. }
            if !previous.is_controlled() && control.is_controlled())
    }
}

/// A corrective command the engine decided to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    /// What the light currently shows on the targeted fields.
    pub current: Target,
    /// What the schedule wants.
    pub desired: Target,
}

/// Edge reported by the liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// The light has not been seen for longer than the threshold.
    WentOffline {
        /// Time since the light was last seen.
        since: TimeDelta,
    },
    /// A light previously flagged offline has been seen again.
    CameOnline,
}

impl DeviceRecord {
    /// Creates a record from the first observed snapshot.
    ///
    /// The light starts out controlled with the observed state as its
    /// target, so no command fires until the schedule says otherwise.
    #[must_use]
    pub fn new(
        address: DeviceAddress,
        name: impl Into<String>,
        state: LightState,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            address,
            last_state: state,
            last_state_updated_at: now,
            last_change: None,
            target: Target::from_state(&state),
            control: Control::Controlled,
            online: true,
        }
    }

    /// Returns the light's label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the light's address.
    #[must_use]
    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    /// Returns the most recently observed snapshot.
    #[must_use]
    pub fn last_state(&self) -> LightState {
        self.last_state
    }

    /// Returns when the last snapshot was observed.
    #[must_use]
    pub fn last_state_updated_at(&self) -> DateTime<Utc> {
        self.last_state_updated_at
    }

    /// Returns when a changed snapshot was last observed.
    #[must_use]
    pub fn last_change(&self) -> Option<DateTime<Utc>> {
        self.last_change
    }

    /// Returns the state the engine is steering towards.
    #[must_use]
    pub fn target(&self) -> Target {
        self.target
    }

    /// Returns the ownership state.
    #[must_use]
    pub fn control(&self) -> Control {
        self.control
    }

    /// Returns `true` if the engine owns the light.
    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.control.is_controlled()
    }

    /// Returns the deadline before which the engine will not act, if any.
    #[must_use]
    pub fn control_after(&self) -> Option<DateTime<Utc>> {
        self.control.until()
    }

    /// Returns whether the light is considered reachable.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Applies a newly observed snapshot.
    ///
    /// Ownership only moves when the snapshot differs from the previous one.
    /// The snapshot is always stored.
    pub fn observe(
        &mut self,
        state: LightState,
        now: DateTime<Utc>,
        policy: &ControlPolicy,
    ) -> Observation {
        if !self.online {
            tracing::debug!(
                address = %self.address,
                name = %self.name,
                offline_for = %(now - self.last_state_updated_at),
                "Light is back"
            );
        }

        let changes = diff(&self.last_state, &state);
        self.last_state = state;
        self.last_state_updated_at = now;

        if !changes.is_changed() {
            return Observation::Unchanged;
        }

        self.last_change = Some(now);
        let target_mismatch = self.target.diff(&state);
        let previous = self.control;
        self.control = previous.transition(
            ControlEvent::Observed {
                on_target: !target_mismatch.is_changed(),
            },
            now,
            policy,
        );

        Observation::Changed {
            changes,
            target_mismatch,
            previous,
            control: self.control,
        }
    }

    /// Decides whether the light needs a command to reach `desired`.
    ///
    /// Only acts while controlled. When a command is due, the target is
    /// updated and control is released for the grace period; the caller is
    /// responsible for actually sending the command.
    pub fn plan_adjustment(
        &mut self,
        desired: Target,
        current: &LightState,
        now: DateTime<Utc>,
        policy: &ControlPolicy,
    ) -> Option<Adjustment> {
        if !self.control.is_controlled() || desired.matches(current) {
            return None;
        }

        self.target = desired;
        self.control = self
            .control
            .transition(ControlEvent::Commanded, now, policy);

        Some(Adjustment {
            current: Target::from_state(current),
            desired,
        })
    }

    /// Takes control back if the release deadline has passed.
    ///
    /// Returns `true` if control was regained.
    pub fn try_regain(&mut self, now: DateTime<Utc>, policy: &ControlPolicy) -> bool {
        if !self.control.is_due(now) {
            return false;
        }
        self.control = self.control.transition(ControlEvent::Tick, now, policy);
        self.control.is_controlled()
    }

    /// Updates the online flag from the time the light was last seen.
    ///
    /// Returns the edge, if the flag flipped.
    pub fn update_liveness(
        &mut self,
        last_seen: DateTime<Utc>,
        now: DateTime<Utc>,
        offline_after: TimeDelta,
    ) -> Option<Liveness> {
        let since = now - last_seen;
        if since > offline_after {
            if self.online {
                self.online = false;
                return Some(Liveness::WentOffline { since });
            }
            None
        } else if self.online {
            None
        } else {
            self.online = true;
            Some(Liveness::CameOnline)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::control::ReleaseReason;
    use crate::types::PowerLevel;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap()
    }

    fn snapshot(brightness: u16, kelvin: u16) -> LightState {
        LightState::new()
            .with_brightness(brightness)
            .with_kelvin(kelvin)
            .with_power(PowerLevel::ON)
    }

    fn record(state: LightState) -> DeviceRecord {
        DeviceRecord::new(DeviceAddress::new("d0:73:d5:00:00:01"), "Desk", state, t0())
    }

    #[test]
    fn new_record_is_controlled_with_first_snapshot_as_target() {
        let state = snapshot(16449, 2500);
        let rec = record(state);

        assert!(rec.is_controlled());
        assert_eq!(rec.target(), Target::new(16449, 2500));
        assert_eq!(rec.last_state(), state);
        assert_eq!(rec.last_state_updated_at(), t0());
        assert!(rec.control_after().is_none());
        assert!(rec.is_online());
        assert_eq!(rec.name(), "Desk");
    }

    #[test]
    fn unchanged_observation_only_refreshes_timestamp() {
        let policy = ControlPolicy::default();
        let state = snapshot(100, 2500);
        let mut rec = record(state);
        let before = rec.clone();
        let later = t0() + TimeDelta::seconds(30);

        for _ in 0..3 {
            assert_eq!(rec.observe(state, later, &policy), Observation::Unchanged);
        }

        assert_eq!(rec.control(), before.control());
        assert_eq!(rec.target(), before.target());
        assert_eq!(rec.control_after(), before.control_after());
        assert_eq!(rec.last_state_updated_at(), later);
        assert!(rec.last_change().is_none());
    }

    #[test]
    fn off_target_change_releases_control() {
        let policy = ControlPolicy::default();
        let mut rec = record(snapshot(16384, 5000));
        let now = t0() + TimeDelta::minutes(1);

        let outcome = rec.observe(snapshot(30000, 5000), now, &policy);

        assert!(outcome.released_control());
        assert!(!rec.is_controlled());
        assert_eq!(rec.control().reason(), Some(ReleaseReason::ExternalOverride));
        assert_eq!(rec.control_after(), Some(now + TimeDelta::hours(1)));
        assert_eq!(rec.last_change(), Some(now));
        if let Observation::Changed {
            changes,
            target_mismatch,
            ..
        } = outcome
        {
            assert_eq!(changes.descriptions(), vec!["brightness 16384->30000"]);
            assert_eq!(target_mismatch.descriptions(), vec!["brightness 16384->30000"]);
        } else {
            panic!("Expected Changed observation");
        }
    }

    #[test]
    fn hue_change_keeps_control() {
        let policy = ControlPolicy::default();
        let first = snapshot(16384, 5000);
        let mut rec = record(first);

        let outcome = rec.observe(first.with_hue(1000), t0(), &policy);

        assert!(matches!(outcome, Observation::Changed { .. }));
        assert!(!outcome.released_control());
        assert!(rec.is_controlled());
    }

    #[test]
    fn returning_to_target_regains_control() {
        let policy = ControlPolicy::default();
        let mut rec = record(snapshot(16384, 5000));
        rec.observe(snapshot(1, 5000), t0(), &policy);
        assert!(!rec.is_controlled());

        let outcome = rec.observe(snapshot(16384, 5000), t0(), &policy);
        assert!(outcome.regained_control());
        assert!(rec.is_controlled());
        assert!(rec.control_after().is_none());
    }

    #[test]
    fn plan_adjustment_updates_target_and_starts_grace() {
        let policy = ControlPolicy::default();
        let current = snapshot(8000, 5000);
        let mut rec = record(current);

        let adjustment = rec
            .plan_adjustment(Target::new(16384, 5000), &current, t0(), &policy)
            .expect("adjustment expected");

        assert_eq!(adjustment.current, Target::new(8000, 5000));
        assert_eq!(adjustment.desired, Target::new(16384, 5000));
        assert_eq!(rec.target(), Target::new(16384, 5000));
        assert!(!rec.is_controlled());
        assert_eq!(rec.control().reason(), Some(ReleaseReason::Commanded));
        assert_eq!(rec.control_after(), Some(t0() + TimeDelta::seconds(15)));
    }

    #[test]
    fn plan_adjustment_skips_when_on_schedule_or_uncontrolled() {
        let policy = ControlPolicy::default();
        let current = snapshot(16384, 5000);
        let mut rec = record(current);

        assert!(
            rec.plan_adjustment(Target::new(16384, 5000), &current, t0(), &policy)
                .is_none()
        );

        rec.observe(snapshot(1, 1), t0(), &policy);
        let stored = rec.target();
        assert!(
            rec.plan_adjustment(Target::new(2048, 2500), &snapshot(1, 1), t0(), &policy)
                .is_none()
        );
        assert_eq!(rec.target(), stored);
    }

    #[test]
    fn try_regain_waits_for_deadline() {
        let policy = ControlPolicy::default();
        let current = snapshot(8000, 5000);
        let mut rec = record(current);
        rec.plan_adjustment(Target::new(16384, 5000), &current, t0(), &policy);

        assert!(!rec.try_regain(t0() + TimeDelta::seconds(10), &policy));
        assert!(!rec.is_controlled());

        assert!(rec.try_regain(t0() + TimeDelta::seconds(16), &policy));
        assert!(rec.is_controlled());

        // Already controlled: nothing to regain.
        assert!(!rec.try_regain(t0() + TimeDelta::seconds(17), &policy));
    }

    #[test]
    fn liveness_flags_offline_once() {
        let mut rec = record(snapshot(1, 1));
        let hour = TimeDelta::hours(1);
        let now = t0() + TimeDelta::minutes(61);

        assert_eq!(
            rec.update_liveness(t0(), now, hour),
            Some(Liveness::WentOffline {
                since: TimeDelta::minutes(61)
            })
        );
        assert!(!rec.is_online());
        assert_eq!(rec.update_liveness(t0(), now + TimeDelta::seconds(1), hour), None);
        assert!(!rec.is_online());

        assert_eq!(rec.update_liveness(now, now, hour), Some(Liveness::CameOnline));
        assert!(rec.is_online());
    }

    #[test]
    fn liveness_at_threshold_is_still_online() {
        let mut rec = record(snapshot(1, 1));
        let hour = TimeDelta::hours(1);

        assert_eq!(rec.update_liveness(t0(), t0() + hour, hour), None);
        assert!(rec.is_online());
    }
}
