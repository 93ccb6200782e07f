// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control-ownership state machine.
//!
//! Every light is either [`Control::Controlled`], in which case the engine
//! may push the scheduled state to it, or [`Control::Uncontrolled`] until a
//! deadline. A light is released for one of two reasons:
//!
//! - [`ReleaseReason::Commanded`]: the engine just sent a command and gives
//!   the light a short grace period to apply it, so that a stale report of
//!   the pre-command state is not mistaken for someone else's change.
//! - [`ReleaseReason::ExternalOverride`]: somebody else changed the light
//!   away from the target, and the engine backs off for a long cooldown.
//!
//! # Examples
//!
//! ```
//! use chrono::{Duration, Utc};
//! use lumenward::control::{Control, ControlEvent, ControlPolicy, ReleaseReason};
//!
//! let policy = ControlPolicy::default();
//! let now = Utc::now();
//!
//! let state = Control::Controlled.transition(ControlEvent::Observed { on_target: false }, now, &policy);
//! assert_eq!(state.reason(), Some(ReleaseReason::ExternalOverride));
//! assert_eq!(state.until(), Some(now + Duration::hours(1)));
//!
//! let state = state.transition(ControlEvent::Observed { on_target: true }, now, &policy);
//! assert!(state.is_controlled());
//! ```

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Why the engine stopped steering a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseReason {
    /// The engine issued a command and is waiting for the light to apply it.
    Commanded,
    /// The light was changed by someone else.
    ExternalOverride,
}

impl ReleaseReason {
    /// Returns a short label for logs and status output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Commanded => "commanded",
            Self::ExternalOverride => "external-override",
        }
    }
}

impl fmt::Display for ReleaseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ownership state of a single light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// The engine owns the light and may push commands to it.
    Controlled,
    /// The engine leaves the light alone until `until` has passed.
    Uncontrolled {
        /// When control was released.
        since: DateTime<Utc>,
        /// Earliest time the engine may take control back.
        until: DateTime<Utc>,
        /// Why control was released.
        reason: ReleaseReason,
    },
}

/// Input to the ownership state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// A changed snapshot was observed; `on_target` tells whether it matches
    /// the current target.
    Observed {
        /// Whether the new snapshot matches the target.
        on_target: bool,
    },
    /// The engine sent a corrective command.
    Commanded,
    /// A periodic tick; releases whose deadline has passed end here.
    Tick,
}

impl Control {
    /// Computes the next state for `event` at time `now`.
    #[must_use]
    pub fn transition(self, event: ControlEvent, now: DateTime<Utc>, policy: &ControlPolicy) -> Self {
        match (self, event) {
            (Self::Controlled, ControlEvent::Observed { on_target: true }) => Self::Controlled,
            (Self::Controlled, ControlEvent::Observed { on_target: false }) => {
                Self::released(now, policy.cooldown, ReleaseReason::ExternalOverride)
            }
            (Self::Uncontrolled { .. }, ControlEvent::Observed { on_target: true }) => {
                Self::Controlled
            }
            (Self::Uncontrolled { .. }, ControlEvent::Observed { on_target: false })
            | (Self::Controlled, ControlEvent::Tick) => self,
            (_, ControlEvent::Commanded) => {
                Self::released(now, policy.grace, ReleaseReason::Commanded)
            }
            (Self::Uncontrolled { until, .. }, ControlEvent::Tick) => {
                if until < now {
                    Self::Controlled
                } else {
                    self
                }
            }
        }
    }

    fn released(now: DateTime<Utc>, window: TimeDelta, reason: ReleaseReason) -> Self {
        Self::Uncontrolled {
            since: now,
            until: now
                .checked_add_signed(window)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            reason,
        }
    }

    /// Returns `true` if the engine owns the light.
    #[must_use]
    pub const fn is_controlled(&self) -> bool {
        matches!(self, Self::Controlled)
    }

    /// Returns the deadline before which control will not be retaken.
    #[must_use]
    pub const fn until(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Controlled => None,
            Self::Uncontrolled { until, .. } => Some(*until),
        }
    }

    /// Returns why control was released, if it was.
    #[must_use]
    pub const fn reason(&self) -> Option<ReleaseReason> {
        match self {
            Self::Controlled => None,
            Self::Uncontrolled { reason, .. } => Some(*reason),
        }
    }

    /// Returns `true` if control was released and the deadline has passed.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.until().is_some_and(|until| until < now)
    }
}

/// Durations of the two release windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlPolicy {
    /// How long to wait after a command before judging the light again.
    pub grace: TimeDelta,
    /// How long to respect an external change before retaking control.
    pub cooldown: TimeDelta,
}

impl ControlPolicy {
    /// Default grace period after issuing a command.
    pub const DEFAULT_GRACE: Duration = Duration::from_secs(15);

    /// Default cooldown after an external change.
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60 * 60);

    /// Creates a policy from standard durations.
    ///
    /// Durations too large for chrono are saturated to its maximum.
    #[must_use]
    pub fn new(grace: Duration, cooldown: Duration) -> Self {
        Self {
            grace: to_delta(grace),
            cooldown: to_delta(cooldown),
        }
    }
}

impl Default for ControlPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GRACE, Self::DEFAULT_COOLDOWN)
    }
}

pub(crate) fn to_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}
