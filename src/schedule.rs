// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Time-of-day lighting schedule.
//!
//! The schedule is a fixed table mapping each hour of the day to a target
//! brightness and color temperature: bright and cool during the day, dim
//! and warm at night.
//!
//! # Examples
//!
//! ```
//! use lumenward::schedule::{Target, target_for};
//! use lumenward::types::Hour;
//!
//! let noon = target_for(Hour::new(12).unwrap());
//! assert_eq!(noon, Target::new(16384, 5000));
//!
//! let late = target_for(Hour::new(23).unwrap());
//! assert_eq!(late, Target::new(4096, 2500));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::{Field, LightState, StateDiff};
use crate::types::Hour;

/// Desired brightness and color temperature for a light.
///
/// Only these two fields are steered by the engine; hue, saturation, dim and
/// power are left to whoever else controls the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Brightness (0-65535).
    pub brightness: u16,
    /// Color temperature in Kelvin.
    pub kelvin: u16,
}

impl Target {
    /// The snapshot fields a target constrains.
    pub const FIELDS: [Field; 2] = [Field::Brightness, Field::Kelvin];

    /// Creates a target.
    #[must_use]
    pub const fn new(brightness: u16, kelvin: u16) -> Self {
        Self { brightness, kelvin }
    }

    /// Takes the targeted fields from an observed snapshot.
    #[must_use]
    pub const fn from_state(state: &LightState) -> Self {
        Self {
            brightness: state.brightness(),
            kelvin: state.kelvin(),
        }
    }

    /// Compares this target against an observed snapshot on the targeted
    /// fields only.
    ///
    /// An empty diff means the snapshot has reached the target.
    #[must_use]
    pub fn diff(&self, state: &LightState) -> StateDiff {
        let wanted = LightState::new()
            .with_brightness(self.brightness)
            .with_kelvin(self.kelvin);
        StateDiff::on_fields(&wanted, state, &Self::FIELDS)
    }

    /// Returns `true` if `state` has reached this target.
    #[must_use]
    pub fn matches(&self, state: &LightState) -> bool {
        self.brightness == state.brightness() && self.kelvin == state.kelvin()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "brightness {} / {}K", self.brightness, self.kelvin)
    }
}

/// One row of the schedule: an inclusive hour range and its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// First hour covered (inclusive).
    pub first: u8,
    /// Last hour covered (inclusive).
    pub last: u8,
    /// Target for every hour in the range.
    pub target: Target,
}

impl ScheduleEntry {
    const fn new(first: u8, last: u8, brightness: u16, kelvin: u16) -> Self {
        Self {
            first,
            last,
            target: Target::new(brightness, kelvin),
        }
    }

    /// Returns `true` if `hour` falls in this entry's range.
    #[must_use]
    pub const fn covers(&self, hour: Hour) -> bool {
        self.first <= hour.value() && hour.value() <= self.last
    }
}

/// The daily schedule, ordered by hour.
pub const SCHEDULE: [ScheduleEntry; 7] = [
    ScheduleEntry::new(0, 4, 2048, 2500),
    ScheduleEntry::new(5, 13, 16384, 5000),
    ScheduleEntry::new(14, 16, 16384, 4000),
    ScheduleEntry::new(17, 18, 16384, 3750),
    ScheduleEntry::new(19, 20, 8192, 3500),
    ScheduleEntry::new(21, 22, 8192, 3000),
    ScheduleEntry::new(23, 23, 4096, 2500),
];

/// Returns the scheduled target for `hour`.
#[must_use]
pub fn target_for(hour: Hour) -> Target {
    SCHEDULE
        .iter()
        .find(|entry| entry.covers(hour))
        .map_or(SCHEDULE[SCHEDULE.len() - 1].target, |entry| entry.target)
}
