// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Time sources for the engine.
//!
//! Timestamps are kept in UTC; only the schedule lookup uses the local
//! hour. [`ManualClock`] lets callers drive time explicitly.

use chrono::{DateTime, FixedOffset, Local, Offset, TimeDelta, Utc};
use parking_lot::Mutex;

use crate::types::Hour;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current local hour of the day.
    fn local_hour(&self) -> Hour;
}

/// The system wall clock, using the host's local timezone for the hour.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_hour(&self) -> Hour {
        Hour::of(&Local::now())
    }
}

/// A clock that only moves when told to.
///
/// The local hour is derived from the current instant using a fixed UTC
/// offset (UTC unless set otherwise).
///
/// # Examples
///
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use lumenward::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 13, 0, 0).unwrap());
/// assert_eq!(clock.local_hour().value(), 13);
///
/// clock.advance(TimeDelta::hours(2));
/// assert_eq!(clock.local_hour().value(), 15);
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Creates a clock frozen at `now`, with local time equal to UTC.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            offset: Utc.fix(),
        }
    }

    /// Sets the offset used to compute the local hour.
    #[must_use]
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Moves the clock forward (or backward, for a negative delta).
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock();
        *now += delta;
    }

    /// Jumps the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }

    fn local_hour(&self) -> Hour {
        Hour::of(&self.now().with_timezone(&self.offset))
    }
}

impl<T: Clock + ?Sized> Clock for std::sync::Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn local_hour(&self) -> Hour {
        (**self).local_hour()
    }
}
