// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hour-of-day type for schedule lookups.

use std::fmt;

use chrono::Timelike;

use crate::error::ValueError;

/// Local hour of the day (0-23).
///
/// Constructing an `Hour` validates the range once, so schedule lookups
/// keyed by it can never fail.
///
/// # Examples
///
/// ```
/// use lumenward::types::Hour;
///
/// let hour = Hour::new(13).unwrap();
/// assert_eq!(hour.value(), 13);
///
/// // 24 is not an hour of the day
/// assert!(Hour::new(24).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hour(u8);

impl Hour {
    /// Midnight.
    pub const MIDNIGHT: Self = Self(0);

    /// The last hour of the day (23:00-23:59).
    pub const LAST: Self = Self(23);

    /// Creates a new hour value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 23.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > Self::LAST.0 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: u32::from(Self::LAST.0),
                actual: u32::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Extracts the hour from any chrono time value.
    ///
    /// The hour is taken in whatever timezone `time` is expressed in, so
    /// pass a `DateTime<Local>` to get the local hour.
    #[must_use]
    pub fn of<T: Timelike>(time: &T) -> Self {
        // chrono guarantees hour() is in 0..=23
        #[allow(clippy::cast_possible_truncation)]
        let hour = time.hour() as u8;
        Self(hour)
    }

    /// Returns the hour value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Iterates over every hour of the day, in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=Self::LAST.0).map(Self)
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

impl TryFrom<u8> for Hour {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, TimeZone, Utc};

    use super::*;

    #[test]
    fn hour_valid_values() {
        for v in 0..=23 {
            assert_eq!(Hour::new(v).unwrap().value(), v);
        }
    }

    #[test]
    fn hour_invalid_value() {
        assert_eq!(
            Hour::new(24),
            Err(ValueError::OutOfRange {
                min: 0,
                max: 23,
                actual: 24
            })
        );
        assert!(Hour::try_from(255).is_err());
    }

    #[test]
    fn hour_of_time() {
        let t = NaiveTime::from_hms_opt(21, 59, 59).unwrap();
        assert_eq!(Hour::of(&t).value(), 21);

        let dt = Utc.with_ymd_and_hms(2026, 3, 1, 0, 30, 0).unwrap();
        assert_eq!(Hour::of(&dt), Hour::MIDNIGHT);
    }

    #[test]
    fn all_yields_24_hours() {
        let hours: Vec<u8> = Hour::all().map(|h| h.value()).collect();
        assert_eq!(hours, (0..24).collect::<Vec<_>>());
    }

    #[test]
    fn hour_display() {
        assert_eq!(Hour::new(7).unwrap().to_string(), "07:00");
    }
}
