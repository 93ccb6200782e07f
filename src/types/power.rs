// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power level as reported by the light.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw power level of a light.
///
/// The device protocol encodes power as a 16-bit level where `0` is off and
/// `65535` is on. Intermediate values are kept verbatim so that a snapshot
/// always reproduces exactly what the device reported.
///
/// # Examples
///
/// ```
/// use lumenward::types::PowerLevel;
///
/// assert!(PowerLevel::ON.is_on());
/// assert!(!PowerLevel::OFF.is_on());
/// assert_eq!(PowerLevel::from(true), PowerLevel::ON);
/// assert_eq!(PowerLevel::ON.to_string(), "65535");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PowerLevel(u16);

impl PowerLevel {
    /// Light is off.
    pub const OFF: Self = Self(0);

    /// Light is on.
    pub const ON: Self = Self(u16::MAX);

    /// Wraps a raw level.
    #[must_use]
    pub const fn new(level: u16) -> Self {
        Self(level)
    }

    /// Returns the raw level.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Returns `true` for any non-zero level.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for PowerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<bool> for PowerLevel {
    fn from(value: bool) -> Self {
        if value { Self::ON } else { Self::OFF }
    }
}

impl From<u16> for PowerLevel {
    fn from(level: u16) -> Self {
        Self(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_level_constants() {
        assert_eq!(PowerLevel::OFF.value(), 0);
        assert_eq!(PowerLevel::ON.value(), 65535);
        assert_eq!(PowerLevel::default(), PowerLevel::OFF);
    }

    #[test]
    fn partial_levels_count_as_on() {
        assert!(PowerLevel::new(1).is_on());
        assert!(PowerLevel::from(32768).is_on());
    }

    #[test]
    fn serializes_as_raw_number() {
        assert_eq!(serde_json::to_string(&PowerLevel::ON).unwrap(), "65535");
        let level: PowerLevel = serde_json::from_str("0").unwrap();
        assert_eq!(level, PowerLevel::OFF);
    }
}
