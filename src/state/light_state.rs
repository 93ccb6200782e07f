// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observed light state snapshot.

use serde::{Deserialize, Serialize};

use crate::types::PowerLevel;

/// Snapshot of a light's state at one instant.
///
/// Snapshots are plain values: every observation produces a new one and a
/// captured snapshot is never modified in place. The `with_*` methods return
/// a modified copy.
///
/// All color channels use the device's native 16-bit units. `kelvin` is the
/// white color temperature in Kelvin.
///
/// # Examples
///
/// ```
/// use lumenward::state::LightState;
/// use lumenward::types::PowerLevel;
///
/// let state = LightState::new()
///     .with_brightness(16384)
///     .with_kelvin(5000)
///     .with_power(PowerLevel::ON);
///
/// assert_eq!(state.brightness(), 16384);
/// assert!(state.power().is_on());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LightState {
    /// Hue (0-65535, wrapping around the color wheel).
    hue: u16,
    /// Saturation (0-65535).
    saturation: u16,
    /// Brightness (0-65535).
    brightness: u16,
    /// Color temperature in Kelvin.
    kelvin: u16,
    /// Dim level.
    dim: i16,
    /// Power level.
    power: PowerLevel,
}

impl LightState {
    /// Creates an all-zero snapshot (off, no color).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hue: 0,
            saturation: 0,
            brightness: 0,
            kelvin: 0,
            dim: 0,
            power: PowerLevel::OFF,
        }
    }

    /// Returns the hue.
    #[must_use]
    pub const fn hue(&self) -> u16 {
        self.hue
    }

    /// Returns the saturation.
    #[must_use]
    pub const fn saturation(&self) -> u16 {
        self.saturation
    }

    /// Returns the brightness.
    #[must_use]
    pub const fn brightness(&self) -> u16 {
        self.brightness
    }

    /// Returns the color temperature in Kelvin.
    #[must_use]
    pub const fn kelvin(&self) -> u16 {
        self.kelvin
    }

    /// Returns the dim level.
    #[must_use]
    pub const fn dim(&self) -> i16 {
        self.dim
    }

    /// Returns the power level.
    #[must_use]
    pub const fn power(&self) -> PowerLevel {
        self.power
    }

    /// Returns a copy with the given hue.
    #[must_use]
    pub const fn with_hue(mut self, hue: u16) -> Self {
        self.hue = hue;
        self
    }

    /// Returns a copy with the given saturation.
    #[must_use]
    pub const fn with_saturation(mut self, saturation: u16) -> Self {
        self.saturation = saturation;
        self
    }

    /// Returns a copy with the given brightness.
    #[must_use]
    pub const fn with_brightness(mut self, brightness: u16) -> Self {
        self.brightness = brightness;
        self
    }

    /// Returns a copy with the given color temperature.
    #[must_use]
    pub const fn with_kelvin(mut self, kelvin: u16) -> Self {
        self.kelvin = kelvin;
        self
    }

    /// Returns a copy with the given dim level.
    #[must_use]
    pub const fn with_dim(mut self, dim: i16) -> Self {
        self.dim = dim;
        self
    }

    /// Returns a copy with the given power level.
    #[must_use]
    pub const fn with_power(mut self, power: PowerLevel) -> Self {
        self.power = power;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_off_and_zeroed() {
        let state = LightState::new();
        assert_eq!(state, LightState::default());
        assert!(!state.power().is_on());
        assert_eq!(state.kelvin(), 0);
    }

    #[test]
    fn with_methods_leave_original_untouched() {
        let original = LightState::new().with_brightness(100);
        let changed = original.with_brightness(200).with_hue(5);

        assert_eq!(original.brightness(), 100);
        assert_eq!(original.hue(), 0);
        assert_eq!(changed.brightness(), 200);
        assert_eq!(changed.hue(), 5);
    }

    #[test]
    fn serializes_with_field_names() {
        let state = LightState::new()
            .with_kelvin(2500)
            .with_brightness(16449)
            .with_power(PowerLevel::ON);
        let json = serde_json::to_value(state).unwrap();

        assert_eq!(json["kelvin"], 2500);
        assert_eq!(json["brightness"], 16449);
        assert_eq!(json["power"], 65535);
        assert_eq!(json["dim"], 0);
    }
}
