// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only status view of the known lights.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::device::{DeviceAddress, DeviceRecord};
use crate::schedule::Target;
use crate::state::LightState;
use crate::types::PowerLevel;

/// One light as reported by the status endpoint.
///
/// Serialized with kebab-case keys:
///
/// ```json
/// {
///   "name": "Desk",
///   "address": "d0:73:d5:00:00:01",
///   "online": true,
///   "controlled": false,
///   "release-reason": "external-override",
///   "control-after": "2026-01-01T11:00:00Z",
///   "last-seen": "2026-01-01T10:00:00Z",
///   "last-seen-secs": 4,
///   "hue": 0,
///   "saturation": 0,
///   "brightness": 30000,
///   "kelvin": 5000,
///   "dim": 0,
///   "power": 65535,
///   "target-brightness": 16384,
///   "target-kelvin": 5000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeviceStatus {
    /// The light's label.
    pub name: String,
    /// The light's address.
    pub address: DeviceAddress,
    /// Whether the light was heard from within the offline threshold.
    pub online: bool,
    /// Whether the engine currently owns the light.
    pub controlled: bool,
    /// Why control was released, while uncontrolled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_reason: Option<&'static str>,
    /// When the engine may take control back, while uncontrolled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_after: Option<DateTime<Utc>>,
    /// When the light was last heard from.
    pub last_seen: DateTime<Utc>,
    /// Whole seconds since the light was last heard from.
    pub last_seen_secs: i64,
    /// Current hue.
    pub hue: u16,
    /// Current saturation.
    pub saturation: u16,
    /// Current brightness.
    pub brightness: u16,
    /// Current color temperature.
    pub kelvin: u16,
    /// Current dim offset.
    pub dim: i16,
    /// Current power level.
    pub power: PowerLevel,
    /// Brightness the engine is steering towards.
    pub target_brightness: u16,
    /// Color temperature the engine is steering towards.
    pub target_kelvin: u16,
}

impl DeviceStatus {
    /// Builds the status of `record` showing `state` as its current state.
    ///
    /// `online` is derived from the age of `last_seen`, so it is accurate
    /// whether or not the liveness job runs.
    #[must_use]
    pub fn new(
        record: &DeviceRecord,
        state: LightState,
        last_seen: DateTime<Utc>,
        now: DateTime<Utc>,
        offline_after: TimeDelta,
    ) -> Self {
        let age = now - last_seen;
        let control = record.control();
        let Target {
            brightness: target_brightness,
            kelvin: target_kelvin,
        } = record.target();

        Self {
            name: record.name().to_string(),
            address: record.address().clone(),
            online: age <= offline_after,
            controlled: control.is_controlled(),
            release_reason: control.reason().map(|reason| reason.as_str()),
            control_after: control.until(),
            last_seen,
            last_seen_secs: age.num_seconds(),
            hue: state.hue(),
            saturation: state.saturation(),
            brightness: state.brightness(),
            kelvin: state.kelvin(),
            dim: state.dim(),
            power: state.power(),
            target_brightness,
            target_kelvin,
        }
    }
}
