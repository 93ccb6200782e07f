// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events pushed by the device client.

use chrono::{DateTime, Utc};

use crate::device::DeviceAddress;
use crate::state::LightState;

/// A tagged event from the device client's push feed.
///
/// Only [`FeedEvent::Light`] drives the engine. The other variants exist so
/// that a client can forward everything it hears; they are logged and
/// dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A light reported its state.
    Light {
        /// The light's address.
        address: DeviceAddress,
        /// The light's label.
        label: String,
        /// The reported state.
        state: LightState,
    },

    /// A gateway announced itself.
    Gateway {
        /// The gateway's address.
        address: DeviceAddress,
    },

    /// An ambient light sensor reading.
    LightSensor {
        /// The reporting device's address.
        address: DeviceAddress,
        /// Illuminance in lux.
        lux: f32,
        /// When the reading was taken.
        at: DateTime<Utc>,
    },

    /// Anything else the client did not recognize.
    Other(String),
}

impl FeedEvent {
    /// Creates a light state event.
    #[must_use]
    pub fn light(
        address: impl Into<DeviceAddress>,
        label: impl Into<String>,
        state: LightState,
    ) -> Self {
        Self::Light {
            address: address.into(),
            label: label.into(),
            state,
        }
    }

    /// Returns the tag used when logging ignored events.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Light { .. } => "light",
            Self::Gateway { .. } => "gateway",
            Self::LightSensor { .. } => "light-sensor",
            Self::Other(_) => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_constructor() {
        let event = FeedEvent::light("d0:73:d5:00:00:01", "Desk", LightState::new());
        assert_eq!(event.kind(), "light");
        if let FeedEvent::Light { address, label, .. } = event {
            assert_eq!(address.as_str(), "d0:73:d5:00:00:01");
            assert_eq!(label, "Desk");
        } else {
            panic!("Expected Light event");
        }
    }

    #[test]
    fn other_kinds() {
        let gateway = FeedEvent::Gateway {
            address: DeviceAddress::new("gw"),
        };
        assert_eq!(gateway.kind(), "gateway");
        assert_eq!(FeedEvent::Other("echo".into()).kind(), "other");
    }
}
