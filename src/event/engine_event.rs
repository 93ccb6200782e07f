// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine decision events.

use chrono::{DateTime, TimeDelta, Utc};

use crate::client::ColorCommand;
use crate::control::ReleaseReason;
use crate::device::DeviceAddress;
use crate::state::StateDiff;

/// Decisions and observations published by the engine.
///
/// Every event names the light it concerns. Subscribers receive them
/// through [`EventBus`](super::EventBus).
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A light was seen for the first time.
    DeviceAdded {
        /// The light's address.
        address: DeviceAddress,
        /// The light's label.
        name: String,
    },

    /// A light reported a state different from its previous one.
    StateChanged {
        /// The light's address.
        address: DeviceAddress,
        /// What changed.
        changes: StateDiff,
    },

    /// The engine stopped steering a light.
    ControlReleased {
        /// The light's address.
        address: DeviceAddress,
        /// Why control was released.
        reason: ReleaseReason,
        /// Earliest time control may be retaken.
        until: DateTime<Utc>,
    },

    /// The engine owns a light again.
    ControlRegained {
        /// The light's address.
        address: DeviceAddress,
    },

    /// A corrective command was handed to the device client.
    CommandIssued {
        /// The light's address.
        address: DeviceAddress,
        /// The command sent.
        command: ColorCommand,
    },

    /// A light has not been seen for longer than the offline threshold.
    WentOffline {
        /// The light's address.
        address: DeviceAddress,
        /// Time since the light was last seen.
        since: TimeDelta,
    },

    /// A light flagged offline has been seen again.
    CameOnline {
        /// The light's address.
        address: DeviceAddress,
    },
}

impl EngineEvent {
    /// Returns the address of the light this event concerns.
    #[must_use]
    pub fn address(&self) -> &DeviceAddress {
        match self {
            Self::DeviceAdded { address, .. }
            | Self::StateChanged { address, .. }
            | Self::ControlReleased { address, .. }
            | Self::ControlRegained { address }
            | Self::CommandIssued { address, .. }
            | Self::WentOffline { address, .. }
            | Self::CameOnline { address } => address,
        }
    }

    /// Returns `true` if this event changes who owns the light.
    #[must_use]
    pub fn is_ownership(&self) -> bool {
        matches!(
            self,
            Self::ControlReleased { .. } | Self::ControlRegained { .. }
        )
    }

    /// Returns `true` if this is a liveness event.
    #[must_use]
    pub fn is_liveness(&self) -> bool {
        matches!(self, Self::WentOffline { .. } | Self::CameOnline { .. })
    }
}
