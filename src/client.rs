// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary to the device-client library.
//!
//! Discovery and the wire protocol live outside this crate. The engine only
//! needs to read what the client last heard from a light and to hand it a
//! color command; [`LightClient`] is that seam.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::device::DeviceAddress;
use crate::error::ClientError;
use crate::schedule::Target;
use crate::state::LightState;

/// A set-color request for one light.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use lumenward::client::ColorCommand;
/// use lumenward::schedule::Target;
///
/// let cmd = ColorCommand::white(Target::new(16384, 5000), Duration::from_secs(10));
/// assert_eq!(cmd.hue, 0);
/// assert_eq!(cmd.brightness, 16384);
/// assert_eq!(cmd.transition_millis(), 10_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCommand {
    /// Hue (0-65535).
    pub hue: u16,
    /// Saturation (0-65535).
    pub saturation: u16,
    /// Brightness (0-65535).
    pub brightness: u16,
    /// Color temperature in Kelvin.
    pub kelvin: u16,
    /// How long the light should take to fade to the new color.
    pub transition: Duration,
}

impl ColorCommand {
    /// Builds a white (zero hue and saturation) command for `target`.
    #[must_use]
    pub const fn white(target: Target, transition: Duration) -> Self {
        Self {
            hue: 0,
            saturation: 0,
            brightness: target.brightness,
            kelvin: target.kelvin,
            transition,
        }
    }

    /// Returns the transition time in milliseconds, saturating at `u32::MAX`.
    #[must_use]
    pub fn transition_millis(&self) -> u32 {
        u32::try_from(self.transition.as_millis()).unwrap_or(u32::MAX)
    }
}

/// Operations the engine consumes from the device client.
///
/// Implementations must be cheap and non-blocking: they are called from the
/// periodic jobs. `set_color` is fire-and-forget; its outcome is discovered
/// through the next observation of the light, and failures are never
/// retried by the engine.
pub trait LightClient: Send + Sync {
    /// Returns the client's current view of a light's state, if known.
    fn current_state(&self, address: &DeviceAddress) -> Option<LightState>;

    /// Returns when the client last heard from a light, if ever.
    fn last_seen(&self, address: &DeviceAddress) -> Option<DateTime<Utc>>;

    /// Asks a light to change color.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request could not be handed off.
    fn set_color(&self, address: &DeviceAddress, command: &ColorCommand)
    -> Result<(), ClientError>;
}

impl<T: LightClient + ?Sized> LightClient for std::sync::Arc<T> {
    fn current_state(&self, address: &DeviceAddress) -> Option<LightState> {
        (**self).current_state(address)
    }

    fn last_seen(&self, address: &DeviceAddress) -> Option<DateTime<Utc>> {
        (**self).last_seen(address)
    }

    fn set_color(
        &self,
        address: &DeviceAddress,
        command: &ColorCommand,
    ) -> Result<(), ClientError> {
        (**self).set_color(address, command)
    }
}
