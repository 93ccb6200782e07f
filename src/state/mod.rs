// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light state snapshots and their differences.
//!
//! [`LightState`] is an immutable snapshot of what a light reported at one
//! instant. [`diff`] compares two snapshots field by field and yields a
//! [`StateDiff`] that both drives ownership decisions and gets logged.

mod diff;
mod light_state;

pub use diff::{Field, FieldChange, StateDiff, diff};
pub use light_state::LightState;
