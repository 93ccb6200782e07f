// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the engine.
//!
//! - [`Hour`] - Local hour of the day (0-23), the key of the schedule
//! - [`PowerLevel`] - Raw 16-bit power level reported by a light

mod hour;
mod power;

pub use hour::Hour;
pub use power::PowerLevel;
