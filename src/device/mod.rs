// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light identity and per-light bookkeeping.

mod address;
mod record;

pub use address::DeviceAddress;
pub use record::{Adjustment, DeviceRecord, Liveness, Observation};
