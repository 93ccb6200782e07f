// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound feed events and outbound engine events.
//!
//! [`FeedEvent`] is what the device client pushes in. [`EngineEvent`] is
//! what the engine publishes on its [`EventBus`] after each decision, for
//! status displays, logging sinks, or tests.

mod engine_event;
mod event_bus;
mod feed_event;

pub use engine_event::EngineEvent;
pub use event_bus::EventBus;
pub use feed_event::FeedEvent;
