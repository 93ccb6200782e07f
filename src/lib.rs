// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lumenward - schedule-driven control of LAN smart lights.
//!
//! Lumenward keeps every light on the network at the brightness and color
//! temperature the time of day calls for, without fighting the people in the
//! room. It watches the state each light reports, pushes the scheduled state
//! to lights it owns, and backs off for a while whenever someone changes a
//! light by hand.
//!
//! # How it works
//!
//! - Every light is tracked in a [`DeviceRegistry`] from its first sighting.
//! - Each light is either controlled or uncontrolled until a deadline (see
//!   [`Control`]).
//! - Once per tick, controlled lights that are off schedule get a color
//!   command and a short grace period to apply it.
//! - A reported change that moves a light away from its target releases it
//!   for an hour-long cooldown. A report that lands on target takes it back.
//! - Once per tick, lights whose deadline has passed are taken back and
//!   adjusted immediately.
//!
//! Discovery and the wire protocol are left to a device-client library,
//! plugged in through [`LightClient`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lumenward::{Engine, EngineConfig, FeedEvent, LightClient};
//! use tokio::sync::mpsc;
//! use tokio_util::sync::CancellationToken;
//!
//! async fn run<C: LightClient + 'static>(client: C) -> lumenward::Result<()> {
//!     let config = EngineConfig::from_file("lumenward.toml")?;
//!     let listen = config.status_listen.clone();
//!     let engine = Arc::new(Engine::new(client, config));
//!
//!     let (feed_tx, feed_rx) = mpsc::channel::<FeedEvent>(256);
//!     let token = CancellationToken::new();
//!     let jobs = engine.spawn(feed_rx, token.clone());
//!
//!     // Hand `feed_tx` to the device client's event loop here.
//!     # drop(feed_tx);
//!
//!     let listener = tokio::net::TcpListener::bind(&listen).await?;
//!     lumenward::http::serve(listener, engine, token).await?;
//!     jobs.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `http` (default): the read-only status endpoint in [`http`].

pub mod client;
pub mod clock;
pub mod config;
pub mod control;
pub mod device;
pub mod engine;
pub mod error;
pub mod event;
#[cfg(feature = "http")]
pub mod http;
pub mod registry;
pub mod schedule;
pub mod state;
pub mod status;
pub mod types;

pub use client::{ColorCommand, LightClient};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use control::{Control, ControlEvent, ControlPolicy, ReleaseReason};
pub use device::{DeviceAddress, DeviceRecord, Observation};
pub use engine::{Engine, EngineHandle};
pub use error::{ClientError, ConfigError, Error, Result, ValueError};
pub use event::{EngineEvent, EventBus, FeedEvent};
pub use registry::DeviceRegistry;
pub use schedule::{SCHEDULE, Target, target_for};
pub use state::{LightState, StateDiff, diff};
pub use status::DeviceStatus;
pub use types::{Hour, PowerLevel};
