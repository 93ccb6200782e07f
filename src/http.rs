// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP status endpoint.
//!
//! - `GET /` returns every known light as a JSON array of
//!   [`DeviceStatus`](crate::status::DeviceStatus).
//! - `GET /health` returns `OK`.
//!
//! The endpoint is read-only.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::client::LightClient;
use crate::clock::Clock;
use crate::engine::Engine;
use crate::status::DeviceStatus;

/// Builds the status router for `engine`.
pub fn router<C, K>(engine: Arc<Engine<C, K>>) -> Router
where
    C: LightClient + 'static,
    K: Clock + 'static,
{
    Router::new()
        .route("/", get(list_devices::<C, K>))
        .route("/health", get(health_check))
        .with_state(engine)
}

/// Serves the status endpoint on `listener` until `token` is cancelled.
///
/// # Errors
///
/// Returns an I/O error if the server fails.
pub async fn serve<C, K>(
    listener: TcpListener,
    engine: Arc<Engine<C, K>>,
    token: CancellationToken,
) -> std::io::Result<()>
where
    C: LightClient + 'static,
    K: Clock + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "Status endpoint listening");
    }
    axum::serve(listener, router(engine))
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await
}

async fn list_devices<C, K>(State(engine): State<Arc<Engine<C, K>>>) -> Json<Vec<DeviceStatus>>
where
    C: LightClient + 'static,
    K: Clock + 'static,
{
    Json(engine.status())
}

async fn health_check() -> &'static str {
    "OK"
}
