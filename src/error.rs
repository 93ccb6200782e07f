// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `lumenward` library.
//!
//! The reconciliation core has no fatal error conditions of its own. The
//! types here cover value validation, failures reported by the device
//! client, and configuration loading.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error reported by the device client.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Error occurred while loading configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O failure outside of configuration loading (e.g. binding a listener).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u32,
        /// Maximum allowed value.
        max: u32,
        /// The actual value that was provided.
        actual: u32,
    },
}

/// Errors surfaced by a [`LightClient`](crate::client::LightClient).
///
/// The engine treats all of these as best-effort failures: they are logged
/// and the device simply fails to converge until a later tick.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The device could not be reached.
    #[error("device {0} is unreachable")]
    Unreachable(String),

    /// The command was handed to the transport but rejected or dropped.
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Errors related to loading and validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML or has wrong types.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A configuration value is semantically invalid.
    #[error("invalid config value for {field}: {message}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
