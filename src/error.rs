// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `mertik_lib` library.
//!
//! Transport and frame-parsing failures are handled inside the driver and the
//! coordinator (retried, logged, reported as stale state). Only value
//! validation, policy violations and configuration problems reach callers of
//! the write operations.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the fireplace.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a status frame.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The requested operation is not allowed in the current control state.
    #[error("rejected: {0}")]
    Policy(#[from] PolicyViolation),

    /// The session configuration is unusable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Persisted state could not be loaded or saved.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// A floating-point value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite {
        /// The value that was rejected.
        field: &'static str,
    },

    /// A raw command suffix is not a valid hex string.
    #[error("invalid hex command suffix: {0}")]
    InvalidHex(String),
}

/// Transport failures while exchanging a frame with the fireplace.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Socket-level failure (refused, reset, broken pipe).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stage of the exchange did not complete in time.
    #[error("{stage} timed out after {millis} ms")]
    Timeout {
        /// The stage that timed out (`connect`, `write` or `read`).
        stage: &'static str,
        /// The timeout that elapsed.
        millis: u64,
    },

    /// The device closed the connection without answering.
    #[error("empty response")]
    EmptyResponse,

    /// Every attempt of the retry budget failed.
    #[error("device unreachable after {attempts} attempts: {last}")]
    Unreachable {
        /// Number of attempts made.
        attempts: u32,
        /// Description of the last failure.
        last: String,
    },
}

/// Errors related to parsing fireplace status frames.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The frame does not start with a known status preamble.
    #[error("unknown frame preamble")]
    UnknownPreamble,

    /// The frame is shorter than the last field offset.
    #[error("truncated frame: {len} chars, need {needed}")]
    Truncated {
        /// Length of the decoded frame.
        len: usize,
        /// Length required to read every field.
        needed: usize,
    },

    /// A fixed-offset field is not valid hex.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: &'static str,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Operations rejected because of the current control state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    /// Manual flame control is locked while the thermostat is heating.
    #[error("flame height is controlled by the thermostat; switch the thermostat off first")]
    ThermostatActive,
}

/// Errors in the session configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No device address was configured.
    #[error("missing device host")]
    MissingHost,

    /// The TCP port is zero.
    #[error("invalid port: {0}")]
    InvalidPort(u16),

    /// A duration that must be positive is zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Errors while loading or saving persisted state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document is not valid JSON for the expected schema.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
