// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serialized command driver.
//!
//! [`Device`] owns the transport and the confirmed [`DeviceState`]. Every
//! command passes through a single execution gate, so at most one exchange is
//! in flight per fireplace and queued callers are served in arrival order.
//! A command's exchange is retried on transport failure, its reply is decoded
//! into the state, and the gate stays closed for a cooldown afterwards.
//!
//! ```no_run
//! use mertik_lib::command::FlameCommand;
//! use mertik_lib::device::{CommandOutcome, Device};
//! use mertik_lib::protocol::TcpConfig;
//!
//! # async fn example() -> mertik_lib::Result<()> {
//! let device = Device::new(TcpConfig::new("192.168.1.60").into_client());
//!
//! match device.send_command(&FlameCommand::Ignite).await? {
//!     CommandOutcome::Unreachable(e) => eprintln!("fireplace offline: {e}"),
//!     _ => println!("igniting"),
//! }
//! # Ok(())
//! # }
//! ```

mod retry;

pub use retry::RetryPolicy;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use crate::command::{Command, RawCommand};
use crate::error::{ParseError, ProtocolError, ValueError};
use crate::protocol::Protocol;
use crate::response::{Response, StatusFrame};
use crate::state::{DeviceState, FilterOutcome, TemperatureFilter};

/// Result of a command that went through the gate.
///
/// Transport and parse failures are outcomes rather than errors: the driver
/// has already retried and logged them, and the confirmed state is left at its
/// last known values.
#[derive(Debug)]
pub enum CommandOutcome {
    /// The device answered with a status frame, now applied to the state.
    Status(StatusFrame),
    /// The device answered without a status report.
    Acknowledged,
    /// The device answered with a malformed status frame.
    Unparsed(ParseError),
    /// Every attempt failed.
    Unreachable(ProtocolError),
}

impl CommandOutcome {
    /// Returns `true` if the device answered at all.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        !matches!(self, Self::Unreachable(_))
    }

    /// Returns the status frame, if the reply carried one.
    #[must_use]
    pub fn status(&self) -> Option<&StatusFrame> {
        match self {
            Self::Status(frame) => Some(frame),
            _ => None,
        }
    }
}

/// Driver for one fireplace.
///
/// The type parameter `P` is the transport, normally
/// [`TcpClient`](crate::protocol::TcpClient).
#[derive(Debug)]
pub struct Device<P: Protocol> {
    protocol: Arc<P>,
    retry: RetryPolicy,
    cooldown: Duration,
    gate: tokio::sync::Mutex<()>,
    state: RwLock<DeviceState>,
    temperature: Mutex<TemperatureFilter>,
}

impl<P: Protocol> Device<P> {
    /// Default pause after every command.
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);

    /// Creates a driver with the default retry policy and cooldown.
    #[must_use]
    pub fn new(protocol: P) -> Self {
        Self {
            protocol: Arc::new(protocol),
            retry: RetryPolicy::default(),
            cooldown: Self::DEFAULT_COOLDOWN,
            gate: tokio::sync::Mutex::new(()),
            state: RwLock::new(DeviceState::new()),
            temperature: Mutex::new(TemperatureFilter::new()),
        }
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the pause held after every command.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Returns the transport.
    #[must_use]
    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    /// Returns a copy of the confirmed state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.state.read().clone()
    }

    /// Sends a command through the execution gate.
    ///
    /// Waits for every earlier caller, runs the exchange with retries, applies
    /// a status reply to the confirmed state and holds the gate for the
    /// cooldown before returning.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidHex` if the command cannot be framed; only
    /// raw commands can fail this way. Nothing is sent in that case.
    pub async fn send_command<C: Command + Sync + ?Sized>(
        &self,
        command: &C,
    ) -> Result<CommandOutcome, ValueError> {
        let frame = command.to_frame()?;
        let name = command.name();

        let _permit = self.gate.lock().await;
        tracing::debug!(command = name, frame = %hex::encode(&frame), "Sending command");

        let outcome = self.exchange(name, &frame).await;
        self.apply(name, &outcome);

        tokio::time::sleep(self.cooldown).await;
        Ok(outcome)
    }

    /// Forwards an arbitrary hex suffix to the device.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidHex` if the suffix is not valid hex.
    pub async fn send_raw(&self, suffix: &str) -> Result<CommandOutcome, ValueError> {
        self.send_command(&RawCommand::new(suffix)).await
    }

    async fn exchange(&self, name: &'static str, frame: &[u8]) -> CommandOutcome {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.protocol.transact(frame).await {
                Ok(reply) => return Self::classify(&reply),
                Err(e) if self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay_after_attempt(attempt);
                    tracing::warn!(
                        command = name,
                        attempt,
                        error = %e,
                        retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Command attempt failed"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(command = name, attempts = attempt, error = %e, "Fireplace unreachable");
                    return CommandOutcome::Unreachable(ProtocolError::Unreachable {
                        attempts: attempt,
                        last: e.to_string(),
                    });
                }
            }
        }
    }

    fn classify(reply: &[u8]) -> CommandOutcome {
        match Response::from_wire(reply) {
            Response::Status(frame) => CommandOutcome::Status(frame),
            Response::Acknowledged => CommandOutcome::Acknowledged,
            Response::Unparsed(e) => CommandOutcome::Unparsed(e),
        }
    }

    fn apply(&self, name: &'static str, outcome: &CommandOutcome) {
        match outcome {
            CommandOutcome::Status(frame) => {
                let ambient = self.filter_temperature(frame.temperature_c());
                let changed = self.state.write().apply_status(frame, ambient, Utc::now());
                tracing::debug!(command = name, changed, "Applied status frame");
            }
            CommandOutcome::Acknowledged => {
                tracing::debug!(command = name, "Command acknowledged");
                self.state.write().mark_stale();
            }
            CommandOutcome::Unparsed(e) => {
                tracing::warn!(command = name, error = %e, "Discarding malformed status frame");
                self.state.write().mark_stale();
            }
            CommandOutcome::Unreachable(_) => self.state.write().mark_stale(),
        }
    }

    fn filter_temperature(&self, reading: f64) -> Option<f64> {
        match self.temperature.lock().feed(reading) {
            FilterOutcome::Accepted(t) => Some(t),
            FilterOutcome::Rejected {
                reading,
                consecutive,
            } => {
                tracing::warn!(reading, consecutive, "Ignoring temperature jump");
                None
            }
            FilterOutcome::OutOfRange(reading) => {
                tracing::warn!(reading, "Ignoring implausible temperature");
                None
            }
        }
    }
}
