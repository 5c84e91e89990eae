// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session configuration.

use std::time::Duration;

use crate::device::{Device, RetryPolicy};
use crate::error::ConfigError;
use crate::protocol::{Protocol, TcpConfig};

/// Configuration of a fireplace session.
///
/// Everything but the host has a default that works with the stock Wi-Fi
/// module; the delays can be tuned for slower or faster hardware.
///
/// # Examples
///
/// ```
/// use mertik_lib::coordinator::FireplaceConfig;
/// use std::time::Duration;
///
/// let config = FireplaceConfig::new("192.168.1.60")
///     .with_cooldown(Duration::from_millis(500))
///     .with_ignition_settle(Duration::from_secs(40));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.port(), 2000);
/// assert!(FireplaceConfig::new("").validate().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct FireplaceConfig {
    host: String,
    port: u16,
    connect_timeout: Duration,
    io_timeout: Duration,
    retry: RetryPolicy,
    cooldown: Duration,
    poll_interval: Duration,
    ignition_settle: Duration,
    aux_settle: Duration,
    fan_settle: Duration,
}

impl FireplaceConfig {
    /// Default pause held after every command.
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);
    /// Default interval between status polls.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);
    /// Default wait between ignition and the drop to pilot.
    pub const DEFAULT_IGNITION_SETTLE: Duration = Duration::from_secs(30);
    /// Default wait after closing the secondary burner.
    pub const DEFAULT_AUX_SETTLE: Duration = Duration::from_secs(1);
    /// Default wait between switching the fan off and on again.
    pub const DEFAULT_FAN_SETTLE: Duration = Duration::from_secs(1);

    /// Creates a configuration for the specified host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: TcpConfig::DEFAULT_PORT,
            connect_timeout: TcpConfig::DEFAULT_TIMEOUT,
            io_timeout: TcpConfig::DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            cooldown: Self::DEFAULT_COOLDOWN,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            ignition_settle: Self::DEFAULT_IGNITION_SETTLE,
            aux_settle: Self::DEFAULT_AUX_SETTLE,
            fan_settle: Self::DEFAULT_FAN_SETTLE,
        }
    }

    /// Sets the control port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the write and read timeouts.
    #[must_use]
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
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

    /// Sets the interval between status polls.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the wait between ignition and the drop to pilot.
    #[must_use]
    pub fn with_ignition_settle(mut self, delay: Duration) -> Self {
        self.ignition_settle = delay;
        self
    }

    /// Sets the wait after closing the secondary burner.
    #[must_use]
    pub fn with_aux_settle(mut self, delay: Duration) -> Self {
        self.aux_settle = delay;
        self
    }

    /// Sets the wait between switching the fan off and on again.
    #[must_use]
    pub fn with_fan_settle(mut self, delay: Duration) -> Self {
        self.fan_settle = delay;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Returns the post-command cooldown.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the ignition settle delay.
    #[must_use]
    pub fn ignition_settle(&self) -> Duration {
        self.ignition_settle
    }

    /// Returns the secondary burner settle delay.
    #[must_use]
    pub fn aux_settle(&self) -> Duration {
        self.aux_settle
    }

    /// Returns the fan settle delay.
    #[must_use]
    pub fn fan_settle(&self) -> Duration {
        self.fan_settle
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the host is empty, the port is 0, or the poll
    /// interval or a timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }
        for (name, value) in [
            ("poll_interval", self.poll_interval),
            ("connect_timeout", self.connect_timeout),
            ("io_timeout", self.io_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration(name));
            }
        }
        Ok(())
    }

    /// Returns the transport configuration.
    #[must_use]
    pub fn tcp_config(&self) -> TcpConfig {
        TcpConfig::new(self.host.trim())
            .with_port(self.port)
            .with_connect_timeout(self.connect_timeout)
            .with_io_timeout(self.io_timeout)
    }

    /// Creates a driver over the given transport with this configuration's
    /// retry policy and cooldown.
    #[must_use]
    pub fn device<P: Protocol>(&self, protocol: P) -> Device<P> {
        Device::new(protocol)
            .with_retry_policy(self.retry)
            .with_cooldown(self.cooldown)
    }
}
