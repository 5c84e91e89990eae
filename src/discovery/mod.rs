// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! UDP broadcast discovery of Wi-Fi fireplace modules.
//!
//! A probe is broadcast to the modules' discovery port and the first module
//! to answer is returned. Only one fireplace per network is expected; run
//! discovery again to find another.
//!
//! # Examples
//!
//! ```no_run
//! use mertik_lib::discovery::{DiscoveryOptions, discover};
//! use std::time::Duration;
//!
//! # async fn example() -> mertik_lib::Result<()> {
//! let options = DiscoveryOptions::new().with_timeout(Duration::from_secs(5));
//!
//! match discover(options).await? {
//!     Some(addr) => println!("fireplace at {addr}"),
//!     None => println!("no fireplace answered"),
//! }
//! # Ok(())
//! # }
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;

use crate::error::{Error, ProtocolError};

/// Probe payload.
const PROBE: [u8; 4] = [0x00, 0x01, 0x00, 0xf6];

/// Default discovery timeout.
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Options for broadcast discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    timeout: Duration,
    listen_port: u16,
    target: SocketAddr,
}

impl DiscoveryOptions {
    /// Port the modules listen on for probes.
    pub const TARGET_PORT: u16 = 30718;
    /// Port the probe is sent from and answers arrive on.
    pub const LISTEN_PORT: u16 = 30719;

    /// Creates options with the stock ports and a 3 second timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_DISCOVERY_TIMEOUT,
            listen_port: Self::LISTEN_PORT,
            target: SocketAddr::from((Ipv4Addr::BROADCAST, Self::TARGET_PORT)),
        }
    }

    /// Sets how long to wait for an answer.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the local port; 0 lets the system pick one.
    #[must_use]
    pub fn with_listen_port(mut self, port: u16) -> Self {
        self.listen_port = port;
        self
    }

    /// Sends the probe to a specific address instead of the broadcast
    /// address.
    #[must_use]
    pub fn with_target(mut self, target: SocketAddr) -> Self {
        self.target = target;
        self
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Broadcasts a probe and returns the address of the first module to answer.
///
/// Returns `Ok(None)` if nothing answered within the timeout.
///
/// # Errors
///
/// Returns `ProtocolError::Io` if the socket cannot be bound or the probe
/// cannot be sent.
pub async fn discover(options: DiscoveryOptions) -> Result<Option<IpAddr>, Error> {
    let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, options.listen_port)))
        .await
        .map_err(ProtocolError::Io)?;
    socket.set_broadcast(true).map_err(ProtocolError::Io)?;

    tracing::info!(
        target_addr = %options.target,
        timeout_ms = u64::try_from(options.timeout.as_millis()).unwrap_or(u64::MAX),
        "Starting fireplace discovery"
    );
    socket
        .send_to(&PROBE, options.target)
        .await
        .map_err(ProtocolError::Io)?;

    let mut buf = [0_u8; 1024];
    match tokio::time::timeout(options.timeout, socket.recv_from(&mut buf)).await {
        Ok(Ok((len, from))) => {
            tracing::info!(%from, len, "Fireplace answered discovery");
            Ok(Some(from.ip()))
        }
        Ok(Err(e)) => Err(ProtocolError::Io(e).into()),
        Err(_) => {
            tracing::info!("No fireplace answered discovery");
            Ok(None)
        }
    }
}
