// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport layer for talking to the fireplace.
//!
//! The fireplace's Wi-Fi module accepts one request per TCP connection: the
//! client connects, writes a frame and reads a single reply. [`TcpClient`]
//! implements that exchange; the [`Protocol`] trait lets the driver run
//! against any other transport (tests use an in-memory fake).

mod tcp;

pub use tcp::{TcpClient, TcpConfig};

use std::future::Future;

use crate::error::ProtocolError;

/// A transport that performs one request/reply exchange with the device.
///
/// Implementations perform a single attempt. Retries, backoff and the
/// post-command cooldown are the driver's business.
pub trait Protocol: Send + Sync {
    /// Sends a raw frame and returns the raw reply bytes.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the connection, the write or the read fails
    /// or times out, or if the device closes the connection without replying.
    fn transact(
        &self,
        frame: &[u8],
    ) -> impl Future<Output = Result<Vec<u8>, ProtocolError>> + Send;
}
