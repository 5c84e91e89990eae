// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TCP transport for the fireplace's Wi-Fi module.

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::ProtocolError;
use crate::protocol::Protocol;

const READ_BUFFER_SIZE: usize = 1024;

/// Connection parameters for a fireplace.
///
/// # Examples
///
/// ```
/// use mertik_lib::protocol::TcpConfig;
/// use std::time::Duration;
///
/// let config = TcpConfig::new("192.168.1.60")
///     .with_port(2000)
///     .with_connect_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.address(), "192.168.1.60:2000");
/// assert_eq!(config.io_timeout(), TcpConfig::DEFAULT_TIMEOUT);
/// ```
#[derive(Debug, Clone)]
pub struct TcpConfig {
    host: String,
    port: u16,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl TcpConfig {
    /// Default control port.
    pub const DEFAULT_PORT: u16 = 2000;
    /// Default timeout for each stage of an exchange.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the specified host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            connect_timeout: Self::DEFAULT_TIMEOUT,
            io_timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
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

    /// Sets the timeout applied separately to the write and to the read.
    #[must_use]
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
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

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the write/read timeout.
    #[must_use]
    pub fn io_timeout(&self) -> Duration {
        self.io_timeout
    }

    /// Returns `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Creates a `TcpClient` from this configuration.
    #[must_use]
    pub fn into_client(self) -> TcpClient {
        TcpClient { config: self }
    }
}

/// One-shot TCP client.
///
/// Every exchange opens a fresh connection, which is closed when the exchange
/// ends, successfully or not.
///
/// # Examples
///
/// ```no_run
/// use mertik_lib::command::{Command, StatusCommand};
/// use mertik_lib::protocol::{Protocol, TcpConfig};
///
/// # async fn example() -> mertik_lib::Result<()> {
/// let client = TcpConfig::new("192.168.1.60").into_client();
/// let reply = client.transact(&StatusCommand.to_frame()?).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TcpClient {
    config: TcpConfig,
}

impl TcpClient {
    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TcpConfig {
        &self.config
    }

    async fn exchange(&self, frame: &[u8]) -> Result<Vec<u8>, ProtocolError> {
        let address = self.config.address();

        let mut stream = with_timeout(
            "connect",
            self.config.connect_timeout,
            TcpStream::connect(&address),
        )
        .await?;

        with_timeout("write", self.config.io_timeout, async {
            stream.write_all(frame).await?;
            stream.flush().await
        })
        .await?;

        tracing::debug!(address = %address, frame = %hex::encode(frame), "Sent frame");

        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let n = with_timeout("read", self.config.io_timeout, stream.read(&mut buf)).await?;
        if n == 0 {
            return Err(ProtocolError::EmptyResponse);
        }
        buf.truncate(n);

        tracing::debug!(address = %address, reply = %hex::encode(&buf), "Received reply");

        Ok(buf)
    }
}

impl Protocol for TcpClient {
    fn transact(
        &self,
        frame: &[u8],
    ) -> impl Future<Output = Result<Vec<u8>, ProtocolError>> + Send {
        self.exchange(frame)
    }
}

async fn with_timeout<T>(
    stage: &'static str,
    limit: Duration,
    fut: impl Future<Output = std::io::Result<T>>,
) -> Result<T, ProtocolError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(ProtocolError::Io),
        Err(_) => Err(ProtocolError::Timeout {
            stage,
            millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TcpConfig::new("fireplace.local");
        assert_eq!(config.port(), 2000);
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.io_timeout(), Duration::from_secs(10));
        assert_eq!(config.address(), "fireplace.local:2000");
    }

    #[test]
    fn into_client_keeps_config() {
        let client = TcpConfig::new("10.0.0.2").with_port(2100).into_client();
        assert_eq!(client.config().address(), "10.0.0.2:2100");
    }

    #[tokio::test]
    async fn refused_connection_is_io_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = TcpConfig::new("127.0.0.1")
            .with_port(port)
            .with_connect_timeout(Duration::from_secs(2))
            .into_client();
        let err = client.transact(b"\x02").await.unwrap_err();
        assert!(matches!(err, ProtocolError::Io(_)));
    }
}
