// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `Mertik` Lib - A Rust library to drive Wi-Fi gas fireplace inserts.
//!
//! The fireplace's Wi-Fi module speaks an ASCII-hex protocol over TCP
//! port 2000: one command per connection, answered by a status frame or a
//! bare acknowledgment. This library encodes the commands, decodes the status
//! frames, serializes access to the module and layers a polling coordinator
//! and a proportional thermostat on top.
//!
//! # Supported Features
//!
//! - **Burner control**: ignite, full shutdown, 13 flame heights, standing pilot
//! - **Outputs**: secondary burner, dimmable light, fan with speed selection
//! - **Flame pattern**: eco wave or static flame
//! - **Status**: flame, ignition/shutdown sequence, guard flame, battery,
//!   RF signal, ambient temperature (glitch filtered)
//! - **Automation**: polling with intent reconciliation, thermostat
//! - **Discovery**: UDP broadcast probe (feature `discovery`)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use mertik_lib::{FireplaceConfig, Session};
//! use mertik_lib::store::MemoryStore;
//! use mertik_lib::types::FlameHeight;
//!
//! #[tokio::main]
//! async fn main() -> mertik_lib::Result<()> {
//!     let session = Session::connect(
//!         FireplaceConfig::new("192.168.1.60"),
//!         Arc::new(MemoryStore::new()),
//!     )?;
//!     session.start().await;
//!
//!     let fireplace = session.coordinator();
//!     fireplace.ignite().await?;
//!     fireplace.set_flame_height(FlameHeight::new(6)?).await?;
//!     fireplace.set_light_brightness(128).await?;
//!
//!     println!("{:?}", fireplace.snapshot());
//!     session.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## Talking to the Driver Directly
//!
//! The [`device::Device`] driver can be used without the coordinator; it
//! only gates, retries and decodes.
//!
//! ```no_run
//! use mertik_lib::command::StatusCommand;
//! use mertik_lib::device::Device;
//! use mertik_lib::protocol::TcpConfig;
//!
//! # async fn example() -> mertik_lib::Result<()> {
//! let device = Device::new(TcpConfig::new("192.168.1.60").into_client());
//! device.send_command(&StatusCommand).await?;
//! println!("on: {}", device.state().is_on());
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod command;
pub mod coordinator;
pub mod device;
#[cfg(feature = "discovery")]
pub mod discovery;
pub mod error;
pub mod event;
pub mod protocol;
pub mod response;
mod session;
pub mod state;
pub mod store;
pub mod thermostat;
pub mod types;

#[cfg(test)]
mod fake;

pub use command::{Command, FlameCommand, StatusCommand};
pub use coordinator::{FireplaceConfig, FireplaceCoordinator, FireplaceSnapshot};
pub use error::{Error, ParseError, PolicyViolation, ProtocolError, Result, ValueError};
pub use event::FireplaceEvent;
pub use session::Session;
pub use types::{FanSpeed, FlameHeight};
