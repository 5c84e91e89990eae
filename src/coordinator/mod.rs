// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polling coordinator.
//!
//! [`FireplaceCoordinator`] sits between hosts and the [`Device`] driver. It
//! keeps the software intent next to the confirmed device state, reconciles
//! the two after every poll, and publishes [`FireplaceSnapshot`]s on its event
//! bus.
//!
//! After an outage the device's reported state wins unless smart sync is
//! enabled, in which case the commanded state is kept until
//! [`FireplaceCoordinator::resync`] pushes it back. While the coordinator
//! believes the fireplace is on, a single "off" reading is tolerated before it
//! adopts the device's state.
//!
//! [`Device`]: crate::device::Device

mod config;
mod fireplace_coordinator;
mod snapshot;
mod sync;

pub use config::FireplaceConfig;
pub use fireplace_coordinator::FireplaceCoordinator;
pub use snapshot::{FireplaceSnapshot, Preferences};
pub use sync::Availability;
