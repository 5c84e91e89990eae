// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fireplace state tracking.
//!
//! [`DeviceState`] holds what the device last confirmed; it is written only
//! from decoded status frames. [`ControlIntent`] holds what software has
//! commanded but not yet seen confirmed. [`TemperatureFilter`] debounces the
//! ambient readings before they reach the confirmed state.
//!
//! # Examples
//!
//! ```
//! use chrono::Utc;
//! use mertik_lib::response::StatusFrame;
//! use mertik_lib::state::{DeviceState, FilterOutcome, TemperatureFilter};
//!
//! let frame = StatusFrame::new().with_temperature(21.5);
//! let mut filter = TemperatureFilter::new();
//! let ambient = match filter.feed(frame.temperature_c()) {
//!     FilterOutcome::Accepted(t) => Some(t),
//!     _ => None,
//! };
//!
//! let mut state = DeviceState::new();
//! state.apply_status(&frame, ambient, Utc::now());
//! assert_eq!(state.ambient_temperature_c(), Some(21.5));
//! ```

mod device_state;
mod intent;
mod temperature_filter;

pub use device_state::DeviceState;
pub use intent::ControlIntent;
pub use temperature_filter::{FilterOutcome, TemperatureFilter};
