// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for fireplace control.
//!
//! Each type ensures values are within their valid ranges at construction
//! time.
//!
//! # Types
//!
//! - [`FlameHeight`] - Main burner step (0 = pilot, 12 = max)
//! - [`FanSpeed`] - Blower percentage (0-100) mapped to four steps
//! - [`OperatingMode`] - Raw flame mode token reported by the device

mod fan_speed;
mod flame_height;
mod mode;

pub use fan_speed::FanSpeed;
pub use flame_height::FlameHeight;
pub use mode::OperatingMode;
