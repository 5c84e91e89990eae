// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan speed type for the circulation fan.

use std::fmt;

use crate::error::ValueError;

/// Fan speed as a percentage (0-100).
///
/// The blower only knows four steps; [`level`](Self::level) maps the
/// percentage onto them by ceiling division by 25.
///
/// # Examples
///
/// ```
/// use mertik_lib::types::FanSpeed;
///
/// assert_eq!(FanSpeed::new(1).unwrap().level(), 1);
/// assert_eq!(FanSpeed::new(26).unwrap().level(), 2);
/// assert_eq!(FanSpeed::new(100).unwrap().level(), 4);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FanSpeed(u8);

impl FanSpeed {
    /// Maximum percentage.
    pub const MAX: u8 = 100;

    /// Number of hardware steps.
    pub const LEVELS: u8 = 4;

    /// Creates a new fan speed.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the percentage is above 100.
    pub fn new(percentage: u8) -> Result<Self, ValueError> {
        if percentage > Self::MAX {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: u16::from(Self::MAX),
                actual: u16::from(percentage),
            });
        }
        Ok(Self(percentage))
    }

    /// Returns the percentage.
    #[must_use]
    pub const fn percentage(&self) -> u8 {
        self.0
    }

    /// Returns the hardware step (0 = off, 1-4).
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.0.div_ceil(25)
    }

    /// Returns whether this speed means "off".
    #[must_use]
    pub const fn is_off(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
