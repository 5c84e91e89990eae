// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flame height type for the main burner.

use std::fmt;

use crate::error::ValueError;

/// Flame height of the main burner (0-12).
///
/// - 0 = pilot / standby
/// - 12 = maximum flame
///
/// # Examples
///
/// ```
/// use mertik_lib::types::FlameHeight;
///
/// let height = FlameHeight::new(6).unwrap();
/// assert_eq!(height.value(), 6);
///
/// assert!(FlameHeight::PILOT.is_pilot());
/// assert!(FlameHeight::new(13).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FlameHeight(u8);

impl FlameHeight {
    /// Minimum height (pilot).
    pub const MIN: u8 = 0;

    /// Maximum height.
    pub const MAX: u8 = 12;

    /// Pilot flame.
    pub const PILOT: Self = Self(0);

    /// Lowest burning step above pilot.
    pub const LOWEST: Self = Self(1);

    /// Full flame.
    pub const FULL: Self = Self(12);

    /// Creates a new flame height.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is above 12.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > Self::MAX {
            return Err(ValueError::OutOfRange {
                min: u16::from(Self::MIN),
                max: u16::from(Self::MAX),
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a flame height, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: i64) -> Self {
        if value < Self::MIN as i64 {
            Self(Self::MIN)
        } else if value > Self::MAX as i64 {
            Self(Self::MAX)
        } else {
            // Range checked above.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Self(value as u8)
        }
    }

    /// Returns the height value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns whether this is the pilot height.
    #[must_use]
    pub const fn is_pilot(&self) -> bool {
        self.0 == 0
    }
}

impl Default for FlameHeight {
    fn default() -> Self {
        Self::PILOT
    }
}

impl fmt::Display for FlameHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for FlameHeight {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
