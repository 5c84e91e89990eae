// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light output commands.

use crate::command::Command;

const BRIGHTNESS_PREFIX: &str = "33304645";
const BRIGHTNESS_OFF_CODE: &str = "3633";
const BRIGHTNESS_MAX_CODE: &str = "4642";

/// Command controlling the fireplace light.
///
/// # Examples
///
/// ```
/// use mertik_lib::command::{Command, LightCommand};
///
/// assert_eq!(LightCommand::On.suffix(), "3330303103");
/// assert_eq!(LightCommand::SetBrightness(255).suffix(), "33304645464203");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCommand {
    /// Switch the light on at its previous brightness.
    On,
    /// Switch the light off.
    Off,
    /// Set an 8-bit brightness (1-255).
    SetBrightness(u8),
}

impl LightCommand {
    /// Returns the device code for an 8-bit brightness.
    ///
    /// The brightness is normalized to a percentage; the extremes use fixed
    /// codes and the values in between map onto the device's 36-45 dimming
    /// steps (40 is skipped), rendered as a doubled two-digit string.
    #[must_use]
    pub fn brightness_code(brightness: u8) -> String {
        match brightness {
            0 | 1 => BRIGHTNESS_OFF_CODE.to_string(),
            255 => BRIGHTNESS_MAX_CODE.to_string(),
            b => {
                let percentage = f64::from(b - 1) / 254.0 * 100.0;
                // percentage / 100 * 8 is within [0, 8]
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let mut step = 36 + (percentage / 100.0 * 8.0).round() as u8;
                if step >= 40 {
                    step += 1;
                }
                format!("{step:02}{step:02}")
            }
        }
    }
}

impl Command for LightCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::On => "light_on",
            Self::Off => "light_off",
            Self::SetBrightness(_) => "set_light_brightness",
        }
    }

    fn suffix(&self) -> String {
        match self {
            Self::On => "3330303103".to_string(),
            Self::Off => "3330303003".to_string(),
            Self::SetBrightness(b) => {
                format!("{BRIGHTNESS_PREFIX}{}03", Self::brightness_code(*b))
            }
        }
    }
}
