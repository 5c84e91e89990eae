// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Secondary burner and fan commands.

use crate::command::Command;
use crate::types::FanSpeed;

/// Command switching the auxiliary (secondary) burner valve.
///
/// # Examples
///
/// ```
/// use mertik_lib::command::{AuxCommand, Command};
///
/// assert_eq!(AuxCommand::On.suffix(), "32303031030a");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxCommand {
    /// Open the secondary valve.
    On,
    /// Close the secondary valve.
    Off,
}

impl Command for AuxCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::On => "aux_on",
            Self::Off => "aux_off",
        }
    }

    fn suffix(&self) -> String {
        match self {
            Self::On => "32303031030a",
            Self::Off => "32303030030a",
        }
        .to_string()
    }
}

/// Command controlling the circulation fan.
///
/// `SetSpeed` writes the step level (1-4) as an ASCII digit after the
/// `"410"` speed selector.
///
/// # Examples
///
/// ```
/// use mertik_lib::command::{Command, FanCommand};
/// use mertik_lib::types::FanSpeed;
///
/// assert_eq!(FanCommand::Off.suffix(), "3430303003");
/// assert_eq!(
///     FanCommand::SetSpeed(FanSpeed::new(60).unwrap()).suffix(),
///     "3431303303"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanCommand {
    /// Start the fan.
    On,
    /// Stop the fan.
    Off,
    /// Select a speed step.
    SetSpeed(FanSpeed),
}

impl Command for FanCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::On => "fan_on",
            Self::Off => "fan_off",
            Self::SetSpeed(_) => "set_fan_speed",
        }
    }

    fn suffix(&self) -> String {
        match self {
            Self::On => "3430303103".to_string(),
            Self::Off => "3430303003".to_string(),
            Self::SetSpeed(speed) => format!("3431303{}03", speed.level()),
        }
    }
}
