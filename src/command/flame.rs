// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Main burner commands.

use crate::command::Command;
use crate::types::FlameHeight;

/// Step codes for flame heights 0-12, indexed by height.
///
/// Each code is the hex encoding of the two ASCII characters the device
/// expects (`"3830"` is `"80"`). The progression is monotonic but not linear.
pub const FLAME_STEP_CODES: [&str; 13] = [
    "3030", "3830", "3842", "3937", "4132", "4145", "4239", "4335", "4430", "4443", "4537",
    "4633", "4646",
];

const FLAME_PREFIX: &str = "3136";
const FRAME_END: &str = "03";

/// Command controlling the main burner.
///
/// # Examples
///
/// ```
/// use mertik_lib::command::{Command, FlameCommand};
/// use mertik_lib::types::FlameHeight;
///
/// let cmd = FlameCommand::SetHeight(FlameHeight::FULL);
/// assert_eq!(cmd.suffix(), "3136464603");
///
/// // Dropping to pilot is the height-0 frame.
/// assert_eq!(FlameCommand::PilotStandby.suffix(), "3136303003");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlameCommand {
    /// Start the ignition sequence.
    Ignite,
    /// Full shutdown ("guard flame off"), pilot included.
    Shutdown,
    /// Drop to the standing pilot.
    PilotStandby,
    /// Set the main burner height.
    SetHeight(FlameHeight),
}

impl FlameCommand {
    /// Returns the step code for a flame height.
    #[must_use]
    pub fn step_code(height: FlameHeight) -> &'static str {
        FLAME_STEP_CODES[usize::from(height.value())]
    }
}

impl Command for FlameCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Ignite => "ignite",
            Self::Shutdown => "shutdown",
            Self::PilotStandby => "pilot_standby",
            Self::SetHeight(_) => "set_flame_height",
        }
    }

    fn suffix(&self) -> String {
        match self {
            Self::Ignite => "314103".to_string(),
            Self::Shutdown => "313003".to_string(),
            Self::PilotStandby => format!(
                "{FLAME_PREFIX}{}{FRAME_END}",
                Self::step_code(FlameHeight::PILOT)
            ),
            Self::SetHeight(height) => {
                format!("{FLAME_PREFIX}{}{FRAME_END}", Self::step_code(*height))
            }
        }
    }
}
