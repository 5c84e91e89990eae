// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flame pattern commands.

use crate::command::Command;

/// Command selecting the flame pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeCommand {
    /// Eco "wave" pattern.
    Eco,
    /// Static flame at the selected height.
    Manual,
}

impl Command for ModeCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Eco => "set_eco",
            Self::Manual => "set_manual",
        }
    }

    fn suffix(&self) -> String {
        match self {
            Self::Eco => "4233303103",
            Self::Manual => "423003",
        }
        .to_string()
    }
}
