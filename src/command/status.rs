// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status poll and raw pass-through commands.

use crate::command::Command;

/// Command asking the device for a status frame.
///
/// # Examples
///
/// ```
/// use mertik_lib::command::{Command, StatusCommand};
///
/// assert_eq!(StatusCommand.suffix(), "303303");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCommand;

impl Command for StatusCommand {
    fn name(&self) -> &'static str {
        "status"
    }

    fn suffix(&self) -> String {
        "303303".to_string()
    }
}

/// Arbitrary hex suffix forwarded to the device without interpretation.
///
/// Intended for diagnostics and for commands this library does not model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommand(String);

impl RawCommand {
    /// Creates a raw command from a hex suffix (without the preamble).
    #[must_use]
    pub fn new(suffix: impl Into<String>) -> Self {
        Self(suffix.into())
    }
}

impl Command for RawCommand {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn suffix(&self) -> String {
        self.0.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_suffix_is_passed_through() {
        let cmd = RawCommand::new("3136383003");
        assert_eq!(cmd.suffix(), "3136383003");
        assert!(cmd.to_frame().is_ok());
    }
}
