// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating mode token reported by the fireplace.

use std::fmt;

/// Raw operating mode token from the status frame.
///
/// The device defines the tokens; only the eco ("wave") token is known to
/// carry meaning, everything else is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct OperatingMode(String);

impl OperatingMode {
    /// Token reported while the flame runs the eco wave pattern.
    pub const ECO_TOKEN: &'static str = "2";

    /// Wraps a raw mode token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the fireplace reports eco mode.
    #[must_use]
    pub fn is_eco(&self) -> bool {
        self.0 == Self::ECO_TOKEN
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
