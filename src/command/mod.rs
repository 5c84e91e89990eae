// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fireplace command definitions.
//!
//! This module provides typed representations of the commands understood by
//! the fireplace's Wi-Fi module.
//!
//! # Available Commands
//!
//! | Command Type | Purpose | Example |
//! |-------------|---------|---------|
//! | [`FlameCommand`] | Main burner control | Ignite, pilot, height 0-12 |
//! | [`LightCommand`] | Light output | On, Off, brightness |
//! | [`AuxCommand`] | Secondary burner valve | On, Off |
//! | [`FanCommand`] | Circulation fan | On, Off, speed |
//! | [`ModeCommand`] | Flame pattern | Eco wave, manual |
//! | [`StatusCommand`] | Status poll | - |
//! | [`RawCommand`] | Diagnostic pass-through | any hex suffix |
//!
//! # Frame Structure
//!
//! Every outbound frame is the hex-encoded [`COMMAND_PREAMBLE`] followed by a
//! command-specific hex suffix. The concatenated hex string is decoded into the
//! raw bytes written to the socket.
//!
//! ```
//! use mertik_lib::command::{Command, FlameCommand};
//!
//! let cmd = FlameCommand::Ignite;
//! assert_eq!(cmd.suffix(), "314103");
//! assert_eq!(cmd.frame_hex(), "0233303330333033303830314103");
//! ```

mod accessory;
mod flame;
mod light;
mod mode;
mod status;

pub use accessory::{AuxCommand, FanCommand};
pub use flame::{FLAME_STEP_CODES, FlameCommand};
pub use light::LightCommand;
pub use mode::ModeCommand;
pub use status::{RawCommand, StatusCommand};

use crate::error::ValueError;

/// Hex preamble that precedes every command sent to the device.
pub const COMMAND_PREAMBLE: &str = "0233303330333033303830";

/// A command that can be sent to the fireplace.
pub trait Command {
    /// Returns a short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the command-specific hex suffix.
    fn suffix(&self) -> String;

    /// Returns the full frame as a hex string.
    fn frame_hex(&self) -> String {
        format!("{COMMAND_PREAMBLE}{}", self.suffix())
    }

    /// Returns the raw bytes to write to the socket.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidHex` if the suffix is not valid hex. Typed
    /// commands never fail; only [`RawCommand`] can.
    fn to_frame(&self) -> Result<Vec<u8>, ValueError> {
        let frame = self.frame_hex();
        hex::decode(&frame).map_err(|e| ValueError::InvalidHex(format!("{}: {e}", self.suffix())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_prepends_preamble() {
        let frame = StatusCommand.to_frame().unwrap();
        assert_eq!(
            frame,
            vec![
                0x02, 0x33, 0x30, 0x33, 0x30, 0x33, 0x30, 0x33, 0x30, 0x38, 0x30, 0x30, 0x33,
                0x03
            ]
        );
    }

    #[test]
    fn invalid_raw_suffix_is_rejected() {
        let cmd = RawCommand::new("31zz");
        assert!(matches!(cmd.to_frame(), Err(ValueError::InvalidHex(_))));
    }

    #[test]
    fn odd_length_raw_suffix_is_rejected() {
        let cmd = RawCommand::new("314");
        assert!(cmd.to_frame().is_err());
    }
}
