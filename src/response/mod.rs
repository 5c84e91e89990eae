// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response decoding for fireplace replies.
//!
//! The device answers every command with an ASCII frame. Frames starting with
//! one of the [`STATUS_PREAMBLES`] carry a full status report; anything else
//! is a bare acknowledgement.
//!
//! # Examples
//!
//! ```
//! use mertik_lib::response::{Response, StatusFrame};
//!
//! let wire = StatusFrame::new().with_temperature(20.5).to_wire();
//! match Response::from_wire(&wire) {
//!     Response::Status(frame) => assert!((frame.temperature_c() - 20.5).abs() < 1e-9),
//!     other => panic!("unexpected {other:?}"),
//! }
//!
//! assert_eq!(Response::from_wire(b"\x02OK\r"), Response::Acknowledged);
//! ```

mod status;

pub use status::{StatusBit, StatusFrame};

use crate::error::ParseError;

/// Preambles that mark a decoded frame as a status report.
pub const STATUS_PREAMBLES: [&str; 2] = ["303030300003", "030300000003"];

/// Decodes raw reply bytes into the frame text.
///
/// The first character is a framing artifact and is dropped, non-ASCII bytes
/// are ignored and carriage returns become `;`.
#[must_use]
pub fn decode_wire(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|b| b.is_ascii())
        .skip(1)
        .map(|&b| if b == b'\r' { ';' } else { char::from(b) })
        .collect()
}

/// Classified reply from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A status report.
    Status(StatusFrame),
    /// A reply without a status preamble.
    Acknowledged,
    /// A status preamble followed by a malformed body.
    Unparsed(ParseError),
}

impl Response {
    /// Classifies raw reply bytes.
    #[must_use]
    pub fn from_wire(bytes: &[u8]) -> Self {
        Self::from_text(&decode_wire(bytes))
    }

    /// Classifies an already decoded frame.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        if !STATUS_PREAMBLES.iter().any(|p| text.starts_with(p)) {
            return Self::Acknowledged;
        }
        match StatusFrame::parse(text) {
            Ok(frame) => Self::Status(frame),
            Err(e) => Self::Unparsed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_strips_first_byte_and_carriage_returns() {
        assert_eq!(decode_wire(b"\x02ABC\rDEF\r"), "ABC;DEF;");
    }

    #[test]
    fn decode_ignores_non_ascii() {
        assert_eq!(decode_wire(&[0x02, 0xFF, b'A', 0x80, b'B']), "AB");
    }

    #[test]
    fn decode_empty_input() {
        assert_eq!(decode_wire(&[]), "");
    }

    #[test]
    fn unknown_preamble_is_acknowledgement() {
        assert_eq!(Response::from_text("99999"), Response::Acknowledged);
    }

    #[test]
    fn truncated_status_is_unparsed() {
        assert!(matches!(
            Response::from_text("303030300003AB"),
            Response::Unparsed(ParseError::Truncated { .. })
        ));
    }

    #[test]
    fn status_frame_is_recognized() {
        let wire = StatusFrame::new().to_wire();
        assert!(matches!(Response::from_wire(&wire), Response::Status(_)));
    }
}
