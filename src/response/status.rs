// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status frame decoding.
//!
//! A status frame is an ASCII string of hex pairs at fixed offsets:
//!
//! | Offset | Field |
//! |--------|-------|
//! | `[0:12]` | preamble |
//! | `[12:14]` | RF signal level |
//! | `[14:16]` | flame height (raw) |
//! | `[16:20]` | status bits |
//! | `[20:22]` | light brightness (raw) |
//! | `[24:25]` | operating mode token |
//! | `[30:32]` | ambient temperature, tenths of a degree |

use crate::error::ParseError;
use crate::types::{FlameHeight, OperatingMode};

use super::STATUS_PREAMBLES;

/// Raw flame byte the device reports for each table step (index = height).
const FLAME_STEP_BYTES: [u8; 13] = [
    0x00, 0x80, 0x8B, 0x97, 0xA2, 0xAE, 0xB9, 0xC5, 0xD0, 0xDC, 0xE7, 0xF3, 0xFF,
];

/// Raw flame bytes at or below this value mean the main burner is off.
const BURNER_OFF_THRESHOLD: u8 = 123;

/// Minimum decoded length needed to read every field.
const MIN_FRAME_LEN: usize = 32;

/// Flags carried in the 16-bit status field, numbered MSB-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBit {
    /// The burner is running its shutdown sequence.
    ShuttingDown = 7,
    /// Guard flame (standing pilot / lockout) flag.
    GuardFlame = 8,
    /// Receiver battery is low.
    LowBattery = 9,
    /// The ignition sequence is running.
    Igniting = 11,
    /// Secondary burner valve open.
    Aux = 12,
    /// Light output on.
    Light = 13,
    /// Circulation fan on.
    Fan = 14,
}

impl StatusBit {
    const fn mask(self) -> u16 {
        1 << (15 - self as u16)
    }
}

/// A decoded status frame.
///
/// Accessors derive the logical values from the raw fields; the values are
/// not filtered (see [`TemperatureFilter`](crate::state::TemperatureFilter)).
///
/// # Examples
///
/// ```
/// use mertik_lib::response::{StatusBit, StatusFrame};
/// use mertik_lib::types::FlameHeight;
///
/// let frame = StatusFrame::new()
///     .with_flame_height(FlameHeight::new(5).unwrap())
///     .with_bit(StatusBit::Light, true)
///     .with_light_brightness(255);
///
/// let wire = frame.to_wire();
/// let text = mertik_lib::response::decode_wire(&wire);
/// let parsed = StatusFrame::parse(&text).unwrap();
///
/// assert_eq!(parsed.flame_height().value(), 5);
/// assert!(parsed.light_on());
/// assert_eq!(parsed.light_brightness(), 255);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFrame {
    rf_signal_raw: u8,
    flame_raw: u8,
    status_bits: u16,
    light_raw: u8,
    mode: String,
    temperature_raw: u8,
}

impl StatusFrame {
    /// Creates an all-off frame (burner off, no flags, 0.0 °C).
    #[must_use]
    pub fn new() -> Self {
        Self {
            rf_signal_raw: 0,
            flame_raw: 0,
            status_bits: 0,
            light_raw: 0,
            mode: "1".to_string(),
            temperature_raw: 0,
        }
    }

    /// Parses a decoded frame (see [`decode_wire`](super::decode_wire)).
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the preamble is unknown, the frame is too short
    /// or a field is not valid hex.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        if !STATUS_PREAMBLES.iter().any(|p| text.starts_with(p)) {
            return Err(ParseError::UnknownPreamble);
        }
        if text.len() < MIN_FRAME_LEN {
            return Err(ParseError::Truncated {
                len: text.len(),
                needed: MIN_FRAME_LEN,
            });
        }

        let status_raw = field(text, 16, 20, "status_bits")?;
        let status_bits =
            u16::from_str_radix(status_raw, 16).map_err(|e| ParseError::InvalidValue {
                field: "status_bits",
                message: e.to_string(),
            })?;

        Ok(Self {
            rf_signal_raw: hex_byte(text, 12, "rf_signal")?,
            flame_raw: hex_byte(text, 14, "flame_height")?,
            status_bits,
            light_raw: hex_byte(text, 20, "light_brightness")?,
            mode: field(text, 24, 25, "mode")?.to_string(),
            temperature_raw: hex_byte(text, 30, "temperature")?,
        })
    }

    // ========== Derived values ==========

    /// Returns whether the main burner is lit.
    #[must_use]
    pub fn main_burner_on(&self) -> bool {
        self.flame_raw > BURNER_OFF_THRESHOLD
    }

    /// Returns the flame height.
    ///
    /// Raw bytes matching a table step decode to that step exactly; anything
    /// else is scaled proportionally (ties to even) and clamped to 12.
    #[must_use]
    pub fn flame_height(&self) -> FlameHeight {
        if !self.main_burner_on() {
            return FlameHeight::PILOT;
        }
        if let Some(step) = FLAME_STEP_BYTES.iter().position(|&b| b == self.flame_raw) {
            return FlameHeight::clamped(step as i64);
        }
        let scaled = ((f64::from(self.flame_raw) - 128.0) / 128.0 * 12.0).round_ties_even();
        // scaled is within [-1, 12]
        #[allow(clippy::cast_possible_truncation)]
        FlameHeight::clamped(scaled as i64 + 1)
    }

    /// Returns whether a status flag is set.
    #[must_use]
    pub fn bit(&self, bit: StatusBit) -> bool {
        self.status_bits & bit.mask() != 0
    }

    /// Returns whether the shutdown sequence is running.
    #[must_use]
    pub fn shutting_down(&self) -> bool {
        self.bit(StatusBit::ShuttingDown)
    }

    /// Returns the guard-flame flag.
    #[must_use]
    pub fn guard_flame_lockout(&self) -> bool {
        self.bit(StatusBit::GuardFlame)
    }

    /// Returns whether the receiver battery is low.
    #[must_use]
    pub fn low_battery(&self) -> bool {
        self.bit(StatusBit::LowBattery)
    }

    /// Returns whether the ignition sequence is running.
    #[must_use]
    pub fn igniting(&self) -> bool {
        self.bit(StatusBit::Igniting)
    }

    /// Returns whether the secondary burner is open.
    #[must_use]
    pub fn aux_on(&self) -> bool {
        self.bit(StatusBit::Aux)
    }

    /// Returns whether the light is on.
    #[must_use]
    pub fn light_on(&self) -> bool {
        self.bit(StatusBit::Light)
    }

    /// Returns whether the fan is on.
    #[must_use]
    pub fn fan_on(&self) -> bool {
        self.bit(StatusBit::Fan)
    }

    /// Returns the 8-bit light brightness, 0 whenever the light is off.
    #[must_use]
    pub fn light_brightness(&self) -> u8 {
        if !self.light_on() {
            return 0;
        }
        let scaled = ((f64::from(self.light_raw) - 100.0) / 151.0 * 255.0).round_ties_even();
        // clamped into the u8 range first
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let brightness = scaled.clamp(0.0, 255.0) as u8;
        brightness
    }

    /// Returns the raw RF signal level.
    #[must_use]
    pub fn rf_signal_level(&self) -> u8 {
        self.rf_signal_raw
    }

    /// Returns the operating mode token.
    #[must_use]
    pub fn operating_mode(&self) -> OperatingMode {
        OperatingMode::new(self.mode.clone())
    }

    /// Returns the reported ambient temperature in °C, unfiltered.
    #[must_use]
    pub fn temperature_c(&self) -> f64 {
        f64::from(self.temperature_raw) / 10.0
    }

    // ========== Frame construction ==========

    /// Sets the flame height (a height of 0 reports the burner off).
    #[must_use]
    pub fn with_flame_height(mut self, height: FlameHeight) -> Self {
        self.flame_raw = FLAME_STEP_BYTES[usize::from(height.value())];
        self
    }

    /// Sets the raw flame byte.
    #[must_use]
    pub fn with_flame_raw(mut self, raw: u8) -> Self {
        self.flame_raw = raw;
        self
    }

    /// Sets or clears a status flag.
    #[must_use]
    pub fn with_bit(mut self, bit: StatusBit, set: bool) -> Self {
        if set {
            self.status_bits |= bit.mask();
        } else {
            self.status_bits &= !bit.mask();
        }
        self
    }

    /// Sets the light brightness as the device would encode it.
    #[must_use]
    pub fn with_light_brightness(mut self, brightness: u8) -> Self {
        let raw = (f64::from(brightness) / 255.0 * 151.0 + 100.0).round();
        // within [100, 251]
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let raw = raw as u8;
        self.light_raw = raw;
        self
    }

    /// Sets the ambient temperature in °C (0.0-25.5 fits the wire byte).
    #[must_use]
    pub fn with_temperature(mut self, celsius: f64) -> Self {
        // clamped into the u8 range first
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let raw = (celsius * 10.0).round().clamp(0.0, 255.0) as u8;
        self.temperature_raw = raw;
        self
    }

    /// Sets the raw temperature byte (tenths of a degree).
    #[must_use]
    pub fn with_temperature_raw(mut self, raw: u8) -> Self {
        self.temperature_raw = raw;
        self
    }

    /// Sets the operating mode token (first character is used).
    #[must_use]
    pub fn with_mode(mut self, token: &str) -> Self {
        self.mode = token.chars().next().unwrap_or('1').to_string();
        self
    }

    /// Sets the RF signal level.
    #[must_use]
    pub fn with_rf_signal(mut self, level: u8) -> Self {
        self.rf_signal_raw = level;
        self
    }

    /// Renders the frame as the device sends it, framing byte included.
    #[must_use]
    pub fn to_wire(&self) -> Vec<u8> {
        let text = format!(
            "{}{:02X}{:02X}{:04X}{:02X}00{}00000{:02X}\r",
            STATUS_PREAMBLES[0],
            self.rf_signal_raw,
            self.flame_raw,
            self.status_bits,
            self.light_raw,
            self.mode,
            self.temperature_raw,
        );
        let mut wire = Vec::with_capacity(text.len() + 1);
        wire.push(0x02);
        wire.extend_from_slice(text.as_bytes());
        wire
    }
}

impl Default for StatusFrame {
    fn default() -> Self {
        Self::new()
    }
}

fn field<'a>(
    text: &'a str,
    start: usize,
    end: usize,
    name: &'static str,
) -> Result<&'a str, ParseError> {
    text.get(start..end).ok_or(ParseError::InvalidValue {
        field: name,
        message: format!("no field at [{start}:{end}]"),
    })
}

fn hex_byte(text: &str, start: usize, name: &'static str) -> Result<u8, ParseError> {
    let raw = field(text, start, start + 2, name)?;
    u8::from_str_radix(raw, 16).map_err(|e| ParseError::InvalidValue {
        field: name,
        message: format!("{raw:?}: {e}"),
    })
}
