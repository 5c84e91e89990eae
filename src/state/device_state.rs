// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Confirmed device state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::response::StatusFrame;
use crate::types::{FlameHeight, OperatingMode};

/// State of the fireplace as last reported by the device.
///
/// Only the driver writes this struct, and only from decoded status frames.
/// Until the first frame arrives every flag is off and the temperature and
/// mode are unknown.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use mertik_lib::response::{StatusBit, StatusFrame};
/// use mertik_lib::state::DeviceState;
///
/// let mut state = DeviceState::new();
/// assert!(!state.is_fresh());
///
/// let frame = StatusFrame::new().with_bit(StatusBit::GuardFlame, true);
/// state.apply_status(&frame, Some(20.0), Utc::now());
///
/// assert!(state.is_on());
/// assert!(state.is_fresh());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceState {
    flame_height: FlameHeight,
    main_burner_on: bool,
    guard_flame_lockout: bool,
    igniting: bool,
    shutting_down: bool,
    aux_on: bool,
    light_on: bool,
    light_brightness: u8,
    fan_on: bool,
    low_battery: bool,
    rf_signal_level: u8,
    ambient_temperature_c: Option<f64>,
    operating_mode: Option<OperatingMode>,
    last_status_at: Option<DateTime<Utc>>,
    stale: bool,
}

impl DeviceState {
    /// Creates the initial unknown state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a decoded status frame.
    ///
    /// `ambient` is the filtered temperature; `None` keeps the previous
    /// reading. Returns `true` if any reported value changed.
    pub fn apply_status(
        &mut self,
        frame: &StatusFrame,
        ambient: Option<f64>,
        at: DateTime<Utc>,
    ) -> bool {
        let before = self.clone();

        self.flame_height = frame.flame_height();
        self.main_burner_on = frame.main_burner_on();
        self.guard_flame_lockout = frame.guard_flame_lockout();
        self.igniting = frame.igniting();
        self.shutting_down = frame.shutting_down();
        self.aux_on = frame.aux_on();
        self.light_on = frame.light_on();
        self.light_brightness = if self.light_on {
            frame.light_brightness()
        } else {
            0
        };
        self.fan_on = frame.fan_on();
        self.low_battery = frame.low_battery();
        self.rf_signal_level = frame.rf_signal_level();
        if ambient.is_some() {
            self.ambient_temperature_c = ambient;
        }
        self.operating_mode = Some(frame.operating_mode());

        let changed = Self {
            last_status_at: None,
            stale: false,
            ..before
        } != Self {
            last_status_at: None,
            stale: false,
            ..self.clone()
        };

        self.last_status_at = Some(at);
        self.stale = false;
        changed
    }

    /// Marks the state as no longer reflecting the device.
    ///
    /// Called when a command fails or is acknowledged without a status frame.
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Returns `true` if a status frame arrived and nothing has since
    /// invalidated it.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.last_status_at.is_some() && !self.stale
    }

    /// Returns `true` if the main burner or the guard flame is lit.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.main_burner_on || self.guard_flame_lockout
    }

    /// Returns the flame height (0 when only the pilot or nothing burns).
    #[must_use]
    pub fn flame_height(&self) -> FlameHeight {
        self.flame_height
    }

    /// Returns whether the main burner is lit.
    #[must_use]
    pub fn main_burner_on(&self) -> bool {
        self.main_burner_on
    }

    /// Returns the guard flame flag.
    #[must_use]
    pub fn guard_flame_lockout(&self) -> bool {
        self.guard_flame_lockout
    }

    /// Returns whether the ignition sequence is running.
    #[must_use]
    pub fn igniting(&self) -> bool {
        self.igniting
    }

    /// Returns whether the shutdown sequence is running.
    #[must_use]
    pub fn shutting_down(&self) -> bool {
        self.shutting_down
    }

    /// Returns whether the secondary burner is open.
    #[must_use]
    pub fn aux_on(&self) -> bool {
        self.aux_on
    }

    /// Returns whether the light is on.
    #[must_use]
    pub fn light_on(&self) -> bool {
        self.light_on
    }

    /// Returns the light brightness (always 0 while the light is off).
    #[must_use]
    pub fn light_brightness(&self) -> u8 {
        self.light_brightness
    }

    /// Returns whether the fan is on.
    #[must_use]
    pub fn fan_on(&self) -> bool {
        self.fan_on
    }

    /// Returns whether the receiver battery is low.
    #[must_use]
    pub fn low_battery(&self) -> bool {
        self.low_battery
    }

    /// Returns the raw RF signal level.
    #[must_use]
    pub fn rf_signal_level(&self) -> u8 {
        self.rf_signal_level
    }

    /// Returns the filtered ambient temperature.
    #[must_use]
    pub fn ambient_temperature_c(&self) -> Option<f64> {
        self.ambient_temperature_c
    }

    /// Returns the last reported operating mode.
    #[must_use]
    pub fn operating_mode(&self) -> Option<&OperatingMode> {
        self.operating_mode.as_ref()
    }

    /// Returns when the last status frame was applied.
    #[must_use]
    pub fn last_status_at(&self) -> Option<DateTime<Utc>> {
        self.last_status_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::StatusBit;

    #[test]
    fn initial_state_is_off_and_unknown() {
        let state = DeviceState::new();
        assert!(!state.is_on());
        assert!(state.flame_height().is_pilot());
        assert_eq!(state.ambient_temperature_c(), None);
        assert_eq!(state.operating_mode(), None);
        assert!(!state.is_fresh());
    }

    #[test]
    fn apply_status_copies_fields() {
        let mut state = DeviceState::new();
        let frame = StatusFrame::new()
            .with_flame_height(FlameHeight::new(7).unwrap())
            .with_bit(StatusBit::Aux, true)
            .with_bit(StatusBit::Light, true)
            .with_light_brightness(255)
            .with_bit(StatusBit::LowBattery, true)
            .with_rf_signal(42)
            .with_mode("2");

        assert!(state.apply_status(&frame, Some(19.5), Utc::now()));

        assert_eq!(state.flame_height().value(), 7);
        assert!(state.main_burner_on());
        assert!(state.is_on());
        assert!(state.aux_on());
        assert!(state.light_on());
        assert_eq!(state.light_brightness(), 255);
        assert!(state.low_battery());
        assert!(!state.fan_on());
        assert_eq!(state.rf_signal_level(), 42);
        assert_eq!(state.ambient_temperature_c(), Some(19.5));
        assert!(state.operating_mode().unwrap().is_eco());
    }

    #[test]
    fn rejected_temperature_keeps_previous_reading() {
        let mut state = DeviceState::new();
        state.apply_status(&StatusFrame::new(), Some(20.0), Utc::now());
        state.apply_status(&StatusFrame::new(), None, Utc::now());
        assert_eq!(state.ambient_temperature_c(), Some(20.0));
    }

    #[test]
    fn identical_frame_reports_no_change() {
        let mut state = DeviceState::new();
        let frame = StatusFrame::new().with_bit(StatusBit::Fan, true);
        assert!(state.apply_status(&frame, Some(20.0), Utc::now()));
        assert!(!state.apply_status(&frame, Some(20.0), Utc::now()));
    }

    #[test]
    fn guard_flame_counts_as_on() {
        let mut state = DeviceState::new();
        let frame = StatusFrame::new().with_bit(StatusBit::GuardFlame, true);
        state.apply_status(&frame, None, Utc::now());
        assert!(!state.main_burner_on());
        assert!(state.is_on());
    }

    #[test]
    fn stale_until_next_status() {
        let mut state = DeviceState::new();
        state.apply_status(&StatusFrame::new(), None, Utc::now());
        state.mark_stale();
        assert!(!state.is_fresh());
        state.apply_status(&StatusFrame::new(), None, Utc::now());
        assert!(state.is_fresh());
    }
}
