// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Proportional heat demand.
//!
//! Pure decision logic: given the confirmed device state and the thermostat
//! settings, [`decide`] returns the single action to take this tick.

use serde::{Deserialize, Serialize};

use crate::state::DeviceState;
use crate::types::FlameHeight;

/// Flame steps per degree of shortfall.
const STEPS_PER_DEGREE: f64 = 6.0;

/// Thermostat mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermostatMode {
    /// No automatic action; manual flame control is allowed.
    #[default]
    Off,
    /// Flame height follows the temperature shortfall.
    Heat,
}

/// How far the room is from the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demand {
    /// At or above target.
    Satisfied,
    /// Below target by no more than the dead band.
    DeadBand,
    /// Meaningfully below target; heat at the given height.
    Heat(FlameHeight),
}

/// Action the thermostat asks the coordinator to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermostatAction {
    /// Start the burner; the height follows on a later tick.
    Ignite,
    /// Change the flame height.
    SetFlameHeight(FlameHeight),
    /// Drop to the standing pilot.
    DropToPilot,
    /// Shut the burner down completely.
    Shutdown,
}

/// Inputs of one thermostat evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ControlInput<'a> {
    /// Current mode.
    pub mode: ThermostatMode,
    /// Target temperature in °C.
    pub target_c: f64,
    /// Dead band in °C.
    pub deadzone_c: f64,
    /// Whether "off" should leave the pilot burning.
    pub keep_pilot_on: bool,
    /// Confirmed device state, including the ambient reading.
    pub device: &'a DeviceState,
}

/// Maps a temperature shortfall to a flame height in `1..=12`.
///
/// A NaN shortfall maps to the lowest heating step.
///
/// ```
/// use mertik_lib::thermostat::proportional_height;
///
/// assert_eq!(proportional_height(0.5).value(), 3);
/// assert_eq!(proportional_height(2.0).value(), 12);
/// assert_eq!(proportional_height(0.01).value(), 1);
/// ```
#[must_use]
pub fn proportional_height(delta_c: f64) -> FlameHeight {
    if delta_c.is_nan() {
        return FlameHeight::LOWEST;
    }
    let raw = (delta_c * STEPS_PER_DEGREE).round_ties_even();
    // clamped before the cast
    #[allow(clippy::cast_possible_truncation)]
    let steps = raw.clamp(1.0, f64::from(FlameHeight::MAX)) as i64;
    FlameHeight::clamped(steps)
}

/// Classifies a shortfall (`target - current`) against the dead band.
///
/// An undefined shortfall is treated as inside the dead band.
#[must_use]
pub fn classify(delta_c: f64, deadzone_c: f64) -> Demand {
    if delta_c.is_nan() {
        Demand::DeadBand
    } else if delta_c <= 0.0 {
        Demand::Satisfied
    } else if delta_c <= deadzone_c {
        Demand::DeadBand
    } else {
        Demand::Heat(proportional_height(delta_c))
    }
}

/// Decides what to do this tick, if anything.
///
/// Returns `None` in `Off` mode, without an ambient reading, inside the dead
/// band, while the burner is igniting or shutting down, and when the device
/// already matches the demand.
#[must_use]
pub fn decide(input: &ControlInput<'_>) -> Option<ThermostatAction> {
    if input.mode == ThermostatMode::Off {
        return None;
    }
    let current = input.device.ambient_temperature_c()?;
    let device = input.device;
    if device.igniting() || device.shutting_down() {
        return None;
    }

    match classify(input.target_c - current, input.deadzone_c) {
        Demand::DeadBand => None,
        Demand::Satisfied => {
            if !device.main_burner_on() || device.flame_height().is_pilot() {
                None
            } else if input.keep_pilot_on {
                Some(ThermostatAction::DropToPilot)
            } else {
                Some(ThermostatAction::Shutdown)
            }
        }
        Demand::Heat(height) => {
            if !device.is_on() {
                Some(ThermostatAction::Ignite)
            } else if device.main_burner_on() && device.flame_height() == height {
                None
            } else {
                Some(ThermostatAction::SetFlameHeight(height))
            }
        }
    }
}
