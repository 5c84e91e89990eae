// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only views handed to hosts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::{ControlIntent, DeviceState};
use crate::store::PersistedState;
use crate::types::{FanSpeed, FlameHeight, OperatingMode};

use super::Availability;

/// User preferences of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preferences {
    /// "Turn off" drops to the pilot instead of shutting down.
    pub keep_pilot_on: bool,
    /// Software intent survives an outage.
    pub smart_sync_enabled: bool,
    /// Thermostat dead band in °C.
    pub thermostat_deadzone_c: f64,
}

impl From<&PersistedState> for Preferences {
    fn from(state: &PersistedState) -> Self {
        Self {
            keep_pilot_on: state.keep_pilot_on,
            smart_sync_enabled: state.smart_sync,
            thermostat_deadzone_c: state.deadzone_c,
        }
    }
}

/// Fireplace state as hosts should display it.
///
/// Pending software intent is overlaid on the confirmed device state, so a
/// command shows up here as soon as it is issued.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FireplaceSnapshot {
    /// Whether the last poll succeeded.
    pub available: bool,
    /// Main burner or pilot lit.
    pub is_on: bool,
    /// Flame height.
    pub flame_height: FlameHeight,
    /// Ignition sequence running.
    pub igniting: bool,
    /// Shutdown sequence running.
    pub shutting_down: bool,
    /// Guard flame flag.
    pub guard_flame_lockout: bool,
    /// Receiver battery low.
    pub low_battery: bool,
    /// Raw RF signal level.
    pub rf_signal_level: u8,
    /// Filtered ambient temperature in °C.
    pub ambient_temperature_c: Option<f64>,
    /// Raw operating mode token.
    pub operating_mode: Option<OperatingMode>,
    /// Eco flame pattern active.
    pub is_eco: bool,
    /// Secondary burner open.
    pub aux_on: bool,
    /// Light on.
    pub light_on: bool,
    /// Light brightness, 0 while the light is off.
    pub light_brightness: u8,
    /// Fan on.
    pub fan_on: bool,
    /// Last requested fan speed; the device does not report it.
    pub fan_speed: Option<FanSpeed>,
    /// User preferences.
    pub preferences: Preferences,
    /// Manual flame control locked by the thermostat.
    pub thermostat_active: bool,
    /// Time of the last applied status frame.
    pub last_update: Option<DateTime<Utc>>,
}

impl FireplaceSnapshot {
    pub(crate) fn compose(
        confirmed: &DeviceState,
        intent: &ControlIntent,
        availability: Availability,
        preferences: Preferences,
        thermostat_active: bool,
    ) -> Self {
        let is_on = intent.on.unwrap_or_else(|| confirmed.is_on());
        let flame_height = match (intent.on, intent.flame_height) {
            (_, Some(height)) => height,
            (Some(false), None) => FlameHeight::PILOT,
            _ => confirmed.flame_height(),
        };
        let light_on = intent.light_on.unwrap_or_else(|| confirmed.light_on());
        let light_brightness = if light_on {
            intent
                .light_brightness
                .unwrap_or_else(|| confirmed.light_brightness())
        } else {
            0
        };
        let operating_mode = confirmed.operating_mode().cloned();
        let is_eco = intent
            .eco
            .unwrap_or_else(|| operating_mode.as_ref().is_some_and(OperatingMode::is_eco));

        Self {
            available: availability.is_available(),
            is_on,
            flame_height,
            igniting: confirmed.igniting(),
            shutting_down: confirmed.shutting_down(),
            guard_flame_lockout: confirmed.guard_flame_lockout(),
            low_battery: confirmed.low_battery(),
            rf_signal_level: confirmed.rf_signal_level(),
            ambient_temperature_c: confirmed.ambient_temperature_c(),
            operating_mode,
            is_eco,
            aux_on: intent.aux_on.unwrap_or_else(|| confirmed.aux_on()),
            light_on,
            light_brightness,
            fan_on: intent.fan_on.unwrap_or_else(|| confirmed.fan_on()),
            fan_speed: intent.fan_speed,
            preferences,
            thermostat_active,
            last_update: confirmed.last_status_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{StatusBit, StatusFrame};

    fn prefs() -> Preferences {
        Preferences::from(&PersistedState::default())
    }

    fn confirmed() -> DeviceState {
        let mut state = DeviceState::new();
        let frame = StatusFrame::new()
            .with_flame_height(FlameHeight::new(4).unwrap())
            .with_bit(StatusBit::GuardFlame, true)
            .with_bit(StatusBit::Light, true)
            .with_light_brightness(255)
            .with_mode("2");
        state.apply_status(&frame, Some(20.0), Utc::now());
        state
    }

    #[test]
    fn without_intent_shows_device() {
        let snap = FireplaceSnapshot::compose(
            &confirmed(),
            &ControlIntent::default(),
            Availability::Available,
            prefs(),
            false,
        );
        assert!(snap.available);
        assert!(snap.is_on);
        assert_eq!(snap.flame_height.value(), 4);
        assert!(snap.light_on);
        assert_eq!(snap.light_brightness, 255);
        assert!(snap.is_eco);
    }

    #[test]
    fn intent_overrides_device() {
        let intent = ControlIntent {
            on: Some(false),
            light_on: Some(false),
            eco: Some(false),
            ..ControlIntent::default()
        };
        let snap = FireplaceSnapshot::compose(
            &confirmed(),
            &intent,
            Availability::Unavailable,
            prefs(),
            true,
        );
        assert!(!snap.available);
        assert!(!snap.is_on);
        assert!(snap.flame_height.is_pilot());
        assert!(!snap.light_on);
        assert_eq!(snap.light_brightness, 0);
        assert!(!snap.is_eco);
        assert!(snap.thermostat_active);
    }

    #[test]
    fn brightness_intent_shown_while_on() {
        let intent = ControlIntent {
            light_brightness: Some(128),
            ..ControlIntent::default()
        };
        let snap = FireplaceSnapshot::compose(
            &confirmed(),
            &intent,
            Availability::Available,
            prefs(),
            false,
        );
        assert_eq!(snap.light_brightness, 128);
    }
}
