// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Software intent awaiting confirmation by the device.

use serde::Serialize;

use crate::types::{FanSpeed, FlameHeight};

use super::DeviceState;

/// Values commanded by software that the device has not confirmed yet.
///
/// Each field is `None` when no command is pending for that attribute. The
/// coordinator overlays the intent on the confirmed [`DeviceState`] so that
/// readers see a command's effect immediately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControlIntent {
    /// Fireplace lit (main burner or pilot).
    pub on: Option<bool>,
    /// Flame height.
    pub flame_height: Option<FlameHeight>,
    /// Secondary burner.
    pub aux_on: Option<bool>,
    /// Light output.
    pub light_on: Option<bool>,
    /// Light brightness.
    pub light_brightness: Option<u8>,
    /// Fan output.
    pub fan_on: Option<bool>,
    /// Fan speed.
    pub fan_speed: Option<FanSpeed>,
    /// Eco flame pattern.
    pub eco: Option<bool>,
}

impl ControlIntent {
    /// Returns `true` if no command is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Drops every pending value.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Drops every pending value except on/off and flame height.
    pub fn retain_power(&mut self) {
        *self = Self {
            on: self.on,
            flame_height: self.flame_height,
            ..Self::default()
        };
    }

    /// Returns `true` if software wants the fireplace lit but the device
    /// reports it off.
    #[must_use]
    pub fn expects_on_but_reported_off(&self, confirmed: &DeviceState) -> bool {
        self.on == Some(true) && !confirmed.is_on()
    }
}
