// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fireplace event types.

use serde::Serialize;

use crate::coordinator::FireplaceSnapshot;
use crate::thermostat::ThermostatMode;

/// A user preference that changed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PreferenceChange {
    /// "Turn off" drops to the pilot instead of shutting down.
    KeepPilotOn(bool),
    /// Software intent survives an outage.
    SmartSync(bool),
    /// Thermostat dead band in °C.
    Deadzone(f64),
}

/// Notification published on the [`EventBus`](super::EventBus).
#[derive(Debug, Clone, Serialize)]
pub enum FireplaceEvent {
    /// The visible state changed, after an optimistic update or a poll.
    StateChanged {
        /// The complete state as readers should now see it.
        snapshot: Box<FireplaceSnapshot>,
    },

    /// A poll could not reach the device.
    UpdateFailed {
        /// Human-readable failure.
        reason: String,
    },

    /// The device became reachable or unreachable.
    AvailabilityChanged {
        /// Whether the last poll succeeded.
        available: bool,
    },

    /// A preference was changed by the user or by auto-detection.
    PreferenceChanged(PreferenceChange),

    /// The thermostat mode or target changed.
    ThermostatChanged {
        /// Current mode.
        mode: ThermostatMode,
        /// Target temperature in °C.
        target_c: f64,
    },
}

impl FireplaceEvent {
    /// Returns the snapshot carried by a `StateChanged` event.
    #[must_use]
    pub fn snapshot(&self) -> Option<&FireplaceSnapshot> {
        match self {
            Self::StateChanged { snapshot } => Some(snapshot),
            _ => None,
        }
    }
}
