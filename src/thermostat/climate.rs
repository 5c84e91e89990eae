// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thermostat control loop.

use crate::coordinator::FireplaceCoordinator;
use crate::error::{Error, ValueError};
use crate::event::FireplaceEvent;
use crate::protocol::Protocol;
use crate::types::FlameHeight;

use super::demand::{ControlInput, ThermostatAction, ThermostatMode, decide};

/// Thermostat driving a fireplace through its coordinator.
///
/// Mode and target are restored from the coordinator's persisted state and
/// saved on every change. In heat mode the thermostat owns the flame height:
/// manual [`FireplaceCoordinator::set_flame_height`] calls are rejected.
#[derive(Debug)]
pub struct Thermostat<P: Protocol> {
    coordinator: FireplaceCoordinator<P>,
}

impl<P: Protocol> Clone for Thermostat<P> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
        }
    }
}

impl<P: Protocol> Thermostat<P> {
    /// Attaches a thermostat to a coordinator, restoring its persisted mode.
    #[must_use]
    pub fn new(coordinator: FireplaceCoordinator<P>) -> Self {
        let restored = coordinator.persistence().current();
        tracing::debug!(
            mode = ?restored.thermostat_mode,
            target_c = restored.target_temperature_c,
            "Restored thermostat"
        );
        coordinator.set_thermostat_active(restored.thermostat_mode == ThermostatMode::Heat);
        Self { coordinator }
    }

    /// Returns the current mode.
    #[must_use]
    pub fn mode(&self) -> ThermostatMode {
        self.coordinator.persistence().current().thermostat_mode
    }

    /// Returns the target temperature in °C.
    #[must_use]
    pub fn target_c(&self) -> f64 {
        self.coordinator.persistence().current().target_temperature_c
    }

    /// Returns the filtered ambient temperature in °C.
    #[must_use]
    pub fn current_c(&self) -> Option<f64> {
        self.coordinator.device_state().ambient_temperature_c()
    }

    /// Changes the mode and evaluates the loop once.
    ///
    /// # Errors
    ///
    /// Returns an error only if a command cannot be framed.
    pub async fn set_mode(&self, mode: ThermostatMode) -> Result<Option<ThermostatAction>, Error> {
        self.store_mode(mode);
        self.announce();
        self.tick().await
    }

    /// Changes the target and evaluates the loop once.
    ///
    /// Raising the target more than the dead band above the current
    /// temperature switches an idle thermostat to heat mode.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NotFinite` for a NaN or infinite target; nothing
    /// is stored in that case. Otherwise an error only if a command cannot be
    /// framed.
    pub async fn set_target(&self, target_c: f64) -> Result<Option<ThermostatAction>, Error> {
        if !target_c.is_finite() {
            return Err(ValueError::NotFinite {
                field: "target temperature",
            }
            .into());
        }
        let state = self.coordinator.persistence().current();
        self.coordinator
            .persistence()
            .update(|s| s.target_temperature_c = target_c);

        if state.thermostat_mode == ThermostatMode::Off {
            if let Some(current) = self.current_c() {
                if target_c > current + state.deadzone_c {
                    tracing::info!(target_c, current, "Target above room temperature, heating");
                    self.store_mode(ThermostatMode::Heat);
                }
            }
        }
        self.announce();
        self.tick().await
    }

    /// Evaluates the loop once and performs the resulting action.
    ///
    /// Does nothing while the device is unavailable.
    ///
    /// # Errors
    ///
    /// Returns an error only if a command cannot be framed.
    pub async fn tick(&self) -> Result<Option<ThermostatAction>, Error> {
        if !self.coordinator.availability().is_available() {
            return Ok(None);
        }
        let settings = self.coordinator.persistence().current();
        let device = self.coordinator.device_state();
        let action = decide(&ControlInput {
            mode: settings.thermostat_mode,
            target_c: settings.target_temperature_c,
            deadzone_c: settings.deadzone_c,
            keep_pilot_on: settings.keep_pilot_on,
            device: &device,
        });

        let Some(action) = action else {
            return Ok(None);
        };
        tracing::info!(
            ?action,
            current_c = device.ambient_temperature_c(),
            target_c = settings.target_temperature_c,
            "Thermostat acting"
        );
        match action {
            ThermostatAction::Ignite => self.coordinator.ignite().await?,
            ThermostatAction::SetFlameHeight(height) => {
                self.coordinator.apply_flame_height(height).await?;
            }
            ThermostatAction::DropToPilot => {
                self.coordinator.apply_flame_height(FlameHeight::PILOT).await?;
            }
            ThermostatAction::Shutdown => self.coordinator.shutdown_full().await?,
        }
        Ok(Some(action))
    }

    fn store_mode(&self, mode: ThermostatMode) {
        self.coordinator
            .persistence()
            .update(|s| s.thermostat_mode = mode);
        self.coordinator
            .set_thermostat_active(mode == ThermostatMode::Heat);
    }

    fn announce(&self) {
        self.coordinator
            .events()
            .publish(FireplaceEvent::ThermostatChanged {
                mode: self.mode(),
                target_c: self.target_c(),
            });
    }
}
