// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polling coordinator and write facade.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::command::{AuxCommand, Command, FanCommand, FlameCommand, LightCommand, ModeCommand, StatusCommand};
use crate::device::{CommandOutcome, Device};
use crate::error::{Error, ParseError, PolicyViolation};
use crate::event::{EventBus, FireplaceEvent, PreferenceChange};
use crate::protocol::Protocol;
use crate::state::{ControlIntent, DeviceState};
use crate::store::Persistence;
use crate::types::{FanSpeed, FlameHeight};

use super::sync::{SyncOutcome, SyncState};
use super::{Availability, FireplaceConfig, FireplaceSnapshot, Preferences};

/// Delays the coordinator inserts between dependent commands.
#[derive(Debug, Clone, Copy)]
struct SettleDelays {
    ignition: Duration,
    aux: Duration,
    fan: Duration,
}

#[derive(Debug)]
struct Inner<P: Protocol> {
    device: Device<P>,
    delays: SettleDelays,
    persistence: Persistence,
    events: EventBus,
    sync: Mutex<SyncState>,
}

/// Coordinates one fireplace: polls it, tracks intent and preferences, and
/// exposes the write operations.
///
/// Cloning is cheap; every clone drives the same fireplace. Write operations
/// update the visible state before the command is sent, and transport
/// failures never surface as errors: they show up as an unavailable
/// snapshot and an [`FireplaceEvent::UpdateFailed`] on the next poll.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use mertik_lib::coordinator::{FireplaceConfig, FireplaceCoordinator};
/// use mertik_lib::store::{MemoryStore, Persistence};
/// use mertik_lib::types::FlameHeight;
///
/// # async fn example() -> mertik_lib::Result<()> {
/// let config = FireplaceConfig::new("192.168.1.60");
/// let device = config.device(config.tcp_config().into_client());
/// let persistence = Persistence::restore(Arc::new(MemoryStore::new()));
/// let coordinator = FireplaceCoordinator::new(device, &config, persistence);
///
/// coordinator.ignite().await?;
/// coordinator.set_flame_height(FlameHeight::new(8)?).await?;
/// println!("{:?}", coordinator.snapshot());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FireplaceCoordinator<P: Protocol> {
    inner: Arc<Inner<P>>,
}

impl<P: Protocol> Clone for FireplaceCoordinator<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: Protocol> FireplaceCoordinator<P> {
    /// Creates a coordinator around a driver.
    ///
    /// With smart sync enabled, the last commanded on/off state is restored
    /// as held intent: the first poll keeps it and [`resync`](Self::resync)
    /// pushes it.
    #[must_use]
    pub fn new(device: Device<P>, config: &FireplaceConfig, persistence: Persistence) -> Self {
        let mut sync = SyncState::default();
        let restored = persistence.current();
        if let (true, Some(on)) = (restored.smart_sync, restored.last_on) {
            tracing::debug!(on, "Holding restored on/off state");
            sync.intent.on = Some(on);
            if !on {
                sync.intent.flame_height = Some(FlameHeight::PILOT);
            }
            sync.held = true;
        }
        Self {
            inner: Arc::new(Inner {
                device,
                delays: SettleDelays {
                    ignition: config.ignition_settle(),
                    aux: config.aux_settle(),
                    fan: config.fan_settle(),
                },
                persistence,
                events: EventBus::new(),
                sync: Mutex::new(sync),
            }),
        }
    }

    // ========== Read access ==========

    /// Returns the state as hosts should display it.
    #[must_use]
    pub fn snapshot(&self) -> FireplaceSnapshot {
        let confirmed = self.inner.device.state();
        let preferences = self.preferences();
        let sync = self.inner.sync.lock();
        let mut snapshot = FireplaceSnapshot::compose(
            &confirmed,
            &sync.intent,
            sync.availability,
            preferences,
            sync.thermostat_active,
        );
        if snapshot.fan_on && snapshot.fan_speed.is_none() {
            snapshot.fan_speed = sync.last_fan_speed;
        }
        snapshot
    }

    /// Returns the state last confirmed by the device.
    #[must_use]
    pub fn device_state(&self) -> DeviceState {
        self.inner.device.state()
    }

    /// Returns the pending intent.
    #[must_use]
    pub fn intent(&self) -> ControlIntent {
        self.inner.sync.lock().intent.clone()
    }

    /// Returns the current preferences.
    #[must_use]
    pub fn preferences(&self) -> Preferences {
        Preferences::from(&self.inner.persistence.current())
    }

    /// Returns the device availability.
    #[must_use]
    pub fn availability(&self) -> Availability {
        self.inner.sync.lock().availability
    }

    /// Returns `true` while the thermostat owns the flame height.
    #[must_use]
    pub fn is_thermostat_active(&self) -> bool {
        self.inner.sync.lock().thermostat_active
    }

    /// Subscribes to events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FireplaceEvent> {
        self.inner.events.subscribe()
    }

    /// Returns the event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Returns the driver.
    #[must_use]
    pub fn device(&self) -> &Device<P> {
        &self.inner.device
    }

    pub(crate) fn persistence(&self) -> &Persistence {
        &self.inner.persistence
    }

    /// Returns a persisted host switch, `None` if it was never set.
    #[must_use]
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.inner.persistence.current().flags.get(name).copied()
    }

    /// Returns every persisted host switch.
    #[must_use]
    pub fn flags(&self) -> BTreeMap<String, bool> {
        self.inner.persistence.current().flags
    }

    // ========== Polling ==========

    /// Polls the device and reconciles the intent with its answer.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the device is unreachable and
    /// `Error::Parse` if it did not answer with a valid status frame. Both
    /// are also published as [`FireplaceEvent::UpdateFailed`].
    pub async fn refresh(&self) -> Result<FireplaceSnapshot, Error> {
        let outcome = self.inner.device.send_command(&StatusCommand).await?;
        let failure = match outcome {
            CommandOutcome::Status(_) => None,
            CommandOutcome::Unreachable(e) => Some(Error::Protocol(e)),
            CommandOutcome::Unparsed(e) => Some(Error::Parse(e)),
            CommandOutcome::Acknowledged => Some(Error::Parse(ParseError::UnknownPreamble)),
        };

        let confirmed = self.inner.device.state();
        let smart_sync = self.inner.persistence.current().smart_sync;
        let (previous, sync_outcome) = {
            let mut sync = self.inner.sync.lock();
            let previous = sync.availability;
            let unreachable = matches!(failure, Some(Error::Protocol(_)));
            let outcome = if failure.is_some() && !unreachable {
                // the device answered; only the frame was unusable
                SyncOutcome::Failed
            } else {
                sync.reconcile(failure.is_none(), smart_sync, &confirmed)
            };
            (previous, outcome)
        };

        match sync_outcome {
            SyncOutcome::RecoveredHeld => {
                tracing::info!("Fireplace back online, keeping commanded state");
            }
            SyncOutcome::RecoveredAdopted => {
                tracing::info!("Fireplace back online, adopting reported state");
            }
            _ => {}
        }

        let now = self.availability();
        if previous != now && now != Availability::Unknown {
            self.inner.events.publish(FireplaceEvent::AvailabilityChanged {
                available: now.is_available(),
            });
        }

        if let Some(e) = failure {
            tracing::warn!(error = %e, "Fireplace update failed");
            self.inner.events.publish(FireplaceEvent::UpdateFailed {
                reason: e.to_string(),
            });
            return Err(e);
        }

        self.detect_pilot(&confirmed);
        Ok(self.publish_state())
    }

    /// Pushes retained intent to the device.
    ///
    /// After an outage or a restart with smart sync enabled the coordinator
    /// keeps the commanded state instead of adopting the device's; this
    /// sends it. A pilot intent closes the secondary burner first.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn resync(&self) -> Result<(), Error> {
        let intent = {
            let mut sync = self.inner.sync.lock();
            sync.held = false;
            sync.intent.clone()
        };
        let confirmed = self.inner.device.state();
        tracing::info!(?intent, "Resyncing fireplace");

        match intent.on {
            Some(false) if confirmed.is_on() => {
                self.send(&FlameCommand::Shutdown).await?;
            }
            Some(true) if !confirmed.is_on() => {
                self.send(&FlameCommand::Ignite).await?;
            }
            _ => {}
        }
        let mut aux_handled = false;
        if intent.on != Some(false) {
            if let Some(height) = intent.flame_height {
                let current = self.inner.device.state();
                if current.is_on() && height.is_pilot() {
                    // the secondary burner closes and settles before the main valve drops
                    if current.aux_on() {
                        self.send(&AuxCommand::Off).await?;
                        tokio::time::sleep(self.inner.delays.aux).await;
                    }
                    aux_handled = true;
                    self.send(&FlameCommand::PilotStandby).await?;
                } else if current.is_on() {
                    self.send(&FlameCommand::SetHeight(height)).await?;
                }
            }
        }
        if let Some(on) = intent
            .aux_on
            .filter(|on| !aux_handled && *on != confirmed.aux_on())
        {
            self.send(&if on { AuxCommand::On } else { AuxCommand::Off }).await?;
        }
        if let Some(on) = intent.light_on.filter(|on| *on != confirmed.light_on()) {
            self.send(&if on { LightCommand::On } else { LightCommand::Off }).await?;
        }
        if let Some(on) = intent.fan_on.filter(|on| *on != confirmed.fan_on()) {
            self.send(&if on { FanCommand::On } else { FanCommand::Off }).await?;
        }

        self.refresh_after_write().await;
        Ok(())
    }

    // ========== Burner ==========

    /// Starts the burner.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn ignite(&self) -> Result<(), Error> {
        self.update_intent(|i| i.on = Some(true));
        self.remember_on(true);
        self.send(&FlameCommand::Ignite).await?;
        self.refresh_after_write().await;
        Ok(())
    }

    /// Shuts the burner down completely, pilot included.
    ///
    /// Clears the keep-pilot preference.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn shutdown_full(&self) -> Result<(), Error> {
        self.update_intent(|i| {
            i.on = Some(false);
            i.flame_height = Some(FlameHeight::PILOT);
        });
        self.remember_on(false);
        self.set_keep_pilot(false);
        self.send(&FlameCommand::Shutdown).await?;
        self.refresh_after_write().await;
        Ok(())
    }

    /// Turns the fireplace off: drops to the pilot when keep-pilot is set,
    /// shuts down completely otherwise.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn turn_off(&self) -> Result<(), Error> {
        if self.preferences().keep_pilot_on {
            self.apply_flame_height(FlameHeight::PILOT).await
        } else {
            self.shutdown_full().await
        }
    }

    /// Sets the flame height; 0 drops to the pilot.
    ///
    /// Skipped when fresh device state already shows the height. When
    /// dropping to the pilot with the secondary burner open, the secondary
    /// burner is closed first.
    ///
    /// # Errors
    ///
    /// Returns `PolicyViolation::ThermostatActive` while the thermostat is in
    /// heat mode; nothing is sent or changed in that case.
    pub async fn set_flame_height(&self, height: FlameHeight) -> Result<(), Error> {
        if self.is_thermostat_active() {
            return Err(PolicyViolation::ThermostatActive.into());
        }
        self.apply_flame_height(height).await
    }

    pub(crate) async fn apply_flame_height(&self, height: FlameHeight) -> Result<(), Error> {
        let confirmed = self.inner.device.state();
        let already = if height.is_pilot() {
            confirmed.is_on() && !confirmed.main_burner_on()
        } else {
            confirmed.main_burner_on() && confirmed.flame_height() == height
        };
        if confirmed.is_fresh() && already {
            tracing::debug!(%height, "Flame height already set");
            return Ok(());
        }

        self.update_intent(|i| {
            i.on = Some(true);
            i.flame_height = Some(height);
        });

        if height.is_pilot() {
            if confirmed.aux_on() {
                self.update_intent(|i| i.aux_on = Some(false));
                self.send(&AuxCommand::Off).await?;
                tokio::time::sleep(self.inner.delays.aux).await;
            }
            self.send(&FlameCommand::PilotStandby).await?;
        } else {
            self.send(&FlameCommand::SetHeight(height)).await?;
        }
        self.refresh_after_write().await;
        Ok(())
    }

    /// Sets the keep-pilot preference.
    ///
    /// Enabling it on a fully off fireplace ignites it, waits for the
    /// ignition to settle and drops to the pilot. On a lit fireplace only the
    /// preference changes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn toggle_pilot(&self, enable: bool) -> Result<(), Error> {
        self.set_keep_pilot(enable);
        if !enable || self.inner.device.state().is_on() {
            return Ok(());
        }

        self.update_intent(|i| {
            i.on = Some(true);
            i.flame_height = Some(FlameHeight::PILOT);
        });
        self.remember_on(true);
        self.send(&FlameCommand::Ignite).await?;
        tracing::debug!(
            settle_ms = u64::try_from(self.inner.delays.ignition.as_millis()).unwrap_or(u64::MAX),
            "Waiting for ignition before dropping to pilot"
        );
        tokio::time::sleep(self.inner.delays.ignition).await;
        self.send(&FlameCommand::PilotStandby).await?;
        self.refresh_after_write().await;
        Ok(())
    }

    // ========== Secondary outputs ==========

    /// Opens the secondary burner.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn aux_on(&self) -> Result<(), Error> {
        self.update_intent(|i| i.aux_on = Some(true));
        self.send(&AuxCommand::On).await
    }

    /// Closes the secondary burner.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn aux_off(&self) -> Result<(), Error> {
        self.update_intent(|i| i.aux_on = Some(false));
        self.send(&AuxCommand::Off).await
    }

    /// Switches the light on.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn light_on(&self) -> Result<(), Error> {
        self.update_intent(|i| i.light_on = Some(true));
        self.send(&LightCommand::On).await
    }

    /// Switches the light off.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn light_off(&self) -> Result<(), Error> {
        self.update_intent(|i| {
            i.light_on = Some(false);
            i.light_brightness = None;
        });
        self.send(&LightCommand::Off).await
    }

    /// Sets the light brightness; 0 switches the light off.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn set_light_brightness(&self, brightness: u8) -> Result<(), Error> {
        if brightness == 0 {
            return self.light_off().await;
        }
        self.update_intent(|i| {
            i.light_on = Some(true);
            i.light_brightness = Some(brightness);
        });
        self.send(&LightCommand::SetBrightness(brightness)).await?;
        self.refresh_after_write().await;
        Ok(())
    }

    /// Switches the fan on.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn fan_on(&self) -> Result<(), Error> {
        self.update_intent(|i| i.fan_on = Some(true));
        self.send(&FanCommand::On).await
    }

    /// Switches the fan off.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn fan_off(&self) -> Result<(), Error> {
        self.update_intent(|i| {
            i.fan_on = Some(false);
            i.fan_speed = None;
        });
        self.send(&FanCommand::Off).await
    }

    /// Sets the fan speed; 0 % switches the fan off.
    ///
    /// The module only applies a new speed on the fan's next start, so the
    /// speed is selected and the fan cycled off and on again.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn set_fan_speed(&self, speed: FanSpeed) -> Result<(), Error> {
        if speed.is_off() {
            return self.fan_off().await;
        }
        self.inner.sync.lock().last_fan_speed = Some(speed);
        self.update_intent(|i| {
            i.fan_on = Some(true);
            i.fan_speed = Some(speed);
        });
        self.send(&FanCommand::SetSpeed(speed)).await?;
        self.send(&FanCommand::Off).await?;
        tokio::time::sleep(self.inner.delays.fan).await;
        self.send(&FanCommand::On).await
    }

    // ========== Flame pattern ==========

    /// Selects the eco wave pattern.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn set_eco(&self) -> Result<(), Error> {
        self.set_pattern(true).await
    }

    /// Selects the static flame pattern.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` only if a command cannot be framed.
    pub async fn set_manual(&self) -> Result<(), Error> {
        self.set_pattern(false).await
    }

    async fn set_pattern(&self, eco: bool) -> Result<(), Error> {
        self.update_intent(|i| i.eco = Some(eco));
        let command = if eco { ModeCommand::Eco } else { ModeCommand::Manual };
        self.send(&command).await?;
        self.refresh_after_write().await;
        Ok(())
    }

    // ========== Diagnostics ==========

    /// Forwards an arbitrary hex suffix to the device.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if the suffix is not valid hex.
    pub async fn send_raw(&self, suffix: &str) -> Result<CommandOutcome, Error> {
        Ok(self.inner.device.send_raw(suffix).await?)
    }

    // ========== Preferences ==========

    /// Enables or disables smart sync.
    ///
    /// Disabling it drops intent held from an outage.
    pub fn set_smart_sync(&self, enabled: bool) {
        if self.preferences().smart_sync_enabled == enabled {
            return;
        }
        self.inner.persistence.update(|s| s.smart_sync = enabled);
        if !enabled {
            let mut sync = self.inner.sync.lock();
            if sync.held {
                sync.clear();
            }
        }
        tracing::info!(enabled, "Smart sync changed");
        self.inner
            .events
            .publish(FireplaceEvent::PreferenceChanged(PreferenceChange::SmartSync(enabled)));
        self.publish_state();
    }

    /// Sets the thermostat dead band; negative values are treated as 0.
    pub fn set_deadzone(&self, deadzone_c: f64) {
        let deadzone_c = if deadzone_c.is_finite() {
            deadzone_c.max(0.0)
        } else {
            0.0
        };
        self.inner.persistence.update(|s| s.deadzone_c = deadzone_c);
        tracing::info!(deadzone_c, "Thermostat dead band changed");
        self.inner
            .events
            .publish(FireplaceEvent::PreferenceChanged(PreferenceChange::Deadzone(deadzone_c)));
        self.publish_state();
    }

    /// Persists a host switch.
    pub fn set_flag(&self, name: impl Into<String>, value: bool) {
        let name = name.into();
        tracing::debug!(flag = %name, value, "Host flag changed");
        self.inner.persistence.update(|s| {
            s.flags.insert(name, value);
        });
    }

    pub(crate) fn set_thermostat_active(&self, active: bool) {
        self.inner.sync.lock().thermostat_active = active;
        self.publish_state();
    }

    fn set_keep_pilot(&self, enabled: bool) {
        if self.preferences().keep_pilot_on == enabled {
            return;
        }
        self.inner.persistence.update(|s| s.keep_pilot_on = enabled);
        tracing::info!(enabled, "Keep-pilot preference changed");
        self.inner
            .events
            .publish(FireplaceEvent::PreferenceChanged(PreferenceChange::KeepPilotOn(enabled)));
    }

    /// A lit fireplace idling at height 0 means the user wants the pilot.
    fn detect_pilot(&self, confirmed: &DeviceState) {
        let idling_on_pilot = confirmed.is_on()
            && confirmed.flame_height().is_pilot()
            && !confirmed.igniting()
            && !confirmed.shutting_down();
        let wants_off = self.inner.sync.lock().intent.on == Some(false);
        if idling_on_pilot && !wants_off && !self.preferences().keep_pilot_on {
            tracing::info!("Fireplace idling on pilot, enabling keep-pilot");
            self.set_keep_pilot(true);
        }
    }

    fn remember_on(&self, on: bool) {
        self.inner.persistence.update(|s| s.last_on = Some(on));
    }

    // ========== Plumbing ==========

    /// Records a write. A new write ends any hold, so polls reconcile again.
    fn update_intent(&self, change: impl FnOnce(&mut ControlIntent)) {
        {
            let mut sync = self.inner.sync.lock();
            sync.held = false;
            change(&mut sync.intent);
        }
        self.publish_state();
    }

    fn publish_state(&self) -> FireplaceSnapshot {
        let snapshot = self.snapshot();
        self.inner.events.publish(FireplaceEvent::StateChanged {
            snapshot: Box::new(snapshot.clone()),
        });
        snapshot
    }

    async fn send<C: Command + Sync>(&self, command: &C) -> Result<(), Error> {
        let outcome = self.inner.device.send_command(command).await?;
        if let CommandOutcome::Unreachable(e) = outcome {
            tracing::warn!(command = command.name(), error = %e, "Command not delivered");
        }
        Ok(())
    }

    async fn refresh_after_write(&self) {
        if let Err(e) = self.refresh().await {
            tracing::debug!(error = %e, "Refresh after command failed");
        }
    }
}
