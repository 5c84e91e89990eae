// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One fireplace session: coordinator, thermostat and poll loop.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::coordinator::{FireplaceConfig, FireplaceCoordinator};
use crate::error::Error;
use crate::protocol::{Protocol, TcpClient};
use crate::store::{Persistence, StateStore};
use crate::thermostat::Thermostat;

/// A configured fireplace with its background poll loop.
///
/// Every tick of the loop polls the device and then evaluates the
/// thermostat. A failed tick is logged and published as an event; the loop
/// keeps running until [`Session::shutdown`] is called or the session is
/// dropped.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use mertik_lib::Session;
/// use mertik_lib::coordinator::FireplaceConfig;
/// use mertik_lib::store::JsonFileStore;
/// use mertik_lib::thermostat::ThermostatMode;
///
/// # async fn example() -> mertik_lib::Result<()> {
/// let config = FireplaceConfig::new("192.168.1.60");
/// let store = Arc::new(JsonFileStore::new("/var/lib/fireplace/state.json"));
///
/// let session = Session::connect(config, store)?;
/// session.start().await;
///
/// session.thermostat().set_target(21.5).await?;
/// session.thermostat().set_mode(ThermostatMode::Heat).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session<P: Protocol + 'static = TcpClient> {
    config: FireplaceConfig,
    coordinator: FireplaceCoordinator<P>,
    thermostat: Thermostat<P>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl Session<TcpClient> {
    /// Creates a session talking TCP to the configured host.
    ///
    /// Nothing is sent until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is unusable; no session
    /// is created in that case.
    pub fn connect(config: FireplaceConfig, store: Arc<dyn StateStore>) -> Result<Self, Error> {
        config.validate()?;
        let client = config.tcp_config().into_client();
        Self::with_protocol(config, client, store)
    }
}

impl<P: Protocol + 'static> Session<P> {
    /// Creates a session over a custom transport.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is unusable.
    pub fn with_protocol(
        config: FireplaceConfig,
        protocol: P,
        store: Arc<dyn StateStore>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let device = config.device(protocol);
        let persistence = Persistence::restore(store);
        let coordinator = FireplaceCoordinator::new(device, &config, persistence);
        let thermostat = Thermostat::new(coordinator.clone());
        tracing::info!(host = config.host(), port = config.port(), "Fireplace session created");
        Ok(Self {
            config,
            coordinator,
            thermostat,
            poller: Mutex::new(None),
        })
    }

    /// Returns the coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &FireplaceCoordinator<P> {
        &self.coordinator
    }

    /// Returns the thermostat.
    #[must_use]
    pub fn thermostat(&self) -> &Thermostat<P> {
        &self.thermostat
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &FireplaceConfig {
        &self.config
    }

    /// Returns `true` while the poll loop runs.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.poller
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Performs a first poll and starts the poll loop.
    ///
    /// The first poll's outcome is logged and published like any other;
    /// an unreachable fireplace does not prevent the loop from starting.
    /// Calling this on a running session does nothing.
    pub async fn start(&self) {
        if self.is_running() {
            return;
        }
        if let Err(e) = self.coordinator.refresh().await {
            tracing::warn!(error = %e, "Initial fireplace poll failed");
        }

        let coordinator = self.coordinator.clone();
        let thermostat = self.thermostat.clone();
        let period = self.config.poll_interval();
        tracing::debug!(
            period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            "Starting poll loop"
        );
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                Self::poll_once(&coordinator, &thermostat).await;
            }
        });
        *self.poller.lock() = Some(handle);
    }

    /// Stops the poll loop.
    ///
    /// A command already queued on the device completes on its own; nothing
    /// new is started.
    pub fn shutdown(&self) {
        if let Some(handle) = self.poller.lock().take() {
            handle.abort();
            tracing::info!("Fireplace session stopped");
        }
    }

    async fn poll_once(coordinator: &FireplaceCoordinator<P>, thermostat: &Thermostat<P>) {
        if let Err(e) = coordinator.refresh().await {
            tracing::debug!(error = %e, "Poll failed");
            return;
        }
        if let Err(e) = thermostat.tick().await {
            tracing::warn!(error = %e, "Thermostat tick failed");
        }
    }
}

impl<P: Protocol + 'static> Drop for Session<P> {
    fn drop(&mut self) {
        if let Some(handle) = self.poller.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::command::{Command, FlameCommand, StatusCommand};
    use crate::error::ConfigError;
    use crate::fake::FakeFireplace;
    use crate::store::MemoryStore;
    use crate::thermostat::ThermostatMode;
    use crate::types::FlameHeight;

    fn config() -> FireplaceConfig {
        FireplaceConfig::new("fake")
            .with_cooldown(Duration::from_millis(100))
            .with_poll_interval(Duration::from_secs(15))
    }

    fn session(fake: FakeFireplace) -> Session<FakeFireplace> {
        Session::with_protocol(config(), fake, Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn invalid_config_creates_no_session() {
        let result = Session::connect(FireplaceConfig::new(""), Arc::new(MemoryStore::new()));
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingHost))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn loop_polls_on_interval() {
        let s = session(FakeFireplace::new());
        s.start().await;
        assert!(s.is_running());
        assert_eq!(s.coordinator().device().protocol().count(&StatusCommand), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(s.coordinator().device().protocol().count(&StatusCommand), 3);

        s.shutdown();
        assert!(!s.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_tick_keeps_loop_alive() {
        let fake = FakeFireplace::new();
        fake.set_offline(true);
        let s = session(fake);
        s.start().await;

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(s.is_running());
        assert!(!s.coordinator().snapshot().available);

        s.coordinator().device().protocol().set_offline(false);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(s.coordinator().snapshot().available);
        s.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn loop_drives_thermostat() {
        let fake = FakeFireplace::new();
        fake.set_temperature(19.0);
        let s = session(fake);
        s.start().await;
        s.thermostat().set_mode(ThermostatMode::Heat).await.unwrap();
        assert!(s.coordinator().device_state().is_on());

        tokio::time::sleep(Duration::from_secs(16)).await;

        let fake = s.coordinator().device().protocol();
        assert_eq!(fake.count(&FlameCommand::SetHeight(FlameHeight::FULL)), 1);
        assert_eq!(
            fake.writes().first(),
            Some(&FlameCommand::Ignite.suffix())
        );
        s.shutdown();
    }
}
