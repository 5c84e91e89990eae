// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persisted preferences and thermostat settings.
//!
//! State is restored once when a session starts and saved after every
//! change; an update that leaves the state as it was is not saved. Saving is
//! best effort: a failing store is logged and the session
//! keeps running on its in-memory copy.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use mertik_lib::store::{MemoryStore, Persistence};
//!
//! let persistence = Persistence::restore(Arc::new(MemoryStore::new()));
//! persistence.update(|state| state.keep_pilot_on = true);
//! assert!(persistence.current().keep_pilot_on);
//! ```

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::thermostat::ThermostatMode;

/// Everything that survives a restart.
///
/// Missing fields in stored data take their default, so older files keep
/// loading when fields are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    /// Thermostat mode.
    pub thermostat_mode: ThermostatMode,
    /// Thermostat target in °C.
    pub target_temperature_c: f64,
    /// Thermostat dead band in °C.
    pub deadzone_c: f64,
    /// Software intent survives an outage.
    pub smart_sync: bool,
    /// "Turn off" drops to the pilot.
    pub keep_pilot_on: bool,
    /// Last commanded on/off state.
    pub last_on: Option<bool>,
    /// Host-specific switches keyed by name.
    pub flags: BTreeMap<String, bool>,
}

impl PersistedState {
    /// Target used when nothing was stored.
    pub const DEFAULT_TARGET_C: f64 = 21.0;
    /// Dead band used when nothing was stored.
    pub const DEFAULT_DEADZONE_C: f64 = 0.5;
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            thermostat_mode: ThermostatMode::Off,
            target_temperature_c: Self::DEFAULT_TARGET_C,
            deadzone_c: Self::DEFAULT_DEADZONE_C,
            smart_sync: false,
            keep_pilot_on: false,
            last_on: None,
            flags: BTreeMap::new(),
        }
    }
}

/// Storage backend for [`PersistedState`].
pub trait StateStore: Send + Sync + fmt::Debug {
    /// Loads the stored state, `None` if nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be read or holds invalid
    /// data.
    fn load(&self) -> Result<Option<PersistedState>, StoreError>;

    /// Replaces the stored state.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    fn save(&self, state: &PersistedState) -> Result<(), StoreError>;
}

/// Shared handle to the in-memory state and its store.
#[derive(Debug, Clone)]
pub struct Persistence {
    store: Arc<dyn StateStore>,
    state: Arc<Mutex<PersistedState>>,
}

impl Persistence {
    /// Loads the stored state, falling back to defaults.
    #[must_use]
    pub fn restore(store: Arc<dyn StateStore>) -> Self {
        let state = match store.load() {
            Ok(Some(state)) => {
                tracing::info!("Restored persisted fireplace state");
                state
            }
            Ok(None) => {
                tracing::info!("No persisted fireplace state, using defaults");
                PersistedState::default()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load persisted state, using defaults");
                PersistedState::default()
            }
        };
        Self {
            store,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn current(&self) -> PersistedState {
        self.state.lock().clone()
    }

    /// Applies a change and saves the result if anything changed.
    pub fn update(&self, change: impl FnOnce(&mut PersistedState)) {
        let snapshot = {
            let mut state = self.state.lock();
            let before = state.clone();
            change(&mut state);
            if *state == before {
                return;
            }
            state.clone()
        };
        if let Err(e) = self.store.save(&snapshot) {
            tracing::error!(error = %e, "Failed to save fireplace state");
        }
    }
}
