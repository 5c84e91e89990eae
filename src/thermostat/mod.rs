// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Proportional thermostat.
//!
//! In heat mode the flame height follows the shortfall below the target:
//! six steps per degree, between 1 and 12. Inside the dead band nothing
//! happens; at or above the target the fireplace drops to its pilot or shuts
//! down, depending on the keep-pilot preference. A cold, unlit fireplace is
//! ignited first and its height set on the following tick.
//!
//! ```
//! use mertik_lib::thermostat::{Demand, classify};
//!
//! assert_eq!(classify(-0.3, 0.5), Demand::Satisfied);
//! assert_eq!(classify(0.4, 0.5), Demand::DeadBand);
//! assert!(matches!(classify(1.0, 0.5), Demand::Heat(h) if h.value() == 6));
//! ```

mod climate;
mod demand;

pub use climate::Thermostat;
pub use demand::{
    ControlInput, Demand, ThermostatAction, ThermostatMode, classify, decide, proportional_height,
};
