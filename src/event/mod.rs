// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Upstream notifications.
//!
//! The coordinator publishes a [`FireplaceEvent`] on its [`EventBus`] after
//! every optimistic update, every poll and every preference change. Hosts
//! subscribe and re-render from the carried snapshot.
//!
//! ```no_run
//! # async fn example(session: mertik_lib::Session) {
//! use mertik_lib::event::FireplaceEvent;
//!
//! let mut events = session.coordinator().subscribe();
//! while let Ok(event) = events.recv().await {
//!     if let Some(snapshot) = event.snapshot() {
//!         println!("on: {}, height: {}", snapshot.is_on, snapshot.flame_height);
//!     }
//! }
//! # }
//! ```

mod event_bus;
mod fireplace_event;

pub use event_bus::EventBus;
pub use fireplace_event::{FireplaceEvent, PreferenceChange};
