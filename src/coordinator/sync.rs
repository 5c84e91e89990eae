// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconciliation of software intent with polled device state.

use serde::Serialize;

use crate::state::{ControlIntent, DeviceState};
use crate::types::FanSpeed;

/// Reachability of the device as seen by the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Availability {
    /// No poll has completed yet.
    #[default]
    Unknown,
    /// The last poll returned a status frame.
    Available,
    /// The last poll failed.
    Unavailable,
}

impl Availability {
    /// Returns `true` if the last poll succeeded.
    #[must_use]
    pub fn is_available(self) -> bool {
        self == Self::Available
    }
}

/// Intent bookkeeping shared by the coordinator's operations.
#[derive(Debug, Default)]
pub(crate) struct SyncState {
    pub(crate) intent: ControlIntent,
    pub(crate) availability: Availability,
    pub(crate) thermostat_active: bool,
    /// Intent retained across an outage or a restart, waiting for a resync
    /// or a new write.
    pub(crate) held: bool,
    /// Polls that already tolerated an "on" intent the device reports off.
    pub(crate) on_mismatch_polls: u8,
    /// Last speed sent to the fan; status frames do not carry it.
    pub(crate) last_fan_speed: Option<FanSpeed>,
}

/// What a poll did to the intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SyncOutcome {
    /// First successful poll; the device state was adopted.
    Initial,
    /// The device came back and its state replaced the intent.
    RecoveredAdopted,
    /// The device came back and the intent was kept.
    RecoveredHeld,
    /// Regular poll.
    Steady,
    /// The poll failed.
    Failed,
}

impl SyncState {
    /// Applies the outcome of a poll.
    ///
    /// `confirmed` is the device state after the poll; it is only consulted
    /// when the poll succeeded.
    pub(crate) fn reconcile(
        &mut self,
        poll_succeeded: bool,
        smart_sync: bool,
        confirmed: &DeviceState,
    ) -> SyncOutcome {
        if !poll_succeeded {
            self.availability = Availability::Unavailable;
            return SyncOutcome::Failed;
        }

        let previous = std::mem::replace(&mut self.availability, Availability::Available);
        match previous {
            Availability::Unknown if self.held => SyncOutcome::RecoveredHeld,
            Availability::Unknown => {
                self.clear();
                SyncOutcome::Initial
            }
            Availability::Unavailable if smart_sync && !self.intent.is_empty() => {
                self.held = true;
                SyncOutcome::RecoveredHeld
            }
            Availability::Unavailable => {
                self.clear();
                SyncOutcome::RecoveredAdopted
            }
            Availability::Available => {
                // held intent waits for a resync, a write or smart sync being switched off
                if !self.held {
                    if self.intent.expects_on_but_reported_off(confirmed)
                        && self.on_mismatch_polls == 0
                    {
                        self.on_mismatch_polls = 1;
                        self.intent.retain_power();
                    } else {
                        self.clear();
                    }
                }
                SyncOutcome::Steady
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.intent.clear();
        self.held = false;
        self.on_mismatch_polls = 0;
    }
}
