// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory fireplace used by unit tests.

use std::future::Future;
use std::io;

use parking_lot::Mutex;

use crate::command::{COMMAND_PREAMBLE, Command, FLAME_STEP_CODES};
use crate::error::ProtocolError;
use crate::protocol::Protocol;
use crate::response::{StatusBit, StatusFrame};
use crate::types::FlameHeight;

#[derive(Debug, Default)]
struct Simulated {
    lit: bool,
    height: u8,
    igniting_polls: u32,
    ignition_polls: u32,
    aux: bool,
    light: bool,
    brightness: u8,
    fan: bool,
    eco: bool,
    temperature: f64,
    offline: bool,
    fail_next: u32,
    ack_only: bool,
    attempts: usize,
    sent: Vec<String>,
}

/// Fake device that interprets command suffixes and answers with status
/// frames describing its simulated state.
#[derive(Debug, Default)]
pub(crate) struct FakeFireplace {
    sim: Mutex<Simulated>,
}

impl FakeFireplace {
    pub(crate) fn new() -> Self {
        let fake = Self::default();
        fake.sim.lock().temperature = 20.0;
        fake
    }

    pub(crate) fn set_temperature(&self, celsius: f64) {
        self.sim.lock().temperature = celsius;
    }

    /// Puts the fireplace into a lit state without recording a command.
    pub(crate) fn set_lit(&self, lit: bool, height: u8) {
        let mut sim = self.sim.lock();
        sim.lit = lit;
        sim.height = if lit { height } else { 0 };
    }

    pub(crate) fn set_aux(&self, on: bool) {
        self.sim.lock().aux = on;
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.sim.lock().offline = offline;
    }

    pub(crate) fn fail_next(&self, count: u32) {
        self.sim.lock().fail_next = count;
    }

    pub(crate) fn set_ack_only(&self, ack_only: bool) {
        self.sim.lock().ack_only = ack_only;
    }

    /// Number of replies that still report the ignition running after an
    /// ignite command.
    pub(crate) fn set_ignition_polls(&self, polls: u32) {
        self.sim.lock().ignition_polls = polls;
    }

    pub(crate) fn attempts(&self) -> usize {
        self.sim.lock().attempts
    }

    /// Suffixes of every delivered command, oldest first.
    pub(crate) fn sent(&self) -> Vec<String> {
        self.sim.lock().sent.clone()
    }

    /// Delivered commands other than status polls.
    pub(crate) fn writes(&self) -> Vec<String> {
        self.sim
            .lock()
            .sent
            .iter()
            .filter(|s| s.as_str() != "303303")
            .cloned()
            .collect()
    }

    pub(crate) fn count<C: Command>(&self, command: &C) -> usize {
        let suffix = command.suffix();
        self.sim.lock().sent.iter().filter(|s| **s == suffix).count()
    }

    pub(crate) fn clear_sent(&self) {
        self.sim.lock().sent.clear();
    }

    fn handle(&self, frame: &[u8]) -> Result<Vec<u8>, ProtocolError> {
        let mut sim = self.sim.lock();
        sim.attempts += 1;
        if sim.offline {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "offline").into());
        }
        if sim.fail_next > 0 {
            sim.fail_next -= 1;
            return Err(ProtocolError::EmptyResponse);
        }

        let encoded = hex::encode(frame);
        let suffix = encoded
            .strip_prefix(COMMAND_PREAMBLE)
            .unwrap_or(&encoded)
            .to_string();
        sim.apply(&suffix);
        sim.sent.push(suffix);

        if sim.ack_only {
            return Ok(b"\x02OK\r".to_vec());
        }
        let reply = sim.status().to_wire();
        sim.igniting_polls = sim.igniting_polls.saturating_sub(1);
        Ok(reply)
    }
}

impl Simulated {
    fn apply(&mut self, suffix: &str) {
        match suffix {
            "314103" => {
                self.lit = true;
                self.height = 0;
                self.igniting_polls = self.ignition_polls;
            }
            "313003" => {
                self.lit = false;
                self.height = 0;
                self.aux = false;
            }
            "3330303103" => self.light = true,
            "3330303003" => self.light = false,
            "32303031030a" => self.aux = true,
            "32303030030a" => self.aux = false,
            "3430303103" => self.fan = true,
            "3430303003" => self.fan = false,
            "4233303103" => self.eco = true,
            "423003" => self.eco = false,
            s if s.len() == 10 && s.starts_with("3136") => {
                if let Some(level) = FLAME_STEP_CODES.iter().position(|c| *c == &s[4..8]) {
                    self.lit = true;
                    self.height = u8::try_from(level).unwrap_or(0);
                }
            }
            s if s.starts_with("33304645") => {
                self.light = true;
                self.brightness = if s == "33304645464203" { 255 } else { 128 };
            }
            _ => {}
        }
    }

    fn status(&self) -> StatusFrame {
        StatusFrame::new()
            .with_flame_height(FlameHeight::clamped(i64::from(self.height)))
            .with_bit(StatusBit::GuardFlame, self.lit)
            .with_bit(StatusBit::Igniting, self.igniting_polls > 0)
            .with_bit(StatusBit::Aux, self.aux)
            .with_bit(StatusBit::Light, self.light)
            .with_light_brightness(self.brightness)
            .with_bit(StatusBit::Fan, self.fan)
            .with_mode(if self.eco { "2" } else { "1" })
            .with_temperature(self.temperature)
            .with_rf_signal(180)
    }
}

impl Protocol for FakeFireplace {
    fn transact(
        &self,
        frame: &[u8],
    ) -> impl Future<Output = Result<Vec<u8>, ProtocolError>> + Send {
        let result = self.handle(frame);
        async move { result }
    }
}
