// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests driving the TCP transport against an emulated module.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use mertik_lib::command::{COMMAND_PREAMBLE, Command, FLAME_STEP_CODES, FlameCommand, StatusCommand};
use mertik_lib::device::{CommandOutcome, Device, RetryPolicy};
use mertik_lib::protocol::{Protocol, TcpClient, TcpConfig};
use mertik_lib::response::{StatusBit, StatusFrame};
use mertik_lib::types::FlameHeight;
use mertik_lib::{Error, ProtocolError};

// ============================================================================
// Emulator
// ============================================================================

enum Behaviour {
    Reply(Vec<u8>),
    Close,
    Hang,
}

type Handler = Arc<dyn Fn(&str) -> Behaviour + Send + Sync>;

/// Accepts one exchange per connection, like the real module.
struct Emulator {
    port: u16,
    suffixes: Arc<Mutex<Vec<String>>>,
}

impl Emulator {
    async fn start(handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let suffixes = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&suffixes);

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let handler = Arc::clone(&handler);
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let mut buf = [0_u8; 256];
                    let Ok(len) = stream.read(&mut buf).await else {
                        return;
                    };
                    let encoded = hex::encode(&buf[..len]);
                    let suffix = encoded
                        .strip_prefix(COMMAND_PREAMBLE)
                        .unwrap_or(&encoded)
                        .to_string();
                    seen.lock().push(suffix.clone());
                    match handler(&suffix) {
                        Behaviour::Reply(bytes) => {
                            let _ = stream.write_all(&bytes).await;
                        }
                        Behaviour::Close => {}
                        Behaviour::Hang => tokio::time::sleep(Duration::from_secs(60)).await,
                    }
                });
            }
        });

        Self { port, suffixes }
    }

    fn replying(frame: StatusFrame) -> Handler {
        let wire = frame.to_wire();
        Arc::new(move |_: &str| Behaviour::Reply(wire.clone()))
    }

    fn client(&self) -> TcpClient {
        TcpConfig::new("127.0.0.1")
            .with_port(self.port)
            .with_io_timeout(Duration::from_millis(200))
            .into_client()
    }

    fn device(&self) -> Device<TcpClient> {
        Device::new(self.client())
            .with_retry_policy(
                RetryPolicy::new()
                    .with_max_attempts(2)
                    .with_base_delay(Duration::from_millis(20)),
            )
            .with_cooldown(Duration::from_millis(10))
    }

    fn suffixes(&self) -> Vec<String> {
        self.suffixes.lock().clone()
    }
}

/// Stateful handler tracking burner state from the commands it receives.
fn simulated_fireplace(temperature: f64) -> Handler {
    let state = Arc::new(Mutex::new((false, 0_u8)));
    Arc::new(move |suffix: &str| {
        let mut state = state.lock();
        match suffix {
            "314103" => *state = (true, 0),
            "313003" => *state = (false, 0),
            s if s.len() == 10 && s.starts_with("3136") => {
                if let Some(level) = FLAME_STEP_CODES.iter().position(|c| *c == &s[4..8]) {
                    *state = (true, u8::try_from(level).unwrap());
                }
            }
            _ => {}
        }
        let (lit, height) = *state;
        let frame = StatusFrame::new()
            .with_flame_height(FlameHeight::new(height).unwrap())
            .with_bit(StatusBit::GuardFlame, lit)
            .with_temperature(temperature);
        Behaviour::Reply(frame.to_wire())
    })
}

// ============================================================================
// TcpClient Tests
// ============================================================================

mod tcp_client {
    use super::*;

    #[tokio::test]
    async fn exchanges_one_frame() {
        let frame = StatusFrame::new().with_temperature(20.5);
        let emulator = Emulator::start(Emulator::replying(frame.clone())).await;

        let reply = emulator
            .client()
            .transact(&StatusCommand.to_frame().unwrap())
            .await
            .unwrap();

        assert_eq!(reply, frame.to_wire());
        assert_eq!(emulator.suffixes(), vec![StatusCommand.suffix()]);
    }

    #[tokio::test]
    async fn closed_connection_is_empty_response() {
        let emulator = Emulator::start(Arc::new(|_: &str| Behaviour::Close)).await;

        let result = emulator
            .client()
            .transact(&StatusCommand.to_frame().unwrap())
            .await;

        assert!(matches!(result, Err(ProtocolError::EmptyResponse)));
    }

    #[tokio::test]
    async fn silent_device_times_out_on_read() {
        let emulator = Emulator::start(Arc::new(|_: &str| Behaviour::Hang)).await;

        let result = emulator
            .client()
            .transact(&StatusCommand.to_frame().unwrap())
            .await;

        assert!(matches!(
            result,
            Err(ProtocolError::Timeout { stage: "read", .. })
        ));
    }
}

// ============================================================================
// Device Tests
// ============================================================================

mod device {
    use super::*;

    #[tokio::test]
    async fn status_reply_updates_state() {
        let emulator = Emulator::start(simulated_fireplace(19.5)).await;
        let device = emulator.device();

        let outcome = device
            .send_command(&FlameCommand::SetHeight(FlameHeight::new(7).unwrap()))
            .await
            .unwrap();

        assert!(matches!(outcome, CommandOutcome::Status(_)));
        let state = device.state();
        assert!(state.is_on());
        assert_eq!(state.flame_height().value(), 7);
        assert_eq!(state.ambient_temperature_c(), Some(19.5));
    }

    #[tokio::test]
    async fn acknowledgment_leaves_state_stale() {
        let emulator =
            Emulator::start(Arc::new(|_: &str| Behaviour::Reply(b"\x02OK\r".to_vec()))).await;
        let device = emulator.device();

        let outcome = device.send_command(&FlameCommand::Ignite).await.unwrap();

        assert!(matches!(outcome, CommandOutcome::Acknowledged));
        assert!(!device.state().is_fresh());
    }

    #[tokio::test]
    async fn retries_then_reports_unreachable() {
        let emulator = Emulator::start(Arc::new(|_: &str| Behaviour::Close)).await;
        let device = emulator.device();

        let outcome = device.send_command(&StatusCommand).await.unwrap();

        assert!(matches!(
            outcome,
            CommandOutcome::Unreachable(ProtocolError::Unreachable { attempts: 2, .. })
        ));
        assert_eq!(emulator.suffixes().len(), 2);
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        // bind and drop to get a port nobody listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let device = Device::new(TcpConfig::new("127.0.0.1").with_port(port).into_client())
            .with_retry_policy(RetryPolicy::no_retry())
            .with_cooldown(Duration::ZERO);

        let outcome = device.send_command(&StatusCommand).await.unwrap();
        assert!(!outcome.is_delivered());
    }

    #[tokio::test]
    async fn invalid_raw_suffix_is_not_sent() {
        let emulator = Emulator::start(simulated_fireplace(20.0)).await;
        let device = emulator.device();

        let result = device.send_raw("zz").await;

        assert!(result.is_err());
        assert!(emulator.suffixes().is_empty());
    }

    #[tokio::test]
    async fn concurrent_commands_reach_the_device_in_order() {
        let emulator = Emulator::start(simulated_fireplace(20.0)).await;
        let device = Arc::new(emulator.device());

        let first = {
            let device = Arc::clone(&device);
            tokio::spawn(async move { device.send_command(&FlameCommand::Ignite).await })
        };
        // give the first caller the gate
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = {
            let device = Arc::clone(&device);
            tokio::spawn(async move { device.send_command(&FlameCommand::Shutdown).await })
        };
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        assert_eq!(
            emulator.suffixes(),
            vec![FlameCommand::Ignite.suffix(), FlameCommand::Shutdown.suffix()]
        );
        assert!(!device.state().is_on());
    }
}

// ============================================================================
// Session Tests
// ============================================================================

mod session {
    use super::*;
    use mertik_lib::coordinator::FireplaceConfig;
    use mertik_lib::store::{JsonFileStore, StateStore};
    use mertik_lib::thermostat::{ThermostatAction, ThermostatMode};
    use mertik_lib::{PolicyViolation, Session};

    fn config(port: u16) -> FireplaceConfig {
        FireplaceConfig::new("127.0.0.1")
            .with_port(port)
            .with_io_timeout(Duration::from_millis(200))
            .with_retry_policy(RetryPolicy::no_retry())
            .with_cooldown(Duration::from_millis(10))
            .with_poll_interval(Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn controls_fireplace_and_persists_thermostat() {
        let emulator = Emulator::start(simulated_fireplace(19.0)).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fireplace.json");

        let session =
            Session::connect(config(emulator.port), Arc::new(JsonFileStore::new(&path))).unwrap();
        session.start().await;
        assert!(session.coordinator().snapshot().available);

        let action = session
            .thermostat()
            .set_mode(ThermostatMode::Heat)
            .await
            .unwrap();
        assert_eq!(action, Some(ThermostatAction::Ignite));
        assert!(session.coordinator().snapshot().is_on);

        let manual = session
            .coordinator()
            .set_flame_height(FlameHeight::FULL)
            .await;
        assert!(matches!(
            manual,
            Err(Error::Policy(PolicyViolation::ThermostatActive))
        ));

        let next = session.thermostat().tick().await.unwrap();
        assert_eq!(next, Some(ThermostatAction::SetFlameHeight(FlameHeight::FULL)));
        assert_eq!(session.coordinator().snapshot().flame_height, FlameHeight::FULL);
        session.shutdown();

        let stored = JsonFileStore::new(&path).load().unwrap().unwrap();
        assert_eq!(stored.thermostat_mode, ThermostatMode::Heat);
        assert_eq!(stored.last_on, Some(true));
    }

    #[tokio::test]
    async fn unreachable_fireplace_is_reported_not_fatal() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let session = Session::connect(
            config(port),
            Arc::new(mertik_lib::store::MemoryStore::new()),
        )
        .unwrap();
        let mut events = session.coordinator().subscribe();

        session.start().await;
        assert!(session.is_running());
        assert!(!session.coordinator().snapshot().available);
        assert!(session.coordinator().ignite().await.is_ok());

        let mut failures = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, mertik_lib::FireplaceEvent::UpdateFailed { .. }) {
                failures += 1;
            }
        }
        assert!(failures >= 2);
        session.shutdown();
    }
}
