//! The per-controller client facade.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use airhub_core::encoding::Writer;
use airhub_core::messages::ac_control::{write_ac_control_frame, AcControl};
use airhub_core::messages::zone_control::{write_zone_control_frame, ZoneControl, ZoneSetting};
use airhub_core::types::{AcMode, AcPowerAction, FanSpeed, Setting, ZonePowerAction};
use airhub_core::EncodeError;
use airhub_net::{ControllerSession, SessionConfig};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::ClientError;
use crate::events::ControllerEvent;
use crate::state::ControllerState;

/// Largest control frame the client sends.
const CONTROL_FRAME_MAX: usize = 32;

/// One connected controller: a session, the aggregated state model, and
/// the command API.
///
/// A background driver task applies every decoded session event to the
/// state model and forwards the resulting [`ControllerEvent`]s to the
/// receiver returned by [`ControllerClient::connect`]. Commands are
/// fire-and-forget; their effect arrives later as a status event.
pub struct ControllerClient {
    session: ControllerSession,
    state: Arc<Mutex<ControllerState>>,
    driver: JoinHandle<()>,
}

impl ControllerClient {
    /// Connects to the controller at `addr` with default session timings.
    pub fn connect(addr: SocketAddr) -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        Self::connect_with_config(addr, SessionConfig::default())
    }

    pub fn connect_with_config(
        addr: SocketAddr,
        config: SessionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (session, mut session_events) = ControllerSession::spawn_with_config(addr, config);
        let state = Arc::new(Mutex::new(ControllerState::new()));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let driver_state = Arc::clone(&state);
        let driver = tokio::spawn(async move {
            while let Some(event) = session_events.recv().await {
                let outputs = lock(&driver_state).apply(event);
                for output in outputs {
                    if event_tx.send(output).is_err() {
                        return;
                    }
                }
            }
        });

        (
            Self {
                session,
                state,
                driver,
            },
            event_rx,
        )
    }

    /// Runs a closure against the current state model. The lock is held
    /// only for the closure, so keep it short.
    pub fn with_state<R>(&self, f: impl FnOnce(&ControllerState) -> R) -> R {
        f(&lock(&self.state))
    }

    pub fn set_unit_power(&self, unit: u8, on: bool) -> Result<(), ClientError> {
        let action = if on { AcPowerAction::On } else { AcPowerAction::Off };
        self.send_ac_control(AcControl {
            power: Setting::Set(action),
            ..AcControl::for_unit(unit)
        })
    }

    pub fn set_unit_mode(&self, unit: u8, mode: AcMode) -> Result<(), ClientError> {
        self.send_ac_control(AcControl {
            mode: Setting::Set(mode),
            ..AcControl::for_unit(unit)
        })
    }

    pub fn set_unit_fan_speed(&self, unit: u8, speed: FanSpeed) -> Result<(), ClientError> {
        self.send_ac_control(AcControl {
            fan_speed: Setting::Set(speed),
            ..AcControl::for_unit(unit)
        })
    }

    pub fn set_unit_setpoint(&self, unit: u8, celsius: f32) -> Result<(), ClientError> {
        self.send_ac_control(AcControl {
            setpoint: Setting::Set(celsius),
            ..AcControl::for_unit(unit)
        })
    }

    pub fn set_zone_power(&self, zone: u8, on: bool) -> Result<(), ClientError> {
        let action = if on { ZonePowerAction::On } else { ZonePowerAction::Off };
        self.send_zone_control(ZoneControl {
            power: Setting::Set(action),
            ..ZoneControl::for_zone(zone)
        })
    }

    pub fn set_zone_damper_percent(&self, zone: u8, percent: u8) -> Result<(), ClientError> {
        self.send_zone_control(ZoneControl {
            setting: ZoneSetting::DamperPercent(percent),
            ..ZoneControl::for_zone(zone)
        })
    }

    pub fn set_zone_setpoint(&self, zone: u8, celsius: f32) -> Result<(), ClientError> {
        self.send_zone_control(ZoneControl {
            setting: ZoneSetting::Setpoint(celsius),
            ..ZoneControl::for_zone(zone)
        })
    }

    fn send_ac_control(&self, control: AcControl) -> Result<(), ClientError> {
        self.send_built(|w| write_ac_control_frame(w, &control))
    }

    fn send_zone_control(&self, control: ZoneControl) -> Result<(), ClientError> {
        self.send_built(|w| write_zone_control_frame(w, &control))
    }

    fn send_built(
        &self,
        write: impl FnOnce(&mut Writer<'_>) -> Result<(), EncodeError>,
    ) -> Result<(), ClientError> {
        let mut buf = [0u8; CONTROL_FRAME_MAX];
        let mut w = Writer::new(&mut buf);
        write(&mut w)?;
        self.session.send_frame(w.as_written().to_vec())?;
        Ok(())
    }
}

impl Drop for ControllerClient {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

/// Locks the state model, recovering from a poisoned lock. The model is
/// only mutated by `apply`, which cannot leave it half-updated in a way
/// later reads would misinterpret.
fn lock(state: &Mutex<ControllerState>) -> MutexGuard<'_, ControllerState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use airhub_core::frame::{write_extended_frame, write_standard_frame};
    use airhub_core::messages::ac_ability::{ABILITY_DETAIL_LEN, NAME_FIELD_LEN};
    use airhub_core::messages::requests::{
        write_ac_ability_request, write_ac_status_request, write_zone_name_request,
        write_zone_status_request,
    };
    use airhub_core::messages::{
        EXTENDED_MARKER, SUBTYPE_AC_ABILITY, SUBTYPE_AC_STATUS, SUBTYPE_ZONE_NAME,
        SUBTYPE_ZONE_STATUS,
    };
    use crate::climate::ClimateAction;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    fn built(f: impl FnOnce(&mut Writer<'_>) -> Result<(), EncodeError>) -> Vec<u8> {
        let mut buf = [0u8; 256];
        let mut w = Writer::new(&mut buf);
        f(&mut w).unwrap();
        w.as_written().to_vec()
    }

    fn ability_reply() -> Vec<u8> {
        let mut payload = vec![EXTENDED_MARKER, SUBTYPE_AC_ABILITY];
        payload.extend_from_slice(&[0, ABILITY_DETAIL_LEN as u8]);
        let mut field = [0u8; NAME_FIELD_LEN];
        field[.."Living".len()].copy_from_slice(b"Living");
        payload.extend_from_slice(&field);
        payload.extend_from_slice(&[0, 2, 0x13, 0x15, 16, 30, 17, 31]);
        built(|w| write_extended_frame(w, &payload))
    }

    fn ac_status_reply() -> Vec<u8> {
        // Unit 0, on, auto, setpoint 22.0, current 24.0.
        let mut payload = vec![0x00, 0x08, 0x00, 0x01];
        payload.extend_from_slice(&[0x10, 0x00, 0x78, 0x00, 0x02, 0xE4, 0x00, 0x00]);
        built(|w| write_standard_frame(w, SUBTYPE_AC_STATUS, &payload))
    }

    fn zone_status_reply() -> Vec<u8> {
        // Zone 0, on, damper 0%, setpoint 22.0, sensor, current 24.0.
        let mut payload = vec![0x00, 0x08, 0x00, 0x01];
        payload.extend_from_slice(&[0x40, 0x00, 0x78, 0x80, 0x02, 0xE4, 0x00, 0x00]);
        built(|w| write_standard_frame(w, SUBTYPE_ZONE_STATUS, &payload))
    }

    fn zone_names_reply() -> Vec<u8> {
        let mut payload = vec![EXTENDED_MARKER, SUBTYPE_ZONE_NAME, 0, 6];
        payload.extend_from_slice(b"Living");
        built(|w| write_extended_frame(w, &payload))
    }

    async fn next_event(events: &mut mpsc::UnboundedReceiver<ControllerEvent>) -> ControllerEvent {
        timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for client event")
            .expect("driver task ended early")
    }

    #[tokio::test]
    async fn bootstrap_populates_state_and_commands_hit_the_wire() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();

            let mut req = vec![0u8; built(write_ac_ability_request).len()];
            sock.read_exact(&mut req).await.unwrap();
            sock.write_all(&ability_reply()).await.unwrap();

            let expected: Vec<u8> = [
                built(write_ac_status_request),
                built(write_zone_status_request),
            ]
            .concat();
            let mut req = vec![0u8; expected.len()];
            sock.read_exact(&mut req).await.unwrap();
            sock.write_all(&ac_status_reply()).await.unwrap();
            sock.write_all(&zone_status_reply()).await.unwrap();

            let mut req = vec![0u8; built(write_zone_name_request).len()];
            sock.read_exact(&mut req).await.unwrap();
            sock.write_all(&zone_names_reply()).await.unwrap();

            // The zone power command the test sends below.
            let expected = built(|w| {
                write_zone_control_frame(
                    w,
                    &ZoneControl {
                        power: Setting::Set(ZonePowerAction::On),
                        ..ZoneControl::for_zone(0)
                    },
                )
            });
            let mut frame = vec![0u8; expected.len()];
            sock.read_exact(&mut frame).await.unwrap();
            assert_eq!(frame, expected);
            sock
        });

        let (client, mut events) = ControllerClient::connect(addr);

        match next_event(&mut events).await {
            ControllerEvent::UnitAbilityDiscovered(ability) => {
                assert_eq!(ability.name, "Living");
                assert_eq!(ability.zone_count, 2);
            }
            other => panic!("expected ability, got {other:?}"),
        }
        match next_event(&mut events).await {
            ControllerEvent::UnitStatusUpdated(status) => {
                assert_eq!(status.setpoint, 22.0);
                assert_eq!(status.current_temp, 24.0);
            }
            other => panic!("expected unit status, got {other:?}"),
        }
        match next_event(&mut events).await {
            ControllerEvent::ZoneStatusUpdated(status) => assert_eq!(status.damper_percent, 0),
            other => panic!("expected zone status, got {other:?}"),
        }
        assert_eq!(
            next_event(&mut events).await,
            ControllerEvent::ZoneNameUpdated { zone: 0, name: "Living".to_owned() }
        );
        assert_eq!(
            next_event(&mut events).await,
            ControllerEvent::ZoneReadyForRegistration { zone: 0 }
        );

        // Closed damper reads idle; the unit itself is in auto with the
        // setpoint below the current reading, so it cools.
        client.with_state(|state| {
            assert_eq!(state.zone_current_action(0), Some(ClimateAction::Idle));
            assert_eq!(state.unit_current_action(0), Some(ClimateAction::Cooling));
            assert_eq!(state.zone(0).unwrap().name.as_deref(), Some("Living"));
        });

        client.set_zone_power(0, true).unwrap();

        let _sock = server.await.unwrap();
        drop(client);
    }

    #[tokio::test]
    async fn out_of_range_command_fails_without_touching_the_session() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (client, _events) = ControllerClient::connect(addr);

        assert!(matches!(
            client.set_unit_setpoint(0, 99.0),
            Err(ClientError::Encode(EncodeError::ValueOutOfRange))
        ));
        assert!(matches!(
            client.set_zone_damper_percent(0, 150),
            Err(ClientError::Encode(EncodeError::ValueOutOfRange))
        ));
    }
}
