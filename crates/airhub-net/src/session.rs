//! The per-controller TCP session.
//!
//! A [`ControllerSession`] owns one background task that holds the socket,
//! runs the bootstrap handshake (ability, then status, then names), deframes
//! the inbound stream, and forwards decoded records as [`SessionEvent`]s.
//! When the connection drops, or falls silent past the liveness window, the
//! task emits [`SessionEvent::Reconnecting`] and dials again after a backoff.
//! Outbound frames are serialized through the session's command channel, so
//! callers never touch the socket directly.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use airhub_core::encoding::Writer;
use airhub_core::frame::Deframer;
use airhub_core::messages::ac_ability::{AcAbilityRecord, FanSpeedSupport, ModeSupport};
use airhub_core::messages::ac_status::AcStatus;
use airhub_core::messages::requests::{
    write_ac_ability_request, write_ac_status_request, write_zone_name_request,
    write_zone_status_request, REQUEST_FRAME_MAX,
};
use airhub_core::messages::zone_status::ZoneStatus;
use airhub_core::messages::{decode_body, Message};
use airhub_core::EncodeError;
use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Instant};

/// TCP port the controller listens on.
pub const CONTROLLER_PORT: u16 = 9005;

/// Session timing knobs. The defaults match controller behavior in the
/// field; tests shrink them.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How often the silence clock is checked.
    pub liveness_check_interval: Duration,
    /// Inbound silence after which the connection is presumed dead.
    pub liveness_timeout: Duration,
    /// Delay before redialing after a lost connection.
    pub reconnect_backoff: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            liveness_check_interval: Duration::from_secs(10),
            liveness_timeout: Duration::from_secs(120),
            reconnect_backoff: Duration::from_secs(10),
        }
    }
}

/// Session-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame encoding failed: {0}")]
    Encode(#[from] EncodeError),
    #[error("connection closed by controller")]
    ConnectionClosed,
    #[error("no inbound traffic for {0:?}")]
    LivenessTimeout(Duration),
    #[error("session task has shut down")]
    Closed,
}

/// One unit's capability record, owned for delivery outside the read buffer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitAbility {
    pub unit: u8,
    pub name: String,
    pub start_zone: u8,
    pub zone_count: u8,
    pub modes: ModeSupport,
    pub fan_speeds: FanSpeedSupport,
    pub min_cool_setpoint: f32,
    pub max_cool_setpoint: f32,
    pub min_heat_setpoint: f32,
    pub max_heat_setpoint: f32,
}

impl UnitAbility {
    /// Whether `zone` falls inside this unit's owned range.
    pub fn owns_zone(&self, zone: u8) -> bool {
        zone >= self.start_zone
            && u16::from(zone) < u16::from(self.start_zone) + u16::from(self.zone_count)
    }
}

impl From<AcAbilityRecord<'_>> for UnitAbility {
    fn from(record: AcAbilityRecord<'_>) -> Self {
        Self {
            unit: record.unit,
            name: record.name.to_owned(),
            start_zone: record.start_zone,
            zone_count: record.zone_count,
            modes: record.modes,
            fan_speeds: record.fan_speeds,
            min_cool_setpoint: record.min_cool_setpoint,
            max_cool_setpoint: record.max_cool_setpoint,
            min_heat_setpoint: record.min_heat_setpoint,
            max_heat_setpoint: record.max_heat_setpoint,
        }
    }
}

/// Decoded traffic and lifecycle notices from the session task.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The TCP connection is up and the bootstrap has been started.
    Connected,
    /// The connection was lost; the session will redial after the backoff.
    Reconnecting,
    UnitAbility(UnitAbility),
    AcStatus(AcStatus),
    ZoneStatus(ZoneStatus),
    ZoneName { zone: u8, name: String },
}

/// Bootstrap progress. Status requests go out once ability has answered,
/// and the name request once the first zone status has landed, because the
/// controller ignores requests sent ahead of that sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingAbility,
    AwaitingZoneStatus,
    Ready,
}

/// Handle to a running controller session.
///
/// Dropping the handle aborts the background task and closes the socket.
pub struct ControllerSession {
    commands: mpsc::UnboundedSender<Vec<u8>>,
    task: JoinHandle<()>,
}

impl ControllerSession {
    /// Spawns a session against `addr` with default timings.
    pub fn spawn(addr: SocketAddr) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        Self::spawn_with_config(addr, SessionConfig::default())
    }

    pub fn spawn_with_config(
        addr: SocketAddr,
        config: SessionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(addr, config, command_rx, event_tx));
        (
            Self {
                commands: command_tx,
                task,
            },
            event_rx,
        )
    }

    /// Queues a pre-encoded frame for transmission. Frames queued while the
    /// session is between connections are sent once it is back up.
    pub fn send_frame(&self, frame: Vec<u8>) -> Result<(), SessionError> {
        self.commands.send(frame).map_err(|_| SessionError::Closed)
    }
}

impl fmt::Debug for ControllerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerSession").finish_non_exhaustive()
    }
}

impl Drop for ControllerSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Outer connection loop: dial, drive, back off, repeat. Returns when the
/// caller is gone (command sender and event receiver both dropped).
async fn run(
    addr: SocketAddr,
    config: SessionConfig,
    mut commands: mpsc::UnboundedReceiver<Vec<u8>>,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    let mut first_attempt = true;
    loop {
        if !first_attempt {
            if events.send(SessionEvent::Reconnecting).is_err() {
                return;
            }
            sleep(config.reconnect_backoff).await;
        }
        first_attempt = false;

        let stream = match TcpStream::connect(addr).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("connect to {addr} failed: {e}");
                continue;
            }
        };
        info!("connected to controller at {addr}");
        if events.send(SessionEvent::Connected).is_err() {
            return;
        }

        match drive(stream, &config, &mut commands, &events).await {
            Ok(()) => return,
            Err(e) => warn!("session to {addr} lost: {e}"),
        }
    }
}

/// Drives one connection until it fails or the caller goes away. `Ok(())`
/// means an orderly shutdown was requested; `Err` means reconnect.
async fn drive(
    mut stream: TcpStream,
    config: &SessionConfig,
    commands: &mut mpsc::UnboundedReceiver<Vec<u8>>,
    events: &mpsc::UnboundedSender<SessionEvent>,
) -> Result<(), SessionError> {
    let (mut rd, mut wr) = stream.split();

    let mut phase = Phase::AwaitingAbility;
    send_request(&mut wr, write_ac_ability_request).await?;

    let mut deframer = Deframer::new();
    let mut last_inbound = Instant::now();
    let mut liveness = interval(config.liveness_check_interval);
    let mut buf = [0u8; 4096];

    loop {
        tokio::select! {
            read = rd.read(&mut buf) => {
                let n = read?;
                if n == 0 {
                    return Err(SessionError::ConnectionClosed);
                }
                last_inbound = Instant::now();
                deframer.extend(&buf[..n]);
                while let Some(next) = deframer.next_body() {
                    match next {
                        Ok(body) => {
                            if !process_body(&body, &mut phase, &mut wr, events).await? {
                                return Ok(());
                            }
                        }
                        Err(e) => warn!("dropping corrupt frame: {e}"),
                    }
                }
            }
            command = commands.recv() => {
                match command {
                    Some(frame) => wr.write_all(&frame).await?,
                    None => return Ok(()),
                }
            }
            _ = liveness.tick() => {
                if last_inbound.elapsed() > config.liveness_timeout {
                    return Err(SessionError::LivenessTimeout(config.liveness_timeout));
                }
            }
        }
    }
}

/// Decodes one CRC-verified body, forwards its records, and advances the
/// bootstrap. Returns `Ok(false)` when the event receiver is gone.
async fn process_body<W: AsyncWrite + Unpin>(
    body: &[u8],
    phase: &mut Phase,
    wr: &mut W,
    events: &mpsc::UnboundedSender<SessionEvent>,
) -> Result<bool, SessionError> {
    let message = match decode_body(body) {
        Ok(message) => message,
        Err(e) => {
            warn!("undecodable frame body: {e}");
            return Ok(true);
        }
    };

    match message {
        Message::AcAbility(batch) => {
            for record in batch.iter() {
                match record {
                    Ok(record) => {
                        let ability = UnitAbility::from(record);
                        if events.send(SessionEvent::UnitAbility(ability)).is_err() {
                            return Ok(false);
                        }
                    }
                    Err(e) => {
                        warn!("malformed ability record, rest of batch dropped: {e}");
                        break;
                    }
                }
            }
            if *phase == Phase::AwaitingAbility {
                send_request(wr, write_ac_status_request).await?;
                send_request(wr, write_zone_status_request).await?;
                *phase = Phase::AwaitingZoneStatus;
            }
        }
        Message::AcStatus(batch) => {
            for status in batch.iter() {
                if events.send(SessionEvent::AcStatus(status)).is_err() {
                    return Ok(false);
                }
            }
        }
        Message::ZoneStatus(batch) => {
            for status in batch.iter() {
                if events.send(SessionEvent::ZoneStatus(status)).is_err() {
                    return Ok(false);
                }
            }
            if *phase == Phase::AwaitingZoneStatus {
                send_request(wr, write_zone_name_request).await?;
                *phase = Phase::Ready;
            }
        }
        Message::ZoneNames(batch) => {
            for record in batch.iter() {
                let event = SessionEvent::ZoneName {
                    zone: record.zone,
                    name: record.name.to_owned(),
                };
                if events.send(event).is_err() {
                    return Ok(false);
                }
            }
        }
        Message::Unhandled { address, subtype } => {
            debug!(
                "ignoring message address {:02X}{:02X} subtype {subtype:#04X}",
                address[0], address[1]
            );
        }
    }
    Ok(true)
}

async fn send_request<W: AsyncWrite + Unpin>(
    wr: &mut W,
    write: fn(&mut Writer<'_>) -> Result<(), EncodeError>,
) -> Result<(), SessionError> {
    let mut buf = [0u8; REQUEST_FRAME_MAX];
    let mut w = Writer::new(&mut buf);
    write(&mut w)?;
    wr.write_all(w.as_written()).await?;
    Ok(())
}
