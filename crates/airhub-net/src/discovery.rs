//! UDP broadcast discovery of controllers on the local network.
//!
//! The driver broadcasts a fixed probe string and collects replies for a
//! short window. Each reply is a comma-separated record:
//! `ip,console id,device type,controller id,device name`. The controller
//! also hears its own probe echoed back, so the probe string itself is
//! filtered out, and anything that does not parse is dropped silently.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str;
use std::time::Duration;

use log::{debug, warn};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};

/// UDP port the discovery exchange uses, both directions.
pub const DISCOVERY_PORT: u16 = 49005;
/// How long replies are collected after the probe.
pub const DISCOVERY_WINDOW: Duration = Duration::from_secs(5);
/// The probe payload controllers answer to.
pub const DISCOVERY_REQUEST: &[u8] = b"::DISCOVER-CLIMATE-HUB::";

/// One controller that answered the probe.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscoveredController {
    pub addr: IpAddr,
    pub console_id: String,
    pub controller_id: String,
    pub name: String,
}

/// Broadcasts a probe on the local network and streams replies for
/// [`DISCOVERY_WINDOW`]. The channel closes when the window ends.
pub async fn discover() -> std::io::Result<mpsc::UnboundedReceiver<DiscoveredController>> {
    discover_on(
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, DISCOVERY_PORT)),
        SocketAddr::from((Ipv4Addr::BROADCAST, DISCOVERY_PORT)),
        DISCOVERY_WINDOW,
    )
    .await
}

/// Discovery with explicit bind address, probe target, and window. Exists
/// so tests can run the exchange over loopback.
pub async fn discover_on(
    bind: SocketAddr,
    target: SocketAddr,
    window: Duration,
) -> std::io::Result<mpsc::UnboundedReceiver<DiscoveredController>> {
    let socket = UdpSocket::bind(bind).await?;
    socket.set_broadcast(true)?;
    socket.send_to(DISCOVERY_REQUEST, target).await?;

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let deadline = Instant::now() + window;
        let mut buf = [0u8; 512];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return;
            }
            match timeout(remaining, socket.recv_from(&mut buf)).await {
                Err(_) => return,
                Ok(Err(e)) => {
                    warn!("discovery receive failed: {e}");
                    return;
                }
                Ok(Ok((n, from))) => {
                    if let Some(found) = parse_reply(&buf[..n]) {
                        debug!("controller {} answered from {from}", found.controller_id);
                        if tx.send(found).is_err() {
                            return;
                        }
                    }
                }
            }
        }
    });
    Ok(rx)
}

/// Parses one reply datagram. `None` for our own echoed probe and for
/// anything malformed.
fn parse_reply(reply: &[u8]) -> Option<DiscoveredController> {
    if reply == DISCOVERY_REQUEST {
        return None;
    }
    let text = str::from_utf8(reply).ok()?;
    let mut fields = text.trim_end_matches(['\0', '\r', '\n']).split(',');
    let addr = fields.next()?.trim().parse().ok()?;
    let console_id = fields.next()?.trim().to_owned();
    let _device_type = fields.next()?;
    let controller_id = fields.next()?.trim().to_owned();
    let name = fields.next()?.trim().to_owned();
    Some(DiscoveredController {
        addr,
        console_id,
        controller_id,
        name,
    })
}
