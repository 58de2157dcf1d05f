//! Outbound OSC messages and the avatar-change broadcaster.
//!
//! Outbound traffic is best-effort: every send runs on a short-lived socket,
//! and failures are logged instead of surfacing to the caller.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex};

use rosc::{OscMessage, OscPacket, OscType, encoder};
use tracing::{debug, info, warn};
use xxhash_rust::xxh3::xxh3_64;

use super::discovery::PeerProfile;

/// Address used to announce avatar switches to peers.
pub const AVATAR_CHANGE_ADDRESS: &str = "/avatar/change";

/// Peer name prefix identifying compatible sender products.
pub const SENDER_NAME_PREFIX: &str = "VRCFT";

/// Fixed ports some senders bind without advertising themselves. They get
/// every announcement as a compatibility measure.
pub const FALLBACK_PORTS: [u16; 2] = [9000, 9001];

/// Send a single OSC message from a short-lived socket.
///
/// Returns whether the datagram left the socket; failures are logged and
/// swallowed.
pub fn send_message(ip: IpAddr, port: u16, path: &str, arg: OscType) -> bool {
    let packet = OscPacket::Message(OscMessage {
        addr: path.to_string(),
        args: vec![arg],
    });
    let bytes = match encoder::encode(&packet) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(path, error = %err, "failed to encode outbound message");
            return false;
        }
    };
    match try_send(ip, port, &bytes) {
        Ok(()) => {
            debug!(%ip, port, path, "sent OSC message");
            true
        }
        Err(err) => {
            warn!(%ip, port, path, error = %err, "failed to send OSC message");
            false
        }
    }
}

fn try_send(ip: IpAddr, port: u16, bytes: &[u8]) -> std::io::Result<()> {
    let local: SocketAddr = match ip {
        IpAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        IpAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(local)?;
    socket.connect((ip, port))?;
    socket.send(bytes)?;
    Ok(())
}

/// Fans `/avatar/change` out to every known sender peer plus the fixed
/// fallback ports.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    peers: Arc<Mutex<Vec<PeerProfile>>>,
    target_ip: IpAddr,
}

impl Broadcaster {
    /// Create a broadcaster over a shared peer list. `target_ip` receives the
    /// fallback-port sends.
    #[must_use]
    pub fn new(peers: Arc<Mutex<Vec<PeerProfile>>>, target_ip: IpAddr) -> Self {
        Self { peers, target_ip }
    }

    /// Announce an avatar switch to every compatible peer.
    ///
    /// Each send fails independently; the count of successful sends is
    /// returned. Zero successful sends is a warning, not an error.
    pub fn announce_avatar_change(&self, avatar_id: &str) -> usize {
        let peers: Vec<PeerProfile> = match self.peers.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => Vec::new(),
        };

        let mut sent = 0;
        for profile in peers
            .iter()
            .filter(|profile| profile.name.starts_with(SENDER_NAME_PREFIX))
        {
            if send_message(
                profile.address,
                profile.port,
                AVATAR_CHANGE_ADDRESS,
                OscType::String(avatar_id.to_string()),
            ) {
                sent += 1;
            }
        }
        for port in FALLBACK_PORTS {
            if send_message(
                self.target_ip,
                port,
                AVATAR_CHANGE_ADDRESS,
                OscType::String(avatar_id.to_string()),
            ) {
                sent += 1;
            }
        }

        if sent == 0 {
            warn!(avatar_id, "avatar change reached no peers");
        } else {
            info!(avatar_id, sent, "announced avatar change");
        }
        sent
    }
}

/// Fabricate a peer-compatible avatar identifier from a display name.
///
/// Interop shim: the sender ecosystem expects `avtr_`-style identifiers, but
/// the host only hands us a display name. The hash is non-cryptographic and
/// collisions are tolerated; never treat this as a stable identity.
#[must_use]
pub fn avatar_id_from_name(name: &str) -> String {
    format!("avtr_{:016x}", xxh3_64(name.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn avatar_id_is_deterministic_and_prefixed() {
        let a = avatar_id_from_name("Resonite User");
        let b = avatar_id_from_name("Resonite User");
        assert_eq!(a, b);
        assert!(a.starts_with("avtr_"));
        assert_ne!(a, avatar_id_from_name("someone else"));
    }

    #[test]
    fn announce_hits_matching_peer_and_fallback_ports() {
        let listener = UdpSocket::bind("127.0.0.1:0").unwrap();
        listener
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let peer_port = listener.local_addr().unwrap().port();

        let peers = Arc::new(Mutex::new(vec![
            PeerProfile {
                name: "VRCFT-test".into(),
                address: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: peer_port,
            },
            PeerProfile {
                name: "SomeOtherApp".into(),
                address: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: peer_port,
            },
        ]));
        let broadcaster = Broadcaster::new(peers, IpAddr::V4(Ipv4Addr::LOCALHOST));

        let sent = broadcaster.announce_avatar_change("avtr_x");
        assert!(sent >= 1);

        // Exactly one datagram lands on the advertised peer port: the
        // non-matching profile is filtered by name prefix.
        let mut buf = [0u8; rosc::decoder::MTU];
        let (len, _) = listener.recv_from(&mut buf).unwrap();
        let (_, packet) = rosc::decoder::decode_udp(&buf[..len]).unwrap();
        match packet {
            OscPacket::Message(message) => {
                assert_eq!(message.addr, AVATAR_CHANGE_ADDRESS);
                assert_eq!(message.args, vec![OscType::String("avtr_x".into())]);
            }
            OscPacket::Bundle(_) => panic!("expected a plain message"),
        }

        listener
            .set_read_timeout(Some(Duration::from_millis(100)))
            .unwrap();
        let start = Instant::now();
        assert!(
            listener.recv_from(&mut buf).is_err(),
            "only one message expected on the peer port"
        );
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn zero_peers_reports_send_count_from_fallbacks_only() {
        let peers = Arc::new(Mutex::new(Vec::new()));
        let broadcaster = Broadcaster::new(peers, IpAddr::V4(Ipv4Addr::LOCALHOST));
        // Fallback sends are best-effort; the count never exceeds the two
        // well-known ports when the peer list is empty.
        assert!(broadcaster.announce_avatar_change("avtr_y") <= FALLBACK_PORTS.len());
    }
}
