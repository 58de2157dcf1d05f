//! Connection settings snapshot applied from the host configuration surface.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use super::{Error, Result};

/// Seconds until a channel without updates is considered stale.
const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5);

/// Snapshot of the externally-owned connection settings.
///
/// The host owns the live configuration; the driver only ever sees an
/// immutable snapshot, re-applied wholesale on a settings-changed signal.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionConfig {
    /// Local address the UDP listener binds.
    pub bind_address: IpAddr,
    /// UDP data port. Zero means "not configured yet" and blocks startup.
    pub port: u16,
    /// Whether the eye branch of the deriver runs at all.
    pub eye_tracking: bool,
    /// Whether the face branch of the deriver runs at all.
    pub face_tracking: bool,
    /// Invert the X gaze axis. Applies to gaze direction only, never to
    /// eyelid or brow channels.
    pub reverse_x: bool,
    /// Invert the Y gaze axis. Same scope as `reverse_x`.
    pub reverse_y: bool,
    /// Channel freshness timeout.
    pub stale_after: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: crate::DEFAULT_PORT,
            eye_tracking: true,
            face_tracking: true,
            reverse_x: false,
            reverse_y: false,
            stale_after: DEFAULT_STALE_AFTER,
        }
    }
}

impl ConnectionConfig {
    /// Build a config from the string form the host settings surface stores.
    pub fn parse(ip: &str, port: u16) -> Result<Self> {
        let bind_address = ip
            .parse::<IpAddr>()
            .map_err(|err| Error::InvalidConfig(format!("bad IP {ip:?}: {err}")))?;
        Ok(Self {
            bind_address,
            port,
            ..Self::default()
        })
    }

    /// Resolved socket address, rejecting the unconfigured zero port.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        if self.port == 0 {
            return Err(Error::InvalidConfig("port is not set".into()));
        }
        Ok(SocketAddr::new(self.bind_address, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_shipped_settings() {
        let config = ConnectionConfig::default();
        assert_eq!(config.bind_address, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 9000);
        assert!(config.eye_tracking);
        assert!(config.face_tracking);
        assert!(!config.reverse_x);
        assert!(!config.reverse_y);
        assert_eq!(config.stale_after, Duration::from_secs(5));
    }

    #[test]
    fn parse_rejects_garbage_ip() {
        assert!(ConnectionConfig::parse("not-an-ip", 9000).is_err());
        assert!(ConnectionConfig::parse("127.0.0.1", 9000).is_ok());
    }

    #[test]
    fn zero_port_is_a_configuration_fault() {
        let config = ConnectionConfig {
            port: 0,
            ..ConnectionConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }
}
