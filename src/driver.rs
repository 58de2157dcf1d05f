//! Host-facing driver facade.
//!
//! Ties receiver, discovery, broadcaster and deriver together behind the
//! lifecycle the host expects: construct once, `update` every frame, rebuild
//! on settings change, tear down on shutdown.

use std::sync::Arc;

use tracing::{info, warn};

use crate::protocol::{AddressTable, ConnectionConfig, ParameterStore, Result};
use crate::tracking::{Deriver, Eyes, MouthState};
use crate::transport::{Broadcaster, DiscoveryBackend, DiscoveryService, LinkState, OscReceiver};

/// Name both logical devices report to the host.
const DEVICE_NAME: &str = "VRCFaceTracking OSC";

/// Metadata describing one logical tracking device exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Human-readable device name.
    pub name: &'static str,
    /// Device category the host groups by.
    pub kind: &'static str,
    /// Model string.
    pub model: &'static str,
}

/// Face-tracking input driver.
///
/// The per-frame [`update`](Self::update) call never waits on network I/O;
/// ingestion happens on background workers owned by this driver.
pub struct Driver {
    config: ConnectionConfig,
    table: Arc<AddressTable>,
    store: Arc<ParameterStore>,
    backend: Arc<dyn DiscoveryBackend>,
    receiver: Option<OscReceiver>,
    discovery: Option<DiscoveryService>,
    broadcaster: Option<Broadcaster>,
    deriver: Deriver,
}

impl Driver {
    /// Construct the driver and start ingestion with the provided settings.
    ///
    /// A transport failure here (such as the UDP bind failing) is the one
    /// error that propagates; the registrar decides what to do with a driver
    /// that could not start at all. Invalid settings are only a warning:
    /// ingestion stays down until a corrected snapshot arrives.
    pub fn new(config: ConnectionConfig, backend: Arc<dyn DiscoveryBackend>) -> Result<Self> {
        let mut driver = Self {
            config,
            table: Arc::new(AddressTable::new()),
            store: Arc::new(ParameterStore::new()),
            backend,
            receiver: None,
            discovery: None,
            broadcaster: None,
            deriver: Deriver::new(),
        };
        match driver.config.socket_addr() {
            Ok(_) => driver.start_connection()?,
            Err(err) => {
                warn!(error = %err, "connection not started, settings are invalid");
            }
        }
        Ok(driver)
    }

    /// Device records the host registers for this driver.
    #[must_use]
    pub fn device_infos() -> [DeviceInfo; 2] {
        [
            DeviceInfo {
                name: DEVICE_NAME,
                kind: "Eye Tracking",
                model: DEVICE_NAME,
            },
            DeviceInfo {
                name: DEVICE_NAME,
                kind: "Lip Tracking",
                model: DEVICE_NAME,
            },
        ]
    }

    /// Apply a new settings snapshot: tear down and rebuild both workers so
    /// the socket and advertisement match the new values.
    pub fn apply_settings(&mut self, config: ConnectionConfig) {
        info!(?config, "applying settings");
        self.teardown_connection();
        self.config = config;
        match self.config.socket_addr() {
            Ok(_) => {
                if let Err(err) = self.start_connection() {
                    warn!(error = %err, "connection not started after settings change");
                }
            }
            Err(err) => {
                warn!(error = %err, "connection not started, settings are invalid");
            }
        }
    }

    /// Per-tick update on the host's calling thread.
    pub fn update(&mut self, delta: f32) {
        self.deriver.update(&self.store, &self.config, delta);
    }

    /// Latest derived eye output.
    #[must_use]
    pub fn eyes(&self) -> &Eyes {
        self.deriver.eyes()
    }

    /// Latest derived mouth output.
    #[must_use]
    pub fn mouth(&self) -> &MouthState {
        self.deriver.mouth()
    }

    /// Current settings snapshot.
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Reconnect state of the receiver, if one is running.
    #[must_use]
    pub fn link_state(&self) -> Option<LinkState> {
        self.receiver.as_ref().map(OscReceiver::state)
    }

    /// Announce an avatar switch to every known peer. Returns the number of
    /// successful sends; zero with no active connection.
    pub fn announce_avatar_change(&self, avatar_id: &str) -> usize {
        match &self.broadcaster {
            Some(broadcaster) => broadcaster.announce_avatar_change(avatar_id),
            None => {
                warn!("no active connection, avatar change dropped");
                0
            }
        }
    }

    /// Stop all background work and clear the parameter store. Idempotent.
    pub fn teardown(&mut self) {
        info!("driver teardown");
        self.teardown_connection();
    }

    fn start_connection(&mut self) -> Result<()> {
        let addr = self.config.socket_addr()?;
        let receiver = OscReceiver::start(addr, Arc::clone(&self.table), Arc::clone(&self.store))?;
        let discovery = DiscoveryService::start(
            receiver.local_addr().port(),
            &self.table,
            Arc::clone(&self.backend),
        )?;
        self.broadcaster = Some(Broadcaster::new(discovery.peers(), self.config.bind_address));
        self.receiver = Some(receiver);
        self.discovery = Some(discovery);
        Ok(())
    }

    fn teardown_connection(&mut self) {
        if let Some(mut receiver) = self.receiver.take() {
            receiver.teardown();
        }
        if let Some(mut discovery) = self.discovery.take() {
            discovery.teardown();
        }
        self.broadcaster = None;
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.teardown();
    }
}
