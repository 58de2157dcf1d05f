//! Service advertisement and peer-profile collection.
//!
//! The actual discovery protocol (mDNS/OSCQuery) lives behind the
//! [`DiscoveryBackend`] trait; this module owns the service identity, the
//! advertised endpoint set, the deduplicated peer list, and the periodic
//! refresh worker.

use std::net::{IpAddr, Ipv4Addr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::protocol::{AddressTable, Result};

/// Required literal prefix of the service name. Compatible senders filter on
/// this exact string, so it is part of the wire contract.
pub const SERVICE_NAME_PREFIX: &str = "VRChat-Client";

/// Interval between peer-list refresh scans.
const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Granularity at which the refresh sleep observes cancellation.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Bounded wait for the refresh thread during teardown.
const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Network location of a discovered sender.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerProfile {
    /// Advertised service name.
    pub name: String,
    /// Address of the peer's control endpoint.
    pub address: IpAddr,
    /// Port of the peer's control endpoint.
    pub port: u16,
}

/// Initial value (and implied type) of an advertised control endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointValue {
    /// Float-typed endpoint.
    Float(f32),
    /// String-typed endpoint.
    Text(&'static str),
    /// Bool-typed endpoint.
    Flag(bool),
}

/// One read-write control endpoint exposed to peers.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    /// OSC address of the endpoint.
    pub path: String,
    /// Initial value peers read before any data arrives.
    pub initial: EndpointValue,
}

/// Everything a backend needs to advertise this receiver.
#[derive(Debug, Clone)]
pub struct ServiceAdvertisement {
    /// Unique service name carrying [`SERVICE_NAME_PREFIX`].
    pub service_name: String,
    /// TCP control port for the discovery protocol.
    pub tcp_port: u16,
    /// UDP port the receiver listens on for parameter data.
    pub udp_port: u16,
    /// Control endpoints mirroring the parameter table plus avatar metadata.
    pub endpoints: Vec<Endpoint>,
}

/// Handle a backend uses to report discovered services.
#[derive(Debug, Clone)]
pub struct PeerSink {
    peers: Arc<Mutex<Vec<PeerProfile>>>,
    own_port: u16,
}

impl PeerSink {
    /// Offer a discovered profile.
    ///
    /// Duplicates and the profile describing our own control endpoint are
    /// silently ignored.
    pub fn offer(&self, profile: PeerProfile) {
        if profile.port == self.own_port {
            return;
        }
        let Ok(mut peers) = self.peers.lock() else {
            return;
        };
        if peers.contains(&profile) {
            return;
        }
        info!(
            name = %profile.name,
            address = %profile.address,
            port = profile.port,
            "discovered peer"
        );
        peers.push(profile);
    }
}

/// Collaborator that speaks the actual discovery protocol.
///
/// The pipeline only produces and consumes profile records; wire-level mDNS
/// is deliberately out of scope.
pub trait DiscoveryBackend: Send + Sync {
    /// Start advertising this receiver and deliver discovered peers to
    /// `sink` until [`release`](Self::release).
    fn advertise(&self, advertisement: &ServiceAdvertisement, sink: PeerSink) -> Result<()>;

    /// Re-scan the network for compatible services.
    fn refresh(&self) -> Result<()>;

    /// Withdraw the advertisement.
    fn release(&self);
}

/// Advertises the receiver and maintains the peer-profile list.
pub struct DiscoveryService {
    peers: Arc<Mutex<Vec<PeerProfile>>>,
    service_name: String,
    control_port: u16,
    backend: Arc<dyn DiscoveryBackend>,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl DiscoveryService {
    /// Advertise the receiver and start the periodic refresh worker.
    ///
    /// Picks a fresh local TCP port for the control endpoint and registers a
    /// read-write endpoint for every parameter address, plus the avatar
    /// metadata endpoints peers expect.
    pub fn start(
        udp_port: u16,
        table: &AddressTable,
        backend: Arc<dyn DiscoveryBackend>,
    ) -> Result<Self> {
        let control_port = pick_tcp_port()?;
        let service_name = format!(
            "{SERVICE_NAME_PREFIX}-FaceLink-{}",
            Uuid::new_v4().simple()
        );
        let peers = Arc::new(Mutex::new(Vec::new()));

        let advertisement = ServiceAdvertisement {
            service_name: service_name.clone(),
            tcp_port: control_port,
            udp_port,
            endpoints: control_endpoints(table),
        };
        let sink = PeerSink {
            peers: Arc::clone(&peers),
            own_port: control_port,
        };
        backend.advertise(&advertisement, sink)?;
        info!(
            service = %service_name,
            control_port,
            udp_port,
            "discovery service advertised"
        );

        let shutdown = Arc::new(AtomicBool::new(false));
        let worker = {
            let backend = Arc::clone(&backend);
            let shutdown = Arc::clone(&shutdown);
            thread::Builder::new()
                .name("facelink-discovery".into())
                .spawn(move || refresh_loop(&*backend, &shutdown))?
        };

        Ok(Self {
            peers,
            service_name,
            control_port,
            backend,
            shutdown,
            worker: Some(worker),
        })
    }

    /// Shared peer list, also handed to the broadcaster.
    #[must_use]
    pub fn peers(&self) -> Arc<Mutex<Vec<PeerProfile>>> {
        Arc::clone(&self.peers)
    }

    /// Copy of the current peer list.
    #[must_use]
    pub fn peer_snapshot(&self) -> Vec<PeerProfile> {
        self.peers.lock().map(|peers| peers.clone()).unwrap_or_default()
    }

    /// Advertised service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Local TCP control port.
    #[must_use]
    pub fn control_port(&self) -> u16 {
        self.control_port
    }

    /// Cancel the refresh worker and withdraw the advertisement. Idempotent.
    pub fn teardown(&mut self) {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("discovery teardown");
        if let Some(worker) = self.worker.take() {
            let deadline = Instant::now() + JOIN_TIMEOUT;
            while !worker.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }
            if worker.is_finished() {
                let _ = worker.join();
            } else {
                warn!("refresh thread did not stop within {JOIN_TIMEOUT:?}, detaching");
            }
        }
        self.backend.release();
        if let Ok(mut peers) = self.peers.lock() {
            peers.clear();
        }
        info!("discovery teardown complete");
    }
}

impl Drop for DiscoveryService {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Ask the OS for a currently-free local TCP port.
///
/// The port is released again immediately; the backend re-binds it for the
/// control endpoint. The small race window matches how the sender ecosystem
/// picks its ports.
fn pick_tcp_port() -> Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    Ok(listener.local_addr()?.port())
}

/// Endpoint set peers can introspect: every parameter address as a float,
/// plus the avatar metadata quartet and the loaded flag.
fn control_endpoints(table: &AddressTable) -> Vec<Endpoint> {
    let mut endpoints: Vec<Endpoint> = table
        .addresses()
        .map(|address| Endpoint {
            path: address.to_string(),
            initial: EndpointValue::Float(0.0),
        })
        .collect();
    endpoints.push(Endpoint {
        path: "/avatar/change".into(),
        initial: EndpointValue::Text("default"),
    });
    endpoints.push(Endpoint {
        path: "/avatar/name".into(),
        initial: EndpointValue::Text("Unknown"),
    });
    endpoints.push(Endpoint {
        path: "/avatar/id".into(),
        initial: EndpointValue::Text("default"),
    });
    endpoints.push(Endpoint {
        path: "/avatar/url".into(),
        initial: EndpointValue::Text(""),
    });
    endpoints.push(Endpoint {
        path: "/avatar/loaded".into(),
        initial: EndpointValue::Flag(false),
    });
    endpoints
}

fn refresh_loop(backend: &dyn DiscoveryBackend, shutdown: &AtomicBool) {
    info!("discovery refresh loop started");
    while !shutdown.load(Ordering::SeqCst) {
        match backend.refresh() {
            Ok(()) => debug!("refreshed discovery services"),
            Err(err) => warn!(error = %err, "service refresh failed"),
        }
        let wake = Instant::now() + REFRESH_INTERVAL;
        while Instant::now() < wake {
            if shutdown.load(Ordering::SeqCst) {
                info!("discovery refresh loop ended");
                return;
            }
            thread::sleep(CANCEL_POLL);
        }
    }
    info!("discovery refresh loop ended");
}
