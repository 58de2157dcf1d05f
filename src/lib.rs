//! facelink - OSC face-tracking receiver with peer discovery
//!
//! This library ingests a real-time facial/eye-tracking parameter stream sent
//! over OSC/UDP, advertises the receiver to compatible senders via a
//! pluggable discovery backend, and derives structured anatomical output
//! (gaze, eyelids, jaw, tongue, lip shapes) for a host animation system.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use facelink::transport::{DiscoveryBackend, PeerSink, ServiceAdvertisement};
//! use facelink::{ConnectionConfig, Driver};
//!
//! // Discovery is delegated to a collaborator; a no-op backend is enough
//! // when no peers need to find this receiver.
//! struct NoDiscovery;
//!
//! impl DiscoveryBackend for NoDiscovery {
//!     fn advertise(&self, _ad: &ServiceAdvertisement, _sink: PeerSink) -> facelink::Result<()> {
//!         Ok(())
//!     }
//!     fn refresh(&self) -> facelink::Result<()> {
//!         Ok(())
//!     }
//!     fn release(&self) {}
//! }
//!
//! let mut driver = Driver::new(ConnectionConfig::default(), Arc::new(NoDiscovery))?;
//! driver.update(0.016);
//! let _eyes = driver.eyes();
//! driver.teardown();
//! # Ok::<(), facelink::Error>(())
//! ```
//!
//! # Design
//!
//! - A single background thread owns the UDP socket and recovers from
//!   transport faults with a backoff-rebind loop; the host tick never waits
//!   on network I/O.
//! - The parameter store is a fixed array of per-field atomics: one writer
//!   (the receive loop), many readers, no locks on the data path.
//! - Peer discovery produces and consumes profile records only; the wire
//!   protocol lives behind [`transport::DiscoveryBackend`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

mod driver;
pub mod protocol;
pub mod tracking;
pub mod transport;

pub use driver::{DeviceInfo, Driver};
pub use protocol::{
    AddressTable, ConnectionConfig, Error, PARAMETER_COUNT, Parameter, ParameterStore, Result,
};
pub use tracking::{Deriver, EyeState, Eyes, MouthState};
pub use transport::{Broadcaster, DiscoveryService, LinkState, OscReceiver, PeerProfile};

/// Default UDP data port senders transmit on.
pub const DEFAULT_PORT: u16 = 9000;
