//! Sockets and background workers: UDP ingestion, outbound sends, discovery.

mod discovery;
mod receiver;
mod sender;

pub use discovery::{
    DiscoveryBackend, DiscoveryService, Endpoint, EndpointValue, PeerProfile, PeerSink,
    SERVICE_NAME_PREFIX, ServiceAdvertisement,
};
pub use receiver::{LinkState, OscReceiver};
pub use sender::{
    AVATAR_CHANGE_ADDRESS, Broadcaster, FALLBACK_PORTS, SENDER_NAME_PREFIX, avatar_id_from_name,
    send_message,
};
