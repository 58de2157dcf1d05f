//! UDP receive loop with autonomous reconnect.
//!
//! One background thread owns the listen socket outright. It drains every
//! immediately-available datagram into a FIFO queue, applies decoded messages
//! to the shared [`ParameterStore`], and rebuilds the socket wholesale after a
//! transport fault. Nothing in here ever blocks the host's update tick.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rosc::{OscMessage, OscPacket, OscType};
use tracing::{debug, info, warn};

use crate::protocol::{AddressTable, EYE_PREFIX, Error, FACE_PREFIX, ParameterStore, Result};

/// Receive-loop poll granularity; also bounds cancellation latency.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Wait between socket rebind attempts after a transport fault.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

/// Bounded wait for the receive thread during teardown. If the thread does
/// not stop in time it is detached rather than hanging shutdown.
const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Reconnect state machine of the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    /// Socket not yet bound.
    Connecting = 0,
    /// Receive loop is draining the socket.
    Connected = 1,
    /// Socket lost; rebinding after backoff, or terminal after teardown.
    Disconnected = 2,
}

impl LinkState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Connected,
            _ => Self::Disconnected,
        }
    }
}

/// Background UDP receiver feeding the parameter store.
#[derive(Debug)]
pub struct OscReceiver {
    store: Arc<ParameterStore>,
    shutdown: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
    local_addr: SocketAddr,
    worker: Option<JoinHandle<()>>,
}

impl OscReceiver {
    /// Bind `addr` and start the receive loop.
    ///
    /// The store is cleared first so values from a previous connection never
    /// leak into this one. Bind failure here is the one transport fault that
    /// propagates; everything after construction recovers on its own.
    pub fn start(
        addr: SocketAddr,
        table: Arc<AddressTable>,
        store: Arc<ParameterStore>,
    ) -> Result<Self> {
        Self::start_with_backoff(addr, table, store, RECONNECT_BACKOFF)
    }

    pub(crate) fn start_with_backoff(
        addr: SocketAddr,
        table: Arc<AddressTable>,
        store: Arc<ParameterStore>,
        backoff: Duration,
    ) -> Result<Self> {
        let state = Arc::new(AtomicU8::new(LinkState::Connecting as u8));
        store.reset();

        let socket = bind_socket(addr)?;
        let local_addr = socket.local_addr()?;
        state.store(LinkState::Connected as u8, Ordering::SeqCst);
        info!(%local_addr, "osc receiver connected");

        let shutdown = Arc::new(AtomicBool::new(false));
        let worker = {
            let store = Arc::clone(&store);
            let shutdown = Arc::clone(&shutdown);
            let state = Arc::clone(&state);
            thread::Builder::new()
                .name("facelink-recv".into())
                .spawn(move || {
                    receive_loop(socket, local_addr, &table, &store, &shutdown, &state, backoff);
                })?
        };

        Ok(Self {
            store,
            shutdown,
            state,
            local_addr,
            worker: Some(worker),
        })
    }

    /// Current state of the reconnect state machine.
    #[must_use]
    pub fn state(&self) -> LinkState {
        LinkState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Address the listen socket actually bound (relevant when port 0 was
    /// requested).
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop the receive loop, drop the socket and clear the store.
    ///
    /// Idempotent; a second call is a no-op. No reconnect attempts happen
    /// after this returns.
    pub fn teardown(&mut self) {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("receiver teardown");
        if let Some(worker) = self.worker.take() {
            let deadline = Instant::now() + JOIN_TIMEOUT;
            while !worker.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }
            if worker.is_finished() {
                let _ = worker.join();
            } else {
                warn!("receive thread did not stop within {JOIN_TIMEOUT:?}, detaching");
            }
        }
        self.state
            .store(LinkState::Disconnected as u8, Ordering::SeqCst);
        self.store.reset();
        info!("receiver teardown complete");
    }

    /// Force the loop onto its reconnect path, as a real socket fault would.
    #[cfg(test)]
    pub(crate) fn force_disconnect(&self) {
        self.state
            .store(LinkState::Disconnected as u8, Ordering::SeqCst);
    }
}

impl Drop for OscReceiver {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn bind_socket(addr: SocketAddr) -> Result<UdpSocket> {
    let socket = UdpSocket::bind(addr).map_err(|source| Error::Bind { addr, source })?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}

#[allow(clippy::too_many_arguments)]
fn receive_loop(
    socket: UdpSocket,
    addr: SocketAddr,
    table: &AddressTable,
    store: &ParameterStore,
    shutdown: &AtomicBool,
    state: &AtomicU8,
    backoff: Duration,
) {
    info!("receive loop started");
    let mut socket = Some(socket);
    let mut buf = [0u8; rosc::decoder::MTU];
    let mut queue: VecDeque<OscPacket> = VecDeque::new();
    let mut last_attempt = Instant::now();

    while !shutdown.load(Ordering::SeqCst) {
        // An externally observed fault (state flipped to Disconnected) must
        // release the socket before the rebind below can succeed.
        if LinkState::from_u8(state.load(Ordering::SeqCst)) == LinkState::Disconnected
            && socket.is_some()
        {
            socket = None;
            last_attempt = Instant::now();
        }

        let Some(active) = socket.as_ref() else {
            if last_attempt.elapsed() < backoff {
                thread::sleep(POLL_INTERVAL);
                continue;
            }
            last_attempt = Instant::now();
            match bind_socket(addr) {
                Ok(rebound) => {
                    socket = Some(rebound);
                    state.store(LinkState::Connected as u8, Ordering::SeqCst);
                    info!(%addr, "socket rebound");
                }
                Err(err) => warn!(%addr, error = %err, "socket rebind failed"),
            }
            continue;
        };

        match drain_socket(active, &mut buf, &mut queue) {
            Ok(()) => {}
            Err(err) => {
                warn!(error = %err, "socket fault, scheduling reconnect");
                socket = None;
                state.store(LinkState::Disconnected as u8, Ordering::SeqCst);
                last_attempt = Instant::now();
                continue;
            }
        }

        while let Some(packet) = queue.pop_front() {
            apply_packet(&packet, table, store);
        }

        thread::sleep(POLL_INTERVAL);
    }

    state.store(LinkState::Disconnected as u8, Ordering::SeqCst);
    info!("receive loop ended");
}

/// Pull every immediately-available datagram off the socket, in arrival
/// order. Decode failures are protocol faults: logged, datagram dropped.
fn drain_socket(
    socket: &UdpSocket,
    buf: &mut [u8],
    queue: &mut VecDeque<OscPacket>,
) -> std::io::Result<()> {
    loop {
        match socket.recv_from(buf) {
            Ok((len, _peer)) => match rosc::decoder::decode_udp(&buf[..len]) {
                Ok((_rest, packet)) => queue.push_back(packet),
                Err(err) => debug!(error = %err, len, "undecodable datagram dropped"),
            },
            Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(()),
            Err(err) => return Err(err),
        }
    }
}

/// Apply one packet, unwrapping a single level of bundle nesting.
fn apply_packet(packet: &OscPacket, table: &AddressTable, store: &ParameterStore) {
    match packet {
        OscPacket::Message(message) => apply_message(message, table, store),
        OscPacket::Bundle(bundle) => {
            for inner in &bundle.content {
                match inner {
                    OscPacket::Message(message) => apply_message(message, table, store),
                    OscPacket::Bundle(_) => {
                        debug!("nested bundle dropped");
                    }
                }
            }
        }
    }
}

fn apply_message(message: &OscMessage, table: &AddressTable, store: &ParameterStore) {
    let Some(parameter) = table.index_of(&message.addr) else {
        debug!(addr = %message.addr, "unknown address dropped");
        return;
    };
    let Some(value) = first_numeric(&message.args) else {
        debug!(addr = %message.addr, "non-numeric first argument dropped");
        return;
    };
    store.set(parameter, value);
    if message.addr.starts_with(EYE_PREFIX) {
        store.mark_eye_update();
    } else if message.addr.starts_with(FACE_PREFIX) {
        store.mark_face_update();
    }
}

/// The first argument is consulted and must be float-convertible.
#[allow(clippy::cast_precision_loss)]
fn first_numeric(args: &[OscType]) -> Option<f32> {
    match args.first()? {
        OscType::Float(value) => Some(*value),
        OscType::Double(value) => Some(*value as f32),
        OscType::Int(value) => Some(*value as f32),
        OscType::Long(value) => Some(*value as f32),
        OscType::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
        _ => None,
    }
}
