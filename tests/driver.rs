//! End-to-end scenarios through the public driver surface.

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use facelink::transport::{DiscoveryBackend, LinkState, PeerSink, ServiceAdvertisement};
use facelink::{ConnectionConfig, Driver, PARAMETER_COUNT, Parameter, Result};
use rosc::{OscMessage, OscPacket, OscType, encoder};

#[derive(Default)]
struct MockBackend {
    advertised: Mutex<Option<ServiceAdvertisement>>,
    sink: Mutex<Option<PeerSink>>,
    released: AtomicBool,
    refreshes: AtomicUsize,
}

impl DiscoveryBackend for MockBackend {
    fn advertise(&self, advertisement: &ServiceAdvertisement, sink: PeerSink) -> Result<()> {
        *self.advertised.lock().unwrap() = Some(advertisement.clone());
        *self.sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn refresh(&self) -> Result<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

fn config_on_port(port: u16) -> ConnectionConfig {
    ConnectionConfig {
        port,
        ..ConnectionConfig::default()
    }
}

fn send_float(port: u16, address: &str, value: f32) {
    let packet = OscPacket::Message(OscMessage {
        addr: address.to_string(),
        args: vec![OscType::Float(value)],
    });
    let bytes = encoder::encode(&packet).unwrap();
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    let target: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
    socket.send_to(&bytes, target).unwrap();
}

fn wait_for<F: FnMut() -> bool>(mut condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn packet_flows_through_to_active_eye_output() {
    let port = 19421;
    let backend = Arc::new(MockBackend::default());
    let mut driver = Driver::new(config_on_port(port), backend).unwrap();
    assert_eq!(driver.link_state(), Some(LinkState::Connected));

    send_float(port, Parameter::EyeLeftX.address(), 0.5);
    assert!(wait_for(|| {
        driver.update(0.016);
        driver.eyes().is_eye_tracking_active
    }));
    assert!(driver.eyes().left.is_tracking);

    driver.teardown();
    driver.teardown();
    assert_eq!(driver.link_state(), None);
}

#[test]
fn disabled_eye_tracking_still_ingests_but_reports_inactive() {
    let port = 19422;
    let backend = Arc::new(MockBackend::default());
    let config = ConnectionConfig {
        eye_tracking: false,
        ..config_on_port(port)
    };
    let mut driver = Driver::new(config, backend).unwrap();

    send_float(port, Parameter::EyeOpenLeft.address(), 0.9);
    // Face channel untouched, eye branch disabled: output stays inactive
    // even once the packet has landed in the store.
    thread::sleep(Duration::from_millis(100));
    driver.update(0.016);
    assert!(!driver.eyes().is_eye_tracking_active);
    assert!(!driver.mouth().is_tracking);

    driver.teardown();
}

#[test]
fn invalid_settings_defer_startup_until_corrected() {
    let backend = Arc::new(MockBackend::default());
    let mut driver = Driver::new(config_on_port(0), backend).unwrap();
    assert_eq!(driver.link_state(), None);
    assert_eq!(driver.announce_avatar_change("avtr_x"), 0);

    driver.apply_settings(config_on_port(19423));
    assert_eq!(driver.link_state(), Some(LinkState::Connected));

    driver.teardown();
    assert_eq!(driver.link_state(), None);
}

#[test]
fn discovery_advertises_the_full_endpoint_set() {
    let port = 19424;
    let backend = Arc::new(MockBackend::default());
    let backend_dyn: Arc<dyn DiscoveryBackend> = backend.clone();
    let mut driver = Driver::new(config_on_port(port), backend_dyn).unwrap();

    let advertisement = backend.advertised.lock().unwrap().clone().unwrap();
    assert_eq!(advertisement.udp_port, port);
    assert!(advertisement.service_name.starts_with("VRChat-Client-"));
    assert_eq!(advertisement.endpoints.len(), PARAMETER_COUNT + 5);

    driver.teardown();
    assert!(backend.released.load(Ordering::SeqCst));
}

#[test]
fn settings_change_rebuilds_the_receiver_on_the_new_port() {
    let backend = Arc::new(MockBackend::default());
    let mut driver = Driver::new(config_on_port(19425), backend).unwrap();

    driver.apply_settings(config_on_port(19426));
    assert_eq!(driver.link_state(), Some(LinkState::Connected));

    send_float(19426, Parameter::MouthSmileLeft.address(), 0.6);
    assert!(wait_for(|| {
        driver.update(0.016);
        driver.mouth().is_tracking
    }));
    assert!((driver.mouth().mouth_left_smile_frown - 0.6).abs() < 1e-6);

    driver.teardown();
}

#[test]
fn device_infos_cover_eye_and_lip_devices() {
    let infos = Driver::device_infos();
    assert_eq!(infos.len(), 2);
    assert_eq!(infos[0].kind, "Eye Tracking");
    assert_eq!(infos[1].kind, "Lip Tracking");
    assert_eq!(infos[0].name, infos[1].name);
}
