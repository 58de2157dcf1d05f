//! Ingestion pipeline scenarios at the receiver/store level.

use std::net::UdpSocket;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use facelink::{AddressTable, OscReceiver, Parameter, ParameterStore};
use rosc::{OscMessage, OscPacket, OscType, encoder};

fn start() -> (OscReceiver, Arc<ParameterStore>) {
    let table = Arc::new(AddressTable::new());
    let store = Arc::new(ParameterStore::new());
    let receiver = OscReceiver::start(
        "127.0.0.1:0".parse().unwrap(),
        table,
        Arc::clone(&store),
    )
    .expect("bind an ephemeral UDP port");
    (receiver, store)
}

fn send(receiver: &OscReceiver, address: &str, args: Vec<OscType>) {
    let packet = OscPacket::Message(OscMessage {
        addr: address.to_string(),
        args,
    });
    let bytes = encoder::encode(&packet).unwrap();
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.send_to(&bytes, receiver.local_addr()).unwrap();
}

fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
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
fn eye_parameter_lands_in_store_and_refreshes_the_eye_channel() {
    let (mut receiver, store) = start();

    send(
        &receiver,
        "/avatar/parameters/v2/EyeLeftX",
        vec![OscType::Float(0.5)],
    );
    assert!(wait_for(|| store.get(Parameter::EyeLeftX) == 0.5));
    assert!(store.is_eye_fresh(Instant::now(), Duration::from_secs(5)));

    receiver.teardown();
}

#[test]
fn non_numeric_first_argument_is_dropped() {
    let (mut receiver, store) = start();

    send(
        &receiver,
        Parameter::JawOpen.address(),
        vec![OscType::String("not a number".into())],
    );
    send(&receiver, Parameter::JawOpen.address(), vec![OscType::Float(0.4)]);
    assert!(wait_for(|| store.get(Parameter::JawOpen) == 0.4));

    receiver.teardown();
}

#[test]
fn only_the_first_argument_is_consulted() {
    let (mut receiver, store) = start();

    send(
        &receiver,
        Parameter::TongueOut.address(),
        vec![OscType::Float(0.2), OscType::Float(0.9)],
    );
    assert!(wait_for(|| store.get(Parameter::TongueOut) == 0.2));

    receiver.teardown();
}
