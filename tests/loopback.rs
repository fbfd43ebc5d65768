//! End-to-end "connect → send → disconnect" over a real loopback socket.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

use linkwire::{Client, Event};

fn spawn_echo_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut len_buf = [0u8; 4];
            while stream.read_exact(&mut len_buf).is_ok() {
                let len = u32::from_be_bytes(len_buf) as usize;
                let mut body = vec![0u8; len];
                if stream.read_exact(&mut body).is_err() {
                    break;
                }
                let _ = stream.write_all(&len_buf);
                let _ = stream.write_all(&body);
            }
        }
    });
    port
}

fn wait_for<F: Fn() -> bool>(timeout: Duration, cond: F) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn connect_send_receive_disconnect() {
    let port = spawn_echo_server();
    let client = Client::new("loopback-test").unwrap();

    client.connect("127.0.0.1", port).unwrap();
    assert!(wait_for(Duration::from_secs(2), || client.connected()));

    let mut saw_connected = false;
    while let Some(event) = client.try_next_event() {
        if matches!(event, Event::Connected { .. }) {
            saw_connected = true;
        }
    }
    assert!(saw_connected, "expected a Connected event before any Data");

    assert!(client.send(b"ping"));

    let mut echoed = None;
    wait_for(Duration::from_secs(2), || {
        if let Some(Event::Data { bytes, .. }) = client.try_next_event() {
            echoed = Some(bytes.as_slice().to_vec());
            true
        } else {
            false
        }
    });
    assert_eq!(echoed.as_deref(), Some(&b"ping"[..]));

    client.disconnect();
    assert!(!client.connected());

    let mut saw_disconnected = false;
    while let Some(event) = client.try_next_event() {
        if matches!(event, Event::Disconnected { .. }) {
            saw_disconnected = true;
        }
    }
    assert!(saw_disconnected, "expected a Disconnected event after disconnect()");
}

#[test]
fn second_connect_while_connecting_is_a_no_op() {
    let port = spawn_echo_server();
    let client = Client::new("double-connect").unwrap();

    client.connect("127.0.0.1", port).unwrap();
    client.connect("127.0.0.1", port).unwrap(); // should just log and return

    assert!(wait_for(Duration::from_secs(2), || client.connected()));
    client.disconnect();
}
