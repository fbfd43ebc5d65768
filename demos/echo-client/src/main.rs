//! Minimal demonstration: spin up a loopback echo server, connect a
//! `linkwire::Client` to it, send a message, and print back what the
//! server echoed.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use linkwire::{Client, Event};

fn spawn_echo_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
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

fn main() {
    env_logger::init();

    let port = spawn_echo_server();
    let client = Client::new("echo-demo").expect("non-empty tag");

    client.connect("127.0.0.1", port).expect("non-empty host");
    while !client.connected() {
        thread::sleep(Duration::from_millis(10));
    }
    println!("connected as {}", client.ctag());

    client.send(b"hello, linkwire");

    let reply = loop {
        if let Some(Event::Data { bytes, .. }) = client.try_next_event() {
            break bytes.as_slice().to_vec();
        }
        thread::sleep(Duration::from_millis(10));
    };
    println!("echoed back: {}", String::from_utf8_lossy(&reply));

    client.disconnect();
}
