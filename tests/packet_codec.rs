use linkwire::Packet;

#[test]
fn packet_round_trips_through_wire_encoding() {
    let packet = Packet::new(1234, 0xdead_beef_0000_0001, b"integration test body".to_vec());
    let wire = packet.encode();
    let decoded = Packet::decode(&wire).expect("valid packet");
    assert_eq!(decoded, packet);
}

#[test]
fn wire_bytes_shorter_than_the_header_fail_to_decode() {
    let packet = Packet::new(1, 2, b"abc".to_vec());
    let wire = packet.encode();
    assert!(Packet::decode(&wire[..15]).is_none());
}
