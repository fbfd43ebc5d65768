//! Application packet codec.
//!
//! `[len: u32 BE][command: u32 BE][token: u64 BE][body]`, `len = 12 + |body|`.
//! Hand-specified wire format, read off raw bytes with `byteorder`-style
//! helpers rather than a `serde`/`bincode` blob.

use bytes::{BufMut, BytesMut};

use crate::bytes_ext::{read_u32_be, read_u64_be};
use crate::framing::LENGTH_PREFIX_SIZE;

pub const HEADER_SIZE: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub command: u32,
    pub token: u64,
    pub body: Vec<u8>,
}

impl Packet {
    pub fn new(command: u32, token: u64, body: Vec<u8>) -> Self {
        Packet { command, token, body }
    }

    /// `be32(12 + |body|) ‖ be32(command) ‖ be64(token) ‖ body`.
    ///
    /// The outer length duplicates the frame's own length prefix; it exists
    /// for wire symmetry with legacy peers, and decoders must not require
    /// it to match the frame length.
    pub fn encode(&self) -> BytesMut {
        let mut out = BytesMut::with_capacity(HEADER_SIZE + self.body.len());
        out.put_u32((HEADER_SIZE + self.body.len()) as u32);
        out.put_u32(self.command);
        out.put_u64(self.token);
        out.put_slice(&self.body);
        out
    }

    /// Decode a packet from its wire encoding, including the (redundant)
    /// outer length field at `[0..4)`. The length value is never checked
    /// against anything; only the total byte count must be enough to hold
    /// `command`, `token`, and a (possibly empty) body.
    pub fn decode(buf: &[u8]) -> Option<Packet> {
        if buf.len() < LENGTH_PREFIX_SIZE + HEADER_SIZE {
            return None;
        }
        let command = read_u32_be(&buf[4..8]);
        let token = read_u64_be(&buf[8..16]);
        let body = buf[16..].to_vec();
        Some(Packet { command, token, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_empty_body_matches_reference_wire_bytes() {
        let pkt = Packet::new(0x01020304, 0x0102030405060708, vec![]);
        let encoded = pkt.encode();
        let expected: [u8; 16] = [
            0x00, 0x00, 0x00, 0x0C, 0x01, 0x02, 0x03, 0x04, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06,
            0x07, 0x08,
        ];
        assert_eq!(&encoded[..], &expected[..]);
    }

    #[test]
    fn decode_reverses_encode() {
        let pkt = Packet::new(0x01020304, 0x0102030405060708, vec![]);
        let encoded = pkt.encode();
        let decoded = Packet::decode(&encoded).unwrap();
        assert_eq!(decoded.command, pkt.command);
        assert_eq!(decoded.token, pkt.token);
        assert_eq!(decoded.body, pkt.body);
    }

    #[test]
    fn round_trip_with_body() {
        let body = b"hello world".to_vec();
        let pkt = Packet::new(7, 99, body.clone());
        let encoded = pkt.encode();
        let decoded = Packet::decode(&encoded).unwrap();
        assert_eq!(decoded, Packet::new(7, 99, body));
    }

    #[test]
    fn decode_rejects_short_input() {
        assert!(Packet::decode(&[0u8; 15]).is_none());
    }

    #[test]
    fn decode_tolerates_mismatched_outer_length() {
        let mut encoded = Packet::new(1, 2, vec![9, 9]).encode();
        // Corrupt the outer length field; decoders must not require it to
        // match the frame length.
        encoded[3] = 0xFF;
        let decoded = Packet::decode(&encoded).unwrap();
        assert_eq!(decoded.command, 1);
        assert_eq!(decoded.token, 2);
        assert_eq!(decoded.body, vec![9, 9]);
    }
}
