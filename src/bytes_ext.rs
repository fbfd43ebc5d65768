//! Big- and little-endian integer pack/unpack helpers.
//!
//! The wire formats in this crate (frame length, application packet header,
//! ChaCha20 key/nonce/counter words) mix endianness by spec, so these are
//! thin wrappers over `byteorder` rather than a single blanket codec.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

#[inline]
pub fn read_u32_be(buf: &[u8]) -> u32 {
    BigEndian::read_u32(buf)
}

#[inline]
pub fn write_u32_be(buf: &mut [u8], value: u32) {
    BigEndian::write_u32(buf, value)
}

#[inline]
pub fn read_u64_be(buf: &[u8]) -> u64 {
    BigEndian::read_u64(buf)
}

#[inline]
pub fn write_u64_be(buf: &mut [u8], value: u64) {
    BigEndian::write_u64(buf, value)
}

/// Decode a 32-byte key into 8 little-endian words, per RFC 7539 §2.3.
#[inline]
pub fn key_words_le(key: &[u8; 32]) -> [u32; 8] {
    let mut words = [0u32; 8];
    LittleEndian::read_u32_into(key, &mut words);
    words
}

/// Decode a 12-byte nonce into 3 little-endian words, per RFC 7539 §2.3.
#[inline]
pub fn nonce_words_le(nonce: &[u8; 12]) -> [u32; 3] {
    let mut words = [0u32; 3];
    LittleEndian::read_u32_into(nonce, &mut words);
    words
}

/// Serialize 16 state words into a 64-byte keystream block, little-endian.
#[inline]
pub fn state_to_bytes_le(state: &[u32; 16]) -> [u8; 64] {
    let mut out = [0u8; 64];
    LittleEndian::write_u32_into(state, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn be32_roundtrip() {
        let mut buf = [0u8; 4];
        write_u32_be(&mut buf, 0x01020304);
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(read_u32_be(&buf), 0x01020304);
    }

    #[test]
    fn be64_roundtrip() {
        let mut buf = [0u8; 8];
        write_u64_be(&mut buf, 0x0102030405060708);
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(read_u64_be(&buf), 0x0102030405060708);
    }

    #[test]
    fn key_words_match_rfc_layout() {
        let mut key = [0u8; 32];
        for (i, b) in key.iter_mut().enumerate() {
            *b = i as u8;
        }
        let words = key_words_le(&key);
        assert_eq!(words[0], 0x03020100);
        assert_eq!(words[7], 0x1f1e1d1c);
    }
}
