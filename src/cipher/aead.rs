//! ChaCha20-Poly1305 AEAD construction, RFC 7539 §2.8.
//!
//! Output format: `nonce(12) ‖ ciphertext ‖ tag(16)`. There is no associated
//! data in this profile — the tag covers the ciphertext alone.

use rand::RngCore;

use super::{chacha20_block, chacha20_xor, poly1305_mac, Cipher};
use crate::error::CryptoError;

const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;

pub struct ChaCha20Poly1305Cipher {
    key: [u8; 32],
}

impl ChaCha20Poly1305Cipher {
    pub fn new(key: [u8; 32]) -> Self {
        ChaCha20Poly1305Cipher { key }
    }

    fn poly1305_key(&self, nonce: &[u8; 12]) -> [u8; 32] {
        let block = chacha20_block(&self.key, 0, nonce);
        let mut key = [0u8; 32];
        key.copy_from_slice(&block[..32]);
        key
    }
}

impl Drop for ChaCha20Poly1305Cipher {
    fn drop(&mut self) {
        self.key.iter_mut().for_each(|b| *b = 0);
    }
}

/// Constant-time byte-slice comparison for the tag check.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

impl Cipher for ChaCha20Poly1305Cipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut nonce = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut nonce);

        let poly_key = self.poly1305_key(&nonce);
        let ciphertext = chacha20_xor(&self.key, 1, &nonce, plaintext)?;
        let tag = poly1305_mac(&poly_key, &ciphertext);

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len() + TAG_SIZE);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        out.extend_from_slice(&tag);
        Ok(out)
    }

    fn decrypt(&self, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if input.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::InputTooShort);
        }

        let nonce: [u8; 12] = input[..NONCE_SIZE].try_into().unwrap();
        let ciphertext = &input[NONCE_SIZE..input.len() - TAG_SIZE];
        let received_tag = &input[input.len() - TAG_SIZE..];

        let poly_key = self.poly1305_key(&nonce);
        let expected_tag = poly1305_mac(&poly_key, ciphertext);

        if !constant_time_eq(&expected_tag, received_tag) {
            return Err(CryptoError::AuthenticationFailed);
        }

        chacha20_xor(&self.key, 1, &nonce, ciphertext)
    }

    fn name(&self) -> &'static str {
        "chacha20-poly1305"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> ChaCha20Poly1305Cipher {
        ChaCha20Poly1305Cipher::new([0x5Au8; 32])
    }

    #[test]
    fn round_trip_across_sizes() {
        let c = cipher();
        for len in [0usize, 1, 63, 64, 65, 16372] {
            let msg = vec![0x11u8; len];
            let ct = c.encrypt(&msg).unwrap();
            assert_eq!(ct.len(), NONCE_SIZE + len + TAG_SIZE);
            assert_eq!(c.decrypt(&ct).unwrap(), msg);
        }
    }

    #[test]
    fn bit_flip_in_ciphertext_fails_auth() {
        let c = cipher();
        let mut ct = c.encrypt(b"authenticated message").unwrap();
        let mid = NONCE_SIZE + 3;
        ct[mid] ^= 0x01;
        assert_eq!(c.decrypt(&ct).unwrap_err(), CryptoError::AuthenticationFailed);
    }

    #[test]
    fn bit_flip_in_tag_fails_auth() {
        let c = cipher();
        let mut ct = c.encrypt(b"authenticated message").unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0x01;
        assert_eq!(c.decrypt(&ct).unwrap_err(), CryptoError::AuthenticationFailed);
    }

    #[test]
    fn truncated_input_is_rejected() {
        let c = cipher();
        assert_eq!(
            c.decrypt(&[0u8; 10]).unwrap_err(),
            CryptoError::InputTooShort
        );
    }

    #[test]
    fn distinct_nonces_give_distinct_ciphertexts() {
        let c = cipher();
        let ct1 = c.encrypt(b"same plaintext").unwrap();
        let ct2 = c.encrypt(b"same plaintext").unwrap();
        assert_ne!(ct1, ct2);
    }
}
