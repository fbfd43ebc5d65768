//! ChaCha20 block function and stream cipher, RFC 7539 §2.3/§2.4.
//!
//! A from-scratch, bit-exact port of the RFC algorithm. The little-endian
//! key/nonce/state word layout matches RFC 7539 exactly.

use super::Cipher;
use crate::bytes_ext::{key_words_le, nonce_words_le, state_to_bytes_le};
use crate::error::CryptoError;
use rand::RngCore;

const CONSTANTS: [u32; 4] = [0x61707865, 0x3320646e, 0x79622d32, 0x6b206574];

#[inline]
fn quarter_round(state: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(16);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(12);

    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(8);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(7);
}

/// Build the initial 16-word state for `(key, counter, nonce)` per RFC 7539 §2.3.
fn initial_state(key: &[u8; 32], counter: u32, nonce: &[u8; 12]) -> [u32; 16] {
    let k = key_words_le(key);
    let n = nonce_words_le(nonce);
    [
        CONSTANTS[0], CONSTANTS[1], CONSTANTS[2], CONSTANTS[3],
        k[0], k[1], k[2], k[3],
        k[4], k[5], k[6], k[7],
        counter, n[0], n[1], n[2],
    ]
}

/// The RFC 7539 §2.3 block function: 20 rounds (10 column+diagonal pairs),
/// then add the original state word-wise. Returns the 64-byte keystream block.
pub(crate) fn chacha20_block(key: &[u8; 32], counter: u32, nonce: &[u8; 12]) -> [u8; 64] {
    let original = initial_state(key, counter, nonce);
    let mut working = original;

    for _ in 0..10 {
        quarter_round(&mut working, 0, 4, 8, 12);
        quarter_round(&mut working, 1, 5, 9, 13);
        quarter_round(&mut working, 2, 6, 10, 14);
        quarter_round(&mut working, 3, 7, 11, 15);

        quarter_round(&mut working, 0, 5, 10, 15);
        quarter_round(&mut working, 1, 6, 11, 12);
        quarter_round(&mut working, 2, 7, 8, 13);
        quarter_round(&mut working, 3, 4, 9, 14);
    }

    for i in 0..16 {
        working[i] = working[i].wrapping_add(original[i]);
    }

    state_to_bytes_le(&working)
}

/// XOR `data` with the ChaCha20 keystream starting at `initial_counter`.
/// Rejects input that would wrap the 32-bit block counter: at most
/// `2^32 * 64` bytes per (key, nonce, initial_counter).
pub(crate) fn chacha20_xor(
    key: &[u8; 32],
    initial_counter: u32,
    nonce: &[u8; 12],
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let blocks_needed = (data.len() as u64 + 63) / 64;
    if (initial_counter as u64) + blocks_needed > u32::MAX as u64 + 1 {
        return Err(CryptoError::CounterOverflow);
    }

    let mut out = Vec::with_capacity(data.len());
    let mut counter = initial_counter;

    for chunk in data.chunks(64) {
        let keystream = chacha20_block(key, counter, nonce);
        for (b, k) in chunk.iter().zip(keystream.iter()) {
            out.push(b ^ k);
        }
        counter = counter.wrapping_add(1);
    }

    Ok(out)
}

/// The two operating modes: a caller-supplied fixed nonce, or a fresh
/// random nonce generated and prefixed on every `encrypt` call.
pub enum NonceMode {
    Fixed([u8; 12]),
    Auto,
}

/// 256-bit-key ChaCha20 cipher, either fixed-nonce or auto-nonce.
pub struct ChaCha20Cipher {
    key: [u8; 32],
    mode: NonceMode,
}

impl ChaCha20Cipher {
    pub fn new(key: [u8; 32], mode: NonceMode) -> Self {
        ChaCha20Cipher { key, mode }
    }

    pub fn fixed_nonce(key: [u8; 32], nonce: [u8; 12]) -> Self {
        Self::new(key, NonceMode::Fixed(nonce))
    }

    pub fn auto_nonce(key: [u8; 32]) -> Self {
        Self::new(key, NonceMode::Auto)
    }
}

impl Drop for ChaCha20Cipher {
    fn drop(&mut self) {
        self.key.iter_mut().for_each(|b| *b = 0);
    }
}

impl Cipher for ChaCha20Cipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match &self.mode {
            NonceMode::Fixed(nonce) => chacha20_xor(&self.key, 0, nonce, plaintext),
            NonceMode::Auto => {
                let mut nonce = [0u8; 12];
                rand::rngs::OsRng.fill_bytes(&mut nonce);
                let ct = chacha20_xor(&self.key, 0, &nonce, plaintext)?;
                let mut out = Vec::with_capacity(12 + ct.len());
                out.extend_from_slice(&nonce);
                out.extend_from_slice(&ct);
                Ok(out)
            }
        }
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match &self.mode {
            NonceMode::Fixed(nonce) => chacha20_xor(&self.key, 0, nonce, ciphertext),
            NonceMode::Auto => {
                if ciphertext.len() < 12 {
                    return Err(CryptoError::InputTooShort);
                }
                let mut nonce = [0u8; 12];
                nonce.copy_from_slice(&ciphertext[..12]);
                chacha20_xor(&self.key, 0, &nonce, &ciphertext[12..])
            }
        }
    }

    fn name(&self) -> &'static str {
        "chacha20"
    }
}
