//! The pluggable cipher stack.

mod aead;
mod chacha20;
mod null;
mod poly1305;
mod rc4;
mod xor;

pub use aead::ChaCha20Poly1305Cipher;
pub use chacha20::{ChaCha20Cipher, NonceMode};
pub use null::NullCipher;
pub use rc4::Rc4Cipher;
pub use xor::XorCipher;

pub(crate) use chacha20::{chacha20_block, chacha20_xor};
pub(crate) use poly1305::poly1305_mac;

use crate::error::CryptoError;

/// Symmetric encrypt/decrypt over whole application messages.
///
/// Each implementation owns its key material on the heap and is responsible
/// for zeroing it on drop.
pub trait Cipher: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>;
    fn name(&self) -> &'static str;
}
