//! Secure codec wrapper: composes the application packet codec with a
//! `Cipher`.
//!
//! The codec never sees key material directly, and a decode failure —
//! whether a bad authentication tag or a malformed packet — is reported as
//! a plain `None`, never propagated as a panic or an error that would tear
//! down the connection.

use std::sync::Arc;

use log::warn;

use crate::cipher::Cipher;
use crate::packet::Packet;

pub struct SecureCodec {
    cipher: Arc<dyn Cipher>,
}

impl SecureCodec {
    pub fn new(cipher: Arc<dyn Cipher>) -> Self {
        SecureCodec { cipher }
    }

    /// `cipher.encrypt(packet.encode())`.
    pub fn encode(&self, packet: &Packet) -> Result<Vec<u8>, crate::error::CryptoError> {
        self.cipher.encrypt(&packet.encode())
    }

    /// Try to decrypt then decode. Any authentication or decode failure is
    /// logged and reported as `None`; it never tears down the connection.
    pub fn decode(&self, input: &[u8]) -> Option<Packet> {
        match self.cipher.decrypt(input) {
            Ok(plain) => match Packet::decode(&plain) {
                Some(packet) => Some(packet),
                None => {
                    warn!("secure codec: decrypted payload was not a valid packet, dropping");
                    None
                }
            },
            Err(e) => {
                warn!("secure codec: decrypt failed ({e}), dropping message");
                None
            }
        }
    }
}
