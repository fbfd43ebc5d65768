use super::Cipher;
use crate::error::CryptoError;

/// Identity cipher. Used when application-layer encryption is not wanted
/// (e.g. transport is already TLS-protected).
pub struct NullCipher;

impl Cipher for NullCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(plaintext.to_vec())
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(ciphertext.to_vec())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_any_input() {
        let cipher = NullCipher;
        for len in [0usize, 1, 16384] {
            let msg = vec![0xAB; len];
            let ct = cipher.encrypt(&msg).unwrap();
            assert_eq!(cipher.decrypt(&ct).unwrap(), msg);
        }
    }
}
