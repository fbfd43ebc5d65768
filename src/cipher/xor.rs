use super::Cipher;
use crate::error::CryptoError;

/// Repeating-key XOR. Obfuscation only, not a real cipher.
pub struct XorCipher {
    key: Vec<u8>,
}

impl XorCipher {
    pub fn new(key: Vec<u8>) -> Result<Self, CryptoError> {
        if key.is_empty() {
            return Err(CryptoError::InvalidKeyLength);
        }
        Ok(XorCipher { key })
    }

    fn apply(&self, input: &[u8]) -> Vec<u8> {
        input
            .iter()
            .enumerate()
            .map(|(i, b)| b ^ self.key[i % self.key.len()])
            .collect()
    }
}

impl Drop for XorCipher {
    fn drop(&mut self) {
        self.key.iter_mut().for_each(|b| *b = 0);
    }
}

impl Cipher for XorCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(self.apply(plaintext))
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(self.apply(ciphertext))
    }

    fn name(&self) -> &'static str {
        "xor"
    }
}
