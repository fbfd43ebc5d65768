use super::Cipher;
use crate::error::CryptoError;

/// Standard RC4 (KSA + PRGA). Legacy, kept for interop with old peers only.
pub struct Rc4Cipher {
    key: Vec<u8>,
}

impl Rc4Cipher {
    pub fn new(key: Vec<u8>) -> Result<Self, CryptoError> {
        if key.is_empty() || key.len() > 256 {
            return Err(CryptoError::InvalidKeyLength);
        }
        Ok(Rc4Cipher { key })
    }

    fn apply(&self, input: &[u8]) -> Vec<u8> {
        let mut s: [u8; 256] = core::array::from_fn(|i| i as u8);
        let mut j: u8 = 0;
        for i in 0..256usize {
            j = j
                .wrapping_add(s[i])
                .wrapping_add(self.key[i % self.key.len()]);
            s.swap(i, j as usize);
        }

        let mut out = Vec::with_capacity(input.len());
        let (mut i, mut j) = (0u8, 0u8);
        for &byte in input {
            i = i.wrapping_add(1);
            j = j.wrapping_add(s[i as usize]);
            s.swap(i as usize, j as usize);
            let k = s[(s[i as usize].wrapping_add(s[j as usize])) as usize];
            out.push(byte ^ k);
        }
        out
    }
}

impl Drop for Rc4Cipher {
    fn drop(&mut self) {
        self.key.iter_mut().for_each(|b| *b = 0);
    }
}

impl Cipher for Rc4Cipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(self.apply(plaintext))
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(self.apply(ciphertext))
    }

    fn name(&self) -> &'static str {
        "rc4"
    }
}
