use linkwire::cipher::{ChaCha20Poly1305Cipher, Cipher};
use linkwire::CryptoError;

#[test]
fn authenticated_round_trip_and_tamper_detection() {
    let cipher = ChaCha20Poly1305Cipher::new([0x42u8; 32]);
    let plaintext = b"move player to (12, 7, -3)".to_vec();

    let ciphertext = cipher.encrypt(&plaintext).unwrap();
    assert_eq!(cipher.decrypt(&ciphertext).unwrap(), plaintext);

    let mut tampered = ciphertext.clone();
    let mid = tampered.len() / 2;
    tampered[mid] ^= 0xFF;
    assert_eq!(
        cipher.decrypt(&tampered).unwrap_err(),
        CryptoError::AuthenticationFailed
    );
}

#[test]
fn secure_codec_composes_packet_and_cipher() {
    use linkwire::{Packet, SecureCodec};
    use std::sync::Arc;

    let codec = SecureCodec::new(Arc::new(ChaCha20Poly1305Cipher::new([0x11u8; 32])));
    let packet = Packet::new(42, 99, b"payload".to_vec());

    let wire = codec.encode(&packet).unwrap();
    let decoded = codec.decode(&wire).expect("valid round trip");
    assert_eq!(decoded, packet);

    assert!(codec.decode(b"not a valid ciphertext").is_none());
}
