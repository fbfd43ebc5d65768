//! Poly1305 one-time MAC, RFC 7539 §2.5.
//!
//! The accumulator is carried in five 26-bit limbs (130 bits total) rather
//! than a single wide integer, since the modulus `2^130 - 5` does not fit
//! in a `u128`. This is the same limb-splitting strategy the reference
//! 32-bit Poly1305 implementations use.

const LIMB_MASK: u64 = (1 << 26) - 1;

/// Clamp the low 16 bytes of a Poly1305 key into the multiplier `r`
/// (RFC 7539 §2.5.1): mask with `0x0ffffffc0ffffffc0ffffffc0fffffff` (LE).
fn clamp(r: &[u8; 16]) -> [u8; 16] {
    let mut r = *r;
    r[3] &= 15;
    r[7] &= 15;
    r[11] &= 15;
    r[15] &= 15;
    r[4] &= 252;
    r[8] &= 252;
    r[12] &= 252;
    r
}

fn bytes16_to_u128(bytes: &[u8]) -> u128 {
    let mut buf = [0u8; 16];
    buf[..bytes.len()].copy_from_slice(bytes);
    u128::from_le_bytes(buf)
}

fn u128_to_limbs(mut v: u128) -> [u64; 5] {
    let mut out = [0u64; 5];
    for limb in out.iter_mut() {
        *limb = (v & LIMB_MASK as u128) as u64;
        v >>= 26;
    }
    out
}

/// Split a (zero-padded, 0x01-terminated) 17-byte message block into 5
/// limbs. The 17th byte is always 0 or 1, so its contribution fits
/// entirely within limb 4's range (bits 104..129).
fn block_to_limbs(buf: &[u8; 17]) -> [u64; 5] {
    let low = u128::from_le_bytes(buf[..16].try_into().unwrap());
    let mut limbs = u128_to_limbs(low);
    limbs[4] += (buf[16] as u64) << 24;
    limbs
}

/// `h = (h + block) * r`, reduced into 5 limbs but not yet fully canonical
/// (may still exceed `2^130 - 5` by a small margin — canonicalized once at
/// the end by `reduce_final`).
fn mul_mod(h: [u64; 5], r: [u64; 5]) -> [u64; 5] {
    let mut d = [0u64; 9];
    for (i, &hi) in h.iter().enumerate() {
        for (j, &rj) in r.iter().enumerate() {
            d[i + j] += hi * rj;
        }
    }

    // 2^130 ≡ 5 (mod 2^130 - 5): fold limbs 5..8 (coefficients of
    // 2^130, 2^156, ...) back into limbs 0..3, each scaled by 5.
    for k in (5..9).rev() {
        let carry = d[k];
        d[k - 5] += carry * 5;
    }

    let mut out = [0u64; 5];
    let mut carry = 0u64;
    for i in 0..5 {
        let v = d[i] + carry;
        out[i] = v & LIMB_MASK;
        carry = v >> 26;
    }
    // Any carry out of limb 4 is again a multiple of 2^130 ≡ 5; fold it
    // back into limb 0 and repeat (bounded: each pass strictly shrinks it).
    while carry > 0 {
        let v = out[0] + carry * 5;
        out[0] = v & LIMB_MASK;
        let mut c = v >> 26;
        let mut i = 1;
        while c > 0 && i < 5 {
            let v = out[i] + c;
            out[i] = v & LIMB_MASK;
            c = v >> 26;
            i += 1;
        }
        carry = c;
    }
    out
}

/// Reduce `h` (< 2^130) to its canonical value modulo `2^130 - 5`.
///
/// `h` can exceed the modulus by at most 4 (since `2^130 = p + 5` and each
/// limb is already `< 2^26`), so a single speculative `+5` with carry
/// propagation tells us which case we're in: if it overflows out of limb 4,
/// `h >= p` and the overflowed value (with that top bit dropped) is the
/// canonical result; otherwise `h` itself already was.
fn reduce_final(h: [u64; 5]) -> [u64; 5] {
    let mut t = [0u64; 5];
    let mut carry = 5u64;
    for i in 0..5 {
        let v = h[i] + carry;
        t[i] = v & LIMB_MASK;
        carry = v >> 26;
    }
    if carry > 0 {
        t
    } else {
        h
    }
}

/// Combine the canonical 130-bit `h` with `s` (a plain 128-bit value) to
/// produce `(h + s) mod 2^128`. Only the low 128 bits of `h` participate,
/// since the result is always taken mod `2^128` regardless of `h`'s upper
/// two bits.
fn finalize_tag(h: [u64; 5], s: u128) -> [u8; 16] {
    let h_low128 = (h[0] as u128)
        | ((h[1] as u128) << 26)
        | ((h[2] as u128) << 52)
        | ((h[3] as u128) << 78)
        | (((h[4] & 0x00ff_ffff) as u128) << 104);
    h_low128.wrapping_add(s).to_le_bytes()
}

/// Compute the 16-byte Poly1305 tag over `message` with the given 32-byte
/// one-time key.
pub(crate) fn poly1305_mac(key: &[u8; 32], message: &[u8]) -> [u8; 16] {
    let mut r_bytes = [0u8; 16];
    r_bytes.copy_from_slice(&key[..16]);
    let r = u128_to_limbs(bytes16_to_u128(&clamp(&r_bytes)));
    let s = bytes16_to_u128(&key[16..32]);

    let mut h = [0u64; 5];
    for block in message.chunks(16) {
        let mut buf = [0u8; 17];
        buf[..block.len()].copy_from_slice(block);
        buf[block.len()] = 1;

        let n = block_to_limbs(&buf);
        for i in 0..5 {
            h[i] += n[i];
        }
        h = mul_mod(h, r);
    }

    finalize_tag(reduce_final(h), s)
}
