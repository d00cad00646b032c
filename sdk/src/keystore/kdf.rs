//! # Keystore Key Derivation
//!
//! Stretches a password into the 32-byte key the codec splits between the
//! cipher and the MAC. PBKDF2 goes straight through the `pbkdf2` crate.
//!
//! Scrypt is messier. The `scrypt` crate enforces RFC 7914's
//! `n < 2^(128·r/8)` parameter bound, but the deployed secret-storage
//! files include scrypt parameter sets — n=262144, r=1, p=8 is the
//! published reference vector's — that violate the bound while being
//! perfectly computable. Rejecting them would mean refusing to open real
//! keystores. So: parameters the crate accepts go through the crate, and
//! out-of-bound parameters fall back to a direct evaluation of the same
//! construction (PBKDF2 → ROMix per block → PBKDF2, Salsa20/8 core),
//! which the in-bound equivalence tests below pin against the crate.

use pbkdf2::pbkdf2_hmac;
use salsa20::cipher::{typenum::U4, StreamCipherCore};
use salsa20::SalsaCore;
use scrypt::Params as ScryptParams;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::json::KdfParams;
use super::KeystoreError;
use crate::config::DKLEN;

/// Upper bound on the scrypt scratch vector, 1 GiB. Far above every
/// parameter set real files carry; a guard against absurd `n`/`r` values
/// allocating the machine away.
const MAX_SCRATCH_BYTES: usize = 1 << 30;

/// Run the document's KDF and hand back the stretched key, zeroed on drop.
pub(super) fn derive_key(
    password: &str,
    params: &KdfParams,
) -> Result<Zeroizing<[u8; DKLEN]>, KeystoreError> {
    let mut derived = Zeroizing::new([0u8; DKLEN]);
    match params {
        KdfParams::Pbkdf2 { c, dklen, prf, salt } => {
            if *dklen as usize != DKLEN || prf != "hmac-sha256" {
                return Err(KeystoreError::UnsupportedKdf(format!(
                    "pbkdf2 dklen={dklen} prf={prf}"
                )));
            }
            pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_slice(), *c, &mut *derived);
        }
        KdfParams::Scrypt { dklen, n, r, p, salt } => {
            if *dklen as usize != DKLEN || !n.is_power_of_two() || *n < 2 || *r == 0 || *p == 0 {
                return Err(KeystoreError::UnsupportedKdf(format!(
                    "scrypt dklen={dklen} n={n} r={r} p={p}"
                )));
            }
            let log_n = n.trailing_zeros() as u8;
            match ScryptParams::new(log_n, *r, *p, DKLEN) {
                Ok(scrypt_params) => {
                    scrypt::scrypt(
                        password.as_bytes(),
                        salt.as_slice(),
                        &scrypt_params,
                        &mut *derived,
                    )
                    .map_err(|_| {
                        KeystoreError::UnsupportedKdf("scrypt output length".to_string())
                    })?;
                }
                // The crate's RFC parameter bound, not a computability
                // limit. Real files sit on the far side of it.
                Err(_) => {
                    scrypt_unbounded(
                        password.as_bytes(),
                        salt.as_slice(),
                        *n as usize,
                        *r as usize,
                        *p as usize,
                        &mut *derived,
                    )
                    .ok_or_else(|| {
                        KeystoreError::UnsupportedKdf(format!("scrypt n={n} r={r} p={p}"))
                    })?;
                }
            }
        }
    }
    Ok(derived)
}

/// Scrypt without the RFC parameter bound: PBKDF2 expands the password,
/// each 128·r block is ROMixed with cost `n`, PBKDF2 contracts the result.
///
/// Returns `None` only when the scratch vector would not fit in
/// [`MAX_SCRATCH_BYTES`]. Callers must have validated `n` as a power of
/// two and `r`, `p` as nonzero.
fn scrypt_unbounded(
    password: &[u8],
    salt: &[u8],
    n: usize,
    r: usize,
    p: usize,
    output: &mut [u8],
) -> Option<()> {
    let r128 = r.checked_mul(128)?;
    let nr128 = r128.checked_mul(n)?;
    let pr128 = r128.checked_mul(p)?;
    if nr128 > MAX_SCRATCH_BYTES || pr128 > MAX_SCRATCH_BYTES {
        return None;
    }

    let mut blocks = Zeroizing::new(vec![0u8; pr128]);
    pbkdf2_hmac::<Sha256>(password, salt, 1, &mut blocks);

    let mut scratch = vec![0u8; nr128];
    let mut tmp = vec![0u8; r128];
    for block in blocks.chunks_mut(r128) {
        ro_mix(block, &mut scratch, &mut tmp, n);
    }

    pbkdf2_hmac::<Sha256>(password, &blocks, 1, output);
    Some(())
}

/// ROMix in place over one 128·r block, using `scratch` (n blocks) and
/// `tmp` (one block) as working storage.
fn ro_mix(block: &mut [u8], scratch: &mut [u8], tmp: &mut [u8], n: usize) {
    let len = block.len();

    for chunk in scratch.chunks_mut(len) {
        chunk.copy_from_slice(block);
        block_mix(chunk, block);
    }

    for _ in 0..n {
        let j = integerify(block, n);
        xor(block, &scratch[j * len..(j + 1) * len], tmp);
        block_mix(tmp, block);
    }
}

/// The block index ROMix jumps to: the low 32 bits of the last 64-byte
/// sub-block, little-endian, reduced mod `n` (a power of two, so a mask).
fn integerify(block: &[u8], n: usize) -> usize {
    let mut word = [0u8; 4];
    word.copy_from_slice(&block[block.len() - 64..block.len() - 60]);
    (u32::from_le_bytes(word) as usize) & (n - 1)
}

/// BlockMix: Salsa20/8 over the running 64-byte state xor each sub-block,
/// with the even/odd interleave RFC 7914 specifies for the output order.
fn block_mix(input: &[u8], output: &mut [u8]) {
    let mut state = [0u8; 64];
    state.copy_from_slice(&input[input.len() - 64..]);

    let mut mixed = [0u8; 64];
    for (i, chunk) in input.chunks(64).enumerate() {
        xor(&state, chunk, &mut mixed);

        let mut words = [0u32; 16];
        for (word, bytes) in words.iter_mut().zip(mixed.chunks_exact(4)) {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(bytes);
            *word = u32::from_le_bytes(buf);
        }
        SalsaCore::<U4>::from_raw_state(words).write_keystream_block((&mut state).into());

        let pos = if i % 2 == 0 {
            (i / 2) * 64
        } else {
            (i / 2) * 64 + input.len() / 2
        };
        output[pos..pos + 64].copy_from_slice(&state);
    }
}

fn xor(x: &[u8], y: &[u8], output: &mut [u8]) {
    for ((out, a), b) in output.iter_mut().zip(x).zip(y) {
        *out = a ^ b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The direct path must compute exactly what the crate computes wherever
    // both are defined; the crate is the reference inside the bound.

    #[test]
    fn direct_path_matches_the_crate_at_r_1() {
        // log_n=10 < r*16=16, so the crate accepts this set too.
        let params = ScryptParams::new(10, 1, 2, 32).unwrap();
        let mut via_crate = [0u8; 32];
        scrypt::scrypt(b"testpassword", b"saltsaltsaltsalt", &params, &mut via_crate).unwrap();

        let mut direct = [0u8; 32];
        scrypt_unbounded(b"testpassword", b"saltsaltsaltsalt", 1024, 1, 2, &mut direct).unwrap();

        assert_eq!(via_crate, direct);
    }

    #[test]
    fn direct_path_matches_the_crate_at_r_8() {
        // r > 1 exercises the interleaved BlockMix output ordering.
        let params = ScryptParams::new(8, 8, 1, 32).unwrap();
        let mut via_crate = [0u8; 32];
        scrypt::scrypt(b"pleaseletmein", b"SodiumChloride", &params, &mut via_crate).unwrap();

        let mut direct = [0u8; 32];
        scrypt_unbounded(b"pleaseletmein", b"SodiumChloride", 256, 8, 1, &mut direct).unwrap();

        assert_eq!(via_crate, direct);
    }

    #[test]
    fn rfc_7914_scrypt_vector() {
        // RFC 7914 §12, the N=16384/r=8/p=1 vector, first 32 of 64 bytes.
        let params = ScryptParams::new(14, 8, 1, 32).unwrap();
        let mut out = [0u8; 32];
        scrypt::scrypt(b"password", b"NaCl", &params, &mut out).unwrap();
        assert_eq!(
            hex::encode(out),
            "fdbabe1c9d3472007856e7190d01e9fe7c6ad7cbc8237830e77376634b373162"
        );

        let mut direct = [0u8; 32];
        scrypt_unbounded(b"password", b"NaCl", 16384, 8, 1, &mut direct).unwrap();
        assert_eq!(out, direct);
    }

    #[test]
    fn absurd_scratch_sizes_are_refused() {
        let mut out = [0u8; 32];
        assert!(scrypt_unbounded(b"pw", b"salt", 1 << 40, 1, 1, &mut out).is_none());
        assert!(scrypt_unbounded(b"pw", b"salt", 1024, usize::MAX / 64, 1, &mut out).is_none());
    }

    #[test]
    fn out_of_bound_reference_parameters_derive() {
        // n=262144 at r=1 violates the crate's bound; the fallback must
        // still produce a key. Correctness of the value is pinned by the
        // keystore reference-vector test one module up.
        let params = KdfParams::Scrypt {
            dklen: 32,
            n: 262_144,
            r: 1,
            p: 8,
            salt: super::super::json::HexBytes::from(vec![0u8; 16]),
        };
        assert!(derive_key("testpassword", &params).is_ok());
    }
}
