//! # Password Key Derivation
//!
//! Turns a candidate password into key bytes of an exact length.
//!
//! Five methods are supported, selected by [`DerivationMethod`]:
//!
//! | Method   | Construction                                              |
//! |----------|-----------------------------------------------------------|
//! | SHA-256  | `SHA256(password)`                                        |
//! | PBKDF2   | PBKDF2-HMAC-SHA256, salt `SpadeAce`, 10 000 iterations    |
//! | scrypt   | N = 16384, r = 8, p = 1, salt `SpadeAce`                  |
//! | Argon2   | 1000 rounds of `h = SHA256(h ‖ "argon2_salt")`            |
//! | bcrypt   | 12 rounds of `h = SHA256(h ‖ "bcrypt_salt")`              |
//!
//! The Argon2 and bcrypt entries are chained SHA-256 stand-ins named after
//! the schemes they replace, not the real algorithms. Every output is
//! truncated or zero-padded to the requested length, except PBKDF2 and
//! scrypt, which produce the requested length directly.
//!
//! Derivation is deterministic: the same password, length and method always
//! yield the same bytes.

use anyhow::{Result, anyhow, ensure};
use hmac::Hmac;
use scrypt::Params;
use sha2::{Digest, Sha256};

use crate::config::{ARGON2_ROUNDS, ARGON2_SUFFIX, BCRYPT_ROUNDS, BCRYPT_SUFFIX, KDF_SALT, PBKDF2_ITERATIONS, SCRYPT_LOG_N, SCRYPT_P, SCRYPT_R};
use crate::secret::KeyMaterial;
use crate::types::DerivationMethod;

/// Derives `len` key bytes from `password`.
///
/// # Errors
///
/// Only fails when `len` is zero.
pub fn derive_key(password: &[u8], len: usize, method: DerivationMethod) -> Result<KeyMaterial> {
    ensure!(len > 0, "key length cannot be zero");

    let bytes = match method {
        DerivationMethod::Sha256Simple => resize(Sha256::digest(password).to_vec(), len),
        DerivationMethod::Pbkdf2 => {
            let mut out = vec![0u8; len];
            pbkdf2::pbkdf2::<Hmac<Sha256>>(password, KDF_SALT, PBKDF2_ITERATIONS, &mut out).map_err(|e| anyhow!("pbkdf2 failed: {e}"))?;
            out
        }
        DerivationMethod::Scrypt => {
            let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, Params::RECOMMENDED_LEN).map_err(|e| anyhow!("invalid scrypt parameters: {e}"))?;
            let mut out = vec![0u8; len];
            scrypt::scrypt(password, KDF_SALT, &params, &mut out).map_err(|e| anyhow!("scrypt failed: {e}"))?;
            out
        }
        DerivationMethod::Argon2 => resize(chain(password, ARGON2_SUFFIX, ARGON2_ROUNDS), len),
        DerivationMethod::Bcrypt => resize(chain(password, BCRYPT_SUFFIX, BCRYPT_ROUNDS), len),
    };

    Ok(KeyMaterial::from_vec(bytes))
}

/// `rounds` iterations of `h = SHA256(h ‖ suffix)`, starting from the password.
fn chain(password: &[u8], suffix: &[u8], rounds: usize) -> Vec<u8> {
    let mut hash = password.to_vec();

    for _ in 0..rounds {
        let mut hasher = Sha256::new();
        hasher.update(&hash);
        hasher.update(suffix);
        hash = hasher.finalize().to_vec();
    }

    hash
}

/// Truncates or zero-pads to exactly `len` bytes.
#[inline]
fn resize(mut bytes: Vec<u8>, len: usize) -> Vec<u8> {
    bytes.resize(len, 0);
    bytes
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_every_method_is_deterministic() {
        for method in DerivationMethod::iter() {
            let first = derive_key(b"hunter2", 16, method).unwrap();
            let second = derive_key(b"hunter2", 16, method).unwrap();

            assert_eq!(first, second, "{method}");
            assert_eq!(first.len(), 16, "{method}");
        }
    }

    #[test]
    fn test_methods_differ() {
        let sha = derive_key(b"hunter2", 32, DerivationMethod::Sha256Simple).unwrap();
        let argon = derive_key(b"hunter2", 32, DerivationMethod::Argon2).unwrap();
        let bcrypt = derive_key(b"hunter2", 32, DerivationMethod::Bcrypt).unwrap();

        assert_ne!(sha, argon);
        assert_ne!(argon, bcrypt);
    }

    #[test]
    fn test_sha256_known_answer() {
        let key = derive_key(b"abc", 32, DerivationMethod::Sha256Simple).unwrap();
        assert_eq!(hex::encode(key.expose_secret()), "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }

    #[test]
    fn test_resize_truncates_and_pads() {
        let short = derive_key(b"abc", 8, DerivationMethod::Sha256Simple).unwrap();
        assert_eq!(short.expose_secret(), &hex::decode("ba7816bf8f01cfea").unwrap()[..]);

        let long = derive_key(b"abc", 40, DerivationMethod::Sha256Simple).unwrap();
        assert_eq!(long.len(), 40);
        assert!(long.expose_secret()[32..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pbkdf2_long_keys_continue_the_stream() {
        let short = derive_key(b"abc", 32, DerivationMethod::Pbkdf2).unwrap();
        let long = derive_key(b"abc", 56, DerivationMethod::Pbkdf2).unwrap();

        assert_eq!(long.len(), 56);
        assert_eq!(&long.expose_secret()[..32], short.expose_secret());
        assert_eq!(&long.expose_secret()[32..40], &[0x63, 0x64, 0x2f, 0x91, 0x77, 0xef, 0x2a, 0x06]);
    }

    #[test]
    fn test_scrypt_produces_requested_length() {
        let key = derive_key(b"abc", 56, DerivationMethod::Scrypt).unwrap();
        assert_eq!(key.len(), 56);
        assert!(key.expose_secret()[32..].iter().any(|&b| b != 0));
    }

    #[test]
    fn test_zero_length_is_rejected() {
        assert!(derive_key(b"abc", 0, DerivationMethod::Sha256Simple).is_err());
    }
}
