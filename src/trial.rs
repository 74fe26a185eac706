//! Trial decryption of a target header.
//!
//! A candidate password is accepted when any registered algorithm, mode and
//! padding combination decrypts the header without an error. Authenticated
//! modes (GCM, CCM) make that a strong signal; for the others a wrong key
//! often still yields well-formed padding, and keystream modes never fail.
//! Those false positives are inherent to the check. Enabling
//! [`TrialDecryptor::verify_plaintext`] additionally requires the decrypted
//! bytes to look like text.

use std::sync::Arc;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use tracing::trace;

use crate::cipher::{Mode, Padding, Registry, derive_key};
use crate::config::{PLAUSIBLE_NUL_RATIO, PLAUSIBLE_PRINTABLE_RATIO, WEAK_KEY_LENGTH};
use crate::secret::KeyMaterial;
use crate::types::DerivationMethod;

/// The combination that accepted a password.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hit {
    pub algorithm: String,
    pub mode: Mode,
    pub padding: Padding,
}

/// Tests candidate passwords against a fixed header sample.
///
/// The header is read once per attack; every candidate and every combination
/// decrypts the same bytes.
#[derive(Clone, Debug)]
pub struct TrialDecryptor {
    header: Arc<[u8]>,
    registry: Arc<Registry>,
    method: DerivationMethod,
    skip_weak: bool,
    verify_plaintext: bool,
}

impl TrialDecryptor {
    pub fn new(header: impl Into<Arc<[u8]>>, registry: Arc<Registry>, method: DerivationMethod) -> Self {
        Self { header: header.into(), registry, method, skip_weak: false, verify_plaintext: false }
    }

    /// Skips ECB and algorithms whose primary key is shorter than 128 bits.
    #[must_use]
    pub fn skip_weak(mut self, skip: bool) -> Self {
        self.skip_weak = skip;
        self
    }

    /// Requires a plausible plaintext on top of a successful decryption.
    #[must_use]
    pub fn verify_plaintext(mut self, verify: bool) -> Self {
        self.verify_plaintext = verify;
        self
    }

    #[inline]
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    /// Whether any combination accepts `password`.
    #[inline]
    pub fn try_decrypt(&self, password: &str) -> bool {
        self.find_match(password).is_some()
    }

    /// The first combination, in registry order, that accepts `password`.
    pub fn find_match(&self, password: &str) -> Option<Hit> {
        // One derivation per key length per candidate.
        let mut keys: HashMap<usize, KeyMaterial> = HashMap::new();

        for descriptor in self.registry.list() {
            // Password bytes never form a valid RSA key.
            if descriptor.algorithm().is_asymmetric() {
                continue;
            }

            let len = descriptor.primary_key_length();
            if self.skip_weak && len < WEAK_KEY_LENGTH {
                continue;
            }

            let key = match keys.entry(len) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => match derive_key(password.as_bytes(), len, self.method) {
                    Ok(key) => entry.insert(key),
                    Err(_) => continue,
                },
            };

            for (mode, padding) in descriptor.combinations() {
                if self.skip_weak && mode == Mode::Ecb {
                    continue;
                }

                let Ok(plaintext) = descriptor.decrypt(key.expose_secret(), mode, padding, &self.header) else {
                    continue;
                };

                if self.verify_plaintext && !is_plausible(&plaintext) {
                    continue;
                }

                trace!(algorithm = descriptor.name(), %mode, %padding, "combination accepted candidate");
                return Some(Hit { algorithm: descriptor.name().to_owned(), mode, padding });
            }
        }

        None
    }
}

/// Non-empty, mostly printable ASCII and almost free of NUL bytes.
pub fn is_plausible(plaintext: &[u8]) -> bool {
    if plaintext.is_empty() {
        return false;
    }

    let len = plaintext.len() as f64;
    let printable = plaintext.iter().filter(|&&b| b.is_ascii_graphic() || b.is_ascii_whitespace()).count() as f64;
    let nul = plaintext.iter().filter(|&&b| b == 0).count() as f64;

    printable / len > PLAUSIBLE_PRINTABLE_RATIO && nul / len < PLAUSIBLE_NUL_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{Algorithm, CipherDescriptor, shared_registry};

    fn gcm_only() -> Arc<Registry> {
        let mut registry = Registry::new();
        registry.register(CipherDescriptor::new("AES", Algorithm::Aes, &[Mode::Gcm], &[Padding::None], 16, &[16]).unwrap());
        Arc::new(registry)
    }

    fn seal(password: &str, plaintext: &[u8]) -> Vec<u8> {
        let registry = gcm_only();
        let aes = registry.lookup("AES").unwrap();
        let key = derive_key(password.as_bytes(), 16, DerivationMethod::Sha256Simple).unwrap();
        aes.encrypt(key.expose_secret(), Mode::Gcm, Padding::None, plaintext).unwrap()
    }

    #[test]
    fn test_authenticated_mode_discriminates() {
        let trial = TrialDecryptor::new(seal("bar", b"top secret"), gcm_only(), DerivationMethod::Sha256Simple);

        assert!(trial.try_decrypt("bar"));
        assert!(!trial.try_decrypt("foo"));
        assert_eq!(trial.find_match("bar"), Some(Hit { algorithm: "AES".into(), mode: Mode::Gcm, padding: Padding::None }));
    }

    #[test]
    fn test_keystream_modes_accept_anything() {
        let trial = TrialDecryptor::new(vec![0xA5u8; 33], shared_registry(), DerivationMethod::Sha256Simple);
        assert!(trial.try_decrypt("definitely wrong"));
    }

    #[test]
    fn test_plaintext_verification() {
        let registry = shared_registry();
        let aes = registry.lookup("AES").unwrap();
        let key = derive_key(b"letmein", 16, DerivationMethod::Sha256Simple).unwrap();
        let ciphertext = aes.encrypt(key.expose_secret(), Mode::Cbc, Padding::Pkcs5, b"Dear diary, today I hid the password.").unwrap();

        let trial = TrialDecryptor::new(ciphertext, registry, DerivationMethod::Sha256Simple).verify_plaintext(true);
        assert!(trial.try_decrypt("letmein"));
        assert!(!trial.try_decrypt("letmeout"));
    }

    #[test]
    fn test_skip_weak() {
        let mut registry = Registry::new();
        registry.register(CipherDescriptor::new("RC4", Algorithm::Rc4, &[Mode::Stream], &[Padding::None], 1, &[5]).unwrap());
        registry.register(CipherDescriptor::new("AES", Algorithm::Aes, &[Mode::Ecb], &[Padding::None], 16, &[16]).unwrap());
        let registry = Arc::new(registry);

        let loose = TrialDecryptor::new(vec![1u8; 32], Arc::clone(&registry), DerivationMethod::Sha256Simple);
        assert_eq!(loose.find_match("x").map(|hit| hit.algorithm), Some("RC4".into()));

        let strict = loose.skip_weak(true);
        assert!(!strict.try_decrypt("x"));
    }

    #[test]
    fn test_plausibility() {
        assert!(is_plausible(b"hello world\n"));
        assert!(!is_plausible(b""));
        assert!(!is_plausible(&[0u8; 32]));
        assert!(!is_plausible(&[0xFFu8; 32]));
    }
}
