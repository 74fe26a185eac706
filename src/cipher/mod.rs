//! # Cipher Catalog
//!
//! Describes every algorithm the recovery engine can trial-decrypt with, and
//! performs the actual encryption and decryption through a static dispatch
//! table keyed by [`Algorithm`].
//!
//! ## Layers
//!
//! - **Model**: [`Algorithm`], [`Mode`] and [`Padding`] enums, parsed
//!   case-insensitively from their conventional names (`AES`, `CBC`,
//!   `PKCS5Padding`)
//! - **Descriptor**: [`CipherDescriptor`], an immutable record of what one
//!   algorithm supports, able to encrypt and decrypt with a raw key
//! - **Registry**: [`Registry`], the catalog of descriptors the engine
//!   iterates over
//! - **Derivation**: [`derive_key`], turning a password into key bytes
//!
//! ## Initialization Vectors
//!
//! Trial decryption has no way to learn the IV a file was produced with, so
//! every IV and nonce is deterministic: byte `i` of the IV is `i`. Files
//! produced by `keyhound encrypt` use the same convention.

use anyhow::{Result, bail, ensure};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

mod block;
pub mod derive;
mod registry;
mod rsa;
mod stream;

pub use derive::derive_key;
pub use registry::{Registry, shared_registry};

use crate::config::AEAD_NONCE_SIZE;

/// The algorithm family of a descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Algorithm {
    #[strum(serialize = "AES")]
    Aes,
    #[strum(serialize = "DES")]
    Des,
    #[strum(to_string = "3DES", serialize = "DESede", serialize = "TripleDES")]
    TripleDes,
    Blowfish,
    #[strum(serialize = "RC4")]
    Rc4,
    Twofish,
    #[strum(serialize = "CAST5")]
    Cast5,
    #[strum(serialize = "CAST6")]
    Cast6,
    #[strum(serialize = "IDEA")]
    Idea,
    Camellia,
    #[strum(serialize = "RSA")]
    Rsa,
}

impl Algorithm {
    /// Whether keys for this algorithm are structured key pairs rather than
    /// raw bytes.
    #[inline]
    pub fn is_asymmetric(self) -> bool {
        matches!(self, Self::Rsa)
    }

    fn decrypt(self, key: &[u8], mode: Mode, padding: Padding, iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        use block::{decrypt_narrow, decrypt_wide};

        match self {
            Self::Aes => match key.len() {
                16 => decrypt_wide::<aes::Aes128>(key, mode, padding, iv, data),
                24 => decrypt_wide::<aes::Aes192>(key, mode, padding, iv, data),
                32 => decrypt_wide::<aes::Aes256>(key, mode, padding, iv, data),
                n => bail!("invalid AES key length: {n}"),
            },
            Self::Camellia => match key.len() {
                16 => decrypt_wide::<camellia::Camellia128>(key, mode, padding, iv, data),
                24 => decrypt_wide::<camellia::Camellia192>(key, mode, padding, iv, data),
                32 => decrypt_wide::<camellia::Camellia256>(key, mode, padding, iv, data),
                n => bail!("invalid Camellia key length: {n}"),
            },
            Self::Twofish => decrypt_wide::<twofish::Twofish>(key, mode, padding, iv, data),
            Self::Cast6 => decrypt_wide::<cast6::Cast6>(key, mode, padding, iv, data),
            Self::Des => decrypt_narrow::<des::Des>(key, mode, padding, iv, data),
            Self::TripleDes => decrypt_narrow::<des::TdesEde3>(key, mode, padding, iv, data),
            Self::Blowfish => decrypt_narrow::<blowfish::Blowfish>(key, mode, padding, iv, data),
            Self::Cast5 => decrypt_narrow::<cast5::Cast5>(key, mode, padding, iv, data),
            Self::Idea => decrypt_narrow::<idea::Idea>(key, mode, padding, iv, data),
            Self::Rc4 => stream::apply_rc4(key, mode, data),
            Self::Rsa => rsa::decrypt(key, padding, data),
        }
    }

    fn encrypt(self, key: &[u8], mode: Mode, padding: Padding, iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        use block::{encrypt_narrow, encrypt_wide};

        match self {
            Self::Aes => match key.len() {
                16 => encrypt_wide::<aes::Aes128>(key, mode, padding, iv, data),
                24 => encrypt_wide::<aes::Aes192>(key, mode, padding, iv, data),
                32 => encrypt_wide::<aes::Aes256>(key, mode, padding, iv, data),
                n => bail!("invalid AES key length: {n}"),
            },
            Self::Camellia => match key.len() {
                16 => encrypt_wide::<camellia::Camellia128>(key, mode, padding, iv, data),
                24 => encrypt_wide::<camellia::Camellia192>(key, mode, padding, iv, data),
                32 => encrypt_wide::<camellia::Camellia256>(key, mode, padding, iv, data),
                n => bail!("invalid Camellia key length: {n}"),
            },
            Self::Twofish => encrypt_wide::<twofish::Twofish>(key, mode, padding, iv, data),
            Self::Cast6 => encrypt_wide::<cast6::Cast6>(key, mode, padding, iv, data),
            Self::Des => encrypt_narrow::<des::Des>(key, mode, padding, iv, data),
            Self::TripleDes => encrypt_narrow::<des::TdesEde3>(key, mode, padding, iv, data),
            Self::Blowfish => encrypt_narrow::<blowfish::Blowfish>(key, mode, padding, iv, data),
            Self::Cast5 => encrypt_narrow::<cast5::Cast5>(key, mode, padding, iv, data),
            Self::Idea => encrypt_narrow::<idea::Idea>(key, mode, padding, iv, data),
            // RC4 is its own inverse.
            Self::Rc4 => stream::apply_rc4(key, mode, data),
            Self::Rsa => rsa::encrypt(key, padding, data),
        }
    }
}

/// Mode of operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Mode {
    Ecb,
    Cbc,
    Cfb,
    Ofb,
    Ctr,
    Gcm,
    Ccm,
    /// Native mode of a stream cipher.
    #[strum(to_string = "NONE", serialize = "STREAM")]
    Stream,
}

impl Mode {
    /// GCM and CCM authenticate the ciphertext.
    #[inline]
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Gcm | Self::Ccm)
    }

    /// Modes that turn a block cipher into a keystream.
    #[inline]
    pub fn is_stream_like(self) -> bool {
        matches!(self, Self::Cfb | Self::Ofb | Self::Ctr | Self::Stream)
    }
}

/// Padding scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Padding {
    /// PKCS#5/PKCS#7 padding; the two are identical for 8 and 16-byte blocks.
    #[strum(to_string = "PKCS5Padding", serialize = "PKCS7Padding", serialize = "PKCS5", serialize = "PKCS7")]
    Pkcs5,
    #[strum(to_string = "NoPadding", serialize = "None")]
    None,
    #[strum(to_string = "ISO10126Padding", serialize = "ISO10126")]
    Iso10126,
    #[strum(to_string = "PKCS1Padding", serialize = "PKCS1")]
    Pkcs1,
    /// OAEP with SHA-256 and MGF1-SHA-256.
    #[strum(to_string = "OAEPPadding", serialize = "OAEP")]
    Oaep,
}

impl Padding {
    /// Paddings that only make sense for RSA.
    #[inline]
    pub fn is_asymmetric(self) -> bool {
        matches!(self, Self::Pkcs1 | Self::Oaep)
    }
}

/// What one algorithm supports, and how to run it.
///
/// Descriptors are immutable once built; the registry hands out clones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CipherDescriptor {
    name: String,
    algorithm: Algorithm,
    modes: Vec<Mode>,
    paddings: Vec<Padding>,
    block_size: usize,
    key_lengths: Vec<usize>,
}

impl CipherDescriptor {
    /// Creates a descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or any list is empty, or if the
    /// block size is zero.
    pub fn new(name: impl Into<String>, algorithm: Algorithm, modes: &[Mode], paddings: &[Padding], block_size: usize, key_lengths: &[usize]) -> Result<Self> {
        let name = name.into();

        ensure!(!name.trim().is_empty(), "descriptor name cannot be empty");
        ensure!(!modes.is_empty(), "descriptor {name} has no modes");
        ensure!(!paddings.is_empty(), "descriptor {name} has no paddings");
        ensure!(block_size > 0, "descriptor {name} has a zero block size");
        ensure!(!key_lengths.is_empty() && key_lengths.iter().all(|&n| n > 0), "descriptor {name} has no usable key lengths");

        Ok(Self { name, algorithm, modes: modes.to_vec(), paddings: paddings.to_vec(), block_size, key_lengths: key_lengths.to_vec() })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[inline]
    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    #[inline]
    pub fn paddings(&self) -> &[Padding] {
        &self.paddings
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn key_lengths(&self) -> &[usize] {
        &self.key_lengths
    }

    /// The key length trial decryption derives keys for: the first listed.
    #[inline]
    pub fn primary_key_length(&self) -> usize {
        self.key_lengths.first().copied().unwrap_or_default()
    }

    #[inline]
    pub fn supports_mode(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }

    #[inline]
    pub fn supports_padding(&self, padding: Padding) -> bool {
        self.paddings.contains(&padding)
    }

    /// Whether `mode` and `padding` can be used together.
    ///
    /// Authenticated and stream-like modes take no padding. Block modes take
    /// PKCS5, ISO10126 or none, except for asymmetric algorithms, which only
    /// take their own paddings.
    pub fn is_valid_combination(&self, mode: Mode, padding: Padding) -> bool {
        if !self.supports_mode(mode) || !self.supports_padding(padding) {
            return false;
        }

        if self.algorithm.is_asymmetric() {
            return padding.is_asymmetric();
        }

        if mode.is_authenticated() || mode.is_stream_like() {
            return padding == Padding::None;
        }

        matches!(padding, Padding::Pkcs5 | Padding::None | Padding::Iso10126)
    }

    /// Every valid mode and padding pair, in declaration order.
    pub fn combinations(&self) -> impl Iterator<Item = (Mode, Padding)> + '_ {
        self.modes.iter().flat_map(move |&mode| self.paddings.iter().map(move |&padding| (mode, padding))).filter(|&(mode, padding)| self.is_valid_combination(mode, padding))
    }

    /// Every mode except ECB and the native stream mode needs an IV.
    #[inline]
    pub fn requires_iv(&self, mode: Mode) -> bool {
        !matches!(mode, Mode::Ecb | Mode::Stream) && !self.algorithm.is_asymmetric()
    }

    /// IV length for `mode`: 12 bytes for GCM and CCM, the block size otherwise.
    #[inline]
    pub fn iv_length(&self, mode: Mode) -> usize {
        if !self.requires_iv(mode) {
            0
        } else if mode.is_authenticated() {
            AEAD_NONCE_SIZE
        } else {
            self.block_size
        }
    }

    /// The deterministic IV for `mode`.
    pub fn iv(&self, mode: Mode) -> Vec<u8> {
        (0..=u8::MAX).cycle().take(self.iv_length(mode)).collect()
    }

    /// Decrypts `data` with a raw key.
    ///
    /// # Errors
    ///
    /// Fails when the combination is not supported, the key has the wrong
    /// length, or the cipher rejects the input (bad padding, failed
    /// authentication, partial block).
    pub fn decrypt(&self, key: &[u8], mode: Mode, padding: Padding, data: &[u8]) -> Result<Vec<u8>> {
        ensure!(self.is_valid_combination(mode, padding), "{} does not support {mode}/{padding}", self.name);
        self.algorithm.decrypt(key, mode, padding, &self.iv(mode), data)
    }

    /// Encrypts `data` with a raw key.
    ///
    /// # Errors
    ///
    /// Fails when the combination is not supported, the key has the wrong
    /// length, or unpadded input is not block aligned.
    pub fn encrypt(&self, key: &[u8], mode: Mode, padding: Padding, data: &[u8]) -> Result<Vec<u8>> {
        ensure!(self.is_valid_combination(mode, padding), "{} does not support {mode}/{padding}", self.name);
        self.algorithm.encrypt(key, mode, padding, &self.iv(mode), data)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn aes() -> CipherDescriptor {
        CipherDescriptor::new("AES", Algorithm::Aes, &[Mode::Ecb, Mode::Cbc, Mode::Cfb, Mode::Gcm], &[Padding::Pkcs5, Padding::None, Padding::Iso10126], 16, &[16, 24, 32]).unwrap()
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Mode::from_str("cbc").unwrap(), Mode::Cbc);
        assert_eq!(Mode::from_str("NONE").unwrap(), Mode::Stream);
        assert_eq!(Padding::from_str("pkcs7padding").unwrap(), Padding::Pkcs5);
        assert_eq!(Padding::from_str("NoPadding").unwrap(), Padding::None);
        assert_eq!(Algorithm::from_str("desede").unwrap(), Algorithm::TripleDes);
        assert_eq!(Padding::Pkcs5.to_string(), "PKCS5Padding");
        assert_eq!(Algorithm::TripleDes.to_string(), "3DES");
    }

    #[test]
    fn test_valid_combinations() {
        let aes = aes();

        assert!(aes.is_valid_combination(Mode::Cbc, Padding::Pkcs5));
        assert!(aes.is_valid_combination(Mode::Ecb, Padding::Iso10126));
        assert!(aes.is_valid_combination(Mode::Gcm, Padding::None));
        assert!(!aes.is_valid_combination(Mode::Gcm, Padding::Pkcs5));
        assert!(!aes.is_valid_combination(Mode::Cfb, Padding::Pkcs5));
        assert!(!aes.is_valid_combination(Mode::Ctr, Padding::None));
        assert_eq!(aes.combinations().count(), 3 + 3 + 1 + 1);
    }

    #[test]
    fn test_iv_lengths() {
        let aes = aes();

        assert!(!aes.requires_iv(Mode::Ecb));
        assert_eq!(aes.iv_length(Mode::Ecb), 0);
        assert_eq!(aes.iv_length(Mode::Cbc), 16);
        assert_eq!(aes.iv_length(Mode::Gcm), 12);
        assert_eq!(aes.iv(Mode::Cbc), (0u8..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_descriptor_roundtrip() {
        let aes = aes();
        let key = [9u8; 16];

        let ciphertext = aes.encrypt(&key, Mode::Cbc, Padding::Pkcs5, b"hello world").unwrap();
        assert_eq!(aes.decrypt(&key, Mode::Cbc, Padding::Pkcs5, &ciphertext).unwrap(), b"hello world");
        assert!(aes.decrypt(&key, Mode::Cfb, Padding::Pkcs5, &ciphertext).is_err());
        assert!(aes.decrypt(&[9u8; 15], Mode::Cbc, Padding::Pkcs5, &ciphertext).is_err());
    }

    #[test]
    fn test_invalid_descriptor() {
        assert!(CipherDescriptor::new(" ", Algorithm::Aes, &[Mode::Ecb], &[Padding::None], 16, &[16]).is_err());
        assert!(CipherDescriptor::new("X", Algorithm::Aes, &[], &[Padding::None], 16, &[16]).is_err());
        assert!(CipherDescriptor::new("X", Algorithm::Aes, &[Mode::Ecb], &[Padding::None], 16, &[]).is_err());
    }
}
