//! RSA with PKCS#1 v1.5 or OAEP-SHA256 padding.
//!
//! Keys are DER encoded: a PKCS#8 private key to decrypt and an SPKI public
//! key to encrypt.

use aes_gcm::aead::OsRng;
use anyhow::{Result, anyhow, bail};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::cipher::Padding;

pub fn decrypt(key: &[u8], padding: Padding, data: &[u8]) -> Result<Vec<u8>> {
    let key = RsaPrivateKey::from_pkcs8_der(key).map_err(|e| anyhow!("invalid RSA private key: {e}"))?;

    match padding {
        Padding::Pkcs1 => key.decrypt(Pkcs1v15Encrypt, data),
        Padding::Oaep => key.decrypt(Oaep::new::<Sha256>(), data),
        other => bail!("{other} is not an RSA padding"),
    }
    .map_err(|e| anyhow!("rsa decryption failed: {e}"))
}

pub fn encrypt(key: &[u8], padding: Padding, data: &[u8]) -> Result<Vec<u8>> {
    let key = RsaPublicKey::from_public_key_der(key).map_err(|e| anyhow!("invalid RSA public key: {e}"))?;

    match padding {
        Padding::Pkcs1 => key.encrypt(&mut OsRng, Pkcs1v15Encrypt, data),
        Padding::Oaep => key.encrypt(&mut OsRng, Oaep::new::<Sha256>(), data),
        other => bail!("{other} is not an RSA padding"),
    }
    .map_err(|e| anyhow!("rsa encryption failed: {e}"))
}
