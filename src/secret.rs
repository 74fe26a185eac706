//! Zeroizing wrappers for passwords and derived keys.

use std::fmt;

use secrecy::{ExposeSecret, SecretSlice, SecretString};

/// Derived key bytes, wiped from memory on drop.
pub struct KeyMaterial {
    inner: SecretSlice<u8>,
}

impl KeyMaterial {
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { inner: SecretSlice::from(bytes) }
    }

    #[inline]
    pub fn expose_secret(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.expose_secret().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Clone for KeyMaterial {
    fn clone(&self) -> Self {
        Self::from_vec(self.expose_secret().to_vec())
    }
}

impl PartialEq for KeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.expose_secret() == other.expose_secret()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial([... {} bytes ...])", self.len())
    }
}

/// A known password supplied on the command line.
pub struct Password {
    inner: SecretString,
}

impl Password {
    pub fn new(password: &str) -> Self {
        Self { inner: SecretString::from(password.to_owned()) }
    }

    #[inline]
    pub fn expose_secret(&self) -> &str {
        self.inner.expose_secret()
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self { inner: SecretString::from(password) }
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}
