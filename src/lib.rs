//! Keyhound - password recovery for encrypted files.
//!
//! Candidate passwords are turned into keys and tried against the first
//! bytes of a target under every registered algorithm, mode and padding:
//! - Keyspace, mask, word list, rule and common-password strategies
//! - AES, DES, 3DES, Blowfish, RC4, Twofish, CAST5/6, IDEA and Camellia
//! - SHA-256, PBKDF2, scrypt and chained-hash key derivation
//! - Cooperative cancellation and throttled progress reporting

pub mod analysis;
pub mod app;
pub mod attack;
pub mod cipher;
pub mod config;
pub mod secret;
pub mod target;
pub mod trial;
pub mod types;
pub mod ui;

pub use attack::{AttackConfiguration, CancelToken, Engine};
pub use types::{AttackKind, AttackProgress, AttackResult};
