//! Container signatures of common encrypted formats.

use crate::config::SIGNATURE_MIN_HEADER;

const SIGNATURES: &[(&[u8], &str)] = &[
    (&[0x85], "PGP Encrypted"),
    (b"PK", "Encrypted ZIP"),
    (&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C], "Encrypted 7Z"),
    (b"Rar!", "Encrypted RAR"),
    (b"Salted__", "OpenSSL Salted"),
];

/// Name of the container whose magic bytes start `header`.
///
/// Headers shorter than 16 bytes never match.
pub fn detect(header: &[u8]) -> Option<&'static str> {
    if header.len() < SIGNATURE_MIN_HEADER {
        return None;
    }

    SIGNATURES.iter().find(|(magic, _)| header.starts_with(magic)).map(|&(_, name)| name)
}
