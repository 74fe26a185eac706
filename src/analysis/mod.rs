//! # File Analysis
//!
//! Inspects the size and leading bytes of a target to guess how it was
//! encrypted, before any attack runs.
//!
//! ## Heuristics
//!
//! - **Block alignment**: a size divisible by 16 hints at a 128-bit block
//!   cipher, by 8 at a 64-bit one, anything else at a stream cipher
//! - **Mode**: an aligned size hints at ECB or CBC with padding, otherwise at
//!   a keystream or authenticated mode without padding
//! - **Entropy**: encrypted data sits close to 8 bits per byte
//! - **Signatures**: a few container formats announce themselves in their
//!   first bytes
//!
//! The confidence score starts at 0.5 for any readable target and gains 0.2
//! for alignment, 0.2 for high entropy and 0.1 for a known signature.

use crate::cipher::{Mode, Padding};
use crate::config::{ALIGNMENT_CONFIDENCE, BASE_CONFIDENCE, ENTROPY_CONFIDENCE, HEADER_SAMPLE_SIZE, HIGH_ENTROPY_THRESHOLD, SIGNATURE_CONFIDENCE};
use crate::target::Target;

pub mod entropy;
pub mod signature;

/// What file analysis found out about a target.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncryptionAnalysis {
    /// Algorithm names consistent with the block alignment.
    pub possible_algorithms: Vec<String>,
    pub possible_modes: Vec<Mode>,
    pub possible_paddings: Vec<Padding>,
    pub file_size: u64,
    /// 16, 8, or 0 when neither divides the size.
    pub block_alignment: usize,
    /// Shannon entropy of the header sample in bits per byte.
    pub entropy: f64,
    pub detected_format: Option<&'static str>,
    /// In `[0, 1]`; zero when the target could not be read.
    pub confidence: f64,
    pub notes: Vec<String>,
}

impl EncryptionAnalysis {
    fn unreadable(file_size: u64, note: String) -> Self {
        Self { file_size, notes: vec![note], ..Self::default() }
    }

    #[inline]
    pub fn has_signature(&self) -> bool {
        self.detected_format.is_some()
    }
}

/// Largest common block size dividing `size`.
#[inline]
pub fn block_alignment(size: u64) -> usize {
    if size % 16 == 0 {
        16
    } else if size % 8 == 0 {
        8
    } else {
        0
    }
}

/// Analyzes a target. Never fails; problems are reported as notes.
pub fn analyze(target: &Target) -> EncryptionAnalysis {
    if !target.exists() {
        return EncryptionAnalysis::unreadable(0, "File not found or inaccessible".to_owned());
    }

    let file_size = match target.len() {
        Ok(size) => size,
        Err(e) => return EncryptionAnalysis::unreadable(0, format!("Could not read file: {e:#}")),
    };

    let header = match target.read_prefix(HEADER_SAMPLE_SIZE) {
        Ok(header) => header,
        Err(e) => return EncryptionAnalysis::unreadable(file_size, format!("Could not read file: {e:#}")),
    };

    let mut notes = vec![format!("File size: {file_size} bytes")];
    let alignment = block_alignment(file_size);
    let detected_format = signature::detect(&header);

    let possible_algorithms: &[&str] = match alignment {
        16 => {
            notes.push("16-byte alignment suggests AES, Twofish, Serpent, CAST6, or Camellia".to_owned());
            &["AES", "Twofish", "Serpent", "CAST6", "Camellia"]
        }
        8 => {
            notes.push("8-byte alignment suggests DES, 3DES, Blowfish, or CAST5".to_owned());
            &["DES", "3DES", "Blowfish", "CAST5"]
        }
        _ => {
            notes.push("No clear block alignment - might be stream cipher or custom implementation".to_owned());
            &["RC4", "RC5", "RC6"]
        }
    };

    let (possible_modes, possible_paddings) = if alignment > 0 {
        notes.push("Perfect block alignment suggests ECB or CBC mode".to_owned());
        (vec![Mode::Ecb, Mode::Cbc], vec![Padding::Pkcs5, Padding::None])
    } else {
        notes.push("Non-aligned size suggests stream mode (CFB, OFB, CTR) or authenticated mode (GCM)".to_owned());
        (vec![Mode::Cfb, Mode::Ofb, Mode::Ctr, Mode::Gcm], vec![Padding::None])
    };

    if let Some(format) = detected_format {
        notes.push(format!("Signature detected: {format}"));
    }

    let entropy = entropy::shannon(&header);
    let high_entropy = entropy >= HIGH_ENTROPY_THRESHOLD;
    if high_entropy {
        notes.push("High entropy detected - consistent with encrypted data".to_owned());
    } else {
        notes.push("Lower entropy detected - file might not be encrypted or uses weak encryption".to_owned());
    }

    notes.push(format!("Entropy: {entropy:.3} bits/byte"));
    notes.push(format!("Chi-squared (uniform): {:.1}", entropy::chi_squared(&header)));
    notes.push(format!("Index of coincidence: {:.5}", entropy::index_of_coincidence(&header)));

    let mut confidence = BASE_CONFIDENCE;
    if alignment > 0 {
        confidence += ALIGNMENT_CONFIDENCE;
    }
    if high_entropy {
        confidence += ENTROPY_CONFIDENCE;
    }
    if detected_format.is_some() {
        confidence += SIGNATURE_CONFIDENCE;
    }

    EncryptionAnalysis {
        possible_algorithms: possible_algorithms.iter().map(|&name| name.to_owned()).collect(),
        possible_modes,
        possible_paddings,
        file_size,
        block_alignment: alignment,
        entropy,
        detected_format,
        confidence: confidence.min(1.0),
        notes,
    }
}
