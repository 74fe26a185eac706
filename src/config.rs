//! Global Configuration Constants
//!
//! This module contains every fixed parameter the recovery engine relies on:
//! configuration bounds, search alphabets, the built-in common password list,
//! key derivation constants and progress reporting cadences.
//!
//! ## Compatibility
//!
//! The key derivation constants (salt, suffixes, iteration counts) must stay
//! byte-for-byte identical to the values used by the tool that produced the
//! target files. Changing any of them makes every previously derivable key
//! unreachable.

/// Application name used in user interfaces.
pub const APP_NAME: &str = "keyhound";

// === Attack Configuration Bounds ===
// Every numeric field of an attack configuration is clamped into these ranges.

/// Shortest password length brute force will enumerate.
pub const MIN_PASSWORD_LENGTH: usize = 1;

/// Longest password length brute force will enumerate.
///
/// 20 characters over a 62-symbol alphabet is already far beyond any
/// exhaustive search; the bound only protects counters and progress math.
pub const MAX_PASSWORD_LENGTH: usize = 20;

/// Default maximum password length.
pub const DEFAULT_PASSWORD_LENGTH: usize = 8;

/// Minimum number of worker threads.
pub const MIN_THREAD_COUNT: usize = 1;

/// Maximum number of worker threads.
pub const MAX_THREAD_COUNT: usize = 32;

/// Thread count used when the available parallelism cannot be detected.
pub const DEFAULT_THREAD_COUNT: usize = 4;

/// Upper bound of the effective thread count under GPU-assisted scheduling.
pub const MAX_ASSISTED_THREAD_COUNT: usize = 16;

/// Extra workers added under hybrid scheduling.
pub const HYBRID_EXTRA_THREADS: usize = 2;

/// Smallest read buffer used for streamed word lists (1 KiB).
pub const MIN_CHUNK_SIZE: usize = 1024;

/// Largest read buffer used for streamed word lists (10 MiB).
pub const MAX_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// Default read buffer used for streamed word lists (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

// === Search Alphabets ===

/// Default brute force character set: lowercase, uppercase and digits.
pub const DEFAULT_CHARSET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default mask pattern: four lowercase letters followed by four digits.
pub const DEFAULT_MASK: &str = "?l?l?l?l?d?d?d?d";

/// Alphabet of the `?l` mask placeholder.
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";

/// Alphabet of the `?u` mask placeholder.
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Alphabet of the `?d` mask placeholder.
pub const DIGITS: &str = "0123456789";

/// Alphabet of the `?s` mask placeholder: the 32 ASCII punctuation characters.
pub const SPECIAL: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Alphabet of the `?a` mask placeholder: all 95 printable ASCII characters.
pub const PRINTABLE: &str =
    " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// Passwords tried before any enumeration by smart brute force.
pub const COMMON_PASSWORDS: &[&str] = &["password", "123456", "qwerty", "admin", "letmein", "welcome", "monkey", "dragon"];

/// Suffixes appended to each common password when smart patterns are enabled.
pub const SMART_SUFFIXES: &[&str] = &["1", "123"];

/// Rules applied when a rule file exists but cannot be read.
pub const DEFAULT_RULES: &[&str] = &[":", "$1", "$2", "$3", "^1", "^2", "^3", "u", "l", "c", "r", "d"];

/// Prefix of comment lines in rule files.
pub const RULE_COMMENT_PREFIX: char = '#';

// === Trial Decryption ===

/// Number of leading target bytes a trial decryption operates on.
///
/// Bounds the per-candidate cost regardless of the target size.
pub const HEADER_SAMPLE_SIZE: usize = 1024;

/// Nonce length used for GCM and CCM.
pub const AEAD_NONCE_SIZE: usize = 12;

/// Authentication tag length appended by GCM and CCM (128 bits).
pub const AEAD_TAG_SIZE: usize = 16;

/// Minimum share of printable bytes for a plaintext to be considered plausible.
pub const PLAUSIBLE_PRINTABLE_RATIO: f64 = 0.7;

/// Maximum share of NUL bytes for a plaintext to be considered plausible.
pub const PLAUSIBLE_NUL_RATIO: f64 = 0.1;

/// Primary key lengths below this are treated as weak.
pub const WEAK_KEY_LENGTH: usize = 16;

// === Key Derivation Parameters ===

/// Fixed salt shared by PBKDF2 and scrypt derivations.
pub const KDF_SALT: &[u8] = b"SpadeAce";

/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 10_000;

/// scrypt cost parameter as a power of two (N = 16384).
pub const SCRYPT_LOG_N: u8 = 14;

/// scrypt block size parameter.
pub const SCRYPT_R: u32 = 8;

/// scrypt parallelization parameter.
pub const SCRYPT_P: u32 = 1;

/// Chained SHA-256 rounds of the simplified Argon2 derivation.
pub const ARGON2_ROUNDS: usize = 1000;

/// Suffix hashed into every round of the simplified Argon2 derivation.
pub const ARGON2_SUFFIX: &[u8] = b"argon2_salt";

/// Chained SHA-256 rounds of the simplified bcrypt derivation.
pub const BCRYPT_ROUNDS: usize = 12;

/// Suffix hashed into every round of the simplified bcrypt derivation.
pub const BCRYPT_SUFFIX: &[u8] = b"bcrypt_salt";

// === File Analysis ===

/// Entropy (bits per byte) at or above which a sample looks encrypted.
pub const HIGH_ENTROPY_THRESHOLD: f64 = 7.0;

/// Minimum header length before container signatures are checked.
pub const SIGNATURE_MIN_HEADER: usize = 16;

/// Confidence every completed analysis starts from.
pub const BASE_CONFIDENCE: f64 = 0.5;

/// Confidence added when the size is block aligned.
pub const ALIGNMENT_CONFIDENCE: f64 = 0.2;

/// Confidence added when the sample entropy is high.
pub const ENTROPY_CONFIDENCE: f64 = 0.2;

/// Confidence added when a container signature matched.
pub const SIGNATURE_CONFIDENCE: f64 = 0.1;

// === Progress Reporting ===

/// Capacity of the progress channel between the attack thread and the UI.
pub const PROGRESS_QUEUE_SIZE: usize = 64;
