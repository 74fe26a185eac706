//! Common type definitions for keyhound.
//!
//! Provides the enums selecting how an attack runs and the value types
//! an attack produces.
//!
//! # Overview
//!
//! - [`AttackKind`]: Which search strategy enumerates candidates
//! - [`OptimizationLevel`]: Progress reporting cadence
//! - [`HardwareAcceleration`]: Advisory scheduling mode
//! - [`DerivationMethod`]: How a candidate becomes key bytes
//! - [`AttackProgress`]: Snapshot handed to the progress callback
//! - [`AttackResult`]: Terminal outcome of one attack

use std::time::Duration;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::config::{HYBRID_EXTRA_THREADS, MAX_ASSISTED_THREAD_COUNT};

/// The search strategy of an attack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum AttackKind {
    /// Every string over the character set, shortest first.
    #[default]
    BruteForce,

    /// Every line of a word list.
    Dictionary,

    /// The password column of a `hash:password` table.
    RainbowTable,

    /// Dictionary first, then smart brute force.
    Hybrid,

    /// Every string matching a placeholder pattern.
    Mask,

    /// Every rule applied to every word of a word list.
    RuleBased,

    /// Common passwords first, then brute force.
    SmartBruteForce,
}

impl AttackKind {
    /// Message reported when the strategy exhausts its search space.
    pub fn exhausted_message(self) -> &'static str {
        match self {
            Self::BruteForce | Self::SmartBruteForce | Self::Hybrid => "Password not found within specified parameters",
            Self::Dictionary => "Password not found in dictionary",
            Self::RainbowTable => "Password not found in rainbow table",
            Self::Mask => "Password not found using mask pattern",
            Self::RuleBased => "Password not found using rule-based attack",
        }
    }
}

/// Controls how often progress snapshots are emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum OptimizationLevel {
    Low,
    Medium,
    #[default]
    High,
    Extreme,
}

impl OptimizationLevel {
    /// A snapshot is emitted every `update_interval()` attempts.
    #[inline]
    pub fn update_interval(self) -> u64 {
        match self {
            Self::Low => 100,
            Self::Medium => 500,
            Self::High => 1000,
            Self::Extreme => 5000,
        }
    }
}

/// Advisory acceleration mode.
///
/// Only changes how many workers enumerate candidates; results are identical
/// in every mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum HardwareAcceleration {
    #[default]
    CpuOnly,
    GpuAssisted,
    HybridMode,
}

impl HardwareAcceleration {
    /// Number of workers to run for a configured thread count.
    pub fn effective_threads(self, threads: usize) -> usize {
        match self {
            Self::CpuOnly => threads,
            Self::GpuAssisted => (threads * 2).min(MAX_ASSISTED_THREAD_COUNT),
            Self::HybridMode => threads + HYBRID_EXTRA_THREADS,
        }
    }
}

/// Maps a password to key bytes. See [`crate::cipher::derive`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum DerivationMethod {
    /// One SHA-256 digest.
    #[default]
    #[strum(to_string = "sha256", serialize = "sha256-simple")]
    Sha256Simple,

    /// PBKDF2-HMAC-SHA256, fixed salt, 10 000 iterations.
    Pbkdf2,

    /// scrypt N=16384 r=8 p=1, fixed salt.
    Scrypt,

    /// 1000 chained SHA-256 rounds (not real Argon2).
    Argon2,

    /// 12 chained SHA-256 rounds (not real bcrypt).
    Bcrypt,
}

/// Progress snapshot handed to the progress callback.
///
/// Values are clamped on construction: progress lies in `[0, 1]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttackProgress {
    /// The candidate being tried when the snapshot was taken.
    pub current: String,

    /// Attempts made so far in this attack.
    pub attempts: u64,

    /// Fraction of the current phase's search space covered.
    pub progress: f64,

    /// Linear projection of the remaining time of the current phase.
    pub eta: Duration,

    /// False only on the final snapshot of an attack.
    pub running: bool,
}

impl AttackProgress {
    /// Creates a clamped snapshot.
    pub fn new(current: &str, attempts: u64, progress: f64, eta: Duration, running: bool) -> Self {
        let progress = if progress.is_finite() { progress.clamp(0.0, 1.0) } else { 0.0 };
        Self { current: current.to_owned(), attempts, progress, eta, running }
    }

    /// Remaining time in whole milliseconds.
    #[inline]
    pub fn eta_millis(&self) -> u64 {
        u64::try_from(self.eta.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Terminal outcome of one attack.
///
/// A password is present exactly when the attack succeeded; an error message
/// is present exactly when it did not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackResult {
    password: Option<String>,
    error: Option<String>,
    elapsed: Duration,
    attempts: u64,
}

impl AttackResult {
    /// Creates a successful result.
    #[inline]
    pub fn found(password: String, attempts: u64, elapsed: Duration) -> Self {
        Self { password: Some(password), error: None, elapsed, attempts }
    }

    /// Creates a failed result.
    #[inline]
    pub fn failed(message: impl Into<String>, attempts: u64, elapsed: Duration) -> Self {
        Self { password: None, error: Some(message.into()), elapsed, attempts }
    }

    #[inline]
    pub fn success(&self) -> bool {
        self.password.is_some()
    }

    #[inline]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    #[inline]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[inline]
    pub fn attempts(&self) -> u64 {
        self.attempts
    }
}
