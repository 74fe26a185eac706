//! Immutable description of one attack run.

use std::path::{Path, PathBuf};
use std::thread;

use crate::config::{
    DEFAULT_CHARSET, DEFAULT_CHUNK_SIZE, DEFAULT_MASK, DEFAULT_PASSWORD_LENGTH, DEFAULT_THREAD_COUNT, MAX_CHUNK_SIZE, MAX_PASSWORD_LENGTH, MAX_THREAD_COUNT, MIN_CHUNK_SIZE,
    MIN_PASSWORD_LENGTH, MIN_THREAD_COUNT,
};
use crate::target::Target;
use crate::types::{AttackKind, DerivationMethod, HardwareAcceleration, OptimizationLevel};

/// Everything an attack needs to know. Built through [`AttackConfigurationBuilder`],
/// which clamps every numeric field into its bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackConfiguration {
    kind: AttackKind,
    target: Option<Target>,
    max_password_length: usize,
    charset: String,
    dictionary: Option<PathBuf>,
    rainbow_table: Option<PathBuf>,
    rules: Option<PathBuf>,
    mask: String,
    threads: usize,
    chunk_size: usize,
    optimization: OptimizationLevel,
    acceleration: HardwareAcceleration,
    derivation: DerivationMethod,
    smart_patterns: bool,
    common_passwords_first: bool,
    skip_weak_combinations: bool,
    verify_plaintext: bool,
}

impl AttackConfiguration {
    pub fn builder(kind: AttackKind) -> AttackConfigurationBuilder {
        AttackConfigurationBuilder::new(kind)
    }

    #[inline]
    pub fn kind(&self) -> AttackKind {
        self.kind
    }

    #[inline]
    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    #[inline]
    pub fn max_password_length(&self) -> usize {
        self.max_password_length
    }

    #[inline]
    pub fn charset(&self) -> &str {
        &self.charset
    }

    #[inline]
    pub fn dictionary(&self) -> Option<&Path> {
        self.dictionary.as_deref()
    }

    #[inline]
    pub fn rainbow_table(&self) -> Option<&Path> {
        self.rainbow_table.as_deref()
    }

    #[inline]
    pub fn rules(&self) -> Option<&Path> {
        self.rules.as_deref()
    }

    #[inline]
    pub fn mask(&self) -> &str {
        &self.mask
    }

    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Worker count after applying the acceleration mode.
    #[inline]
    pub fn effective_threads(&self) -> usize {
        self.acceleration.effective_threads(self.threads)
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[inline]
    pub fn optimization(&self) -> OptimizationLevel {
        self.optimization
    }

    #[inline]
    pub fn acceleration(&self) -> HardwareAcceleration {
        self.acceleration
    }

    #[inline]
    pub fn derivation(&self) -> DerivationMethod {
        self.derivation
    }

    #[inline]
    pub fn smart_patterns(&self) -> bool {
        self.smart_patterns
    }

    #[inline]
    pub fn common_passwords_first(&self) -> bool {
        self.common_passwords_first
    }

    #[inline]
    pub fn skip_weak_combinations(&self) -> bool {
        self.skip_weak_combinations
    }

    #[inline]
    pub fn verify_plaintext(&self) -> bool {
        self.verify_plaintext
    }

    /// The same configuration running a different strategy.
    pub(crate) fn with_kind(&self, kind: AttackKind) -> Self {
        Self { kind, ..self.clone() }
    }

    /// Hybrid attacks force both smart brute force features on.
    pub(crate) fn with_smart_features(&self) -> Self {
        Self { smart_patterns: true, common_passwords_first: true, ..self.clone() }
    }
}

impl Default for AttackConfiguration {
    fn default() -> Self {
        AttackConfigurationBuilder::new(AttackKind::default()).build()
    }
}

/// Builder for [`AttackConfiguration`].
#[derive(Clone, Debug)]
pub struct AttackConfigurationBuilder {
    inner: AttackConfiguration,
}

impl AttackConfigurationBuilder {
    pub fn new(kind: AttackKind) -> Self {
        let threads = thread::available_parallelism().map_or(DEFAULT_THREAD_COUNT, usize::from);

        Self {
            inner: AttackConfiguration {
                kind,
                target: None,
                max_password_length: DEFAULT_PASSWORD_LENGTH,
                charset: DEFAULT_CHARSET.to_owned(),
                dictionary: None,
                rainbow_table: None,
                rules: None,
                mask: DEFAULT_MASK.to_owned(),
                threads,
                chunk_size: DEFAULT_CHUNK_SIZE,
                optimization: OptimizationLevel::default(),
                acceleration: HardwareAcceleration::default(),
                derivation: DerivationMethod::default(),
                smart_patterns: true,
                common_passwords_first: true,
                skip_weak_combinations: false,
                verify_plaintext: false,
            },
        }
    }

    #[must_use]
    pub fn target(mut self, target: Target) -> Self {
        self.inner.target = Some(target);
        self
    }

    #[must_use]
    pub fn max_password_length(mut self, length: usize) -> Self {
        self.inner.max_password_length = length;
        self
    }

    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.inner.charset = charset.into();
        self
    }

    #[must_use]
    pub fn dictionary(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner.dictionary = Some(path.into());
        self
    }

    #[must_use]
    pub fn rainbow_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner.rainbow_table = Some(path.into());
        self
    }

    #[must_use]
    pub fn rules(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner.rules = Some(path.into());
        self
    }

    #[must_use]
    pub fn mask(mut self, mask: impl Into<String>) -> Self {
        self.inner.mask = mask.into();
        self
    }

    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.inner.threads = threads;
        self
    }

    #[must_use]
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.inner.chunk_size = size;
        self
    }

    #[must_use]
    pub fn optimization(mut self, level: OptimizationLevel) -> Self {
        self.inner.optimization = level;
        self
    }

    #[must_use]
    pub fn acceleration(mut self, mode: HardwareAcceleration) -> Self {
        self.inner.acceleration = mode;
        self
    }

    #[must_use]
    pub fn derivation(mut self, method: DerivationMethod) -> Self {
        self.inner.derivation = method;
        self
    }

    #[must_use]
    pub fn smart_patterns(mut self, enabled: bool) -> Self {
        self.inner.smart_patterns = enabled;
        self
    }

    #[must_use]
    pub fn common_passwords_first(mut self, enabled: bool) -> Self {
        self.inner.common_passwords_first = enabled;
        self
    }

    #[must_use]
    pub fn skip_weak_combinations(mut self, enabled: bool) -> Self {
        self.inner.skip_weak_combinations = enabled;
        self
    }

    #[must_use]
    pub fn verify_plaintext(mut self, enabled: bool) -> Self {
        self.inner.verify_plaintext = enabled;
        self
    }

    /// Clamps every field into its bounds and freezes the configuration.
    pub fn build(self) -> AttackConfiguration {
        let mut config = self.inner;

        config.max_password_length = config.max_password_length.clamp(MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH);
        config.threads = config.threads.clamp(MIN_THREAD_COUNT, MAX_THREAD_COUNT);
        config.chunk_size = config.chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE);
        if config.charset.is_empty() {
            config.charset = DEFAULT_CHARSET.to_owned();
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_are_clamped() {
        let config = AttackConfiguration::builder(AttackKind::BruteForce).max_password_length(0).threads(100).chunk_size(1).charset("").build();

        assert_eq!(config.max_password_length(), MIN_PASSWORD_LENGTH);
        assert_eq!(config.threads(), MAX_THREAD_COUNT);
        assert_eq!(config.chunk_size(), MIN_CHUNK_SIZE);
        assert_eq!(config.charset(), DEFAULT_CHARSET);

        let config = AttackConfiguration::builder(AttackKind::BruteForce).max_password_length(99).threads(0).chunk_size(usize::MAX).build();
        assert_eq!(config.max_password_length(), MAX_PASSWORD_LENGTH);
        assert_eq!(config.threads(), MIN_THREAD_COUNT);
        assert_eq!(config.chunk_size(), MAX_CHUNK_SIZE);
    }

    #[test]
    fn test_defaults() {
        let config = AttackConfiguration::default();

        assert_eq!(config.kind(), AttackKind::BruteForce);
        assert_eq!(config.max_password_length(), 8);
        assert_eq!(config.mask(), DEFAULT_MASK);
        assert!(config.smart_patterns());
        assert!(config.common_passwords_first());
        assert!(!config.skip_weak_combinations());
        assert!((MIN_THREAD_COUNT..=MAX_THREAD_COUNT).contains(&config.threads()));
    }

    #[test]
    fn test_effective_threads() {
        let config = AttackConfiguration::builder(AttackKind::Mask).threads(4).acceleration(HardwareAcceleration::HybridMode).build();
        assert_eq!(config.effective_threads(), 6);
    }

    #[test]
    fn test_smart_features() {
        let config = AttackConfiguration::builder(AttackKind::Hybrid).smart_patterns(false).common_passwords_first(false).build();
        let forced = config.with_smart_features().with_kind(AttackKind::SmartBruteForce);

        assert_eq!(forced.kind(), AttackKind::SmartBruteForce);
        assert!(forced.smart_patterns());
        assert!(forced.common_passwords_first());
    }
}
