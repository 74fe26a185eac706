//! # Attack Engine
//!
//! Runs one password recovery attack at a time against a [`Target`].
//!
//! ## Lifecycle
//!
//! 1. **Validation**: the target and every input file the strategy needs
//!    must exist; otherwise the attack fails before any candidate is tried
//! 2. **Header sample**: the first bytes of the target are read once and
//!    shared by every candidate
//! 3. **Enumeration**: the strategy feeds candidates to the trial decryptor
//!    until one is accepted, the space is exhausted, or [`Engine::stop`] is
//!    called
//! 4. **Result**: exactly one [`AttackResult`] is returned, whatever
//!    happened, including panics inside a strategy
//!
//! ## Progress
//!
//! The progress callback runs on the attack's own threads, every
//! [`OptimizationLevel::update_interval`](crate::types::OptimizationLevel::update_interval)
//! attempts and once more when the attack ends. Keep it cheap.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use tracing::{error, info, warn};

use crate::analysis::{self, EncryptionAnalysis};
use crate::cipher::{CipherDescriptor, Registry, shared_registry};
use crate::config::HEADER_SAMPLE_SIZE;
use crate::target::Target;
use crate::trial::TrialDecryptor;
use crate::types::AttackResult;

pub mod candidates;
pub mod configuration;
pub mod rules;
pub mod session;
pub mod strategy;
pub mod wordlist;

pub use configuration::{AttackConfiguration, AttackConfigurationBuilder};
pub use session::{CancelToken, ProgressFn};

use session::Session;
use strategy::Outcome;

const CANCELLED: &str = "Attack cancelled";
const UNKNOWN_ERROR: &str = "Unknown error occurred";
const ALREADY_RUNNING: &str = "An attack is already running";

/// Drives attacks against targets using a cipher registry.
pub struct Engine {
    registry: Arc<Registry>,
    /// Cancel token of the running attack, if any.
    active: Mutex<Option<CancelToken>>,
}

impl Engine {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry, active: Mutex::new(None) }
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.active().is_some()
    }

    /// Requests cancellation of the running attack.
    ///
    /// The attack notices before its next candidate. Without a running attack
    /// this does nothing.
    pub fn stop(&self) {
        if let Some(token) = self.active().as_ref() {
            info!("cancellation requested");
            token.cancel();
        }
    }

    #[inline]
    pub fn analyze(&self, target: &Target) -> EncryptionAnalysis {
        analysis::analyze(target)
    }

    /// Registry descriptors matching an analysis, most likely first.
    pub fn suggest(&self, analysis: &EncryptionAnalysis) -> Vec<&CipherDescriptor> {
        self.registry.suggest(analysis.file_size, analysis.block_alignment, &analysis.possible_modes, &analysis.possible_paddings)
    }

    /// Runs one attack to completion.
    ///
    /// Blocks the calling thread. While an attack is running, further calls
    /// fail immediately without affecting it.
    pub fn run(&self, config: &AttackConfiguration, on_progress: ProgressFn<'_>) -> AttackResult {
        let Some(active) = ActiveRun::start(self) else {
            warn!("attack rejected, another one is running");
            return AttackResult::failed(ALREADY_RUNNING, 0, Duration::ZERO);
        };

        let result = self.execute(config, active.token.clone(), on_progress);
        drop(active);

        match result.password() {
            Some(_) => info!(attempts = result.attempts(), elapsed = ?result.elapsed(), "password found"),
            None => info!(attempts = result.attempts(), elapsed = ?result.elapsed(), reason = result.error().unwrap_or_default(), "attack failed"),
        }

        result
    }

    fn execute(&self, config: &AttackConfiguration, token: CancelToken, on_progress: ProgressFn<'_>) -> AttackResult {
        let started = Instant::now();

        let header = match prepare(config) {
            Ok(header) => header,
            Err(e) => {
                warn!(error = %e, "attack configuration rejected");
                return AttackResult::failed(render(&e), 0, started.elapsed());
            }
        };

        info!(
            kind = %config.kind(),
            threads = config.effective_threads(),
            derivation = %config.derivation(),
            header = header.len(),
            "starting attack"
        );

        let trial = TrialDecryptor::new(header, Arc::clone(&self.registry), config.derivation())
            .skip_weak(config.skip_weak_combinations())
            .verify_plaintext(config.verify_plaintext());

        let mut session = Session::new(trial, token, config.optimization().update_interval(), on_progress);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy::run(&mut session, config)));

        let attempts = session.attempts();
        let elapsed = started.elapsed();

        let result = match outcome {
            Ok(Ok(Outcome::Found(password))) => AttackResult::found(password, attempts, elapsed),
            Ok(Ok(Outcome::Exhausted)) => AttackResult::failed(config.kind().exhausted_message(), attempts, elapsed),
            Ok(Ok(Outcome::Cancelled)) => AttackResult::failed(CANCELLED, attempts, elapsed),
            Ok(Err(e)) => AttackResult::failed(render(&e), attempts, elapsed),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(panic = %message, "attack panicked");
                AttackResult::failed(message, attempts, elapsed)
            }
        };

        let current = result.password().unwrap_or_default();
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| session.finish(current))) {
            error!(panic = %panic_message(payload.as_ref()), "progress callback panicked");
        }

        result
    }

    fn active(&self) -> MutexGuard<'_, Option<CancelToken>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks an attack as running until dropped, unwinding included.
///
/// Every run gets a fresh token, so a late [`Engine::stop`] can only reach
/// the attack it was aimed at.
struct ActiveRun<'a> {
    engine: &'a Engine,
    token: CancelToken,
}

impl<'a> ActiveRun<'a> {
    fn start(engine: &'a Engine) -> Option<Self> {
        let mut active = engine.active();
        if active.is_some() {
            return None;
        }

        let token = CancelToken::new();
        *active = Some(token.clone());
        Some(Self { engine, token })
    }
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        *self.engine.active() = None;
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(shared_registry())
    }
}

/// Validates the configuration and reads the header sample.
fn prepare(config: &AttackConfiguration) -> Result<Vec<u8>> {
    let Some(target) = config.target() else {
        bail!("Target file not specified");
    };
    if !target.exists() {
        bail!("Target file not found");
    }

    let header = target.read_prefix(HEADER_SAMPLE_SIZE)?;
    if header.is_empty() {
        bail!("Target file is empty");
    }

    strategy::check(config)?;

    Ok(header)
}

fn render(error: &anyhow::Error) -> String {
    let message = format!("{error:#}");
    if message.is_empty() { UNKNOWN_ERROR.to_owned() } else { message }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_owned())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;

    use tempfile::tempdir;

    use super::*;
    use crate::cipher::{Algorithm, Mode, Padding, derive_key};
    use crate::types::{AttackKind, AttackProgress, DerivationMethod, OptimizationLevel};

    fn gcm_only() -> Arc<Registry> {
        let mut registry = Registry::new();
        registry.register(CipherDescriptor::new("AES", Algorithm::Aes, &[Mode::Gcm], &[Padding::None], 16, &[16]).unwrap());
        Arc::new(registry)
    }

    /// A target only `password` opens.
    fn sealed(password: &str) -> Target {
        let registry = gcm_only();
        let aes = registry.lookup("aes").unwrap();
        let key = derive_key(password.as_bytes(), 16, DerivationMethod::Sha256Simple).unwrap();
        Target::bytes(aes.encrypt(key.expose_secret(), Mode::Gcm, Padding::None, b"attack at dawn").unwrap())
    }

    fn silent(_: &AttackProgress) {}

    #[test]
    fn test_dictionary_attack() {
        let dir = tempdir().unwrap();
        let dictionary = dir.path().join("words.txt");
        fs::write(&dictionary, "foo\nbar\nbaz\n").unwrap();

        let config = AttackConfiguration::builder(AttackKind::Dictionary).target(sealed("bar")).dictionary(&dictionary).build();
        let result = Engine::new(gcm_only()).run(&config, &silent);

        assert!(result.success());
        assert_eq!(result.password(), Some("bar"));
        assert_eq!(result.attempts(), 2);
    }

    #[test]
    fn test_rainbow_table_attack() {
        let dir = tempdir().unwrap();
        let table = dir.path().join("table.txt");
        fs::write(&table, "5f4d:foo\nmalformed\n9b8e:bar\n").unwrap();

        let config = AttackConfiguration::builder(AttackKind::RainbowTable).target(sealed("bar")).rainbow_table(&table).build();
        let result = Engine::new(gcm_only()).run(&config, &silent);

        // The malformed line counts as an attempt.
        assert_eq!(result.password(), Some("bar"));
        assert_eq!(result.attempts(), 3);
    }

    #[test]
    fn test_blank_lines_complete_progress() {
        let dir = tempdir().unwrap();
        let dictionary = dir.path().join("words.txt");
        fs::write(&dictionary, "foo\n\n\nbar\n").unwrap();

        let last = Mutex::new(None);
        let on_progress = |progress: &AttackProgress| *last.lock().unwrap() = Some(progress.clone());

        let config = AttackConfiguration::builder(AttackKind::Dictionary).target(sealed("unreachable")).dictionary(&dictionary).build();
        let result = Engine::new(gcm_only()).run(&config, &on_progress);

        assert_eq!(result.error(), Some("Password not found in dictionary"));
        assert_eq!(result.attempts(), 4);

        let last = last.into_inner().unwrap().unwrap();
        assert!(!last.running);
        assert!((last.progress - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rule_based_attack() {
        let dir = tempdir().unwrap();
        let dictionary = dir.path().join("words.txt");
        let rules = dir.path().join("best.rule");
        fs::write(&dictionary, "pass\n").unwrap();
        fs::write(&rules, "# reversed last\n$1\nr\n").unwrap();

        let config = AttackConfiguration::builder(AttackKind::RuleBased).target(sealed("ssap")).dictionary(&dictionary).rules(&rules).build();
        let result = Engine::new(gcm_only()).run(&config, &silent);

        assert_eq!(result.password(), Some("ssap"));
        assert_eq!(result.attempts(), 2);
    }

    #[test]
    fn test_mask_attack() {
        let config = AttackConfiguration::builder(AttackKind::Mask).target(sealed("42")).mask("?d?d").threads(1).build();
        let result = Engine::new(gcm_only()).run(&config, &silent);

        assert_eq!(result.password(), Some("42"));
        assert_eq!(result.attempts(), 43);
    }

    #[test]
    fn test_parallel_mask_attack() {
        let config = AttackConfiguration::builder(AttackKind::Mask).target(sealed("k7")).mask("?l?d").threads(4).build();
        let result = Engine::new(gcm_only()).run(&config, &silent);

        assert_eq!(result.password(), Some("k7"));
        assert!((1..=260).contains(&result.attempts()));
    }

    #[test]
    fn test_brute_force_exhausted() {
        let config = AttackConfiguration::builder(AttackKind::BruteForce).target(sealed("zz")).charset("a").max_password_length(2).threads(1).build();
        let result = Engine::new(gcm_only()).run(&config, &silent);

        assert!(!result.success());
        assert_eq!(result.error(), Some("Password not found within specified parameters"));
        assert_eq!(result.attempts(), 2);
    }

    #[test]
    fn test_smart_brute_force_without_common_passwords() {
        let config = AttackConfiguration::builder(AttackKind::SmartBruteForce)
            .target(sealed("ba"))
            .charset("ab")
            .max_password_length(2)
            .common_passwords_first(false)
            .threads(1)
            .build();
        let result = Engine::new(gcm_only()).run(&config, &silent);

        assert_eq!(result.password(), Some("ba"));
        assert_eq!(result.attempts(), 5);
    }

    #[test]
    fn test_hybrid_falls_back_to_common_passwords() {
        let dir = tempdir().unwrap();
        let dictionary = dir.path().join("words.txt");
        fs::write(&dictionary, "nothing\n").unwrap();

        let config = AttackConfiguration::builder(AttackKind::Hybrid)
            .target(sealed("letmein"))
            .dictionary(&dictionary)
            .smart_patterns(false)
            .common_passwords_first(false)
            .threads(1)
            .build();
        let result = Engine::new(gcm_only()).run(&config, &silent);

        // One dictionary word, then the smart list where "letmein" is 16th.
        assert_eq!(result.password(), Some("letmein"));
        assert_eq!(result.attempts(), 17);
    }

    #[test]
    fn test_configuration_errors() {
        let engine = Engine::new(gcm_only());

        let config = AttackConfiguration::builder(AttackKind::BruteForce).build();
        assert_eq!(engine.run(&config, &silent).error(), Some("Target file not specified"));

        let dir = tempdir().unwrap();
        let config = AttackConfiguration::builder(AttackKind::BruteForce).target(Target::file(dir.path().join("missing.bin"))).build();
        assert_eq!(engine.run(&config, &silent).error(), Some("Target file not found"));

        let config = AttackConfiguration::builder(AttackKind::Dictionary).target(sealed("x")).build();
        let result = engine.run(&config, &silent);
        assert_eq!(result.error(), Some("Dictionary file not specified"));
        assert_eq!(result.attempts(), 0);

        let config = AttackConfiguration::builder(AttackKind::BruteForce).target(Target::bytes(Vec::new())).build();
        assert_eq!(engine.run(&config, &silent).error(), Some("Target file is empty"));

        assert!(!engine.is_running());
    }

    #[test]
    fn test_cancellation() {
        let engine = Engine::new(gcm_only());
        let snapshots = Mutex::new(Vec::new());
        let on_progress = |progress: &AttackProgress| {
            snapshots.lock().unwrap().push(progress.clone());
            if progress.running {
                engine.stop();
            }
        };

        let config = AttackConfiguration::builder(AttackKind::BruteForce)
            .target(sealed("unreachable"))
            .max_password_length(8)
            .optimization(OptimizationLevel::Low)
            .threads(1)
            .build();
        let result = engine.run(&config, &on_progress);

        assert!(!result.success());
        assert_eq!(result.error(), Some("Attack cancelled"));
        assert_eq!(result.attempts(), 100);
        assert!(!engine.is_running());

        let snapshots = snapshots.into_inner().unwrap();
        assert_eq!(snapshots.len(), 2);
        assert!(!snapshots[1].running);
        assert_eq!(snapshots[1].attempts, 100);
    }

    #[test]
    fn test_parallel_cancellation() {
        let engine = Engine::new(gcm_only());
        let on_progress = |progress: &AttackProgress| {
            if progress.running {
                engine.stop();
            }
        };

        let config = AttackConfiguration::builder(AttackKind::BruteForce)
            .target(sealed("unreachable"))
            .max_password_length(8)
            .optimization(OptimizationLevel::Low)
            .threads(4)
            .build();
        let result = engine.run(&config, &on_progress);

        assert_eq!(result.error(), Some("Attack cancelled"));
        assert!(result.attempts() >= 100);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_cancelled_run_does_not_leak_into_next() {
        let engine = Engine::new(gcm_only());
        let on_progress = |progress: &AttackProgress| {
            if progress.running {
                engine.stop();
            }
        };

        let config = AttackConfiguration::builder(AttackKind::Mask).target(sealed("zz")).mask("?l?l").optimization(OptimizationLevel::Low).threads(1).build();
        assert_eq!(engine.run(&config, &on_progress).error(), Some("Attack cancelled"));

        engine.stop();
        assert_eq!(engine.run(&config, &silent).password(), Some("zz"));
    }

    #[test]
    fn test_panicking_callback_is_contained() {
        let engine = Engine::new(gcm_only());
        let on_progress = |progress: &AttackProgress| {
            if !progress.running {
                panic!("sink closed");
            }
        };

        let config = AttackConfiguration::builder(AttackKind::Mask).target(sealed("7")).mask("?d").threads(1).build();
        let result = engine.run(&config, &on_progress);

        assert_eq!(result.password(), Some("7"));
        assert!(!engine.is_running());
        assert_eq!(engine.run(&config, &silent).password(), Some("7"));
    }

    #[test]
    fn test_single_attack_at_a_time() {
        let engine = Engine::new(gcm_only());
        let nested = Mutex::new(None);
        let config = AttackConfiguration::builder(AttackKind::Mask).target(sealed("zz")).mask("?l?l").optimization(OptimizationLevel::Low).threads(1).build();

        let on_progress = |progress: &AttackProgress| {
            let mut nested = nested.lock().unwrap();
            if progress.running && nested.is_none() {
                *nested = Some(engine.run(&config, &silent));
            }
        };

        let result = engine.run(&config, &on_progress);
        assert_eq!(result.password(), Some("zz"));

        let nested = nested.into_inner().unwrap().unwrap();
        assert_eq!(nested.error(), Some("An attack is already running"));
        assert_eq!(nested.attempts(), 0);
    }

    #[test]
    fn test_stop_without_attack_is_ignored() {
        let engine = Engine::new(gcm_only());
        engine.stop();

        let config = AttackConfiguration::builder(AttackKind::Mask).target(sealed("7")).mask("?d").threads(1).build();
        assert_eq!(engine.run(&config, &silent).password(), Some("7"));
    }

    #[test]
    fn test_suggest_from_analysis() {
        let engine = Engine::default();
        let analysis = engine.analyze(&Target::bytes(vec![0x5Au8; 64]));
        let suggested: Vec<&str> = engine.suggest(&analysis).iter().map(|descriptor| descriptor.name()).collect();

        assert_eq!(suggested.first(), Some(&"AES"));
        assert!(!suggested.contains(&"RC4"));
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&42u8), UNKNOWN_ERROR);
    }
}
