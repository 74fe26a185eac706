//! Per-attack bookkeeping: attempts, phases, progress snapshots and
//! cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::trial::TrialDecryptor;
use crate::types::AttackProgress;

/// Shared cancellation flag.
///
/// Cloning yields a handle to the same flag; strategies poll it before every
/// candidate.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of trying one candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Hit,
    Miss,
    Cancelled,
}

/// Callback receiving progress snapshots.
pub type ProgressFn<'a> = &'a (dyn Fn(&AttackProgress) + Sync);

/// A contiguous stretch of enumeration with its own denominator.
#[derive(Clone, Copy, Debug)]
struct Phase {
    total: u128,
    first_attempt: u64,
    started: Instant,
}

/// State of one running attack, shared by every worker of that attack.
pub struct Session<'a> {
    trial: TrialDecryptor,
    token: CancelToken,
    on_progress: ProgressFn<'a>,
    interval: u64,
    attempts: AtomicU64,
    phase: Phase,
}

impl<'a> Session<'a> {
    pub fn new(trial: TrialDecryptor, token: CancelToken, interval: u64, on_progress: ProgressFn<'a>) -> Self {
        Self { trial, token, on_progress, interval: interval.max(1), attempts: AtomicU64::new(0), phase: Phase { total: 0, first_attempt: 0, started: Instant::now() } }
    }

    /// Starts a new phase covering `total` candidates.
    ///
    /// Attempts keep accumulating; progress and ETA restart from zero.
    pub fn begin_phase(&mut self, total: u128) {
        self.phase = Phase { total, first_attempt: self.attempts(), started: Instant::now() };
    }

    #[inline]
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    #[inline]
    pub fn trial(&self) -> &TrialDecryptor {
        &self.trial
    }

    /// Tries one candidate, unless the attack was cancelled.
    #[inline]
    pub fn step(&self, candidate: &str) -> Step {
        self.advance(candidate, true)
    }

    /// Counts an entry that yields no candidate, such as a malformed table line.
    #[inline]
    pub fn skip(&self, entry: &str) -> Step {
        self.advance(entry, false)
    }

    fn advance(&self, current: &str, decrypt: bool) -> Step {
        if self.token.is_cancelled() {
            return Step::Cancelled;
        }

        let attempts = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let hit = decrypt && self.trial.try_decrypt(current);

        if attempts % self.interval == 0 {
            (self.on_progress)(&self.snapshot(current, attempts, true));
        }

        if hit { Step::Hit } else { Step::Miss }
    }

    /// Emits the terminal snapshot.
    pub fn finish(&self, current: &str) {
        (self.on_progress)(&self.snapshot(current, self.attempts(), false));
    }

    fn snapshot(&self, current: &str, attempts: u64, running: bool) -> AttackProgress {
        let done = attempts.saturating_sub(self.phase.first_attempt);
        let (progress, eta) = estimate(done, self.phase.total, self.phase.started.elapsed());
        AttackProgress::new(current, attempts, progress, eta, running)
    }
}

/// Fraction of `total` covered by `done`, and the linear projection of the
/// time the rest will take.
fn estimate(done: u64, total: u128, elapsed: Duration) -> (f64, Duration) {
    if done == 0 || total == 0 {
        return (0.0, Duration::ZERO);
    }

    let progress = done as f64 / total as f64;
    let remaining = total.saturating_sub(u128::from(done)) as f64;
    let per_attempt = elapsed.as_secs_f64() / done as f64;
    let eta = Duration::try_from_secs_f64(remaining * per_attempt).unwrap_or(Duration::MAX);

    (progress, eta)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::cipher::Registry;
    use crate::types::DerivationMethod;

    fn empty_trial() -> TrialDecryptor {
        TrialDecryptor::new(vec![0u8; 16], Arc::new(Registry::new()), DerivationMethod::Sha256Simple)
    }

    #[test]
    fn test_estimate() {
        let (progress, eta) = estimate(0, 100, Duration::from_secs(5));
        assert!(progress.abs() < f64::EPSILON);
        assert_eq!(eta, Duration::ZERO);

        let (progress, eta) = estimate(25, 100, Duration::from_secs(5));
        assert!((progress - 0.25).abs() < 1e-9);
        assert!((eta.as_secs_f64() - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_snapshot_cadence() {
        let seen = Mutex::new(Vec::new());
        let callback = |p: &AttackProgress| seen.lock().unwrap().push(p.clone());

        {
            let mut session = Session::new(empty_trial(), CancelToken::new(), 100, &callback);
            session.begin_phase(250);

            for _ in 0..250 {
                assert_eq!(session.step("x"), Step::Miss);
            }
            session.finish("x");
        }

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].attempts, 100);
        assert!((seen[1].progress - 0.8).abs() < 1e-9);
        assert!(!seen[2].running);
        assert!((seen[2].progress - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cancellation_stops_counting() {
        let callback = |_: &AttackProgress| {};
        let token = CancelToken::new();
        let session = Session::new(empty_trial(), token.clone(), 1000, &callback);

        assert_eq!(session.step("a"), Step::Miss);
        token.cancel();
        assert_eq!(session.step("b"), Step::Cancelled);
        assert_eq!(session.attempts(), 1);
    }

    #[test]
    fn test_skip_counts_without_trying() {
        let callback = |_: &AttackProgress| {};
        let mut session = Session::new(empty_trial(), CancelToken::new(), 1000, &callback);
        session.begin_phase(2);

        assert_eq!(session.skip("malformed"), Step::Miss);
        assert_eq!(session.attempts(), 1);
        assert!((session.snapshot("", session.attempts(), false).progress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_phases_keep_attempts() {
        let callback = |_: &AttackProgress| {};
        let mut session = Session::new(empty_trial(), CancelToken::new(), 1000, &callback);

        session.begin_phase(2);
        session.step("a");
        session.step("b");
        session.begin_phase(10);
        session.step("c");

        assert_eq!(session.attempts(), 3);
        let snapshot = session.snapshot("c", session.attempts(), true);
        assert!((snapshot.progress - 0.1).abs() < 1e-9);
    }
}
