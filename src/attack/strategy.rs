//! Search strategies.
//!
//! Every strategy turns the configuration into a lazy candidate sequence and
//! drives it through the [`Session`]. File-driven strategies stream their
//! word lists and run on the calling thread; keyspace and mask enumeration
//! fan out over a rayon pool when more than one worker is configured.

use std::ops::ControlFlow;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rayon::ThreadPoolBuilder;
use rayon::iter::{ParallelBridge, ParallelIterator};
use tracing::debug;

use super::configuration::AttackConfiguration;
use super::session::{Session, Step};
use super::{candidates, rules, wordlist};
use crate::config::{COMMON_PASSWORDS, SMART_SUFFIXES};
use crate::target::file_exists;
use crate::types::AttackKind;

/// How a strategy ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Found(String),
    Exhausted,
    Cancelled,
}

/// Rejects configurations whose input files are missing.
pub fn check(config: &AttackConfiguration) -> Result<()> {
    match config.kind() {
        AttackKind::Dictionary | AttackKind::Hybrid => {
            let Some(dictionary) = config.dictionary() else {
                bail!("Dictionary file not specified");
            };
            if !file_exists(dictionary) {
                bail!("Dictionary file not found");
            }
        }

        AttackKind::RainbowTable => {
            let Some(table) = config.rainbow_table() else {
                bail!("Rainbow table file not specified");
            };
            if !file_exists(table) {
                bail!("Rainbow table file not found");
            }
        }

        AttackKind::RuleBased => {
            let Some(dictionary) = config.dictionary() else {
                bail!("Dictionary file required for rule-based attack");
            };
            let Some(rules) = config.rules() else {
                bail!("Rule file not specified");
            };
            if !file_exists(dictionary) || !file_exists(rules) {
                bail!("Dictionary or rule file not found");
            }
        }

        AttackKind::BruteForce | AttackKind::Mask | AttackKind::SmartBruteForce => {}
    }

    Ok(())
}

/// Runs the strategy selected by `config`.
pub fn run(session: &mut Session<'_>, config: &AttackConfiguration) -> Result<Outcome> {
    match config.kind() {
        AttackKind::BruteForce => brute_force(session, config),
        AttackKind::Dictionary => dictionary(session, config),
        AttackKind::RainbowTable => rainbow_table(session, config),
        AttackKind::Mask => mask(session, config),
        AttackKind::RuleBased => rule_based(session, config),
        AttackKind::SmartBruteForce => smart_brute_force(session, config),
        AttackKind::Hybrid => {
            let outcome = dictionary(session, config)?;
            if outcome != Outcome::Exhausted {
                return Ok(outcome);
            }

            debug!("dictionary exhausted, switching to smart brute force");
            run(session, &config.with_smart_features().with_kind(AttackKind::SmartBruteForce))
        }
    }
}

fn brute_force(session: &mut Session<'_>, config: &AttackConfiguration) -> Result<Outcome> {
    let charset = config.charset();
    session.begin_phase(candidates::brute_force_total(charset.chars().count(), config.max_password_length()));
    parallel(session, candidates::brute_force(charset, config.max_password_length()), config.effective_threads())
}

fn mask(session: &mut Session<'_>, config: &AttackConfiguration) -> Result<Outcome> {
    let generator = candidates::mask(config.mask());
    session.begin_phase(generator.total());
    parallel(session, generator, config.effective_threads())
}

fn dictionary(session: &mut Session<'_>, config: &AttackConfiguration) -> Result<Outcome> {
    let path = required(config.dictionary(), "Dictionary file not specified")?;
    session.begin_phase(u128::from(wordlist::count_lines(path, config.chunk_size())?));
    sequential(session, words(path, config.chunk_size())?)
}

/// Only the password column is used; the hash column is never looked at.
/// Lines without a password still count as attempts.
fn rainbow_table(session: &mut Session<'_>, config: &AttackConfiguration) -> Result<Outcome> {
    let path = required(config.rainbow_table(), "Rainbow table file not specified")?;
    session.begin_phase(u128::from(wordlist::count_lines(path, config.chunk_size())?));

    for line in wordlist::lines(path, config.chunk_size())? {
        let line = line?;
        let flow = match wordlist::table_password(&line) {
            Some(password) => probe(session, password.to_owned()),
            None => skip(session, &line),
        };
        if let ControlFlow::Break(outcome) = flow {
            return Ok(outcome);
        }
    }

    Ok(Outcome::Exhausted)
}

fn rule_based(session: &mut Session<'_>, config: &AttackConfiguration) -> Result<Outcome> {
    let dictionary = required(config.dictionary(), "Dictionary file required for rule-based attack")?;
    let rules = rules::load_rules(required(config.rules(), "Rule file not specified")?, config.chunk_size());

    let word_count = wordlist::count_lines(dictionary, config.chunk_size())?;
    session.begin_phase(u128::from(word_count) * rules.len() as u128);

    for word in words(dictionary, config.chunk_size())? {
        let word = word?;
        for rule in &rules {
            if let ControlFlow::Break(outcome) = probe(session, rule.apply(&word)) {
                return Ok(outcome);
            }
        }
    }

    Ok(Outcome::Exhausted)
}

fn smart_brute_force(session: &mut Session<'_>, config: &AttackConfiguration) -> Result<Outcome> {
    if config.common_passwords_first() {
        let common = common_candidates(config.smart_patterns());
        debug!(candidates = common.len(), "trying common passwords");

        session.begin_phase(common.len() as u128);
        let outcome = sequential(session, common.into_iter().map(Ok))?;
        if outcome != Outcome::Exhausted {
            return Ok(outcome);
        }

        debug!("common passwords exhausted, falling back to brute force");
    }

    brute_force(session, config)
}

/// The common password list, each followed by its smart variants when enabled.
fn common_candidates(smart_patterns: bool) -> Vec<String> {
    let mut list = Vec::new();

    for &password in COMMON_PASSWORDS {
        list.push(password.to_owned());
        if !smart_patterns {
            continue;
        }

        let capitalized = rules::capitalize(password);
        if capitalized != password {
            list.push(capitalized);
        }
        list.extend(SMART_SUFFIXES.iter().map(|suffix| format!("{password}{suffix}")));
    }

    list
}

fn required<'a>(path: Option<&'a Path>, message: &'static str) -> Result<&'a Path> {
    path.context(message)
}

/// Trimmed lines of a word list. Blank lines are kept and tried as the empty
/// password, so attempts line up with the line count.
fn words(path: &Path, capacity: usize) -> Result<impl Iterator<Item = Result<String>>> {
    Ok(wordlist::lines(path, capacity)?.map(|line| line.map(|line| line.trim().to_owned())))
}

fn probe(session: &Session<'_>, candidate: String) -> ControlFlow<Outcome> {
    match session.step(&candidate) {
        Step::Hit => ControlFlow::Break(Outcome::Found(candidate)),
        Step::Miss => ControlFlow::Continue(()),
        Step::Cancelled => ControlFlow::Break(Outcome::Cancelled),
    }
}

fn skip(session: &Session<'_>, entry: &str) -> ControlFlow<Outcome> {
    match session.skip(entry) {
        Step::Cancelled => ControlFlow::Break(Outcome::Cancelled),
        Step::Hit | Step::Miss => ControlFlow::Continue(()),
    }
}

fn sequential<I>(session: &Session<'_>, candidates: I) -> Result<Outcome>
where
    I: IntoIterator<Item = Result<String>>,
{
    for candidate in candidates {
        if let ControlFlow::Break(outcome) = probe(session, candidate?) {
            return Ok(outcome);
        }
    }

    Ok(Outcome::Exhausted)
}

/// Spreads `candidates` over `threads` workers. The first worker to see a hit
/// or the cancellation wins; the others stop at their next candidate.
fn parallel<I>(session: &Session<'_>, candidates: I, threads: usize) -> Result<Outcome>
where
    I: Iterator<Item = String> + Send,
{
    if threads <= 1 {
        return sequential(session, candidates.map(Ok));
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("keyhound-worker-{index}"))
        .build()
        .context("failed to start worker pool")?;

    let outcome = pool.install(|| candidates.par_bridge().find_map_any(|candidate| probe(session, candidate).break_value()));

    Ok(outcome.unwrap_or(Outcome::Exhausted))
}
