//! Word mangling rules.
//!
//! One rule per line: `:` identity, `$X` append `X`, `^X` prepend `X`, `u`
//! uppercase, `l` lowercase, `c` capitalize, `r` reverse, `d` duplicate.
//! Anything else leaves the word unchanged.

use std::path::Path;

use anyhow::Result;
use tracing::warn;

use super::wordlist;
use crate::config::{DEFAULT_RULES, RULE_COMMENT_PREFIX};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    Identity,
    Append(String),
    Prepend(String),
    Upper,
    Lower,
    Capitalize,
    Reverse,
    Duplicate,
}

impl Rule {
    pub fn parse(line: &str) -> Self {
        if let Some(suffix) = line.strip_prefix('$') {
            return Self::Append(suffix.to_owned());
        }
        if let Some(prefix) = line.strip_prefix('^') {
            return Self::Prepend(prefix.to_owned());
        }

        match line {
            "u" => Self::Upper,
            "l" => Self::Lower,
            "c" => Self::Capitalize,
            "r" => Self::Reverse,
            "d" => Self::Duplicate,
            _ => Self::Identity,
        }
    }

    pub fn apply(&self, word: &str) -> String {
        match self {
            Self::Identity => word.to_owned(),
            Self::Append(suffix) => format!("{word}{suffix}"),
            Self::Prepend(prefix) => format!("{prefix}{word}"),
            Self::Upper => word.to_uppercase(),
            Self::Lower => word.to_lowercase(),
            Self::Capitalize => capitalize(word),
            Self::Reverse => word.chars().rev().collect(),
            Self::Duplicate => word.repeat(2),
        }
    }
}

/// Lowercases `word` and uppercases its first character.
pub fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[inline]
fn is_rule_line(line: &str) -> bool {
    !line.trim().is_empty() && !line.starts_with(RULE_COMMENT_PREFIX)
}

/// Streams a rule file, skipping blank and `#` comment lines.
///
/// Invalid UTF-8 is replaced rather than rejected. The default rules are used
/// only when the file cannot be read at all.
pub fn load_rules(path: &Path, capacity: usize) -> Vec<Rule> {
    let rules = wordlist::lines(path, capacity).and_then(|lines| {
        lines
            .filter_map(|line| match line {
                Ok(line) => is_rule_line(&line).then(|| Ok(Rule::parse(&line))),
                Err(e) => Some(Err(e)),
            })
            .collect::<Result<Vec<_>>>()
    });

    match rules {
        Ok(rules) => rules,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "rule file unreadable, using default rules");
            DEFAULT_RULES.iter().copied().map(Rule::parse).collect()
        }
    }
}
