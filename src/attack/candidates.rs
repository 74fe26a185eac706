//! Lazy candidate generators for keyspace and mask attacks.
//!
//! Both are odometers: every position cycles through its alphabet, the
//! rightmost position fastest and the leftmost slowest. Generation is
//! iterative, so pattern length never affects stack depth.

use crate::config::{DIGITS, LOWERCASE, PRINTABLE, SPECIAL, UPPERCASE};

/// Every string whose `i`-th character is drawn from `alphabets[i]`.
#[derive(Clone, Debug)]
pub struct Product {
    alphabets: Vec<Vec<char>>,
    indices: Vec<usize>,
    done: bool,
}

impl Product {
    pub fn new(alphabets: Vec<Vec<char>>) -> Self {
        let done = alphabets.iter().any(Vec::is_empty);
        Self { indices: vec![0; alphabets.len()], alphabets, done }
    }

    /// Number of strings generated, saturating at `u128::MAX`.
    pub fn total(&self) -> u128 {
        self.alphabets.iter().fold(1u128, |total, alphabet| total.saturating_mul(alphabet.len() as u128))
    }
}

impl Iterator for Product {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        let candidate = self.indices.iter().zip(&self.alphabets).map(|(&i, alphabet)| alphabet[i]).collect();

        // Advance the odometer; a carry out of the leftmost position ends it.
        let mut position = self.indices.len();
        loop {
            if position == 0 {
                self.done = true;
                break;
            }
            position -= 1;
            self.indices[position] += 1;
            if self.indices[position] < self.alphabets[position].len() {
                break;
            }
            self.indices[position] = 0;
        }

        Some(candidate)
    }
}

/// Every string over `charset` of length 1 through `max_length`, shortest first.
pub fn brute_force(charset: &str, max_length: usize) -> impl Iterator<Item = String> + Send + 'static {
    let alphabet: Vec<char> = charset.chars().collect();
    (1..=max_length).flat_map(move |length| Product::new(vec![alphabet.clone(); length]))
}

/// `Σ |charset|^len` for `len` in `1..=max_length`, saturating.
pub fn brute_force_total(charset_size: usize, max_length: usize) -> u128 {
    let size = charset_size as u128;
    (1..=max_length).fold(0u128, |total, length| {
        let count = u32::try_from(length).ok().and_then(|exp| size.checked_pow(exp)).unwrap_or(u128::MAX);
        total.saturating_add(count)
    })
}

/// Expands a mask pattern into one alphabet per position.
///
/// `?l`, `?u`, `?d`, `?s` and `?a` stand for lowercase letters, uppercase
/// letters, digits, ASCII punctuation and all printable ASCII. `??` is a
/// literal `?`. Any other character, including an unknown placeholder or a
/// trailing `?`, is taken verbatim.
pub fn parse_mask(mask: &str) -> Vec<Vec<char>> {
    let mut positions = Vec::with_capacity(mask.len());
    let mut chars = mask.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '?' {
            positions.push(vec![c]);
            continue;
        }

        let alphabet = match chars.peek() {
            Some('l') => LOWERCASE,
            Some('u') => UPPERCASE,
            Some('d') => DIGITS,
            Some('s') => SPECIAL,
            Some('a') => PRINTABLE,
            Some('?') => "?",
            _ => {
                positions.push(vec!['?']);
                continue;
            }
        };

        chars.next();
        positions.push(alphabet.chars().collect());
    }

    positions
}

/// Every string matching `mask`.
#[inline]
pub fn mask(mask: &str) -> Product {
    Product::new(parse_mask(mask))
}
