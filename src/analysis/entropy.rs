//! Byte-distribution statistics of a header sample.

/// Occurrences of every byte value.
fn histogram(data: &[u8]) -> [u64; 256] {
    let mut counts = [0u64; 256];
    for &byte in data {
        counts[usize::from(byte)] += 1;
    }
    counts
}

/// Shannon entropy in bits per byte, from 0 (constant) to 8 (uniform).
pub fn shannon(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let len = data.len() as f64;
    histogram(data).iter().filter(|&&count| count > 0).fold(0.0, |entropy, &count| {
        let p = count as f64 / len;
        entropy - p * p.log2()
    })
}

/// Pearson's chi-squared statistic against a uniform byte distribution.
///
/// Encrypted data stays close to 255 (the degrees of freedom); structured
/// data lands orders of magnitude higher.
pub fn chi_squared(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let expected = data.len() as f64 / 256.0;
    histogram(data).iter().map(|&count| (count as f64 - expected).powi(2) / expected).sum()
}

/// Probability that two bytes drawn without replacement are equal.
///
/// About 1/256 for random data, noticeably higher for text.
pub fn index_of_coincidence(data: &[u8]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }

    let n = data.len() as f64;
    let pairs: f64 = histogram(data).iter().map(|&count| count as f64 * (count as f64 - 1.0)).sum();
    pairs / (n * (n - 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_bounds() {
        assert!(shannon(&[0u8; 512]).abs() < f64::EPSILON);
        assert!(shannon(&[]).abs() < f64::EPSILON);

        let uniform: Vec<u8> = (0..=255).collect();
        assert!((shannon(&uniform) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_symbols_is_one_bit() {
        assert!((shannon(b"abababab") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_chi_squared() {
        let uniform: Vec<u8> = (0..=255).collect();
        assert!(chi_squared(&uniform).abs() < 1e-9);
        assert!(chi_squared(&[0u8; 256]) > 60_000.0);
    }

    #[test]
    fn test_index_of_coincidence() {
        assert!((index_of_coincidence(&[7u8; 10]) - 1.0).abs() < 1e-9);

        let uniform: Vec<u8> = (0..=255).collect();
        assert!(index_of_coincidence(&uniform).abs() < 1e-9);
        assert!(index_of_coincidence(&[1]).abs() < f64::EPSILON);
    }
}
