//! Streamed access to line-oriented word lists.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

/// Opens `path` with a read buffer of `capacity` bytes.
pub fn open(path: &Path, capacity: usize) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("failed to open file: {}", path.display()))?;
    Ok(BufReader::with_capacity(capacity, file))
}

/// Streams the lines of `path`.
///
/// Invalid UTF-8 is replaced rather than rejected; a line that cannot be read
/// at all surfaces as an error.
pub fn lines(path: &Path, capacity: usize) -> Result<impl Iterator<Item = Result<String>>> {
    let reader = open(path, capacity)?;
    let display = path.display().to_string();

    Ok(reader.split(b'\n').map(move |line| {
        let mut bytes = line.with_context(|| format!("failed to read file: {display}"))?;
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }))
}

/// Number of lines in `path`.
pub fn count_lines(path: &Path, capacity: usize) -> Result<u64> {
    let mut reader = open(path, capacity)?;
    let mut count = 0u64;
    let mut last = b'\n';

    loop {
        let buffer = reader.fill_buf().with_context(|| format!("failed to read file: {}", path.display()))?;
        if buffer.is_empty() {
            break;
        }

        count += buffer.iter().filter(|&&b| b == b'\n').count() as u64;
        last = buffer[buffer.len() - 1];

        let consumed = buffer.len();
        reader.consume(consumed);
    }

    // A final line without a terminator still counts.
    if last != b'\n' {
        count += 1;
    }

    Ok(count)
}

/// The password field of a `hash:password` line.
pub fn table_password(line: &str) -> Option<&str> {
    line.trim().split(':').nth(1)
}
