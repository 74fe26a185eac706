use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};

/// The encrypted data under attack: a file on disk or an in-memory blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    File(PathBuf),
    Bytes(Arc<[u8]>),
}

impl Target {
    #[inline]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    #[inline]
    pub fn bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Decodes a hex blob, ignoring surrounding whitespace.
    pub fn from_hex(blob: &str) -> Result<Self> {
        let bytes = hex::decode(blob.trim()).map_err(|e| anyhow!("target blob is not valid hex: {e}"))?;
        Ok(Self::bytes(bytes))
    }

    /// Whether the target can be read at all.
    #[must_use]
    pub fn exists(&self) -> bool {
        match self {
            Self::File(path) => path.is_file(),
            Self::Bytes(_) => true,
        }
    }

    /// Total size in bytes.
    pub fn len(&self) -> Result<u64> {
        match self {
            Self::File(path) => Ok(fs::metadata(path).with_context(|| format!("stat failed: {}", path.display()))?.len()),
            Self::Bytes(bytes) => Ok(bytes.len() as u64),
        }
    }

    /// Reads at most `limit` leading bytes.
    pub fn read_prefix(&self, limit: usize) -> Result<Vec<u8>> {
        match self {
            Self::File(path) => {
                let file = File::open(path).with_context(|| format!("failed to open file: {}", path.display()))?;
                let mut prefix = Vec::with_capacity(limit.min(64 * 1024));
                file.take(limit as u64).read_to_end(&mut prefix).with_context(|| format!("failed to read file: {}", path.display()))?;
                Ok(prefix)
            }
            Self::Bytes(bytes) => Ok(bytes[..bytes.len().min(limit)].to_vec()),
        }
    }

    /// Reads the whole target.
    pub fn read_all(&self) -> Result<Vec<u8>> {
        match self {
            Self::File(path) => fs::read(path).with_context(|| format!("failed to read file: {}", path.display())),
            Self::Bytes(bytes) => Ok(bytes.to_vec()),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Bytes(bytes) => write!(f, "<{} byte blob>", bytes.len()),
        }
    }
}

/// Whether `path` names an existing regular file.
#[must_use]
pub fn file_exists(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file())
}

/// Writes `bytes` to `path`, creating parent directories.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("failed to create file: {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    writer.write_all(bytes).with_context(|| format!("failed to write file: {}", path.display()))?;
    writer.flush().with_context(|| format!("failed to flush file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_file_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.bin");
        write_file(&path, &[7u8; 40]).unwrap();

        let target = Target::file(&path);
        assert!(target.exists());
        assert_eq!(target.len().unwrap(), 40);
        assert_eq!(target.read_prefix(16).unwrap(), vec![7u8; 16]);
        assert_eq!(target.read_prefix(1024).unwrap().len(), 40);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let target = Target::file(dir.path().join("absent"));

        assert!(!target.exists());
        assert!(target.len().is_err());
        assert!(target.read_prefix(16).is_err());
        assert!(!file_exists(dir.path()));
    }

    #[test]
    fn test_hex_blob() {
        let target = Target::from_hex(" 00ff10 \n").unwrap();
        assert_eq!(target.len().unwrap(), 3);
        assert_eq!(target.read_prefix(2).unwrap(), [0x00, 0xff]);
        assert_eq!(target.to_string(), "<3 byte blob>");
        assert!(Target::from_hex("xyz").is_err());
    }
}
