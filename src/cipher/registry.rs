//! The catalog of cipher descriptors.
//!
//! A [`Registry`] is a plain value: build it, register or unregister
//! descriptors, then share it behind an [`Arc`]. The built-in catalog is
//! created once per process by [`shared_registry`] and never mutated
//! afterwards, so concurrent lookups need no locking.
//!
//! Names are matched case-insensitively. Iteration follows registration
//! order, which is also the order trial decryption tries algorithms in.

use std::cmp::Ordering;
use std::sync::{Arc, LazyLock};

use hashbrown::HashMap;

use crate::cipher::{Algorithm, CipherDescriptor, Mode, Padding};

const BLOCK_MODES: &[Mode] = &[Mode::Ecb, Mode::Cbc, Mode::Cfb, Mode::Ofb];
const BLOCK_PADDINGS: &[Padding] = &[Padding::Pkcs5, Padding::None];

static SHARED: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::with_builtins()));

/// Returns the process-wide built-in registry.
#[inline]
pub fn shared_registry() -> Arc<Registry> {
    Arc::clone(&SHARED)
}

/// Descriptors indexed by upper-cased name.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    entries: Vec<CipherDescriptor>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in descriptors.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for descriptor in builtins() {
            registry.register(descriptor);
        }
        registry
    }

    /// Adds a descriptor, replacing any descriptor with the same name in place.
    ///
    /// Returns the replaced descriptor.
    pub fn register(&mut self, descriptor: CipherDescriptor) -> Option<CipherDescriptor> {
        let key = descriptor.name().to_uppercase();

        match self.index.get(&key) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position], descriptor)),
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(descriptor);
                None
            }
        }
    }

    /// Removes the descriptor called `name`.
    pub fn unregister(&mut self, name: &str) -> Option<CipherDescriptor> {
        let position = self.index.remove(&name.to_uppercase())?;
        let removed = self.entries.remove(position);

        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }

        Some(removed)
    }

    #[inline]
    pub fn lookup(&self, name: &str) -> Option<&CipherDescriptor> {
        self.index.get(&name.to_uppercase()).map(|&position| &self.entries[position])
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_uppercase())
    }

    /// Every descriptor in registration order.
    #[inline]
    pub fn list(&self) -> &[CipherDescriptor] {
        &self.entries
    }

    /// Every descriptor name, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.iter().map(CipherDescriptor::name).collect();
        names.sort_unstable();
        names
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn filter_by_block_size(&self, block_size: usize) -> Vec<&CipherDescriptor> {
        self.entries.iter().filter(|d| d.block_size() == block_size).collect()
    }

    /// Descriptors that accept `mode` together with `padding`.
    pub fn filter_compatible(&self, mode: Mode, padding: Padding) -> Vec<&CipherDescriptor> {
        self.entries.iter().filter(|d| d.is_valid_combination(mode, padding)).collect()
    }

    /// Ranks descriptors against the findings of a file analysis.
    ///
    /// With a non-zero `alignment` only descriptors of that block size are
    /// kept. Descriptors must then support at least one of `modes` and one of
    /// `paddings` (an empty list accepts everything), and their block must
    /// fit in a non-empty file. AES sorts first, Blowfish second, the rest
    /// alphabetically.
    pub fn suggest(&self, file_size: u64, alignment: usize, modes: &[Mode], paddings: &[Padding]) -> Vec<&CipherDescriptor> {
        let mut suggestions: Vec<&CipherDescriptor> = self
            .entries
            .iter()
            .filter(|d| alignment == 0 || d.block_size() == alignment)
            .filter(|d| modes.is_empty() || modes.iter().any(|&m| d.supports_mode(m)))
            .filter(|d| paddings.is_empty() || paddings.iter().any(|&p| d.supports_padding(p)))
            .filter(|d| file_size == 0 || d.block_size() as u64 <= file_size)
            .collect();

        suggestions.sort_by(|a, b| preference(a, b));
        suggestions
    }
}

fn preference(a: &CipherDescriptor, b: &CipherDescriptor) -> Ordering {
    fn rank(descriptor: &CipherDescriptor) -> u8 {
        let name = descriptor.name();
        if name.eq_ignore_ascii_case("AES") {
            0
        } else if name.eq_ignore_ascii_case("Blowfish") {
            1
        } else {
            2
        }
    }

    rank(a).cmp(&rank(b)).then_with(|| a.name().cmp(b.name()))
}

fn builtin(name: &str, algorithm: Algorithm, modes: &[Mode], paddings: &[Padding], block_size: usize, key_lengths: &[usize]) -> CipherDescriptor {
    CipherDescriptor { name: name.to_owned(), algorithm, modes: modes.to_vec(), paddings: paddings.to_vec(), block_size, key_lengths: key_lengths.to_vec() }
}

fn builtins() -> Vec<CipherDescriptor> {
    vec![
        builtin(
            "AES",
            Algorithm::Aes,
            &[Mode::Ecb, Mode::Cbc, Mode::Cfb, Mode::Ofb, Mode::Ctr, Mode::Gcm, Mode::Ccm],
            &[Padding::Pkcs5, Padding::None, Padding::Iso10126],
            16,
            &[16, 24, 32],
        ),
        builtin("DES", Algorithm::Des, BLOCK_MODES, BLOCK_PADDINGS, 8, &[8]),
        builtin("3DES", Algorithm::TripleDes, BLOCK_MODES, BLOCK_PADDINGS, 8, &[24]),
        builtin("Blowfish", Algorithm::Blowfish, BLOCK_MODES, BLOCK_PADDINGS, 8, &[16, 24, 32, 40, 48, 56]),
        builtin("RC4", Algorithm::Rc4, &[Mode::Stream], &[Padding::None], 1, &[5, 16, 32]),
        builtin("Twofish", Algorithm::Twofish, BLOCK_MODES, BLOCK_PADDINGS, 16, &[16, 24, 32]),
        builtin("CAST5", Algorithm::Cast5, BLOCK_MODES, BLOCK_PADDINGS, 8, &[5, 16]),
        builtin("CAST6", Algorithm::Cast6, BLOCK_MODES, BLOCK_PADDINGS, 16, &[16, 20, 24, 28, 32]),
        builtin("IDEA", Algorithm::Idea, BLOCK_MODES, BLOCK_PADDINGS, 8, &[16]),
        builtin("Camellia", Algorithm::Camellia, &[Mode::Ecb, Mode::Cbc, Mode::Cfb, Mode::Ofb, Mode::Gcm], BLOCK_PADDINGS, 16, &[16, 24, 32]),
        builtin("RSA", Algorithm::Rsa, &[Mode::Ecb], &[Padding::Pkcs1, Padding::Oaep], 256, &[128, 256, 512]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = Registry::with_builtins();

        for descriptor in registry.list() {
            let name = descriptor.name();
            assert_eq!(registry.lookup(&name.to_lowercase()).map(CipherDescriptor::name), Some(name));
            assert_eq!(registry.lookup(&name.to_uppercase()).map(CipherDescriptor::name), Some(name));
        }
    }

    #[test]
    fn test_unregister() {
        let mut registry = Registry::with_builtins();
        let before = registry.len();

        assert!(registry.unregister("blowfish").is_some());
        assert!(registry.lookup("Blowfish").is_none());
        assert!(registry.unregister("Blowfish").is_none());
        assert_eq!(registry.len(), before - 1);

        // Positions after the removed entry are still reachable.
        assert_eq!(registry.lookup("rsa").map(CipherDescriptor::name), Some("RSA"));
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = Registry::with_builtins();
        let replacement = CipherDescriptor::new("aes", Algorithm::Aes, &[Mode::Gcm], &[Padding::None], 16, &[32]).unwrap();

        assert!(registry.register(replacement).is_some());
        assert_eq!(registry.list()[0].name(), "aes");
        assert_eq!(registry.lookup("AES").unwrap().primary_key_length(), 32);
    }

    #[test]
    fn test_builtin_order_and_names() {
        let registry = shared_registry();
        let order: Vec<&str> = registry.list().iter().map(CipherDescriptor::name).collect();

        assert_eq!(order, ["AES", "DES", "3DES", "Blowfish", "RC4", "Twofish", "CAST5", "CAST6", "IDEA", "Camellia", "RSA"]);
        assert_eq!(registry.names()[0], "3DES");
    }

    #[test]
    fn test_filters() {
        let registry = Registry::with_builtins();

        let wide: Vec<&str> = registry.filter_by_block_size(16).iter().map(|d| d.name()).collect();
        assert_eq!(wide, ["AES", "Twofish", "CAST6", "Camellia"]);

        let gcm: Vec<&str> = registry.filter_compatible(Mode::Gcm, Padding::None).iter().map(|d| d.name()).collect();
        assert_eq!(gcm, ["AES", "Camellia"]);

        assert!(registry.filter_compatible(Mode::Gcm, Padding::Pkcs5).is_empty());
    }

    #[test]
    fn test_suggest_order() {
        let registry = Registry::with_builtins();

        let narrow: Vec<&str> = registry.suggest(64, 8, &[Mode::Ecb, Mode::Cbc], &[Padding::Pkcs5, Padding::None]).iter().map(|d| d.name()).collect();
        assert_eq!(narrow, ["Blowfish", "3DES", "CAST5", "DES", "IDEA"]);

        let wide: Vec<&str> = registry.suggest(32, 16, &[], &[]).iter().map(|d| d.name()).collect();
        assert_eq!(wide, ["AES", "CAST6", "Camellia", "Twofish"]);
    }

    #[test]
    fn test_suggest_ranks_names_in_any_case() {
        let mut registry = Registry::new();
        registry.register(CipherDescriptor::new("camellia", Algorithm::Camellia, &[Mode::Cbc], &[Padding::Pkcs5], 16, &[16]).unwrap());
        registry.register(CipherDescriptor::new("blowfish", Algorithm::Blowfish, &[Mode::Cbc], &[Padding::Pkcs5], 8, &[16]).unwrap());
        registry.register(CipherDescriptor::new("aes", Algorithm::Aes, &[Mode::Cbc], &[Padding::Pkcs5], 16, &[16]).unwrap());

        let names: Vec<&str> = registry.suggest(64, 0, &[], &[]).iter().map(|d| d.name()).collect();
        assert_eq!(names, ["aes", "blowfish", "camellia"]);
    }

    #[test]
    fn test_suggest_drops_oversized_blocks() {
        let registry = Registry::with_builtins();
        let names: Vec<&str> = registry.suggest(17, 0, &[], &[]).iter().map(|d| d.name()).collect();

        assert!(!names.contains(&"RSA"));
        assert!(names.contains(&"RC4"));
        assert!(names.contains(&"AES"));
    }
}
