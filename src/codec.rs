//! Codec adapter: whole-buffer byte compressors behind a common registry.
//!
//! Every codec is a pure `bytes -> bytes` function, deterministic for a
//! fixed input. The registry does no file I/O.

use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::error::NcdError;

/// A whole-buffer compress function registered under a method identifier.
pub type CompressFn = Box<dyn Fn(&[u8]) -> io::Result<Vec<u8>> + Send + Sync>;

/// Identifiers of the built-in codecs, one per algorithm family.
pub const BUILTIN_METHODS: [&str; 4] = ["bzip2", "gzip", "lzma", "zstd"];

/// Maps method identifiers to compress functions.
///
/// Iteration order is the identifier's lexical order, so runs over the same
/// selection are deterministic.
pub struct CodecRegistry {
    codecs: BTreeMap<String, CompressFn>,
}

impl CodecRegistry {
    /// Registry with the four built-in codecs: `gzip` (LZ77 + Huffman),
    /// `bzip2` (Burrows-Wheeler), `lzma`, and `zstd`.
    pub fn builtin() -> Self {
        let mut registry = Self {
            codecs: BTreeMap::new(),
        };
        registry.register("gzip", Box::new(gzip_compress));
        registry.register("bzip2", Box::new(bzip2_compress));
        registry.register("lzma", Box::new(lzma_compress));
        registry.register("zstd", Box::new(zstd_compress));
        registry
    }

    /// Register a codec under `name`, replacing any previous registration.
    /// Callers dispatch by identifier and never need to change when a codec
    /// is added.
    pub fn register(&mut self, name: impl Into<String>, f: CompressFn) {
        self.codecs.insert(name.into(), f);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }

    /// Compress `data` with the named codec.
    pub fn compress(&self, method: &str, data: &[u8]) -> Result<Vec<u8>, NcdError> {
        let codec = self
            .codecs
            .get(method)
            .ok_or_else(|| NcdError::UnsupportedMethod(method.to_string()))?;
        codec(data).map_err(|source| NcdError::Codec {
            method: method.to_string(),
            source,
        })
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// flate2's GzEncoder writes no mtime, so output is stable across calls.
fn gzip_compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

fn bzip2_compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

fn lzma_compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    encoder.write_all(data)?;
    encoder.finish()
}

fn zstd_compress(data: &[u8]) -> io::Result<Vec<u8>> {
    zstd::encode_all(data, 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_methods_present() {
        let registry = CodecRegistry::builtin();
        for method in BUILTIN_METHODS {
            assert!(registry.contains(method), "missing builtin {method}");
        }
    }

    #[test]
    fn test_unsupported_method() {
        let registry = CodecRegistry::builtin();
        let result = registry.compress("snappy", b"data");
        assert!(matches!(result, Err(NcdError::UnsupportedMethod(m)) if m == "snappy"));
    }

    #[test]
    fn test_all_builtins_deterministic() {
        let registry = CodecRegistry::builtin();
        let data = b"the quick brown fox jumps over the lazy dog".repeat(20);
        for method in BUILTIN_METHODS {
            let first = registry.compress(method, &data).unwrap();
            let second = registry.compress(method, &data).unwrap();
            assert_eq!(first, second, "{method} output varies across calls");
        }
    }

    #[test]
    fn test_redundant_input_shrinks() {
        let registry = CodecRegistry::builtin();
        let data = b"abcabcabc".repeat(200);
        for method in BUILTIN_METHODS {
            let compressed = registry.compress(method, &data).unwrap();
            assert!(
                compressed.len() < data.len(),
                "{method} did not shrink redundant input"
            );
        }
    }

    #[test]
    fn test_register_custom_codec() {
        let mut registry = CodecRegistry::builtin();
        registry.register("identity", Box::new(|data: &[u8]| Ok(data.to_vec())));
        let out = registry.compress("identity", b"abc").unwrap();
        assert_eq!(out, b"abc");
        assert!(registry.names().any(|n| n == "identity"));
    }

    #[test]
    fn test_names_sorted() {
        let registry = CodecRegistry::builtin();
        let names: Vec<&str> = registry.names().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
