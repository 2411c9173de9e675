//! Artifact store access: named byte sequences on disk, size measurement
//! in bits, and pairwise concatenation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::NcdError;

/// A named, immutable byte sequence. The id is the file stem of the
/// artifact it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub id: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn from_bytes(id: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encoded sizes are measured in bits everywhere: byte length times eight.
pub fn size_in_bits(buf: &[u8]) -> u64 {
    buf.len() as u64 * 8
}

/// Byte-exact concatenation, always signature first, probe second. The
/// order is fixed so intermediate measurements are reproducible across
/// runs.
pub fn concatenate(signature: &Artifact, probe: &Artifact) -> Vec<u8> {
    let mut combined = Vec::with_capacity(signature.len() + probe.len());
    combined.extend_from_slice(&signature.bytes);
    combined.extend_from_slice(&probe.bytes);
    combined
}

/// Resolve a named artifact inside `dir`.
pub fn resolve(dir: &Path, name: &str) -> Result<Artifact, NcdError> {
    read_artifact(&dir.join(name))
}

/// Load the probe (trim segment) artifact from an explicit path.
pub fn load_probe(path: &Path) -> Result<Artifact, NcdError> {
    read_artifact(path)
}

/// Load every signature artifact in `dir`, sorted by id. Non-file entries
/// are ignored.
pub fn load_corpus(dir: &Path) -> Result<Vec<Artifact>, NcdError> {
    if !dir.is_dir() {
        return Err(NcdError::NotFound(dir.to_path_buf()));
    }
    let mut corpus = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            debug!(path = %path.display(), "skipping non-file corpus entry");
            continue;
        }
        corpus.push(read_artifact(&path)?);
    }
    corpus.sort_by(|a, b| a.id.cmp(&b.id));
    if corpus.is_empty() {
        return Err(NcdError::EmptyCorpus(dir.display().to_string()));
    }
    Ok(corpus)
}

fn read_artifact(path: &Path) -> Result<Artifact, NcdError> {
    if !path.is_file() {
        return Err(NcdError::NotFound(path.to_path_buf()));
    }
    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = fs::read(path)?;
    Ok(Artifact { id, bytes })
}

/// Path of a materialized encoded signature: `<dir>/<id>.<method>`.
pub fn encoded_path(dir: &Path, id: &str, method: &str) -> PathBuf {
    dir.join(format!("{id}.{method}"))
}

/// Persist one encoded signature for reuse by later score-only runs.
pub fn persist_encoded(dir: &Path, id: &str, method: &str, buf: &[u8]) -> Result<(), NcdError> {
    fs::create_dir_all(dir)?;
    fs::write(encoded_path(dir, id, method), buf)?;
    Ok(())
}

/// Encoded size of a previously materialized signature, in bits.
pub fn persisted_size_in_bits(dir: &Path, id: &str, method: &str) -> Result<u64, NcdError> {
    let path = encoded_path(dir, id, method);
    let meta = fs::metadata(&path).map_err(|_| NcdError::NotFound(path))?;
    Ok(meta.len() * 8)
}
