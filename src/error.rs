//! Error types for sigmatch

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NcdError {
    /// Method identifier is not in the codec registry. Fatal for that
    /// method only; the run continues with the remaining methods.
    #[error("unsupported compression method: {0}")]
    UnsupportedMethod(String),

    /// Named artifact does not exist on the store.
    #[error("artifact not found: {0}")]
    NotFound(PathBuf),

    /// Empty (or fully invalid) method selection. Fatal for the whole run;
    /// raised before any I/O happens.
    #[error("no compression method selected")]
    NoMethodSelected,

    /// No resolvable signature artifacts. Fatal for the whole run.
    #[error("empty corpus: {0}")]
    EmptyCorpus(String),

    /// A compress call failed inside a codec.
    #[error("codec {method} failed: {source}")]
    Codec {
        method: String,
        #[source]
        source: std::io::Error,
    },

    /// The structured sink could not be opened or appended to. Fatal for
    /// the run: partial writes to a malformed table are worse than none.
    #[error("sink write failure: {0}")]
    SinkWriteFailure(String),

    /// Propagated I/O error from the artifact store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
