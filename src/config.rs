//! Configuration for an NCD engine run

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::codec::BUILTIN_METHODS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Selected codec identifiers. Must be non-empty.
    pub methods: Vec<String>,
    /// Compress the full signature corpus during this run. When false,
    /// scoring falls back to sizes materialized under `compressed_dir` by a
    /// previous run.
    pub bulk_encode: bool,
    /// Where encoded signatures are materialized as `<id>.<method>`.
    pub compressed_dir: Option<PathBuf>,
    pub sink: SinkConfig,
    pub provenance: Provenance,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            methods: BUILTIN_METHODS.iter().map(|m| m.to_string()).collect(),
            bulk_encode: true,
            compressed_dir: None,
            sink: SinkConfig::Console,
            provenance: Provenance::default(),
        }
    }
}

/// Where the result set goes. The caller chooses; the engine never infers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SinkConfig {
    /// Buffer records and print them sorted ascending by distance.
    Console,
    /// Append records in insertion order to a CSV table at this path.
    CsvTable(PathBuf),
}

/// Descriptive per-run metadata copied verbatim onto every record. Not part
/// of the distance computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub noise_type: Option<String>,
    pub noise_percentage: Option<f64>,
    pub probe_id: Option<String>,
    pub test_start: Option<f64>,
    pub test_duration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selects_all_builtins() {
        let config = EngineConfig::default();
        assert_eq!(config.methods, ["bzip2", "gzip", "lzma", "zstd"]);
        assert!(config.bulk_encode);
        assert!(matches!(config.sink, SinkConfig::Console));
    }
}
