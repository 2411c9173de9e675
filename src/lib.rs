//! sigmatch: audio-signature similarity via Normalized Compression Distance.
//!
//! Ranks a corpus of signature artifacts against a probe ("trim") segment by
//! how much better a general-purpose compressor does on the concatenation of
//! signature and probe than on each input alone. Lower distance means higher
//! similarity.
//!
//! Layers, leaf first:
//! - codec adapter over interchangeable whole-buffer compressors
//! - artifact store access with bit-level size measurement
//! - the engine, which scores every (method, signature) pair and emits a
//!   ranked console listing or an append-only CSV table

pub mod codec;
pub mod config;
pub mod error;
pub mod sink;
pub mod store;

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};

use crate::codec::CodecRegistry;
use crate::config::{EngineConfig, Provenance, SinkConfig};
use crate::error::NcdError;
use crate::sink::{ConsoleSink, CsvSink, ResultSink};
use crate::store::{size_in_bits, Artifact};

/// One scored (signature, probe) pair.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DistanceRecord {
    pub artifact_id: String,
    pub ncd: f64,
    pub method: String,
    pub provenance: Provenance,
}

/// What a finished run looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub skipped_pairs: usize,
    pub dropped_methods: usize,
    pub outcome: RunOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every selected method and every pair produced a record.
    Complete,
    /// Some methods or pairs were skipped; the emitted records stand.
    Partial,
}

/// Classical NCD approximation over compressed sizes in bits:
/// `(C(xy) - min(C(x), C(y))) / max(C(x), C(y))`.
///
/// Values slightly above 1 are possible with pathological inputs and are
/// returned as-is.
pub fn ncd_score(concat_bits: u64, signature_bits: u64, probe_bits: u64) -> f64 {
    let min = signature_bits.min(probe_bits) as f64;
    let max = signature_bits.max(probe_bits) as f64;
    if max == 0.0 {
        return 0.0;
    }
    (concat_bits as f64 - min) / max
}

// The three sizes backing one record. Built inside a single method-scoped
// loop, so all of them are guaranteed to come from the same codec.
#[derive(Debug, Clone, Copy)]
struct Measurement {
    signature_bits: u64,
    probe_bits: u64,
    concat_bits: u64,
}

impl Measurement {
    fn ncd(&self) -> f64 {
        ncd_score(self.concat_bits, self.signature_bits, self.probe_bits)
    }
}

// Output of the pre-scoring phases: surviving methods with their probe
// sizes, plus the encoded-signature size table.
struct Prepared {
    signature_bits: HashMap<(String, String), u64>,
    probe_bits: BTreeMap<String, u64>,
    dropped_methods: usize,
}

/// The NCD engine. Holds the codec registry and the run configuration; all
/// per-run state lives on the stack of [`NcdEngine::run`].
pub struct NcdEngine {
    registry: CodecRegistry,
    config: EngineConfig,
}

impl NcdEngine {
    /// Engine with the built-in codec registry.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registry(config, CodecRegistry::builtin())
    }

    /// Engine over a caller-supplied registry, e.g. one with extra codecs
    /// registered.
    pub fn with_registry(config: EngineConfig, registry: CodecRegistry) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score the corpus against the probe and emit to the configured sink.
    ///
    /// Run-level failures (no usable method, empty corpus, sink failure)
    /// abort before any output is produced. Per-pair failures are logged,
    /// skipped, and reflected in the summary as a partial run.
    pub fn run(&self, corpus: &[Artifact], probe: &Artifact) -> Result<RunSummary, NcdError> {
        let prepared = self.prepare(corpus, probe)?;
        // The sink is opened only once the run is known to be viable.
        let mut sink: Box<dyn ResultSink> = match &self.config.sink {
            SinkConfig::Console => Box::new(ConsoleSink::stdout()),
            SinkConfig::CsvTable(path) => Box::new(CsvSink::open(path)?),
        };
        self.score(&prepared, corpus, probe, sink.as_mut())
    }

    /// Same as [`NcdEngine::run`] but emitting into a caller-owned sink.
    pub fn run_with_sink(
        &self,
        corpus: &[Artifact],
        probe: &Artifact,
        sink: &mut dyn ResultSink,
    ) -> Result<RunSummary, NcdError> {
        let prepared = self.prepare(corpus, probe)?;
        self.score(&prepared, corpus, probe, sink)
    }

    /// Phases 1-3: method selection, optional bulk encode, probe encode.
    fn prepare(&self, corpus: &[Artifact], probe: &Artifact) -> Result<Prepared, NcdError> {
        if self.config.methods.is_empty() {
            return Err(NcdError::NoMethodSelected);
        }
        if corpus.is_empty() {
            return Err(NcdError::EmptyCorpus(
                "no signature artifacts supplied".to_string(),
            ));
        }

        let mut dropped_methods = 0usize;
        let mut methods: Vec<&str> = Vec::new();
        for method in &self.config.methods {
            if methods.contains(&method.as_str()) {
                continue;
            }
            if self.registry.contains(method) {
                methods.push(method.as_str());
            } else {
                warn!(method = %method, "unsupported compression method, dropped");
                dropped_methods += 1;
            }
        }
        if methods.is_empty() {
            return Err(NcdError::NoMethodSelected);
        }

        let mut signature_bits = HashMap::new();
        if self.config.bulk_encode {
            for signature in corpus {
                for method in &methods {
                    match self.registry.compress(method, &signature.bytes) {
                        Ok(encoded) => {
                            if let Some(dir) = &self.config.compressed_dir {
                                if let Err(e) =
                                    store::persist_encoded(dir, &signature.id, method, &encoded)
                                {
                                    warn!(
                                        method = %method,
                                        artifact = %signature.id,
                                        error = %e,
                                        "failed to materialize encoded signature"
                                    );
                                }
                            }
                            signature_bits.insert(
                                (method.to_string(), signature.id.clone()),
                                size_in_bits(&encoded),
                            );
                        }
                        Err(e) => warn!(
                            method = %method,
                            artifact = %signature.id,
                            error = %e,
                            "signature encode failed, pair skipped"
                        ),
                    }
                }
            }
        } else if let Some(dir) = &self.config.compressed_dir {
            // Score-only mode: reuse sizes materialized by a previous run.
            for signature in corpus {
                for method in &methods {
                    match store::persisted_size_in_bits(dir, &signature.id, method) {
                        Ok(bits) => {
                            signature_bits
                                .insert((method.to_string(), signature.id.clone()), bits);
                        }
                        Err(_) => debug!(
                            method = %method,
                            artifact = %signature.id,
                            "no materialized encoding, pair will be skipped"
                        ),
                    }
                }
            }
        }

        let mut probe_bits = BTreeMap::new();
        for method in &methods {
            match self.registry.compress(method, &probe.bytes) {
                Ok(encoded) => {
                    probe_bits.insert(method.to_string(), size_in_bits(&encoded));
                }
                Err(e) => {
                    warn!(method = %method, error = %e, "probe encode failed, method dropped");
                    dropped_methods += 1;
                }
            }
        }
        if probe_bits.is_empty() {
            return Err(NcdError::NoMethodSelected);
        }

        Ok(Prepared {
            signature_bits,
            probe_bits,
            dropped_methods,
        })
    }

    /// Phases 4-5: pairwise scoring and emission.
    fn score(
        &self,
        prepared: &Prepared,
        corpus: &[Artifact],
        probe: &Artifact,
        sink: &mut dyn ResultSink,
    ) -> Result<RunSummary, NcdError> {
        let mut records = 0usize;
        let mut skipped_pairs = 0usize;

        for (method, &probe_bits) in &prepared.probe_bits {
            for signature in corpus {
                let key = (method.clone(), signature.id.clone());
                let Some(&signature_bits) = prepared.signature_bits.get(&key) else {
                    warn!(
                        method = %method,
                        artifact = %signature.id,
                        "no encoded signature size, pair skipped"
                    );
                    skipped_pairs += 1;
                    continue;
                };

                // One fresh concatenation per pair, dropped right after the
                // size is read.
                let combined = store::concatenate(signature, probe);
                let concat_bits = match self.registry.compress(method, &combined) {
                    Ok(encoded) => size_in_bits(&encoded),
                    Err(e) => {
                        warn!(
                            method = %method,
                            artifact = %signature.id,
                            error = %e,
                            "concatenation encode failed, pair skipped"
                        );
                        skipped_pairs += 1;
                        continue;
                    }
                };
                drop(combined);

                let measurement = Measurement {
                    signature_bits,
                    probe_bits,
                    concat_bits,
                };
                sink.append(&DistanceRecord {
                    artifact_id: signature.id.clone(),
                    ncd: measurement.ncd(),
                    method: method.clone(),
                    provenance: self.config.provenance.clone(),
                })?;
                records += 1;
            }
        }
        sink.finish()?;

        let outcome = if skipped_pairs == 0 && prepared.dropped_methods == 0 {
            RunOutcome::Complete
        } else {
            RunOutcome::Partial
        };
        let summary = RunSummary {
            records,
            skipped_pairs,
            dropped_methods: prepared.dropped_methods,
            outcome,
        };
        match outcome {
            RunOutcome::Complete => info!(records, "run completed fully"),
            RunOutcome::Partial => info!(
                records,
                skipped_pairs,
                dropped_methods = prepared.dropped_methods,
                "run completed partially"
            ),
        }
        Ok(summary)
    }
}
