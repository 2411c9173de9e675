//! Command-line front end: resolves the corpus and probe, builds the engine
//! configuration, and hands everything to the NCD engine.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;

use sigmatch::config::{EngineConfig, Provenance, SinkConfig};
use sigmatch::{store, NcdEngine};

/// Rank signature artifacts against a probe segment by normalized
/// compression distance.
#[derive(Parser)]
#[command(name = "sigmatch", version)]
struct Args {
    /// Directory of signature artifacts
    #[arg(long)]
    signatures: PathBuf,
    /// Probe (trim) segment to score against the corpus
    #[arg(long)]
    probe: PathBuf,
    /// Compress the full signature corpus before scoring
    #[arg(short = 'c', long)]
    compress: bool,
    /// Directory where encoded signatures are materialized and reused
    #[arg(long)]
    compressed_dir: Option<PathBuf>,
    /// Compress using gzip
    #[arg(long)]
    gzip: bool,
    /// Compress using bzip2
    #[arg(long)]
    bzip2: bool,
    /// Compress using lzma
    #[arg(long)]
    lzma: bool,
    /// Compress using zstd
    #[arg(long)]
    zstd: bool,
    /// Append records to this CSV table instead of printing a ranking
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Noise type recorded on every row
    #[arg(long)]
    noise_type: Option<String>,
    /// Noise percentage recorded on every row
    #[arg(long)]
    noise_percentage: Option<f64>,
    /// Probe identifier recorded on every row
    #[arg(long)]
    probe_id: Option<String>,
    /// Test window start in seconds, recorded on every row
    #[arg(long)]
    test_start: Option<f64>,
    /// Test window duration in seconds, recorded on every row
    #[arg(long)]
    test_duration: Option<f64>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let flags = [
        (args.gzip, "gzip"),
        (args.bzip2, "bzip2"),
        (args.lzma, "lzma"),
        (args.zstd, "zstd"),
    ];
    let methods: Vec<String> = flags
        .into_iter()
        .filter(|(selected, _)| *selected)
        .map(|(_, name)| name.to_string())
        .collect();

    let corpus = store::load_corpus(&args.signatures)
        .with_context(|| format!("loading corpus from {}", args.signatures.display()))?;
    let probe = store::load_probe(&args.probe)
        .with_context(|| format!("loading probe {}", args.probe.display()))?;

    let config = EngineConfig {
        methods,
        bulk_encode: args.compress,
        compressed_dir: args.compressed_dir,
        sink: match args.csv {
            Some(path) => SinkConfig::CsvTable(path),
            None => SinkConfig::Console,
        },
        provenance: Provenance {
            noise_type: args.noise_type,
            noise_percentage: args.noise_percentage,
            probe_id: args.probe_id,
            test_start: args.test_start,
            test_duration: args.test_duration,
        },
    };

    NcdEngine::new(config).run(&corpus, &probe)?;
    Ok(())
}
