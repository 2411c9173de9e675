//! Result sinks: sorted console listing or an append-only CSV table.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::error::NcdError;
use crate::DistanceRecord;

/// Column order of the structured table.
const CSV_HEADER: [&str; 8] = [
    "artifact_id",
    "ncd",
    "method",
    "noise_type",
    "probe_id",
    "noise_percentage",
    "test_start",
    "test_duration",
];

/// Receives records as the engine produces them. `finish` is called exactly
/// once, after the last append.
pub trait ResultSink {
    fn append(&mut self, record: &DistanceRecord) -> Result<(), NcdError>;
    fn finish(&mut self) -> Result<(), NcdError>;
}

/// Buffers all records, then writes one line per record sorted ascending by
/// distance. Ties break on artifact id so repeated runs print identical
/// bytes.
pub struct ConsoleSink<W: Write> {
    writer: W,
    records: Vec<DistanceRecord>,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            records: Vec::new(),
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for ConsoleSink<W> {
    fn append(&mut self, record: &DistanceRecord) -> Result<(), NcdError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), NcdError> {
        self.records.sort_by(|a, b| {
            a.ncd
                .total_cmp(&b.ncd)
                .then_with(|| a.artifact_id.cmp(&b.artifact_id))
        });
        for record in &self.records {
            writeln!(
                self.writer,
                "{}\t{:.6}\t{}",
                record.artifact_id, record.ncd, record.method
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Appends each record to a CSV table as it is produced, in insertion
/// order. The header row is written once, when the file is first created;
/// later runs only add data rows.
pub struct CsvSink {
    writer: csv::Writer<std::fs::File>,
}

impl CsvSink {
    pub fn open(path: &Path) -> Result<Self, NcdError> {
        let fresh = !path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| NcdError::SinkWriteFailure(format!("{}: {e}", path.display())))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if fresh {
            writer
                .write_record(CSV_HEADER)
                .map_err(|e| NcdError::SinkWriteFailure(e.to_string()))?;
        }
        Ok(Self { writer })
    }
}

fn opt_string<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(T::to_string).unwrap_or_default()
}

impl ResultSink for CsvSink {
    fn append(&mut self, record: &DistanceRecord) -> Result<(), NcdError> {
        let p = &record.provenance;
        self.writer
            .write_record([
                record.artifact_id.clone(),
                record.ncd.to_string(),
                record.method.clone(),
                p.noise_type.clone().unwrap_or_default(),
                p.probe_id.clone().unwrap_or_default(),
                opt_string(&p.noise_percentage),
                opt_string(&p.test_start),
                opt_string(&p.test_duration),
            ])
            .map_err(|e| NcdError::SinkWriteFailure(e.to_string()))
    }

    fn finish(&mut self) -> Result<(), NcdError> {
        self.writer
            .flush()
            .map_err(|e| NcdError::SinkWriteFailure(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Provenance;

    fn record(id: &str, ncd: f64) -> DistanceRecord {
        DistanceRecord {
            artifact_id: id.to_string(),
            ncd,
            method: "gzip".to_string(),
            provenance: Provenance::default(),
        }
    }

    #[test]
    fn test_console_sorts_ascending() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.append(&record("far", 0.9)).unwrap();
        sink.append(&record("near", 0.2)).unwrap();
        sink.append(&record("mid", 0.5)).unwrap();
        sink.finish().unwrap();
        let out = String::from_utf8(sink.into_writer()).unwrap();
        let ids: Vec<&str> = out
            .lines()
            .map(|l| l.split('\t').next().unwrap())
            .collect();
        assert_eq!(ids, ["near", "mid", "far"]);
    }

    #[test]
    fn test_console_tie_break_by_id() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.append(&record("b", 0.5)).unwrap();
        sink.append(&record("a", 0.5)).unwrap();
        sink.finish().unwrap();
        let out = String::from_utf8(sink.into_writer()).unwrap();
        assert!(out.find("a\t").unwrap() < out.find("b\t").unwrap());
    }

    #[test]
    fn test_csv_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        for _ in 0..2 {
            let mut sink = CsvSink::open(&path).unwrap();
            sink.append(&record("song", 0.4)).unwrap();
            sink.finish().unwrap();
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        let headers = contents
            .lines()
            .filter(|l| l.starts_with("artifact_id"))
            .count();
        assert_eq!(headers, 1);
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn test_csv_provenance_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let mut sink = CsvSink::open(&path).unwrap();
        let mut rec = record("song", 0.4);
        rec.provenance = Provenance {
            noise_type: Some("white".to_string()),
            noise_percentage: Some(12.5),
            probe_id: Some("probe-7".to_string()),
            test_start: Some(30.0),
            test_duration: Some(10.0),
        };
        sink.append(&rec).unwrap();
        sink.finish().unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let data_row = contents.lines().nth(1).unwrap();
        assert_eq!(data_row, "song,0.4,gzip,white,probe-7,12.5,30,10");
    }
}
