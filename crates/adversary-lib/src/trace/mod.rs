//! Trace ingestion
//!
//! This module reads the simulator's packet log in a single streaming pass.
//! The pass parses each line into a `PacketRecord`, accumulates the
//! trace-wide statistics, hashes the raw bytes, and hands every record to a
//! caller-supplied callback so any number of policy collectors can share
//! the same read.

mod flows;
mod parser;
mod stats;


pub use flows::{FlowAggregate, FlowTable};
pub use parser::{parse_record, FIELD_DELIMITER, TRACE_FIELDS};
pub use stats::{TraceStatistics, TraceStatsBuilder};

use crate::error::Result;
use crate::models::PacketRecord;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// What a completed ingestion pass produced
#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub statistics: TraceStatistics,
    /// Hex SHA-256 of the raw trace bytes
    pub sha256: String,
}

/// Stream `reader` line by line, invoking `on_record` for each parsed record
pub fn ingest<R, F>(mut reader: R, mut on_record: F) -> Result<IngestSummary>
where
    R: BufRead,
    F: FnMut(&PacketRecord),
{
    let mut builder = TraceStatsBuilder::new();
    let mut hasher = Sha256::new();
    let mut line = String::new();
    let mut line_no = 0;

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        line_no += 1;
        hasher.update(line.as_bytes());

        let record = parse_record(&line, line_no)?;
        builder.observe(&record);
        on_record(&record);
    }

    debug!(records = builder.count(), "Trace stream exhausted");

    Ok(IngestSummary {
        statistics: builder.finish()?,
        sha256: hex::encode(hasher.finalize()),
    })
}

/// Open and ingest a trace file
pub fn ingest_file<F>(path: &Path, on_record: F) -> Result<IngestSummary>
where
    F: FnMut(&PacketRecord),
{
    debug!(path = %path.display(), "Ingesting trace");
    let file = File::open(path)?;
    ingest(BufReader::new(file), on_record)
}
