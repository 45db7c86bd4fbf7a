//! Trace line parsing
//!
//! Lines are `arrival; departure; flow_id; class_tag; packet_size; job_size`.
//! Extra trailing fields are ignored.

use crate::error::{AnalyzerError, Result};
use crate::models::PacketRecord;
use std::str::FromStr;

/// Number of fields every trace line must carry
pub const TRACE_FIELDS: usize = 6;

/// Field delimiter used by the simulator's packet log
pub const FIELD_DELIMITER: char = ';';

/// Parse one trace line. `line_no` is 1-based and only used for errors.
pub fn parse_record(line: &str, line_no: usize) -> Result<PacketRecord> {
    let values: Vec<&str> = line.split(FIELD_DELIMITER).map(str::trim).collect();
    if values.len() < TRACE_FIELDS {
        return Err(AnalyzerError::MalformedRecord {
            line: line_no,
            fields: values.len(),
        });
    }

    let packet_size: u64 = parse_field(values[4], "packet size", line_no)?;
    if packet_size == 0 {
        return Err(AnalyzerError::InvalidField {
            line: line_no,
            field: "packet size",
            value: values[4].to_string(),
        });
    }

    // Job sizes feed cumulative profiles; they must be finite and non-negative
    let job_size: f64 = parse_field(values[5], "job size", line_no)?;
    if !job_size.is_finite() || job_size < 0.0 {
        return Err(AnalyzerError::InvalidField {
            line: line_no,
            field: "job size",
            value: values[5].to_string(),
        });
    }

    Ok(PacketRecord {
        arrival_time: parse_field(values[0], "arrival time", line_no)?,
        departure_time: parse_field(values[1], "departure time", line_no)?,
        flow_id: values[2].to_string(),
        class_tag: values[3].to_string(),
        packet_size,
        job_size,
    })
}

fn parse_field<T: FromStr>(value: &str, field: &'static str, line_no: usize) -> Result<T> {
    value.parse().map_err(|_| AnalyzerError::InvalidField {
        line: line_no,
        field,
        value: value.to_string(),
    })
}
