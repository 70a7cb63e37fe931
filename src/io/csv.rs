//! Comma-separated edge lists.
//!
//! # Format
//! - The first line is a header and is skipped without validation.
//! - Every following line is a record whose first two fields are integer
//!   vertex ids `u,v`; further fields are ignored.
//! - Whitespace around a field is ignored. A blank line, including one at
//!   the end of the file, is a record with too few fields. Only the newline
//!   terminating the last record is optional.
//!
//! The first malformed record aborts the read; no partial list is returned.
//!
//! # Limitations
//! - Quoted fields are not supported.

use super::{EdgeListReader, EdgeListWriter};
use crate::shape_error::ShapeError;
use crate::topology::point::{Edge, VertexId};
use std::io::{BufWriter, Read, Write};

/// Header written by [`CsvEdgeListWriter`].
pub const DEFAULT_HEADER: &str = "u,v";

/// Reader for comma-separated edge lists.
#[derive(Debug, Default, Clone)]
pub struct CsvEdgeListReader;

impl CsvEdgeListReader {
    fn parse_id(raw: &str, line: usize) -> Result<VertexId, ShapeError> {
        let raw = raw.trim();
        raw.parse::<i64>()
            .map(VertexId::new)
            .map_err(|_| ShapeError::EdgeListParse {
                line,
                reason: format!("invalid vertex id `{raw}`"),
            })
    }

    /// Parse one record; `line` is the 1-based line number used in errors.
    pub fn parse_record(record: &str, line: usize) -> Result<Edge, ShapeError> {
        let mut fields = record.split(',');
        let (Some(u), Some(v)) = (fields.next(), fields.next()) else {
            return Err(ShapeError::EdgeListParse {
                line,
                reason: "expected at least two fields".into(),
            });
        };
        Ok((Self::parse_id(u, line)?, Self::parse_id(v, line)?))
    }
}

impl EdgeListReader for CsvEdgeListReader {
    fn read<R: Read>(&self, mut reader: R) -> Result<Vec<Edge>, ShapeError> {
        let mut contents = String::new();
        reader.read_to_string(&mut contents)?;

        let mut records = contents.lines().enumerate();
        if records.next().is_none() {
            return Err(ShapeError::EdgeListParse {
                line: 1,
                reason: "missing header row".into(),
            });
        }
        records
            .map(|(i, record)| Self::parse_record(record, i + 1))
            .collect()
    }
}

/// Writer for comma-separated edge lists.
#[derive(Debug, Clone)]
pub struct CsvEdgeListWriter {
    header: String,
}

impl Default for CsvEdgeListWriter {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
        }
    }
}

impl CsvEdgeListWriter {
    /// Writer emitting `header` as the first line.
    pub fn with_header(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl EdgeListWriter for CsvEdgeListWriter {
    fn write<W: Write>(&self, writer: W, edges: &[Edge]) -> Result<(), ShapeError> {
        let mut out = BufWriter::new(writer);
        writeln!(out, "{}", self.header)?;
        for (u, v) in edges {
            writeln!(out, "{u},{v}")?;
        }
        out.flush()?;
        Ok(())
    }
}
