//! Streaming tab-delimited property reader
//!
//! Each input line holds exactly five tab-separated fields:
//! id, address, town, valuation date, value. Lines that do not have five
//! fields, or whose id is not an integer, are skipped without error.

use crate::{Error, PropertyRecord, RecordKey, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Number of fields in a well-formed row
pub const FIELD_COUNT: usize = 5;

/// Field separator
pub const DELIMITER: char = '\t';

/// Reason a line was not turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRejection {
    /// The line split into the wrong number of fields
    FieldCount(usize),
    /// The first field is not an integer
    InvalidId(String),
}

/// Parse one line (without its terminator) into a record
pub fn parse_line(line: &str) -> std::result::Result<PropertyRecord, LineRejection> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() != FIELD_COUNT {
        return Err(LineRejection::FieldCount(fields.len()));
    }

    let id: i64 = fields[0]
        .parse()
        .map_err(|_| LineRejection::InvalidId(fields[0].to_string()))?;

    let key = RecordKey::new(id, fields[3]);
    Ok(PropertyRecord::new(key, fields[1], fields[2], fields[4]))
}

/// Counters collected while reading
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Lines read, including skipped ones
    pub lines_read: usize,
    /// Lines turned into records
    pub records: usize,
    /// Lines skipped because of the field count
    pub skipped_field_count: usize,
    /// Lines skipped because the id did not parse
    pub skipped_invalid_id: usize,
}

impl ReaderStats {
    pub fn skipped(&self) -> usize {
        self.skipped_field_count + self.skipped_invalid_id
    }
}

/// Configuration for the TSV reader
#[derive(Debug, Clone)]
pub struct TsvConfig {
    /// Buffer size for BufReader
    pub buffer_size: usize,
}

impl Default for TsvConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024,
        }
    }
}

/// Streaming reader yielding structurally valid records
pub struct TsvReader<R: Read> {
    reader: BufReader<R>,
    bytes_read: u64,
    total_bytes: Option<u64>,
    stats: ReaderStats,
}

impl TsvReader<Box<dyn Read>> {
    /// Open a dataset file, decompressing `.gz` files transparently
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let metadata = file.metadata()?;
        if metadata.is_dir() {
            return Err(Error::InvalidFile(format!(
                "{} is a directory",
                path.display()
            )));
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => {
                debug!("Opening gzip-compressed dataset: {:?}", path);
                let reader: Box<dyn Read> = Box::new(GzDecoder::new(file));
                Ok(Self::new_with_config(reader, TsvConfig::default(), None))
            }
            _ => {
                debug!("Opening plain dataset: {:?}", path);
                let reader: Box<dyn Read> = Box::new(file);
                Ok(Self::new_with_config(
                    reader,
                    TsvConfig::default(),
                    Some(metadata.len()),
                ))
            }
        }
    }
}

impl<R: Read> TsvReader<R> {
    /// Create a reader over any Read source
    pub fn new(reader: R) -> Self {
        Self::new_with_config(reader, TsvConfig::default(), None)
    }

    pub fn new_with_config(reader: R, config: TsvConfig, total_bytes: Option<u64>) -> Self {
        Self {
            reader: BufReader::with_capacity(config.buffer_size, reader),
            bytes_read: 0,
            total_bytes,
            stats: ReaderStats::default(),
        }
    }

    /// Number of lines read so far
    pub fn lines_processed(&self) -> usize {
        self.stats.lines_read
    }

    pub fn bytes_processed(&self) -> u64 {
        self.bytes_read
    }

    /// Total size of the input if known (not known for gzip input)
    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    pub fn stats(&self) -> &ReaderStats {
        &self.stats
    }
}

impl<R: Read> Iterator for TsvReader<R> {
    type Item = Result<PropertyRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match self.reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None,
                Ok(n) => {
                    self.bytes_read += n as u64;
                    self.stats.lines_read += 1;

                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }
                    let line = String::from_utf8_lossy(&buf);

                    match parse_line(&line) {
                        Ok(record) => {
                            self.stats.records += 1;
                            return Some(Ok(record));
                        }
                        Err(LineRejection::FieldCount(count)) => {
                            debug!(
                                "Skipping line {}: expected {} fields, found {}",
                                self.stats.lines_read, FIELD_COUNT, count
                            );
                            self.stats.skipped_field_count += 1;
                        }
                        Err(LineRejection::InvalidId(id)) => {
                            debug!(
                                "Skipping line {}: id {:?} is not an integer",
                                self.stats.lines_read, id
                            );
                            self.stats.skipped_invalid_id += 1;
                        }
                    }
                }
                Err(e) => return Some(Err(Error::Io(e))),
            }
        }
    }
}

/// Open a dataset file for streaming
pub fn open_dataset<P: AsRef<Path>>(path: P) -> Result<TsvReader<Box<dyn Read>>> {
    TsvReader::open(path)
}
