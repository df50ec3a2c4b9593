//! Record output writers
//!
//! Records are written either as space-separated text (id, address, town,
//! valuation date, value) or as one JSON object per line.

use crate::{Error, PropertyRecord, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

/// Output encoding for accepted records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Space-separated fields, one record per line
    #[default]
    Text,
    /// JSON Lines
    Jsonl,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "jsonl" | "json" => Ok(OutputFormat::Jsonl),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// JSON shape of a record, fields in output order
#[derive(Serialize)]
struct JsonRow<'a> {
    id: i64,
    address: &'a str,
    town: &'a str,
    valuation_date: &'a str,
    value: &'a str,
}

impl<'a> From<&'a PropertyRecord> for JsonRow<'a> {
    fn from(record: &'a PropertyRecord) -> Self {
        Self {
            id: record.id(),
            address: &record.address,
            town: &record.town,
            valuation_date: record.valuation_date(),
            value: &record.value,
        }
    }
}

/// Streaming record writer over any Write sink
pub struct RecordWriter<W: Write> {
    sink: W,
    format: OutputFormat,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(sink: W, format: OutputFormat) -> Self {
        Self {
            sink,
            format,
            written: 0,
        }
    }

    /// Write a single record
    pub fn write_record(&mut self, record: &PropertyRecord) -> Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.sink, "{}", record)?,
            OutputFormat::Jsonl => {
                serde_json::to_writer(&mut self.sink, &JsonRow::from(record))?;
                self.sink.write_all(b"\n")?;
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Write every record from an iterator
    pub fn write_all<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a PropertyRecord>,
    {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and hand back the sink
    pub fn finish(mut self) -> Result<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordKey;

    fn sample() -> Vec<PropertyRecord> {
        vec![
            PropertyRecord::new(RecordKey::new(1, "2020"), "10 MAIN ST", "X", "500000"),
            PropertyRecord::new(RecordKey::new(2, "2021"), "20 OAK ST", "Y", "650000"),
        ]
    }

    #[test]
    fn test_text_output() {
        let mut writer = RecordWriter::new(Vec::new(), OutputFormat::Text);
        writer.write_all(&sample()).unwrap();
        assert_eq!(writer.written(), 2);

        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(out, "1 10 MAIN ST X 2020 500000\n2 20 OAK ST Y 2021 650000\n");
    }

    #[test]
    fn test_jsonl_output() {
        let mut writer = RecordWriter::new(Vec::new(), OutputFormat::Jsonl);
        writer.write_all(&sample()).unwrap();

        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], 1);
        assert_eq!(first["address"], "10 MAIN ST");
        assert_eq!(first["valuation_date"], "2020");
        assert_eq!(first["value"], "500000");
        assert!(lines[0].starts_with(r#"{"id":1,"address""#));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSONL".parse::<OutputFormat>().unwrap(), OutputFormat::Jsonl);
        assert!(matches!(
            "parquet".parse::<OutputFormat>(),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
