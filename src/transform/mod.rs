// src/transform/mod.rs

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use serde_json::Value;
use std::fmt;

use crate::error::Error;

pub mod vehicle;
pub mod weather;

/// Delimited-text table content, exactly as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    text: String,
}

impl Table {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }

    /// Plain textual concatenation: no header check, no dedup.
    pub fn append(&mut self, segment: &str) {
        self.text.push_str(segment);
    }

    /// Split back into the header and the data rows.
    pub fn parse(&self) -> Result<(Vec<String>, Vec<Vec<String>>), Error> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(self.text.as_bytes());

        let header = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok((header, rows))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, Error> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| Error::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Serialize `rows` (optionally preceded by `header`) as CSV text.
pub fn render_rows<H, R>(header: Option<&[H]>, rows: impl IntoIterator<Item = R>) -> Result<String, Error>
where
    H: AsRef<str>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut wtr = writer();
    if let Some(header) = header {
        wtr.write_record(header.iter().map(|h| h.as_ref()))?;
    }
    for row in rows {
        wtr.write_record(row)?;
    }
    finish(wtr)
}

/// Text form of a JSON value inside one table cell.
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // nested values are kept as compact JSON
        other => other.to_string(),
    }
}
