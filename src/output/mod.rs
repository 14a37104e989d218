//! CSV output of works.
//!
//! Each [`Work`] is flattened into a [`CsvRow`]: titles and authors are
//! joined with `;` and whitespace-normalized. [`CsvSink`] writes the header
//! once and quotes every field, including the header and numeric columns.
//! Records end with CRLF.

use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::models::Work;
use crate::utils::join_normalized;

/// Column names, in output order
pub const HEADER: [&str; 5] = ["DOI", "Title", "Author", "Publisher", "Created"];

/// Errors writing the output file
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One output line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvRow {
    #[serde(rename = "DOI")]
    pub doi: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Publisher")]
    pub publisher: String,
    #[serde(rename = "Created")]
    pub created: i64,
}

impl From<&Work> for CsvRow {
    fn from(work: &Work) -> Self {
        Self {
            doi: work.doi.clone(),
            title: join_normalized(&work.titles),
            author: join_normalized(&work.authors),
            publisher: work.publisher.clone(),
            created: work.created_timestamp,
        }
    }
}

/// Always-quoted CSV writer owning its destination
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    target: String,
    rows: usize,
}

impl CsvSink<File> {
    /// Create (or truncate) the file at `path` and write the header
    pub fn create(path: &Path) -> Result<Self, OutputError> {
        let file = File::create(path).map_err(|source| OutputError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut sink = Self::from_writer(file)?;
        sink.target = path.display().to_string();
        Ok(sink)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap any writer and write the header
    pub fn from_writer(inner: W) -> Result<Self, OutputError> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .terminator(csv::Terminator::CRLF)
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(HEADER)?;
        Ok(Self {
            writer,
            target: "<writer>".to_string(),
            rows: 0,
        })
    }

    /// Append one work
    pub fn write_work(&mut self, work: &Work) -> Result<(), OutputError> {
        self.write_row(&CsvRow::from(work))
    }

    /// Append one row
    pub fn write_row(&mut self, row: &CsvRow) -> Result<(), OutputError> {
        self.writer.serialize(row)?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush().map_err(|source| OutputError::Io {
            path: self.target.clone(),
            source,
        })
    }

    /// Flush and hand back the destination
    pub fn into_inner(self) -> Result<W, OutputError> {
        let target = self.target;
        self.writer.into_inner().map_err(|e| OutputError::Io {
            path: target,
            source: io::Error::new(e.error().kind(), e.error().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work() -> Work {
        Work {
            doi: "10.1/x".to_string(),
            titles: vec!["Multi\nline\n\ntitle".to_string(), "Second".to_string()],
            authors: vec!["Jane  Doe".to_string(), " Smith".to_string()],
            publisher: "Pub, Inc.".to_string(),
            created_timestamp: 1714521600000,
        }
    }

    fn render(works: &[Work]) -> String {
        let mut sink = CsvSink::from_writer(Vec::new()).unwrap();
        for work in works {
            sink.write_work(work).unwrap();
        }
        String::from_utf8(sink.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_row_flattening() {
        let row = CsvRow::from(&work());
        assert_eq!(row.title, "Multi line title;Second");
        assert_eq!(row.author, "Jane Doe; Smith");
        assert_eq!(row.publisher, "Pub, Inc.");
        assert_eq!(row.created, 1714521600000);
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(
            render(&[]),
            "\"DOI\",\"Title\",\"Author\",\"Publisher\",\"Created\"\r\n"
        );
    }

    #[test]
    fn test_every_field_is_quoted() {
        let output = render(&[work()]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "\"10.1/x\",\"Multi line title;Second\",\"Jane Doe; Smith\",\"Pub, Inc.\",\"1714521600000\""
        );
    }

    #[test]
    fn test_empty_optional_fields() {
        let bare = Work {
            doi: "10.1/bare".to_string(),
            titles: Vec::new(),
            authors: Vec::new(),
            publisher: String::new(),
            created_timestamp: 5,
        };
        let output = render(&[bare]);
        assert!(output.ends_with("\"10.1/bare\",\"\",\"\",\"\",\"5\"\r\n"));
    }

    #[test]
    fn test_embedded_quote_is_escaped() {
        let mut quoted = work();
        quoted.publisher = "The \"Best\" Press".to_string();
        let output = render(&[quoted]);
        assert!(output.contains("\"The \"\"Best\"\" Press\""));
    }

    #[test]
    fn test_row_count() {
        let mut sink = CsvSink::from_writer(Vec::new()).unwrap();
        sink.write_work(&work()).unwrap();
        sink.write_work(&work()).unwrap();
        assert_eq!(sink.rows(), 2);
    }

    #[test]
    fn test_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut sink = CsvSink::create(&path).unwrap();
        sink.write_work(&work()).unwrap();
        sink.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        assert!(matches!(
            CsvSink::create(&path),
            Err(OutputError::Io { .. })
        ));
    }
}
