//! Pluggable sink for non-fatal parsing diagnostics.
//!
//! Optional fields that are missing from a Crossref item do not abort the
//! export. The parser substitutes an empty value and reports the gap to a
//! [`DiagnosticSink`]. The binary uses [`TracingSink`]; tests use
//! [`CollectingSink`] to assert on what was reported.

use std::fmt;
use std::sync::Mutex;

/// Optional item fields that may be absent without failing the parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionalField {
    Publisher,
    Title,
    Author,
}

impl OptionalField {
    /// Field name as it appears in the Crossref JSON item
    pub fn json_name(&self) -> &'static str {
        match self {
            OptionalField::Publisher => "publisher",
            OptionalField::Title => "title",
            OptionalField::Author => "author",
        }
    }
}

impl fmt::Display for OptionalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_name())
    }
}

/// A missing optional field on a specific work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMissing {
    pub doi: String,
    pub field: OptionalField,
}

/// Receiver for non-fatal diagnostics emitted while parsing items
pub trait DiagnosticSink: Send + Sync + fmt::Debug {
    fn field_missing(&self, warning: FieldMissing);
}

/// Emits diagnostics as `tracing` warnings
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn field_missing(&self, warning: FieldMissing) {
        tracing::warn!(
            doi = %warning.doi,
            field = warning.field.json_name(),
            "{} is missing for DOI={}",
            warning.field,
            warning.doi
        );
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: Mutex<Vec<FieldMissing>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn warnings(&self) -> Vec<FieldMissing> {
        match self.warnings.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of warnings reported for `field`
    pub fn count(&self, field: OptionalField) -> usize {
        self.warnings().iter().filter(|w| w.field == field).count()
    }
}

impl DiagnosticSink for CollectingSink {
    fn field_missing(&self, warning: FieldMissing) {
        match self.warnings.lock() {
            Ok(mut guard) => guard.push(warning),
            Err(poisoned) => poisoned.into_inner().push(warning),
        }
    }
}
