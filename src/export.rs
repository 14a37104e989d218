//! The export pipeline: build the request, page through the results and
//! write every work to CSV.

use chrono::{Local, NaiveDate};
use futures_util::{pin_mut, StreamExt};
use std::fs::File;
use std::io::Write;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::output::{CsvSink, OutputError};
use crate::pagination::{Pager, PagingStats};
use crate::sources::{SourceError, WorksSource};

/// Errors that abort an export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("fetch failed: {0}")]
    Source(#[from] SourceError),

    #[error("write failed: {0}")]
    Output(#[from] OutputError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// What a finished export did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Data rows written, header excluded
    pub rows_written: usize,
    /// Pages fetched
    pub pages_fetched: usize,
    /// `total-results` reported by the last page
    pub total_results: Option<u64>,
}

/// Runs one query and writes one file
#[derive(Debug)]
pub struct Exporter<S> {
    config: Config,
    source: S,
    today: NaiveDate,
}

impl<S: WorksSource> Exporter<S> {
    pub fn new(config: Config, source: S) -> Self {
        Self {
            config,
            source,
            today: Local::now().date_naive(),
        }
    }

    /// Pin the date the lookback window is measured from
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Export to `config.output.path`
    pub async fn run(&self) -> Result<ExportSummary, ExportError> {
        self.config.validate()?;
        let path = &self.config.output.path;
        info!("Writing works to {}", path.display());

        let sink: CsvSink<File> = CsvSink::create(path)?;
        self.run_to(sink).await
    }

    /// Export into an already-opened sink.
    ///
    /// The sink is flushed before returning, whether or not the export
    /// succeeded. Rows written before a failure stay in the destination.
    pub async fn run_to<W: Write>(&self, mut sink: CsvSink<W>) -> Result<ExportSummary, ExportError> {
        let request = self.config.query.build_request(self.today);
        info!(
            "Exporting works for query={:?} filter={:?} rows={} from {}",
            request.query,
            request.filter,
            request.rows,
            self.source.id()
        );

        let mut pager = Pager::new(&self.source, request);
        let drained = drain(&mut pager, &mut sink).await;
        let flushed = sink.flush();
        let stats = pager.stats();

        match (drained, flushed) {
            (Ok(()), Ok(())) => {
                let summary = summarize(sink.rows(), stats);
                info!(
                    "Export finished: {} rows written from {} pages (total results reported: {})",
                    summary.rows_written,
                    summary.pages_fetched,
                    summary
                        .total_results
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "unknown".to_string())
                );
                Ok(summary)
            }
            (Err(e), flushed) => {
                if let Err(flush_err) = flushed {
                    warn!("Flushing partial output failed: {}", flush_err);
                }
                warn!("Export aborted after {} rows", sink.rows());
                Err(e)
            }
            (Ok(()), Err(e)) => Err(e.into()),
        }
    }
}

async fn drain<S: WorksSource, W: Write>(
    pager: &mut Pager<S>,
    sink: &mut CsvSink<W>,
) -> Result<(), ExportError> {
    let works = pager.works();
    pin_mut!(works);

    while let Some(work) = works.next().await {
        sink.write_work(&work?)?;
    }
    Ok(())
}

fn summarize(rows_written: usize, stats: PagingStats) -> ExportSummary {
    ExportSummary {
        rows_written,
        pages_fetched: stats.pages,
        total_results: stats.total_results,
    }
}
