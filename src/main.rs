use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossref_export::config::{find_config_file, load_config, Config};
use crossref_export::{CrossRefSource, Exporter};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crossref Export - Write Crossref works matching a query to a CSV file
#[derive(Parser, Debug)]
#[command(name = "crossref-export")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Export Crossref works metadata to CSV using cursor-based deep paging", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Fetch every matching work and write the CSV file (default)
    #[command(alias = "e")]
    Export,

    /// Print the effective configuration as TOML
    Config,
}

/// Settings that override the configuration file and environment
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Free-text search query
    #[arg(long, global = true)]
    query: Option<String>,

    /// Earliest publication date (YYYY-MM-DD)
    #[arg(long, global = true)]
    from_date: Option<NaiveDate>,

    /// Months before today to cover when --from-date is not given
    #[arg(long, global = true)]
    lookback_months: Option<u32>,

    /// Raw filter expression, replacing the publication-date filter
    #[arg(long, global = true)]
    filter: Option<String>,

    /// Comma-separated fields to request
    #[arg(long, global = true)]
    select: Option<String>,

    /// Page size
    #[arg(long, global = true)]
    rows: Option<u32>,

    /// Output CSV path
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    /// Read timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Contact address for the Crossref polite pool
    #[arg(long, global = true)]
    mailto: Option<String>,

    /// API root URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Attempts per page before giving up (1 = no retries)
    #[arg(long, global = true)]
    max_attempts: Option<u32>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(query) = self.query {
            config.query.query = query;
        }
        if let Some(from_date) = self.from_date {
            config.query.from_date = Some(from_date);
        }
        if let Some(months) = self.lookback_months {
            config.query.lookback_months = months;
        }
        if let Some(filter) = self.filter {
            config.query.filter = Some(filter);
        }
        if let Some(select) = self.select {
            config.query.select = select;
        }
        if let Some(rows) = self.rows {
            config.query.rows = rows;
        }
        if let Some(output) = self.output {
            config.output.path = output;
        }
        if let Some(timeout) = self.timeout {
            config.http.read_timeout_secs = timeout;
        }
        if let Some(mailto) = self.mailto {
            config.http.mailto = Some(mailto);
        }
        if let Some(base_url) = self.base_url {
            config.http.base_url = base_url;
        }
        if let Some(attempts) = self.max_attempts {
            config.retry.max_attempts = attempts;
        }
    }
}

fn init_tracing(cli: &Cli) {
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };
    let json = cli.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("crossref_export={}", env_filter)),
        ))
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().or_else(find_config_file);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let mut config = load_config(config_path.as_deref()).context("failed to load configuration")?;
    cli.overrides.apply(&mut config);
    config.validate().context("invalid configuration")?;

    match cli.command.unwrap_or(Commands::Export) {
        Commands::Config => {
            print!("{}", config.to_toml().context("failed to render configuration")?);
        }
        Commands::Export => {
            let source = CrossRefSource::new(&config.http, config.retry)
                .context("failed to create Crossref client")?;
            let output = config.output.path.clone();
            let summary = Exporter::new(config, source)
                .run()
                .await
                .with_context(|| format!("export to {} failed", output.display()))?;

            if !cli.quiet {
                println!(
                    "Wrote {} rows from {} pages to {} (total results reported: {})",
                    summary.rows_written,
                    summary.pages_fetched,
                    output.display(),
                    summary
                        .total_results
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "unknown".to_string())
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
