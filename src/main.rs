// src/main.rs
mod batch;
mod extractors;
mod fda;
mod storage;
mod utils;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use fda::{FetchPolicy, LabelClient};
use storage::{ColumnLayout, CsvSink};
use utils::AppError;

/// Extracts safety-related labeling changes from FDA SrLC drug pages into a CSV table
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input CSV with `Drug` (or `Drug Name`), `Application Number` and `Link` columns
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV; appended to if it already exists
    #[arg(short, long, default_value = "Drug_Safety_Labels_Output.csv")]
    output: PathBuf,

    /// Section columns to emit: presence marks only, or marks plus section text
    #[arg(long, value_enum, default_value_t = ColumnLayout::PresenceAndContent)]
    layout: ColumnLayout,

    /// Minimum pause between requests, in milliseconds
    #[arg(long, default_value_t = 2000)]
    min_delay_ms: u64,

    /// Maximum pause between requests, in milliseconds
    #[arg(long, default_value_t = 5000)]
    max_delay_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// User-Agent to rotate through (repeatable); replaces the built-in browser pool
    #[arg(long = "user-agent")]
    user_agents: Vec<String>,

    /// Process at most this many input rows
    #[arg(long)]
    limit: Option<usize>,

    /// Where to write the JSON run summary (default: `<output>.summary.json`)
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Save raw and annotated copies of pages that yield no records here
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn fetch_policy(&self) -> FetchPolicy {
        let mut policy = FetchPolicy {
            min_delay: Duration::from_millis(self.min_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            timeout: Duration::from_secs(self.timeout_secs),
            ..FetchPolicy::default()
        };
        if !self.user_agents.is_empty() {
            policy.user_agents = self.user_agents.clone();
        }
        policy
    }

    fn summary_path(&self) -> PathBuf {
        self.summary.clone().unwrap_or_else(|| {
            let mut name = self.output.clone().into_os_string();
            name.push(".summary.json");
            PathBuf::from(name)
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // 1. Setup Logging (RUST_LOG overrides --log-level)
    utils::logging::setup_logging(&args.log_level);
    tracing::info!("Starting run with args: {:?}", args);

    // 2. Validate the fetch policy before touching any files
    let policy = args.fetch_policy();
    policy.validate()?;

    // 3. Load input rows
    let mut rows = fda::load_input_records(&args.input)?;
    if let Some(limit) = args.limit {
        rows.truncate(limit);
        tracing::info!("Limiting run to the first {} rows", rows.len());
    }
    if rows.is_empty() {
        return Err(AppError::Config(format!("No input rows found in {}", args.input.display())));
    }

    // 4. Open the output table and the HTTP client
    let mut sink = CsvSink::open(&args.output, args.layout)?;
    let client = LabelClient::new(policy)?;

    // 5. Process every row
    let summary = batch::run_batch(&client, &rows, &mut sink, args.debug_dir.as_deref()).await?;

    // 6. Record the outcome
    let summary_path = args.summary_path();
    if let Err(e) = storage::save_run_summary(&summary_path, &summary, sink.path()) {
        tracing::error!("Failed to save run summary: {}", e);
    }

    tracing::info!(
        "Data extraction complete. {} records written from {} attempted of {} input rows. Output saved to {}",
        summary.records_written,
        summary.attempted,
        summary.input_rows,
        args.output.display()
    );

    if summary.attempted > 0 && summary.unavailable + summary.malformed == summary.attempted {
        return Err(AppError::Processing(format!(
            "Every one of the {} fetched pages failed",
            summary.attempted
        )));
    }

    Ok(())
}
