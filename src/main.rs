//! # Email Harvest CLI
//!
//! Command-line interface for the Email Harvest library (`email_harvest_core`).
//! This binary parses arguments, sets up configuration, initializes the harvester,
//! runs a single page or a batch (from a task file or a keyword index), and handles output.

use email_harvest_core::utils::export::{save_csv, save_json};
use email_harvest_core::{
    harvest_url, initialize_harvester, process_tasks, tasks_from_index, BatchProgress,
    BatchReport, BatchResultRow, BatchTask, Config, ConfigBuilder, ContactRecord, EmailHarvester,
    KeywordIndex, ProgressCallback,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON (full report in batch modes)
    Json,
    /// Keyword,Name,Email rows
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Extracts (name, email) contacts from web pages.",
    long_about = "Email Harvest fetches web pages, locates email addresses in mail-links and text, pairs each with the most plausible nearby name, and deduplicates results across a batch."
)]
struct AppArgs {
    /// Path to a JSON array of {group_key|keyword, url} tasks (file mode).
    #[arg(short, long, default_value = "tasks.json", env = "EMAIL_HARVEST_INPUT")]
    input: String,

    /// Path of the output file.
    #[arg(
        short,
        long,
        default_value = "results.json",
        env = "EMAIL_HARVEST_OUTPUT"
    )]
    output: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json, env = "EMAIL_HARVEST_FORMAT")]
    format: OutputFormat,

    /// Single page to extract from (enables single page mode).
    #[arg(long, env = "EMAIL_HARVEST_URL", conflicts_with = "index")]
    url: Option<String>,

    /// Group key attached to rows in single page mode.
    #[arg(long, default_value = "default", env = "EMAIL_HARVEST_GROUP")]
    group: String,

    /// Keyword index file, JSON or CSV (enables keyword mode). Requires --keywords.
    #[arg(long, env = "EMAIL_HARVEST_INDEX", requires = "keywords")]
    index: Option<String>,

    /// Comma-separated keywords to look up in the index.
    #[arg(long, env = "EMAIL_HARVEST_KEYWORDS", requires = "index")]
    keywords: Option<String>,

    /// Maximum URLs taken per keyword from the index (1-50).
    #[arg(long, env = "EMAIL_HARVEST_LIMIT")]
    limit: Option<usize>,

    /// Print results to standard output instead of a file (single page mode).
    #[arg(long, default_value = "false", env = "EMAIL_HARVEST_STDOUT")]
    stdout: bool,

    /// Path to a configuration file (TOML format) to load settings from. CLI args override file settings.
    #[arg(long, env = "EMAIL_HARVEST_CONFIG")]
    config_file: Option<String>,

    /// Number of concurrent workers.
    #[arg(short, long, env = "EMAIL_HARVEST_CONCURRENCY")]
    concurrency: Option<usize>,

    /// User agent string for HTTP requests.
    #[arg(long, env = "EMAIL_HARVEST_USER_AGENT")]
    user_agent: Option<String>,

    /// HTTP request timeout in seconds.
    #[arg(long, env = "EMAIL_HARVEST_REQUEST_TIMEOUT")]
    request_timeout: Option<u64>,

    /// Maximum redirects followed per request.
    #[arg(long, env = "EMAIL_HARVEST_MAX_REDIRECTS")]
    max_redirects: Option<usize>,

    /// Characters on each side of a free-text address searched for a name.
    #[arg(long, env = "EMAIL_HARVEST_PROXIMITY_WINDOW")]
    proximity_window: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_thread_names(true)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Setting up tracing subscriber failed")?;

    tracing::info!(
        "Email Harvest CLI v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let args = AppArgs::parse();
    tracing::debug!("Parsed CLI arguments: {:?}", args);

    let mut config_builder = ConfigBuilder::new();

    if let Some(ref path) = args.config_file {
        config_builder = config_builder.config_file(path);
    }
    if let Some(c) = args.concurrency {
        config_builder = config_builder.max_concurrency(c);
    }
    if let Some(ref ua) = args.user_agent {
        config_builder = config_builder.user_agent(ua);
    }
    if let Some(t) = args.request_timeout {
        config_builder = config_builder.request_timeout(Duration::from_secs(t));
    }
    if let Some(r) = args.max_redirects {
        config_builder = config_builder.max_redirects(r);
    }
    if let Some(w) = args.proximity_window {
        config_builder = config_builder.proximity_window(w);
    }
    if let Some(l) = args.limit {
        config_builder = config_builder.max_results_per_keyword(l);
    }

    let config = match config_builder.build() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            return Err(anyhow::anyhow!("Failed to build configuration: {}", e));
        }
    };
    tracing::debug!("Effective configuration loaded: {:?}", *config);

    let harvester = match initialize_harvester(Arc::clone(&config)) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Initialization error: {}", e);
            return Err(anyhow::anyhow!(
                "Failed to initialize EmailHarvester core: {}",
                e
            ));
        }
    };

    let start_time = Instant::now();

    let execution_result = if let Some(ref url) = args.url {
        process_single_mode(&harvester, url, &args).await
    } else {
        let tasks = if let Some(ref index_path) = args.index {
            load_index_tasks(&config, index_path, &args)?
        } else {
            load_tasks(&args.input)?
        };
        process_batch_mode(&harvester, tasks, &args, start_time).await
    };

    if let Err(e) = execution_result {
        tracing::error!("Execution failed: {}", e);
        return Err(e);
    }

    tracing::info!(
        "Processing finished successfully. Total duration: {:.2?}",
        start_time.elapsed()
    );
    Ok(())
}

async fn process_single_mode(harvester: &EmailHarvester, url: &str, args: &AppArgs) -> Result<()> {
    tracing::info!("Running in Single Page mode for '{}'.", url);
    let start_time = Instant::now();

    let contacts = harvest_url(harvester, url)
        .await
        .with_context(|| format!("Failed to extract contacts from '{}'", url))?;

    if args.stdout {
        print_cli_results(url, &contacts);
    } else {
        prepare_output_path(&args.output)?;
        let output_path = Path::new(&args.output);
        let saved = match args.format {
            OutputFormat::Json => save_json(&contacts, output_path),
            OutputFormat::Csv => {
                let rows: Vec<BatchResultRow> = contacts
                    .iter()
                    .map(|c| BatchResultRow {
                        group_key: args.group.clone(),
                        email: c.email.clone(),
                        name: c.name.clone(),
                    })
                    .collect();
                save_csv(&rows, output_path)
            }
        };
        saved.with_context(|| format!("Failed to save results to '{}'", args.output))?;
        tracing::info!("Result saved successfully to '{}'.", args.output);
    }
    tracing::info!("Single page mode finished. Duration: {:.2?}", start_time.elapsed());
    Ok(())
}

async fn process_batch_mode(
    harvester: &EmailHarvester,
    tasks: Vec<BatchTask>,
    args: &AppArgs,
    start_time: Instant,
) -> Result<()> {
    tracing::info!(
        "Running in Batch mode. Output: '{}' ({})",
        args.output,
        args.format
    );
    prepare_output_path(&args.output)?;

    let total_tasks = tasks.len();
    if total_tasks == 0 {
        return Err(anyhow::anyhow!("No tasks to process."));
    }
    tracing::info!(
        "Starting extraction for {} page(s) (Concurrency: {})...",
        total_tasks,
        harvester.config().max_concurrency
    );

    let pb = ProgressBar::new(total_tasks as u64);
    pb.set_style(ProgressStyle::default_bar()
         .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | ETA: {eta} | {msg}")
         .context("Failed to set progress bar template")?
         .progress_chars("=> "));
    pb.set_message("Extracting contacts...");

    let bar = pb.clone();
    let progress: ProgressCallback = Arc::new(move |p: BatchProgress| {
        bar.set_position(p.done as u64);
    });

    let report = process_tasks(harvester, tasks, Some(progress))
        .await
        .context("Batch processing failed")?;

    pb.finish_with_message(format!("Processed {} pages", report.outcomes.len()));

    let output_path = Path::new(&args.output);
    tracing::info!("Saving results to '{}'...", args.output);
    let saved = match args.format {
        OutputFormat::Json => save_json(&report, output_path),
        OutputFormat::Csv => save_csv(&report.rows, output_path),
    };
    saved.with_context(|| format!("Failed to save results to '{}'", args.output))?;
    tracing::info!("Results saved successfully.");

    log_summary(&report, total_tasks, start_time.elapsed());
    Ok(())
}

fn load_tasks(file_path: &str) -> Result<Vec<BatchTask>> {
    let path = Path::new(file_path);
    if !path.exists() || !path.is_file() {
        return Err(anyhow::anyhow!(
            "Input file not found or is not a file: {}",
            file_path
        ));
    }
    tracing::info!("Loading tasks from '{}'...", file_path);
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file '{}'", file_path))?;
    let reader = BufReader::new(file);

    let tasks: Vec<BatchTask> = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse JSON from '{}'. Ensure it's an array of {{\"group_key\", \"url\"}} objects.",
            file_path
        )
    })?;
    tracing::info!("Loaded {} task(s) from input file.", tasks.len());
    Ok(tasks)
}

fn load_index_tasks(config: &Config, index_path: &str, args: &AppArgs) -> Result<Vec<BatchTask>> {
    let index = KeywordIndex::load(Path::new(index_path))
        .with_context(|| format!("Failed to load keyword index '{}'", index_path))?;
    let keywords = args.keywords.as_deref().unwrap_or_default();
    tasks_from_index(&index, keywords, config.max_results_per_keyword)
        .context("Invalid keyword search input")
}

fn prepare_output_path(output: &str) -> Result<()> {
    let output_path = Path::new(output);
    if let Some(parent_dir) = output_path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            tracing::debug!("Creating output directory: {}", parent_dir.display());
            std::fs::create_dir_all(parent_dir).with_context(|| {
                format!(
                    "Failed to create output directory '{}'",
                    parent_dir.display()
                )
            })?;
        }
    }
    File::create(output).with_context(|| {
        format!("Cannot write to output file '{}'. Check permissions.", output)
    })?;
    tracing::debug!("Output path '{}' seems writable.", output);
    Ok(())
}

/// Logs a summary of the batch to the console using `tracing::info`.
fn log_summary(report: &BatchReport, original_total: usize, duration: Duration) {
    let processed = report.outcomes.len();
    let failed = report.outcomes.iter().filter(|o| o.is_failure()).count();
    let empty = report
        .outcomes
        .iter()
        .filter(|o| !o.is_failure() && o.contacts.is_empty())
        .count();
    let named = report.rows.iter().filter(|r| !r.name.is_empty()).count();

    tracing::info!("-------------------- Processing Summary --------------------");
    tracing::info!("Total Tasks                 : {}", original_total);
    tracing::info!("Pages Processed             : {}", processed);
    tracing::info!("  - With Contacts           : {}", processed - failed - empty);
    tracing::info!("  - No Contacts Found       : {}", empty);
    tracing::info!("  - Failed (Fetch/Parse)    : {}", failed);
    tracing::info!("Unique Rows                 : {}", report.rows.len());
    tracing::info!("  - With Name               : {}", named);
    tracing::info!("Total Time Taken            : {:.2?}", duration);
    if duration.as_secs_f64() > 0.01 && processed > 0 {
        let rate = (processed as f64) / duration.as_secs_f64();
        tracing::info!("Processing Rate             : {:.2} pages/sec", rate);
    }
    tracing::info!("----------------------------------------------------------");
}

/// Prints contacts for a single page to standard output.
fn print_cli_results(url: &str, contacts: &[ContactRecord]) {
    const BLUE: &str = "\x1b[34m";
    const GREEN: &str = "\x1b[32m";
    const YELLOW: &str = "\x1b[33m";
    const RESET: &str = "\x1b[0m";

    println!("\n{BLUE}===== Email Harvest Results ====={RESET}");
    println!("Page: {}", url);

    if contacts.is_empty() {
        println!("\n{YELLOW}Status: NO EMAIL FOUND{RESET}");
    } else {
        println!("\n{GREEN}Status: {} contact(s){RESET}", contacts.len());
        for contact in contacts {
            let name = if contact.name.is_empty() {
                "(no name)"
            } else {
                contact.name.as_str()
            };
            println!("- {GREEN}{}{RESET}  {}", contact.email, name);
        }
    }

    println!("{BLUE}================================={RESET}\n");
}
