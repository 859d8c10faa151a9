//! CLI entry point for the topic report tool.
//!
//! Provides subcommands for downloading a map's export tables, building the
//! per-topic report as CSV/JSON, and exporting it to a Google Sheet.

mod infra;

use crate::infra::google::{GoogleCredentials, GoogleSheetsClient};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::process::ExitCode;
use topic_report::{
    config::{Overrides, Settings},
    output::{PREVIEW_ROWS, log_preview, print_pretty, write_csv, write_json},
    report::{TopicReport, build_report},
    sheets::{StyleConfig, extract_spreadsheet_id, write_report},
    source::{MapLocation, fetch_exports, load_tables},
};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "topic_report")]
#[command(about = "Per-topic score reports for an idea map", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save the map's meta, topics and data tables to a directory
    Download {
        /// Export directory or base URL
        #[arg(value_name = "DIR_OR_URL")]
        source: String,

        /// Directory to write meta.csv, topics.csv and data.csv into
        #[arg(short, long, default_value = "exports")]
        output_dir: String,
    },
    /// Build the topic report and write it as CSV (and optionally JSON)
    Report {
        #[command(flatten)]
        common: CommonArgs,

        /// CSV file to write the report to
        #[arg(short, long, default_value = "report.csv")]
        output: String,

        /// Also write the report as a JSON document
        #[arg(long)]
        json: Option<String>,
    },
    /// Build the topic report and write it to a Google Sheet
    Export {
        #[command(flatten)]
        common: CommonArgs,

        /// Spreadsheet URL or id
        #[arg(long)]
        sheet_url: Option<String>,

        /// Worksheet title; created if missing
        #[arg(long)]
        sheet_name: Option<String>,

        /// Style config JSON
        #[arg(long)]
        style: Option<String>,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Export directory or base URL; falls back to the settings file
    #[arg(value_name = "DIR_OR_URL")]
    source: Option<String>,

    /// JSON settings file
    #[arg(short, long)]
    settings: Option<String>,

    /// Novelty score column
    #[arg(long)]
    novelty: Option<String>,

    /// Feasibility score column
    #[arg(long)]
    feasibility: Option<String>,

    /// Marketability score column
    #[arg(long)]
    marketability: Option<String>,

    /// Preferred column for the best item's title
    #[arg(long)]
    title_field: Option<String>,

    /// Preferred column for the best item's summary
    #[arg(long)]
    summary_field: Option<String>,

    /// Preferred column for the best item's category
    #[arg(long)]
    category_field: Option<String>,

    /// Number of report rows to log after the run
    #[arg(long, default_value_t = PREVIEW_ROWS)]
    preview: usize,
}

impl CommonArgs {
    fn settings(&self, sheet: Overrides) -> Result<Settings> {
        let settings = Settings::load_or_default(self.settings.as_deref())?;
        Ok(settings.apply(Overrides {
            source: self.source.clone(),
            novelty: self.novelty.clone(),
            feasibility: self.feasibility.clone(),
            marketability: self.marketability.clone(),
            title_field: self.title_field.clone(),
            summary_field: self.summary_field.clone(),
            category_field: self.category_field.clone(),
            ..sheet
        }))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = match init_logging() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Command failed");
            ExitCode::FAILURE
        }
    }
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/topic_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("topic_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .try_init()?;

    Ok(file_guard)
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Download { source, output_dir } => {
            let location = MapLocation::parse(&source);
            let token = atlas_token();
            let files = fetch_exports(&location, token.as_deref()).await?;
            files.save(Path::new(&output_dir))?;
            info!(map = %location.map_name(), output_dir, "Export tables saved");
        }
        Commands::Report {
            common,
            output,
            json,
        } => {
            let settings = common.settings(Overrides::default())?;
            let (map, rows) = generate(&settings, common.preview).await?;

            write_csv(&output, &rows)?;
            if let Some(path) = json {
                write_json(&path, &map, &rows)?;
            }
        }
        Commands::Export {
            common,
            sheet_url,
            sheet_name,
            style,
        } => {
            let settings = common.settings(Overrides {
                sheet_url,
                sheet_name,
                style_path: style,
                ..Default::default()
            })?;
            let Some(sheet_url) = settings.sheet_url.as_deref() else {
                bail!("No spreadsheet given; pass --sheet-url or set sheet_url in the settings file");
            };
            let style = StyleConfig::load_or_default(settings.style_path.as_deref())?;

            // Fail on missing credentials before doing any work.
            let credentials = GoogleCredentials::from_env()?;

            let (_, rows) = generate(&settings, common.preview).await?;

            let access_token = credentials
                .access_token()
                .await
                .context("Failed to obtain Google access token")?;
            let client = GoogleSheetsClient::new(access_token)?;
            let spreadsheet_id = extract_spreadsheet_id(sheet_url);

            let url =
                write_report(&client, &spreadsheet_id, &settings.sheet_name, &rows, &style).await?;
            info!(url = %url, sheet = %settings.sheet_name, "Sheet export complete");
        }
    }

    Ok(())
}

/// Loads the map tables and builds the report, logging a preview.
#[tracing::instrument(skip_all, fields(source = settings.source.as_deref().unwrap_or("")))]
async fn generate(settings: &Settings, preview: usize) -> Result<(String, Vec<TopicReport>)> {
    let Some(source) = settings.source.as_deref() else {
        bail!("No map source given; pass DIR_OR_URL or set source in the settings file");
    };
    let location = MapLocation::parse(source);
    let token = atlas_token();

    let tables = load_tables(&location, token.as_deref()).await?;
    let rows = build_report(&tables, &settings.report_config())?;

    log_preview(&rows, preview);
    print_pretty(&rows);

    Ok((location.map_name(), rows))
}

/// Bearer token for remote exports, if configured.
fn atlas_token() -> Option<String> {
    std::env::var("ATLAS_API_TOKEN")
        .ok()
        .filter(|t| !t.is_empty())
}
