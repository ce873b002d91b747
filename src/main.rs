use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::debug;

use fiscal_xml_validator::cli::{Cli, OutputFormat, VerbosityLevel};
use fiscal_xml_validator::config::ConfigManager;
use fiscal_xml_validator::output::{FileReport, Output, Summary};
use fiscal_xml_validator::pipeline::Pipeline;

/// Exit code when configuration or schemas are unusable
const EXIT_STARTUP_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_STARTUP_FAILURE)
        }
    }
}

/// `Ok(true)` when every file is valid
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = ConfigManager::load_config(&cli)
        .await
        .context("failed to load configuration")?;

    let verbosity = VerbosityLevel::from_config(&config);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(verbosity.log_level())
        .with_target(false)
        .init();

    let pipeline = Arc::new(Pipeline::from_config(&config));
    let loaded = pipeline
        .schemas()
        .preload()
        .context("failed to load schemas")?;
    debug!(schemas = loaded, "schemas ready");

    // Files run concurrently; each one gets its own report whatever happens to the others
    let tasks: Vec<_> = cli
        .files
        .iter()
        .map(|path| {
            let pipeline = Arc::clone(&pipeline);
            let path = path.clone();
            tokio::spawn(async move {
                let started = Instant::now();
                let result = pipeline.validate_file(&path).await;
                FileReport::new(&path, result, started.elapsed())
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(tasks.len());
    for (task, path) in tasks.into_iter().zip(&cli.files) {
        let report = match task.await {
            Ok(report) => report,
            Err(e) => FileReport::new(
                path,
                Err(fiscal_xml_validator::DocumentError::Internal {
                    details: format!("validation task failed: {}", e),
                }),
                Duration::ZERO,
            ),
        };
        reports.push(report);
    }

    let output = Output::new(verbosity);
    match OutputFormat::from_config(&config) {
        OutputFormat::Human => print!("{}", output.format_human(&reports)),
        OutputFormat::Json => println!(
            "{}",
            output
                .format_json(&reports)
                .context("failed to serialize reports")?
        ),
    }

    Ok(Summary::from_reports(&reports).all_valid())
}
