//! CLI for refsync: pick a registered job, run it once, report the outcome.

use anyhow::{Context, Result};
use clap::Parser;
use refsync_core::config::SyncConfig;
use refsync_core::jobs::{self, DatasetJob, JobOutcome, REGISTRY};
use refsync_core::store::{build_object_store, Uploader};

/// Top-level CLI for refsync.
#[derive(Debug, Parser)]
#[command(name = "refsync")]
#[command(about = "Download reference datasets and upload them to object storage", long_about = None)]
pub struct Cli {
    /// Job to run (see --list).
    #[arg(required_unless_present = "list")]
    pub job: Option<String>,

    /// Log level: trace, debug, info, warn (or warning) or error. RUST_LOG takes precedence.
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    pub log_level: String,

    /// Print the outcome as JSON on stdout instead of a summary line.
    #[arg(long)]
    pub json: bool,

    /// List registered jobs and exit.
    #[arg(long, conflicts_with = "job")]
    pub list: bool,
}

/// Run the command line. `Ok(false)` means the run finished but must exit non-zero.
pub async fn run(cli: Cli) -> Result<bool> {
    if cli.list {
        for def in REGISTRY {
            println!("{:<10} {:<10} {}", def.name, def.prefix, def.description);
        }
        return Ok(true);
    }

    let name = cli.job.as_deref().unwrap_or_default();
    let Some(definition) = jobs::lookup(name) else {
        let available: Vec<&str> = jobs::names().collect();
        tracing::error!("unknown job '{}'; available jobs: {}", name, available.join(", "));
        return Ok(false);
    };

    let cfg = SyncConfig::from_env().context("loading configuration")?;
    tracing::debug!("loaded config: {:?}", cfg);

    let store = build_object_store(&cfg).context("building object store")?;
    let uploader = Uploader::new(store, cfg.retry_policy());
    let job = DatasetJob::new(definition, &cfg, uploader);

    let outcome = jobs::run(&job, &cfg.temp_dir).await;
    report(&outcome, cli.json)?;
    Ok(outcome.is_success())
}

fn report(outcome: &JobOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }
    match &outcome.error {
        Some(error) => println!("{}: error: {}", outcome.job, error),
        None => println!(
            "{}: success: {} downloaded, {} uploaded, {} errors",
            outcome.job,
            outcome.downloaded,
            outcome.uploaded,
            outcome.errors.len()
        ),
    }
    for line in &outcome.errors {
        println!("  {}", line);
    }
    Ok(())
}
