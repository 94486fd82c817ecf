//! GR-Replay: apply a recovery transaction script and print one JSON line per step.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gr_replay::{Replayer, Script};
use guardian_recovery::prelude::{Principal, RecoveryConfig};

/// GR-Replay: Guardian Recovery transaction replay
#[derive(Parser, Debug)]
#[command(name = "gr-replay")]
#[command(about = "Apply a JSON transaction script to an in-memory recovery ledger")]
struct Args {
    /// Path to the JSON script
    script: PathBuf,

    /// Write the final ledger snapshot (JSON) to this path
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Administrator principal (overrides GR_ADMINISTRATOR and the script)
    #[arg(long)]
    admin: Option<Principal>,

    /// Emit logs as JSON
    #[arg(long, env = "GR_JSON_LOGS")]
    json_logs: bool,

    /// Stop at the first failed step and exit non-zero
    #[arg(long)]
    fail_fast: bool,
}

fn init_logging(json_logs: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("GR_LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to build log filter")?;

    // Logs go to stderr; stdout carries the step reports.
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs)?;

    let text = fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script.display()))?;
    let script = Script::from_json(&text)
        .with_context(|| format!("Failed to parse script {}", args.script.display()))?;

    let mut config = RecoveryConfig::from_env().context("Invalid GR_* environment")?;
    if let Some(admin) = args.admin.or(script.administrator) {
        config.administrator = admin;
    }
    if config.validate_for_production().is_err() {
        tracing::warn!("Administrator is the zero principal; pause/reactivate only succeed for it");
    }

    let mut replayer = Replayer::new(config).context("Invalid ledger configuration")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0usize;

    for (index, step) in script.steps.iter().enumerate() {
        let report = replayer.apply(index, step);
        serde_json::to_writer(&mut out, &report).context("Failed to write report")?;
        writeln!(out).context("Failed to write report")?;
        if !report.ok {
            failed += 1;
            if args.fail_fast {
                anyhow::bail!("step {index} ({}) failed: {}", report.op, report.error.unwrap_or_default());
            }
        }
    }

    let stats = replayer.service().stats();
    let pending = replayer.pending().context("Failed to read request status")?;
    info!(
        steps = script.steps.len(),
        failed,
        pending,
        committed = stats.transactions_committed,
        recoveries = stats.recoveries_completed,
        "Replay finished"
    );

    if let Some(path) = &args.snapshot {
        let snapshot = replayer
            .service()
            .store()
            .snapshot()
            .context("Failed to capture ledger snapshot")?;
        let json = snapshot.to_json().context("Failed to encode snapshot")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        info!(path = %path.display(), "Snapshot written");
    }

    Ok(())
}
