// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use wf_config::AlgorithmConfig;
use wf_core::StageStatus;
use wf_pipeline::Executor;
use wf_sink::{FsArtifactSink, RetryConfig, RetryingSink};

/// Exit code for runtime / pipeline errors.
const EXIT_RUNTIME_ERROR: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "wallforge", version, about = "Deterministic wall-geometry pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full pipeline against an input document and persist artifacts.
    Run {
        /// Path to the JSON input document (spec §6).
        #[arg(long)]
        input: PathBuf,

        /// Comma-separated list of selected layer names.
        #[arg(long, value_delimiter = ',')]
        layers: Vec<String>,

        /// Job id under which artifacts are persisted. Generated if omitted.
        #[arg(long)]
        job_id: Option<Uuid>,

        /// Directory artifacts are written under (one subdirectory per job).
        #[arg(long, default_value = "./wallforge-out")]
        out: PathBuf,

        /// Optional TOML overlay with algorithm-config overrides.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print JSON summary to stdout instead of human-readable text.
        #[arg(long)]
        json: bool,
    },

    /// Print the per-stage metrics snapshot for a previously run job.
    Inspect {
        /// Directory artifacts were written under.
        #[arg(long, default_value = "./wallforge-out")]
        out: PathBuf,

        /// Job id to inspect.
        #[arg(long)]
        job_id: Uuid,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("wallforge=debug,wf_pipeline=debug")
    } else {
        EnvFilter::new("wallforge=info,wf_pipeline=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Run { input, layers, job_id, out, config, json } => {
            cmd_run(input, layers, job_id, out, config, json)
        }
        Commands::Inspect { out, job_id } => cmd_inspect(out, job_id),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(EXIT_RUNTIME_ERROR);
    }
}

fn cmd_run(
    input: PathBuf,
    layers: Vec<String>,
    job_id: Option<Uuid>,
    out: PathBuf,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let raw = std::fs::read_to_string(&input)
        .with_context(|| format!("read input document '{}'", input.display()))?;
    let document: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("parse input document '{}' as JSON", input.display()))?;

    let selected_layers: BTreeSet<String> = layers.into_iter().filter(|l| !l.is_empty()).collect();

    let algorithm_config = wf_config::load_config(config_path.as_deref())
        .with_context(|| "load algorithm config")?;
    if let Err(err) = algorithm_config.validate() {
        anyhow::bail!("invalid algorithm config: {err}");
    }

    let job_id = job_id.unwrap_or_else(Uuid::new_v4);
    let sink = RetryingSink::new(FsArtifactSink::new(&out), RetryConfig::default());
    let executor = Executor::new(algorithm_config, &sink);
    let cancel = AtomicBool::new(false);

    let report = executor
        .run_reporting(job_id, document, selected_layers, &cancel)
        .with_context(|| format!("run pipeline for job {job_id}"))?;

    if json {
        let statuses: Vec<serde_json::Value> = report
            .statuses
            .iter()
            .map(|(stage, status)| serde_json::json!({"stage": stage.as_str(), "status": format!("{status:?}")}))
            .collect();
        println!("{}", serde_json::json!({
            "job_id": job_id.to_string(),
            "out_dir": out.join(job_id.to_string()).display().to_string(),
            "stages": statuses,
            "wall_rectangles": report.bundle.logic_e().map(Vec::len).unwrap_or(0),
            "door_bridges": report.bundle.door_bridge().map(Vec::len).unwrap_or(0),
        }));
    } else {
        println!("job_id: {job_id}");
        println!("artifacts: {}", out.join(job_id.to_string()).display());
        for (stage, status) in &report.statuses {
            println!("  {:<28} {:?}", stage.as_str(), status);
        }
        if let Some(rects) = report.bundle.logic_e() {
            println!("wall rectangles: {}", rects.len());
        }
        if let Some(bridges) = report.bundle.door_bridge() {
            println!("door bridges: {}", bridges.len());
        }
    }

    let all_completed = report.statuses.iter().all(|(_, s)| *s == StageStatus::Completed);
    if !all_completed {
        std::process::exit(EXIT_RUNTIME_ERROR);
    }
    Ok(())
}

fn cmd_inspect(out: PathBuf, job_id: Uuid) -> Result<()> {
    use wf_sink::ArtifactSink;
    let sink = FsArtifactSink::new(&out);
    let bytes = sink
        .get(job_id, wf_pipeline::STEP_METRICS_ARTIFACT)
        .with_context(|| format!("read step metrics for job {job_id}"))?
        .with_context(|| format!("no step metrics recorded for job {job_id} under {}", out.display()))?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).context("parse step metrics JSON")?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
