use anyhow::Context;
use clap::Parser;
use generator::profile::build_dataset;
use gui_bridge::bridge::{gui_bind_address, PlotBridge};
use ingest::json_lines::load_json_lines;
use std::path::PathBuf;
use telemcore::prelude::DEFAULT_HORIZON_S;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod export;
mod generator;
mod gui_bridge;
mod ingest;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Staged velocity estimation for rocket ascent telemetry")]
struct Args {
    /// JSON-lines telemetry (time, velocity, altitude); a synthetic ascent is used otherwise
    #[arg(long)]
    input: Option<PathBuf>,
    /// Load a workflow config from YAML (overrides the other flags)
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Write one CSV per stage into this directory
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_HORIZON_S)]
    horizon: f64,
    /// Seed for the synthetic ascent
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Serve live stage plots over HTTP and keep running until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.input, args.output_dir, args.horizon, args.seed)
    };

    let dataset = match &workflow_config.input {
        Some(path) => load_json_lines(path)?,
        None => build_dataset(&workflow_config.generator)?,
    };

    let runner = Runner::new(workflow_config);
    let pipeline = runner.start(dataset)?;

    let bridge = PlotBridge::new(pipeline.stages());
    let progress = bridge.watch_progress(500);
    if args.serve {
        bridge.serve(gui_bind_address());
    }

    let result = runner.finish(pipeline);
    if progress.join().is_err() {
        log::warn!("progress watcher exited abnormally");
    }
    let result = result?;

    for summary in &result.stages {
        match &summary.metadata {
            Some(metadata) => println!(
                "{} -> {:?}, {} rows, rms velocity error {:.4} m/s, {}",
                summary.stage,
                summary.state,
                summary.rows,
                metadata.rms_velocity_error,
                metadata.notes.join("; ")
            ),
            None => println!("{} -> {:?}, {} rows", summary.stage, summary.state, summary.rows),
        }
    }
    println!(
        "Adjusted samples {}, published rows {}, faults {}",
        result.final_samples, result.metrics.published, result.metrics.faults
    );
    for path in &result.exported {
        println!("wrote {}", path.display());
    }

    if args.serve {
        println!("HTTP bridge running on {} (Ctrl+C to stop)...", gui_bind_address());
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
