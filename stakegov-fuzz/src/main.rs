use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use stakegov_contracts::Fault;
use stakegov_sim::{DifferentialHarness, HarnessError};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

mod settings;

use settings::{apply_overrides, deploy_local_chain, load_config, store_config, Overrides};

/// Differential fuzzer for the staking and governance protocol
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of loop iterations
    #[arg(short = 'n', long)]
    runs: Option<u64>,

    /// Seed of the action generator. A random seed is drawn and logged if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of staker identities
    #[arg(long)]
    stakers: Option<usize>,

    /// Epoch length in seconds
    #[arg(long)]
    epoch_period: Option<u64>,

    /// Deliberate deviation to inject into the local chain
    /// (skip-vote-adjustment, double-count-revote, ignore-delegated-deposit, tie-goes-to-first)
    #[arg(long)]
    fault: Option<Fault>,

    /// Configuration file to use instead of the stored one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store the effective configuration as the new default before running
    #[arg(long)]
    save_config: bool,

    /// Write the state dump of a divergence to this file as JSON
    #[arg(long)]
    dump_file: Option<PathBuf>,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Path to the log file (optional). If not provided, logs will only go to stdout.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(args: &Args) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = FmtSubscriber::builder().with_env_filter(filter);

    let guard = if let Some(log_file_path) = &args.log_file {
        let file = File::create(log_file_path)
            .with_context(|| format!("creating log file {}", log_file_path.display()))?;
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(file);
        builder
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .finish()
            .try_init()
            .context("setting default subscriber failed")?;
        Some(guard)
    } else {
        builder.finish().try_init().context("setting default subscriber failed")?;
        None
    };
    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let _guard = init_logging(&args)?;

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(
        &mut config,
        &Overrides {
            runs: args.runs,
            seed: args.seed,
            stakers: args.stakers,
            epoch_period: args.epoch_period,
        },
    );
    config.validate().context("invalid fuzz configuration")?;
    if args.save_config {
        store_config(&config)?;
    }
    info!("Loaded configuration: {:#?}", config);

    if let Some(fault) = args.fault {
        warn!("local chain runs with injected fault: {}", fault);
    }
    let chain = deploy_local_chain(&config, args.fault);
    let mut harness = DifferentialHarness::new(config, chain)?;
    info!("seed: {}", harness.seed());

    match harness.run().await {
        Ok(score) => {
            println!("{}", score);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!("fuzz run failed: {}", err);
            println!("{}", harness.score());
            report_failure(&err, args.dump_file.as_ref())?;
            error!("reproduce with --seed {}", harness.seed());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn report_failure(err: &HarnessError, dump_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let Some(dump) = err.dump() else {
        return Ok(());
    };
    let json = dump.to_json_pretty();
    error!("state dump:\n{}", json);
    if let Some(path) = dump_file {
        std::fs::write(path, &json).with_context(|| format!("writing state dump to {}", path.display()))?;
        info!("state dump written to {}", path.display());
    }
    Ok(())
}
