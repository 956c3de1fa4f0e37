// Prefix sum driver: sequential reference vs barrier-synchronized parallel scan
//
// Usage:
//   ./prefix_sum [--items N] [--threads T] [--show-data] [--seed S] [--pin] [--json]
//
// Output (CSV-style):
//   scan,rust,N=1000000,T=8,sequential,0.001234,sec
//   scan,rust,N=1000000,T=8,parallel,0.000456,sec
//   scan,rust,N=1000000,T=8,correct,1,boolean

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use barrier_scan::ConfigError;
use barrier_scan::data::{format_data, random_data};
use barrier_scan::{first_mismatch, parallel_prefix_sum_with, sequential_prefix_sum, RunConfig};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(about = "Parallel prefix sum checked against a sequential scan")]
struct Args {
    /// Number of array items
    #[arg(short = 'n', long, env = "SCAN_ITEMS", default_value_t = 1_000_000)]
    items: usize,

    /// Number of worker threads
    #[arg(short = 't', long, env = "SCAN_THREADS", default_value_t = 8)]
    threads: usize,

    /// Print the array contents after each step
    #[arg(long, env = "SCAN_SHOW_DATA")]
    show_data: bool,

    /// Seed for the random input
    #[arg(long)]
    seed: Option<u64>,

    /// Pin workers to cores
    #[arg(long)]
    pin: bool,

    /// Print a JSON report instead of CSV lines
    #[arg(long)]
    json: bool,
}

impl Args {
    fn run_config(&self) -> RunConfig {
        RunConfig {
            items: self.items,
            threads: self.threads,
            show_data: self.show_data,
            seed: self.seed,
            pin_threads: self.pin,
        }
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    config: &'a RunConfig,
    sequential_sec: f64,
    parallel_sec: f64,
    speedup: f64,
    correct: bool,
    first_mismatch: Option<usize>,
}

/// Refuses runs past the size limits, and shapes the scan cannot split.
fn check_config(config: &RunConfig) -> anyhow::Result<()> {
    config.validate().map_err(|err| {
        let context = match err {
            ConfigError::TooManyItems { .. } | ConfigError::TooManyThreads { .. } => {
                "So much data or so many threads may not be a good idea"
            }
            ConfigError::NoWorkers | ConfigError::TooFewItems { .. } => {
                "items must be at least threads, and threads at least 1"
            }
        };
        anyhow::Error::new(err).context(context)
    })
}

fn show(config: &RunConfig, message: &str, data: &[i64]) {
    if config.show_data {
        println!("{}", format_data(message, data));
    }
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.run_config();
    check_config(&config)?;

    info!(items = config.items, threads = config.threads, "generating input");
    let mut sequential = random_data(config.items, config.seed);
    let mut parallel = sequential.clone();
    show(&config, "initial data          : ", &sequential);

    let start = Instant::now();
    sequential_prefix_sum(&mut sequential);
    let seq_time = start.elapsed().as_secs_f64();
    show(&config, "sequential prefix sum : ", &sequential);

    let start = Instant::now();
    parallel_prefix_sum_with(&mut parallel, &config.scan_config())
        .context("parallel prefix sum failed")?;
    let par_time = start.elapsed().as_secs_f64();
    show(&config, "parallel prefix sum   : ", &parallel);

    let mismatch = first_mismatch(&sequential, &parallel);
    let correct = mismatch.is_none();

    if args.json {
        let report = Report {
            config: &config,
            sequential_sec: seq_time,
            parallel_sec: par_time,
            speedup: seq_time / par_time,
            correct,
            first_mismatch: mismatch,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let prefix = format!("scan,rust,N={},T={}", config.items, config.threads);
        println!("{prefix},sequential,{seq_time:.6},sec");
        println!("{prefix},parallel,{par_time:.6},sec");
        println!("{prefix},correct,{},boolean", u8::from(correct));
    }

    if correct {
        if !args.json {
            println!("Well done, the sequential and parallel prefix sum arrays match.");
        }
        Ok(ExitCode::SUCCESS)
    } else {
        error!(index = mismatch, "results diverge");
        if !args.json {
            println!("Error: The sequential and parallel prefix sum arrays don't match.");
        }
        Ok(ExitCode::from(3))
    }
}
