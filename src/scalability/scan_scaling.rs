// Strong-scaling study of the parallel prefix sum
//
// Usage:
//   ./scan_scaling            full sweep over PROBLEM_SIZES x THREAD_COUNTS
//   ./scan_scaling <n> <T>    single run
//
// Output (CSV-style):
//   scaling,rust,N=1000000,T=4,time,0.000812,sec
//   scaling,rust,N=1000000,T=4,speedup,3.12,x
//   scaling,rust,N=1000000,T=4,efficiency,78.00,%

use std::time::Instant;

use anyhow::{bail, Context};
use barrier_scan::data::random_data;
use barrier_scan::{check_result, parallel_prefix_sum, sequential_prefix_sum};
use clap::Parser;
use tracing::warn;

const PROBLEM_SIZES: [usize; 4] = [100_000, 1_000_000, 5_000_000, 10_000_000];
const THREAD_COUNTS: [usize; 5] = [1, 2, 4, 8, 16];
const REPEATS: usize = 3;
const SEED: u64 = 0x5ca1e;

#[derive(Debug, Parser)]
#[command(about = "Scalability sweep for the parallel prefix sum")]
struct Args {
    /// Problem size for a single run
    n: Option<usize>,
    /// Thread count for a single run
    threads: Option<usize>,
}

/// Best-of-`REPEATS` parallel time, checked against the sequential scan.
fn run_benchmark(input: &[i64], expected: &[i64], threads: usize) -> anyhow::Result<f64> {
    let mut best = f64::INFINITY;
    for _ in 0..REPEATS {
        let mut data = input.to_vec();
        let start = Instant::now();
        parallel_prefix_sum(&mut data, threads)
            .with_context(|| format!("scan failed for N={}, T={threads}", input.len()))?;
        best = best.min(start.elapsed().as_secs_f64());

        if !check_result(expected, &data) {
            bail!("results do not match for N={}, T={threads}", input.len());
        }
    }
    Ok(best)
}

fn reference(input: &[i64]) -> Vec<i64> {
    let mut expected = input.to_vec();
    sequential_prefix_sum(&mut expected);
    expected
}

fn run_scalability_study() -> anyhow::Result<()> {
    for &n in &PROBLEM_SIZES {
        let input = random_data(n, Some(SEED));
        let expected = reference(&input);

        let mut baseline = 0.0;
        for &threads in &THREAD_COUNTS {
            if threads > n {
                warn!(n, threads, "skipping: fewer items than threads");
                continue;
            }
            let time = run_benchmark(&input, &expected, threads)?;
            if threads == 1 {
                baseline = time;
            }
            let speedup = baseline / time;
            let efficiency = speedup / threads as f64;

            println!("scaling,rust,N={n},T={threads},time,{time:.6},sec");
            println!("scaling,rust,N={n},T={threads},speedup,{speedup:.2},x");
            println!(
                "scaling,rust,N={n},T={threads},efficiency,{:.2},%",
                efficiency * 100.0
            );
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match (args.n, args.threads) {
        (Some(n), Some(threads)) => {
            let input = random_data(n, Some(SEED));
            let expected = reference(&input);
            let time = run_benchmark(&input, &expected, threads)?;
            println!("scaling,rust,N={n},T={threads},time,{time:.6},sec");
            Ok(())
        }
        (None, None) => run_scalability_study(),
        _ => bail!("pass both <n> and <threads>, or neither"),
    }
}
