//! Barrier-synchronized parallel inclusive prefix sum.
//!
//! A fixed pool of T workers scans an array in three phases:
//!
//! 1. every worker scans its own chunk locally,
//! 2. worker 0 turns the chunk totals into global boundary values,
//! 3. every other worker adds its predecessor's boundary value to the rest
//!    of its chunk.
//!
//! Two barriers separate the phases. A worker that fails still arrives at
//! every barrier, so the others are never left waiting.

mod partition;
mod phases;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Barrier, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::{debug, error, info, warn};

pub use partition::{Chunk, ChunkView, Partition};
pub use phases::{combine_boundaries, local_scan, propagate_carry};

use crate::config::ScanConfig;
use crate::error::ScanError;

/// Step of the scan a worker is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    LocalScan,
    BoundaryCombine,
    CarryPropagate,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::LocalScan => write!(f, "local scan"),
            Phase::BoundaryCombine => write!(f, "boundary combine"),
            Phase::CarryPropagate => write!(f, "carry propagation"),
        }
    }
}

/// Computes the inclusive prefix sum of `data` in place with `threads` workers.
pub fn parallel_prefix_sum(data: &mut [i64], threads: usize) -> Result<(), ScanError> {
    parallel_prefix_sum_with(data, &ScanConfig::new(threads))
}

/// Like [`parallel_prefix_sum`], with the pool configured by `config`.
///
/// Fails without touching `data` if it holds fewer items than there are
/// workers. After a worker failure the contents of `data` are unspecified.
pub fn parallel_prefix_sum_with(data: &mut [i64], config: &ScanConfig) -> Result<(), ScanError> {
    let partition = Partition::new(data.len(), config.threads)?;
    let pool = build_pool(config)?;

    info!(
        items = partition.items(),
        workers = partition.workers(),
        base = partition.base(),
        remainder = partition.remainder(),
        "starting parallel scan"
    );
    let start = Instant::now();

    let shared = Shared::new(partition, partition.split(data));
    let contexts: Vec<WorkerContext<'_, '_>> = partition
        .chunks()
        .map(|chunk| WorkerContext {
            index: chunk.index,
            chunk,
            base: partition.base(),
            remainder: partition.remainder(),
            shared: &shared,
        })
        .collect();

    // `broadcast` returns only after every worker has finished, which is the
    // per-scan join. Dropping the pool afterwards does not wait for its threads.
    let results = pool.broadcast(|ctx| contexts[ctx.index()].run());
    first_error(results)?;

    info!(elapsed_us = start.elapsed().as_micros() as u64, "parallel scan finished");
    Ok(())
}

/// The first worker error in worker order, if any.
fn first_error(results: Vec<Result<(), ScanError>>) -> Result<(), ScanError> {
    match results.into_iter().find_map(Result::err) {
        Some(err) => {
            error!(error = %err, "parallel scan failed");
            Err(err)
        }
        None => Ok(()),
    }
}

fn build_pool(config: &ScanConfig) -> Result<rayon::ThreadPool, ScanError> {
    let pin_threads = config.pin_threads;
    let core_ids = if pin_threads {
        core_affinity::get_core_ids().unwrap_or_default()
    } else {
        Vec::new()
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .thread_name(|i| format!("scan-worker-{i}"))
        .start_handler(move |i| {
            if !pin_threads {
                return;
            }
            match core_ids.get(i % core_ids.len().max(1)) {
                Some(&core) if core_affinity::set_for_current(core) => {
                    debug!(worker = i, core = core.id, "pinned worker");
                }
                _ => warn!(worker = i, "could not pin worker to a core"),
            }
        })
        .build()
        .map_err(|source| ScanError::Synchronization {
            workers: config.threads,
            source,
        })
}

/// State shared by every worker for the lifetime of one scan.
///
/// Each chunk body is locked only by its owner. Tails are locked by their
/// owner in phase 1, by worker 0 in phase 2 and by the next worker in
/// phase 3, so no lock is ever contended when the barriers are respected.
struct Shared<'a> {
    partition: Partition,
    bodies: Vec<Mutex<&'a mut [i64]>>,
    tails: Vec<Mutex<&'a mut i64>>,
    after_local: Barrier,
    after_combine: Barrier,
    failed: AtomicBool,
}

impl<'a> Shared<'a> {
    fn new(partition: Partition, views: Vec<ChunkView<'a>>) -> Self {
        let (bodies, tails): (Vec<_>, Vec<_>) = views
            .into_iter()
            .map(|view| (Mutex::new(view.body), Mutex::new(view.tail)))
            .unzip();

        Self {
            partition,
            bodies,
            tails,
            after_local: Barrier::new(partition.workers()),
            after_combine: Barrier::new(partition.workers()),
            failed: AtomicBool::new(false),
        }
    }
}

// A worker that panicked while holding a lock has already flagged the scan as
// failed, so the data behind a poisoned lock is never trusted afterwards.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct WorkerContext<'s, 'a> {
    index: usize,
    chunk: Chunk,
    base: usize,
    remainder: usize,
    shared: &'s Shared<'a>,
}

impl WorkerContext<'_, '_> {
    fn run(&self) -> Result<(), ScanError> {
        self.run_with(|| self.combine())
    }

    /// Runs all three phases, with `combine` as worker 0's boundary step.
    fn run_with<F>(&self, combine: F) -> Result<(), ScanError>
    where
        F: FnOnce() -> Result<(), ScanError>,
    {
        debug!(
            worker = self.index,
            start = self.chunk.start,
            end = self.chunk.end,
            base = self.base,
            remainder = self.remainder,
            "worker started"
        );

        let mut outcome = self.step(Phase::LocalScan, || {
            let mut body = lock(&self.shared.bodies[self.index]);
            let mut tail = lock(&self.shared.tails[self.index]);
            local_scan(&mut body, &mut tail);
            Ok(())
        });
        self.shared.after_local.wait();

        if self.index == 0 {
            outcome = outcome.and(self.step(Phase::BoundaryCombine, combine));
        }
        self.shared.after_combine.wait();

        if self.index != 0 {
            outcome = outcome.and(self.step(Phase::CarryPropagate, || self.propagate()));
        }
        outcome
    }

    fn combine(&self) -> Result<(), ScanError> {
        let mut guards: Vec<_> = self.shared.tails.iter().map(lock).collect();
        let mut tails: Vec<&mut i64> = guards.iter_mut().map(|guard| &mut ***guard).collect();
        combine_boundaries(&mut tails)?;

        debug!(
            worker = self.index,
            chunks = self.shared.partition.workers(),
            total = *tails[tails.len() - 1],
            "combined chunk boundaries"
        );
        Ok(())
    }

    fn propagate(&self) -> Result<(), ScanError> {
        // Element `index * base - 1` is the previous chunk's final element.
        debug_assert_eq!(self.shared.partition.chunk(self.index - 1).end, self.index * self.base);
        let carry = **lock(&self.shared.tails[self.index - 1]);
        let mut body = lock(&self.shared.bodies[self.index]);
        propagate_carry(&mut body, carry);

        debug!(worker = self.index, carry, "propagated carry");
        Ok(())
    }

    /// Runs one phase unless another worker has already failed.
    ///
    /// Errors and panics mark the whole scan as failed; the caller still
    /// arrives at the remaining barriers.
    fn step<F>(&self, phase: Phase, f: F) -> Result<(), ScanError>
    where
        F: FnOnce() -> Result<(), ScanError>,
    {
        if self.shared.failed.load(Ordering::Acquire) {
            debug!(worker = self.index, %phase, "skipping phase after failure");
            return Ok(());
        }

        let result = match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => result,
            Err(payload) => Err(ScanError::WorkerPanicked {
                worker: self.index,
                phase,
                message: panic_message(payload.as_ref()),
            }),
        };

        if let Err(err) = &result {
            error!(worker = self.index, %phase, error = %err, "worker failed");
            self.shared.failed.store(true, Ordering::Release);
        }
        result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
