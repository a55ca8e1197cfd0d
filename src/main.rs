/*!
 * Sync Demo - Main Entry Point
 *
 * Exercises each primitive from several threads and narrates through tracing:
 * - Busy-wait lock and blocking lock guarding a shared counter
 * - Lock-free queue with concurrent producers and a draining consumer
 */

use ai_os_sync::{init_tracing, BlockingLock, BusyWaitLock, ConcurrentQueue, Lock, RawLock};
use anyhow::{anyhow, ensure, Context, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tracing::{info, info_span};

/// Environment variable overriding the number of lock workers
const THREADS_ENV: &str = "SYNC_DEMO_THREADS";
const DEFAULT_THREADS: usize = 4;

const PRODUCERS: u64 = 2;
const VALUES_PER_PRODUCER: u64 = 1_000;

fn main() -> Result<()> {
    // Initialize structured tracing
    init_tracing();

    let threads = worker_count()?;
    info!(threads, "Sync demo starting");

    run_lock_demo::<BusyWaitLock>(threads)?;
    run_lock_demo::<BlockingLock>(threads)?;
    run_queue_demo()?;

    info!("Sync demo finished");
    Ok(())
}

fn worker_count() -> Result<usize> {
    match std::env::var(THREADS_ENV) {
        Ok(raw) => {
            let threads: usize = raw
                .parse()
                .with_context(|| format!("{THREADS_ENV} must be a positive integer, got {raw:?}"))?;
            ensure!(threads > 0, "{THREADS_ENV} must be at least 1");
            Ok(threads)
        }
        Err(_) => Ok(DEFAULT_THREADS),
    }
}

/// One worker: some unguarded work, then a bump of the shared counter
fn work_on_resource<R: RawLock>(worker: usize, counter: &Lock<R, u64>) {
    info!(worker, "Unprotected section: output may interleave with other workers");

    let mut entered = counter.lock();
    *entered += 1;
    info!(worker, order = *entered, "Protected section: no other worker runs here");
}

fn run_lock_demo<R: RawLock + Default + 'static>(threads: usize) -> Result<()> {
    let counter = Arc::new(Lock::<R, u64>::new(0));
    let lock_name = counter.raw().name();

    let span = info_span!("lock_demo", lock = lock_name);
    let _enter = span.enter();

    let handles = (0..threads)
        .map(|worker| {
            let counter = Arc::clone(&counter);
            thread::Builder::new()
                .name(format!("{lock_name}-{worker}"))
                .spawn(move || work_on_resource(worker, &counter))
        })
        .collect::<std::io::Result<Vec<_>>>()
        .context("Failed to spawn lock worker")?;

    for handle in handles {
        handle
            .join()
            .map_err(|_| anyhow!("{lock_name} worker panicked"))?;
    }

    let total = *counter.lock();
    ensure!(
        total == threads as u64,
        "{lock_name}: counter is {total}, expected {threads}"
    );
    info!(total, "All workers passed through the critical section");
    Ok(())
}

fn run_queue_demo() -> Result<()> {
    let span = info_span!("queue_demo", producers = PRODUCERS);
    let _enter = span.enter();

    let queue = Arc::new(ConcurrentQueue::new());

    let producers = (0..PRODUCERS)
        .map(|producer| {
            let queue = Arc::clone(&queue);
            thread::Builder::new()
                .name(format!("producer-{producer}"))
                .spawn(move || {
                    let base = producer * VALUES_PER_PRODUCER;
                    for value in base..base + VALUES_PER_PRODUCER {
                        queue.enqueue(value);
                    }
                })
        })
        .collect::<std::io::Result<Vec<_>>>()
        .context("Failed to spawn producer")?;

    let expected = PRODUCERS * VALUES_PER_PRODUCER;
    let mut seen = HashSet::with_capacity(expected as usize);
    let mut empty_polls = 0u64;

    while (seen.len() as u64) < expected {
        match queue.dequeue() {
            Some(value) => {
                ensure!(seen.insert(value), "value {value} dequeued twice");
            }
            None => {
                empty_polls += 1;
                thread::yield_now();
            }
        }
    }

    for handle in producers {
        handle.join().map_err(|_| anyhow!("producer panicked"))?;
    }

    ensure!(queue.dequeue().is_none(), "queue not empty after draining");
    info!(
        dequeued = seen.len(),
        empty_polls, "Every enqueued value was dequeued exactly once"
    );
    Ok(())
}
