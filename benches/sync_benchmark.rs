/*!
 * Synchronization Primitives Benchmarks
 *
 * Compare the busy-wait and blocking locks against parking_lot::Mutex, and
 * the lock-free queue against crossbeam's SegQueue
 */

use ai_os_sync::{BlockingMutex, BusyWaitMutex, ConcurrentQueue};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crossbeam_queue::SegQueue;
use std::sync::Arc;
use std::thread;

const OPS_PER_THREAD: u64 = 1_000;

fn bench_uncontended_lock(c: &mut Criterion) {
    let mut group = c.benchmark_group("uncontended_lock");

    let busy = BusyWaitMutex::new(0u64);
    group.bench_function("busy_wait", |b| b.iter(|| *busy.lock() += black_box(1)));

    let blocking = BlockingMutex::new(0u64);
    group.bench_function("blocking", |b| b.iter(|| *blocking.lock() += black_box(1)));

    let parking = parking_lot::Mutex::new(0u64);
    group.bench_function("parking_lot", |b| b.iter(|| *parking.lock() += black_box(1)));

    group.finish();
}

fn contend<F>(threads: usize, op: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let op = Arc::new(op);
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let op = op.clone();
            thread::spawn(move || {
                for _ in 0..OPS_PER_THREAD {
                    op();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

fn bench_contended_lock(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_lock");

    for threads in [2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("busy_wait", threads), &threads, |b, &threads| {
            b.iter(|| {
                let lock = Arc::new(BusyWaitMutex::new(0u64));
                contend(threads, move || *lock.lock() += 1);
            });
        });

        group.bench_with_input(BenchmarkId::new("blocking", threads), &threads, |b, &threads| {
            b.iter(|| {
                let lock = Arc::new(BlockingMutex::new(0u64));
                contend(threads, move || *lock.lock() += 1);
            });
        });

        group.bench_with_input(
            BenchmarkId::new("parking_lot", threads),
            &threads,
            |b, &threads| {
                b.iter(|| {
                    let lock = Arc::new(parking_lot::Mutex::new(0u64));
                    contend(threads, move || *lock.lock() += 1);
                });
            },
        );
    }

    group.finish();
}

fn bench_queue_single_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_single_thread");

    let queue = ConcurrentQueue::new();
    group.bench_function("concurrent_queue", |b| {
        b.iter(|| {
            queue.enqueue(black_box(1u64));
            black_box(queue.dequeue())
        })
    });

    let seg = SegQueue::new();
    group.bench_function("seg_queue", |b| {
        b.iter(|| {
            seg.push(black_box(1u64));
            black_box(seg.pop())
        })
    });

    group.finish();
}

fn bench_queue_mpmc(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_mpmc");

    for threads in [2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("concurrent_queue", threads),
            &threads,
            |b, &threads| {
                b.iter(|| {
                    let queue = Arc::new(ConcurrentQueue::new());
                    contend(threads, move || {
                        queue.enqueue(1u64);
                        black_box(queue.dequeue());
                    });
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("seg_queue", threads), &threads, |b, &threads| {
            b.iter(|| {
                let queue = Arc::new(SegQueue::new());
                contend(threads, move || {
                    queue.push(1u64);
                    black_box(queue.pop());
                });
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_uncontended_lock,
    bench_contended_lock,
    bench_queue_single_thread,
    bench_queue_mpmc
);
criterion_main!(benches);
