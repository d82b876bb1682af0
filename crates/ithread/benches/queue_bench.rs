//! Queue benchmarks
//!
//! Compares the two-lock queue against crossbeam's `ArrayQueue` (the
//! usual lock-free alternative) uncontended and under a 4x4
//! producer/consumer load.

use std::sync::Arc;
use std::thread;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use crossbeam_queue::ArrayQueue;
use ithread::TwoLockQueue;

const UNCONTENDED_OPS: u64 = 1_000;
const MPMC_ITEMS: u64 = 10_000;
const MPMC_THREADS: u64 = 4;

fn bench_uncontended(c: &mut Criterion) {
    let mut group = c.benchmark_group("uncontended_push_pop");
    group.throughput(Throughput::Elements(UNCONTENDED_OPS));

    group.bench_function("two_lock", |b| {
        let queue = TwoLockQueue::new();
        b.iter(|| {
            for i in 0..UNCONTENDED_OPS {
                queue.push(i).unwrap();
            }
            for _ in 0..UNCONTENDED_OPS {
                queue.try_pop().unwrap();
            }
        });
    });

    group.bench_function("crossbeam_array", |b| {
        let queue = ArrayQueue::new(UNCONTENDED_OPS as usize);
        b.iter(|| {
            for i in 0..UNCONTENDED_OPS {
                queue.push(i).unwrap();
            }
            for _ in 0..UNCONTENDED_OPS {
                queue.pop().unwrap();
            }
        });
    });

    group.finish();
}

fn bench_mpmc(c: &mut Criterion) {
    let mut group = c.benchmark_group("mpmc_4x4");
    group.throughput(Throughput::Elements(MPMC_ITEMS));
    group.sample_size(10);

    group.bench_function("two_lock", |b| {
        b.iter(|| {
            let queue = Arc::new(TwoLockQueue::new());
            let per_producer = MPMC_ITEMS / MPMC_THREADS;

            let producers: Vec<_> = (0..MPMC_THREADS)
                .map(|_| {
                    let queue = Arc::clone(&queue);
                    thread::spawn(move || {
                        for i in 0..per_producer {
                            queue.push(i).unwrap();
                        }
                    })
                })
                .collect();

            let consumers: Vec<_> = (0..MPMC_THREADS)
                .map(|_| {
                    let queue = Arc::clone(&queue);
                    thread::spawn(move || {
                        let mut count = 0_u64;
                        while queue.wait_and_pop().is_ok() {
                            count += 1;
                        }
                        count
                    })
                })
                .collect();

            for p in producers {
                p.join().unwrap();
            }
            queue.close();

            let total: u64 = consumers.into_iter().map(|c| c.join().unwrap()).sum();
            assert_eq!(total, per_producer * MPMC_THREADS);
        });
    });

    group.bench_function("crossbeam_array", |b| {
        b.iter(|| {
            let queue = Arc::new(ArrayQueue::new(MPMC_ITEMS as usize));
            let per_producer = MPMC_ITEMS / MPMC_THREADS;

            let producers: Vec<_> = (0..MPMC_THREADS)
                .map(|_| {
                    let queue = Arc::clone(&queue);
                    thread::spawn(move || {
                        for i in 0..per_producer {
                            while queue.push(i).is_err() {
                                std::hint::spin_loop();
                            }
                        }
                    })
                })
                .collect();

            let consumers: Vec<_> = (0..MPMC_THREADS)
                .map(|_| {
                    let queue = Arc::clone(&queue);
                    thread::spawn(move || {
                        let mut count = 0_u64;
                        let quota = per_producer;
                        while count < quota {
                            if queue.pop().is_some() {
                                count += 1;
                            } else {
                                std::hint::spin_loop();
                            }
                        }
                        count
                    })
                })
                .collect();

            for p in producers {
                p.join().unwrap();
            }
            let total: u64 = consumers.into_iter().map(|c| c.join().unwrap()).sum();
            assert_eq!(total, per_producer * MPMC_THREADS);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_uncontended, bench_mpmc);
criterion_main!(benches);
