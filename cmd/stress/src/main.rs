//! Stress test - many tasks through one pool
//!
//! Submits a large number of small computations and verifies every
//! result handle resolves to the expected value.

use std::time::Instant;

use ithread::WorkerPool;

fn main() {
    println!("=== ithread Stress Test ===\n");

    let num_tasks: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(100_000);

    let pool = WorkerPool::with_default_size();
    println!(
        "Submitting {} tasks to {} worker(s)...",
        num_tasks,
        pool.workers()
    );

    let start = Instant::now();

    let handles: Vec<_> = (0..num_tasks)
        .map(|i| pool.submit(move || i.wrapping_mul(2)).unwrap())
        .collect();

    let submit_time = start.elapsed();
    println!("Submit time: {:?}", submit_time);
    println!(
        "Submit rate: {:.0} tasks/sec",
        num_tasks as f64 / submit_time.as_secs_f64()
    );

    println!("\nCollecting results...");
    let mut correct = 0_usize;
    for (i, handle) in handles.into_iter().enumerate() {
        if handle.wait().unwrap() == i.wrapping_mul(2) {
            correct += 1;
        }
    }

    let total_time = start.elapsed();

    println!("\n=== Results ===");
    println!("Total tasks: {}", num_tasks);
    println!("Correct:     {}", correct);
    println!("Total time:  {:?}", total_time);
    println!(
        "Throughput:  {:.0} tasks/sec",
        num_tasks as f64 / total_time.as_secs_f64()
    );

    assert_eq!(correct, num_tasks);
    println!("\n=== Stress Test Complete ===");
}
