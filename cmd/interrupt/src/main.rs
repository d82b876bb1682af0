//! Interruption example
//!
//! A dedicated worker blocks on an empty queue; main interrupts it and
//! the blocked wait unwinds with a cancellation error instead of
//! hanging.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ithread::{InterruptibleWorker, TaskError, TwoLockQueue};

fn main() {
    println!("=== ithread Interrupt Example ===\n");

    let queue: Arc<TwoLockQueue<i32>> = Arc::new(TwoLockQueue::new());
    let consumer_queue = Arc::clone(&queue);

    let mut worker = InterruptibleWorker::new(move |flag| {
        println!("[worker] waiting for an item that never comes...");
        consumer_queue.wait_and_pop_interruptible(flag)
    });
    worker.set_failure_callback(|| println!("[worker] failure callback invoked"));
    worker.run().unwrap();

    thread::sleep(Duration::from_millis(100));
    println!("[main] interrupting the worker");
    let start = Instant::now();
    worker.interrupt();

    match worker.join() {
        Err(TaskError::Cancelled) => {
            println!("[main] worker unwound with Cancelled in {:?}", start.elapsed())
        }
        other => println!("[main] unexpected outcome: {:?}", other),
    }

    println!("\n=== Example Complete ===");
}
