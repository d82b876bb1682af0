//! Basic ithread example
//!
//! Binds one task directly, then runs heterogeneous computations
//! through a worker pool and collects both results.
//!
//! # Environment Variables
//!
//! - `ITH_WORKERS=<n>` - Override the pool size
//! - `ITH_LOG_LEVEL=debug` - Set log level (off, error, warn, info, debug)

use ithread::{Task, WorkerPool};

fn add_ten_int(x: i32) -> i32 {
    println!("computing {} + 10 as int", x);
    x + 10
}

fn add_ten_float(x: i32) -> f64 {
    println!("computing {} + 10 as float", x);
    f64::from(x) + 10.0
}

// ITH_LOG_LEVEL=debug cargo run -p ithread-basic
fn main() {
    println!("=== ithread Basic Example ===\n");

    // A task can be bound and run without any pool at all
    let (task, handle) = Task::bind(|| add_ten_int(5));
    task.run();
    println!("Inline task result: {}\n", handle.wait().unwrap());

    // Pool lane: both submissions run on worker threads; the handles
    // carry each callable's own return type
    let pool = WorkerPool::with_default_size();
    println!("Pool started with {} worker(s)", pool.workers());

    let future_int = pool.submit(|| add_ten_int(10)).unwrap();
    let future_float = pool.submit(|| add_ten_float(10)).unwrap();

    println!(
        "Future results = {} / {}",
        future_int.wait().unwrap(),
        future_float.wait().unwrap()
    );

    println!("\n=== Example Complete ===");
}
