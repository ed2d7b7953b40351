//! Work offloading example.
//!
//! An I/O thread keeps accepting "requests" while a ThreadingPool computes
//! the expensive part of each response. Handles are awaited from tokio when
//! the `async` feature is enabled, and joined from a plain thread otherwise.
//!
//! Run with:
//!     RUST_LOG=iocore=debug cargo run --example offload
//!     RUST_LOG=iocore=debug cargo run --example offload --features async

use std::time::{Duration, Instant};

use iocore::{PoolConfig, ThreadingPool};
use tracing_subscriber::EnvFilter;

/// Stand-in for blocking or CPU-heavy work.
fn checksum(seed: u64) -> u64 {
    std::thread::sleep(Duration::from_millis(5));
    (0..10_000u64).fold(seed, |acc, x| acc.wrapping_mul(31).wrapping_add(x))
}

#[cfg(feature = "async")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let pool = ThreadingPool::new(PoolConfig::new(4)?.with_thread_name("offload"))?;
    pool.start()?;

    let start = Instant::now();
    let handles = (0..32u64)
        .map(|seed| pool.spawn(move || checksum(seed)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut combined = 0u64;
    for handle in handles {
        combined ^= handle.await?;
    }

    println!("32 checksums in {:?}, combined {:#x}", start.elapsed(), combined);
    println!("{:?}", pool.stats());
    pool.exit();
    Ok(())
}

#[cfg(not(feature = "async"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let pool = ThreadingPool::new(PoolConfig::new(4)?.with_thread_name("offload"))?;
    pool.start()?;

    let start = Instant::now();
    let handles = (0..32u64)
        .map(|seed| pool.spawn(move || checksum(seed)))
        .collect::<Result<Vec<_>, _>>()?;

    // The submitting thread stays free while the pool works
    let mut ticks = 0;
    while handles.iter().any(|h| !h.is_finished()) {
        ticks += 1;
        std::thread::sleep(Duration::from_millis(1));
    }

    let mut combined = 0u64;
    for handle in handles {
        combined ^= handle.join()?;
    }

    println!(
        "32 checksums in {:?} ({} idle ticks on the I/O thread), combined {:#x}",
        start.elapsed(),
        ticks,
        combined
    );
    println!("{:?}", pool.stats());
    pool.exit();
    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_thread_names(true)
        .init();
}
