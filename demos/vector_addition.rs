//! Adds two ten-element vectors lazily and prints the result.
//!
//! Run with `RUST_LOG=trace` to see tier selection and the evaluation pass,
//! and with `LAZYSIMD_TIER=scalar` to force the scalar kernel.

use lazysimd::{CpuFeatures, LazySimdError, Tier, Vector};

fn main() -> Result<(), LazySimdError> {
    env_logger::init();

    let v = Vector::<f64>::from_fn(10, |i| i as f64)?;
    let w = Vector::<f64>::from_fn(10, |i| 2.0 * i as f64)?;
    let mut u = Vector::<f64>::new(10)?;

    u.assign(&v + &w)?;

    println!("cpu features: {}", CpuFeatures::current());
    println!(
        "dispatch tier: {} ({} x f64 per packet)",
        Tier::active(),
        Vector::<f64>::dispatch_width()
    );
    println!("v     = {v}");
    println!("w     = {w}");
    println!("v + w = {u}");

    Ok(())
}
