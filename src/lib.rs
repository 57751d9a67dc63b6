//! Lazily evaluated, SIMD-accelerated dense vector arithmetic.
//!
//! Operators on [`Vector`] references build an expression tree instead of
//! computing. Assigning the tree evaluates it in a single pass over the
//! destination, a full SIMD register at a time with a scalar tail, on the
//! widest instruction set the machine offers (AVX, SSE2, NEON or scalar).
//!
//! ```
//! use lazysimd::Vector;
//!
//! let x = Vector::<f32>::from_fn(1000, |i| i as f32)?;
//! let y = Vector::<f32>::from_elem(1000, 0.5)?;
//!
//! let mut r = Vector::<f32>::new(1000)?;
//! r.assign(&x * &x + &y * &y)?;
//!
//! assert_eq!(r[2], 4.25);
//! # Ok::<(), lazysimd::LazySimdError>(())
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod expr;
pub mod naive;
pub mod simd;
pub mod vector;

mod eval;

pub use buffer::AlignedBuffer;
pub use config::Config;
pub use error::{LazySimdError, Result};
pub use expr::{Current, Expression, Product, Sum};
pub use naive::NaiveVector;
pub use simd::{CpuFeatures, Element, SimdTraits, Tier};
pub use vector::Vector;

/// Default storage alignment in bytes, one 256-bit register.
pub const DEFAULT_ALIGNMENT: usize = 32;
