//! Hardware dispatch layer.
//!
//! Each instruction set gets a zero-sized strategy type implementing
//! [`SimdTraits`] for the element types it can vectorize. The build script
//! decides which strategies are compiled in (`lazysimd_avx`, `lazysimd_sse2`,
//! `lazysimd_neon`), [`Tier::active`] picks the widest one the running CPU
//! supports once per process, and [`Element::evaluate`] routes each
//! assignment to the kernel monomorphized for that strategy.
//!
//! | Tier     | Register | f64 lanes | f32 lanes |
//! |----------|----------|-----------|-----------|
//! | `avx`    | 256 bit  | 4         | 8         |
//! | `sse2`   | 128 bit  | 2         | 4         |
//! | `neon`   | 128 bit  | 2         | 4         |
//! | `scalar` | none     | 1         | 1         |
//!
//! Integer element types are always evaluated by the scalar strategy.

#[cfg(all(lazysimd_avx, any(target_arch = "x86", target_arch = "x86_64")))]
pub mod avx;

#[cfg(all(lazysimd_sse2, any(target_arch = "x86", target_arch = "x86_64")))]
pub mod sse2;

#[cfg(all(lazysimd_neon, target_arch = "aarch64"))]
pub mod neon;

pub mod features;
pub mod scalar;
pub mod traits;

pub use features::{CpuFeatures, Tier};
pub use scalar::Scalar;
pub use traits::{Element, SimdTraits};

use crate::eval;
use crate::expr::Expression;

/// Checks whether `ptr` sits on an `alignment`-byte boundary.
#[cfg(all(
    any(lazysimd_avx, lazysimd_sse2),
    any(target_arch = "x86", target_arch = "x86_64")
))]
#[inline(always)]
pub(crate) fn is_aligned<T>(ptr: *const T, alignment: usize) -> bool {
    (ptr as usize) % alignment == 0
}

macro_rules! impl_float_element {
    ($($t:ty),*) => {$(
        impl Element for $t {
            #[inline]
            fn lanes(tier: Tier) -> usize {
                match tier {
                    #[cfg(all(lazysimd_avx, any(target_arch = "x86", target_arch = "x86_64")))]
                    Tier::Avx => <avx::Avx as SimdTraits<$t>>::WIDTH,
                    #[cfg(all(lazysimd_sse2, any(target_arch = "x86", target_arch = "x86_64")))]
                    Tier::Sse2 => <sse2::Sse2 as SimdTraits<$t>>::WIDTH,
                    #[cfg(all(lazysimd_neon, target_arch = "aarch64"))]
                    Tier::Neon => <neon::Neon as SimdTraits<$t>>::WIDTH,
                    _ => <Scalar as SimdTraits<$t>>::WIDTH,
                }
            }

            #[inline]
            unsafe fn evaluate<E>(tier: Tier, expr: &E, dst: *mut $t, len: usize)
            where
                E: Expression<Elem = $t>,
            {
                match tier {
                    #[cfg(all(lazysimd_avx, any(target_arch = "x86", target_arch = "x86_64")))]
                    Tier::Avx => avx::evaluate(expr, dst, len),
                    #[cfg(all(lazysimd_sse2, any(target_arch = "x86", target_arch = "x86_64")))]
                    Tier::Sse2 => sse2::evaluate(expr, dst, len),
                    #[cfg(all(lazysimd_neon, target_arch = "aarch64"))]
                    Tier::Neon => neon::evaluate(expr, dst, len),
                    _ => eval::evaluate::<Scalar, $t, E>(expr, dst, len),
                }
            }
        }
    )*};
}

macro_rules! impl_scalar_element {
    ($($t:ty),*) => {$(
        impl Element for $t {
            #[inline]
            fn lanes(_tier: Tier) -> usize {
                <Scalar as SimdTraits<$t>>::WIDTH
            }

            #[inline]
            unsafe fn evaluate<E>(_tier: Tier, expr: &E, dst: *mut $t, len: usize)
            where
                E: Expression<Elem = $t>,
            {
                eval::evaluate::<Scalar, $t, E>(expr, dst, len)
            }
        }
    )*};
}

impl_float_element!(f32, f64);
impl_scalar_element!(i32, i64, u32, u64);
