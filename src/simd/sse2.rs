//! SSE2 strategy (x86 128-bit SIMD).
//!
//! Packs 2 × f64 (`__m128d`) or 4 × f32 (`__m128`) per register. SSE2 is part
//! of the x86_64 baseline, so this is the narrower fallback tier on machines
//! without AVX.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::eval;
use crate::expr::Expression;
use crate::simd::{is_aligned, Element, SimdTraits};

/// SSE memory alignment requirement in bytes.
pub(crate) const SSE_ALIGNMENT: usize = 16;

/// 128-bit SSE2 strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sse2;

impl SimdTraits<f64> for Sse2 {
    type Packet = __m128d;

    const WIDTH: usize = 2;

    #[inline(always)]
    unsafe fn load(ptr: *const f64) -> __m128d {
        match is_aligned(ptr, SSE_ALIGNMENT) {
            true => _mm_load_pd(ptr),
            false => _mm_loadu_pd(ptr),
        }
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut f64, packet: __m128d) {
        match is_aligned(ptr, SSE_ALIGNMENT) {
            true => _mm_store_pd(ptr, packet),
            false => _mm_storeu_pd(ptr, packet),
        }
    }

    #[inline(always)]
    unsafe fn add(a: __m128d, b: __m128d) -> __m128d {
        _mm_add_pd(a, b)
    }

    #[inline(always)]
    unsafe fn mul(a: __m128d, b: __m128d) -> __m128d {
        _mm_mul_pd(a, b)
    }
}

impl SimdTraits<f32> for Sse2 {
    type Packet = __m128;

    const WIDTH: usize = 4;

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> __m128 {
        match is_aligned(ptr, SSE_ALIGNMENT) {
            true => _mm_load_ps(ptr),
            false => _mm_loadu_ps(ptr),
        }
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut f32, packet: __m128) {
        match is_aligned(ptr, SSE_ALIGNMENT) {
            true => _mm_store_ps(ptr, packet),
            false => _mm_storeu_ps(ptr, packet),
        }
    }

    #[inline(always)]
    unsafe fn add(a: __m128, b: __m128) -> __m128 {
        _mm_add_ps(a, b)
    }

    #[inline(always)]
    unsafe fn mul(a: __m128, b: __m128) -> __m128 {
        _mm_mul_ps(a, b)
    }
}

/// Runs the evaluation loop with SSE2 enabled for code generation.
///
/// # Safety
///
/// The CPU must support SSE2; see [`Element::evaluate`] for the pointer contract.
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn evaluate<T, E>(expr: &E, dst: *mut T, len: usize)
where
    T: Element,
    Sse2: SimdTraits<T>,
    E: Expression<Elem = T>,
{
    eval::evaluate::<Sse2, T, E>(expr, dst, len)
}
