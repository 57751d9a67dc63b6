//! AVX strategy for 256-bit vector operations.
//!
//! Packs 4 × f64 (`__m256d`) or 8 × f32 (`__m256`) per register. AVX is
//! available on Intel processors since Sandy Bridge (2011) and AMD processors
//! since Bulldozer (2011).
//!
//! # Architecture Requirements
//!
//! - **Target Architecture**: x86 or x86_64
//! - **Compilation**: compiled in when the build script emits `lazysimd_avx`;
//!   the kernel is entered through a `#[target_feature(enable = "avx")]`
//!   function, so no global `-C target-feature` flag is needed
//! - **Runtime**: only dispatched to after `is_x86_feature_detected!("avx")`
//!
//! # Memory Alignment
//!
//! `load`/`store` use `_mm256_load_*`/`_mm256_store_*` when the pointer sits
//! on a 32-byte boundary and the unaligned `loadu`/`storeu` forms otherwise.
//! Buffers allocated with the default 32-byte alignment always take the
//! aligned path because chunk offsets are multiples of the register width.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::eval;
use crate::expr::Expression;
use crate::simd::{is_aligned, Element, SimdTraits};

/// AVX memory alignment requirement in bytes.
pub(crate) const AVX_ALIGNMENT: usize = 32;

/// 256-bit AVX strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Avx;

impl SimdTraits<f64> for Avx {
    type Packet = __m256d;

    const WIDTH: usize = 4;

    #[inline(always)]
    unsafe fn load(ptr: *const f64) -> __m256d {
        match is_aligned(ptr, AVX_ALIGNMENT) {
            true => _mm256_load_pd(ptr),
            false => _mm256_loadu_pd(ptr),
        }
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut f64, packet: __m256d) {
        match is_aligned(ptr, AVX_ALIGNMENT) {
            true => _mm256_store_pd(ptr, packet),
            false => _mm256_storeu_pd(ptr, packet),
        }
    }

    #[inline(always)]
    unsafe fn add(a: __m256d, b: __m256d) -> __m256d {
        _mm256_add_pd(a, b)
    }

    #[inline(always)]
    unsafe fn mul(a: __m256d, b: __m256d) -> __m256d {
        _mm256_mul_pd(a, b)
    }
}

impl SimdTraits<f32> for Avx {
    type Packet = __m256;

    const WIDTH: usize = 8;

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> __m256 {
        match is_aligned(ptr, AVX_ALIGNMENT) {
            true => _mm256_load_ps(ptr),
            false => _mm256_loadu_ps(ptr),
        }
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut f32, packet: __m256) {
        match is_aligned(ptr, AVX_ALIGNMENT) {
            true => _mm256_store_ps(ptr, packet),
            false => _mm256_storeu_ps(ptr, packet),
        }
    }

    #[inline(always)]
    unsafe fn add(a: __m256, b: __m256) -> __m256 {
        _mm256_add_ps(a, b)
    }

    #[inline(always)]
    unsafe fn mul(a: __m256, b: __m256) -> __m256 {
        _mm256_mul_ps(a, b)
    }
}

/// Runs the evaluation loop with AVX enabled for code generation.
///
/// # Safety
///
/// The CPU must support AVX; see [`Element::evaluate`] for the pointer contract.
#[target_feature(enable = "avx")]
pub(crate) unsafe fn evaluate<T, E>(expr: &E, dst: *mut T, len: usize)
where
    T: Element,
    Avx: SimdTraits<T>,
    E: Expression<Elem = T>,
{
    eval::evaluate::<Avx, T, E>(expr, dst, len)
}
