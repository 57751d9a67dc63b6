//! ARM NEON strategy for 128-bit vector operations.
//!
//! Packs 2 × f64 (`float64x2_t`) or 4 × f32 (`float32x4_t`) per register.
//! NEON is mandatory on AArch64 (Apple Silicon, AWS Graviton, modern mobile
//! devices), so on those targets it is the widest tier this crate provides.
//!
//! NEON loads and stores have no alignment requirement; aligned buffers still
//! avoid split cache-line accesses.

use std::arch::aarch64::*;

use crate::eval;
use crate::expr::Expression;
use crate::simd::{Element, SimdTraits};

/// 128-bit NEON strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neon;

impl SimdTraits<f64> for Neon {
    type Packet = float64x2_t;

    const WIDTH: usize = 2;

    #[inline(always)]
    unsafe fn load(ptr: *const f64) -> float64x2_t {
        vld1q_f64(ptr)
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut f64, packet: float64x2_t) {
        vst1q_f64(ptr, packet)
    }

    #[inline(always)]
    unsafe fn add(a: float64x2_t, b: float64x2_t) -> float64x2_t {
        vaddq_f64(a, b)
    }

    #[inline(always)]
    unsafe fn mul(a: float64x2_t, b: float64x2_t) -> float64x2_t {
        vmulq_f64(a, b)
    }
}

impl SimdTraits<f32> for Neon {
    type Packet = float32x4_t;

    const WIDTH: usize = 4;

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> float32x4_t {
        vld1q_f32(ptr)
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut f32, packet: float32x4_t) {
        vst1q_f32(ptr, packet)
    }

    #[inline(always)]
    unsafe fn add(a: float32x4_t, b: float32x4_t) -> float32x4_t {
        vaddq_f32(a, b)
    }

    #[inline(always)]
    unsafe fn mul(a: float32x4_t, b: float32x4_t) -> float32x4_t {
        vmulq_f32(a, b)
    }
}

/// Runs the evaluation loop with NEON enabled for code generation.
///
/// # Safety
///
/// See [`Element::evaluate`] for the pointer contract.
#[target_feature(enable = "neon")]
pub(crate) unsafe fn evaluate<T, E>(expr: &E, dst: *mut T, len: usize)
where
    T: Element,
    Neon: SimdTraits<T>,
    E: Expression<Elem = T>,
{
    eval::evaluate::<Neon, T, E>(expr, dst, len)
}
