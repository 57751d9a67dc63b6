//! Scalar (non-SIMD) strategy.
//!
//! Portable baseline that works for every [`Element`] on every platform. It is
//! the reference the vector tiers are tested against, and the strategy used for
//! element types without SIMD primitives.

use crate::simd::{Element, SimdTraits};

/// Width-1 strategy: packets are plain elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scalar;

impl<T: Element> SimdTraits<T> for Scalar {
    type Packet = T;

    const WIDTH: usize = 1;

    #[inline(always)]
    unsafe fn load(ptr: *const T) -> T {
        *ptr
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut T, packet: T) {
        *ptr = packet;
    }

    #[inline(always)]
    unsafe fn add(a: T, b: T) -> T {
        a + b
    }

    #[inline(always)]
    unsafe fn mul(a: T, b: T) -> T {
        a * b
    }
}
